//! Headless stand-in for a game scene
//!
//! A walled yard with one local actor, one wandering actor and a camera
//! parented to the local actor's head. Everything the host touches goes
//! through cheap `Rc` proxies, the same way it would through engine handles.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use glam::{Quat, Vec3};
use gnomium_camera::{CameraDriver, CameraHandle, MovableEntity, RenderElement};
use gnomium_core::{Color, EntityId, LocalPose, ShadowCastingMode, Transform};
use gnomium_physics::{CharacterController, PhysicsWorld};
use rapier3d::prelude::ColliderHandle;
use tracing::info;

use crate::error::HostError;
use crate::host::SceneLocator;
use crate::painter::AppearancePainter;

const SCENE_NAMES: [&str; 2] = ["Village", "Orchard"];

/// First-person eye position relative to the actor's feet
const EYE_OFFSET: Vec3 = Vec3::new(0.0, 1.6, 0.1);
const BACKPACK_HALF_EXTENTS: Vec3 = Vec3::new(0.4, 0.5, 0.25);
const BACKPACK_OFFSET: Vec3 = Vec3::new(0.0, 1.0, -0.45);

#[derive(Clone)]
struct RendererSlot {
    name: String,
    mode: Rc<Cell<ShadowCastingMode>>,
    /// Carries the hat material
    hat: bool,
}

struct ActorState {
    id: EntityId,
    name: String,
    character: CharacterController,
    yaw_degrees: f32,
    backpack: Option<ColliderHandle>,
    renderers: Vec<RendererSlot>,
    tint: Option<Color>,
    hat_tint: Option<Color>,
}

impl ActorState {
    fn transform(&self) -> Transform {
        Transform::from_position_rotation(
            self.character.position,
            Transform::rotation_from_pitch_yaw_degrees(0.0, self.yaw_degrees),
        )
    }

    fn colliders(&self) -> Vec<ColliderHandle> {
        self.character.collider_handle.into_iter().collect()
    }

    /// Carry attached colliders along with the character
    fn sync_attachments(&self, physics: &mut PhysicsWorld) {
        if let Some(backpack) = self.backpack {
            let position = self.transform().transform_point(BACKPACK_OFFSET);
            physics.set_collider_translation(backpack, position);
        }
    }
}

struct CameraNode {
    id: EntityId,
    pose: LocalPose,
}

/// Local actor or NPC
#[derive(Clone)]
pub struct SandboxActor {
    state: Rc<RefCell<ActorState>>,
}

impl MovableEntity for SandboxActor {
    fn id(&self) -> EntityId {
        self.state.borrow().id
    }

    fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    fn transform(&self) -> Transform {
        self.state.borrow().transform()
    }

    fn velocity(&self) -> Vec3 {
        self.state.borrow().character.velocity
    }

    fn set_planar_velocity(&mut self, velocity: Vec3) {
        self.state
            .borrow_mut()
            .character
            .set_planar_velocity(velocity.x, velocity.z);
    }

    fn colliders(&self) -> Vec<ColliderHandle> {
        self.state.borrow().colliders()
    }

    fn render_elements(&self) -> Vec<Box<dyn RenderElement>> {
        self.state
            .borrow()
            .renderers
            .iter()
            .map(|slot| Box::new(SandboxRenderer(slot.clone())) as Box<dyn RenderElement>)
            .collect()
    }
}

pub struct SandboxRenderer(RendererSlot);

impl RenderElement for SandboxRenderer {
    fn name(&self) -> String {
        self.0.name.clone()
    }

    fn shadow_mode(&self) -> ShadowCastingMode {
        self.0.mode.get()
    }

    fn set_shadow_mode(&mut self, mode: ShadowCastingMode) {
        self.0.mode.set(mode);
    }
}

/// The scene camera, parented to the local actor
#[derive(Clone)]
pub struct SandboxCamera {
    node: Rc<RefCell<CameraNode>>,
    parent: Rc<RefCell<ActorState>>,
}

impl SandboxCamera {
    fn parent_transform(&self, pose: &LocalPose) -> Transform {
        let parent = self.parent.borrow();
        if pose.parent == Some(parent.id) {
            parent.transform()
        } else {
            Transform::default()
        }
    }
}

impl CameraHandle for SandboxCamera {
    fn id(&self) -> EntityId {
        self.node.borrow().id
    }

    fn local_pose(&self) -> LocalPose {
        self.node.borrow().pose
    }

    fn set_local_pose(&mut self, pose: LocalPose) {
        self.node.borrow_mut().pose = pose;
    }

    fn set_world_pose(&mut self, position: Vec3, rotation: Quat) {
        let pose = self.node.borrow().pose;
        let parent = self.parent_transform(&pose);
        self.node.borrow_mut().pose = LocalPose {
            parent: pose.parent,
            position: parent.inverse_transform_point(position),
            rotation: parent.rotation.inverse() * rotation,
        };
    }
}

/// Cinematic behavior that steers the camera in first person
#[derive(Clone)]
pub struct SandboxDriver {
    name: String,
    enabled: Rc<Cell<bool>>,
}

impl CameraDriver for SandboxDriver {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled.set(enabled);
    }
}

/// Paints the local actor. Fails once the actor's scene is unloaded.
pub struct SandboxPainter {
    actor: Weak<RefCell<ActorState>>,
}

impl SandboxPainter {
    fn with_actor<T, F: FnOnce(&mut ActorState) -> T>(&self, f: F) -> Result<T, HostError> {
        let actor = self
            .actor
            .upgrade()
            .ok_or_else(|| HostError::Painter("actor was unloaded".to_string()))?;
        let result = f(&mut actor.borrow_mut());
        Ok(result)
    }
}

impl AppearancePainter for SandboxPainter {
    fn apply_tint(&mut self, color: Color) -> Result<(), HostError> {
        self.with_actor(|actor| actor.tint = Some(color))
    }

    fn tint_hat(&mut self, color: Color) -> Result<bool, HostError> {
        self.with_actor(|actor| {
            let has_hat = actor.renderers.iter().any(|r| r.hat);
            if has_hat {
                actor.hat_tint = Some(color);
            }
            has_hat
        })
    }

    fn clear_overrides(&mut self) -> Result<(), HostError> {
        self.with_actor(|actor| {
            actor.tint = None;
            actor.hat_tint = None;
        })
    }
}

/// The scene
pub struct Sandbox {
    physics: PhysicsWorld,
    build_index: i32,
    actor: Rc<RefCell<ActorState>>,
    npcs: Vec<Rc<RefCell<ActorState>>>,
    camera: Rc<RefCell<CameraNode>>,
    driver: SandboxDriver,
}

impl Sandbox {
    pub fn new() -> Self {
        Self::build(0)
    }

    fn build(build_index: i32) -> Self {
        let mut physics = PhysicsWorld::new();
        physics.create_ground(0.0);

        // Cottage behind the spawn point
        physics.create_static_box(Vec3::new(3.0, 2.0, 1.0), Vec3::new(0.0, 2.0, -3.5));
        // Garden wall along the east side
        physics.create_static_box(Vec3::new(0.25, 1.5, 4.0), Vec3::new(4.0, 1.5, 2.0));
        // Flower pots, too small to push the camera
        for x in [-1.5, 1.5] {
            physics.create_static_box(Vec3::splat(0.15), Vec3::new(x, 0.15, 1.5));
        }
        // Doorstep trigger
        physics.create_sensor_box(Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 1.0, -1.5));

        let actor = spawn_actor(&mut physics, "Gnome_Local", Vec3::ZERO, 0.0, true);
        let npc = spawn_actor(
            &mut physics,
            "Gnome_Wanderer",
            Vec3::new(-2.5, 0.0, 3.0),
            90.0,
            false,
        );
        physics.update_queries();

        let camera = CameraNode {
            id: EntityId::new(),
            pose: LocalPose {
                parent: Some(actor.borrow().id),
                position: EYE_OFFSET,
                rotation: Quat::IDENTITY,
            },
        };

        Self {
            physics,
            build_index,
            actor,
            npcs: vec![npc],
            camera: Rc::new(RefCell::new(camera)),
            driver: SandboxDriver {
                name: "CinematicBrain".to_string(),
                enabled: Rc::new(Cell::new(true)),
            },
        }
    }

    /// Tear the scene down and load the next one
    pub fn reload(&mut self) -> (i32, String) {
        *self = Self::build(self.build_index + 1);
        info!("Sandbox loaded scene '{}'", self.scene_name());
        (self.build_index, self.scene_name().to_string())
    }

    /// Advance every character, then refresh the query structures
    pub fn step(&mut self, dt: f32) {
        for state in std::iter::once(&self.actor).chain(self.npcs.iter()) {
            let mut state = state.borrow_mut();
            state.character.update(&mut self.physics, dt);
            state.sync_attachments(&mut self.physics);
        }
        self.physics.step();
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn build_index(&self) -> i32 {
        self.build_index
    }

    pub fn scene_name(&self) -> &'static str {
        SCENE_NAMES[self.build_index.rem_euclid(SCENE_NAMES.len() as i32) as usize]
    }

    pub fn painter(&self) -> SandboxPainter {
        SandboxPainter {
            actor: Rc::downgrade(&self.actor),
        }
    }

    pub fn set_actor_yaw(&mut self, yaw_degrees: f32) {
        self.actor.borrow_mut().yaw_degrees = yaw_degrees;
        self.actor.borrow().sync_attachments(&mut self.physics);
    }

    pub fn actor_position(&self) -> Vec3 {
        self.actor.borrow().character.position
    }

    pub fn actor_velocity(&self) -> Vec3 {
        self.actor.borrow().character.velocity
    }

    pub fn actor_tint(&self) -> Option<Color> {
        self.actor.borrow().tint
    }

    pub fn actor_hat_tint(&self) -> Option<Color> {
        self.actor.borrow().hat_tint
    }

    pub fn npc_position(&self, index: usize) -> Option<Vec3> {
        self.npcs.get(index).map(|npc| npc.borrow().character.position)
    }

    pub fn camera_local_pose(&self) -> LocalPose {
        self.camera.borrow().pose
    }

    /// Camera position in world space
    pub fn camera_world_position(&self) -> Vec3 {
        let pose = self.camera_local_pose();
        self.camera_handle().parent_transform(&pose).transform_point(pose.position)
    }

    pub fn driver_enabled(&self) -> bool {
        self.driver.enabled.get()
    }

    pub fn head_shadow_mode(&self) -> Option<ShadowCastingMode> {
        self.actor
            .borrow()
            .renderers
            .iter()
            .find(|slot| slot.name.contains("Head"))
            .map(|slot| slot.mode.get())
    }

    fn camera_handle(&self) -> SandboxCamera {
        SandboxCamera {
            node: Rc::clone(&self.camera),
            parent: Rc::clone(&self.actor),
        }
    }

    fn actor_handle(state: &Rc<RefCell<ActorState>>) -> Box<dyn MovableEntity> {
        Box::new(SandboxActor {
            state: Rc::clone(state),
        })
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneLocator for Sandbox {
    fn main_camera(&mut self) -> Option<Box<dyn CameraHandle>> {
        Some(Box::new(self.camera_handle()))
    }

    fn camera_drivers(&mut self) -> Vec<Box<dyn CameraDriver>> {
        vec![Box::new(self.driver.clone())]
    }

    fn local_actor(&mut self) -> Option<Box<dyn MovableEntity>> {
        Some(Self::actor_handle(&self.actor))
    }

    fn all_actors(&mut self) -> Vec<Box<dyn MovableEntity>> {
        std::iter::once(&self.actor)
            .chain(self.npcs.iter())
            .map(Self::actor_handle)
            .collect()
    }
}

fn spawn_actor(
    physics: &mut PhysicsWorld,
    name: &str,
    position: Vec3,
    yaw_degrees: f32,
    local: bool,
) -> Rc<RefCell<ActorState>> {
    let id = EntityId::new();
    let mut character = CharacterController::new();
    character.spawn(physics, position, id);

    let mut state = ActorState {
        id,
        name: name.to_string(),
        character,
        yaw_degrees,
        backpack: None,
        renderers: vec![RendererSlot {
            name: format!("{}_Body", name),
            mode: Rc::new(Cell::new(ShadowCastingMode::On)),
            hat: false,
        }],
        tint: None,
        hat_tint: None,
    };

    if local {
        // The local player's own head is hidden from the first-person camera
        state.renderers.push(RendererSlot {
            name: format!("{}_Head", name),
            mode: Rc::new(Cell::new(ShadowCastingMode::ShadowsOnly)),
            hat: true,
        });

        let backpack = physics.create_static_box(BACKPACK_HALF_EXTENTS, Vec3::ZERO);
        physics.set_collider_owner(backpack, id);
        state.backpack = Some(backpack);
        state.sync_attachments(physics);
    }

    Rc::new(RefCell::new(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnomium_physics::SpatialQuery;

    #[test]
    fn test_locator_returns_stable_identities() {
        let mut sandbox = Sandbox::new();
        let a = sandbox.local_actor().unwrap();
        let b = sandbox.local_actor().unwrap();
        assert_eq!(a.id(), b.id());
        assert_eq!(
            sandbox.main_camera().unwrap().id(),
            sandbox.main_camera().unwrap().id()
        );
        assert_eq!(sandbox.all_actors().len(), 2);
    }

    #[test]
    fn test_backpack_is_tagged_to_actor() {
        let mut sandbox = Sandbox::new();
        let actor = sandbox.local_actor().unwrap();
        let owned = sandbox.physics().colliders_owned_by(actor.id());

        // Capsule plus backpack, but only the capsule is reported directly
        assert_eq!(owned.len(), 2);
        assert_eq!(actor.colliders().len(), 1);
    }

    #[test]
    fn test_world_pose_roundtrips_through_parent() {
        let mut sandbox = Sandbox::new();
        sandbox.set_actor_yaw(90.0);
        let mut camera = sandbox.main_camera().unwrap();

        let target = Vec3::new(-3.0, 2.5, 1.0);
        camera.set_world_pose(target, Quat::IDENTITY);
        assert!(sandbox.camera_world_position().distance(target) < 1e-4);
        assert_eq!(camera.local_pose().parent, sandbox.local_actor().map(|a| a.id()));
    }

    #[test]
    fn test_painter_fails_after_reload() {
        let mut sandbox = Sandbox::new();
        let mut painter = sandbox.painter();
        painter.apply_tint(Color::RED).unwrap();
        assert_eq!(sandbox.actor_tint(), Some(Color::RED));
        painter.clear_overrides().unwrap();
        assert_eq!(sandbox.actor_tint(), None);

        let (index, name) = sandbox.reload();
        assert_eq!(index, 1);
        assert_eq!(name, "Orchard");
        assert!(matches!(
            painter.apply_tint(Color::RED),
            Err(HostError::Painter(_))
        ));
    }

    #[test]
    fn test_hat_tint_lands_on_head() {
        let sandbox = Sandbox::new();
        let mut painter = sandbox.painter();
        assert!(painter.tint_hat(Color::BLUE).unwrap());
        assert_eq!(sandbox.actor_hat_tint(), Some(Color::BLUE));
        assert_eq!(sandbox.actor_tint(), None);

        painter.apply_tint(Color::RED).unwrap();
        painter.clear_overrides().unwrap();
        assert_eq!(sandbox.actor_hat_tint(), None);
        assert_eq!(sandbox.actor_tint(), None);
    }

    #[test]
    fn test_sensor_does_not_block_camera() {
        let sandbox = Sandbox::new();
        let mut hits = Vec::new();
        sandbox.physics().overlap_sphere(
            Vec3::new(0.0, 1.0, -1.5),
            0.22,
            gnomium_physics::CollisionMask::ALL,
            &mut hits,
        );
        assert!(hits.is_empty());
    }
}
