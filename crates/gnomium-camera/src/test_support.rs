//! In-memory scene handles for rig tests

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::{Quat, Vec3};
use gnomium_core::{EntityId, LocalPose, ShadowCastingMode, Transform};
use gnomium_physics::{ColliderInfo, CollisionMask, SpatialQuery, SphereCastHit, OVERLAP_CAPACITY};
use rapier3d::prelude::ColliderHandle;

use crate::handles::{CameraDriver, CameraHandle, MovableEntity, RenderElement};

pub fn collider(index: u32, owner: Option<EntityId>, bounds_size: Vec3) -> ColliderInfo {
    ColliderInfo {
        handle: ColliderHandle::from_raw_parts(index, 0),
        owner,
        bounds_size,
    }
}

#[derive(Clone)]
pub struct FakeRenderer {
    name: String,
    mode: Rc<Cell<ShadowCastingMode>>,
}

impl RenderElement for FakeRenderer {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn shadow_mode(&self) -> ShadowCastingMode {
        self.mode.get()
    }

    fn set_shadow_mode(&mut self, mode: ShadowCastingMode) {
        self.mode.set(mode);
    }
}

#[derive(Clone)]
pub struct FakeActor {
    id: EntityId,
    transform: Rc<Cell<Transform>>,
    velocity: Rc<Cell<Vec3>>,
    children: Vec<EntityId>,
    colliders: Vec<ColliderHandle>,
    renderers: Vec<FakeRenderer>,
}

impl FakeActor {
    pub fn new() -> Self {
        Self::with_id(EntityId::new())
    }

    pub fn with_id(id: EntityId) -> Self {
        Self {
            id,
            transform: Rc::new(Cell::new(Transform::default())),
            velocity: Rc::new(Cell::new(Vec3::ZERO)),
            children: Vec::new(),
            colliders: Vec::new(),
            renderers: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: EntityId) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_collider(mut self, handle: ColliderHandle) -> Self {
        self.colliders.push(handle);
        self
    }

    pub fn with_renderer(mut self, name: &str, mode: ShadowCastingMode) -> Self {
        self.renderers.push(FakeRenderer {
            name: name.to_string(),
            mode: Rc::new(Cell::new(mode)),
        });
        self
    }

    pub fn renderer(&self, name: &str) -> Option<FakeRenderer> {
        self.renderers.iter().find(|r| r.name == name).cloned()
    }

    pub fn set_transform(&self, transform: Transform) {
        self.transform.set(transform);
    }
}

impl MovableEntity for FakeActor {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> String {
        "fake-actor".to_string()
    }

    fn transform(&self) -> Transform {
        self.transform.get()
    }

    fn velocity(&self) -> Vec3 {
        self.velocity.get()
    }

    fn set_planar_velocity(&mut self, velocity: Vec3) {
        let current = self.velocity.get();
        self.velocity.set(Vec3::new(velocity.x, current.y, velocity.z));
    }

    fn contains(&self, entity: EntityId) -> bool {
        entity == self.id || self.children.contains(&entity)
    }

    fn colliders(&self) -> Vec<ColliderHandle> {
        self.colliders.clone()
    }

    fn render_elements(&self) -> Vec<Box<dyn RenderElement>> {
        self.renderers
            .iter()
            .map(|r| Box::new(r.clone()) as Box<dyn RenderElement>)
            .collect()
    }
}

#[derive(Default)]
struct FakeCameraState {
    local: LocalPose,
    world: Option<(Vec3, Quat)>,
}

/// Camera whose parent is treated as the world origin
#[derive(Clone)]
pub struct FakeCamera {
    id: EntityId,
    state: Rc<RefCell<FakeCameraState>>,
}

impl FakeCamera {
    pub fn new(local: LocalPose) -> Self {
        Self {
            id: EntityId::new(),
            state: Rc::new(RefCell::new(FakeCameraState { local, world: None })),
        }
    }

    pub fn world_pose(&self) -> Option<(Vec3, Quat)> {
        self.state.borrow().world
    }
}

impl CameraHandle for FakeCamera {
    fn id(&self) -> EntityId {
        self.id
    }

    fn local_pose(&self) -> LocalPose {
        self.state.borrow().local
    }

    fn set_local_pose(&mut self, pose: LocalPose) {
        self.state.borrow_mut().local = pose;
    }

    fn set_world_pose(&mut self, position: Vec3, rotation: Quat) {
        let mut state = self.state.borrow_mut();
        state.world = Some((position, rotation));
        state.local.position = position;
        state.local.rotation = rotation;
    }
}

#[derive(Clone)]
pub struct FakeDriver {
    name: String,
    enabled: Rc<Cell<bool>>,
}

impl FakeDriver {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: Rc::new(Cell::new(true)),
        }
    }
}

impl CameraDriver for FakeDriver {
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

/// Query that reports whatever the test scripted, ignoring geometry
#[derive(Default)]
pub struct ScriptedQuery {
    overlaps: RefCell<Vec<ColliderInfo>>,
    hit: Cell<Option<SphereCastHit>>,
    casts: Cell<u32>,
    last_cast: Cell<Option<(Vec3, Vec3, f32)>>,
}

impl ScriptedQuery {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set_overlaps(&self, overlaps: Vec<ColliderInfo>) {
        *self.overlaps.borrow_mut() = overlaps;
    }

    pub fn set_hit(&self, hit: Option<SphereCastHit>) {
        self.hit.set(hit);
    }

    pub fn cast_calls(&self) -> u32 {
        self.casts.get()
    }

    pub fn last_cast(&self) -> Option<(Vec3, Vec3, f32)> {
        self.last_cast.get()
    }
}

impl SpatialQuery for ScriptedQuery {
    fn overlap_sphere(
        &self,
        _center: Vec3,
        _radius: f32,
        _mask: CollisionMask,
        out: &mut Vec<ColliderInfo>,
    ) {
        out.clear();
        out.extend(self.overlaps.borrow().iter().take(OVERLAP_CAPACITY).copied());
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        _radius: f32,
        direction: Vec3,
        max_distance: f32,
        _mask: CollisionMask,
        accept: &dyn Fn(&ColliderInfo) -> bool,
    ) -> Option<SphereCastHit> {
        self.casts.set(self.casts.get() + 1);
        self.last_cast.set(Some((origin, direction, max_distance)));
        self.hit
            .get()
            .filter(|hit| hit.distance <= max_distance && accept(&hit.collider))
    }
}
