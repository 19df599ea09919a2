//! In-memory backends
//!
//! Record everything they are told so tests and the demo application can
//! inspect poses, parents, forces and shadow registrations without a GPU or
//! a physics engine. `HeadlessPhysics` integrates bodies with semi-implicit
//! Euler so attractor forces visibly move things.

use std::any::Any;
use std::collections::HashMap;
use std::task::Poll;

use futures::FutureExt;

use super::{
    BackendError, BackendFuture, BackendResult, BodyDesc, BodyHandle, CameraHandle, LightBackend,
    LightDesc, LightHandle, MeshDesc, MeshHandle, MotionType, PhysicsBackend, PhysicsLoader,
    RenderBackend, ShadowGeneratorHandle, ShadowSettings, ShapeType,
};
use crate::foundation::math::{Transform, Vec3};

/// Mesh state held by [`HeadlessRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRecord {
    /// Display name
    pub name: String,
    /// Primitive shape
    pub shape: ShapeType,
    /// Last pose pushed
    pub pose: Transform,
    /// Render-hierarchy parent
    pub parent: Option<MeshHandle>,
}

/// A debug line segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    /// Start point
    pub from: Vec3,
    /// End point
    pub to: Vec3,
    /// RGB colour
    pub colour: Vec3,
}

/// Render backend that keeps meshes and cameras in hash maps
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    next_id: u64,
    meshes: HashMap<MeshHandle, MeshRecord>,
    cameras: HashMap<CameraHandle, Vec3>,
    glow_enabled: bool,
    pending_lines: Vec<DebugLine>,
    last_frame_lines: Vec<DebugLine>,
    frames: u64,
    fail_mesh_creation: bool,
}

impl HeadlessRenderer {
    /// Create an empty renderer
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `create_mesh` fail
    pub fn with_failing_meshes(mut self) -> Self {
        self.fail_mesh_creation = true;
        self
    }

    /// Mesh state, if the handle is live
    pub fn mesh(&self, mesh: MeshHandle) -> Option<&MeshRecord> {
        self.meshes.get(&mesh)
    }

    /// Number of live meshes
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Camera position, if the handle is live
    pub fn camera_position(&self, camera: CameraHandle) -> Option<Vec3> {
        self.cameras.get(&camera).copied()
    }

    /// Whether the glow layer is on
    pub const fn glow_enabled(&self) -> bool {
        self.glow_enabled
    }

    /// Debug lines submitted during the last completed frame
    pub fn last_frame_lines(&self) -> &[DebugLine] {
        &self.last_frame_lines
    }

    /// Completed frames
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderBackend for HeadlessRenderer {
    fn create_mesh(&mut self, desc: &MeshDesc) -> BackendResult<MeshHandle> {
        if self.fail_mesh_creation {
            return Err(BackendError::ResourceCreation(format!("mesh '{}'", desc.name)));
        }
        let handle = MeshHandle(self.allocate());
        self.meshes.insert(
            handle,
            MeshRecord {
                name: desc.name.clone(),
                shape: desc.shape,
                pose: desc.pose,
                parent: None,
            },
        );
        Ok(handle)
    }

    fn destroy_mesh(&mut self, mesh: MeshHandle) {
        if self.meshes.remove(&mesh).is_none() {
            log::debug!("HeadlessRenderer: destroy of unknown {}", mesh);
        }
        for record in self.meshes.values_mut() {
            if record.parent == Some(mesh) {
                record.parent = None;
            }
        }
    }

    fn set_mesh_pose(&mut self, mesh: MeshHandle, pose: &Transform) {
        if let Some(record) = self.meshes.get_mut(&mesh) {
            record.pose = *pose;
        }
    }

    fn mesh_pose(&self, mesh: MeshHandle) -> Option<Transform> {
        self.meshes.get(&mesh).map(|record| record.pose)
    }

    fn set_mesh_parent(&mut self, mesh: MeshHandle, parent: Option<MeshHandle>) {
        if let Some(record) = self.meshes.get_mut(&mesh) {
            record.parent = parent;
        }
    }

    fn create_camera(&mut self, _name: &str, position: Vec3) -> BackendResult<CameraHandle> {
        let handle = CameraHandle(self.allocate());
        self.cameras.insert(handle, position);
        Ok(handle)
    }

    fn set_camera_position(&mut self, camera: CameraHandle, position: Vec3) {
        if let Some(slot) = self.cameras.get_mut(&camera) {
            *slot = position;
        }
    }

    fn set_glow_enabled(&mut self, enabled: bool) {
        self.glow_enabled = enabled;
    }

    fn submit_debug_line(&mut self, from: Vec3, to: Vec3, colour: Vec3) {
        self.pending_lines.push(DebugLine { from, to, colour });
    }

    fn end_frame(&mut self) {
        self.last_frame_lines = std::mem::take(&mut self.pending_lines);
        self.frames += 1;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Light state held by [`HeadlessLights`]
#[derive(Debug, Clone, PartialEq)]
pub struct LightRecord {
    /// Creation parameters
    pub desc: LightDesc,
    /// Last position pushed
    pub position: Vec3,
    /// Last direction pushed
    pub direction: Vec3,
    /// Mesh the light is attached to
    pub parent: Option<MeshHandle>,
    /// On/off
    pub enabled: bool,
}

/// Shadow generator state held by [`HeadlessLights`]
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowGeneratorRecord {
    /// Light casting the shadows
    pub light: LightHandle,
    /// Parameters it was created with
    pub settings: ShadowSettings,
    /// Registered casters, in registration order
    pub casters: Vec<MeshHandle>,
}

/// Light backend that keeps lights and shadow generators in hash maps
#[derive(Debug, Default)]
pub struct HeadlessLights {
    next_id: u64,
    lights: HashMap<LightHandle, LightRecord>,
    generators: HashMap<ShadowGeneratorHandle, ShadowGeneratorRecord>,
}

impl HeadlessLights {
    /// Create an empty light backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Light state, if the handle is live
    pub fn light(&self, light: LightHandle) -> Option<&LightRecord> {
        self.lights.get(&light)
    }

    /// Number of live lights
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Shadow generator state, if the handle is live
    pub fn shadow_generator(&self, generator: ShadowGeneratorHandle) -> Option<&ShadowGeneratorRecord> {
        self.generators.get(&generator)
    }

    /// Number of live shadow generators
    pub fn shadow_generator_count(&self) -> usize {
        self.generators.len()
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl LightBackend for HeadlessLights {
    fn create_light(&mut self, desc: &LightDesc) -> BackendResult<LightHandle> {
        let handle = LightHandle(self.allocate());
        self.lights.insert(
            handle,
            LightRecord {
                desc: desc.clone(),
                position: desc.position,
                direction: desc.direction,
                parent: None,
                enabled: true,
            },
        );
        Ok(handle)
    }

    fn destroy_light(&mut self, light: LightHandle) {
        self.lights.remove(&light);
        self.generators.retain(|_, generator| generator.light != light);
    }

    fn set_light_position(&mut self, light: LightHandle, position: Vec3) {
        if let Some(record) = self.lights.get_mut(&light) {
            record.position = position;
        }
    }

    fn set_light_direction(&mut self, light: LightHandle, direction: Vec3) {
        if let Some(record) = self.lights.get_mut(&light) {
            record.direction = direction;
        }
    }

    fn set_light_parent(&mut self, light: LightHandle, parent: Option<MeshHandle>) {
        if let Some(record) = self.lights.get_mut(&light) {
            record.parent = parent;
        }
    }

    fn set_light_enabled(&mut self, light: LightHandle, enabled: bool) {
        if let Some(record) = self.lights.get_mut(&light) {
            record.enabled = enabled;
        }
    }

    fn create_shadow_generator(
        &mut self,
        light: LightHandle,
        settings: &ShadowSettings,
    ) -> BackendResult<ShadowGeneratorHandle> {
        let Some(record) = self.lights.get(&light) else {
            return Err(BackendError::UnknownHandle(light.to_string()));
        };
        if !record.desc.light_type.casts_shadows() {
            return Err(BackendError::ResourceCreation(format!(
                "{:?} lights cannot cast shadows",
                record.desc.light_type
            )));
        }

        let handle = ShadowGeneratorHandle(self.allocate());
        self.generators.insert(
            handle,
            ShadowGeneratorRecord {
                light,
                settings: settings.clone(),
                casters: Vec::new(),
            },
        );
        Ok(handle)
    }

    fn destroy_shadow_generator(&mut self, generator: ShadowGeneratorHandle) {
        self.generators.remove(&generator);
    }

    fn add_shadow_caster(&mut self, generator: ShadowGeneratorHandle, mesh: MeshHandle) {
        if let Some(record) = self.generators.get_mut(&generator) {
            record.casters.push(mesh);
        }
    }

    fn remove_shadow_caster(&mut self, generator: ShadowGeneratorHandle, mesh: MeshHandle) {
        if let Some(record) = self.generators.get_mut(&generator) {
            record.casters.retain(|&caster| caster != mesh);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Body state held by [`HeadlessPhysics`]
#[derive(Debug, Clone, PartialEq)]
pub struct BodyRecord {
    /// Creation parameters
    pub desc: BodyDesc,
    /// Current pose
    pub pose: Transform,
    /// Linear velocity
    pub velocity: Vec3,
    /// Force accumulated for the next step
    pub accumulated_force: Vec3,
    /// Whether the body is simulated
    pub enabled: bool,
}

impl BodyRecord {
    fn integrates(&self) -> bool {
        self.enabled && self.desc.motion == MotionType::Dynamic && self.desc.mass > 0.0
    }
}

/// One recorded force or impulse application
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedForce {
    /// Target body
    pub body: BodyHandle,
    /// Force or impulse vector
    pub force: Vec3,
    /// World-space application point
    pub point: Vec3,
}

/// Physics backend with point-mass bodies and semi-implicit Euler integration
#[derive(Debug, Default)]
pub struct HeadlessPhysics {
    next_id: u64,
    bodies: HashMap<BodyHandle, BodyRecord>,
    gravity: Vec3,
    forces: Vec<AppliedForce>,
    impulses: Vec<AppliedForce>,
    steps: u64,
    reject_bodies: bool,
}

impl HeadlessPhysics {
    /// Create an empty world with zero gravity
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `create_body` fail
    pub fn with_rejected_bodies(mut self) -> Self {
        self.reject_bodies = true;
        self
    }

    /// Loader whose future resolves on its first poll
    pub fn loader() -> PhysicsLoader {
        Box::new(|| -> BackendFuture {
            async { Ok::<_, BackendError>(Box::new(Self::new()) as Box<dyn PhysicsBackend>) }.boxed_local()
        })
    }

    /// Loader whose future stays pending for `polls` polls before resolving
    pub fn deferred_loader(polls: u32) -> PhysicsLoader {
        Box::new(move || Self::deferred(polls, Self::new()))
    }

    /// Loader whose future always fails with `reason`
    pub fn failing_loader(reason: impl Into<String>) -> PhysicsLoader {
        let reason = reason.into();
        Box::new(move || -> BackendFuture {
            let reason = reason.clone();
            async move { Err::<Box<dyn PhysicsBackend>, _>(BackendError::BringUpFailed(reason)) }.boxed_local()
        })
    }

    /// Future that yields `polls` times, then resolves to `backend`
    pub fn deferred(polls: u32, backend: Self) -> BackendFuture {
        let mut remaining = polls;
        async move {
            futures::future::poll_fn(|cx| {
                if remaining == 0 {
                    Poll::Ready(())
                } else {
                    remaining -= 1;
                    cx.waker().wake_by_ref();
                    Poll::Pending
                }
            })
            .await;
            Ok::<_, BackendError>(Box::new(backend) as Box<dyn PhysicsBackend>)
        }
        .boxed_local()
    }

    /// Body state, if the handle is live
    pub fn body(&self, body: BodyHandle) -> Option<&BodyRecord> {
        self.bodies.get(&body)
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Every force applied since the last [`clear_records`](Self::clear_records)
    pub fn applied_forces(&self) -> &[AppliedForce] {
        &self.forces
    }

    /// Every impulse applied since the last [`clear_records`](Self::clear_records)
    pub fn applied_impulses(&self) -> &[AppliedForce] {
        &self.impulses
    }

    /// Forget recorded forces and impulses
    pub fn clear_records(&mut self) {
        self.forces.clear();
        self.impulses.clear();
    }

    /// World gravity
    pub const fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Completed steps
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl PhysicsBackend for HeadlessPhysics {
    fn create_body(&mut self, desc: &BodyDesc, pose: &Transform) -> BackendResult<BodyHandle> {
        if self.reject_bodies {
            return Err(BackendError::ResourceCreation(format!("{:?} body", desc.shape)));
        }
        let handle = BodyHandle(self.allocate());
        self.bodies.insert(
            handle,
            BodyRecord {
                desc: *desc,
                pose: *pose,
                velocity: Vec3::zeros(),
                accumulated_force: Vec3::zeros(),
                enabled: true,
            },
        );
        Ok(handle)
    }

    fn destroy_body(&mut self, body: BodyHandle) {
        self.bodies.remove(&body);
    }

    fn set_body_enabled(&mut self, body: BodyHandle, enabled: bool) {
        if let Some(record) = self.bodies.get_mut(&body) {
            record.enabled = enabled;
        }
    }

    fn apply_force(&mut self, body: BodyHandle, force: Vec3, point: Vec3) {
        if let Some(record) = self.bodies.get_mut(&body) {
            record.accumulated_force += force;
            self.forces.push(AppliedForce { body, force, point });
        }
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3, point: Vec3) {
        if let Some(record) = self.bodies.get_mut(&body) {
            if record.integrates() {
                record.velocity += impulse / record.desc.mass;
            }
            self.impulses.push(AppliedForce { body, force: impulse, point });
        }
    }

    fn body_pose(&self, body: BodyHandle) -> Option<Transform> {
        self.bodies.get(&body).map(|record| record.pose)
    }

    fn set_body_pose(&mut self, body: BodyHandle, pose: &Transform) {
        if let Some(record) = self.bodies.get_mut(&body) {
            record.pose = *pose;
        }
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    fn step(&mut self, dt: f32) {
        let gravity = self.gravity;
        for record in self.bodies.values_mut() {
            if record.integrates() {
                let acceleration = record.accumulated_force / record.desc.mass + gravity;
                record.velocity += acceleration * dt;
                record.pose.position += record.velocity * dt;
            }
            record.accumulated_force = Vec3::zeros();
        }
        self.steps += 1;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::PhysicsShape;
    use approx::assert_relative_eq;

    fn dynamic(mass: f32) -> BodyDesc {
        BodyDesc {
            shape: PhysicsShape::Sphere,
            motion: MotionType::Dynamic,
            mass,
            restitution: 1.0,
        }
    }

    #[test]
    fn test_step_integrates_accumulated_force() {
        let mut physics = HeadlessPhysics::new();
        let body = physics.create_body(&dynamic(2.0), &Transform::identity()).unwrap();

        physics.apply_force(body, Vec3::new(4.0, 0.0, 0.0), Vec3::zeros());
        physics.step(0.5);

        let record = physics.body(body).unwrap();
        // a = 2, v = 1, x = 0.5
        assert_relative_eq!(record.velocity, Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(record.pose.position, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(record.accumulated_force, Vec3::zeros());
        assert_eq!(physics.applied_forces().len(), 1);
    }

    #[test]
    fn test_disabled_and_static_bodies_do_not_move() {
        let mut physics = HeadlessPhysics::new();
        physics.set_gravity(Vec3::new(0.0, -9.81, 0.0));
        let disabled = physics.create_body(&dynamic(1.0), &Transform::identity()).unwrap();
        let fixed = physics
            .create_body(&BodyDesc { motion: MotionType::Static, ..dynamic(1.0) }, &Transform::identity())
            .unwrap();
        physics.set_body_enabled(disabled, false);

        physics.step(1.0);

        assert_eq!(physics.body_pose(disabled).unwrap().position, Vec3::zeros());
        assert_eq!(physics.body_pose(fixed).unwrap().position, Vec3::zeros());
    }

    #[test]
    fn test_rejected_bodies_report_resource_error() {
        let mut physics = HeadlessPhysics::new().with_rejected_bodies();
        let result = physics.create_body(&dynamic(1.0), &Transform::identity());
        assert!(matches!(result, Err(BackendError::ResourceCreation(_))));
    }

    #[test]
    fn test_renderer_records_frames_and_parents() {
        let mut renderer = HeadlessRenderer::new();
        let desc = MeshDesc {
            name: "a".into(),
            shape: ShapeType::Box,
            size: 1.0,
            pose: Transform::identity(),
        };
        let parent = renderer.create_mesh(&desc).unwrap();
        let child = renderer.create_mesh(&desc).unwrap();
        renderer.set_mesh_parent(child, Some(parent));
        renderer.submit_debug_line(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        renderer.end_frame();

        assert_eq!(renderer.mesh(child).unwrap().parent, Some(parent));
        assert_eq!(renderer.last_frame_lines().len(), 1);

        renderer.destroy_mesh(parent);
        renderer.end_frame();
        assert_eq!(renderer.mesh(child).unwrap().parent, None);
        assert!(renderer.last_frame_lines().is_empty());
        assert_eq!(renderer.frames(), 2);
    }

    #[test]
    fn test_deferred_future_resolves_after_polls() {
        let mut future = HeadlessPhysics::deferred(2, HeadlessPhysics::new());
        let waker = futures::task::noop_waker_ref();
        let mut cx = std::task::Context::from_waker(waker);

        assert!(future.poll_unpin(&mut cx).is_pending());
        assert!(future.poll_unpin(&mut cx).is_pending());
        assert!(matches!(future.poll_unpin(&mut cx), Poll::Ready(Ok(_))));
    }
}
