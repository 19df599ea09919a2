//! Debug gizmo drawing an object's local axes every tick

use std::any::Any;

use crate::ecs::component::{CustomComponent, UpdateContext};
use crate::foundation::math::Vec3;

const RED: Vec3 = Vec3::new(1.0, 0.0, 0.0);
const GREEN: Vec3 = Vec3::new(0.0, 1.0, 0.0);
const BLUE: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// Axis segments computed on the last update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugAxes {
    /// World position of the owner
    pub origin: Vec3,
    /// End of the up segment
    pub up: Vec3,
    /// End of the forward segment
    pub forward: Vec3,
    /// End of the right segment
    pub right: Vec3,
}

/// Submits up (green), forward (blue) and right (red) lines from the owner's
/// world position, each `size * length_multiplier` long.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugTransform {
    /// Segment length relative to the owner's size
    pub length_multiplier: f32,
    last_axes: Option<DebugAxes>,
}

impl Default for DebugTransform {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl DebugTransform {
    /// Kind name used for lookup
    pub const KIND: &'static str = "DebugTransform";

    /// Create a gizmo
    pub fn new(length_multiplier: f32) -> Self {
        Self {
            length_multiplier,
            last_axes: None,
        }
    }

    /// Axes submitted on the last update
    pub const fn last_axes(&self) -> Option<DebugAxes> {
        self.last_axes
    }
}

impl CustomComponent for DebugTransform {
    fn kind_name(&self) -> &'static str {
        Self::KIND
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>, _dt: f32) {
        let length = ctx.transform.size() * self.length_multiplier;
        let origin = ctx.world.position;
        let axes = DebugAxes {
            origin,
            up: origin + ctx.world.rotate_direction(Vec3::y(), Vec3::y()) * length,
            forward: origin + ctx.world.rotate_direction(Vec3::z(), Vec3::z()) * length,
            right: origin + ctx.world.rotate_direction(Vec3::x(), Vec3::x()) * length,
        };

        let renderer = &mut ctx.services.renderer;
        renderer.submit_debug_line(origin, axes.up, GREEN);
        renderer.submit_debug_line(origin, axes.forward, BLUE);
        renderer.submit_debug_line(origin, axes.right, RED);
        self.last_axes = Some(axes);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
