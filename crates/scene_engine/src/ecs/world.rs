//! Game object arena and hierarchy
//!
//! Objects live in a generational slot map keyed by [`GameObjectId`]. The
//! world owns the parent/child links and resolves world transforms on
//! demand; nothing is cached, so a transform read always reflects the
//! current local state of the whole chain.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use super::commands::{Command, CommandQueue};
use super::component::Component;
use super::components::TransformComponent;
use super::entity::GameObjectId;
use super::game_object::{GameObject, GameObjectError};
use crate::backend::EngineServices;
use crate::foundation::math::{self, Transform};

/// How a child's world transform is derived from its ancestors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformComposition {
    /// Positions and rotations summed along the chain, scale taken from the
    /// root-most ancestor. Matches the scenes this layer was built for.
    #[default]
    Additive,
    /// Proper parent-space composition (parent * child)
    Hierarchical,
}

/// Arena of game objects
#[derive(Debug, Default)]
pub struct World {
    objects: SlotMap<GameObjectId, GameObject>,
    composition: TransformComposition,
}

impl World {
    /// Create an empty world using additive composition
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty world with the given composition rule
    pub fn with_composition(composition: TransformComposition) -> Self {
        Self {
            objects: SlotMap::with_key(),
            composition,
        }
    }

    /// Composition rule used by [`world_transform`](Self::world_transform)
    pub const fn composition(&self) -> TransformComposition {
        self.composition
    }

    /// Create an object with no components
    pub fn create_game_object(&mut self, name: impl Into<String>, transform: TransformComponent) -> GameObjectId {
        let name = name.into();
        self.objects
            .insert_with_key(|id| GameObject::new(id, name, transform))
    }

    /// Borrow an object
    pub fn get(&self, id: GameObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    /// Mutably borrow an object
    pub fn get_mut(&mut self, id: GameObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(id)
    }

    /// Whether `id` names a live object
    pub fn contains(&self, id: GameObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if the world has no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over every object
    pub fn iter(&self) -> impl Iterator<Item = (GameObjectId, &GameObject)> {
        self.objects.iter()
    }

    fn get_or_err(&mut self, id: GameObjectId) -> Result<&mut GameObject, GameObjectError> {
        self.objects.get_mut(id).ok_or(GameObjectError::UnknownObject(id))
    }

    /// Attach a component to an object
    pub fn add_component(
        &mut self,
        id: GameObjectId,
        component: impl Into<Component>,
        services: &mut EngineServices,
    ) -> Result<(), GameObjectError> {
        self.get_or_err(id)?.add_component(component, services)
    }

    /// Parent `child` under `parent`.
    ///
    /// Links the render hierarchy when both carry a mesh; a light on the
    /// child is attached to the child's mesh and switched on.
    pub fn add_child(
        &mut self,
        parent: GameObjectId,
        child: GameObjectId,
        services: &mut EngineServices,
    ) -> Result<(), GameObjectError> {
        if parent == child {
            return Err(GameObjectError::SelfParenting(parent));
        }
        if !self.contains(parent) {
            return Err(GameObjectError::UnknownObject(parent));
        }
        if let Some(existing) = self.get_or_err(child)?.parent {
            return Err(GameObjectError::AlreadyParented { child, parent: existing });
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(GameObjectError::CyclicHierarchy { parent, child });
        }

        self.get_or_err(parent)?.children.push(child);
        self.get_or_err(child)?.parent = Some(parent);

        let parent_mesh = self.get(parent).and_then(|p| p.mesh()).map(|m| m.mesh());
        if let Some(child_obj) = self.get(child) {
            let child_mesh = child_obj.mesh().map(|m| m.mesh());
            if let (Some(child_mesh), Some(parent_mesh)) = (child_mesh, parent_mesh) {
                services.renderer.set_mesh_parent(child_mesh, Some(parent_mesh));
            }
            if let Some(light) = child_obj.light() {
                match child_mesh {
                    Some(child_mesh) => {
                        services.lights.set_light_parent(light.light(), Some(child_mesh));
                        services.lights.set_light_enabled(light.light(), true);
                    }
                    None => log::debug!("World: child {:?} has a light but no mesh to attach it to", child),
                }
            }
        }
        Ok(())
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: GameObjectId) -> impl Iterator<Item = GameObjectId> + '_ {
        std::iter::successors(self.get(id).and_then(GameObject::parent), move |&current| {
            self.get(current).and_then(GameObject::parent)
        })
    }

    /// `id` followed by all its descendants, depth first
    pub fn subtree(&self, id: GameObjectId) -> Vec<GameObjectId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(object) = self.get(current) {
                result.push(current);
                stack.extend(object.children.iter().rev());
            }
        }
        result
    }

    /// World transform using the configured composition rule
    pub fn world_transform(&self, id: GameObjectId) -> Option<Transform> {
        match self.composition {
            TransformComposition::Additive => self.world_transform_additive(id),
            TransformComposition::Hierarchical => self.world_transform_composed(id),
        }
    }

    /// Positions and rotations summed along the parent chain; scale of the
    /// root-most ancestor. An unparented object yields its local transform
    /// exactly.
    pub fn world_transform_additive(&self, id: GameObjectId) -> Option<Transform> {
        let object = self.get(id)?;
        let mut result = object.transform().to_math_transform();
        if object.parent().is_none() {
            return Some(result);
        }

        let mut rotation_sum = result.rotation.into_inner();
        for ancestor in self.ancestors(id) {
            let Some(ancestor) = self.get(ancestor) else {
                break;
            };
            let local = ancestor.transform();
            result.position += local.position();
            rotation_sum += local.rotation().into_inner();
            result.scale = local.scale();
        }
        result.rotation = math::normalize_quaternion(rotation_sum);
        Some(result)
    }

    /// Proper hierarchical composition: root * ... * parent * local
    pub fn world_transform_composed(&self, id: GameObjectId) -> Option<Transform> {
        let object = self.get(id)?;
        let local = object.transform().to_math_transform();
        match object.parent() {
            Some(parent) => Some(self.world_transform_composed(parent)?.combine(&local)),
            None => Some(local),
        }
    }

    /// Destroy `id` and its descendants, releasing their backend resources.
    ///
    /// Returns the destroyed ids, root first.
    pub fn destroy(&mut self, id: GameObjectId, services: &mut EngineServices) -> Vec<GameObjectId> {
        let doomed = self.subtree(id);

        if let Some(parent) = self.get(id).and_then(GameObject::parent) {
            if let Some(parent) = self.objects.get_mut(parent) {
                parent.children.retain(|&child| child != id);
            }
        }

        for &victim in &doomed {
            if let Some(mut object) = self.objects.remove(victim) {
                object.release_resources(services);
                log::debug!("World: destroyed '{}' ({:?})", object.name(), victim);
            }
        }
        doomed
    }

    /// Apply queued commands in order. Failures are logged and skipped.
    ///
    /// Returns how many commands were applied.
    pub fn apply_commands(&mut self, queue: &mut CommandQueue, services: &mut EngineServices) -> usize {
        let mut applied = 0;
        for command in queue.take() {
            let result = match command {
                Command::AddComponent { target, component } => self.add_component(target, component, services),
                Command::AddChild { parent, child } => self.add_child(parent, child, services),
                Command::SetPosition { target, position } => {
                    self.get_or_err(target).map(|o| o.transform_mut().set_position(position))
                }
                Command::SetRotation { target, rotation } => {
                    self.get_or_err(target).map(|o| o.transform_mut().set_rotation(rotation))
                }
                Command::SetScale { target, scale } => {
                    self.get_or_err(target).map(|o| o.transform_mut().set_scale(scale))
                }
            };
            match result {
                Ok(()) => applied += 1,
                Err(e) => log::warn!("World: deferred command skipped: {}", e),
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::{HeadlessLights, HeadlessRenderer};
    use crate::backend::{LightDesc, MeshDesc, ShapeType};
    use crate::ecs::components::{LightComponent, LightType, MeshComponent};
    use crate::foundation::math::{constants::HALF_PI, Quat, Vec3};
    use approx::assert_relative_eq;

    fn spawn_mesh(world: &mut World, services: &mut EngineServices, position: Vec3) -> GameObjectId {
        let desc = MeshDesc {
            name: "mesh".into(),
            shape: ShapeType::Box,
            size: 1.0,
            pose: Transform::from_position(position),
        };
        let mesh = services.renderer.create_mesh(&desc).unwrap();
        let id = world.create_game_object("mesh", TransformComponent::from_position(position));
        world.add_component(id, MeshComponent::new(mesh), services).unwrap();
        id
    }

    #[test]
    fn test_unparented_world_transform_is_local() {
        let mut world = World::new();
        let transform = TransformComponent::from_position(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(Quat::from_axis_angle(&Vec3::x_axis(), 0.7))
            .with_scale(Vec3::new(1.0, 2.0, 3.0));
        let id = world.create_game_object("solo", transform.clone());

        assert_eq!(world.world_transform(id), Some(transform.to_math_transform()));
        assert_eq!(world.world_transform_composed(id), Some(transform.to_math_transform()));
    }

    #[test]
    fn test_additive_chain_sums_positions_and_takes_root_scale() {
        let mut world = World::new();
        let mut services = EngineServices::headless();
        let root = world.create_game_object(
            "root",
            TransformComponent::from_position(Vec3::new(1.0, 0.0, 0.0)).with_uniform_scale(3.0),
        );
        let middle = world.create_game_object("middle", TransformComponent::from_position(Vec3::new(0.0, 2.0, 0.0)));
        let leaf = world.create_game_object(
            "leaf",
            TransformComponent::from_position(Vec3::new(0.0, 0.0, 4.0)).with_uniform_scale(0.5),
        );
        world.add_child(root, middle, &mut services).unwrap();
        world.add_child(middle, leaf, &mut services).unwrap();

        let world_transform = world.world_transform(leaf).unwrap();
        assert_relative_eq!(world_transform.position, Vec3::new(1.0, 2.0, 4.0));
        assert_relative_eq!(world_transform.scale, Vec3::new(3.0, 3.0, 3.0));
        assert_relative_eq!(world_transform.rotation, Quat::identity(), epsilon = 1e-6);
    }

    #[test]
    fn test_additive_opposite_rotations_fall_back_to_identity() {
        let mut world = World::new();
        let mut services = EngineServices::headless();
        let q = Quat::from_axis_angle(&Vec3::y_axis(), HALF_PI);
        let parent = world.create_game_object("p", TransformComponent::identity().with_rotation(q));
        let child = world.create_game_object(
            "c",
            TransformComponent::identity().with_rotation(Quat::new_unchecked(-q.into_inner())),
        );
        world.add_child(parent, child, &mut services).unwrap();

        let rotation = world.world_transform(child).unwrap().rotation;
        assert_relative_eq!(rotation, Quat::identity(), epsilon = 1e-6);
    }

    #[test]
    fn test_hierarchical_composition() {
        let mut world = World::with_composition(TransformComposition::Hierarchical);
        let mut services = EngineServices::headless();
        let parent = world.create_game_object(
            "p",
            TransformComponent::from_position(Vec3::new(1.0, 0.0, 0.0))
                .with_rotation(Quat::from_axis_angle(&Vec3::y_axis(), HALF_PI))
                .with_uniform_scale(2.0),
        );
        let child = world.create_game_object("c", TransformComponent::from_position(Vec3::new(0.0, 0.0, 1.0)));
        world.add_child(parent, child, &mut services).unwrap();

        let world_transform = world.world_transform(child).unwrap();
        // (0,0,1) scaled to (0,0,2), rotated to (2,0,0), offset by (1,0,0)
        assert_relative_eq!(world_transform.position, Vec3::new(3.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(world_transform.scale, Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_add_child_rejects_bad_hierarchies() {
        let mut world = World::new();
        let mut services = EngineServices::headless();
        let a = world.create_game_object("a", TransformComponent::identity());
        let b = world.create_game_object("b", TransformComponent::identity());
        let c = world.create_game_object("c", TransformComponent::identity());
        world.add_child(a, b, &mut services).unwrap();
        world.add_child(b, c, &mut services).unwrap();

        assert_eq!(world.add_child(a, a, &mut services), Err(GameObjectError::SelfParenting(a)));
        assert_eq!(
            world.add_child(c, a, &mut services),
            Err(GameObjectError::CyclicHierarchy { parent: c, child: a })
        );
        assert_eq!(
            world.add_child(a, c, &mut services),
            Err(GameObjectError::AlreadyParented { child: c, parent: b })
        );
        assert_eq!(world.ancestors(c).collect::<Vec<_>>(), vec![b, a]);
    }

    #[test]
    fn test_add_child_links_meshes_and_enables_child_light() {
        let mut world = World::new();
        let mut services = EngineServices::headless();
        let post = spawn_mesh(&mut world, &mut services, Vec3::zeros());
        let lamp = spawn_mesh(&mut world, &mut services, Vec3::new(0.0, 5.0, 0.0));

        let light = services
            .lights
            .create_light(&LightDesc {
                name: "bulb".into(),
                light_type: LightType::Spot,
                position: Vec3::zeros(),
                direction: Vec3::new(0.0, -1.0, 0.0),
                colour: Vec3::new(1.0, 0.9, 0.7),
                intensity: 1.0,
            })
            .unwrap();
        services.lights.set_light_enabled(light, false);
        world
            .add_component(lamp, LightComponent::new(light, LightType::Spot), &mut services)
            .unwrap();

        world.add_child(post, lamp, &mut services).unwrap();

        let post_mesh = world.get(post).unwrap().mesh().unwrap().mesh();
        let lamp_mesh = world.get(lamp).unwrap().mesh().unwrap().mesh();
        let renderer = services.renderer_as::<HeadlessRenderer>().unwrap();
        assert_eq!(renderer.mesh(lamp_mesh).unwrap().parent, Some(post_mesh));
        let record = services.lights_as::<HeadlessLights>().unwrap().light(light).unwrap();
        assert_eq!(record.parent, Some(lamp_mesh));
        assert!(record.enabled);
    }

    #[test]
    fn test_destroy_removes_subtree_and_releases_meshes() {
        let mut world = World::new();
        let mut services = EngineServices::headless();
        let root = spawn_mesh(&mut world, &mut services, Vec3::zeros());
        let parent = spawn_mesh(&mut world, &mut services, Vec3::zeros());
        let child = spawn_mesh(&mut world, &mut services, Vec3::zeros());
        world.add_child(root, parent, &mut services).unwrap();
        world.add_child(parent, child, &mut services).unwrap();

        let destroyed = world.destroy(parent, &mut services);

        assert_eq!(destroyed, vec![parent, child]);
        assert!(world.get(root).unwrap().children().is_empty());
        assert_eq!(world.len(), 1);
        assert_eq!(services.renderer_as::<HeadlessRenderer>().unwrap().mesh_count(), 1);
    }

    #[test]
    fn test_apply_commands_skips_failures() {
        let mut world = World::new();
        let mut services = EngineServices::headless();
        let a = world.create_game_object("a", TransformComponent::identity());
        let b = world.create_game_object("b", TransformComponent::identity());

        let mut queue = CommandQueue::new();
        queue.set_position(a, Vec3::new(1.0, 0.0, 0.0));
        queue.add_child(a, b);
        queue.add_child(a, a);
        let applied = world.apply_commands(&mut queue, &mut services);

        assert_eq!(applied, 2);
        assert!(queue.is_empty());
        assert!(world.get(a).unwrap().transform().is_dirty());
        assert_eq!(world.get(b).unwrap().parent(), Some(a));
    }
}
