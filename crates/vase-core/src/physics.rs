//! Rigid-body world using `Rapier3D`, stepped at a fixed rate.
//!
//! Only coins and vase containers live here. Shattering fragments are
//! animated by [`crate::shatter`] and never enter this world.

use rapier3d::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Fixed timestep for physics simulation (60Hz).
pub const PHYSICS_DT: f32 = 1.0 / 60.0;

/// Default gravity vector (downward, in m/s²).
pub fn default_gravity() -> Vector {
    Vector::new(0.0, -9.81, 0.0)
}

/// Physics world containing all `Rapier3D` components.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub gravity: Vector,
    pub frame: u64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("frame", &self.frame)
            .field("rigid_body_count", &self.rigid_body_set.len())
            .field("collider_count", &self.collider_set.len())
            .field("gravity", &self.gravity)
            .finish_non_exhaustive()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self::with_gravity(default_gravity())
    }

    pub fn with_gravity(gravity: Vector) -> Self {
        let integration_parameters = IntegrationParameters {
            dt: PHYSICS_DT,
            ..Default::default()
        };

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity,
            frame: 0,
        }
    }

    /// Advances the simulation by one fixed timestep.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &(),
        );
        self.frame += 1;
    }

    pub fn step_n(&mut self, n: u32) {
        for _ in 0..n {
            self.step();
        }
    }

    pub fn add_rigid_body(&mut self, rigid_body: RigidBody) -> RigidBodyHandle {
        self.rigid_body_set.insert(rigid_body)
    }

    /// Adds a collider attached to a rigid body.
    pub fn add_collider(&mut self, collider: Collider, parent: RigidBodyHandle) -> ColliderHandle {
        self.collider_set
            .insert_with_parent(collider, parent, &mut self.rigid_body_set)
    }

    /// Adds a collider without a parent (static collider).
    pub fn add_static_collider(&mut self, collider: Collider) -> ColliderHandle {
        self.collider_set.insert(collider)
    }

    /// Removes a rigid body and its attached colliders.
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.collider_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.rigid_body_set,
            true,
        );
    }

    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    /// Toggles whether a collider only detects overlaps instead of blocking.
    pub fn set_sensor(&mut self, handle: ColliderHandle, sensor: bool) -> bool {
        match self.collider_set.get_mut(handle) {
            Some(collider) => {
                collider.set_sensor(sensor);
                true
            }
            None => false,
        }
    }

    pub fn is_sensor(&self, handle: ColliderHandle) -> Option<bool> {
        self.collider_set.get(handle).map(Collider::is_sensor)
    }

    /// Deterministic hash of body poses and velocities.
    pub fn compute_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.frame.hash(&mut hasher);

        for (handle, body) in self.rigid_body_set.iter() {
            let (index, generation) = handle.into_raw_parts();
            index.hash(&mut hasher);
            generation.hash(&mut hasher);

            let pos = body.translation();
            let rot = body.rotation();
            let linvel = body.linvel();
            let angvel = body.angvel();
            for value in [
                pos.x, pos.y, pos.z, rot.x, rot.y, rot.z, rot.w, linvel.x, linvel.y, linvel.z,
                angvel.x, angvel.y, angvel.z,
            ] {
                value.to_bits().hash(&mut hasher);
            }
        }

        hasher.finish()
    }

    pub fn current_frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(world: &mut PhysicsWorld, y: f32) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(0.0, y, 0.0))
            .build();
        let handle = world.add_rigid_body(body);
        world.add_collider(ColliderBuilder::ball(0.1).restitution(0.2).build(), handle);
        handle
    }

    #[test]
    fn test_physics_world_creation() {
        let world = PhysicsWorld::new();
        assert_eq!(world.frame, 0);
        assert_eq!(world.integration_parameters.dt, PHYSICS_DT);
    }

    #[test]
    fn test_deterministic_simulation() {
        let mut world1 = PhysicsWorld::new();
        let mut world2 = PhysicsWorld::new();
        let handle1 = ball(&mut world1, 2.0);
        let handle2 = ball(&mut world2, 2.0);

        world1.step_n(100);
        world2.step_n(100);

        assert_eq!(world1.compute_hash(), world2.compute_hash());
        let pos1 = world1.get_rigid_body(handle1).unwrap().translation();
        let pos2 = world2.get_rigid_body(handle2).unwrap().translation();
        assert_eq!(pos1.y, pos2.y);
    }

    #[test]
    fn test_step_advances_frame() {
        let mut world = PhysicsWorld::new();
        world.step();
        assert_eq!(world.current_frame(), 1);
        world.step_n(10);
        assert_eq!(world.current_frame(), 11);
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut world = PhysicsWorld::new();
        let handle = ball(&mut world, 5.0);
        world.step_n(30);
        assert!(world.get_rigid_body(handle).unwrap().translation().y < 5.0);
    }

    #[test]
    fn test_add_and_remove_body() {
        let mut world = PhysicsWorld::new();
        let handle = ball(&mut world, 1.0);
        assert!(world.get_rigid_body(handle).is_some());

        world.remove_rigid_body(handle);
        assert!(world.get_rigid_body(handle).is_none());
        assert_eq!(world.collider_set.len(), 0);
    }

    #[test]
    fn test_sensor_toggle() {
        let mut world = PhysicsWorld::new();
        let floor = world.add_static_collider(ColliderBuilder::cuboid(1.0, 0.05, 1.0).build());

        assert_eq!(world.is_sensor(floor), Some(false));
        assert!(world.set_sensor(floor, true));
        assert_eq!(world.is_sensor(floor), Some(true));

        world.remove_collider(floor);
        assert!(!world.set_sensor(floor, false));
    }
}
