//! Coins, vase containers and sensor windows.
//!
//! Coins are real rigid bodies in the [`PhysicsWorld`]. Each vase owns a
//! static container (a floor plus a ring of wall segments) that holds its
//! coins. Opening a sensor window turns those colliders into sensors so the
//! coins drop out while the vase is shattering.

use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use bevy::math::{Quat, Vec3};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rapier3d::prelude::*;

use crate::config::CoinConfig;
use crate::physics::{PHYSICS_DT, PhysicsWorld};
use crate::vase::VaseId;

/// Unique identifier for a coin.
pub type CoinId = u32;

/// Upper bound on physics steps per frame; older backlog is dropped.
const MAX_STEPS_PER_UPDATE: u32 = 5;

const FLOOR_HALF_THICKNESS: f32 = 0.05;
const WALL_HALF_THICKNESS: f32 = 0.03;

/// A coin in the physics world.
#[derive(Debug, Clone)]
pub struct Coin {
    pub id: CoinId,
    /// Vase the coin was manifested above.
    pub vase: VaseId,
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

/// Spawns, tracks and removes coins.
#[derive(Debug, Clone)]
pub struct CoinManager {
    coins: Vec<Coin>,
    next_id: CoinId,
    rng: ChaCha8Rng,
    max_coins: usize,
}

impl CoinManager {
    pub fn new(seed: u64, max_coins: usize) -> Self {
        Self {
            coins: Vec::new(),
            next_id: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            max_coins: max_coins.max(1),
        }
    }

    /// Drops a coin above `mouth` with random horizontal jitter and spin.
    ///
    /// Returns the new coin and any coins evicted to honor the cap,
    /// oldest first.
    pub fn spawn(
        &mut self,
        world: &mut PhysicsWorld,
        vase: &VaseId,
        mouth: Vec3,
        config: &CoinConfig,
    ) -> (CoinId, Vec<CoinId>) {
        let jitter_x = (self.rng.random::<f32>() * 2.0 - 1.0) * config.spawn_jitter;
        let jitter_z = (self.rng.random::<f32>() * 2.0 - 1.0) * config.spawn_jitter;
        let tilt = Vector::new(
            (self.rng.random::<f32>() - 0.5) * PI,
            self.rng.random::<f32>() * TAU,
            (self.rng.random::<f32>() - 0.5) * PI,
        );
        let spin = Vector::new(
            (self.rng.random::<f32>() * 2.0 - 1.0) * 6.0,
            (self.rng.random::<f32>() * 2.0 - 1.0) * 6.0,
            (self.rng.random::<f32>() * 2.0 - 1.0) * 6.0,
        );

        let body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(
                mouth.x + jitter_x,
                mouth.y + config.spawn_height,
                mouth.z + jitter_z,
            ))
            .rotation(tilt)
            .angvel(spin)
            .ccd_enabled(true)
            .build();
        let body_handle = world.add_rigid_body(body);

        let collider = ColliderBuilder::cylinder(config.thickness / 2.0, config.radius)
            .restitution(config.restitution)
            .friction(config.friction)
            .density(8.0)
            .build();
        let collider_handle = world.add_collider(collider, body_handle);

        let id = self.next_id;
        self.next_id += 1;
        self.coins.push(Coin {
            id,
            vase: vase.clone(),
            body_handle,
            collider_handle,
        });

        let mut evicted = Vec::new();
        while self.coins.len() > self.max_coins {
            let oldest = self.coins.remove(0);
            world.remove_rigid_body(oldest.body_handle);
            evicted.push(oldest.id);
        }

        (id, evicted)
    }

    pub fn remove(&mut self, world: &mut PhysicsWorld, id: CoinId) -> bool {
        if let Some(pos) = self.coins.iter().position(|c| c.id == id) {
            let coin = self.coins.remove(pos);
            world.remove_rigid_body(coin.body_handle);
            true
        } else {
            false
        }
    }

    /// Removes every coin whose center is below `y`.
    pub fn cull_below(&mut self, world: &mut PhysicsWorld, y: f32) -> Vec<CoinId> {
        let fallen: Vec<CoinId> = self
            .coins
            .iter()
            .filter(|coin| {
                world
                    .get_rigid_body(coin.body_handle)
                    .is_some_and(|body| body.translation().y < y)
            })
            .map(|coin| coin.id)
            .collect();

        for id in &fallen {
            self.remove(world, *id);
        }
        fallen
    }

    pub fn get(&self, id: CoinId) -> Option<&Coin> {
        self.coins.iter().find(|c| c.id == id)
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// World position and orientation of a coin.
    pub fn pose(&self, world: &PhysicsWorld, id: CoinId) -> Option<(Vec3, Quat)> {
        let coin = self.get(id)?;
        let body = world.get_rigid_body(coin.body_handle)?;
        let t = body.translation();
        let r = body.rotation();
        Some((Vec3::new(t.x, t.y, t.z), Quat::from_xyzw(r.x, r.y, r.z, r.w)))
    }
}

/// Static floor and wall ring holding a vase's coins.
#[derive(Debug, Clone)]
pub struct VaseContainer {
    floor: ColliderHandle,
    walls: Vec<ColliderHandle>,
    passable: bool,
}

impl VaseContainer {
    pub fn build(world: &mut PhysicsWorld, base: Vec3, config: &CoinConfig) -> Self {
        let radius = config.container_radius;
        let segments = config.container_segments.max(3);

        let floor = world.add_static_collider(
            ColliderBuilder::cuboid(radius, FLOOR_HALF_THICKNESS, radius)
                .translation(Vector::new(base.x, base.y + FLOOR_HALF_THICKNESS, base.z))
                .friction(config.friction)
                .build(),
        );

        let half_height = config.container_height / 2.0;
        let half_chord = radius * (PI / segments as f32).sin() + WALL_HALF_THICKNESS;
        let walls = (0..segments)
            .map(|i| {
                let angle = i as f32 / segments as f32 * TAU;
                let collider = ColliderBuilder::cuboid(half_chord, half_height, WALL_HALF_THICKNESS)
                    .translation(Vector::new(
                        base.x + angle.cos() * radius,
                        base.y + half_height,
                        base.z + angle.sin() * radius,
                    ))
                    .rotation(Vector::new(0.0, -(angle + FRAC_PI_2), 0.0))
                    .friction(config.friction)
                    .build();
                world.add_static_collider(collider)
            })
            .collect();

        Self {
            floor,
            walls,
            passable: false,
        }
    }

    pub fn is_passable(&self) -> bool {
        self.passable
    }

    pub fn handles(&self) -> impl Iterator<Item = ColliderHandle> + '_ {
        std::iter::once(self.floor).chain(self.walls.iter().copied())
    }

    /// Turns every container collider into a sensor (or back).
    pub fn set_passable(&mut self, world: &mut PhysicsWorld, passable: bool) {
        for handle in self.handles() {
            world.set_sensor(handle, passable);
        }
        self.passable = passable;
    }
}

/// What changed when a coin was manifested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinSpawn {
    pub id: CoinId,
    pub evicted: Vec<CoinId>,
}

/// The rigid-body side of the scene: coins, containers and a fixed-step clock.
#[derive(Debug)]
pub struct CoinField {
    world: PhysicsWorld,
    coins: CoinManager,
    containers: HashMap<VaseId, VaseContainer>,
    accumulator: f32,
    config: CoinConfig,
}

impl CoinField {
    pub fn new(config: CoinConfig, seed: u64, gravity: f32) -> Self {
        Self {
            world: PhysicsWorld::with_gravity(Vector::new(0.0, -gravity, 0.0)),
            coins: CoinManager::new(seed, config.max_coins),
            containers: HashMap::new(),
            accumulator: 0.0,
            config,
        }
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn coins(&self) -> &[Coin] {
        self.coins.coins()
    }

    pub fn coin_count(&self) -> usize {
        self.coins.len()
    }

    pub fn coin_pose(&self, id: CoinId) -> Option<(Vec3, Quat)> {
        self.coins.pose(&self.world, id)
    }

    pub fn add_container(&mut self, vase: VaseId, base: Vec3) {
        let container = VaseContainer::build(&mut self.world, base, &self.config);
        self.containers.insert(vase, container);
    }

    pub fn container(&self, vase: &VaseId) -> Option<&VaseContainer> {
        self.containers.get(vase)
    }

    /// Opens or closes the sensor window of `vase`'s container.
    pub fn set_container_passable(&mut self, vase: &VaseId, passable: bool) -> bool {
        let Some(container) = self.containers.get_mut(vase) else {
            return false;
        };
        container.set_passable(&mut self.world, passable);
        tracing::debug!(
            "[coin] Container of {} {}",
            vase,
            if passable { "opened" } else { "closed" }
        );
        true
    }

    pub fn spawn_coin(&mut self, vase: &VaseId, mouth: Vec3) -> CoinSpawn {
        let (id, evicted) = self.coins.spawn(&mut self.world, vase, mouth, &self.config);
        if !evicted.is_empty() {
            tracing::debug!("[coin] Coin cap reached, evicted {:?}", evicted);
        }
        CoinSpawn { id, evicted }
    }

    /// Advances physics by `dt` seconds of frame time and returns the coins
    /// removed for falling below the kill plane.
    pub fn update(&mut self, dt: f32) -> Vec<CoinId> {
        self.accumulator += dt.max(0.0);

        let mut steps = 0;
        while self.accumulator >= PHYSICS_DT && steps < MAX_STEPS_PER_UPDATE {
            self.world.step();
            self.accumulator -= PHYSICS_DT;
            steps += 1;
        }
        if steps == MAX_STEPS_PER_UPDATE {
            self.accumulator = self.accumulator.min(PHYSICS_DT);
        }

        self.coins.cull_below(&mut self.world, self.config.kill_plane_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(config: CoinConfig) -> (CoinField, VaseId) {
        let mut field = CoinField::new(config, 12345, 9.81);
        let vase = VaseId::from("vase-0");
        field.add_container(vase.clone(), Vec3::ZERO);
        (field, vase)
    }

    fn run(field: &mut CoinField, seconds: f32) -> Vec<CoinId> {
        let mut culled = Vec::new();
        for _ in 0..(seconds * 60.0) as usize {
            culled.extend(field.update(PHYSICS_DT));
        }
        culled
    }

    #[test]
    fn test_coin_rests_in_container() {
        let (mut field, vase) = field(CoinConfig::default());
        let spawn = field.spawn_coin(&vase, Vec3::ZERO);

        run(&mut field, 3.0);

        let (position, _) = field.coin_pose(spawn.id).unwrap();
        assert!(position.y > 0.0, "coin fell through: {position:?}");
        assert!(position.y < 1.0);
    }

    #[test]
    fn test_open_container_lets_coins_fall() {
        let (mut field, vase) = field(CoinConfig::default());
        assert!(field.set_container_passable(&vase, true));
        let container = field.container(&vase).unwrap();
        assert!(container.is_passable());
        assert!(container
            .handles()
            .all(|h| field.world().is_sensor(h) == Some(true)));

        let spawn = field.spawn_coin(&vase, Vec3::ZERO);
        run(&mut field, 1.0);

        let (position, _) = field.coin_pose(spawn.id).unwrap();
        assert!(position.y < 0.0);
    }

    #[test]
    fn test_kill_plane_removes_coins() {
        let (mut field, vase) = field(CoinConfig {
            kill_plane_y: -1.0,
            ..CoinConfig::default()
        });
        field.set_container_passable(&vase, true);
        let spawn = field.spawn_coin(&vase, Vec3::ZERO);

        let culled = run(&mut field, 2.0);
        assert_eq!(culled, vec![spawn.id]);
        assert_eq!(field.coin_count(), 0);
        assert!(field.coin_pose(spawn.id).is_none());
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let (mut field, vase) = field(CoinConfig {
            max_coins: 3,
            ..CoinConfig::default()
        });

        for _ in 0..3 {
            assert!(field.spawn_coin(&vase, Vec3::ZERO).evicted.is_empty());
        }
        let spawn = field.spawn_coin(&vase, Vec3::ZERO);
        assert_eq!(spawn.evicted, vec![0]);
        assert_eq!(field.coin_count(), 3);
        assert_eq!(field.coins()[0].id, 1);
    }

    #[test]
    fn test_deterministic_spawning() {
        let (mut a, vase) = field(CoinConfig::default());
        let (mut b, _) = field(CoinConfig::default());

        for _ in 0..4 {
            a.spawn_coin(&vase, Vec3::ZERO);
            b.spawn_coin(&vase, Vec3::ZERO);
        }
        run(&mut a, 0.5);
        run(&mut b, 0.5);

        assert_eq!(a.world().compute_hash(), b.world().compute_hash());
    }

    #[test]
    fn test_unknown_container() {
        let (mut field, _) = field(CoinConfig::default());
        assert!(!field.set_container_passable(&VaseId::from("vase-9"), true));
    }

    #[test]
    fn test_frame_backlog_is_bounded() {
        let (mut field, _) = field(CoinConfig::default());
        field.update(10.0);
        assert_eq!(field.world().current_frame(), u64::from(MAX_STEPS_PER_UPDATE));
        field.update(0.0);
        assert!(field.world().current_frame() <= u64::from(MAX_STEPS_PER_UPDATE) + 1);
    }
}
