//! Shatter/explosion engine.
//!
//! A scripted, time-bounded blast applied to a pre-fractured mesh. The engine
//! never creates or destroys geometry: it restores fragments to their rest
//! poses, gives every fragment a one-off radial impulse, and then integrates
//! simple Euler kinematics every frame until a wall-clock completion timer
//! fires. It runs independently of the rigid-body world.

use std::collections::HashMap;
use std::f32::consts::TAU;
use std::time::Duration;

use bevy::math::{EulerRot, Quat, Vec3};
use rand::Rng;

use crate::config::{ExplosionTuning, ShatterConfig};
use crate::timer::{TimerId, TimerQueue};
use crate::vase::VaseId;

/// Monotonic token identifying one (re)start of a shatter sequence.
pub type TriggerId = u64;

/// Fragment centers closer than this to the blast center get a random direction.
const COINCIDENT_EPSILON: f32 = 1e-5;

/// A handle to one piece of a fractured mesh, owned by the rendering layer.
///
/// Rotations are Euler angles (XYZ order, radians).
pub trait Fragment {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn rotation(&self) -> Vec3;
    fn set_rotation(&mut self, rotation: Vec3);
    fn scale(&self) -> Vec3;
    fn set_scale(&mut self, scale: Vec3);
    /// World-space centroid of the fragment's bounding box.
    fn world_center(&self) -> Vec3;
}

/// Access to the loaded fragment collections of every vase.
pub trait FragmentStore {
    type Fragment: Fragment;

    /// Fragments of `vase` together with their rest poses, if loaded.
    fn fragments(&mut self, vase: &VaseId) -> Option<(&mut [Self::Fragment], &[ShardRestPose])>;
}

/// Intact local transform of a fragment, captured once after loading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShardRestPose {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl ShardRestPose {
    pub fn capture(fragment: &impl Fragment) -> Self {
        Self {
            position: fragment.position(),
            rotation: fragment.rotation(),
            scale: fragment.scale(),
        }
    }

    pub fn apply(&self, fragment: &mut impl Fragment) {
        fragment.set_position(self.position);
        fragment.set_rotation(self.rotation);
        fragment.set_scale(self.scale);
    }
}

/// Captures the rest pose of every fragment, in order.
pub fn capture_rest_poses<F: Fragment>(fragments: &[F]) -> Vec<ShardRestPose> {
    fragments.iter().map(ShardRestPose::capture).collect()
}

/// Per-fragment kinematic record for an active sequence.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShardState {
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Accumulated Euler orientation.
    pub orientation: Vec3,
}

/// Distance-based impulse boost: farther fragments are pushed harder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceShaping {
    pub bias: f32,
    pub scale: f32,
    pub clamp: f32,
}

impl DistanceShaping {
    /// `1 + clamp(max((distance + bias) * scale, 0), 0, clamp)`
    pub fn boost(&self, distance: f32) -> f32 {
        1.0 + ((distance + self.bias) * self.scale)
            .max(0.0)
            .min(self.clamp.max(0.0))
    }
}

/// Blast configuration for a single sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionParameters {
    /// World-space blast origin.
    pub center: Vec3,
    pub base_strength: f32,
    pub random_jitter: f32,
    pub upward_bias: f32,
    pub distance: DistanceShaping,
}

impl ExplosionParameters {
    /// Builds parameters around `center`, nudged by a user `offset`.
    pub fn new(center: Vec3, offset: Vec3, tuning: &ExplosionTuning) -> Self {
        Self {
            center: center + offset,
            base_strength: tuning.base_strength,
            random_jitter: tuning.random_jitter,
            upward_bias: tuning.upward_bias,
            distance: DistanceShaping {
                bias: tuning.distance_bias,
                scale: tuning.distance_scale,
                clamp: tuning.distance_clamp,
            },
        }
    }
}

/// Computes the initial `(linear, angular)` velocity of a fragment centered at
/// `fragment_center`.
pub fn compute_impulse(
    fragment_center: Vec3,
    params: &ExplosionParameters,
    angular_range: Vec3,
    rng: &mut impl Rng,
) -> (Vec3, Vec3) {
    let offset = fragment_center - params.center;
    let distance = offset.length();
    let direction = if distance < COINCIDENT_EPSILON {
        random_upward_direction(rng)
    } else {
        offset / distance
    };

    let magnitude = (params.base_strength + rng.random::<f32>() * params.random_jitter)
        * params.distance.boost(distance);

    let mut linear = direction * magnitude;
    linear.y += magnitude * params.upward_bias;

    let angular = Vec3::new(
        symmetric(rng, angular_range.x),
        symmetric(rng, angular_range.y),
        symmetric(rng, angular_range.z),
    );

    (linear, angular)
}

fn random_upward_direction(rng: &mut impl Rng) -> Vec3 {
    Vec3::new(
        rng.random::<f32>() - 0.5,
        0.5 + rng.random::<f32>() * 0.5,
        rng.random::<f32>() - 0.5,
    )
    .normalize()
}

fn symmetric(rng: &mut impl Rng, half_range: f32) -> f32 {
    (rng.random::<f32>() * 2.0 - 1.0) * half_range
}

/// Phase of a shatter sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShatterPhase {
    #[default]
    Idle,
    Exploding,
}

/// Result of [`ShatterEngine::start_sequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A fresh sequence started.
    Started,
    /// An active sequence was reset and restarted.
    Restarted,
    /// The token was already applied; nothing changed.
    Duplicate,
    /// Fragments or rest poses are not loaded; nothing changed.
    MissingAssets,
}

impl StartOutcome {
    pub fn is_running(self) -> bool {
        matches!(self, Self::Started | Self::Restarted)
    }
}

/// Shatter state of one vase.
#[derive(Debug, Clone, Default)]
pub struct ShatterEngine {
    phase: ShatterPhase,
    last_trigger: Option<TriggerId>,
    elapsed: f32,
    shards: Vec<ShardState>,
    completion: Option<TimerId>,
}

impl ShatterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ShatterPhase {
        self.phase
    }

    pub fn is_exploding(&self) -> bool {
        self.phase == ShatterPhase::Exploding
    }

    /// The last token that started a sequence.
    pub fn last_trigger(&self) -> Option<TriggerId> {
        self.last_trigger
    }

    /// Seconds since the current sequence started.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn shards(&self) -> &[ShardState] {
        &self.shards
    }

    /// The pending completion timer of the active sequence.
    pub fn pending_completion(&self) -> Option<TimerId> {
        self.completion
    }

    /// Starts (or restarts) the sequence for `trigger`.
    ///
    /// A token at or below the last applied one is ignored. Otherwise every
    /// fragment is put back to its rest pose, fresh impulses are drawn, and
    /// any pending completion timer is replaced by one carrying `on_complete`.
    #[allow(clippy::too_many_arguments)]
    pub fn start_sequence<F: Fragment, P>(
        &mut self,
        fragments: &mut [F],
        rest_poses: &[ShardRestPose],
        params: &ExplosionParameters,
        trigger: TriggerId,
        config: &ShatterConfig,
        rng: &mut impl Rng,
        timers: &mut TimerQueue<P>,
        on_complete: P,
    ) -> StartOutcome {
        if self.last_trigger.is_some_and(|last| trigger <= last) {
            tracing::debug!(
                "[shatter] Ignoring trigger {} (last applied {:?})",
                trigger,
                self.last_trigger
            );
            return StartOutcome::Duplicate;
        }

        if fragments.is_empty() || fragments.len() != rest_poses.len() {
            tracing::debug!(
                "[shatter] Fragments not ready ({} fragments, {} rest poses)",
                fragments.len(),
                rest_poses.len()
            );
            return StartOutcome::MissingAssets;
        }

        let restarted = self.is_exploding();
        if let Some(timer) = self.completion.take() {
            timers.cancel(timer);
        }

        for (fragment, pose) in fragments.iter_mut().zip(rest_poses) {
            pose.apply(fragment);
        }

        let angular_range = Vec3::from_array(config.angular_velocity_range);
        self.shards = fragments
            .iter()
            .zip(rest_poses)
            .map(|(fragment, pose)| {
                let (linear_velocity, angular_velocity) =
                    compute_impulse(fragment.world_center(), params, angular_range, rng);
                ShardState {
                    linear_velocity,
                    angular_velocity,
                    orientation: pose.rotation,
                }
            })
            .collect();

        self.phase = ShatterPhase::Exploding;
        self.elapsed = 0.0;
        self.last_trigger = Some(trigger);
        self.completion = Some(timers.schedule(
            Duration::from_millis(config.duration_ms),
            on_complete,
        ));

        tracing::info!(
            "[shatter] Trigger {} {} with {} shards",
            trigger,
            if restarted { "restarted" } else { "started" },
            self.shards.len()
        );

        if restarted {
            StartOutcome::Restarted
        } else {
            StartOutcome::Started
        }
    }

    /// Integrates every shard by `dt` seconds.
    pub fn update<F: Fragment>(&mut self, dt: f32, fragments: &mut [F], config: &ShatterConfig) {
        if !self.is_exploding() {
            return;
        }
        if fragments.len() != self.shards.len() {
            tracing::warn!(
                "[shatter] Fragment count changed mid-sequence ({} != {}), skipping tick",
                fragments.len(),
                self.shards.len()
            );
            return;
        }

        self.elapsed += dt;
        let apply_gravity = self.elapsed > config.gravity_delay_secs;
        let apply_damping = self.elapsed > config.damping_delay_secs;

        for (shard, fragment) in self.shards.iter_mut().zip(fragments.iter_mut()) {
            if apply_gravity {
                shard.linear_velocity.y -= config.gravity * dt;
            }
            if apply_damping {
                shard.linear_velocity *= config.linear_damping;
                shard.angular_velocity *= config.angular_damping;
            }

            fragment.set_position(fragment.position() + shard.linear_velocity * dt);
            shard.orientation += shard.angular_velocity * dt;
            fragment.set_rotation(shard.orientation);
        }
    }

    /// Ends the sequence started by `trigger`.
    ///
    /// Returns false for a stale trigger or when no sequence is running.
    pub fn complete(&mut self, trigger: TriggerId) -> bool {
        if !self.is_exploding() || self.last_trigger != Some(trigger) {
            tracing::debug!(
                "[shatter] Stale completion for trigger {} (current {:?})",
                trigger,
                self.last_trigger
            );
            return false;
        }

        self.phase = ShatterPhase::Idle;
        self.shards.clear();
        self.completion = None;
        true
    }
}

/// Plain in-memory fragment, used headless and in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshFragment {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Bounding-box centroid in the fragment's own geometry space.
    pub local_center: Vec3,
    /// World position of the group the fragment is parented to.
    pub parent_origin: Vec3,
}

impl MeshFragment {
    pub fn new(local_center: Vec3, parent_origin: Vec3) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            local_center,
            parent_origin,
        }
    }

    /// Shell of `segments * layers` shards around a vase standing at `origin`.
    ///
    /// Every shard shares the vase origin as its mesh origin, the way
    /// pre-fractured meshes are exported; only the geometry is offset.
    pub fn ring(
        origin: Vec3,
        segments: usize,
        layers: usize,
        radius: f32,
        height: f32,
    ) -> Vec<MeshFragment> {
        let mut fragments = Vec::with_capacity(segments * layers);
        for layer in 0..layers {
            let y = (layer as f32 + 0.5) * height / layers as f32;
            for segment in 0..segments {
                let angle = segment as f32 / segments as f32 * TAU;
                let center = Vec3::new(angle.cos() * radius, y, angle.sin() * radius);
                fragments.push(MeshFragment::new(center, origin));
            }
        }
        fragments
    }
}

impl Fragment for MeshFragment {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn rotation(&self) -> Vec3 {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    fn scale(&self) -> Vec3 {
        self.scale
    }

    fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    fn world_center(&self) -> Vec3 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        self.parent_origin + self.position + rotation * (self.local_center * self.scale)
    }
}

/// In-memory fragment collections keyed by vase.
#[derive(Debug, Clone, Default)]
pub struct FragmentSet {
    groups: HashMap<VaseId, (Vec<MeshFragment>, Vec<ShardRestPose>)>,
}

impl FragmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers loaded fragments for `vase`, capturing their rest poses.
    pub fn insert(&mut self, vase: VaseId, fragments: Vec<MeshFragment>) {
        let poses = capture_rest_poses(&fragments);
        self.groups.insert(vase, (fragments, poses));
    }

    pub fn remove(&mut self, vase: &VaseId) {
        self.groups.remove(vase);
    }

    pub fn get(&self, vase: &VaseId) -> Option<&[MeshFragment]> {
        self.groups.get(vase).map(|(fragments, _)| fragments.as_slice())
    }

    pub fn rest_poses(&self, vase: &VaseId) -> Option<&[ShardRestPose]> {
        self.groups.get(vase).map(|(_, poses)| poses.as_slice())
    }
}

impl FragmentStore for FragmentSet {
    type Fragment = MeshFragment;

    fn fragments(&mut self, vase: &VaseId) -> Option<(&mut [MeshFragment], &[ShardRestPose])> {
        self.groups
            .get_mut(vase)
            .map(|(fragments, poses)| (fragments.as_mut_slice(), poses.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn still_config() -> ShatterConfig {
        ShatterConfig {
            explosion: ExplosionTuning {
                random_jitter: 0.0,
                upward_bias: 0.0,
                ..ExplosionTuning::gentle()
            },
            ..ShatterConfig::default()
        }
    }

    fn params(config: &ShatterConfig) -> ExplosionParameters {
        ExplosionParameters::new(Vec3::new(0.0, 0.6, 0.0), Vec3::ZERO, &config.explosion)
    }

    fn start(
        engine: &mut ShatterEngine,
        fragments: &mut [MeshFragment],
        poses: &[ShardRestPose],
        trigger: TriggerId,
        config: &ShatterConfig,
        rng: &mut ChaCha8Rng,
        timers: &mut TimerQueue<TriggerId>,
    ) -> StartOutcome {
        let params = params(config);
        engine.start_sequence(fragments, poses, &params, trigger, config, rng, timers, trigger)
    }

    #[test]
    fn test_distance_boost_is_clamped() {
        let shaping = DistanceShaping {
            bias: 0.0,
            scale: 0.15,
            clamp: 0.5,
        };
        assert_eq!(shaping.boost(0.0), 1.0);
        assert!((shaping.boost(2.0) - 1.3).abs() < 1e-6);
        assert_eq!(shaping.boost(100.0), 1.5);

        let negative = DistanceShaping {
            bias: -10.0,
            ..shaping
        };
        assert_eq!(negative.boost(1.0), 1.0);
    }

    #[test]
    fn test_impulse_magnitude_grows_with_distance() {
        let config = still_config();
        let params = params(&config);
        let mut fragments: Vec<MeshFragment> = (0..12)
            .map(|i| {
                let distance = 0.1 + i as f32 * 0.4;
                let angle = i as f32 * 1.3;
                let dir = Vec3::new(angle.cos(), (angle * 0.7).sin(), angle.sin()).normalize();
                MeshFragment::new(params.center + dir * distance, Vec3::ZERO)
            })
            .collect();
        let poses = capture_rest_poses(&fragments);

        let mut engine = ShatterEngine::new();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut timers = TimerQueue::new();
        let outcome = start(&mut engine, &mut fragments, &poses, 1, &config, &mut rng, &mut timers);
        assert_eq!(outcome, StartOutcome::Started);

        let mut samples: Vec<(f32, f32)> = fragments
            .iter()
            .zip(engine.shards())
            .map(|(f, s)| ((f.world_center() - params.center).length(), s.linear_velocity.length()))
            .collect();
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));

        let max = config.explosion.base_strength * (1.0 + config.explosion.distance_clamp);
        for pair in samples.windows(2) {
            assert!(pair[1].1 >= pair[0].1 - 1e-5, "{pair:?}");
        }
        for (_, speed) in samples {
            assert!(speed <= max + 1e-4);
            assert!(speed >= config.explosion.base_strength - 1e-4);
        }
    }

    #[test]
    fn test_coincident_fragment_gets_upward_direction() {
        let config = still_config();
        let params = params(&config);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let (linear, _) = compute_impulse(params.center, &params, Vec3::splat(8.0), &mut rng);
        assert!(linear.is_finite());
        assert!(linear.length() > 0.0);
        assert!(linear.y > 0.0);
    }

    #[test]
    fn test_upward_bias_lifts_shards() {
        let tuning = ExplosionTuning {
            random_jitter: 0.0,
            upward_bias: 0.5,
            ..ExplosionTuning::gentle()
        };
        let params = ExplosionParameters::new(Vec3::ZERO, Vec3::ZERO, &tuning);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let (linear, _) = compute_impulse(Vec3::X, &params, Vec3::ZERO, &mut rng);
        let magnitude = tuning.base_strength * params.distance.boost(1.0);
        assert!((linear.x - magnitude).abs() < 1e-5);
        assert!((linear.y - magnitude * 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_restart_restores_rest_pose() {
        let config = ShatterConfig::default();
        let mut fragments = MeshFragment::ring(Vec3::ZERO, 8, 3, 0.4, 1.2);
        let poses = capture_rest_poses(&fragments);
        let mut engine = ShatterEngine::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut timers = TimerQueue::new();

        start(&mut engine, &mut fragments, &poses, 1, &config, &mut rng, &mut timers);
        for _ in 0..30 {
            engine.update(1.0 / 60.0, &mut fragments, &config);
        }
        assert!(fragments.iter().zip(&poses).any(|(f, p)| f.position != p.position));

        let outcome = start(&mut engine, &mut fragments, &poses, 2, &config, &mut rng, &mut timers);
        assert_eq!(outcome, StartOutcome::Restarted);
        for (fragment, pose) in fragments.iter().zip(&poses) {
            assert_eq!(fragment.position, pose.position);
            assert_eq!(fragment.rotation, pose.rotation);
            assert_eq!(fragment.scale, pose.scale);
        }
        assert_eq!(engine.elapsed(), 0.0);
    }

    #[test]
    fn test_same_trigger_is_noop() {
        let config = ShatterConfig::default();
        let mut fragments = MeshFragment::ring(Vec3::ZERO, 6, 2, 0.4, 1.0);
        let poses = capture_rest_poses(&fragments);
        let mut engine = ShatterEngine::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut timers = TimerQueue::new();

        start(&mut engine, &mut fragments, &poses, 5, &config, &mut rng, &mut timers);
        engine.update(0.1, &mut fragments, &config);
        let shards = engine.shards().to_vec();
        let positions = fragments.clone();
        let timer = engine.pending_completion();

        let outcome = start(&mut engine, &mut fragments, &poses, 5, &config, &mut rng, &mut timers);
        assert_eq!(outcome, StartOutcome::Duplicate);
        assert_eq!(engine.shards(), shards.as_slice());
        assert_eq!(fragments, positions);
        assert_eq!(engine.pending_completion(), timer);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_missing_assets_is_noop() {
        let config = ShatterConfig::default();
        let mut engine = ShatterEngine::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut timers = TimerQueue::new();

        let mut empty: Vec<MeshFragment> = Vec::new();
        let outcome = start(&mut engine, &mut empty, &[], 1, &config, &mut rng, &mut timers);
        assert_eq!(outcome, StartOutcome::MissingAssets);

        let mut fragments = MeshFragment::ring(Vec3::ZERO, 4, 1, 0.4, 1.0);
        let poses = capture_rest_poses(&fragments[..2]);
        let outcome = start(&mut engine, &mut fragments, &poses, 2, &config, &mut rng, &mut timers);
        assert_eq!(outcome, StartOutcome::MissingAssets);

        assert_eq!(engine.phase(), ShatterPhase::Idle);
        assert!(engine.last_trigger().is_none());
        assert!(timers.is_empty());
    }

    #[test]
    fn test_restart_replaces_completion_timer() {
        let config = ShatterConfig::default();
        let mut fragments = MeshFragment::ring(Vec3::ZERO, 4, 2, 0.4, 1.0);
        let poses = capture_rest_poses(&fragments);
        let mut engine = ShatterEngine::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut timers = TimerQueue::new();

        start(&mut engine, &mut fragments, &poses, 1, &config, &mut rng, &mut timers);
        let first = engine.pending_completion().unwrap();
        timers.advance(Duration::from_millis(3000));

        start(&mut engine, &mut fragments, &poses, 2, &config, &mut rng, &mut timers);
        assert!(!timers.is_pending(first));
        assert_eq!(timers.len(), 1);

        // The first sequence would have finished here.
        assert!(timers.advance(Duration::from_millis(2500)).is_empty());
        assert_eq!(timers.advance(Duration::from_millis(2500)), vec![2]);
    }

    #[test]
    fn test_gravity_and_damping_delays() {
        let config = ShatterConfig::default();
        let mut fragments = vec![MeshFragment::new(Vec3::new(1.0, 0.6, 0.0), Vec3::ZERO)];
        let poses = capture_rest_poses(&fragments);
        let mut engine = ShatterEngine::new();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut timers = TimerQueue::new();

        start(&mut engine, &mut fragments, &poses, 1, &config, &mut rng, &mut timers);
        let initial = engine.shards()[0];

        // Inside both windows: pure ballistic motion.
        let dt = 0.01;
        engine.update(dt, &mut fragments, &config);
        let shard = engine.shards()[0];
        assert_eq!(shard.linear_velocity, initial.linear_velocity);
        assert_eq!(shard.angular_velocity, initial.angular_velocity);
        assert_eq!(fragments[0].position, poses[0].position + initial.linear_velocity * dt);
        assert_eq!(fragments[0].rotation, initial.orientation + initial.angular_velocity * dt);

        // Past the damping window but before gravity kicks in.
        engine.update(0.05, &mut fragments, &config);
        let damped = engine.shards()[0];
        let expected = initial.linear_velocity * config.linear_damping;
        assert!((damped.linear_velocity - expected).length() < 1e-5);

        // Past the gravity delay the vertical velocity drops further.
        engine.update(0.1, &mut fragments, &config);
        let fallen = engine.shards()[0];
        let expected_y = damped.linear_velocity.y * config.linear_damping;
        assert!(fallen.linear_velocity.y < expected_y);
    }

    #[test]
    fn test_complete_checks_trigger() {
        let config = ShatterConfig::default();
        let mut fragments = MeshFragment::ring(Vec3::ZERO, 4, 1, 0.4, 1.0);
        let poses = capture_rest_poses(&fragments);
        let mut engine = ShatterEngine::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut timers = TimerQueue::new();

        start(&mut engine, &mut fragments, &poses, 1, &config, &mut rng, &mut timers);
        start(&mut engine, &mut fragments, &poses, 2, &config, &mut rng, &mut timers);

        assert!(!engine.complete(1));
        assert!(engine.is_exploding());
        assert!(engine.complete(2));
        assert_eq!(engine.phase(), ShatterPhase::Idle);
        assert!(!engine.complete(2));

        // Idle engine stays put on update.
        let before = fragments.clone();
        engine.update(0.5, &mut fragments, &config);
        assert_eq!(fragments, before);
    }

    #[test]
    fn test_world_center_uses_bounding_box() {
        let fragment = MeshFragment::new(Vec3::new(0.5, 1.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(fragment.world_center(), Vec3::new(10.5, 1.0, 0.0));
    }

    #[test]
    fn test_fragment_set_captures_poses() {
        let mut set = FragmentSet::new();
        let id = VaseId::from("vase-0");
        set.insert(id.clone(), MeshFragment::ring(Vec3::ZERO, 4, 2, 0.4, 1.0));

        let (fragments, poses) = set.fragments(&id).unwrap();
        assert_eq!(fragments.len(), 8);
        assert_eq!(poses.len(), 8);
        assert!(set.fragments(&VaseId::from("vase-9")).is_none());
    }
}
