//! Camera focus and reset animator.
//!
//! One tween core drives every camera move in the scene: vase-to-vase focus,
//! the reset after an orbit drag, and the title-to-scene fly-in. Only the
//! destination, duration and tolerances differ between them.

use bevy::math::Vec3;

use crate::config::{CameraConfig, TransitionConfig, TransitionTolerances};

/// Identifier of one camera transition.
pub type TransitionId = u64;

/// Lowest and highest orbit elevation (radians).
const MIN_PITCH: f32 = 0.05;
const MAX_PITCH: f32 = 1.45;

/// Camera position and the point it looks at.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    fn lerp(&self, other: &CameraPose, k: f32) -> CameraPose {
        CameraPose {
            position: self.position.lerp(other.position, k),
            target: self.target.lerp(other.target, k),
        }
    }
}

/// The live camera/controls object the animator writes into.
pub trait CameraControls {
    fn pose(&self) -> CameraPose;
    fn apply_pose(&mut self, pose: CameraPose);
}

/// Plain camera rig holding the current pose.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraRig {
    pub pose: CameraPose,
}

impl CameraRig {
    pub fn new(pose: CameraPose) -> Self {
        Self { pose }
    }
}

impl CameraControls for CameraRig {
    fn pose(&self) -> CameraPose {
        self.pose
    }

    fn apply_pose(&mut self, pose: CameraPose) {
        self.pose = pose;
    }
}

/// `1 - (1 - t)^3`
pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// Relative slack under which elapsed time counts as the full duration.
const COMPLETION_EPSILON: f64 = 1e-5;

/// An in-flight camera tween.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraResetTask {
    pub id: TransitionId,
    pub from: CameraPose,
    pub to: CameraPose,
    /// Seconds, summed in f64 so that frames adding up to `duration` finish.
    pub elapsed: f64,
    pub duration: f32,
    pub tolerances: TransitionTolerances,
}

impl CameraResetTask {
    /// Normalized progress in `[0, 1]`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn progress(&self) -> f32 {
        let duration = f64::from(self.duration);
        if duration <= 0.0 || self.elapsed >= duration * (1.0 - COMPLETION_EPSILON) {
            1.0
        } else {
            (self.elapsed / duration) as f32
        }
    }

    fn sample(&self) -> CameraPose {
        self.from.lerp(&self.to, ease_out_cubic(self.progress()))
    }

    fn close_enough(&self, pose: &CameraPose) -> bool {
        self.progress() >= self.tolerances.min_progress
            && pose.position.distance_squared(self.to.position)
                < self.tolerances.position_epsilon_sq
            && pose.target.distance_squared(self.to.target) < self.tolerances.target_epsilon_sq
    }
}

/// Runs at most one camera tween at a time.
#[derive(Debug, Clone, Default)]
pub struct CameraAnimator {
    active: Option<CameraResetTask>,
    next_id: TransitionId,
}

impl CameraAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&CameraResetTask> {
        self.active.as_ref()
    }

    /// Starts a tween from `from` to `to`, discarding any in-flight task.
    pub fn begin_transition(
        &mut self,
        from: CameraPose,
        to: CameraPose,
        duration: f32,
        tolerances: TransitionTolerances,
    ) -> TransitionId {
        let id = self.next_id;
        self.next_id += 1;

        if let Some(old) = &self.active {
            tracing::debug!("[camera] Transition {} superseded by {}", old.id, id);
        }

        self.active = Some(CameraResetTask {
            id,
            from,
            to,
            elapsed: 0.0,
            duration,
            tolerances,
        });
        id
    }

    /// Convenience wrapper taking duration and tolerances from config.
    pub fn begin_with(
        &mut self,
        from: CameraPose,
        to: CameraPose,
        transition: &TransitionConfig,
    ) -> TransitionId {
        self.begin_transition(from, to, transition.duration_secs, transition.tolerances)
    }

    /// Drops the active task without completing it.
    pub fn cancel(&mut self) -> Option<TransitionId> {
        self.active.take().map(|task| task.id)
    }

    /// Advances the active task by `dt` and writes the pose into `controls`.
    ///
    /// Returns the id of the task that finished on this tick. The destination
    /// pose has already been applied when it returns.
    pub fn tick(&mut self, dt: f32, controls: &mut impl CameraControls) -> Option<TransitionId> {
        let task = self.active.as_mut()?;
        task.elapsed += f64::from(dt);

        let pose = task.sample();
        if task.progress() >= 1.0 || task.close_enough(&pose) {
            controls.apply_pose(task.to);
            let id = task.id;
            self.active = None;
            return Some(id);
        }

        controls.apply_pose(pose);
        None
    }
}

/// Point the camera looks at when focused on a vase standing at `base`.
pub fn vase_target(base: Vec3, config: &CameraConfig) -> Vec3 {
    base + Vec3::new(0.0, config.focus_height, 0.0)
}

/// Default pose for looking at `target`.
pub fn default_pose(target: Vec3, config: &CameraConfig) -> CameraPose {
    CameraPose::new(
        target + Vec3::new(0.0, config.initial_height, config.initial_distance),
        target,
    )
}

/// Title screen pose.
pub fn title_pose(config: &CameraConfig) -> CameraPose {
    CameraPose::new(
        Vec3::from_array(config.title_position),
        Vec3::from_array(config.title_target),
    )
}

/// Moves to `new_target`, keeping the current offset from the target.
pub fn focus_pose(current: CameraPose, new_target: Vec3) -> CameraPose {
    CameraPose::new(new_target + (current.position - current.target), new_target)
}

/// Looks at `target` from the default direction, keeping the current zoom.
pub fn reset_pose(current: CameraPose, target: Vec3, config: &CameraConfig) -> CameraPose {
    let default_offset = Vec3::new(0.0, config.initial_height, config.initial_distance);
    let distance = current.distance();
    let distance = if distance > f32::EPSILON {
        distance
    } else {
        default_offset.length()
    };

    let direction = default_offset.normalize_or(Vec3::Z);
    CameraPose::new(target + direction * distance, target)
}

/// Orbits `current` around its target by the given yaw and pitch deltas.
///
/// Elevation stays above the ground plane and below the zenith.
pub fn orbit_pose(current: CameraPose, yaw_delta: f32, pitch_delta: f32) -> CameraPose {
    let offset = current.position - current.target;
    let radius = offset.length();
    if radius <= f32::EPSILON {
        return current;
    }

    let yaw = offset.x.atan2(offset.z) + yaw_delta;
    let pitch = ((offset.y / radius).clamp(-1.0, 1.0).asin() + pitch_delta)
        .clamp(MIN_PITCH, MAX_PITCH);

    let horizontal = radius * pitch.cos();
    let offset = Vec3::new(
        horizontal * yaw.sin(),
        radius * pitch.sin(),
        horizontal * yaw.cos(),
    );
    CameraPose::new(current.target + offset, current.target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tight() -> TransitionTolerances {
        TransitionTolerances {
            position_epsilon_sq: 1e-4,
            target_epsilon_sq: 1e-4,
            min_progress: 0.85,
        }
    }

    fn poses() -> (CameraPose, CameraPose) {
        (
            CameraPose::new(Vec3::new(0.0, 2.0, 10.0), Vec3::ZERO),
            CameraPose::new(Vec3::new(4.0, 2.0, 6.0), Vec3::new(4.0, 0.8, 0.0)),
        )
    }

    fn run(
        animator: &mut CameraAnimator,
        rig: &mut CameraRig,
        dt: f32,
        max_ticks: usize,
    ) -> Option<(usize, TransitionId)> {
        for tick in 1..=max_ticks {
            if let Some(id) = animator.tick(dt, rig) {
                return Some((tick, id));
            }
        }
        None
    }

    #[test]
    fn test_easing_curve() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
        assert_eq!(ease_out_cubic(2.0), 1.0);
    }

    #[test]
    fn test_pose_pushed_every_tick() {
        let (from, to) = poses();
        let mut rig = CameraRig::new(from);
        let mut animator = CameraAnimator::new();
        animator.begin_transition(from, to, 1.0, tight());

        assert!(animator.tick(0.25, &mut rig).is_none());
        let k = ease_out_cubic(0.25);
        assert!((rig.pose.position - from.position.lerp(to.position, k)).length() < 1e-5);
        assert!((rig.pose.target - from.target.lerp(to.target, k)).length() < 1e-5);
    }

    #[test]
    fn test_tight_tolerances_run_full_duration() {
        let (from, to) = poses();
        let mut rig = CameraRig::new(from);
        let mut animator = CameraAnimator::new();
        let id = animator.begin_transition(from, to, 1.0, tight());

        let (ticks, finished) = run(&mut animator, &mut rig, 0.25, 10).unwrap();
        assert_eq!(ticks, 4);
        assert_eq!(finished, id);
        assert_eq!(rig.pose, to);
    }

    #[test]
    fn test_generous_tolerances_exit_early_and_snap() {
        let (from, to) = poses();
        let mut rig = CameraRig::new(from);
        let mut animator = CameraAnimator::new();
        animator.begin_transition(
            from,
            to,
            1.0,
            TransitionTolerances {
                position_epsilon_sq: 2.0,
                target_epsilon_sq: 2.0,
                min_progress: 0.5,
            },
        );

        let (ticks, _) = run(&mut animator, &mut rig, 0.25, 10).unwrap();
        assert!(ticks < 4);
        assert_eq!(rig.pose, to);
        assert!(!animator.is_active());
    }

    #[test]
    fn test_frames_summing_to_duration_complete_exactly() {
        let (from, to) = poses();
        let exact = TransitionTolerances {
            position_epsilon_sq: 0.0,
            target_epsilon_sq: 0.0,
            min_progress: 1.0,
        };

        for (duration, frames) in [(1.0, 60), (0.8, 48), (2.5, 150), (1.0, 144), (0.8, 96)] {
            let mut rig = CameraRig::new(from);
            let mut animator = CameraAnimator::new();
            let id = animator.begin_transition(from, to, duration, exact);
            let dt = duration / frames as f32;

            let mut finished = None;
            for _ in 0..frames {
                finished = animator.tick(dt, &mut rig).or(finished);
            }
            assert_eq!(finished, Some(id), "{duration}s over {frames} frames");
            assert!(!animator.is_active());
            assert_eq!(rig.pose, to);
        }
    }

    #[test]
    fn test_exactly_one_completion() {
        let (from, to) = poses();
        let mut rig = CameraRig::new(from);
        let mut animator = CameraAnimator::new();
        animator.begin_transition(from, to, 0.5, tight());

        assert!(run(&mut animator, &mut rig, 0.1, 20).is_some());
        for _ in 0..10 {
            assert!(animator.tick(0.1, &mut rig).is_none());
        }
    }

    #[test]
    fn test_zero_duration_completes_first_tick() {
        let (from, to) = poses();
        let mut rig = CameraRig::new(from);
        let mut animator = CameraAnimator::new();
        let id = animator.begin_transition(from, to, 0.0, tight());

        assert_eq!(animator.tick(0.0, &mut rig), Some(id));
        assert_eq!(rig.pose, to);

        let id = animator.begin_transition(to, from, -1.0, tight());
        assert_eq!(animator.tick(0.016, &mut rig), Some(id));
        assert_eq!(rig.pose, from);
    }

    #[test]
    fn test_new_transition_supersedes() {
        let (from, to) = poses();
        let other = CameraPose::new(Vec3::new(-3.0, 1.0, 5.0), Vec3::new(-3.0, 0.8, 0.0));
        let mut rig = CameraRig::new(from);
        let mut animator = CameraAnimator::new();

        let first = animator.begin_transition(from, to, 1.0, tight());
        animator.tick(0.25, &mut rig);
        let second = animator.begin_transition(rig.pose, other, 1.0, tight());
        assert_ne!(first, second);

        let (_, finished) = run(&mut animator, &mut rig, 0.25, 10).unwrap();
        assert_eq!(finished, second);
        assert_eq!(rig.pose, other);
    }

    #[test]
    fn test_focus_preserves_offset() {
        let current = CameraPose::new(Vec3::new(1.0, 3.0, 7.0), Vec3::new(0.0, 0.8, 0.0));
        let next = focus_pose(current, Vec3::new(3.0, 0.8, 0.0));
        assert_eq!(next.target, Vec3::new(3.0, 0.8, 0.0));
        assert_eq!(next.position - next.target, current.position - current.target);
    }

    #[test]
    fn test_reset_keeps_distance_and_default_direction() {
        let config = CameraConfig::default();
        let target = Vec3::new(0.0, 0.8, 0.0);
        let current = CameraPose::new(Vec3::new(9.0, 4.0, -2.0), target);
        let reset = reset_pose(current, target, &config);

        assert!((reset.distance() - current.distance()).abs() < 1e-4);
        let direction = (reset.position - reset.target).normalize();
        let expected = Vec3::new(0.0, config.initial_height, config.initial_distance).normalize();
        assert!((direction - expected).length() < 1e-5);
    }

    #[test]
    fn test_orbit_keeps_radius() {
        let current = CameraPose::new(Vec3::new(0.0, 2.0, 6.0), Vec3::ZERO);
        let orbited = orbit_pose(current, 0.7, 0.2);
        assert!((orbited.distance() - current.distance()).abs() < 1e-4);
        assert_ne!(orbited.position, current.position);

        let clamped = orbit_pose(current, 0.0, 10.0);
        assert!(clamped.position.y < clamped.distance());
    }
}
