//! Scene orchestration.
//!
//! [`VaseScene`] owns every piece of scene state and is the only place where
//! user intents are turned into state changes. Intents pass the
//! [`InteractionCoordinator`] first; accepted ones start a shatter sequence or
//! a camera transition. Two clocks drive it:
//!
//! - [`VaseScene::update`] with frame time, for shard integration, camera
//!   easing and coin physics.
//! - [`VaseScene::advance_clock`] with real time, for sequence completion,
//!   sensor windows, autosave and hold-to-repeat.
//!
//! Everything observable comes out as [`SceneEvent`]s via
//! [`VaseScene::drain_events`].

use std::collections::HashMap;
use std::time::Duration;

use bevy::math::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::camera::{
    CameraAnimator, CameraControls, CameraPose, CameraRig, default_pose, focus_pose, orbit_pose,
    reset_pose, title_pose, vase_target,
};
use crate::coin::{CoinField, CoinId};
use crate::config::{ConfigError, SceneConfig};
use crate::lock::{
    DestroyDecision, DragMode, InteractionCoordinator, LockState, RejectReason, ReleaseReason,
};
use crate::persistence::PersistenceSink;
use crate::shatter::{ExplosionParameters, FragmentStore, ShatterEngine, StartOutcome, TriggerId};
use crate::timer::{TimerId, TimerQueue};
use crate::vase::{HoldRepeat, NavDirection, VaseAppearance, VaseGrid, VaseId, VaseRecord};

/// Keeps the coin RNG stream apart from the explosion RNG stream.
const COIN_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("invalid scene config: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScenePhase {
    /// Title screen; intents are ignored.
    #[default]
    Title,
    Scene,
}

/// Why the camera is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraPurpose {
    Title,
    Focus,
    Reset,
}

/// Observable scene changes.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    FocusChanged { slot: usize, vase: VaseId },
    DestroyStarted {
        vase: VaseId,
        trigger: TriggerId,
        restarted: bool,
    },
    DestroyCompleted {
        vase: VaseId,
        trigger: TriggerId,
        destroy_count: u32,
    },
    /// Show the fragments (`shattered`) or the intact mesh.
    MeshSwap { vase: VaseId, shattered: bool },
    SensorWindow { vase: VaseId, open: bool },
    CameraSettled { purpose: CameraPurpose },
    CoinSpawned { coin: CoinId, vase: VaseId },
    CoinDespawned { coin: CoinId },
    AppearanceChanged { vase: VaseId },
}

/// Result of a destroy intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyOutcome {
    Started(TriggerId),
    Restarted(TriggerId),
    /// The token was already applied.
    Duplicate,
    /// Fragments are not loaded yet; try again later.
    MissingAssets,
    Rejected(RejectReason),
    UnknownVase,
    /// Still on the title screen.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SceneTimer {
    ShatterComplete { vase: VaseId, trigger: TriggerId },
    SensorWindowClosed { vase: VaseId, trigger: TriggerId },
    Autosave,
}

pub struct VaseScene {
    config: SceneConfig,
    grid: VaseGrid,
    phase: ScenePhase,
    records: Vec<VaseRecord>,
    focused: usize,
    coordinator: InteractionCoordinator,
    engines: HashMap<VaseId, ShatterEngine>,
    animator: CameraAnimator,
    camera_purpose: Option<CameraPurpose>,
    rig: CameraRig,
    timers: TimerQueue<SceneTimer>,
    sensor_windows: HashMap<VaseId, TimerId>,
    autosave: Option<TimerId>,
    last_trigger: TriggerId,
    rng: ChaCha8Rng,
    sink: Box<dyn PersistenceSink>,
    coins: CoinField,
    hold: HoldRepeat,
    blast_offset: Vec3,
    events: Vec<SceneEvent>,
}

impl std::fmt::Debug for VaseScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaseScene")
            .field("phase", &self.phase)
            .field("focused", &self.focused)
            .field("lock", self.coordinator.state())
            .field("camera", &self.rig.pose)
            .field("pending_timers", &self.timers.len())
            .finish_non_exhaustive()
    }
}

impl VaseScene {
    pub fn new(config: SceneConfig, sink: Box<dyn PersistenceSink>) -> Result<Self, SceneError> {
        config.validate()?;

        let grid = VaseGrid::from_config(&config.grid);
        let records = grid.build_records();

        let mut coins = CoinField::new(
            config.coins.clone(),
            config.seed ^ COIN_SEED_SALT,
            config.shatter.gravity,
        );
        let mut engines = HashMap::new();
        for record in &records {
            coins.add_container(record.id.clone(), grid.position(record.slot));
            engines.insert(record.id.clone(), ShatterEngine::new());
        }

        let hold = HoldRepeat::new(
            Duration::from_millis(config.input.repeat_delay_ms),
            Duration::from_millis(config.input.repeat_interval_ms),
        );

        tracing::info!(
            "[scene] Created {} vases (seed {})",
            records.len(),
            config.seed
        );

        Ok(Self {
            rig: CameraRig::new(title_pose(&config.camera)),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            grid,
            phase: ScenePhase::Title,
            records,
            focused: 0,
            coordinator: InteractionCoordinator::new(),
            engines,
            animator: CameraAnimator::new(),
            camera_purpose: None,
            timers: TimerQueue::new(),
            sensor_windows: HashMap::new(),
            autosave: None,
            last_trigger: 0,
            sink,
            coins,
            hold,
            blast_offset: Vec3::ZERO,
            events: Vec::new(),
            config,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn vase_count(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[VaseRecord] {
        &self.records
    }

    pub fn record(&self, vase: &VaseId) -> Option<&VaseRecord> {
        self.records.iter().find(|r| &r.id == vase)
    }

    pub fn vase_id(&self, slot: usize) -> Option<&VaseId> {
        self.records.get(slot).map(|r| &r.id)
    }

    /// World position of the base of the vase at `slot`.
    pub fn vase_position(&self, slot: usize) -> Vec3 {
        self.grid.position(slot)
    }

    pub fn focused_slot(&self) -> usize {
        self.focused
    }

    pub fn focused_vase(&self) -> Option<&VaseId> {
        self.vase_id(self.focused)
    }

    pub fn lock_state(&self) -> &LockState {
        self.coordinator.state()
    }

    pub fn is_locked(&self) -> bool {
        self.coordinator.is_locked()
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.rig.pose()
    }

    pub fn is_camera_animating(&self) -> bool {
        self.animator.is_active()
    }

    pub fn engine(&self, vase: &VaseId) -> Option<&ShatterEngine> {
        self.engines.get(vase)
    }

    pub fn coins(&self) -> &CoinField {
        &self.coins
    }

    pub fn blast_offset(&self) -> Vec3 {
        self.blast_offset
    }

    /// Nudge added to the blast center of every later sequence.
    pub fn set_blast_offset(&mut self, offset: Vec3) {
        self.blast_offset = offset;
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    fn slot_of(&self, vase: &VaseId) -> Option<usize> {
        self.records.iter().position(|r| &r.id == vase)
    }

    fn in_scene(&self) -> bool {
        self.phase == ScenePhase::Scene
    }

    // ========================================================================
    // Title
    // ========================================================================

    /// Leaves the title screen and flies the camera to the focused vase.
    pub fn enter_scene(&mut self) -> bool {
        if self.in_scene() {
            return false;
        }
        self.phase = ScenePhase::Scene;

        let target = vase_target(self.grid.position(self.focused), &self.config.camera);
        let to = default_pose(target, &self.config.camera);
        self.start_camera_move(to, CameraPurpose::Title);

        tracing::info!("[scene] Entered scene");
        if let Some(vase) = self.focused_vase().cloned() {
            self.events.push(SceneEvent::FocusChanged {
                slot: self.focused,
                vase,
            });
        }
        true
    }

    // ========================================================================
    // Camera
    // ========================================================================

    fn start_camera_move(&mut self, to: CameraPose, purpose: CameraPurpose) -> bool {
        if !self.coordinator.begin_camera_reset() {
            return false;
        }

        let transition = match purpose {
            CameraPurpose::Title => &self.config.camera.title,
            CameraPurpose::Focus => &self.config.camera.focus,
            CameraPurpose::Reset => &self.config.camera.reset,
        };
        self.animator.begin_with(self.rig.pose(), to, transition);
        self.camera_purpose = Some(purpose);
        true
    }

    /// Eases the camera back to the default view of the focused vase.
    pub fn reset_camera(&mut self) -> bool {
        if !self.in_scene() {
            return false;
        }
        let target = vase_target(self.grid.position(self.focused), &self.config.camera);
        let to = reset_pose(self.rig.pose(), target, &self.config.camera);
        self.start_camera_move(to, CameraPurpose::Reset)
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Focuses the vase at `slot`.
    pub fn focus(&mut self, slot: usize) -> bool {
        if !self.in_scene() || slot >= self.records.len() || !self.coordinator.can_navigate() {
            return false;
        }

        let target = vase_target(self.grid.position(slot), &self.config.camera);
        let to = focus_pose(self.rig.pose(), target);
        if !self.start_camera_move(to, CameraPurpose::Focus) {
            return false;
        }

        self.focused = slot;
        self.events.push(SceneEvent::FocusChanged {
            slot,
            vase: self.records[slot].id.clone(),
        });
        tracing::debug!("[scene] Focus -> slot {}", slot);
        true
    }

    fn step_focus(&mut self, direction: NavDirection) -> bool {
        let slot = direction.step(self.focused, self.records.len());
        self.focus(slot)
    }

    pub fn next_vase(&mut self) -> bool {
        self.step_focus(NavDirection::Next)
    }

    pub fn previous_vase(&mut self) -> bool {
        self.step_focus(NavDirection::Previous)
    }

    /// Steps once and starts hold-to-repeat in `direction`.
    pub fn press_navigation(&mut self, direction: NavDirection) -> bool {
        if !self.in_scene() {
            return false;
        }
        self.hold.press(direction);
        self.step_focus(direction)
    }

    pub fn release_navigation(&mut self) {
        self.hold.release();
    }

    // ========================================================================
    // Drags
    // ========================================================================

    pub fn begin_vase_drag(&mut self) -> bool {
        self.in_scene() && self.coordinator.begin_vase_drag()
    }

    /// Spins the focused vase by a horizontal pointer delta.
    pub fn drag_vase(&mut self, dx: f32) -> bool {
        if self.coordinator.state().dragging_mode() != DragMode::Vase {
            return false;
        }
        let sensitivity = self.config.input.vase_drag_sensitivity;
        match self.records.get_mut(self.focused) {
            Some(record) => {
                record.yaw += dx * sensitivity;
                true
            }
            None => false,
        }
    }

    pub fn begin_camera_drag(&mut self) -> bool {
        self.in_scene() && self.coordinator.begin_camera_drag()
    }

    /// Orbits the camera by a pointer delta.
    pub fn orbit_camera(&mut self, dx: f32, dy: f32) -> bool {
        if self.coordinator.state().dragging_mode() != DragMode::Camera {
            return false;
        }
        let sensitivity = self.config.input.orbit_sensitivity;
        let pose = orbit_pose(self.rig.pose(), -dx * sensitivity, dy * sensitivity);
        self.rig.apply_pose(pose);
        true
    }

    /// Ends any drag. Releasing a camera drag eases the camera back.
    pub fn release_pointer(&mut self, reason: ReleaseReason) -> Option<DragMode> {
        let released = self.coordinator.release_drag(reason)?;
        if released == DragMode::Camera {
            self.reset_camera();
        }
        Some(released)
    }

    // ========================================================================
    // Destroy
    // ========================================================================

    /// Destroys the focused vase.
    pub fn trigger_destroy<S: FragmentStore>(&mut self, store: &mut S) -> DestroyOutcome {
        match self.focused_vase().cloned() {
            Some(vase) => self.destroy(&vase, store),
            None => DestroyOutcome::UnknownVase,
        }
    }

    /// Destroys `vase` with a fresh trigger token.
    pub fn destroy<S: FragmentStore>(&mut self, vase: &VaseId, store: &mut S) -> DestroyOutcome {
        let trigger = self.last_trigger + 1;
        self.destroy_with_token(vase, trigger, store)
    }

    /// Destroys `vase` with a caller-supplied token.
    ///
    /// A token at or below the last one applied to this vase is a duplicate
    /// and changes nothing.
    pub fn destroy_with_token<S: FragmentStore>(
        &mut self,
        vase: &VaseId,
        trigger: TriggerId,
        store: &mut S,
    ) -> DestroyOutcome {
        if !self.in_scene() {
            return DestroyOutcome::Ignored;
        }
        let Some(slot) = self.slot_of(vase) else {
            return DestroyOutcome::UnknownVase;
        };

        let engine = self.engines.entry(vase.clone()).or_default();
        if engine.last_trigger().is_some_and(|last| trigger <= last) {
            tracing::debug!("[scene] Duplicate destroy token {} for {}", trigger, vase);
            return DestroyOutcome::Duplicate;
        }

        let Some((fragments, rest_poses)) = store.fragments(vase) else {
            tracing::debug!("[scene] Fragments for {} not loaded", vase);
            return DestroyOutcome::MissingAssets;
        };
        if fragments.is_empty() || fragments.len() != rest_poses.len() {
            tracing::debug!("[scene] Fragments for {} incomplete", vase);
            return DestroyOutcome::MissingAssets;
        }

        let decision = self.coordinator.begin_destroy(vase);
        if let DestroyDecision::Rejected(reason) = decision {
            tracing::debug!("[scene] Destroy of {} rejected: {:?}", vase, reason);
            return DestroyOutcome::Rejected(reason);
        }

        let center = self.grid.position(slot) + Vec3::Y * self.config.shatter.blast_height;
        let params =
            ExplosionParameters::new(center, self.blast_offset, &self.config.shatter.explosion);
        let outcome = engine.start_sequence(
            fragments,
            rest_poses,
            &params,
            trigger,
            &self.config.shatter,
            &mut self.rng,
            &mut self.timers,
            SceneTimer::ShatterComplete {
                vase: vase.clone(),
                trigger,
            },
        );

        let restarted = match outcome {
            StartOutcome::Started => false,
            StartOutcome::Restarted => true,
            StartOutcome::Duplicate | StartOutcome::MissingAssets => {
                if decision == DestroyDecision::Start {
                    self.coordinator.complete_destroy(vase);
                }
                return match outcome {
                    StartOutcome::Duplicate => DestroyOutcome::Duplicate,
                    _ => DestroyOutcome::MissingAssets,
                };
            }
        };

        self.last_trigger = self.last_trigger.max(trigger);
        self.open_sensor_window(vase, trigger);

        if !restarted {
            self.events.push(SceneEvent::MeshSwap {
                vase: vase.clone(),
                shattered: true,
            });
        }
        self.events.push(SceneEvent::DestroyStarted {
            vase: vase.clone(),
            trigger,
            restarted,
        });

        if restarted {
            DestroyOutcome::Restarted(trigger)
        } else {
            DestroyOutcome::Started(trigger)
        }
    }

    fn open_sensor_window(&mut self, vase: &VaseId, trigger: TriggerId) {
        let already_open = match self.sensor_windows.remove(vase) {
            Some(pending) => self.timers.cancel(pending),
            None => false,
        };

        self.coins.set_container_passable(vase, true);
        let timer = self.timers.schedule(
            Duration::from_millis(self.config.shatter.sensor_window_ms),
            SceneTimer::SensorWindowClosed {
                vase: vase.clone(),
                trigger,
            },
        );
        self.sensor_windows.insert(vase.clone(), timer);

        if !already_open {
            self.events.push(SceneEvent::SensorWindow {
                vase: vase.clone(),
                open: true,
            });
        }
    }

    fn close_sensor_window(&mut self, vase: &VaseId, trigger: TriggerId) {
        self.sensor_windows.remove(vase);
        self.coins.set_container_passable(vase, false);
        tracing::debug!("[scene] Sensor window of {} closed (trigger {})", vase, trigger);
        self.events.push(SceneEvent::SensorWindow {
            vase: vase.clone(),
            open: false,
        });
    }

    fn finish_destroy(&mut self, vase: &VaseId, trigger: TriggerId) {
        let Some(engine) = self.engines.get_mut(vase) else {
            return;
        };
        if !engine.complete(trigger) {
            return;
        }
        if !self.coordinator.complete_destroy(vase) {
            tracing::warn!("[scene] Completion for {} was not in flight", vase);
            return;
        }

        let Some(record) = self.records.iter_mut().find(|r| &r.id == vase) else {
            return;
        };
        record.destroy_count += 1;
        let destroy_count = record.destroy_count;

        if let Err(err) = self.sink.record_destroy(vase, destroy_count) {
            tracing::warn!("[scene] Failed to persist destroy count of {}: {}", vase, err);
        }

        tracing::info!(
            "[scene] {} destroyed (trigger {}, count {})",
            vase,
            trigger,
            destroy_count
        );
        self.events.push(SceneEvent::MeshSwap {
            vase: vase.clone(),
            shattered: false,
        });
        self.events.push(SceneEvent::DestroyCompleted {
            vase: vase.clone(),
            trigger,
            destroy_count,
        });
    }

    // ========================================================================
    // Coins
    // ========================================================================

    /// Drops a coin into the focused vase.
    pub fn manifest_coin(&mut self) -> Option<CoinId> {
        if !self.in_scene() {
            return None;
        }
        let vase = self.focused_vase()?.clone();
        let base = self.grid.position(self.focused);

        let spawn = self.coins.spawn_coin(&vase, base);
        for coin in spawn.evicted {
            self.events.push(SceneEvent::CoinDespawned { coin });
        }
        self.events.push(SceneEvent::CoinSpawned {
            coin: spawn.id,
            vase,
        });
        Some(spawn.id)
    }

    // ========================================================================
    // Appearance
    // ========================================================================

    /// Replaces the look of `vase` and schedules an autosave.
    pub fn set_appearance(&mut self, vase: &VaseId, appearance: VaseAppearance) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| &r.id == vase) else {
            return false;
        };
        record.appearance = appearance;
        record.appearance_dirty = true;

        if self.autosave.is_none() {
            self.autosave = Some(self.timers.schedule(
                Duration::from_millis(self.config.persistence.autosave_interval_ms),
                SceneTimer::Autosave,
            ));
        }
        self.events.push(SceneEvent::AppearanceChanged { vase: vase.clone() });
        true
    }

    /// Saves every dirty appearance now. Returns how many were saved.
    pub fn flush_appearances(&mut self) -> usize {
        if let Some(timer) = self.autosave.take() {
            self.timers.cancel(timer);
        }

        let mut saved = 0;
        let mut failed = 0;
        for record in self.records.iter_mut().filter(|r| r.appearance_dirty) {
            match self.sink.save_appearance(&record.id, &record.appearance) {
                Ok(()) => {
                    record.appearance_dirty = false;
                    saved += 1;
                }
                Err(err) => {
                    tracing::warn!("[scene] Failed to save appearance of {}: {}", record.id, err);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            self.autosave = Some(self.timers.schedule(
                Duration::from_millis(self.config.persistence.autosave_interval_ms),
                SceneTimer::Autosave,
            ));
        }
        saved
    }

    // ========================================================================
    // Ticks
    // ========================================================================

    /// Frame-time tick.
    pub fn update<S: FragmentStore>(&mut self, frame_dt: f32, store: &mut S) {
        for (vase, engine) in &mut self.engines {
            if !engine.is_exploding() {
                continue;
            }
            if let Some((fragments, _)) = store.fragments(vase) {
                engine.update(frame_dt, fragments, &self.config.shatter);
            }
        }

        if self.animator.tick(frame_dt, &mut self.rig).is_some() {
            self.coordinator.finish_camera_reset();
            if let Some(purpose) = self.camera_purpose.take() {
                self.events.push(SceneEvent::CameraSettled { purpose });
            }
        }

        for coin in self.coins.update(frame_dt) {
            self.events.push(SceneEvent::CoinDespawned { coin });
        }
    }

    /// Wall-clock tick.
    pub fn advance_clock(&mut self, real_dt: Duration) {
        for timer in self.timers.advance(real_dt) {
            match timer {
                SceneTimer::ShatterComplete { vase, trigger } => {
                    self.finish_destroy(&vase, trigger);
                }
                SceneTimer::SensorWindowClosed { vase, trigger } => {
                    self.close_sensor_window(&vase, trigger);
                }
                SceneTimer::Autosave => {
                    self.autosave = None;
                    self.flush_appearances();
                }
            }
        }

        if let Some((direction, steps)) = self.hold.advance(real_dt) {
            for _ in 0..steps {
                self.step_focus(direction);
            }
        }
    }
}
