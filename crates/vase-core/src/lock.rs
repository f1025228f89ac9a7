//! Interaction and lock state coordinator.
//!
//! Single source of truth for which exclusive interaction is running. The
//! lock flag is derived from the active destroy target and the three
//! exclusive modes (vase drag, camera drag, camera reset) are one enum, so
//! neither can drift out of sync.

use std::collections::HashSet;

use crate::vase::VaseId;

/// Which drag, if any, is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragMode {
    #[default]
    None,
    Vase,
    Camera,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ExclusiveMode {
    #[default]
    Idle,
    VaseDrag,
    CameraDrag,
    CameraReset,
}

/// Why a drag ended. All of them take the same release path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    PointerUp,
    PointerCancel,
    Blur,
    VisibilityHidden,
}

/// Why a destroy request was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Another vase is being destroyed.
    OtherTarget(VaseId),
    /// A drag is in progress.
    Dragging(DragMode),
    /// The camera is animating back into place.
    CameraResetting,
}

/// Outcome of [`InteractionCoordinator::begin_destroy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyDecision {
    /// A fresh destroy; the scene is now locked.
    Start,
    /// The same target asked again while destroying: restart its sequence.
    Retrigger,
    Rejected(RejectReason),
}

/// Snapshot of the interaction lock.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LockState {
    active_destroy_target: Option<VaseId>,
    mode: ExclusiveMode,
}

impl LockState {
    pub fn is_locked(&self) -> bool {
        self.active_destroy_target.is_some()
    }

    pub fn active_destroy_target(&self) -> Option<&VaseId> {
        self.active_destroy_target.as_ref()
    }

    pub fn dragging_mode(&self) -> DragMode {
        match self.mode {
            ExclusiveMode::VaseDrag => DragMode::Vase,
            ExclusiveMode::CameraDrag => DragMode::Camera,
            ExclusiveMode::Idle | ExclusiveMode::CameraReset => DragMode::None,
        }
    }

    pub fn is_camera_resetting(&self) -> bool {
        self.mode == ExclusiveMode::CameraReset
    }
}

#[derive(Debug, Clone, Default)]
pub struct InteractionCoordinator {
    state: LockState,
    in_flight: HashSet<VaseId>,
}

impl InteractionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LockState {
        &self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    pub fn is_in_flight(&self, target: &VaseId) -> bool {
        self.in_flight.contains(target)
    }

    fn is_free(&self) -> bool {
        !self.state.is_locked() && self.state.mode == ExclusiveMode::Idle
    }

    pub fn begin_vase_drag(&mut self) -> bool {
        if !self.is_free() {
            return false;
        }
        self.state.mode = ExclusiveMode::VaseDrag;
        true
    }

    pub fn begin_camera_drag(&mut self) -> bool {
        if !self.is_free() {
            return false;
        }
        self.state.mode = ExclusiveMode::CameraDrag;
        true
    }

    /// Whether a camera reset (or a navigation step) may start now.
    pub fn can_reset_camera(&self) -> bool {
        !self.state.is_locked()
            && matches!(
                self.state.mode,
                ExclusiveMode::Idle | ExclusiveMode::CameraReset
            )
    }

    /// Navigation moves the camera, so it follows the camera-reset gate.
    pub fn can_navigate(&self) -> bool {
        self.can_reset_camera()
    }

    /// Enters camera-reset mode. A reset already running is superseded.
    pub fn begin_camera_reset(&mut self) -> bool {
        if !self.can_reset_camera() {
            return false;
        }
        self.state.mode = ExclusiveMode::CameraReset;
        true
    }

    pub fn finish_camera_reset(&mut self) -> bool {
        if self.state.mode != ExclusiveMode::CameraReset {
            return false;
        }
        self.state.mode = ExclusiveMode::Idle;
        true
    }

    /// Ends whichever drag is active. Returns the drag that was released.
    pub fn release_drag(&mut self, reason: ReleaseReason) -> Option<DragMode> {
        let released = self.state.dragging_mode();
        if released == DragMode::None {
            return None;
        }

        tracing::debug!("[lock] {:?} drag released ({:?})", released, reason);
        self.state.mode = ExclusiveMode::Idle;
        Some(released)
    }

    pub fn begin_destroy(&mut self, target: &VaseId) -> DestroyDecision {
        match &self.state.active_destroy_target {
            Some(active) if active == target => return DestroyDecision::Retrigger,
            Some(active) => {
                return DestroyDecision::Rejected(RejectReason::OtherTarget(active.clone()));
            }
            None => {}
        }

        match self.state.mode {
            ExclusiveMode::Idle => {}
            ExclusiveMode::CameraReset => {
                return DestroyDecision::Rejected(RejectReason::CameraResetting);
            }
            ExclusiveMode::VaseDrag | ExclusiveMode::CameraDrag => {
                return DestroyDecision::Rejected(RejectReason::Dragging(
                    self.state.dragging_mode(),
                ));
            }
        }

        self.state.active_destroy_target = Some(target.clone());
        self.in_flight.insert(target.clone());
        tracing::debug!("[lock] Locked for {}", target);
        DestroyDecision::Start
    }

    /// Clears the in-flight guard for `target` and releases the lock.
    ///
    /// Returns false for a duplicate completion.
    pub fn complete_destroy(&mut self, target: &VaseId) -> bool {
        if !self.in_flight.remove(target) {
            tracing::debug!("[lock] Duplicate completion for {}", target);
            return false;
        }

        if self.state.active_destroy_target.as_ref() == Some(target) {
            self.state.active_destroy_target = None;
            tracing::debug!("[lock] Unlocked after {}", target);
        }
        true
    }
}
