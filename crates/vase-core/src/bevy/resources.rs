//! ECS Resources for the vase scene.

use std::collections::VecDeque;
use std::sync::Arc;

use bevy::prelude::*;
use parking_lot::Mutex;

use crate::lock::ReleaseReason;
use crate::scene::VaseScene;
use crate::shatter::TriggerId;
use crate::vase::{NavDirection, VaseAppearance, VaseId};

/// The scene state machine, owned by the ECS world.
#[derive(Resource, Debug)]
pub struct SceneRes {
    pub scene: VaseScene,
}

impl SceneRes {
    pub fn new(scene: VaseScene) -> Self {
        Self { scene }
    }
}

/// Procedural fragment rings spawned for vases without a fractured asset.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PlaceholderFragments {
    pub segments: usize,
    pub layers: usize,
    pub radius: f32,
    pub height: f32,
}

impl Default for PlaceholderFragments {
    fn default() -> Self {
        Self {
            segments: 8,
            layers: 3,
            radius: 0.4,
            height: 1.2,
        }
    }
}

/// Bevy-side mirror of [`crate::scene::ScenePhase`].
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppPhase {
    #[default]
    Title,
    Scene,
}

/// Intents that input layers push into the app.
#[derive(Debug, Clone)]
pub enum SceneCommand {
    /// Leave the title screen.
    EnterScene,
    /// Focus a grid slot directly.
    Focus { slot: usize },
    /// Step focus once.
    Navigate { direction: NavDirection },
    /// Start hold-to-repeat navigation.
    PressNavigation { direction: NavDirection },
    ReleaseNavigation,
    ResetCamera,
    BeginVaseDrag,
    DragVase { dx: f32 },
    BeginCameraDrag,
    OrbitCamera { dx: f32, dy: f32 },
    ReleasePointer { reason: ReleaseReason },
    /// Destroy the focused vase.
    Destroy,
    /// Destroy a specific vase, optionally with an explicit trigger token.
    DestroyVase {
        vase: VaseId,
        trigger: Option<TriggerId>,
    },
    SetBlastOffset { offset: Vec3 },
    ManifestCoin,
    SetAppearance {
        vase: VaseId,
        appearance: VaseAppearance,
    },
    FlushAppearances,
    /// Frame boundary marker - commands after this are processed in the next frame.
    Yield,
}

/// Thread-safe command queue shared with input front ends.
///
/// Clones share the same queue, so a front end can keep a handle while the
/// app owns another.
#[derive(Resource, Clone)]
pub struct CommandQueue {
    inner: Arc<Mutex<VecDeque<SceneCommand>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Push a command to be processed.
    pub fn push(&self, command: SceneCommand) {
        self.inner.lock().push_back(command);
    }

    /// Drain all pending commands.
    pub fn drain(&self) -> Vec<SceneCommand> {
        self.inner.lock().drain(..).collect()
    }

    /// Drain commands until Yield or empty.
    ///
    /// Yield itself is consumed but not returned; everything after it stays
    /// queued for the next frame.
    pub fn drain_until_yield(&self) -> Vec<SceneCommand> {
        let mut guard = self.inner.lock();
        let mut commands = Vec::new();

        while let Some(cmd) = guard.pop_front() {
            if matches!(cmd, SceneCommand::Yield) {
                tracing::debug!("[command] Yield - deferring remaining commands to next frame");
                break;
            }
            commands.push(cmd);
        }

        commands
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandQueue").field("len", &self.len()).finish()
    }
}
