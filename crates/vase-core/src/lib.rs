//! Vase Scene Core Library
//!
//! Shatter simulation, camera animation and interaction gating for a grid of
//! customizable vases.
//!
//! The library has two layers:
//! - Plain modules: engine-agnostic state machines driven by explicit ticks
//! - Bevy mode: ECS integration wiring [`scene::VaseScene`] into an `App`

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod camera;
pub mod coin;
pub mod config;
pub mod lock;
pub mod persistence;
pub mod physics;
pub mod scene;
pub mod shatter;
pub mod timer;
pub mod vase;

// Bevy integration
pub mod bevy;

pub use camera::{CameraAnimator, CameraControls, CameraPose, CameraResetTask, CameraRig};
pub use coin::{CoinField, CoinId};
pub use config::{ConfigError, ExplosionTuning, SceneConfig};
pub use lock::{DestroyDecision, DragMode, InteractionCoordinator, LockState, ReleaseReason};
pub use persistence::{MemorySink, NullSink, PersistenceError, PersistenceSink};
pub use physics::{PHYSICS_DT, PhysicsWorld, default_gravity};
pub use scene::{CameraPurpose, DestroyOutcome, SceneError, SceneEvent, ScenePhase, VaseScene};
pub use shatter::{
    ExplosionParameters, Fragment, FragmentSet, FragmentStore, MeshFragment, ShardRestPose,
    ShatterEngine, TriggerId,
};
pub use timer::{TimerId, TimerQueue};
pub use vase::{Color, NavDirection, VaseAppearance, VaseId, VaseRecord};
