//! ECS Events (Messages) for the vase scene.
//!
//! Scene events drained from [`crate::scene::VaseScene`] are republished as
//! messages so that rendering and UI systems can react to them.
//! Note: In Bevy 0.18+, buffered events use Message trait instead of Event.

use bevy::prelude::*;

use crate::coin::CoinId;
use crate::scene::{CameraPurpose, SceneEvent};
use crate::shatter::TriggerId;
use crate::vase::VaseId;

/// Message fired when the focused vase changes.
#[derive(Message, Debug, Clone)]
pub struct FocusChangedEvent {
    pub slot: usize,
    pub vase: VaseId,
}

/// Message fired when a shatter sequence starts or restarts.
#[derive(Message, Debug, Clone)]
pub struct DestroyStartedEvent {
    pub vase: VaseId,
    pub trigger: TriggerId,
    pub restarted: bool,
}

/// Message fired when a shatter sequence completes and the lock is released.
#[derive(Message, Debug, Clone)]
pub struct DestroyCompletedEvent {
    pub vase: VaseId,
    pub trigger: TriggerId,
    pub destroy_count: u32,
}

/// Message to swap between the intact mesh and the fragments.
#[derive(Message, Debug, Clone)]
pub struct MeshSwapEvent {
    pub vase: VaseId,
    pub shattered: bool,
}

/// Message fired when a container's sensor window opens or closes.
#[derive(Message, Debug, Clone)]
pub struct SensorWindowEvent {
    pub vase: VaseId,
    pub open: bool,
}

/// Message fired when a camera transition finishes.
#[derive(Message, Debug, Clone)]
pub struct CameraSettledEvent {
    pub purpose: CameraPurpose,
}

/// Message fired when a coin enters the physics world.
#[derive(Message, Debug, Clone)]
pub struct CoinSpawnedEvent {
    pub coin: CoinId,
    pub vase: VaseId,
}

/// Message fired when a coin leaves the physics world.
#[derive(Message, Debug, Clone)]
pub struct CoinDespawnedEvent {
    pub coin: CoinId,
}

/// Message fired when a vase's appearance was edited.
#[derive(Message, Debug, Clone)]
pub struct AppearanceChangedEvent {
    pub vase: VaseId,
}

/// Writers for every scene message, bundled for the publishing system.
#[derive(bevy::ecs::system::SystemParam)]
pub struct SceneMessageWriters<'w> {
    pub focus: MessageWriter<'w, FocusChangedEvent>,
    pub destroy_started: MessageWriter<'w, DestroyStartedEvent>,
    pub destroy_completed: MessageWriter<'w, DestroyCompletedEvent>,
    pub mesh_swap: MessageWriter<'w, MeshSwapEvent>,
    pub sensor_window: MessageWriter<'w, SensorWindowEvent>,
    pub camera_settled: MessageWriter<'w, CameraSettledEvent>,
    pub coin_spawned: MessageWriter<'w, CoinSpawnedEvent>,
    pub coin_despawned: MessageWriter<'w, CoinDespawnedEvent>,
    pub appearance: MessageWriter<'w, AppearanceChangedEvent>,
}

impl SceneMessageWriters<'_> {
    /// Routes one scene event to its message.
    pub fn publish(&mut self, event: SceneEvent) {
        match event {
            SceneEvent::FocusChanged { slot, vase } => {
                self.focus.write(FocusChangedEvent { slot, vase });
            }
            SceneEvent::DestroyStarted {
                vase,
                trigger,
                restarted,
            } => {
                self.destroy_started.write(DestroyStartedEvent {
                    vase,
                    trigger,
                    restarted,
                });
            }
            SceneEvent::DestroyCompleted {
                vase,
                trigger,
                destroy_count,
            } => {
                self.destroy_completed.write(DestroyCompletedEvent {
                    vase,
                    trigger,
                    destroy_count,
                });
            }
            SceneEvent::MeshSwap { vase, shattered } => {
                self.mesh_swap.write(MeshSwapEvent { vase, shattered });
            }
            SceneEvent::SensorWindow { vase, open } => {
                self.sensor_window.write(SensorWindowEvent { vase, open });
            }
            SceneEvent::CameraSettled { purpose } => {
                self.camera_settled.write(CameraSettledEvent { purpose });
            }
            SceneEvent::CoinSpawned { coin, vase } => {
                self.coin_spawned.write(CoinSpawnedEvent { coin, vase });
            }
            SceneEvent::CoinDespawned { coin } => {
                self.coin_despawned.write(CoinDespawnedEvent { coin });
            }
            SceneEvent::AppearanceChanged { vase } => {
                self.appearance.write(AppearanceChangedEvent { vase });
            }
        }
    }
}
