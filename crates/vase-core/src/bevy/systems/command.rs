//! Command processing system.
//!
//! Applies queued input intents to the scene.

use bevy::prelude::*;

use crate::bevy::systems::fragments::{FragmentQuery, TransformFragments};
use crate::bevy::{CommandQueue, SceneCommand, SceneRes};
use crate::scene::DestroyOutcome;
use crate::vase::NavDirection;

/// System to process all commands from the external command queue.
///
/// Handles commands until a Yield is encountered.
/// Commands after Yield are processed in the next frame.
pub fn process_commands(
    command_queue: Res<CommandQueue>,
    mut scene_res: ResMut<SceneRes>,
    mut fragment_query: FragmentQuery,
) {
    let commands = command_queue.drain_until_yield();
    if commands.is_empty() {
        return;
    }

    let scene = &mut scene_res.scene;
    let mut fragments = TransformFragments::collect(&fragment_query);

    for command in commands {
        match command {
            SceneCommand::EnterScene => {
                let entered = scene.enter_scene();
                tracing::info!("[command] EnterScene (entered={})", entered);
            }
            SceneCommand::Focus { slot } => {
                let moved = scene.focus(slot);
                tracing::info!("[command] Focus slot {} (moved={})", slot, moved);
            }
            SceneCommand::Navigate { direction } => {
                let moved = match direction {
                    NavDirection::Next => scene.next_vase(),
                    NavDirection::Previous => scene.previous_vase(),
                };
                tracing::info!("[command] Navigate {:?} (moved={})", direction, moved);
            }
            SceneCommand::PressNavigation { direction } => {
                let moved = scene.press_navigation(direction);
                tracing::info!("[command] PressNavigation {:?} (moved={})", direction, moved);
            }
            SceneCommand::ReleaseNavigation => {
                scene.release_navigation();
            }
            SceneCommand::ResetCamera => {
                let started = scene.reset_camera();
                tracing::info!("[command] ResetCamera (started={})", started);
            }
            SceneCommand::BeginVaseDrag => {
                let started = scene.begin_vase_drag();
                tracing::debug!("[command] BeginVaseDrag (started={})", started);
            }
            SceneCommand::DragVase { dx } => {
                scene.drag_vase(dx);
            }
            SceneCommand::BeginCameraDrag => {
                let started = scene.begin_camera_drag();
                tracing::debug!("[command] BeginCameraDrag (started={})", started);
            }
            SceneCommand::OrbitCamera { dx, dy } => {
                scene.orbit_camera(dx, dy);
            }
            SceneCommand::ReleasePointer { reason } => {
                let released = scene.release_pointer(reason);
                tracing::debug!("[command] ReleasePointer {:?} -> {:?}", reason, released);
            }
            SceneCommand::Destroy => {
                let outcome = scene.trigger_destroy(&mut fragments);
                log_destroy_outcome(None, &outcome);
            }
            SceneCommand::DestroyVase { vase, trigger } => {
                let outcome = match trigger {
                    Some(token) => scene.destroy_with_token(&vase, token, &mut fragments),
                    None => scene.destroy(&vase, &mut fragments),
                };
                log_destroy_outcome(Some(vase.as_str()), &outcome);
            }
            SceneCommand::SetBlastOffset { offset } => {
                scene.set_blast_offset(offset);
            }
            SceneCommand::ManifestCoin => match scene.manifest_coin() {
                Some(coin) => tracing::info!("[command] ManifestCoin -> coin {}", coin),
                None => tracing::debug!("[command] ManifestCoin ignored"),
            },
            SceneCommand::SetAppearance { vase, appearance } => {
                let changed = scene.set_appearance(&vase, appearance);
                tracing::info!("[command] SetAppearance {} (changed={})", vase, changed);
            }
            SceneCommand::FlushAppearances => {
                let saved = scene.flush_appearances();
                tracing::info!("[command] FlushAppearances saved {}", saved);
            }
            // Yield is consumed by drain_until_yield(), should not reach here
            SceneCommand::Yield => {}
        }
    }

    fragments.write_back(&mut fragment_query);
}

fn log_destroy_outcome(vase: Option<&str>, outcome: &DestroyOutcome) {
    tracing::info!("[command] Destroy {} -> {:?}", vase.unwrap_or("focused"), outcome);
}
