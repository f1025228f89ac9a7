//! Interactive window with keyboard and mouse input.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{WindowFocused, WindowOccluded};
use vase_core::bevy::{CommandQueue, SceneCommand, VaseScenePlugin};
use vase_core::lock::ReleaseReason;
use vase_core::scene::VaseScene;
use vase_core::vase::NavDirection;

pub fn run(scene: VaseScene) {
    let queue = CommandQueue::new();
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Vase Scene".to_string(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(VaseScenePlugin::new(scene).with_command_queue(queue))
        .add_systems(Update, (map_keyboard, map_pointer, map_window_lifecycle))
        .run();
}

/// Enter leaves the title, arrows navigate with hold-repeat, space destroys,
/// C drops a coin, R resets the camera.
fn map_keyboard(keys: Res<ButtonInput<KeyCode>>, queue: Res<CommandQueue>) {
    if keys.just_pressed(KeyCode::Enter) {
        queue.push(SceneCommand::EnterScene);
    }
    if keys.just_pressed(KeyCode::ArrowRight) {
        queue.push(SceneCommand::PressNavigation {
            direction: NavDirection::Next,
        });
    }
    if keys.just_pressed(KeyCode::ArrowLeft) {
        queue.push(SceneCommand::PressNavigation {
            direction: NavDirection::Previous,
        });
    }
    if keys.just_released(KeyCode::ArrowRight) || keys.just_released(KeyCode::ArrowLeft) {
        queue.push(SceneCommand::ReleaseNavigation);
    }
    if keys.just_pressed(KeyCode::Space) {
        queue.push(SceneCommand::Destroy);
    }
    if keys.just_pressed(KeyCode::KeyC) {
        queue.push(SceneCommand::ManifestCoin);
    }
    if keys.just_pressed(KeyCode::KeyR) {
        queue.push(SceneCommand::ResetCamera);
    }
}

/// Left drag spins the vase, right drag orbits the camera.
fn map_pointer(
    buttons: Res<ButtonInput<MouseButton>>,
    mut motion: MessageReader<MouseMotion>,
    queue: Res<CommandQueue>,
) {
    if buttons.just_pressed(MouseButton::Left) {
        queue.push(SceneCommand::BeginVaseDrag);
    }
    if buttons.just_pressed(MouseButton::Right) {
        queue.push(SceneCommand::BeginCameraDrag);
    }

    let delta: Vec2 = motion.read().map(|m| m.delta).sum();
    if delta != Vec2::ZERO {
        if buttons.pressed(MouseButton::Left) {
            queue.push(SceneCommand::DragVase { dx: delta.x });
        } else if buttons.pressed(MouseButton::Right) {
            queue.push(SceneCommand::OrbitCamera {
                dx: delta.x,
                dy: delta.y,
            });
        }
    }

    if buttons.just_released(MouseButton::Left) || buttons.just_released(MouseButton::Right) {
        queue.push(SceneCommand::ReleasePointer {
            reason: ReleaseReason::PointerUp,
        });
    }
}

/// Losing focus or being hidden ends any drag; the button-up never arrives.
fn map_window_lifecycle(
    mut focused: MessageReader<WindowFocused>,
    mut occluded: MessageReader<WindowOccluded>,
    queue: Res<CommandQueue>,
) {
    let releases = focused
        .read()
        .filter_map(|event| focus_release(event.focused))
        .chain(occluded.read().filter_map(|event| occlusion_release(event.occluded)));

    for reason in releases {
        tracing::debug!("[input] window lifecycle release: {:?}", reason);
        queue.push(SceneCommand::ReleasePointer { reason });
    }
}

fn focus_release(focused: bool) -> Option<ReleaseReason> {
    (!focused).then_some(ReleaseReason::Blur)
}

/// Minimizing reports as occlusion.
fn occlusion_release(occluded: bool) -> Option<ReleaseReason> {
    occluded.then_some(ReleaseReason::VisibilityHidden)
}
