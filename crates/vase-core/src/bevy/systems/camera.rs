//! Camera system.
//!
//! The scene's camera rig is the source of truth; the ECS camera follows it.

use bevy::prelude::*;

use crate::bevy::{MainCamera, SceneRes};

/// Spawns the main camera entity at the scene's current pose.
///
/// Reuses an existing [`MainCamera`] if one was spawned elsewhere.
pub fn spawn_main_camera(
    mut commands: Commands,
    scene_res: Res<SceneRes>,
    existing: Query<Entity, With<MainCamera>>,
) {
    let pose = scene_res.scene.camera_pose();
    let transform = Transform::from_translation(pose.position).looking_at(pose.target, Vec3::Y);

    if let Ok(entity) = existing.single() {
        tracing::info!("[camera] reusing main camera");
        commands.entity(entity).insert(transform);
        return;
    }

    commands.spawn((MainCamera, transform));
    tracing::info!("[camera] main camera spawned at {:?}", pose.position);
}

/// Copies the rig pose onto the main camera transform.
pub fn sync_camera_transform(
    scene_res: Res<SceneRes>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) {
    let pose = scene_res.scene.camera_pose();
    let Ok(mut transform) = cameras.single_mut() else {
        return;
    };
    *transform = Transform::from_translation(pose.position).looking_at(pose.target, Vec3::Y);
}
