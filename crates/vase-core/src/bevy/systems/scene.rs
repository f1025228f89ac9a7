//! Scene systems.
//!
//! Spawns vase entities from the grid, ticks the scene state machine on both
//! clocks and republishes its events as messages.

use bevy::prelude::*;

use crate::bevy::systems::fragments::{FragmentQuery, TransformFragments, spawn_ring_fragments};
use crate::bevy::{
    AppPhase, FragmentsRoot, IntactMesh, PlaceholderFragments, SceneMessageWriters, SceneRes,
    Vase,
};
use crate::scene::ScenePhase;

/// Spawns one entity hierarchy per vase record.
///
/// ```text
/// Vase (grid position)
/// ├── IntactMesh (visible, spins with drag)
/// └── FragmentsRoot (hidden until shattered, spins with drag)
/// ```
pub fn spawn_vase_entities(
    mut commands: Commands,
    scene_res: Res<SceneRes>,
    placeholder: Option<Res<PlaceholderFragments>>,
) {
    let scene = &scene_res.scene;
    for record in scene.records() {
        let origin = scene.vase_position(record.slot);
        let vase = commands
            .spawn((
                Vase {
                    id: record.id.clone(),
                    slot: record.slot,
                },
                Transform::from_translation(origin),
                Visibility::Inherited,
            ))
            .id();

        commands.spawn((
            IntactMesh {
                vase: record.id.clone(),
            },
            Transform::IDENTITY,
            Visibility::Inherited,
            ChildOf(vase),
        ));

        let root = commands
            .spawn((
                FragmentsRoot {
                    vase: record.id.clone(),
                },
                Transform::IDENTITY,
                Visibility::Hidden,
                ChildOf(vase),
            ))
            .id();

        if let Some(placeholder) = placeholder.as_deref() {
            spawn_ring_fragments(
                &mut commands,
                root,
                &record.id,
                origin,
                placeholder.segments,
                placeholder.layers,
                placeholder.radius,
                placeholder.height,
            );
        }
    }

    tracing::info!("[scene] spawned {} vases", scene.vase_count());
}

/// Ticks the scene: frame time drives motion, real time drives timers.
pub fn advance_scene(
    time: Res<Time>,
    real_time: Res<Time<Real>>,
    mut scene_res: ResMut<SceneRes>,
    mut fragment_query: FragmentQuery,
) {
    let scene = &mut scene_res.scene;
    let mut fragments = TransformFragments::collect(&fragment_query);
    scene.update(time.delta_secs(), &mut fragments);
    scene.advance_clock(real_time.delta());
    fragments.write_back(&mut fragment_query);
}

/// Drains scene events into messages.
pub fn publish_scene_events(mut scene_res: ResMut<SceneRes>, mut writers: SceneMessageWriters) {
    for event in scene_res.scene.drain_events() {
        tracing::debug!("[scene] {:?}", event);
        writers.publish(event);
    }
}

/// Applies drag spin to the intact meshes and to the fragment roots, so a
/// spun vase shatters where it was left.
pub fn sync_vase_yaw(
    scene_res: Res<SceneRes>,
    mut meshes: Query<(&IntactMesh, &mut Transform), Without<FragmentsRoot>>,
    mut roots: Query<(&FragmentsRoot, &mut Transform), Without<IntactMesh>>,
) {
    let yaw = |vase| {
        scene_res
            .scene
            .record(vase)
            .map(|record| Quat::from_rotation_y(record.yaw))
    };

    for (mesh, transform) in meshes.iter_mut() {
        apply_yaw(yaw(&mesh.vase), transform);
    }
    for (root, transform) in roots.iter_mut() {
        apply_yaw(yaw(&root.vase), transform);
    }
}

fn apply_yaw(rotation: Option<Quat>, mut transform: Mut<Transform>) {
    if let Some(rotation) = rotation
        && transform.rotation != rotation
    {
        transform.rotation = rotation;
    }
}

/// Mirrors the scene phase into [`AppPhase`].
pub fn sync_app_phase(
    scene_res: Res<SceneRes>,
    phase: Res<State<AppPhase>>,
    mut next_phase: ResMut<NextState<AppPhase>>,
) {
    let target = match scene_res.scene.phase() {
        ScenePhase::Title => AppPhase::Title,
        ScenePhase::Scene => AppPhase::Scene,
    };
    if *phase.get() != target {
        tracing::info!("[scene] phase {:?} -> {:?}", phase.get(), target);
        next_phase.set(target);
    }
}
