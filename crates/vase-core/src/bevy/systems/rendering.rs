//! Rendering systems for the vase scene.
//!
//! Attaches meshes and materials to logic entities once they appear. Vase
//! and fragment geometry here is procedural; fractured assets loaded by a
//! front end replace it by inserting their own `Mesh3d`.

use bevy::prelude::*;

use crate::bevy::{AppearanceChangedEvent, Coin, Fragment, IntactMesh, MainCamera, SceneRes};
use crate::vase::Color as VaseColor;

/// Mesh dimensions for procedural scene geometry.
#[derive(Resource, Debug, Clone)]
pub struct VaseVisualConfig {
    pub vase_radius: f32,
    pub vase_height: f32,
    /// Size of one placeholder shard (width, height, depth).
    pub shard_size: Vec3,
    pub coin_color: Color,
    pub light_illuminance: f32,
}

impl Default for VaseVisualConfig {
    fn default() -> Self {
        Self {
            vase_radius: 0.4,
            vase_height: 1.2,
            shard_size: Vec3::new(0.3, 0.4, 0.05),
            coin_color: Color::srgb(0.83, 0.69, 0.22),
            light_illuminance: 8_000.0,
        }
    }
}

pub fn to_render_color(color: VaseColor) -> Color {
    Color::srgba_u8(color.r, color.g, color.b, color.a)
}

/// Turns the logic camera into a rendering camera.
pub fn attach_render_camera(
    mut commands: Commands,
    cameras: Query<Entity, (With<MainCamera>, Without<Camera3d>)>,
) {
    for entity in cameras.iter() {
        commands.entity(entity).insert(Camera3d::default());
        tracing::info!("[rendering] Camera3d attached to main camera");
    }
}

pub fn spawn_lighting(mut commands: Commands, config: Res<VaseVisualConfig>) {
    commands.spawn((
        DirectionalLight {
            illuminance: config.light_illuminance,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Gives newly spawned intact vases a glazed cylinder.
pub fn attach_vase_meshes(
    mut commands: Commands,
    scene_res: Res<SceneRes>,
    config: Res<VaseVisualConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    added: Query<(Entity, &IntactMesh), Added<IntactMesh>>,
) {
    for (entity, intact) in added.iter() {
        let appearance = scene_res
            .scene
            .record(&intact.vase)
            .map(|record| record.appearance.clone())
            .unwrap_or_default();
        let mesh = Mesh::from(Cylinder::new(config.vase_radius, config.vase_height))
            .translated_by(Vec3::Y * config.vase_height * 0.5);
        commands.entity(entity).insert((
            Mesh3d(meshes.add(mesh)),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: to_render_color(appearance.base_color),
                perceptual_roughness: 0.35,
                ..default()
            })),
        ));
    }
}

/// Gives placeholder fragments a flat shard mesh around their centroid.
pub fn attach_fragment_meshes(
    mut commands: Commands,
    scene_res: Res<SceneRes>,
    config: Res<VaseVisualConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    added: Query<(Entity, &Fragment), (Added<Fragment>, Without<Mesh3d>)>,
) {
    for (entity, fragment) in added.iter() {
        let color = scene_res
            .scene
            .record(&fragment.vase)
            .map_or(VaseColor::TERRACOTTA, |record| record.appearance.base_color);
        let size = config.shard_size;
        let mesh =
            Mesh::from(Cuboid::new(size.x, size.y, size.z)).translated_by(fragment.local_center);
        commands.entity(entity).insert((
            Mesh3d(meshes.add(mesh)),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: to_render_color(color),
                ..default()
            })),
        ));
    }
}

pub fn attach_coin_meshes(
    mut commands: Commands,
    scene_res: Res<SceneRes>,
    config: Res<VaseVisualConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    added: Query<Entity, Added<Coin>>,
) {
    let coins = &scene_res.scene.config().coins;
    for entity in added.iter() {
        commands.entity(entity).insert((
            Mesh3d(meshes.add(Cylinder::new(coins.radius, coins.thickness))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: config.coin_color,
                metallic: 0.9,
                perceptual_roughness: 0.25,
                ..default()
            })),
        ));
    }
}

/// Recolors intact vases after an appearance edit.
pub fn apply_appearance_changes(
    mut changes: MessageReader<AppearanceChangedEvent>,
    scene_res: Res<SceneRes>,
    vases: Query<(&IntactMesh, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for change in changes.read() {
        let Some(record) = scene_res.scene.record(&change.vase) else {
            continue;
        };
        for (intact, material) in vases.iter() {
            if intact.vase != change.vase {
                continue;
            }
            if let Some(material) = materials.get_mut(&material.0) {
                material.base_color = to_render_color(record.appearance.base_color);
            }
        }
    }
}
