//! Coin systems.
//!
//! Mirrors coin bodies from the scene's physics world as entities.

use bevy::prelude::*;

use crate::bevy::{Coin, CoinDespawnedEvent, CoinSpawnedEvent, SceneRes};

/// Spawns and despawns coin entities to match the physics world.
pub fn sync_coin_entities(
    mut commands: Commands,
    scene_res: Res<SceneRes>,
    mut spawned: MessageReader<CoinSpawnedEvent>,
    mut despawned: MessageReader<CoinDespawnedEvent>,
    coins: Query<(Entity, &Coin)>,
) {
    for event in despawned.read() {
        for (entity, coin) in coins.iter() {
            if coin.id == event.coin {
                commands.entity(entity).despawn();
            }
        }
    }

    for event in spawned.read() {
        let Some((position, rotation)) = scene_res.scene.coins().coin_pose(event.coin) else {
            // Evicted in the same frame it was spawned.
            continue;
        };
        commands.spawn((
            Coin { id: event.coin },
            Transform::from_translation(position).with_rotation(rotation),
            Visibility::Inherited,
        ));
        tracing::debug!("[coins] coin {} spawned over {}", event.coin, event.vase);
    }
}

/// Copies rigid-body poses onto coin transforms.
pub fn sync_coin_transforms(scene_res: Res<SceneRes>, mut coins: Query<(&Coin, &mut Transform)>) {
    let field = scene_res.scene.coins();
    for (coin, mut transform) in coins.iter_mut() {
        if let Some((position, rotation)) = field.coin_pose(coin.id) {
            transform.translation = position;
            transform.rotation = rotation;
        }
    }
}
