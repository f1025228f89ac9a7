//! Fragment systems.
//!
//! Bridges fragment entities to the shatter engine: rest pose capture,
//! a [`FragmentStore`] view over `Transform`s, and intact/shattered mesh
//! visibility swaps.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use crate::bevy::{Fragment, FragmentsRoot, IntactMesh, MeshSwapEvent, RestPose};
use crate::shatter::{FragmentStore, MeshFragment, ShardRestPose};
use crate::vase::VaseId;

/// Query used to read and write fragment transforms.
pub type FragmentQuery<'w, 's> =
    Query<'w, 's, (Entity, &'static Fragment, &'static RestPose, &'static mut Transform)>;

struct FragmentGroup {
    entities: Vec<Entity>,
    fragments: Vec<MeshFragment>,
    rest_poses: Vec<ShardRestPose>,
}

/// Snapshot of fragment transforms grouped by vase.
///
/// The engine mutates the snapshot; [`TransformFragments::write_back`]
/// copies only the groups it touched back onto their entities.
#[derive(Default)]
pub struct TransformFragments {
    groups: HashMap<VaseId, FragmentGroup>,
    touched: HashSet<VaseId>,
}

impl TransformFragments {
    /// Collects every fragment with a captured rest pose.
    pub fn collect(query: &FragmentQuery) -> Self {
        let mut staged: HashMap<VaseId, Vec<(usize, Entity, MeshFragment, ShardRestPose)>> =
            HashMap::new();
        for (entity, fragment, rest, transform) in query.iter() {
            let (x, y, z) = transform.rotation.to_euler(EulerRot::XYZ);
            let mesh = MeshFragment {
                position: transform.translation,
                rotation: Vec3::new(x, y, z),
                scale: transform.scale,
                local_center: fragment.local_center,
                parent_origin: fragment.origin,
            };
            staged
                .entry(fragment.vase.clone())
                .or_default()
                .push((fragment.index, entity, mesh, rest.0));
        }

        let groups = staged
            .into_iter()
            .map(|(vase, mut items)| {
                items.sort_by_key(|(index, ..)| *index);
                let mut group = FragmentGroup {
                    entities: Vec::with_capacity(items.len()),
                    fragments: Vec::with_capacity(items.len()),
                    rest_poses: Vec::with_capacity(items.len()),
                };
                for (_, entity, mesh, rest) in items {
                    group.entities.push(entity);
                    group.fragments.push(mesh);
                    group.rest_poses.push(rest);
                }
                (vase, group)
            })
            .collect();

        Self {
            groups,
            touched: HashSet::new(),
        }
    }

    /// Copies mutated fragments back onto their transforms.
    pub fn write_back(self, query: &mut FragmentQuery) {
        for vase in &self.touched {
            let Some(group) = self.groups.get(vase) else {
                continue;
            };
            for (entity, mesh) in group.entities.iter().zip(&group.fragments) {
                if let Ok((_, _, _, mut transform)) = query.get_mut(*entity) {
                    transform.translation = mesh.position;
                    transform.rotation = Quat::from_euler(
                        EulerRot::XYZ,
                        mesh.rotation.x,
                        mesh.rotation.y,
                        mesh.rotation.z,
                    );
                    transform.scale = mesh.scale;
                }
            }
        }
    }
}

impl FragmentStore for TransformFragments {
    type Fragment = MeshFragment;

    fn fragments(&mut self, vase: &VaseId) -> Option<(&mut [MeshFragment], &[ShardRestPose])> {
        let group = self.groups.get_mut(vase)?;
        if group.fragments.is_empty() {
            return None;
        }
        self.touched.insert(vase.clone());
        Some((&mut group.fragments, &group.rest_poses))
    }
}

/// Captures the intact pose of fragments the first time they are seen.
pub fn capture_rest_poses(
    mut commands: Commands,
    fragments: Query<(Entity, &Fragment, &Transform), Without<RestPose>>,
) {
    for (entity, fragment, transform) in fragments.iter() {
        let (x, y, z) = transform.rotation.to_euler(EulerRot::XYZ);
        let rest = ShardRestPose {
            position: transform.translation,
            rotation: Vec3::new(x, y, z),
            scale: transform.scale,
        };
        tracing::debug!(
            "[fragments] captured rest pose for {} #{}",
            fragment.vase,
            fragment.index
        );
        commands.entity(entity).insert(RestPose(rest));
    }
}

/// Toggles intact and fragment visibility on mesh swap messages.
pub fn apply_mesh_swaps(
    mut swaps: MessageReader<MeshSwapEvent>,
    mut intact: Query<(&IntactMesh, &mut Visibility), Without<FragmentsRoot>>,
    mut roots: Query<(&FragmentsRoot, &mut Visibility), Without<IntactMesh>>,
) {
    for swap in swaps.read() {
        let (intact_visibility, shards_visibility) = if swap.shattered {
            (Visibility::Hidden, Visibility::Inherited)
        } else {
            (Visibility::Inherited, Visibility::Hidden)
        };
        for (mesh, mut visibility) in intact.iter_mut() {
            if mesh.vase == swap.vase {
                *visibility = intact_visibility;
            }
        }
        for (root, mut visibility) in roots.iter_mut() {
            if root.vase == swap.vase {
                *visibility = shards_visibility;
            }
        }
    }
}

/// Spawns a ring of placeholder fragments under `root`.
///
/// Used when no pre-fractured asset is available for a vase.
#[allow(clippy::too_many_arguments)]
pub fn spawn_ring_fragments(
    commands: &mut Commands,
    root: Entity,
    vase: &VaseId,
    origin: Vec3,
    segments: usize,
    layers: usize,
    radius: f32,
    height: f32,
) -> usize {
    let ring = MeshFragment::ring(origin, segments, layers, radius, height);
    let count = ring.len();
    for (index, mesh) in ring.into_iter().enumerate() {
        commands.spawn((
            Fragment {
                vase: vase.clone(),
                index,
                local_center: mesh.local_center,
                origin,
            },
            Transform::IDENTITY,
            Visibility::Inherited,
            ChildOf(root),
        ));
    }
    count
}
