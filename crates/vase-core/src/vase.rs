//! Vase identity, appearance and grid layout.

use std::fmt;
use std::time::Duration;

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::GridConfig;

/// Stable identifier of a vase in the grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VaseId(String);

impl VaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VaseId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for VaseId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// RGBA color representation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const TERRACOTTA: Color = Color::rgb(204, 102, 68);
    pub const CELADON: Color = Color::rgb(172, 225, 175);
    pub const COBALT: Color = Color::rgb(0, 71, 171);
    pub const IVORY: Color = Color::rgb(255, 255, 240);
    pub const GOLD: Color = Color::rgb(212, 175, 55);
    pub const OXBLOOD: Color = Color::rgb(74, 0, 0);

    /// Glaze colors assigned round-robin to fresh vases.
    pub fn palette() -> Vec<Color> {
        vec![
            Self::TERRACOTTA,
            Self::CELADON,
            Self::COBALT,
            Self::IVORY,
            Self::OXBLOOD,
        ]
    }
}

/// User-editable look of a vase.
///
/// Texture references are opaque keys produced by the texture composition
/// layer; the scene only stores and forwards them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaseAppearance {
    pub base_color: Color,
    pub accent_color: Color,
    #[serde(default)]
    pub texture_ref: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl VaseAppearance {
    pub fn plain(base_color: Color) -> Self {
        Self {
            base_color,
            accent_color: Color::GOLD,
            texture_ref: None,
            label: None,
        }
    }
}

impl Default for VaseAppearance {
    fn default() -> Self {
        Self::plain(Color::TERRACOTTA)
    }
}

/// Scene-side record of one vase.
#[derive(Debug, Clone, PartialEq)]
pub struct VaseRecord {
    pub id: VaseId,
    pub slot: usize,
    pub appearance: VaseAppearance,
    pub destroy_count: u32,
    /// Spin around the vertical axis applied by vase dragging (radians).
    pub yaw: f32,
    /// Set when the appearance changed since the last save.
    pub appearance_dirty: bool,
}

impl VaseRecord {
    pub fn new(id: VaseId, slot: usize, appearance: VaseAppearance) -> Self {
        Self {
            id,
            slot,
            appearance,
            destroy_count: 0,
            yaw: 0.0,
            appearance_dirty: false,
        }
    }
}

/// Grid placement of vases.
#[derive(Debug, Clone, PartialEq)]
pub struct VaseGrid {
    spacing: f32,
    columns: usize,
    count: usize,
    id_prefix: String,
}

impl VaseGrid {
    pub fn from_config(config: &GridConfig) -> Self {
        Self {
            spacing: config.spacing,
            columns: config.columns.max(1),
            count: config.count,
            id_prefix: config.id_prefix.clone(),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Id of the vase at `slot`.
    pub fn id_for(&self, slot: usize) -> VaseId {
        VaseId(format!("{}-{}", self.id_prefix, slot))
    }

    /// World position of the base of the vase at `slot`.
    ///
    /// Rows are centered on X and advance along +Z.
    pub fn position(&self, slot: usize) -> Vec3 {
        let used_columns = self.columns.min(self.count).max(1);
        let col = slot % self.columns;
        let row = slot / self.columns;
        let half_width = (used_columns as f32 - 1.0) / 2.0;

        Vec3::new(
            (col as f32 - half_width) * self.spacing,
            0.0,
            row as f32 * self.spacing,
        )
    }

    /// Builds fresh records for every slot, cycling through the glaze palette.
    pub fn build_records(&self) -> Vec<VaseRecord> {
        let palette = Color::palette();
        (0..self.count)
            .map(|slot| {
                let appearance = VaseAppearance::plain(palette[slot % palette.len()]);
                VaseRecord::new(self.id_for(slot), slot, appearance)
            })
            .collect()
    }
}

/// Direction of a focus change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavDirection {
    Next,
    Previous,
}

impl NavDirection {
    /// Slot reached by one step from `current`, wrapping around.
    pub fn step(self, current: usize, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        match self {
            Self::Next => (current + 1) % count,
            Self::Previous => (current + count - 1) % count,
        }
    }
}

/// Hold-to-repeat state for navigation keys.
///
/// The initial step happens on press (performed by the caller); repeats
/// start after `delay` and continue every `interval` until release.
#[derive(Debug, Clone)]
pub struct HoldRepeat {
    delay: Duration,
    interval: Duration,
    held: Option<(NavDirection, Duration)>,
}

impl HoldRepeat {
    pub fn new(delay: Duration, interval: Duration) -> Self {
        Self {
            delay,
            interval: interval.max(Duration::from_millis(1)),
            held: None,
        }
    }

    pub fn press(&mut self, direction: NavDirection) {
        self.held = Some((direction, self.delay));
    }

    pub fn release(&mut self) {
        self.held = None;
    }

    pub fn held(&self) -> Option<NavDirection> {
        self.held.map(|(direction, _)| direction)
    }

    /// Advances the hold timer and returns how many repeat steps came due.
    pub fn advance(&mut self, dt: Duration) -> Option<(NavDirection, u32)> {
        let interval = self.interval;
        let (direction, remaining) = self.held.as_mut()?;

        let mut left = dt;
        let mut steps = 0;
        while left >= *remaining {
            left -= *remaining;
            *remaining = interval;
            steps += 1;
        }
        *remaining -= left;

        Some((*direction, steps))
    }
}
