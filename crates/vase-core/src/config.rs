//! Scene configuration.
//!
//! Every tunable the scene uses lives here. Sections default independently,
//! so a JSON document only needs to name the values it overrides.

use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse scene config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Root configuration for a vase scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for every random draw the scene makes (impulses, coin spawns).
    pub seed: u64,
    pub grid: GridConfig,
    pub camera: CameraConfig,
    pub shatter: ShatterConfig,
    pub coins: CoinConfig,
    pub input: InputConfig,
    pub persistence: PersistenceConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            grid: GridConfig::default(),
            camera: CameraConfig::default(),
            shatter: ShatterConfig::default(),
            coins: CoinConfig::default(),
            input: InputConfig::default(),
            persistence: PersistenceConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Parses a configuration from JSON and validates it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.count == 0 {
            return Err(ConfigError::invalid("grid.count", "must be at least 1"));
        }
        if self.grid.columns == 0 {
            return Err(ConfigError::invalid("grid.columns", "must be at least 1"));
        }
        if !(self.grid.spacing.is_finite() && self.grid.spacing > 0.0) {
            return Err(ConfigError::invalid("grid.spacing", "must be positive"));
        }
        if self.camera.initial_distance <= 0.0 {
            return Err(ConfigError::invalid(
                "camera.initial_distance",
                "must be positive",
            ));
        }

        for (field, transition) in [
            ("camera.focus", &self.camera.focus),
            ("camera.reset", &self.camera.reset),
            ("camera.title", &self.camera.title),
        ] {
            transition.validate(field)?;
        }

        self.shatter.validate()?;

        if self.coins.radius <= 0.0 || self.coins.thickness <= 0.0 {
            return Err(ConfigError::invalid(
                "coins.radius",
                "coin radius and thickness must be positive",
            ));
        }
        if self.coins.max_coins == 0 {
            return Err(ConfigError::invalid("coins.max_coins", "must be at least 1"));
        }
        if self.input.repeat_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "input.repeat_interval_ms",
                "must be at least 1",
            ));
        }
        if self.persistence.autosave_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "persistence.autosave_interval_ms",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Layout of the vase grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Distance between neighbouring vases (meters).
    pub spacing: f32,
    /// Vases per row.
    pub columns: usize,
    /// Total number of vases.
    pub count: usize,
    /// Prefix for generated vase ids (`"{prefix}-{slot}"`).
    pub id_prefix: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            spacing: 3.0,
            columns: 4,
            count: 8,
            id_prefix: "vase".to_string(),
        }
    }
}

/// Early-exit tolerances for a camera transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionTolerances {
    /// Squared distance below which the camera position counts as arrived.
    pub position_epsilon_sq: f32,
    /// Squared distance below which the orbit target counts as arrived.
    pub target_epsilon_sq: f32,
    /// Normalized progress that must be reached before early exit is allowed.
    pub min_progress: f32,
}

impl Default for TransitionTolerances {
    fn default() -> Self {
        Self {
            position_epsilon_sq: 1e-4,
            target_epsilon_sq: 1e-4,
            min_progress: 0.85,
        }
    }
}

/// Duration and tolerances for one kind of camera transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub duration_secs: f32,
    pub tolerances: TransitionTolerances,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_secs: 0.8,
            tolerances: TransitionTolerances::default(),
        }
    }
}

impl TransitionConfig {
    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !(self.duration_secs.is_finite() && self.duration_secs >= 0.0) {
            return Err(ConfigError::invalid(field, "duration must be >= 0"));
        }
        let tol = &self.tolerances;
        if tol.position_epsilon_sq < 0.0 || tol.target_epsilon_sq < 0.0 {
            return Err(ConfigError::invalid(field, "epsilons must be >= 0"));
        }
        if !(0.0..=1.0).contains(&tol.min_progress) {
            return Err(ConfigError::invalid(field, "min_progress must be in [0, 1]"));
        }
        Ok(())
    }
}

/// Orbit camera configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Horizontal distance from the focused vase on entering the scene.
    pub initial_distance: f32,
    /// Camera height above the orbit target on entering the scene.
    pub initial_height: f32,
    /// Height of the orbit target above a vase's base.
    pub focus_height: f32,
    /// Camera pose shown on the title screen.
    pub title_position: [f32; 3],
    pub title_target: [f32; 3],
    /// Vase-to-vase focus changes.
    pub focus: TransitionConfig,
    /// Drift correction back to the default viewing direction.
    pub reset: TransitionConfig,
    /// Title screen to scene.
    pub title: TransitionConfig,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_distance: 6.0,
            initial_height: 2.0,
            focus_height: 0.8,
            title_position: [0.0, 12.0, 18.0],
            title_target: [0.0, 0.0, 0.0],
            focus: TransitionConfig {
                duration_secs: 0.8,
                tolerances: TransitionTolerances::default(),
            },
            reset: TransitionConfig {
                duration_secs: 0.6,
                tolerances: TransitionTolerances::default(),
            },
            title: TransitionConfig {
                duration_secs: 2.5,
                tolerances: TransitionTolerances {
                    min_progress: 0.95,
                    ..TransitionTolerances::default()
                },
            },
        }
    }
}

/// Impulse shaping for one explosion.
///
/// Two tuning sets are in use; both are available as presets and every
/// field can be overridden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionTuning {
    pub base_strength: f32,
    pub random_jitter: f32,
    /// Fraction of the impulse magnitude added to the vertical component.
    pub upward_bias: f32,
    pub distance_bias: f32,
    pub distance_scale: f32,
    pub distance_clamp: f32,
}

impl ExplosionTuning {
    /// Soft blast: shards pop outward and tumble close to the pedestal.
    pub const fn gentle() -> Self {
        Self {
            base_strength: 5.0,
            random_jitter: 1.0,
            upward_bias: 0.5,
            distance_bias: 0.0,
            distance_scale: 0.15,
            distance_clamp: 0.5,
        }
    }

    /// Violent blast: strong, noisy impulses with a large distance bias.
    pub const fn intense() -> Self {
        Self {
            base_strength: 10.0,
            random_jitter: 10.0,
            upward_bias: 0.5,
            distance_bias: 10.0,
            distance_scale: 0.15,
            distance_clamp: 0.5,
        }
    }
}

impl Default for ExplosionTuning {
    fn default() -> Self {
        Self::gentle()
    }
}

/// Shatter sequence configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShatterConfig {
    /// Wall-clock length of a destroy sequence.
    pub duration_ms: u64,
    /// How long a vase's coin container stays passable after a destroy starts.
    pub sensor_window_ms: u64,
    pub gravity: f32,
    /// Gravity is withheld for this long after the blast.
    pub gravity_delay_secs: f32,
    /// Damping is withheld for this long after the blast.
    pub damping_delay_secs: f32,
    /// Per-tick multiplicative linear damping.
    pub linear_damping: f32,
    /// Per-tick multiplicative angular damping.
    pub angular_damping: f32,
    /// Half-range of the uniform angular velocity draw, per axis (rad/s).
    pub angular_velocity_range: [f32; 3],
    /// Blast center height above the vase base.
    pub blast_height: f32,
    pub explosion: ExplosionTuning,
}

impl Default for ShatterConfig {
    fn default() -> Self {
        Self {
            duration_ms: 5000,
            sensor_window_ms: 1500,
            gravity: 9.81,
            gravity_delay_secs: 0.15,
            damping_delay_secs: 0.05,
            linear_damping: 0.98,
            angular_damping: 0.96,
            angular_velocity_range: [8.0, 8.0, 8.0],
            blast_height: 0.6,
            explosion: ExplosionTuning::default(),
        }
    }
}

impl ShatterConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.gravity_delay_secs < 0.0 || self.damping_delay_secs < 0.0 {
            return Err(ConfigError::invalid(
                "shatter.gravity_delay_secs",
                "delays must be >= 0",
            ));
        }
        if !(self.linear_damping > 0.0 && self.linear_damping <= 1.0) {
            return Err(ConfigError::invalid(
                "shatter.linear_damping",
                "must be in (0, 1]",
            ));
        }
        if !(self.angular_damping > 0.0 && self.angular_damping <= 1.0) {
            return Err(ConfigError::invalid(
                "shatter.angular_damping",
                "must be in (0, 1]",
            ));
        }
        if self.angular_velocity_range.iter().any(|r| *r < 0.0) {
            return Err(ConfigError::invalid(
                "shatter.angular_velocity_range",
                "ranges must be >= 0",
            ));
        }
        let e = &self.explosion;
        if e.random_jitter < 0.0 || e.distance_clamp < 0.0 {
            return Err(ConfigError::invalid(
                "shatter.explosion",
                "jitter and clamp must be >= 0",
            ));
        }
        Ok(())
    }
}

/// Coin spawning and vase container geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinConfig {
    pub radius: f32,
    pub thickness: f32,
    /// Spawn height above the vase base.
    pub spawn_height: f32,
    /// Maximum horizontal offset from the vase axis at spawn.
    pub spawn_jitter: f32,
    pub max_coins: usize,
    /// Coins below this height are removed.
    pub kill_plane_y: f32,
    pub restitution: f32,
    pub friction: f32,
    /// Inner radius of a vase container.
    pub container_radius: f32,
    /// Wall height of a vase container.
    pub container_height: f32,
    /// Number of wall segments approximating the container ring.
    pub container_segments: usize,
}

impl Default for CoinConfig {
    fn default() -> Self {
        Self {
            radius: 0.15,
            thickness: 0.04,
            spawn_height: 2.0,
            spawn_jitter: 0.2,
            max_coins: 64,
            kill_plane_y: -10.0,
            restitution: 0.3,
            friction: 0.6,
            container_radius: 0.45,
            container_height: 1.2,
            container_segments: 10,
        }
    }
}

/// Input timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Delay before a held navigation key starts repeating.
    pub repeat_delay_ms: u64,
    /// Interval between repeats while held.
    pub repeat_interval_ms: u64,
    /// Radians of vase spin per pointer pixel while dragging a vase.
    pub vase_drag_sensitivity: f32,
    /// Radians of camera orbit per pointer pixel while dragging the camera.
    pub orbit_sensitivity: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            repeat_delay_ms: 400,
            repeat_interval_ms: 150,
            vase_drag_sensitivity: 0.01,
            orbit_sensitivity: 0.005,
        }
    }
}

/// Appearance autosave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub autosave_interval_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            autosave_interval_ms: 2000,
        }
    }
}
