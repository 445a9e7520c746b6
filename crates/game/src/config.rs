//! Arena configuration: layout and every physics/AI tunable. Loaded from
//! `arena.ron` at startup; every field has a default so partial files work.

use engine_core::{Vec2, Vec3};
use physics::ObstacleSpec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or checking an arena configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid RON in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid arena config: {0}")]
    Invalid(String),
}

/// Static arena description plus tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Side length of the square ground plane.
    #[serde(default = "default_ground_size")]
    pub ground_size: f32,
    /// Height of the ground plane.
    #[serde(default)]
    pub ground_y: f32,
    #[serde(default = "default_wall_height")]
    pub wall_height: f32,
    #[serde(default = "default_wall_thickness")]
    pub wall_thickness: f32,
    /// Uniform scale applied to every wall and tree box.
    #[serde(default = "default_obstacle_scale")]
    pub obstacle_scale: f32,
    /// Tree trunk positions on the ground plane (x, z).
    #[serde(default = "default_trees")]
    pub trees: Vec<(f32, f32)>,
    #[serde(default = "default_tree_footprint")]
    pub tree_footprint: f32,
    #[serde(default = "default_tree_height")]
    pub tree_height: f32,
    /// Downward acceleration (negative).
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    /// Longest step integrated in one tick, in seconds.
    #[serde(default = "default_max_step")]
    pub max_step: f32,
    #[serde(default)]
    pub player: PlayerTunables,
    #[serde(default)]
    pub enemies: EnemyTunables,
    #[serde(default)]
    pub items: ItemTunables,
}

/// Longest step the clock will integrate.
const MAX_STEP_CEILING: f32 = 1.0;
const MAX_GROUND_SIZE: f32 = 10_000.0;
/// Upper bound for an enemy's heading hold, in seconds.
const MAX_DIR_CHANGE_TIME: f32 = 3600.0;

fn default_ground_size() -> f32 {
    50.0
}
fn default_wall_height() -> f32 {
    5.0
}
fn default_wall_thickness() -> f32 {
    1.0
}
fn default_obstacle_scale() -> f32 {
    1.0
}
fn default_trees() -> Vec<(f32, f32)> {
    vec![(-10.0, -8.0), (8.0, 5.0), (5.0, -12.0), (-7.0, 10.0)]
}
fn default_tree_footprint() -> f32 {
    1.0
}
fn default_tree_height() -> f32 {
    5.0
}
fn default_gravity() -> f32 {
    -30.0
}
fn default_max_step() -> f32 {
    0.1
}

/// Player movement, flight, inhale and stomp tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTunables {
    /// Body diameter; the collider is a cube of this size.
    pub size: f32,
    pub speed: f32,
    pub jump_velocity: f32,
    pub inhale_duration: f32,
    pub inhale_range: f32,
    /// Half-angle of the inhale cone in degrees.
    pub inhale_angle_deg: f32,
    /// Enemies closer than this are ignored by inhale targeting.
    pub inhale_min_distance: f32,
    pub suck_in_duration: f32,
    /// Scale the captured enemy shrinks to.
    pub suck_in_end_scale: f32,
    /// Fastest fall while flying.
    pub float_speed: f32,
    pub float_gravity_scale: f32,
    pub flight_boost: f32,
    /// Highest centre height reachable by flying.
    pub max_flight_height: f32,
    /// Horizontal speed lost per second while flying.
    pub flight_drag: f32,
    /// Horizontal velocity decay per second with no move input.
    pub idle_damping: f32,
    /// Fraction of the remaining yaw error closed each tick.
    pub turn_smoothing: f32,
    /// Fraction of the remaining scale error closed each tick.
    pub scale_smoothing: f32,
    /// Stomp qualifies when `velocity.y < -jump_velocity * stomp_speed_factor`.
    pub stomp_speed_factor: f32,
    /// Bounce after a stomp, as a fraction of the jump velocity.
    pub stomp_bounce_factor: f32,
    /// How far below the body the stomp probe reaches.
    pub stomp_probe_depth: f32,
    pub inhale_scale: Vec3,
    pub puff_scale: Vec3,
}

impl Default for PlayerTunables {
    fn default() -> Self {
        Self {
            size: 1.5,
            speed: 5.0,
            jump_velocity: 14.0,
            inhale_duration: 0.6,
            inhale_range: 4.0,
            inhale_angle_deg: 35.0,
            inhale_min_distance: 0.1,
            suck_in_duration: 0.35,
            suck_in_end_scale: 0.01,
            float_speed: 2.0,
            float_gravity_scale: 0.1,
            flight_boost: 10.0,
            max_flight_height: 15.0,
            flight_drag: 0.1,
            idle_damping: 5.0,
            turn_smoothing: 0.15,
            scale_smoothing: 0.15,
            stomp_speed_factor: 0.5,
            stomp_bounce_factor: 0.6,
            stomp_probe_depth: 0.1,
            inhale_scale: Vec3::new(1.4, 0.7, 1.4),
            puff_scale: Vec3::splat(1.25),
        }
    }
}

impl PlayerTunables {
    /// Vertical velocity below which a landing counts as a stomp.
    pub fn stomp_threshold(&self) -> f32 {
        -self.jump_velocity * self.stomp_speed_factor
    }

    /// Cosine of the inhale half-angle.
    pub fn inhale_cos(&self) -> f32 {
        self.inhale_angle_deg.to_radians().cos()
    }
}

/// Rejection-sampling constraints for spawn positions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnRules {
    pub min_center_distance: f32,
    pub min_sibling_distance: f32,
    pub min_player_distance: f32,
    pub max_attempts: u32,
}

impl Default for SpawnRules {
    fn default() -> Self {
        Self {
            min_center_distance: 3.0,
            min_sibling_distance: 5.0,
            min_player_distance: 0.0,
            max_attempts: 50,
        }
    }
}

/// Enemy population and wander tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTunables {
    /// Population kept constant at all times.
    pub max_enemies: usize,
    pub size: f32,
    pub speed: f32,
    /// Per-enemy speed multiplier is drawn from `1 ± speed_variation`.
    pub speed_variation: f32,
    pub min_dir_change_time: f32,
    pub max_dir_change_time: f32,
    /// Steering speed away from anything the enemy overlaps.
    pub repulsion: f32,
    /// Distance past the arena boundary before an enemy is despawned.
    pub despawn_margin: f32,
    pub spawn: SpawnRules,
}

impl Default for EnemyTunables {
    fn default() -> Self {
        Self {
            max_enemies: 4,
            size: 1.2,
            speed: 2.0,
            speed_variation: 0.2,
            min_dir_change_time: 3.0,
            max_dir_change_time: 8.0,
            repulsion: 3.0,
            despawn_margin: 1.0,
            spawn: SpawnRules {
                min_center_distance: 6.0,
                min_sibling_distance: 2.0,
                min_player_distance: 6.0,
                max_attempts: 50,
            },
        }
    }
}

/// Pickup, throw and bounce tunables for ground items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemTunables {
    /// Growth applied to the player's box for pickup tests.
    pub pickup_leniency: f32,
    pub throw_speed: f32,
    pub throw_lift: f32,
    /// Vertical speed kept (and reversed) on the single bounce.
    pub bounce_damping: f32,
    /// Landings slower than this come to rest without bouncing.
    pub min_bounce_speed: f32,
    pub sword_half_extents: Vec3,
    pub helmet_half_extents: Vec3,
    pub spawn: SpawnRules,
}

impl Default for ItemTunables {
    fn default() -> Self {
        Self {
            pickup_leniency: 0.2,
            throw_speed: 8.0,
            throw_lift: 6.0,
            bounce_damping: 0.5,
            min_bounce_speed: 2.0,
            sword_half_extents: Vec3::new(0.2, 0.5, 0.2),
            helmet_half_extents: Vec3::new(0.5, 0.4, 0.5),
            spawn: SpawnRules::default(),
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            ground_size: default_ground_size(),
            ground_y: 0.0,
            wall_height: default_wall_height(),
            wall_thickness: default_wall_thickness(),
            obstacle_scale: default_obstacle_scale(),
            trees: default_trees(),
            tree_footprint: default_tree_footprint(),
            tree_height: default_tree_height(),
            gravity: default_gravity(),
            max_step: default_max_step(),
            player: PlayerTunables::default(),
            enemies: EnemyTunables::default(),
            items: ItemTunables::default(),
        }
    }
}

impl ArenaConfig {
    /// Load config from `path`, or `arena.ron` in the current directory.
    /// If the file is missing or invalid, returns the default config.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
        if !path.exists() {
            log::info!("No arena config at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::from_path(&path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Read, parse and validate a config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = ron::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save current config as pretty RON. Logs on error.
    pub fn save(&self, path: &Path) {
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(s) => {
                if let Err(e) = std::fs::write(path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }

    /// Reject tunables the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (p, e, i) = (&self.player, &self.enemies, &self.items);

        let finite = [
            ("ground_y", self.ground_y),
            ("gravity", self.gravity),
            ("player.speed", p.speed),
            ("player.jump_velocity", p.jump_velocity),
            ("player.max_flight_height", p.max_flight_height),
            ("items.throw_speed", i.throw_speed),
            ("items.throw_lift", i.throw_lift),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(invalid(name, "must be finite", value));
            }
        }
        for &(x, z) in &self.trees {
            if !(x.is_finite() && z.is_finite()) {
                return Err(ConfigError::Invalid(format!("tree at ({}, {}) is not finite", x, z)));
            }
        }

        let positive = [
            ("ground_size", self.ground_size),
            ("wall_height", self.wall_height),
            ("wall_thickness", self.wall_thickness),
            ("obstacle_scale", self.obstacle_scale),
            ("tree_footprint", self.tree_footprint),
            ("tree_height", self.tree_height),
            ("max_step", self.max_step),
            ("player.size", p.size),
            ("player.inhale_duration", p.inhale_duration),
            ("player.inhale_range", p.inhale_range),
            ("player.suck_in_duration", p.suck_in_duration),
            ("enemies.size", e.size),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(name, "must be positive", value));
            }
        }

        let non_negative = [
            ("player.inhale_min_distance", p.inhale_min_distance),
            ("player.suck_in_end_scale", p.suck_in_end_scale),
            ("player.float_speed", p.float_speed),
            ("player.float_gravity_scale", p.float_gravity_scale),
            ("player.flight_boost", p.flight_boost),
            ("player.flight_drag", p.flight_drag),
            ("player.idle_damping", p.idle_damping),
            ("player.stomp_speed_factor", p.stomp_speed_factor),
            ("player.stomp_bounce_factor", p.stomp_bounce_factor),
            ("player.stomp_probe_depth", p.stomp_probe_depth),
            ("enemies.speed", e.speed),
            ("enemies.repulsion", e.repulsion),
            ("enemies.despawn_margin", e.despawn_margin),
            ("items.pickup_leniency", i.pickup_leniency),
            ("items.min_bounce_speed", i.min_bounce_speed),
            ("enemies.spawn.min_center_distance", e.spawn.min_center_distance),
            ("enemies.spawn.min_sibling_distance", e.spawn.min_sibling_distance),
            ("enemies.spawn.min_player_distance", e.spawn.min_player_distance),
            ("items.spawn.min_center_distance", i.spawn.min_center_distance),
            ("items.spawn.min_sibling_distance", i.spawn.min_sibling_distance),
            ("items.spawn.min_player_distance", i.spawn.min_player_distance),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(name, "must be finite and non-negative", value));
            }
        }

        let fractions = [
            ("player.turn_smoothing", p.turn_smoothing),
            ("player.scale_smoothing", p.scale_smoothing),
            ("enemies.speed_variation", e.speed_variation),
            ("items.bounce_damping", i.bounce_damping),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(name, "must be within 0..=1", value));
            }
        }

        let extents = [
            ("player.inhale_scale", p.inhale_scale),
            ("player.puff_scale", p.puff_scale),
            ("items.sword_half_extents", i.sword_half_extents),
            ("items.helmet_half_extents", i.helmet_half_extents),
        ];
        for (name, value) in extents {
            if !(value.is_finite() && value.min_element() > 0.0) {
                return Err(ConfigError::Invalid(format!("{} must be positive on every axis, got {:?}", name, value)));
            }
        }

        if self.max_step > MAX_STEP_CEILING {
            return Err(invalid("max_step", "must not exceed 1 second", self.max_step));
        }
        if self.ground_size > MAX_GROUND_SIZE {
            return Err(invalid("ground_size", "is too large", self.ground_size));
        }
        if self.gravity >= 0.0 {
            return Err(invalid("gravity", "must be negative", self.gravity));
        }
        if e.max_enemies == 0 {
            return Err(ConfigError::Invalid("enemies.max_enemies must be at least 1".into()));
        }
        let (min_t, max_t) = (e.min_dir_change_time, e.max_dir_change_time);
        if !(min_t >= 0.0 && max_t >= min_t && max_t <= MAX_DIR_CHANGE_TIME) {
            return Err(ConfigError::Invalid(format!(
                "enemy direction change window [{}, {}] must be non-empty and within 0..={}",
                min_t, max_t, MAX_DIR_CHANGE_TIME
            )));
        }
        if !(0.0..=90.0).contains(&p.inhale_angle_deg) {
            return Err(invalid("player.inhale_angle_deg", "must be within 0..=90", p.inhale_angle_deg));
        }
        if p.max_flight_height <= self.player_rest_height() {
            return Err(ConfigError::Invalid(
                "player.max_flight_height must be above the player's resting height".into(),
            ));
        }
        Ok(())
    }

    /// Half-width of the playable square.
    pub fn boundary(&self) -> f32 {
        self.ground_size * 0.5
    }

    /// Player centre height when standing on the ground.
    pub fn player_rest_height(&self) -> f32 {
        self.ground_y + self.player.size * 0.5
    }

    /// Enemy centre height when standing on the ground.
    pub fn enemy_rest_height(&self) -> f32 {
        self.ground_y + self.enemies.size * 0.5
    }

    /// The four border walls, centred on the ground edges.
    pub fn wall_specs(&self) -> Vec<ObstacleSpec> {
        let half = self.boundary();
        let long = self.ground_size + self.wall_thickness;
        let t = self.wall_thickness;
        [
            (Vec3::new(0.0, self.ground_y, -half), Vec2::new(long, t)),
            (Vec3::new(0.0, self.ground_y, half), Vec2::new(long, t)),
            (Vec3::new(-half, self.ground_y, 0.0), Vec2::new(t, long)),
            (Vec3::new(half, self.ground_y, 0.0), Vec2::new(t, long)),
        ]
        .into_iter()
        .map(|(base, footprint)| ObstacleSpec {
            base,
            footprint,
            height: self.wall_height,
        })
        .collect()
    }

    /// One trunk box per tree placement.
    pub fn tree_specs(&self) -> Vec<ObstacleSpec> {
        self.trees
            .iter()
            .map(|&(x, z)| ObstacleSpec {
                base: Vec3::new(x, self.ground_y, z),
                footprint: Vec2::splat(self.tree_footprint),
                height: self.tree_height,
            })
            .collect()
    }
}

fn invalid(name: &str, rule: &str, value: f32) -> ConfigError {
    ConfigError::Invalid(format!("{} {}, got {}", name, rule, value))
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("arena.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(ArenaConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_ron_fills_defaults() {
        let c: ArenaConfig = ron::from_str("(ground_size: 30.0, enemies: (max_enemies: 7))").unwrap();
        assert_eq!(c.ground_size, 30.0);
        assert_eq!(c.enemies.max_enemies, 7);
        assert_eq!(c.enemies.size, 1.2);
        assert_eq!(c.player.jump_velocity, 14.0);
        assert_eq!(c.trees.len(), 4);
    }

    #[test]
    fn validate_rejects_inverted_direction_window() {
        let mut c = ArenaConfig::default();
        c.enemies.min_dir_change_time = 5.0;
        c.enemies.max_dir_change_time = 1.0;
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn validate_rejects_zero_enemies_and_bad_gravity() {
        let mut c = ArenaConfig::default();
        c.enemies.max_enemies = 0;
        assert!(c.validate().is_err());
        let mut c = ArenaConfig::default();
        c.gravity = 9.8;
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_rejects_unbounded_speed_variation() {
        let mut c = ArenaConfig::default();
        c.enemies.speed_variation = 2.0e38;
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
        c.enemies.speed_variation = 1.0;
        assert!(c.validate().is_ok());
        c.enemies.speed_variation = -0.1;
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_finite_tunables() {
        let cases: [fn(&mut ArenaConfig); 7] = [
            |c: &mut ArenaConfig| c.enemies.speed = f32::NAN,
            |c: &mut ArenaConfig| c.enemies.repulsion = f32::INFINITY,
            |c: &mut ArenaConfig| c.enemies.despawn_margin = f32::NAN,
            |c: &mut ArenaConfig| c.enemies.max_dir_change_time = f32::INFINITY,
            |c: &mut ArenaConfig| c.items.throw_speed = f32::NAN,
            |c: &mut ArenaConfig| c.player.flight_boost = f32::NEG_INFINITY,
            |c: &mut ArenaConfig| c.items.sword_half_extents.y = f32::NAN,
        ];
        for (n, break_config) in cases.iter().enumerate() {
            let mut c = ArenaConfig::default();
            break_config(&mut c);
            assert!(c.validate().is_err(), "case {} passed validation", n);
        }
    }

    #[test]
    fn validate_caps_max_step() {
        let mut c = ArenaConfig::default();
        c.max_step = 1.0;
        assert!(c.validate().is_ok());
        c.max_step = 30.0;
        assert!(c.validate().is_err());
        c.max_step = f32::INFINITY;
        assert!(c.validate().is_err());
    }

    #[test]
    fn stomp_threshold_is_half_jump_velocity() {
        let p = PlayerTunables::default();
        assert_eq!(p.stomp_threshold(), -7.0);
    }

    #[test]
    fn walls_enclose_the_ground() {
        let c = ArenaConfig::default();
        let walls = c.wall_specs();
        assert_eq!(walls.len(), 4);
        for w in &walls {
            let edge = w.base.x.abs().max(w.base.z.abs());
            assert_eq!(edge, c.boundary());
        }
    }

    #[test]
    fn from_path_reports_missing_file() {
        let err = ArenaConfig::from_path(Path::new("/definitely/not/here/arena.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
