//! Level, difficulty and badge configuration.
//!
//! The YAML document is extracted with figment into raw structs, then validated into an
//! immutable [`GameConfig`]: every maze is parsed and every difficulty and badge reference is
//! resolved before the game loop starts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Format, Yaml};
use figment::Figment;
use serde::Deserialize;
use tracing::{debug, info};

use crate::constants::DEFAULT_GHOST_BONUS;
use crate::entity::ghost::Ghost;
use crate::error::ConfigError;
use crate::map::direction::Direction;
use crate::map::parser::{MapTileParser, ParsedMap};

/// Points at a configuration file to use instead of the embedded one.
pub const CONFIG_ENV: &str = "PACMAN_TERM_CONFIG";
/// Used when present and no other file is requested.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yml";
/// The configuration shipped with the game.
pub const DEFAULT_CONFIG: &str = include_str!("../assets/config.yml");

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    badges: RawBadges,
    #[serde(default)]
    difficulties: BTreeMap<String, RawDifficulty>,
    #[serde(default)]
    levels: Vec<RawLevel>,
}

#[derive(Debug, Default, Deserialize)]
struct RawBadges {
    #[serde(default)]
    pacman: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    ghosts: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct RawDifficulty {
    ghost_speed: f64,
    power_duration: f64,
    cooldown_duration: f64,
    revival_delay: f64,
    ghost_bonus: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawLevel {
    name: String,
    difficulty: String,
    maze: Vec<String>,
    pacman_badge: Option<String>,
    ghost_badges: Option<String>,
}

/// Timing and scoring parameters shared by the levels that reference them.
#[derive(Debug, Clone, PartialEq)]
pub struct Difficulty {
    pub name: String,
    /// Delay between two pursuer movement ticks.
    pub move_interval: Duration,
    pub power_duration: Duration,
    pub cooldown_duration: Duration,
    pub revival_delay: Duration,
    /// The n-th capture of a power cycle is worth `ghost_bonus * n`.
    pub ghost_bonus: u32,
}

/// Player glyphs: `open` while idle or not chewing, one per heading while chewing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacmanBadge {
    pub open: char,
    pub up: char,
    pub down: char,
    pub left: char,
    pub right: char,
}

impl PacmanBadge {
    pub fn glyph(&self, heading: Option<Direction>, chewing: bool) -> char {
        match (chewing, heading) {
            (true, Some(Direction::Up)) => self.up,
            (true, Some(Direction::Down)) => self.down,
            (true, Some(Direction::Left)) => self.left,
            (true, Some(Direction::Right)) => self.right,
            _ => self.open,
        }
    }
}

impl Default for PacmanBadge {
    fn default() -> Self {
        Self {
            open: 'C',
            up: 'V',
            down: '^',
            left: '>',
            right: '<',
        }
    }
}

/// One glyph per pursuer identity, indexed in identity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostBadges([char; 4]);

impl GhostBadges {
    pub fn glyph(&self, ghost: Ghost) -> char {
        self.0[ghost as usize]
    }
}

impl Default for GhostBadges {
    fn default() -> Self {
        Self(Ghost::ALL.map(Ghost::marker))
    }
}

/// The glyph selection handed to the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Badges {
    pub pacman: PacmanBadge,
    pub ghosts: GhostBadges,
}

/// A validated level. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Level {
    pub name: String,
    pub map: ParsedMap,
    pub difficulty: Difficulty,
    pub badges: Badges,
}

/// The validated game configuration.
#[derive(Debug, Clone)]
pub struct GameConfig {
    levels: Vec<Level>,
}

impl GameConfig {
    /// Loads the configuration from `path`, the `PACMAN_TERM_CONFIG` file, `config/config.yml`,
    /// or the embedded default, in that order of preference.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let requested = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let figment = match requested {
            Some(path) if !path.exists() => return Err(ConfigError::Missing(path)),
            Some(path) => {
                info!(path = %path.display(), "Loading configuration");
                Figment::from(Yaml::file(path))
            }
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                info!(path = DEFAULT_CONFIG_PATH, "Loading configuration");
                Figment::from(Yaml::file(DEFAULT_CONFIG_PATH))
            }
            None => {
                info!("Loading embedded configuration");
                Figment::from(Yaml::string(DEFAULT_CONFIG))
            }
        };

        Self::validate(figment.extract()?)
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Self::validate(Figment::from(Yaml::string(yaml)).extract()?)
    }

    /// The configuration shipped with the game.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_yaml(DEFAULT_CONFIG)
    }

    /// Builds a configuration from already validated levels.
    pub fn from_levels(levels: Vec<Level>) -> Result<Self, ConfigError> {
        if levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Index of the level with the given name.
    pub fn level_index(&self, name: &str) -> Option<usize> {
        self.levels.iter().position(|level| level.name == name)
    }

    fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
        let mut difficulties = BTreeMap::new();
        for (name, difficulty) in &raw.difficulties {
            difficulties.insert(name.clone(), validate_difficulty(name, difficulty)?);
        }

        let mut pacman_badges = BTreeMap::new();
        for (name, glyphs) in &raw.badges.pacman {
            pacman_badges.insert(name.clone(), validate_pacman_badge(name, glyphs)?);
        }
        let mut ghost_badges = BTreeMap::new();
        for (name, glyphs) in &raw.badges.ghosts {
            ghost_badges.insert(name.clone(), validate_ghost_badges(name, glyphs)?);
        }

        let levels = raw
            .levels
            .into_iter()
            .map(|level| {
                let difficulty = difficulties
                    .get(&level.difficulty)
                    .cloned()
                    .ok_or_else(|| ConfigError::UnknownDifficulty {
                        level: level.name.clone(),
                        difficulty: level.difficulty.clone(),
                    })?;

                let map = MapTileParser::parse_board(&level.maze).map_err(|source| ConfigError::InvalidMaze {
                    level: level.name.clone(),
                    source,
                })?;

                let pacman = resolve_badge(&pacman_badges, level.pacman_badge.as_deref(), &level.name)?;
                let ghosts = resolve_badge(&ghost_badges, level.ghost_badges.as_deref(), &level.name)?;

                debug!(level = %level.name, difficulty = %difficulty.name, "Level validated");
                Ok(Level {
                    name: level.name,
                    map,
                    difficulty,
                    badges: Badges { pacman, ghosts },
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Self::from_levels(levels)
    }
}

/// Writes the embedded configuration to `config/config.yml` under `root`, returning the path.
pub fn write_default(root: &Path) -> Result<PathBuf, ConfigError> {
    let path = root.join(DEFAULT_CONFIG_PATH);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, DEFAULT_CONFIG)?;
    info!(path = %path.display(), "Default configuration written");
    Ok(path)
}

fn validate_difficulty(name: &str, raw: &RawDifficulty) -> Result<Difficulty, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidDifficulty {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if !raw.ghost_speed.is_finite() || raw.ghost_speed <= 0.0 {
        return Err(invalid("ghost_speed must be a positive number of moves per second"));
    }
    let seconds = |value: f64, field: &str| {
        Duration::try_from_secs_f64(value).map_err(|_| invalid(&format!("{field} must be a non-negative number of seconds")))
    };

    Ok(Difficulty {
        name: name.to_string(),
        move_interval: seconds(1.0 / raw.ghost_speed, "ghost_speed")?,
        power_duration: seconds(raw.power_duration, "power_duration")?,
        cooldown_duration: seconds(raw.cooldown_duration, "cooldown_duration")?,
        revival_delay: seconds(raw.revival_delay, "revival_delay")?,
        ghost_bonus: raw.ghost_bonus.unwrap_or(DEFAULT_GHOST_BONUS),
    })
}

fn single_char(name: String, value: &str) -> Result<char, ConfigError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ConfigError::InvalidBadge {
            name,
            found: value.to_string(),
        }),
    }
}

fn validate_pacman_badge(name: &str, glyphs: &BTreeMap<String, String>) -> Result<PacmanBadge, ConfigError> {
    let defaults = PacmanBadge::default();
    let glyph = |key: &str, fallback: char| match glyphs.get(key) {
        Some(value) => single_char(format!("{name}.{key}"), value),
        None => Ok(fallback),
    };

    Ok(PacmanBadge {
        open: glyph("open", defaults.open)?,
        up: glyph("up", defaults.up)?,
        down: glyph("down", defaults.down)?,
        left: glyph("left", defaults.left)?,
        right: glyph("right", defaults.right)?,
    })
}

fn validate_ghost_badges(name: &str, glyphs: &BTreeMap<String, String>) -> Result<GhostBadges, ConfigError> {
    let mut badges = GhostBadges::default();
    for ghost in Ghost::ALL {
        if let Some(value) = glyphs.get(ghost.marker().to_string().as_str()) {
            badges.0[ghost as usize] = single_char(format!("{name}.{}", ghost.marker()), value)?;
        }
    }
    Ok(badges)
}

fn resolve_badge<T: Copy + Default>(badges: &BTreeMap<String, T>, name: Option<&str>, level: &str) -> Result<T, ConfigError> {
    match name {
        None => Ok(T::default()),
        Some(name) => badges.get(name).copied().ok_or_else(|| ConfigError::UnknownBadges {
            level: level.to_string(),
            badges: name.to_string(),
        }),
    }
}
