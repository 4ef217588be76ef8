/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::food::SpawnPolicy;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub grid: GridConfig,
    pub rules: RulesConfig,
    pub gamepad: GamepadConfig,
    pub log_file: Option<PathBuf>,
    pub log_level: log::LevelFilter,
    pub seed: Option<u64>,
}

/// Playfield size in cells. Zero means "fit the terminal".
#[derive(Clone, Copy, Debug, Default)]
pub struct GridConfig {
    pub width: u16,
    pub height: u16,
}

#[derive(Clone, Debug)]
pub struct RulesConfig {
    pub base_fps: u32,
    pub points_per_level: u32,
    pub power_up_duration: Duration,
    pub power_up_chance: f64,
    pub power_up_min_score: u32,
    pub level_banner: Duration,
}

impl RulesConfig {
    pub fn spawn_policy(&self) -> SpawnPolicy {
        SpawnPolicy {
            power_up_chance: self.power_up_chance,
            power_up_min_score: self.power_up_min_score,
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        TomlRules::default().into()
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub pause: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    grid: TomlGrid,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGrid {
    #[serde(default)]
    width: u16,
    #[serde(default)]
    height: u16,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_base_fps")]
    base_fps: u32,
    #[serde(default = "default_points_per_level")]
    points_per_level: u32,
    #[serde(default = "default_power_up_secs")]
    power_up_secs: f32,
    #[serde(default = "default_power_up_chance")]
    power_up_chance: f64,
    #[serde(default = "default_power_up_min_score")]
    power_up_min_score: u32,
    #[serde(default = "default_level_banner_ms")]
    level_banner_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_base_fps() -> u32 { 10 }
fn default_points_per_level() -> u32 { 50 }
fn default_power_up_secs() -> f32 { 5.0 }
fn default_power_up_chance() -> f64 { 0.1 }
fn default_power_up_min_score() -> u32 { 50 }
fn default_level_banner_ms() -> u64 { 1000 }

fn default_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_pause() -> Vec<String> { vec!["B".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_log_file() -> String { "snake-arcade.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            base_fps: default_base_fps(),
            points_per_level: default_points_per_level(),
            power_up_secs: default_power_up_secs(),
            power_up_chance: default_power_up_chance(),
            power_up_min_score: default_power_up_min_score(),
            level_banner_ms: default_level_banner_ms(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            pause: default_pause(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            log_file: default_log_file(),
            log_level: default_log_level(),
            seed: None,
        }
    }
}

impl From<TomlRules> for RulesConfig {
    fn from(t: TomlRules) -> Self {
        RulesConfig {
            base_fps: t.base_fps.max(1),
            points_per_level: t.points_per_level.max(1),
            power_up_duration: Duration::from_secs_f32(t.power_up_secs.max(0.0).min(3600.0)),
            // gen_bool panics outside [0, 1]
            power_up_chance: if t.power_up_chance.is_finite() {
                t.power_up_chance.clamp(0.0, 1.0)
            } else {
                default_power_up_chance()
            },
            power_up_min_score: t.power_up_min_score,
            level_banner: Duration::from_millis(t.level_banner_ms),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        Self::from_toml(load_toml(&search_dirs))
    }

    /// Parse a config document directly. Errors fall back to defaults.
    #[cfg(test)]
    pub fn from_toml_str(text: &str) -> Self {
        Self::from_toml(toml::from_str::<TomlConfig>(text).unwrap_or_default())
    }

    fn from_toml(toml_cfg: TomlConfig) -> Self {
        let log_file = match toml_cfg.general.log_file.trim() {
            "" => None,
            path => Some(PathBuf::from(path)),
        };

        let log_level = toml_cfg.general.log_level.parse().unwrap_or_else(|_| {
            eprintln!("Warning: unknown log_level {:?}, using info", toml_cfg.general.log_level);
            log::LevelFilter::Info
        });

        GameConfig {
            grid: GridConfig {
                width: toml_cfg.grid.width,
                height: toml_cfg.grid.height,
            },
            rules: toml_cfg.rules.into(),
            gamepad: GamepadConfig {
                confirm: toml_cfg.gamepad.confirm,
                pause: toml_cfg.gamepad.pause,
                quit: toml_cfg.gamepad.quit,
            },
            log_file,
            log_level,
            seed: toml_cfg.general.seed,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/snake-arcade");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
