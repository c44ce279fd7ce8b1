/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or
/// incomplete; a parse error warns on stderr and keeps the defaults.

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::physics::Tuning;
use crate::sim::level::LevelId;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Simulation tick interval.
    pub tick_rate_ms: u64,
    /// Level a fresh game starts on.
    pub start_level: LevelId,
    pub tuning: Tuning,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    world: TomlWorld,
    #[serde(default)]
    physics: TomlPhysics,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlWorld {
    #[serde(default = "default_start_level")]
    start_level: String,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f64,
    #[serde(default = "default_accel")]
    accel: f64,
    #[serde(default = "default_decay")]
    decay: f64,
    #[serde(default = "default_max_speed")]
    max_speed: f64,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 33 }
fn default_start_level() -> String { LevelId::Intro.slug().to_string() }
fn default_gravity() -> f64 { Tuning::default().gravity }
fn default_accel() -> f64 { Tuning::default().accel }
fn default_decay() -> f64 { Tuning::default().decay }
fn default_max_speed() -> f64 { Tuning::default().max_speed }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for TomlWorld {
    fn default() -> Self {
        TomlWorld { start_level: default_start_level() }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            accel: default_accel(),
            decay: default_decay(),
            max_speed: default_max_speed(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());
        GameConfig::from_toml(toml_cfg)
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        let start_level = match LevelId::from_slug(&cfg.world.start_level) {
            Some(level) => level,
            None => {
                eprintln!(
                    "Warning: unknown start_level '{}', using '{}'",
                    cfg.world.start_level,
                    LevelId::Intro.slug()
                );
                LevelId::Intro
            }
        };

        GameConfig {
            tick_rate_ms: cfg.speed.tick_rate_ms,
            start_level,
            tuning: Tuning {
                gravity: cfg.physics.gravity,
                accel: cfg.physics.accel,
                decay: cfg.physics.decay,
                max_speed: cfg.physics.max_speed,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_the_defaults() {
        let cfg = GameConfig::from_toml(toml::from_str("").unwrap());
        assert_eq!(cfg.tick_rate_ms, 33);
        assert_eq!(cfg.start_level, LevelId::Intro);
        assert_eq!(cfg.tuning.max_speed, 4.5);
    }

    #[test]
    fn partial_sections_keep_unrelated_defaults() {
        let text = "[world]\nstart_level = \"wetlands\"\n\n[physics]\ngravity = 0.2\n";
        let cfg = GameConfig::from_toml(toml::from_str(text).unwrap());
        assert_eq!(cfg.start_level, LevelId::Wetlands);
        assert_eq!(cfg.tuning.gravity, 0.2);
        assert_eq!(cfg.tuning.accel, 0.1);
        assert_eq!(cfg.tick_rate_ms, 33);
    }

    #[test]
    fn unknown_start_level_falls_back_to_intro() {
        let text = "[world]\nstart_level = \"moonbase\"\n";
        let cfg = GameConfig::from_toml(toml::from_str(text).unwrap());
        assert_eq!(cfg.start_level, LevelId::Intro);
    }
}
