//! Simulation settings
//!
//! Tunables for actors, weapons, the camera and the broad-phase, persisted as
//! JSON separately from level files.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::SimError;
use crate::consts::*;
use crate::sim::{ActorParams, ProjectileParams};

/// Player movement and weapon tuning beyond the shared actor parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerTuning {
    pub actor: ActorParams,
    /// Vertical velocity applied on jump (negative is up)
    pub jump_force: f32,
    pub max_jumps: u32,
    /// Seconds after leaving the ground a jump is still accepted
    pub jump_grace: f32,
    /// Seconds between shots while the trigger is held
    pub fire_cooldown: f32,
    /// Distance from the hitbox centre where bullets spawn
    pub muzzle_offset: f32,
    pub bullet: ProjectileParams,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            actor: ActorParams::player(),
            jump_force: JUMP_FORCE,
            max_jumps: MAX_JUMPS,
            jump_grace: JUMP_GRACE,
            fire_cooldown: FIRE_COOLDOWN,
            muzzle_offset: MUZZLE_OFFSET,
            bullet: ProjectileParams::default(),
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Camera view size in pixels
    pub view: Vec2,
    /// Broad-phase grid cell size in pixels
    pub cell_size: f32,
    pub player: PlayerTuning,
    pub enemy: ActorParams,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            view: Vec2::new(VIEW_WIDTH, VIEW_HEIGHT),
            cell_size: CELL_SIZE,
            player: PlayerTuning::default(),
            enemy: ActorParams::enemy(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(err) => {
                log::info!("Using default settings ({err})");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let settings = Settings::default();
        assert_eq!(settings.view, Vec2::new(640.0, 360.0));
        assert_eq!(settings.player.actor.speed, 192.0);
        assert_eq!(settings.enemy.speed, 32.0);
        assert_eq!(settings.enemy.health, 10);
        assert_eq!(settings.player.bullet.bounce_factor, 0.9);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "cell_size": 32 }"#).unwrap();
        assert_eq!(settings.cell_size, 32.0);
        assert_eq!(settings.player, PlayerTuning::default());
    }

    #[test]
    fn test_nested_override() {
        let json = r#"{ "player": { "actor": {
            "speed": 100, "health": 5, "offset": [-4, -8], "size": [8, 8],
            "climb_margin": 0.5, "collidable": true
        }, "jump_force": -200, "max_jumps": 2, "jump_grace": 0.2,
           "fire_cooldown": 0.5, "muzzle_offset": 8,
           "bullet": { "radius": 2, "from_player": true, "damage": 3, "speed": 100,
                       "lifetime": 2, "gravity": false, "speed_factor": 1,
                       "bounces": false, "bounce_factor": 1 } } }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.player.max_jumps, 2);
        assert_eq!(settings.player.actor.health, 5);
        assert!(!settings.player.bullet.bounces);
        assert_eq!(settings.enemy, ActorParams::enemy());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let settings = Settings::load_or_default("/nonexistent/ledge-settings.json");
        assert_eq!(settings, Settings::default());
    }
}
