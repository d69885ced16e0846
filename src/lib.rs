//! Ledge - a tick-based 2D platformer physics core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, level colliders, broad-phase, collision, tick)
//! - `settings`: Data-driven tunables for actors, camera and broad-phase
//! - `error`: Load-time and lookup errors
//!
//! Coordinates are screen space: x grows to the right, y grows downward, so
//! gravity pulls toward positive y.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::SimError;
pub use settings::Settings;

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default room physics
    pub const DEFAULT_GRAVITY_CAP: f32 = 256.0;
    /// Added to vertical velocity every tick while airborne
    pub const DEFAULT_GRAVITY_STRENGTH: f32 = 16.0;
    pub const DEFAULT_AIR_FRICTION: f32 = 32.0;

    /// Default view (camera) size in pixels
    pub const VIEW_WIDTH: f32 = 640.0;
    pub const VIEW_HEIGHT: f32 = 360.0;

    /// Broad-phase grid cell size in pixels
    pub const CELL_SIZE: f32 = 64.0;

    /// Actor defaults
    pub const PLAYER_SPEED: f32 = 192.0;
    pub const PLAYER_HEALTH: i32 = 3;
    pub const ENEMY_SPEED: f32 = 32.0;
    pub const ENEMY_HEALTH: i32 = 10;
    /// Fraction of body height tolerated as a step-up
    pub const CLIMB_MARGIN: f32 = 0.25;
    pub const ACTOR_WIDTH: f32 = 16.0;
    pub const ACTOR_HEIGHT: f32 = 24.0;

    /// Jumping
    pub const JUMP_FORCE: f32 = -384.0;
    pub const MAX_JUMPS: u32 = 1;
    /// Coyote time: seconds after leaving the ground a jump is still allowed
    pub const JUMP_GRACE: f32 = 0.1;

    /// Weapon defaults
    pub const FIRE_COOLDOWN: f32 = 0.1;
    /// Distance from the hitbox centre at which bullets appear
    pub const MUZZLE_OFFSET: f32 = 16.0;
    pub const BULLET_RADIUS: f32 = 4.0;
    pub const BULLET_SPEED: f32 = 384.0;
    pub const BULLET_LIFETIME: f32 = 1.0;
    pub const BULLET_SPEED_FACTOR: f32 = 0.99;
    pub const BULLET_BOUNCE_FACTOR: f32 = 0.9;
}

/// Sign of a value as -1, 0 or +1 (unlike `f32::signum`, zero maps to zero)
#[inline]
pub fn sign(value: f32) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

/// Unit direction from `from` toward `to`, or zero when they coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}
