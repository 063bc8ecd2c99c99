//! Starshot - the interactive layer of a personal portfolio site
//!
//! Core modules:
//! - `sim`: Deterministic arcade simulation (movement, spawning, collisions)
//! - `game`: Browser session harness (overlay, frame loop, input)
//! - `render`: Canvas-2D render pass
//! - `audio`: Procedural Web Audio sound effects
//! - `embed`: Deferred third-party scheduling widget loader
//! - `contact`: Contact form endpoint (native server only)

pub mod embed;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod game;
#[cfg(target_arch = "wasm32")]
pub mod overlay;
#[cfg(target_arch = "wasm32")]
pub mod render;

#[cfg(not(target_arch = "wasm32"))]
pub mod contact;

pub use sim::{FrameInput, SessionPhase, SessionState};

/// Game configuration constants
pub mod consts {
    /// Play field dimensions (CSS pixels, matches the canvas element)
    pub const FIELD_WIDTH: f32 = 420.0;
    pub const FIELD_HEIGHT: f32 = 560.0;
    /// Player may never get closer than this to the left/right edges
    pub const EDGE_MARGIN: f32 = 10.0;

    /// Player ship
    pub const PLAYER_WIDTH: f32 = 36.0;
    pub const PLAYER_HEIGHT: f32 = 18.0;
    pub const PLAYER_SPEED: f32 = 6.0;
    /// Vertical offset of the ship above the bottom edge
    pub const PLAYER_BOTTOM_OFFSET: f32 = 60.0;
    /// Frames between shots
    pub const FIRE_COOLDOWN_FRAMES: u32 = 10;

    /// Player bullets
    pub const BULLET_WIDTH: f32 = 4.0;
    pub const BULLET_HEIGHT: f32 = 12.0;
    pub const BULLET_SPEED: f32 = 9.0;

    /// Enemies
    pub const ENEMY_WIDTH: f32 = 32.0;
    pub const ENEMY_HEIGHT: f32 = 22.0;
    pub const ENEMY_SPAWN_Y: f32 = -40.0;
    pub const ENEMY_BASE_SPEED: f32 = 1.0;
    pub const ENEMY_SPEED_PER_DIFFICULTY: f32 = 0.45;
    pub const ENEMY_AMPLITUDE_MIN: f32 = 30.0;
    pub const ENEMY_AMPLITUDE_SPAN: f32 = 40.0;
    pub const ENEMY_FREQUENCY_BASE: f32 = 0.002;
    pub const ENEMY_FREQUENCY_SPAN: f32 = 0.002;
    /// Oscillation clocks start at a random point in [0, this) so a wave
    /// doesn't weave in lockstep
    pub const ENEMY_TIME_JITTER: f32 = 1000.0;
    /// Per-frame fire probability is this times current difficulty
    pub const ENEMY_FIRE_CHANCE: f32 = 0.002;
    /// Enemies despawn once fully below the field by this margin
    pub const ENEMY_DESPAWN_MARGIN: f32 = 40.0;

    /// Enemy bullets
    pub const ENEMY_BULLET_WIDTH: f32 = 4.0;
    pub const ENEMY_BULLET_HEIGHT: f32 = 10.0;
    pub const ENEMY_BULLET_BASE_SPEED: f32 = 5.0;
    pub const ENEMY_BULLET_SPEED_PER_DIFFICULTY: f32 = 0.3;
    pub const ENEMY_BULLET_DESPAWN_MARGIN: f32 = 10.0;

    /// Explosions
    pub const EXPLOSION_START_RADIUS: f32 = 4.0;
    pub const EXPLOSION_MAX_RADIUS: f32 = 18.0;
    pub const EXPLOSION_GROWTH_PER_FRAME: f32 = 0.8;

    /// Spawn pacing (milliseconds)
    pub const SPAWN_INTERVAL_BASE_MS: f32 = 600.0;
    pub const SPAWN_INTERVAL_PER_DIFFICULTY_MS: f32 = 80.0;
    pub const SPAWN_INTERVAL_FLOOR_MS: f32 = 220.0;
    /// Backfill wave size when the field empties out
    pub const WAVE_SIZE: usize = 4;

    /// Scoring and difficulty
    pub const KILL_SCORE: u32 = 10;
    pub const STARTING_LIVES: i32 = 3;
    /// Difficulty baseline is `1 + score / this`
    pub const DIFFICULTY_SCORE_DIVISOR: f32 = 200.0;
    /// Applied difficulty drops this far below baseline after a hit
    pub const HIT_FORGIVENESS: f32 = 0.6;
}

/// Spawn interval for the current difficulty, clamped to the pacing floor
#[inline]
pub fn spawn_interval_ms(difficulty: f32) -> f32 {
    use consts::*;
    (SPAWN_INTERVAL_BASE_MS - difficulty * SPAWN_INTERVAL_PER_DIFFICULTY_MS)
        .max(SPAWN_INTERVAL_FLOOR_MS)
}

/// Score-derived difficulty baseline (monotone in score)
#[inline]
pub fn difficulty_baseline(score: u32) -> f32 {
    1.0 + score as f32 / consts::DIFFICULTY_SCORE_DIVISOR
}
