//! Session state and entity types
//!
//! One `SessionState` exclusively owns every entity collection for the
//! lifetime of a single game session. Nothing here is persisted; a restart
//! constructs a fresh state rather than resetting the old one.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::Rect;
use crate::consts::*;
use crate::{difficulty_baseline, spawn_interval_ms};

/// Lifecycle of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Frame loop active, entities advancing
    Running,
    /// Lives hit zero; state is frozen until restart
    GameOver,
    /// Explicitly closed by the player
    Closed,
}

/// Things that happened during an update, for the harness to react to
/// (sounds, HUD refresh). Purely advisory; the state is already final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    ShotFired,
    Explosion,
    PlayerHit,
    GameOver,
}

/// The player ship
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    /// Horizontal pixels per frame while a direction is held
    pub speed: f32,
    /// Frames until the next shot is allowed
    pub cooldown: u32,
}

impl Player {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }
}

/// An upward-travelling player bullet
#[derive(Debug, Clone)]
pub struct Bullet {
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
}

impl Bullet {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }
}

/// A descending enemy with a sinusoidal horizontal weave
#[derive(Debug, Clone)]
pub struct Enemy {
    pub pos: Vec2,
    pub size: Vec2,
    /// Horizontal anchor the weave oscillates around
    pub base_x: f32,
    /// Descent speed, pixels per frame
    pub speed: f32,
    pub amplitude: f32,
    pub frequency: f32,
    /// Elapsed oscillation time, milliseconds
    pub time: f32,
}

impl Enemy {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }
}

/// A downward-travelling enemy bullet
#[derive(Debug, Clone)]
pub struct EnemyBullet {
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
}

impl EnemyBullet {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }
}

/// An expanding blast ring, purely visual
#[derive(Debug, Clone)]
pub struct Explosion {
    pub center: Vec2,
    pub radius: f32,
    pub max_radius: f32,
}

/// Complete state of one game session
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: SessionPhase,
    /// Play field extents (width, height)
    pub field: Vec2,
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub enemy_bullets: Vec<EnemyBullet>,
    pub explosions: Vec<Explosion>,
    /// Milliseconds until the next scheduled enemy spawn
    pub spawn_timer: f32,
    /// Score-derived target difficulty; only ever rises
    pub base_difficulty: f32,
    /// Applied difficulty; dips below baseline after a hit
    pub difficulty: f32,
    pub score: u32,
    pub lives: i32,
    rng: Pcg32,
}

impl SessionState {
    /// Create a fresh session: player centered near the bottom, empty
    /// field, three lives.
    pub fn new(seed: u64) -> Self {
        let field = Vec2::new(FIELD_WIDTH, FIELD_HEIGHT);
        let size = Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT);
        Self {
            phase: SessionPhase::Running,
            field,
            player: Player {
                pos: Vec2::new(field.x / 2.0 - size.x / 2.0, field.y - PLAYER_BOTTOM_OFFSET),
                size,
                speed: PLAYER_SPEED,
                cooldown: 0,
            },
            bullets: Vec::new(),
            enemies: Vec::new(),
            enemy_bullets: Vec::new(),
            explosions: Vec::new(),
            spawn_timer: 0.0,
            base_difficulty: 1.0,
            difficulty: 1.0,
            score: 0,
            lives: STARTING_LIVES,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    /// Clamp the player's x so the ship stays fully inside the field with
    /// the edge margin on both sides.
    pub fn clamp_player_x(&mut self) {
        let max_x = self.field.x - self.player.size.x - EDGE_MARGIN;
        self.player.pos.x = self.player.pos.x.clamp(EDGE_MARGIN, max_x);
    }

    /// Spawn one enemy at a random x above the top edge
    pub fn spawn_enemy(&mut self) {
        let x = self.rng.random::<f32>() * (self.field.x - 40.0) + 20.0;
        let speed = ENEMY_BASE_SPEED + self.difficulty * ENEMY_SPEED_PER_DIFFICULTY;
        let amplitude = ENEMY_AMPLITUDE_MIN + self.rng.random::<f32>() * ENEMY_AMPLITUDE_SPAN;
        let frequency =
            ENEMY_FREQUENCY_BASE + self.rng.random::<f32>() * ENEMY_FREQUENCY_SPAN * self.difficulty;
        let time = self.rng.random::<f32>() * ENEMY_TIME_JITTER;
        self.enemies.push(Enemy {
            pos: Vec2::new(x, ENEMY_SPAWN_Y),
            size: Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT),
            base_x: x,
            speed,
            amplitude,
            frequency,
            time,
        });
    }

    /// Backfill a wave so the field is never empty for long
    pub fn spawn_wave_if_empty(&mut self) {
        if self.enemies.is_empty() {
            for _ in 0..WAVE_SIZE {
                self.spawn_enemy();
            }
        }
    }

    /// Fire a player bullet if the cooldown allows it.
    /// Returns true if a shot went out.
    pub fn fire(&mut self) -> bool {
        if self.player.cooldown > 0 {
            return false;
        }
        self.bullets.push(Bullet {
            pos: Vec2::new(
                self.player.pos.x + self.player.size.x / 2.0 - BULLET_WIDTH / 2.0,
                self.player.pos.y - 10.0,
            ),
            size: Vec2::new(BULLET_WIDTH, BULLET_HEIGHT),
            speed: BULLET_SPEED,
        });
        self.player.cooldown = FIRE_COOLDOWN_FRAMES;
        true
    }

    /// Roll the per-frame enemy fire chance
    pub fn roll_enemy_fire(&mut self) -> bool {
        self.rng.random::<f32>() < ENEMY_FIRE_CHANCE * self.difficulty
    }

    /// Drop an enemy bullet from an enemy's center-bottom
    pub fn enemy_fire(&mut self, enemy_rect: &Rect) {
        self.enemy_bullets.push(EnemyBullet {
            pos: Vec2::new(
                enemy_rect.pos.x + enemy_rect.size.x / 2.0 - ENEMY_BULLET_WIDTH / 2.0,
                enemy_rect.bottom(),
            ),
            size: Vec2::new(ENEMY_BULLET_WIDTH, ENEMY_BULLET_HEIGHT),
            speed: ENEMY_BULLET_BASE_SPEED + self.difficulty * ENEMY_BULLET_SPEED_PER_DIFFICULTY,
        });
    }

    pub fn add_explosion(&mut self, center: Vec2) {
        self.explosions.push(Explosion {
            center,
            radius: EXPLOSION_START_RADIUS,
            max_radius: EXPLOSION_MAX_RADIUS,
        });
    }

    /// Credit a kill: bump the score and pull difficulty up toward the new
    /// baseline. The baseline never decreases.
    pub fn register_kill(&mut self) {
        self.score += KILL_SCORE;
        self.base_difficulty = self.base_difficulty.max(difficulty_baseline(self.score));
        self.difficulty = self.difficulty.max(self.base_difficulty);
    }

    /// Register a qualifying player hit. Decrements lives exactly once;
    /// at zero the session transitions to GameOver, otherwise difficulty
    /// eases off below the (unchanged) baseline.
    /// Returns true if this hit ended the session.
    pub fn register_hit(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.lives -= 1;
        if self.lives <= 0 {
            self.phase = SessionPhase::GameOver;
            true
        } else {
            self.difficulty = (self.base_difficulty - HIT_FORGIVENESS).max(1.0);
            false
        }
    }

    /// Spawn interval for the current difficulty
    pub fn current_spawn_interval(&self) -> f32 {
        spawn_interval_ms(self.difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let state = SessionState::new(7);
        assert_eq!(state.phase, SessionPhase::Running);
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(state.score, 0);
        assert_eq!(state.difficulty, 1.0);
        assert!(state.enemies.is_empty());
        assert!(state.bullets.is_empty());
        // Centered near the bottom
        assert_eq!(
            state.player.pos.x,
            FIELD_WIDTH / 2.0 - PLAYER_WIDTH / 2.0
        );
        assert_eq!(state.player.pos.y, FIELD_HEIGHT - PLAYER_BOTTOM_OFFSET);
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut state = SessionState::new(7);
        assert!(state.fire());
        assert_eq!(state.bullets.len(), 1);
        assert_eq!(state.player.cooldown, FIRE_COOLDOWN_FRAMES);
        // Second shot blocked until the cooldown drains
        assert!(!state.fire());
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_spawned_enemy_within_field() {
        let mut state = SessionState::new(42);
        for _ in 0..50 {
            state.spawn_enemy();
        }
        for enemy in &state.enemies {
            assert!(enemy.pos.x >= 20.0);
            assert!(enemy.pos.x <= FIELD_WIDTH - 20.0);
            assert_eq!(enemy.pos.y, ENEMY_SPAWN_Y);
            assert_eq!(enemy.base_x, enemy.pos.x);
        }
    }

    #[test]
    fn test_wave_backfill_only_when_empty() {
        let mut state = SessionState::new(42);
        state.spawn_wave_if_empty();
        assert_eq!(state.enemies.len(), WAVE_SIZE);
        state.spawn_wave_if_empty();
        assert_eq!(state.enemies.len(), WAVE_SIZE);
    }

    #[test]
    fn test_kill_raises_difficulty_monotonically() {
        let mut state = SessionState::new(1);
        let mut prior = state.base_difficulty;
        for _ in 0..100 {
            state.register_kill();
            assert!(state.base_difficulty >= prior);
            assert!(state.difficulty >= state.base_difficulty);
            prior = state.base_difficulty;
        }
        assert_eq!(state.score, 100 * KILL_SCORE);
        assert_eq!(
            state.base_difficulty,
            1.0 + state.score as f32 / DIFFICULTY_SCORE_DIVISOR
        );
    }

    #[test]
    fn test_hit_eases_difficulty_but_not_baseline() {
        let mut state = SessionState::new(1);
        for _ in 0..60 {
            state.register_kill();
        }
        let baseline = state.base_difficulty;
        assert!(!state.register_hit());
        assert_eq!(state.lives, STARTING_LIVES - 1);
        assert_eq!(state.base_difficulty, baseline);
        assert_eq!(state.difficulty, (baseline - HIT_FORGIVENESS).max(1.0));
    }

    #[test]
    fn test_forgiveness_clamps_at_one() {
        let mut state = SessionState::new(1);
        // Baseline still 1.0; the offset must not push difficulty below 1
        assert!(!state.register_hit());
        assert_eq!(state.difficulty, 1.0);
    }

    #[test]
    fn test_third_hit_is_terminal() {
        let mut state = SessionState::new(1);
        assert!(!state.register_hit());
        assert!(!state.register_hit());
        assert!(state.register_hit());
        assert_eq!(state.phase, SessionPhase::GameOver);
        assert_eq!(state.lives, 0);
        // Further hits are ignored; lives never go negative
        assert!(!state.register_hit());
        assert_eq!(state.lives, 0);
    }
}
