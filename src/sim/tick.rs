//! Per-frame simulation update
//!
//! The harness calls `update` once per animation frame with the latest
//! input intent and the elapsed time. Collision removal is two-phase:
//! entities are marked during the pairwise tests, then the collections are
//! compacted, so nothing is mutated mid-iteration.

use glam::Vec2;

use super::state::{SessionEvent, SessionState};
use crate::consts::*;

/// Input intent for a single frame. Written by the event handlers, read by
/// `update`. `fire` and `pointer_x` are one-shot: the harness clears them
/// after each processed frame.
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Left direction currently held
    pub left: bool,
    /// Right direction currently held
    pub right: bool,
    /// Shot requested this frame (cooldown still applies)
    pub fire: bool,
    /// Absolute pointer x in field coordinates, from a drag or tap
    pub pointer_x: Option<f32>,
}

/// Advance the session by one frame. No-op unless the session is running.
pub fn update(state: &mut SessionState, input: &FrameInput, dt_ms: f32) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    if !state.is_running() {
        return events;
    }

    // Fire cooldown, floored at zero
    state.player.cooldown = state.player.cooldown.saturating_sub(1);

    // Horizontal movement: pointer position wins, held keys adjust, then
    // clamp inside the field margins
    if let Some(px) = input.pointer_x {
        state.player.pos.x = px - state.player.size.x / 2.0;
    }
    if input.left {
        state.player.pos.x -= state.player.speed;
    }
    if input.right {
        state.player.pos.x += state.player.speed;
    }
    state.clamp_player_x();

    if input.fire && state.fire() {
        events.push(SessionEvent::ShotFired);
    }

    // Spawn pacing: one enemy per interval, interval shrinks with
    // difficulty down to the floor
    state.spawn_timer -= dt_ms;
    if state.spawn_timer <= 0.0 {
        state.spawn_enemy();
        state.spawn_timer = state.current_spawn_interval();
    }
    state.spawn_wave_if_empty();

    // Advance enemies: descend and weave around the horizontal anchor
    for enemy in &mut state.enemies {
        enemy.time += dt_ms;
        enemy.pos.y += enemy.speed;
        enemy.pos.x = enemy.base_x + (enemy.time * enemy.frequency).sin() * enemy.amplitude;
    }
    for i in 0..state.enemies.len() {
        if state.roll_enemy_fire() {
            let rect = state.enemies[i].rect();
            state.enemy_fire(&rect);
        }
    }

    // Advance bullets
    for bullet in &mut state.bullets {
        bullet.pos.y -= bullet.speed;
    }
    for bullet in &mut state.enemy_bullets {
        bullet.pos.y += bullet.speed;
    }

    // --- Collision resolution: mark ---
    let player_rect = state.player.rect();
    let mut dead_enemies = vec![false; state.enemies.len()];
    let mut dead_bullets = vec![false; state.bullets.len()];
    let mut dead_enemy_bullets = vec![false; state.enemy_bullets.len()];
    let mut blasts: Vec<Vec2> = Vec::new();
    let mut kills = 0u32;
    let mut hits = 0u32;

    for (ei, enemy) in state.enemies.iter().enumerate() {
        // Fell off the bottom: gone, no penalty
        if enemy.pos.y > state.field.y + ENEMY_DESPAWN_MARGIN {
            dead_enemies[ei] = true;
            continue;
        }
        let enemy_rect = enemy.rect();
        // First intersecting bullet destroys both
        for (bi, bullet) in state.bullets.iter().enumerate() {
            if dead_bullets[bi] {
                continue;
            }
            if bullet.rect().intersects(&enemy_rect) {
                dead_bullets[bi] = true;
                dead_enemies[ei] = true;
                blasts.push(enemy_rect.center());
                kills += 1;
                break;
            }
        }
    }

    // Enemies that survived the bullets can still ram the player
    for (ei, enemy) in state.enemies.iter().enumerate() {
        if dead_enemies[ei] {
            continue;
        }
        let enemy_rect = enemy.rect();
        if enemy_rect.intersects(&player_rect) {
            dead_enemies[ei] = true;
            blasts.push(enemy_rect.center());
            hits += 1;
        }
    }

    for (bi, bullet) in state.enemy_bullets.iter().enumerate() {
        if bullet.rect().intersects(&player_rect) {
            dead_enemy_bullets[bi] = true;
            blasts.push(Vec2::new(player_rect.center().x, player_rect.top()));
            hits += 1;
        }
    }

    // --- Collision resolution: apply and compact ---
    for _ in 0..kills {
        state.register_kill();
    }
    for center in blasts {
        state.add_explosion(center);
        events.push(SessionEvent::Explosion);
    }
    for _ in 0..hits {
        if !state.is_running() {
            break;
        }
        events.push(SessionEvent::PlayerHit);
        if state.register_hit() {
            events.push(SessionEvent::GameOver);
        }
    }

    let mut i = 0;
    state.enemies.retain(|_| {
        let dead = dead_enemies[i];
        i += 1;
        !dead
    });
    let mut i = 0;
    state.bullets.retain(|b| {
        let dead = dead_bullets[i];
        i += 1;
        !dead && b.pos.y + b.size.y > 0.0
    });
    let mut i = 0;
    let field_h = state.field.y;
    state.enemy_bullets.retain(|b| {
        let dead = dead_enemy_bullets[i];
        i += 1;
        !dead && b.pos.y < field_h + ENEMY_BULLET_DESPAWN_MARGIN
    });

    // Explosions grow every frame and vanish at their max radius
    for explosion in &mut state.explosions {
        explosion.radius += EXPLOSION_GROWTH_PER_FRAME;
    }
    state.explosions.retain(|e| e.radius < e.max_radius);

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Bullet, Enemy, EnemyBullet, SessionPhase};
    use proptest::prelude::*;

    const DT: f32 = 16.7;

    fn enemy_at(x: f32, y: f32) -> Enemy {
        Enemy {
            pos: Vec2::new(x, y),
            size: Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT),
            base_x: x,
            speed: 0.0,
            amplitude: 0.0,
            frequency: 0.0,
            time: 0.0,
        }
    }

    fn bullet_at(x: f32, y: f32) -> Bullet {
        Bullet {
            pos: Vec2::new(x, y),
            size: Vec2::new(BULLET_WIDTH, BULLET_HEIGHT),
            speed: 0.0,
        }
    }

    #[test]
    fn test_first_update_populates_field() {
        let mut state = SessionState::new(3);
        update(&mut state, &FrameInput::default(), DT);
        // Spawn timer starts expired, so one enemy comes out immediately
        // and the timer is re-armed; the wave backfill never sees an empty
        // field after that
        assert_eq!(state.enemies.len(), 1);
        assert!(state.spawn_timer > 0.0);
    }

    #[test]
    fn test_wave_backfill_after_field_clears() {
        let mut state = SessionState::new(3);
        update(&mut state, &FrameInput::default(), DT);
        state.enemies.clear();
        // Timer armed, so step 3 spawns nothing; the backfill fills a wave
        update(&mut state, &FrameInput::default(), DT);
        assert_eq!(state.enemies.len(), WAVE_SIZE);
    }

    #[test]
    fn test_spawn_interval_floor() {
        assert_eq!(crate::spawn_interval_ms(100.0), SPAWN_INTERVAL_FLOOR_MS);
        assert_eq!(crate::spawn_interval_ms(1.0), 520.0);
    }

    #[test]
    fn test_bullet_kill_removes_both_and_scores() {
        let mut state = SessionState::new(3);
        state.spawn_timer = 10_000.0;
        state.enemies.push(enemy_at(100.0, 100.0));
        state.bullets.push(bullet_at(110.0, 105.0));
        // A decoy wave member far away so the backfill stays quiet
        state.enemies.push(enemy_at(300.0, 200.0));

        let events = update(&mut state, &FrameInput::default(), DT);

        assert_eq!(state.score, KILL_SCORE);
        assert_eq!(state.enemies.len(), 1);
        assert!(state.bullets.is_empty());
        assert_eq!(state.explosions.len(), 1);
        assert!(events.contains(&SessionEvent::Explosion));
        assert!(state.difficulty >= 1.0 + KILL_SCORE as f32 / DIFFICULTY_SCORE_DIVISOR);
    }

    #[test]
    fn test_one_bullet_kills_one_enemy() {
        // Two enemies stacked on the same spot: a single bullet takes out
        // only the first one it intersects
        let mut state = SessionState::new(3);
        state.spawn_timer = 10_000.0;
        state.enemies.push(enemy_at(100.0, 100.0));
        state.enemies.push(enemy_at(100.0, 100.0));
        state.bullets.push(bullet_at(110.0, 105.0));

        update(&mut state, &FrameInput::default(), DT);

        assert_eq!(state.score, KILL_SCORE);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_enemy_off_bottom_removed_without_penalty() {
        let mut state = SessionState::new(3);
        state.spawn_timer = 10_000.0;
        state.enemies.push(enemy_at(100.0, FIELD_HEIGHT + ENEMY_DESPAWN_MARGIN + 5.0));
        state.enemies.push(enemy_at(300.0, 100.0));

        update(&mut state, &FrameInput::default(), DT);

        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(state.score, 0);
        assert!(state.explosions.is_empty());
    }

    #[test]
    fn test_enemy_contact_costs_one_life() {
        let mut state = SessionState::new(3);
        state.spawn_timer = 10_000.0;
        let px = state.player.pos.x;
        let py = state.player.pos.y;
        state.enemies.push(enemy_at(px, py));
        state.enemies.push(enemy_at(300.0, 100.0));

        let events = update(&mut state, &FrameInput::default(), DT);

        assert_eq!(state.lives, STARTING_LIVES - 1);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.explosions.len(), 1);
        assert!(events.contains(&SessionEvent::PlayerHit));
        assert!(state.is_running());
    }

    #[test]
    fn test_enemy_bullet_hit_costs_one_life() {
        let mut state = SessionState::new(3);
        state.spawn_timer = 10_000.0;
        state.enemies.push(enemy_at(300.0, 100.0));
        state.enemy_bullets.push(EnemyBullet {
            pos: state.player.pos + Vec2::new(10.0, 2.0),
            size: Vec2::new(ENEMY_BULLET_WIDTH, ENEMY_BULLET_HEIGHT),
            speed: 0.0,
        });

        update(&mut state, &FrameInput::default(), DT);

        assert_eq!(state.lives, STARTING_LIVES - 1);
        assert!(state.enemy_bullets.is_empty());
        assert_eq!(state.explosions.len(), 1);
    }

    #[test]
    fn test_last_life_transitions_to_game_over() {
        let mut state = SessionState::new(3);
        state.spawn_timer = 10_000.0;
        state.lives = 1;
        state.enemies.push(enemy_at(state.player.pos.x, state.player.pos.y));
        state.enemies.push(enemy_at(300.0, 100.0));

        let events = update(&mut state, &FrameInput::default(), DT);

        assert_eq!(state.phase, SessionPhase::GameOver);
        assert_eq!(state.lives, 0);
        assert!(events.contains(&SessionEvent::GameOver));
    }

    #[test]
    fn test_updates_after_game_over_mutate_nothing() {
        let mut state = SessionState::new(3);
        state.spawn_timer = 10_000.0;
        state.lives = 1;
        state.enemies.push(enemy_at(state.player.pos.x, state.player.pos.y));
        update(&mut state, &FrameInput::default(), DT);
        assert_eq!(state.phase, SessionPhase::GameOver);

        let enemies = state.enemies.len();
        let explosions = state.explosions.len();
        let score = state.score;
        let input = FrameInput {
            left: true,
            fire: true,
            ..Default::default()
        };
        let events = update(&mut state, &input, DT);
        assert!(events.is_empty());
        assert_eq!(state.enemies.len(), enemies);
        assert_eq!(state.explosions.len(), explosions);
        assert_eq!(state.score, score);
        assert_eq!(state.lives, 0);
    }

    #[test]
    fn test_simultaneous_contacts_decrement_once_each() {
        // Enemy ram plus an enemy bullet in the same frame: two distinct
        // contact events, two lives lost, never double-counted
        let mut state = SessionState::new(3);
        state.spawn_timer = 10_000.0;
        state.enemies.push(enemy_at(state.player.pos.x, state.player.pos.y));
        state.enemies.push(enemy_at(300.0, 100.0));
        state.enemy_bullets.push(EnemyBullet {
            pos: state.player.pos + Vec2::new(20.0, 2.0),
            size: Vec2::new(ENEMY_BULLET_WIDTH, ENEMY_BULLET_HEIGHT),
            speed: 0.0,
        });

        update(&mut state, &FrameInput::default(), DT);
        assert_eq!(state.lives, STARTING_LIVES - 2);
    }

    #[test]
    fn test_explosion_lifecycle() {
        let mut state = SessionState::new(3);
        state.spawn_timer = 10_000.0;
        state.enemies.push(enemy_at(300.0, 100.0));
        state.add_explosion(Vec2::new(50.0, 50.0));

        let frames_to_fade = ((EXPLOSION_MAX_RADIUS - EXPLOSION_START_RADIUS)
            / EXPLOSION_GROWTH_PER_FRAME)
            .ceil() as usize;
        for _ in 0..frames_to_fade - 1 {
            update(&mut state, &FrameInput::default(), DT);
            assert_eq!(state.explosions.len(), 1);
        }
        update(&mut state, &FrameInput::default(), DT);
        assert!(state.explosions.is_empty());
    }

    #[test]
    fn test_cooldown_limits_fire_rate() {
        let mut state = SessionState::new(3);
        state.spawn_timer = 10_000.0;
        state.enemies.push(enemy_at(300.0, 490.0));
        let input = FrameInput {
            fire: true,
            ..Default::default()
        };
        for _ in 0..FIRE_COOLDOWN_FRAMES as usize {
            update(&mut state, &input, DT);
        }
        // Cooldown decrements before the shot check, so a held trigger
        // fires once per FIRE_COOLDOWN_FRAMES frames
        assert_eq!(state.bullets.len(), 1);
        update(&mut state, &input, DT);
        assert_eq!(state.bullets.len(), 2);
    }

    #[test]
    fn test_pointer_overrides_position() {
        let mut state = SessionState::new(3);
        state.spawn_timer = 10_000.0;
        state.enemies.push(enemy_at(300.0, 100.0));
        let input = FrameInput {
            pointer_x: Some(200.0),
            ..Default::default()
        };
        update(&mut state, &input, DT);
        assert_eq!(state.player.pos.x, 200.0 - PLAYER_WIDTH / 2.0);
    }

    proptest! {
        #[test]
        fn prop_player_stays_clamped(
            moves in proptest::collection::vec((any::<bool>(), any::<bool>(), -2000.0f32..2000.0), 1..120)
        ) {
            let mut state = SessionState::new(99);
            for (left, right, px) in moves {
                let input = FrameInput {
                    left,
                    right,
                    fire: false,
                    pointer_x: if px > 1000.0 { None } else { Some(px) },
                };
                update(&mut state, &input, DT);
                prop_assert!(state.player.pos.x >= EDGE_MARGIN);
                prop_assert!(
                    state.player.pos.x <= FIELD_WIDTH - PLAYER_WIDTH - EDGE_MARGIN
                );
            }
        }

        #[test]
        fn prop_baseline_monotone_under_any_kill_hit_sequence(
            ops in proptest::collection::vec(any::<bool>(), 1..200)
        ) {
            let mut state = SessionState::new(7);
            let mut prior = state.base_difficulty;
            for is_kill in ops {
                if is_kill {
                    state.register_kill();
                } else {
                    state.register_hit();
                }
                if !state.is_running() {
                    break;
                }
                prop_assert!(state.base_difficulty >= prior);
                prop_assert!(state.lives >= 0);
                prior = state.base_difficulty;
            }
        }
    }
}
