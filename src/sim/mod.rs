//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Seeded RNG only
//! - No rendering or platform dependencies
//! - One `update` call per display frame, driven by the harness

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Rect, rects_intersect};
pub use state::{
    Bullet, Enemy, EnemyBullet, Explosion, Player, SessionEvent, SessionPhase, SessionState,
};
pub use tick::{FrameInput, update};
