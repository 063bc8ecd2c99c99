//! Canvas-2D render pass
//!
//! A pure function of the session state plus the frame timestamp (which
//! only drives the starfield drift). Never mutates simulation state.

use std::f64::consts::TAU;

use web_sys::CanvasRenderingContext2d;

use crate::sim::SessionState;

const STAR_COUNT: u32 = 60;

pub fn draw(ctx: &CanvasRenderingContext2d, state: &SessionState, time_ms: f64) {
    let width = f64::from(state.field.x);
    let height = f64::from(state.field.y);
    ctx.clear_rect(0.0, 0.0, width, height);

    // Drifting starfield
    ctx.set_fill_style_str("rgba(255,255,255,0.05)");
    for i in 0..STAR_COUNT {
        let x = f64::from(i * 70) % width;
        let y = (f64::from(i * 110) + time_ms * 0.05) % height;
        ctx.fill_rect(x, y, 1.0, 1.0);
    }

    // Player ship: hull plus a raised cockpit stripe
    let p = &state.player;
    ctx.set_fill_style_str("#38bdf8");
    ctx.fill_rect(
        f64::from(p.pos.x),
        f64::from(p.pos.y),
        f64::from(p.size.x),
        f64::from(p.size.y),
    );
    ctx.set_fill_style_str("#0ea5e9");
    ctx.fill_rect(
        f64::from(p.pos.x + 6.0),
        f64::from(p.pos.y - 8.0),
        f64::from(p.size.x - 12.0),
        8.0,
    );

    ctx.set_fill_style_str("#f8fafc");
    for bullet in &state.bullets {
        ctx.fill_rect(
            f64::from(bullet.pos.x),
            f64::from(bullet.pos.y),
            f64::from(bullet.size.x),
            f64::from(bullet.size.y),
        );
    }

    ctx.set_fill_style_str("#f87171");
    for bullet in &state.enemy_bullets {
        ctx.fill_rect(
            f64::from(bullet.pos.x),
            f64::from(bullet.pos.y),
            f64::from(bullet.size.x),
            f64::from(bullet.size.y),
        );
    }

    for enemy in &state.enemies {
        ctx.set_fill_style_str("#f97316");
        ctx.fill_rect(
            f64::from(enemy.pos.x),
            f64::from(enemy.pos.y),
            f64::from(enemy.size.x),
            f64::from(enemy.size.y),
        );
        ctx.set_fill_style_str("#fb923c");
        ctx.fill_rect(
            f64::from(enemy.pos.x + 6.0),
            f64::from(enemy.pos.y + 4.0),
            f64::from(enemy.size.x - 12.0),
            f64::from(enemy.size.y - 8.0),
        );
    }

    // Explosions: radial fade, fully transparent at the rim
    for explosion in &state.explosions {
        let cx = f64::from(explosion.center.x);
        let cy = f64::from(explosion.center.y);
        let radius = f64::from(explosion.radius);
        let Ok(gradient) = ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, radius) else {
            continue;
        };
        let _ = gradient.add_color_stop(0.0, "rgba(248,250,252,0.8)");
        let _ = gradient.add_color_stop(1.0, "rgba(248,113,113,0)");
        ctx.set_fill_style_canvas_gradient(&gradient);
        ctx.begin_path();
        let _ = ctx.arc(cx, cy, radius, 0.0, TAU);
        ctx.fill();
    }
}
