//! Browser session harness
//!
//! Owns the overlay, the input listeners and the animation-frame chain for
//! one arcade session. At most one session is active at a time; launching
//! while one is live is a no-op. Input handlers write into a `FrameInput`
//! intent that the frame callback reads, so all simulation mutation stays
//! inside the frame callback.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, FocusEvent, KeyboardEvent, MouseEvent};

use crate::audio::{AudioManager, SoundEffect};
use crate::overlay::Overlay;
use crate::render;
use crate::sim::{FrameInput, SessionEvent, SessionPhase, SessionState, update};

thread_local! {
    static SESSION_ACTIVE: Cell<bool> = const { Cell::new(false) };
}

enum FrameOutcome {
    Continue,
    GameOver,
    Stopped,
}

/// Event closures for one session. Detached on close but kept allocated
/// with the session; a closure must never be dropped from inside its own
/// call frame.
struct Listeners {
    keydown: Closure<dyn FnMut(KeyboardEvent)>,
    keyup: Closure<dyn FnMut(KeyboardEvent)>,
    mousedown: Closure<dyn FnMut(MouseEvent)>,
    mousemove: Closure<dyn FnMut(MouseEvent)>,
    mouseup: Closure<dyn FnMut(MouseEvent)>,
    blur: Closure<dyn FnMut(FocusEvent)>,
    close: Closure<dyn FnMut(MouseEvent)>,
    restart: Option<Closure<dyn FnMut(MouseEvent)>>,
}

struct Session {
    state: SessionState,
    input: FrameInput,
    pointer_active: bool,
    last_time: f64,
    overlay: Overlay,
    ctx: CanvasRenderingContext2d,
    audio: AudioManager,
    listeners: Option<Listeners>,
}

impl Session {
    /// One animation frame: advance the sim, play events, repaint
    fn frame(&mut self, time: f64) -> FrameOutcome {
        match self.state.phase {
            SessionPhase::Running => {}
            SessionPhase::GameOver | SessionPhase::Closed => return FrameOutcome::Stopped,
        }

        let dt = if self.last_time > 0.0 {
            (time - self.last_time) as f32
        } else {
            16.7
        };
        self.last_time = time;

        let events = update(&mut self.state, &self.input, dt);
        // One-shot intents are consumed by the frame they land in
        self.input.fire = false;
        self.input.pointer_x = None;

        for event in &events {
            match event {
                SessionEvent::ShotFired => self.audio.play(SoundEffect::Shoot),
                SessionEvent::Explosion => self.audio.play(SoundEffect::Explosion),
                SessionEvent::GameOver => self.audio.play(SoundEffect::GameOver),
                SessionEvent::PlayerHit => {}
            }
        }

        render::draw(&self.ctx, &self.state, time);
        self.overlay.update_hud(self.state.score, self.state.lives);

        if self.state.phase == SessionPhase::GameOver {
            FrameOutcome::GameOver
        } else {
            FrameOutcome::Continue
        }
    }

    /// Remove every event listener this session registered
    fn detach(&mut self) {
        let Some(listeners) = &self.listeners else {
            return;
        };
        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback(
                "keydown",
                listeners.keydown.as_ref().unchecked_ref(),
            );
            let _ = window.remove_event_listener_with_callback(
                "keyup",
                listeners.keyup.as_ref().unchecked_ref(),
            );
            let _ = window.remove_event_listener_with_callback(
                "mousemove",
                listeners.mousemove.as_ref().unchecked_ref(),
            );
            let _ = window.remove_event_listener_with_callback(
                "mouseup",
                listeners.mouseup.as_ref().unchecked_ref(),
            );
            let _ = window.remove_event_listener_with_callback(
                "blur",
                listeners.blur.as_ref().unchecked_ref(),
            );
        }
        let _ = self.overlay.canvas.remove_event_listener_with_callback(
            "mousedown",
            listeners.mousedown.as_ref().unchecked_ref(),
        );
        let _ = self.overlay.close_btn.remove_event_listener_with_callback(
            "click",
            listeners.close.as_ref().unchecked_ref(),
        );
        // The restart button leaves the document with the overlay
    }
}

/// Idempotently create the overlay and start a session if none is active
#[wasm_bindgen(js_name = launchArcade)]
pub fn launch_arcade() -> Result<(), JsValue> {
    launch()
}

pub fn launch() -> Result<(), JsValue> {
    if SESSION_ACTIVE.get() {
        return Ok(());
    }
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    if Overlay::is_present(&document) {
        return Ok(());
    }

    let overlay = Overlay::build(&document)?;
    let ctx: CanvasRenderingContext2d = overlay
        .canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    let seed = js_sys::Date::now() as u64;
    let session = Rc::new(RefCell::new(Session {
        state: SessionState::new(seed),
        input: FrameInput::default(),
        pointer_active: false,
        last_time: 0.0,
        overlay,
        ctx,
        audio: AudioManager::new(),
        listeners: None,
    }));

    attach_listeners(session.clone())?;
    SESSION_ACTIVE.set(true);
    {
        let s = session.borrow();
        s.overlay.update_hud(s.state.score, s.state.lives);
    }
    start_frame_loop(session);
    log::info!("Arcade session started (seed {seed})");
    Ok(())
}

/// Stop the loop, detach inputs and remove the overlay. Frees the session
/// slot for the next launch.
fn close_session(session: &Rc<RefCell<Session>>) {
    let mut s = session.borrow_mut();
    s.state.phase = SessionPhase::Closed;
    s.detach();
    s.overlay.remove();
    SESSION_ACTIVE.set(false);
    log::info!("Arcade session closed");
}

fn attach_listeners(session: Rc<RefCell<Session>>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

    let keydown = {
        let session = session.clone();
        Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            let key = event.key();
            if matches!(key.as_str(), "ArrowLeft" | "ArrowRight" | " " | "a" | "d") {
                event.prevent_default();
            }
            let mut s = session.borrow_mut();
            match key.as_str() {
                "ArrowLeft" | "a" => s.input.left = true,
                "ArrowRight" | "d" => s.input.right = true,
                " " | "Spacebar" => s.input.fire = true,
                _ => {}
            }
        })
    };
    window.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;

    let keyup = {
        let session = session.clone();
        Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            let mut s = session.borrow_mut();
            match event.key().as_str() {
                "ArrowLeft" | "a" => s.input.left = false,
                "ArrowRight" | "d" => s.input.right = false,
                _ => {}
            }
        })
    };
    window.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;

    // Tap/drag: press moves the ship under the pointer and shoots,
    // dragging steers, release lets the keys take over again
    let mousedown = {
        let session = session.clone();
        Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let mut s = session.borrow_mut();
            let rect = s.overlay.canvas.get_bounding_client_rect();
            let x = event.client_x() as f32 - rect.left() as f32;
            s.pointer_active = true;
            s.input.pointer_x = Some(x);
            s.input.fire = true;
        })
    };
    session
        .borrow()
        .overlay
        .canvas
        .add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;

    let mousemove = {
        let session = session.clone();
        Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let mut s = session.borrow_mut();
            if !s.pointer_active {
                return;
            }
            let rect = s.overlay.canvas.get_bounding_client_rect();
            let x = event.client_x() as f32 - rect.left() as f32;
            s.input.pointer_x = Some(x);
        })
    };
    window.add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref())?;

    let mouseup = {
        let session = session.clone();
        Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| {
            session.borrow_mut().pointer_active = false;
        })
    };
    window.add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;

    let blur = {
        let session = session.clone();
        Closure::<dyn FnMut(FocusEvent)>::new(move |_event: FocusEvent| {
            session.borrow_mut().pointer_active = false;
        })
    };
    window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;

    let close = {
        let session = session.clone();
        Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| {
            close_session(&session);
        })
    };
    session
        .borrow()
        .overlay
        .close_btn
        .add_event_listener_with_callback("click", close.as_ref().unchecked_ref())?;

    session.borrow_mut().listeners = Some(Listeners {
        keydown,
        keyup,
        mousedown,
        mousemove,
        mouseup,
        blur,
        close,
        restart: None,
    });
    Ok(())
}

fn start_frame_loop(session: Rc<RefCell<Session>>) {
    let holder: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let holder_clone = holder.clone();
    *holder.borrow_mut() = Some(Closure::new(move |time: f64| {
        let outcome = session.borrow_mut().frame(time);
        match outcome {
            FrameOutcome::Continue => {
                if let Some(callback) = holder_clone.borrow().as_ref() {
                    request_frame(callback);
                }
            }
            FrameOutcome::GameOver => {
                if let Err(err) = present_game_over(&session) {
                    log::error!("Failed to present game over panel: {err:?}");
                }
            }
            FrameOutcome::Stopped => {}
        }
        // A finished chain simply never re-arms
    }));
    if let Some(callback) = holder.borrow().as_ref() {
        request_frame(callback);
    }
}

fn request_frame(callback: &Closure<dyn FnMut(f64)>) {
    if let Some(window) = web_sys::window() {
        let _ = window.request_animation_frame(callback.as_ref().unchecked_ref());
    }
}

/// Show the terminal panel and wire its restart button to a full
/// teardown-and-relaunch
fn present_game_over(session: &Rc<RefCell<Session>>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let restart_btn = {
        let s = session.borrow();
        s.overlay.show_game_over(&document, s.state.score)?
    };

    let restart = {
        let session = session.clone();
        Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| {
            close_session(&session);
            if let Err(err) = launch() {
                log::error!("Relaunch failed: {err:?}");
            }
        })
    };
    restart_btn.add_event_listener_with_callback("click", restart.as_ref().unchecked_ref())?;
    if let Some(listeners) = session.borrow_mut().listeners.as_mut() {
        listeners.restart = Some(restart);
    }
    Ok(())
}
