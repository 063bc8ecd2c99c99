//! Overlay DOM for the arcade session
//!
//! Builds the full-screen overlay, the card with canvas and HUD, and the
//! terminal game-over panel. Everything is styled inline so the host page
//! needs no extra stylesheet.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement};

use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH, STARTING_LIVES};

/// Element id of the overlay root; doubles as the "session visible" marker
pub const OVERLAY_ID: &str = "starshot-overlay";

pub struct Overlay {
    pub root: HtmlElement,
    pub card: HtmlElement,
    pub canvas: HtmlCanvasElement,
    pub close_btn: HtmlElement,
    score_el: Element,
    lives_el: Element,
}

fn styled(document: &Document, tag: &str, styles: &[(&str, &str)]) -> Result<HtmlElement, JsValue> {
    let el: HtmlElement = document.create_element(tag)?.dyn_into()?;
    let css = el.style();
    for (name, value) in styles {
        css.set_property(name, value)?;
    }
    Ok(el)
}

impl Overlay {
    pub fn is_present(document: &Document) -> bool {
        document.get_element_by_id(OVERLAY_ID).is_some()
    }

    /// Create the overlay and append it to the document body
    pub fn build(document: &Document) -> Result<Overlay, JsValue> {
        let root = styled(
            document,
            "div",
            &[
                ("position", "fixed"),
                ("inset", "0"),
                ("background", "rgba(10,12,28,0.82)"),
                ("backdrop-filter", "blur(8px)"),
                ("display", "flex"),
                ("align-items", "center"),
                ("justify-content", "center"),
                ("z-index", "9999"),
            ],
        )?;
        root.set_id(OVERLAY_ID);

        let card = styled(
            document,
            "div",
            &[
                ("position", "relative"),
                ("background", "rgba(12,15,32,0.92)"),
                ("border", "1px solid rgba(148,163,184,0.18)"),
                ("border-radius", "20px"),
                ("box-shadow", "0 25px 80px rgba(5,8,20,0.55)"),
                ("padding", "26px"),
            ],
        )?;

        let close_btn = styled(
            document,
            "button",
            &[
                ("position", "absolute"),
                ("top", "12px"),
                ("right", "14px"),
                ("background", "rgba(148,163,184,0.15)"),
                ("border", "1px solid rgba(148,163,184,0.2)"),
                ("color", "#e2e8f0"),
                ("width", "32px"),
                ("height", "32px"),
                ("border-radius", "50%"),
                ("cursor", "pointer"),
            ],
        )?;
        close_btn.set_text_content(Some("✕"));
        close_btn.set_attribute("aria-label", "Close game")?;

        let heading = styled(
            document,
            "div",
            &[
                ("display", "flex"),
                ("justify-content", "space-between"),
                ("align-items", "center"),
                ("gap", "24px"),
                ("margin-bottom", "12px"),
                ("color", "#cbd5f5"),
                ("font-family", "monospace"),
                ("font-size", "14px"),
            ],
        )?;
        let title = document.create_element("span")?;
        title.set_text_content(Some("starshot :: prototype"));
        let hint = document.create_element("span")?;
        hint.set_text_content(Some("← / → move · space / click shoot"));
        heading.append_child(&title)?;
        heading.append_child(&hint)?;

        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        canvas.set_width(FIELD_WIDTH as u32);
        canvas.set_height(FIELD_HEIGHT as u32);
        {
            let css = canvas.style();
            css.set_property("border-radius", "16px")?;
            css.set_property("border", "1px solid rgba(148,163,184,0.18)")?;
            css.set_property(
                "background",
                "radial-gradient(circle at top, rgba(30,39,77,0.85), rgba(8,11,26,0.98))",
            )?;
        }

        let hud = styled(
            document,
            "div",
            &[
                ("display", "flex"),
                ("justify-content", "space-between"),
                ("margin-top", "12px"),
                ("font-family", "monospace"),
                ("font-size", "13px"),
                ("color", "#94a3b8"),
            ],
        )?;
        let score_el = document.create_element("span")?;
        let lives_el = document.create_element("span")?;
        hud.append_child(&score_el)?;
        hud.append_child(&lives_el)?;

        card.append_child(&close_btn)?;
        card.append_child(&heading)?;
        card.append_child(&canvas)?;
        card.append_child(&hud)?;
        root.append_child(&card)?;

        let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;
        body.append_child(&root)?;

        Ok(Overlay {
            root,
            card,
            canvas,
            close_btn,
            score_el,
            lives_el,
        })
    }

    pub fn update_hud(&self, score: u32, lives: i32) {
        self.score_el
            .set_text_content(Some(&format!("score: {score}")));
        let full = lives.clamp(0, STARTING_LIVES) as usize;
        let empty = STARTING_LIVES as usize - full;
        let hearts = "♥".repeat(full) + &"♡".repeat(empty);
        self.lives_el
            .set_text_content(Some(&format!("lives: {hearts}")));
    }

    /// Swap in the terminal panel. Returns the restart button so the
    /// harness can wire it up.
    pub fn show_game_over(
        &self,
        document: &Document,
        score: u32,
    ) -> Result<HtmlElement, JsValue> {
        let panel = styled(
            document,
            "div",
            &[
                ("position", "absolute"),
                ("inset", "0"),
                ("display", "flex"),
                ("flex-direction", "column"),
                ("align-items", "center"),
                ("justify-content", "center"),
                ("background", "rgba(8,10,20,0.88)"),
                ("border-radius", "18px"),
                ("font-family", "monospace"),
                ("color", "#e2e8f0"),
            ],
        )?;

        let headline = styled(
            document,
            "div",
            &[
                ("text-transform", "uppercase"),
                ("letter-spacing", "2px"),
                ("font-size", "18px"),
                ("margin-bottom", "14px"),
            ],
        )?;
        headline.set_text_content(Some("mission terminated"));

        let final_score = styled(document, "div", &[("margin-bottom", "14px")])?;
        final_score.set_text_content(Some(&format!("final score: {score}")));

        let restart = styled(
            document,
            "button",
            &[
                ("padding", "10px 20px"),
                ("border-radius", "999px"),
                ("border", "none"),
                ("cursor", "pointer"),
                ("background", "rgba(56,189,248,0.18)"),
                ("color", "#f8fafc"),
                ("font-family", "inherit"),
            ],
        )?;
        restart.set_text_content(Some("play again"));

        panel.append_child(&headline)?;
        panel.append_child(&final_score)?;
        panel.append_child(&restart)?;
        self.card.append_child(&panel)?;

        Ok(restart)
    }

    /// Detach the overlay from the document
    pub fn remove(&self) {
        self.root.remove();
    }
}
