//! Starshot entry point
//!
//! On wasm32 the start hook wires the page: arcade launch triggers and the
//! deferred scheduling embeds. On native it serves the contact form API.

#[cfg(target_arch = "wasm32")]
mod wasm_page {
    use wasm_bindgen::prelude::*;
    use web_sys::MouseEvent;

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Any element marked as a launch trigger opens the arcade overlay;
        // launching is idempotent so several triggers are fine
        let triggers = document.query_selector_all("[data-arcade-launch]")?;
        for i in 0..triggers.length() {
            let Some(node) = triggers.item(i) else { continue };
            let Ok(el) = node.dyn_into::<web_sys::Element>() else {
                continue;
            };
            let closure = Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| {
                if let Err(err) = starshot::game::launch() {
                    log::error!("Arcade launch failed: {err:?}");
                }
            });
            el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        starshot::embed::init_embeds(&document)?;

        log::info!("Starshot page wiring ready");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(err) = wasm_page::run() {
        log::error!("Page init failed: {err:?}");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    starshot::contact::serve().await
}
