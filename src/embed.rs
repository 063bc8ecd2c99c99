//! Deferred loader for the third-party scheduling embed
//!
//! Containers declare themselves with `data-embed` attributes. The widget
//! script is fetched exactly once process-wide, on the first container to
//! become visible or be interacted with; later containers reuse the same
//! in-flight promise. Each container then gets its own named embed
//! instance, and tracks a small load state machine so nothing initializes
//! twice.

/// Per-container load state, recorded on the element itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
    Error,
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::NotLoaded => "not-loaded",
            LoadState::Loading => "loading",
            LoadState::Loaded => "loaded",
            LoadState::Error => "error",
        }
    }

    /// Missing or unknown attribute values count as not loaded
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("loading") => LoadState::Loading,
            Some("loaded") => LoadState::Loaded,
            Some("error") => LoadState::Error,
            _ => LoadState::NotLoaded,
        }
    }
}

/// Declared configuration for one embed container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedConfig {
    /// Id of the element the widget renders into
    pub target_id: String,
    /// Booking link identifier passed to the widget
    pub link: String,
    pub namespace: String,
    pub layout: String,
}

impl EmbedConfig {
    /// Target and link are required; namespace and layout have defaults
    pub fn from_attrs(
        target: Option<String>,
        link: Option<String>,
        namespace: Option<String>,
        layout: Option<String>,
    ) -> Option<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        Some(Self {
            target_id: non_empty(target)?,
            link: non_empty(link)?,
            namespace: non_empty(namespace).unwrap_or_else(|| "meet".to_string()),
            layout: non_empty(layout).unwrap_or_else(|| "month_view".to_string()),
        })
    }
}

#[cfg(target_arch = "wasm32")]
pub use wiring::init_embeds;

#[cfg(target_arch = "wasm32")]
mod wiring {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        Document, Element, HtmlElement, HtmlScriptElement, IntersectionObserver,
        IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent,
    };

    use super::{EmbedConfig, LoadState};

    const EMBED_SCRIPT_URL: &str = "https://app.cal.com/embed/embed.js";
    const EMBED_ORIGIN: &str = "https://app.cal.com";
    /// Global the widget script installs on `window`
    const EMBED_GLOBAL: &str = "Cal";
    const STATE_ATTR: &str = "data-embed-state";

    thread_local! {
        static SCRIPT_PROMISE: RefCell<Option<js_sys::Promise>> = const { RefCell::new(None) };
    }

    impl EmbedConfig {
        fn from_element(el: &Element) -> Option<Self> {
            Self::from_attrs(
                el.get_attribute("data-embed-target"),
                el.get_attribute("data-embed-link"),
                el.get_attribute("data-embed-namespace"),
                el.get_attribute("data-embed-layout"),
            )
        }
    }

    /// Wire every `[data-embed]` container on the page
    pub fn init_embeds(document: &Document) -> Result<(), JsValue> {
        let containers = document.query_selector_all("[data-embed]")?;
        if containers.length() == 0 {
            return Ok(());
        }

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let has_observer = js_sys::Reflect::has(&window, &JsValue::from_str("IntersectionObserver"))
            .unwrap_or(false);

        let observer = if has_observer {
            let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
                move |entries: js_sys::Array, observer: IntersectionObserver| {
                    for entry in entries.iter() {
                        let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                            continue;
                        };
                        if !entry.is_intersecting() {
                            continue;
                        }
                        let target = entry.target();
                        observer.unobserve(&target);
                        if let Ok(el) = target.dyn_into::<HtmlElement>() {
                            load_container(el);
                        }
                    }
                },
            );
            let options = IntersectionObserverInit::new();
            options.set_root_margin("0px 0px -20% 0px");
            let observer = IntersectionObserver::new_with_options(
                callback.as_ref().unchecked_ref(),
                &options,
            )?;
            callback.forget();
            Some(observer)
        } else {
            None
        };

        for i in 0..containers.length() {
            let Some(node) = containers.item(i) else { continue };
            let Ok(el) = node.dyn_into::<HtmlElement>() else {
                continue;
            };

            match &observer {
                Some(observer) => {
                    observer.observe(&el);
                    attach_interaction_triggers(&el)?;
                }
                // No viewport detection available: load eagerly
                None => load_container(el),
            }
        }

        Ok(())
    }

    /// Pointer or keyboard interaction loads the widget ahead of the
    /// viewport trigger; the state machine keeps this idempotent
    fn attach_interaction_triggers(el: &HtmlElement) -> Result<(), JsValue> {
        let pointer_el = el.clone();
        let pointerdown = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            load_container(pointer_el.clone());
        });
        el.add_event_listener_with_callback("pointerdown", pointerdown.as_ref().unchecked_ref())?;
        pointerdown.forget();

        let key_el = el.clone();
        let keydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            if matches!(event.key().as_str(), "Enter" | " ") {
                load_container(key_el.clone());
            }
        });
        el.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
        Ok(())
    }

    /// Advance one container through not-loaded → loading → loaded/error
    fn load_container(el: HtmlElement) {
        let state = LoadState::parse(el.get_attribute(STATE_ATTR).as_deref());
        if state != LoadState::NotLoaded {
            return;
        }
        let Some(config) = EmbedConfig::from_element(&el) else {
            log::warn!("Embed container is missing data-embed-target or data-embed-link");
            return;
        };
        let _ = el.set_attribute(STATE_ATTR, LoadState::Loading.as_str());

        wasm_bindgen_futures::spawn_local(async move {
            match JsFuture::from(ensure_script()).await {
                Ok(_) => {
                    let next = match init_instance(&config) {
                        Ok(()) => LoadState::Loaded,
                        Err(err) => {
                            log::error!("Failed to initialize scheduling embed: {err:?}");
                            LoadState::Error
                        }
                    };
                    let _ = el.set_attribute(STATE_ATTR, next.as_str());
                }
                Err(err) => {
                    log::warn!("Scheduling embed script failed to load: {err:?}");
                    let _ = el.set_attribute(STATE_ATTR, LoadState::Error.as_str());
                }
            }
        });
    }

    /// Load the widget script once; every caller shares the same promise
    fn ensure_script() -> js_sys::Promise {
        let window = web_sys::window().expect("no window");
        if js_sys::Reflect::has(&window, &JsValue::from_str(EMBED_GLOBAL)).unwrap_or(false) {
            return js_sys::Promise::resolve(&JsValue::UNDEFINED);
        }
        if let Some(promise) = SCRIPT_PROMISE.with(|p| p.borrow().clone()) {
            return promise;
        }

        let promise = js_sys::Promise::new(&mut |resolve: js_sys::Function, reject: js_sys::Function| {
            let document = web_sys::window()
                .and_then(|w| w.document())
                .expect("no document");
            let script: HtmlScriptElement = document
                .create_element("script")
                .expect("create script element")
                .dyn_into()
                .expect("not a script element");
            script.set_src(EMBED_SCRIPT_URL);
            script.set_async(true);

            let onload = Closure::<dyn FnMut()>::new(move || {
                let _ = resolve.call0(&JsValue::NULL);
            });
            script.set_onload(Some(onload.as_ref().unchecked_ref()));
            onload.forget();

            let onerror = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
                let _ = reject.call1(&JsValue::NULL, &event);
            });
            script.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            onerror.forget();

            if let Some(head) = document.head() {
                let _ = head.append_child(&script);
            }
        });

        SCRIPT_PROMISE.with(|p| *p.borrow_mut() = Some(promise.clone()));
        promise
    }

    /// Initialize one named embed instance through the widget's global API
    fn init_instance(config: &EmbedConfig) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let cal: js_sys::Function =
            js_sys::Reflect::get(&window, &JsValue::from_str(EMBED_GLOBAL))?.dyn_into()?;

        // Cal("init", namespace, { origin })
        let init_opts = js_sys::Object::new();
        js_sys::Reflect::set(
            &init_opts,
            &JsValue::from_str("origin"),
            &JsValue::from_str(EMBED_ORIGIN),
        )?;
        cal.call3(
            &JsValue::UNDEFINED,
            &JsValue::from_str("init"),
            &JsValue::from_str(&config.namespace),
            &init_opts,
        )?;

        // ns = Cal.ns[namespace]
        let ns_map = js_sys::Reflect::get(&cal, &JsValue::from_str("ns"))?;
        let ns: js_sys::Function =
            js_sys::Reflect::get(&ns_map, &JsValue::from_str(&config.namespace))?.dyn_into()?;

        // ns("inline", { elementOrSelector, config: { layout }, calLink })
        let layout_cfg = js_sys::Object::new();
        js_sys::Reflect::set(
            &layout_cfg,
            &JsValue::from_str("layout"),
            &JsValue::from_str(&config.layout),
        )?;
        let inline_opts = js_sys::Object::new();
        js_sys::Reflect::set(
            &inline_opts,
            &JsValue::from_str("elementOrSelector"),
            &JsValue::from_str(&format!("#{}", config.target_id)),
        )?;
        js_sys::Reflect::set(&inline_opts, &JsValue::from_str("config"), &layout_cfg)?;
        js_sys::Reflect::set(
            &inline_opts,
            &JsValue::from_str("calLink"),
            &JsValue::from_str(&config.link),
        )?;
        ns.call2(
            &JsValue::UNDEFINED,
            &JsValue::from_str("inline"),
            &inline_opts,
        )?;

        // ns("ui", { hideEventTypeDetails, layout })
        let ui_opts = js_sys::Object::new();
        js_sys::Reflect::set(
            &ui_opts,
            &JsValue::from_str("hideEventTypeDetails"),
            &JsValue::FALSE,
        )?;
        js_sys::Reflect::set(
            &ui_opts,
            &JsValue::from_str("layout"),
            &JsValue::from_str(&config.layout),
        )?;
        ns.call2(&JsValue::UNDEFINED, &JsValue::from_str("ui"), &ui_opts)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_state_roundtrip() {
        for state in [
            LoadState::NotLoaded,
            LoadState::Loading,
            LoadState::Loaded,
            LoadState::Error,
        ] {
            assert_eq!(LoadState::parse(Some(state.as_str())), state);
        }
    }

    #[test]
    fn test_load_state_unknown_is_not_loaded() {
        assert_eq!(LoadState::parse(None), LoadState::NotLoaded);
        assert_eq!(LoadState::parse(Some("bogus")), LoadState::NotLoaded);
        assert_eq!(LoadState::parse(Some("")), LoadState::NotLoaded);
    }

    #[test]
    fn test_config_defaults() {
        let config = EmbedConfig::from_attrs(
            Some("meet-inline".into()),
            Some("someone/intro".into()),
            None,
            None,
        )
        .unwrap();
        assert_eq!(config.namespace, "meet");
        assert_eq!(config.layout, "month_view");
    }

    #[test]
    fn test_config_requires_target_and_link() {
        assert!(EmbedConfig::from_attrs(None, Some("someone/intro".into()), None, None).is_none());
        assert!(EmbedConfig::from_attrs(Some("meet-inline".into()), None, None, None).is_none());
        assert!(
            EmbedConfig::from_attrs(Some(String::new()), Some("someone/intro".into()), None, None)
                .is_none()
        );
    }

    #[test]
    fn test_config_explicit_values_win() {
        let config = EmbedConfig::from_attrs(
            Some("book".into()),
            Some("someone/audit".into()),
            Some("audit".into()),
            Some("week_view".into()),
        )
        .unwrap();
        assert_eq!(config.namespace, "audit");
        assert_eq!(config.layout, "week_view");
    }
}
