//! Typesetting renderer switch.
//!
//! Forces the math typesetter onto one output backend, as early as possible
//! and whether or not the typesetter has loaded yet:
//!
//! 1. persist the choice in the preference cookie the typesetter reads at startup
//! 2. decorate its configuration entry point (or stub it) so every later
//!    configuration carries the backend
//! 3. if it is already running, queue a live switch and a full re-render
//!    after a short delay
//!
//! Each step is independent; a failing step is logged and the others still run.

mod cookie;
mod host;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::task::JoinHandle;

use crate::config::Settings;
use crate::core::TypesetError;

pub use cookie::{Cookie, CookieJar, MemoryCookieJar, PREFERENCE_COOKIE};
pub use host::{ConfigDecorator, ConfigFn, MathCommand, MathHost, MathHub};

/// Configuration section holding the renderer choice.
const MENU_SETTINGS: &str = "menuSettings";
const RENDERER_FIELD: &str = "renderer";

/// Outcome of [`force_renderer`]
#[derive(Debug, Default)]
pub struct RendererSwitch {
    /// Steps that failed (already logged).
    pub failures: Vec<TypesetError>,
    /// Delayed live switch, present when the typesetter was already running.
    pub live: Option<JoinHandle<()>>,
}

/// Force `backend` as the typesetter's renderer. See the module docs.
///
/// Must be called inside a tokio runtime (step 3 spawns a timer task).
pub fn force_renderer(
    backend: &str,
    host: &Arc<dyn MathHost>,
    cookies: &dyn CookieJar,
    settings: &Settings,
) -> RendererSwitch {
    let mut switch = RendererSwitch::default();

    let cookie = Cookie::renderer_preference(backend, settings.cookie_max_age_secs);
    if let Err(e) = cookies.set(&cookie) {
        crate::warn!("math"; "could not persist renderer preference: {}", e);
        switch.failures.push(e);
    }

    let decorator = renderer_override(backend);
    let installed = if host.has_config_entry_point() {
        host.wrap_config_entry_point(decorator)
    } else {
        crate::debug!("math"; "configuration entry point not defined yet, installing stub");
        host.install_config_stub(decorator)
    };
    if let Err(e) = installed {
        crate::warn!("math"; "could not install renderer override: {}", e);
        switch.failures.push(e);
    }

    if host.has_active_queue() {
        switch.live = Some(tokio::spawn(rerender_live(
            host.clone(),
            backend.to_string(),
            settings.renderer_delay(),
        )));
    }

    crate::log!("math"; "renderer forced to {}", backend);
    switch
}

/// Decorator that forces the renderer field, then delegates.
pub fn renderer_override(backend: &str) -> ConfigDecorator {
    let backend = backend.to_string();
    Arc::new(move |next: ConfigFn| -> ConfigFn {
        let backend = backend.clone();
        Arc::new(move |mut config: Value| {
            force_renderer_field(&mut config, &backend);
            next(config)
        })
    })
}

/// Set `menuSettings.renderer` in a configuration object, creating the
/// section (or the object) when missing.
pub fn force_renderer_field(config: &mut Value, backend: &str) {
    if !config.is_object() {
        *config = Value::Object(Map::new());
    }
    let menu = &mut config[MENU_SETTINGS];
    if !menu.is_object() {
        *menu = Value::Object(Map::new());
    }
    menu[RENDERER_FIELD] = Value::String(backend.to_string());
}

/// Queue the live switch once the typesetter's own startup has had time to settle.
async fn rerender_live(host: Arc<dyn MathHost>, backend: String, delay: Duration) {
    tokio::time::sleep(delay).await;

    if !host.has_active_queue() {
        crate::warn!("math"; "command queue went away, skipping live re-render");
        return;
    }

    let queued = host
        .enqueue_command(MathCommand::SetRenderer(backend))
        .and_then(|()| host.enqueue_command(MathCommand::Rerender));
    match queued {
        Ok(()) => crate::debug!("math"; "queued live renderer switch and re-render"),
        Err(e) => crate::warn!("math"; "live re-render failed: {}", e),
    }
}
