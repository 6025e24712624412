//! Probeview Viewer - Bevy host for the sensor marker viewer
//!
//! Sets up the scene, loads the vehicle model, and turns window input into
//! session events. Runs natively (see `main.rs`) or in the browser.

mod app;
mod input;
mod markers;
mod overlay;
mod scene;

pub use app::run;

use probeview_core::ViewerConfig;

/// Configuration bundled with the web build
const EMBEDDED_CONFIG: &str = include_str!("../assets/probeview.toml");

/// Parse the bundled configuration, falling back to the built-in catalog
pub fn embedded_config() -> ViewerConfig {
    match ViewerConfig::from_toml_str(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Bundled configuration invalid, using defaults");
            ViewerConfig::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::prelude::*;

    /// WASM entry point
    #[wasm_bindgen(start)]
    pub fn main() {
        console_error_panic_hook::set_once();

        tracing_wasm::set_as_global_default_with_config(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(tracing::Level::INFO)
                .build(),
        );

        super::run(super::embedded_config());
    }
}
