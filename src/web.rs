//! Browser bindings
//!
//! The page owns the wireless transport and the render loop. It forwards
//! controller notifications and elapsed frame time here and draws from the
//! JSON snapshot.

use wasm_bindgen::prelude::*;

use crate::platform::TransportError;
use crate::settings::Settings;
use crate::sim::{FrameClock, GameSession};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Credit Rush (web) starting...");
}

/// Game instance exported to the page
#[wasm_bindgen]
pub struct GameHandle {
    session: GameSession,
    clock: FrameClock,
}

#[wasm_bindgen]
impl GameHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> GameHandle {
        let settings = Settings::load();
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        log::info!("Variant {} with seed {}", settings.variant.as_str(), seed);
        GameHandle {
            session: GameSession::new(settings.effective_rules(), seed),
            clock: FrameClock::default(),
        }
    }

    pub fn start(&mut self) {
        self.clock.reset();
        self.session.start();
    }

    pub fn stop(&mut self) {
        self.clock.reset();
        self.session.stop();
    }

    /// Forward one characteristic notification; returns an error message for
    /// malformed packets
    pub fn on_packet(&mut self, bytes: &[u8]) -> Option<String> {
        self.session.on_packet(bytes).err().map(|e| e.to_string())
    }

    pub fn on_connected(&mut self, device_name: &str) {
        self.session.on_connected(device_name);
    }

    pub fn on_disconnected(&mut self) {
        self.session.on_disconnected();
    }

    /// Map a transport failure to "message\n\nguidance" text
    pub fn describe_transport_error(name: &str, message: &str) -> String {
        let err = TransportError::from_name(name, message);
        format!("{}\n\n{}", err, err.guidance())
    }

    /// Advance by the real time elapsed since the previous frame
    pub fn frame(&mut self, elapsed_ms: f64) {
        let ms = self.clock.step(elapsed_ms);
        self.session.advance(ms);
    }

    /// Current session snapshot as JSON
    pub fn view_json(&self) -> String {
        serde_json::to_string(&self.session.view()).unwrap_or_else(|err| {
            log::warn!("Failed to serialize view: {err}");
            String::from("{}")
        })
    }
}

impl Default for GameHandle {
    fn default() -> Self {
        Self::new()
    }
}
