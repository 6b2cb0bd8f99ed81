//! Device-side wiring: settings, push token and notification taps.

mod context;
mod settings;

pub use context::{DeviceContext, PUSH_TOKEN_KEY};
pub use settings::{load_settings, save_settings, AppSettings, SETTINGS_KEY};
