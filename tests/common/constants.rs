//! Shared constants for end-to-end tests

/// Maximum time to wait for a spawned server to accept requests
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness probes
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Per-request timeout for the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Timeout the relay uses when talking to the fake push service
pub const PUSH_TIMEOUT_SECS: u64 = 5;

/// Path the fake push service listens on, mirroring the Expo API
pub const PUSH_SEND_PATH: &str = "/--/api/v2/push/send";

pub const DEVICE_TOKEN_1: &str = "ExponentPushToken[device-one]";
pub const DEVICE_TOKEN_2: &str = "ExpoPushToken[device-two]";
pub const DEVICE_TOKEN_UUID: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";
