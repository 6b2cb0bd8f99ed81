use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BRACKETED_TOKEN: Regex =
        Regex::new(r"^(?:ExponentPushToken|ExpoPushToken)\[.+\]$").unwrap();
    static ref UUID_TOKEN: Regex =
        Regex::new(r"(?i)^[a-z\d]{8}-[a-z\d]{4}-[a-z\d]{4}-[a-z\d]{4}-[a-z\d]{12}$").unwrap();
}

/// Whether `token` looks like an address the Expo push service accepts.
pub fn is_expo_push_token(token: &str) -> bool {
    BRACKETED_TOKEN.is_match(token) || UUID_TOKEN.is_match(token)
}
