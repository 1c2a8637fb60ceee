//! ID generation utilities.

use uuid::Uuid;

/// Generate a new UUID v4.
pub fn uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a short random ID (8 hex characters).
pub fn short_id() -> String {
    let bytes: [u8; 4] = rand::random();
    hex::encode(bytes)
}

/// Generate a timestamp-prefixed ID that sorts by creation time.
pub fn timestamp_id() -> String {
    use chrono::Utc;
    let ts = Utc::now().format("%Y%m%d%H%M%S%3f").to_string();
    format!("{}-{}", ts, short_id())
}
