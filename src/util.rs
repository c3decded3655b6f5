// src/util.rs

use chrono::{Local, SecondsFormat};

/// Compact stamp plus RFC3339, e.g. `20250810_140359 (2025-08-10T14:03:59-05:00)`.
pub fn now_timestamp() -> String {
    let now = Local::now();
    let rfc3339 = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    let compact = now.format("%Y%m%d_%H%M%S").to_string();
    format!("{compact} ({rfc3339})")
}
