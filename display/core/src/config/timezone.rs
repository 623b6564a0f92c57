//! System timezone detection
//!
//! The backend formats nothing; it only needs the display's IANA timezone id
//! in the request path. Detection order: `TZ`, the `/etc/localtime` link,
//! `/etc/timezone`, then `UTC`.

use std::path::Path;

/// Fallback when nothing else is found
pub const FALLBACK_TIMEZONE: &str = "UTC";

const LOCALTIME_LINK: &str = "/etc/localtime";
const TIMEZONE_FILE: &str = "/etc/timezone";

/// Detect the system's IANA timezone id
#[must_use]
pub fn system_timezone_id() -> String {
    detect(
        std::env::var("TZ").ok().as_deref(),
        Path::new(LOCALTIME_LINK),
        Path::new(TIMEZONE_FILE),
    )
}

fn detect(tz_var: Option<&str>, localtime: &Path, timezone_file: &Path) -> String {
    if let Some(id) = tz_var.and_then(from_tz_var) {
        return id;
    }

    if let Some(id) = std::fs::read_link(localtime)
        .ok()
        .and_then(|target| from_zoneinfo_path(&target.to_string_lossy()))
    {
        return id;
    }

    if let Some(id) = std::fs::read_to_string(timezone_file)
        .ok()
        .map(|content| content.trim().to_string())
        .filter(|id| !id.is_empty())
    {
        return id;
    }

    tracing::debug!("No system timezone found, using {FALLBACK_TIMEZONE}");
    FALLBACK_TIMEZONE.to_string()
}

/// `TZ` may carry a leading `:` (POSIX) or a full zoneinfo path
fn from_tz_var(value: &str) -> Option<String> {
    let value = value.trim().trim_start_matches(':');
    if value.is_empty() {
        return None;
    }
    from_zoneinfo_path(value).or_else(|| Some(value.to_string()))
}

fn from_zoneinfo_path(path: &str) -> Option<String> {
    path.split_once("zoneinfo/")
        .map(|(_, id)| id.to_string())
        .filter(|id| !id.is_empty())
}

/// Make a timezone id safe for a single URL path segment
///
/// `Europe/Berlin` becomes `Europe&Berlin`; the backend reverses this.
#[must_use]
pub fn url_safe_timezone(id: &str) -> String {
    id.replace('/', "&")
}
