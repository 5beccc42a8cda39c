//! ISO-8601 duration parsing for video lengths

use regex::Regex;
use std::sync::OnceLock;

fn duration_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^P(?:(?P<weeks>[0-9]+(?:\.[0-9]+)?)W)?(?:(?P<days>[0-9]+(?:\.[0-9]+)?)D)?(?:T(?:(?P<hours>[0-9]+(?:\.[0-9]+)?)H)?(?:(?P<minutes>[0-9]+(?:\.[0-9]+)?)M)?(?:(?P<seconds>[0-9]+(?:\.[0-9]+)?)S)?)?$",
        )
        .ok()
    })
    .as_ref()
}

/// Parse an ISO-8601 duration such as `PT1M30S` or `PT59.5S` into seconds.
///
/// Supports weeks, days, hours, minutes and fractional components. Year and
/// month designators are rejected since they have no fixed length.
/// Returns `None` for anything that is not a well-formed duration.
pub fn parse_iso8601_seconds(duration: &str) -> Option<f64> {
    let duration = duration.trim();
    // A bare "P" or "PT" has no components
    if duration == "P" || duration.ends_with('T') {
        return None;
    }

    let caps = duration_regex()?.captures(duration)?;
    let component = |name: &str| -> Option<f64> {
        match caps.name(name) {
            Some(m) => m.as_str().parse::<f64>().ok(),
            None => Some(0.0),
        }
    };

    Some(
        component("weeks")? * 604_800.0
            + component("days")? * 86_400.0
            + component("hours")? * 3_600.0
            + component("minutes")? * 60.0
            + component("seconds")?,
    )
}
