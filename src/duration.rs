// src/duration.rs

//! Human-readable durations.
//!
//! [`format_elapsed`] renders run times for the `completed [...]` log line;
//! [`parse_duration`] reads the `timeout = "2m"` style strings from a
//! Taskfile.

use std::time::Duration;

const NANOS_PER_MILLI: u32 = 1_000_000;
const NANOS_PER_MICRO: u32 = 1_000;

/// Format an elapsed `(seconds, nanoseconds)` pair.
///
/// - under a second: `"12ms"`, `"340us"` or `"800ns"`
/// - under a minute: `"3.42s"` (3 s + 42 ms; the millisecond part is not
///   zero-padded), or `"3s"` when the millisecond part rounds to 0
/// - otherwise: `"2m5s"`
pub fn format_elapsed(seconds: u64, nanoseconds: u32) -> String {
    if seconds == 0 {
        if nanoseconds > NANOS_PER_MILLI {
            return format!("{}ms", rounded_div(nanoseconds, NANOS_PER_MILLI));
        }
        if nanoseconds > NANOS_PER_MICRO {
            return format!("{}us", rounded_div(nanoseconds, NANOS_PER_MICRO));
        }
        return format!("{nanoseconds}ns");
    }

    if seconds < 60 {
        let millis = rounded_div(nanoseconds, NANOS_PER_MILLI).min(999);
        return if millis > 0 {
            format!("{seconds}.{millis}s")
        } else {
            format!("{seconds}s")
        };
    }

    format!("{}m{}s", seconds / 60, seconds % 60)
}

/// Convenience wrapper over [`format_elapsed`].
pub fn format_duration(elapsed: Duration) -> String {
    format_elapsed(elapsed.as_secs(), elapsed.subsec_nanos())
}

fn rounded_div(value: u32, divisor: u32) -> u32 {
    (value + divisor / 2) / divisor
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}
