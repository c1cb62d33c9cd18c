//! Identifier and timestamp helpers.
//!
//! Generated ids are probabilistic: nothing checks them for collisions.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random base-36 digits appended to a generated id.
const ID_RANDOM_DIGITS: usize = 10;

/// Returns the current time as an ISO-8601 UTC string with milliseconds.
#[must_use]
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Returns today's date as `YYYY-MM-DD`.
#[must_use]
pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Generates a record id: base-36 epoch milliseconds then random base-36 digits.
#[must_use]
pub fn generate_id() -> String {
    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    let mut id = to_base36(millis);
    let mut rng = rand::thread_rng();
    for _ in 0..ID_RANDOM_DIGITS {
        id.push(char::from(BASE36[rng.gen_range(0..36)]));
    }
    id
}

/// Generates a college id: `IC`, the current year, then a 4-digit random serial.
///
/// Serials are drawn from 0..=9999, so two students in the same year can
/// receive the same id.
#[must_use]
pub fn generate_college_id() -> String {
    let serial: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("IC{}{serial:04}", Utc::now().year())
}

/// Parses an RFC 3339 timestamp, a naive `YYYY-MM-DDTHH:MM:SS[.fff]`
/// (taken as UTC), or a bare `YYYY-MM-DD` (midnight UTC).
#[must_use]
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn id_shape() {
        let id = generate_id();
        assert!(id.len() > ID_RANDOM_DIGITS);
        assert!(id.bytes().all(|b| BASE36.contains(&b)));
        assert_ne!(generate_id(), id);
    }

    #[test]
    fn college_id_shape() {
        let id = generate_college_id();
        let year = Utc::now().year().to_string();
        assert_eq!(id.len(), 10);
        assert!(id.starts_with(&format!("IC{year}")));
        assert!(id[6..].bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn now_iso_parses_back() {
        let now = now_iso();
        assert!(now.ends_with('Z'));
        assert!(parse_timestamp(&now).is_some());
    }

    #[test]
    fn timestamp_formats() {
        let midnight = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(midnight, parse_timestamp("2024-03-01T00:00:00.000Z").unwrap());
        assert_eq!(midnight, parse_timestamp("2024-03-01T00:00:00").unwrap());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
