use chrono::{Datelike, NaiveDate, Utc};

use almanac_common::text::{to_iso, MONTHS_FULL};
use almanac_common::AlmanacError;

pub const DEFAULT_TARGET_TOTAL: u32 = 25;
pub const MIN_TARGET_TOTAL: u32 = 10;
pub const MAX_TARGET_TOTAL: u32 = 30;

/// Canonical calendar key for one curation run. Everything downstream
/// of normalization assumes a valid (mm, dd) pair.
#[derive(Debug, Clone)]
pub struct DateKey {
    /// The YYYY-MM-DD actually curated.
    pub date: String,
    /// Zero-padded month.
    pub mm: String,
    /// Zero-padded day.
    pub dd: String,
    /// Human-readable "Month Day" label, e.g. "August 15".
    pub readable: String,
}

/// Resolve the input date (defaulting to today, UTC) and clamp the
/// requested result count. The only validation boundary in the
/// pipeline.
pub fn normalize(
    date: Option<&str>,
    limit: Option<u32>,
) -> Result<(DateKey, usize), AlmanacError> {
    let limit = limit
        .unwrap_or(DEFAULT_TARGET_TOTAL)
        .clamp(MIN_TARGET_TOTAL, MAX_TARGET_TOTAL) as usize;

    let day = match date {
        Some(s) => parse_iso_date(s)?,
        None => Utc::now().date_naive(),
    };

    let key = DateKey {
        date: to_iso(day.year(), day.month(), day.day()),
        mm: format!("{:02}", day.month()),
        dd: format!("{:02}", day.day()),
        readable: format!("{} {}", MONTHS_FULL[day.month0() as usize], day.day()),
    };

    Ok((key, limit))
}

fn parse_iso_date(s: &str) -> Result<NaiveDate, AlmanacError> {
    if !is_iso_shape(s) {
        return Err(AlmanacError::InvalidDate(format!(
            "date must be YYYY-MM-DD, got {s:?}"
        )));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AlmanacError::InvalidDate(format!("not a calendar date: {s}")))
}

fn is_iso_shape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && [0, 1, 2, 3, 5, 6, 8, 9]
            .iter()
            .all(|&i| b[i].is_ascii_digit())
}
