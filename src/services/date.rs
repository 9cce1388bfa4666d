//! Heuristic end-date parsing
//!
//! Feeds mix explicit calendar dates (`2026/2/2 13:59`, `2026-03-01`) with
//! year-less Chinese notation (`1月14日`, `1月14日 23:00`). Parsing tries, in
//! order: a direct calendar parse when the text carries a 4-digit run, the
//! `M月D日` form completed with the configured reference year, then a small
//! set of generic formats. Anything else is unknown (`None`).
//!
//! All naive values are taken as UTC wall-clock time. Year-less dates are
//! only correct for records that fall in the reference year.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;

/// Calendar formats with an explicit year, datetime variants first
const CALENDAR_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
    "%Y年%m月%d日 %H:%M:%S",
    "%Y年%m月%d日 %H:%M",
    "%Y年%m月%d日%H:%M",
];

const CALENDAR_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y年%m月%d日"];

/// Last-resort formats
const GENERIC_DATETIME_FORMATS: &[&str] = &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"];

/// Two-digit-year form precedes `%Y`, which would otherwise read "26" as year 26
const GENERIC_DATE_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

fn four_digit_re() -> &'static Regex {
    static FOUR_DIGIT_RE: OnceLock<Regex> = OnceLock::new();
    FOUR_DIGIT_RE.get_or_init(|| Regex::new(r"\d{4}").expect("valid 4-digit regex"))
}

fn month_day_re() -> &'static Regex {
    static MONTH_DAY_RE: OnceLock<Regex> = OnceLock::new();
    MONTH_DAY_RE.get_or_init(|| {
        Regex::new(r"(\d{1,2})\s*月\s*(\d{1,2})\s*日(?:\s*(\d{1,2}):(\d{1,2}))?")
            .expect("valid month-day regex")
    })
}

/// End-date parser bound to one reference year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParser {
    reference_year: i32,
}

impl DateParser {
    pub fn new(reference_year: i32) -> Self {
        Self { reference_year }
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Parse an end-date string; `None` means unknown.
    pub fn parse(&self, raw: Option<&str>) -> Option<DateTime<Utc>> {
        let s = raw?.trim();
        if s.is_empty() {
            return None;
        }

        if four_digit_re().is_match(s) {
            if let Some(dt) = parse_calendar(s) {
                return Some(dt);
            }
        }

        if let Some(dt) = self.parse_month_day(s) {
            return Some(dt);
        }

        parse_generic(s)
    }

    /// `M月D日` with optional `HH:MM`, completed with the reference year.
    /// A time that is not two digits on both sides (`9:5`) makes the value
    /// unknown rather than falling back to midnight.
    fn parse_month_day(&self, s: &str) -> Option<DateTime<Utc>> {
        let caps = month_day_re().captures(s)?;
        let month: u32 = caps.get(1)?.as_str().parse().ok()?;
        let day: u32 = caps.get(2)?.as_str().parse().ok()?;
        let time = match (caps.get(3), caps.get(4)) {
            (Some(h), Some(m)) => {
                if h.as_str().len() != 2 || m.as_str().len() != 2 {
                    return None;
                }
                NaiveTime::from_hms_opt(h.as_str().parse().ok()?, m.as_str().parse().ok()?, 0)?
            }
            _ => NaiveTime::MIN,
        };
        let date = NaiveDate::from_ymd_opt(self.reference_year, month, day)?;
        Some(Utc.from_utc_datetime(&date.and_time(time)))
    }
}

fn parse_with(s: &str, datetime_formats: &[&str], date_formats: &[&str]) -> Option<DateTime<Utc>> {
    for fmt in datetime_formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for fmt in date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
        }
    }
    None
}

fn parse_calendar(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    parse_with(s, CALENDAR_DATETIME_FORMATS, CALENDAR_DATE_FORMATS)
}

fn parse_generic(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    parse_with(s, GENERIC_DATETIME_FORMATS, GENERIC_DATE_FORMATS)
}
