//! Date handling for shipment milestones
//!
//! Every date column of the "Base" sheet is read into a [`DateCell`], so a bad
//! value degrades to "absent" at the field level instead of failing the row.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::Serialize;

/// Canonical calendar order of the month labels used in the `Mês Nota` column.
pub const MONTHS_PT: [&str; 12] = [
    "JANEIRO", "FEVEREIRO", "MARÇO", "ABRIL", "MAIO", "JUNHO",
    "JULHO", "AGOSTO", "SETEMBRO", "OUTUBRO", "NOVEMBRO", "DEZEMBRO",
];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Excel serial day 0 (the 1900 leap-year bug is already folded in).
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);
/// 9999-12-31, the largest serial Excel will store.
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

/// A date column value as read from the sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DateCell {
    #[default]
    Missing,
    Parsed(NaiveDateTime),
    /// Non-empty text that is not a date; kept verbatim for detail display.
    Unparseable(String),
}

impl DateCell {
    /// Interpret free text. Blank strings and the `N/A`/`NaT` sentinels count as missing.
    pub fn from_text(raw: &str) -> Self {
        let text = raw.trim();
        if text.is_empty() || matches!(text, "N/A" | "NaT" | "nan" | "None") {
            return DateCell::Missing;
        }

        match parse_date_text(text) {
            Some(dt) => DateCell::Parsed(dt),
            None => DateCell::Unparseable(text.to_string()),
        }
    }

    /// Interpret a numeric cell as an Excel serial date.
    pub fn from_excel_serial(serial: f64) -> Self {
        match excel_serial_to_datetime(serial) {
            Some(dt) => DateCell::Parsed(dt),
            None => DateCell::Unparseable(serial.to_string()),
        }
    }

    pub fn parsed(&self) -> Option<NaiveDateTime> {
        match self {
            DateCell::Parsed(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Calendar date with the time of day dropped.
    pub fn date(&self) -> Option<NaiveDate> {
        self.parsed().map(|dt| dt.date())
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, DateCell::Parsed(_))
    }

    /// `dd/mm/yyyy`, used on timeline stages. Absent unless the value parsed.
    pub fn timeline_format(&self) -> Option<String> {
        self.parsed().map(|dt| dt.format("%d/%m/%Y").to_string())
    }

    /// `dd-mm-yyyy`, used in tables and the invoice detail card.
    /// Missing values print as `N/A`; unparseable text is echoed back.
    pub fn detail_format(&self) -> String {
        match self {
            DateCell::Missing => "N/A".to_string(),
            DateCell::Parsed(dt) => dt.format("%d-%m-%Y").to_string(),
            DateCell::Unparseable(raw) => raw.clone(),
        }
    }
}

impl From<NaiveDate> for DateCell {
    fn from(date: NaiveDate) -> Self {
        DateCell::Parsed(date.and_time(NaiveTime::MIN))
    }
}

impl From<Option<NaiveDate>> for DateCell {
    fn from(date: Option<NaiveDate>) -> Self {
        date.map(DateCell::from).unwrap_or_default()
    }
}

/// Parse ISO dates first, then the day-first forms used in Brazilian exports.
pub fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial > EXCEL_MAX_SERIAL {
        return None;
    }

    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?.and_time(NaiveTime::MIN);
    let days = serial.floor();
    let seconds = ((serial - days) * 86_400.0).round() as i64;

    Some(epoch + Duration::days(days as i64) + Duration::seconds(seconds))
}

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Weekdays (Mon-Fri) in the inclusive range `[start, end]`; zero when `start > end`.
pub fn weekdays_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    if start > end {
        return 0;
    }

    let span = (end - start).num_days() + 1;
    let full_weeks = span / 7;
    let mut count = full_weeks * 5;

    let mut day = start + Duration::days(full_weeks * 7);
    while day <= end {
        if is_business_day(day) {
            count += 1;
        }
        day += Duration::days(1);
    }

    count
}

/// Business-day steps between two dates: weekdays touched by `[start, end]` minus one.
///
/// Friday to the following Monday is one step, a date to itself is zero, and an
/// inverted range gives `-1`. No holiday calendar is applied.
pub fn business_day_steps(start: NaiveDate, end: NaiveDate) -> i64 {
    weekdays_inclusive(start, end) - 1
}

/// [`business_day_steps`] over two sheet cells; unset if either side did not parse.
pub fn business_days_between(start: &DateCell, end: &DateCell) -> Option<i64> {
    Some(business_day_steps(start.date()?, end.date()?))
}

/// Whole elapsed days from `start` to `end`, floored (times of day count).
pub fn calendar_days(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    end.signed_duration_since(start).num_milliseconds().div_euclid(86_400_000)
}

pub fn calendar_days_between(start: &DateCell, end: &DateCell) -> Option<i64> {
    Some(calendar_days(start.parsed()?, end.parsed()?))
}

/// Restrict a month-keyed aggregate to the months present and put them in
/// January..December order. Absent months are not zero-filled.
pub fn order_months<V: Clone>(counts: &[(String, V)]) -> Vec<(String, V)> {
    MONTHS_PT
        .iter()
        .filter_map(|month| {
            counts
                .iter()
                .find(|(label, _)| label == month)
                .map(|(label, value)| (label.clone(), value.clone()))
        })
        .collect()
}

/// Uppercase Portuguese label for a 1-based month number.
pub fn month_label(month: u32) -> Option<&'static str> {
    MONTHS_PT.get(month.checked_sub(1)? as usize).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_friday_to_monday_is_one_step() {
        // 2024-01-19 is a Friday
        assert_eq!(business_day_steps(d(2024, 1, 19), d(2024, 1, 22)), 1);
    }

    #[test]
    fn test_same_day_is_zero_steps() {
        assert_eq!(business_day_steps(d(2024, 1, 10), d(2024, 1, 10)), 0);
    }

    #[test]
    fn test_inverted_range_is_minus_one() {
        assert_eq!(business_day_steps(d(2024, 1, 19), d(2024, 1, 10)), -1);
    }

    #[test]
    fn test_business_days_over_several_weeks() {
        // Wed 10th .. Fri 19th touches 8 weekdays
        assert_eq!(business_day_steps(d(2024, 1, 10), d(2024, 1, 19)), 7);
        // Mon 1st .. Wed 31st of January 2024: 23 weekdays
        assert_eq!(weekdays_inclusive(d(2024, 1, 1), d(2024, 1, 31)), 23);
    }

    #[test]
    fn test_business_days_unset_when_either_side_missing() {
        let start = DateCell::from(d(2024, 1, 10));
        assert_eq!(business_days_between(&start, &DateCell::Missing), None);
        assert_eq!(
            business_days_between(&DateCell::from_text("not a date"), &start),
            None
        );
    }

    #[test]
    fn test_calendar_days_floor_with_times() {
        let start = NaiveDateTime::parse_from_str("2024-01-10 15:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let end = NaiveDateTime::parse_from_str("2024-01-12 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(calendar_days(start, end), 1);
        assert_eq!(calendar_days(end, start), -2);

        let later = start + chrono::Duration::milliseconds(500);
        assert_eq!(calendar_days(later, start), -1);
        assert_eq!(calendar_days(start, later), 0);
    }

    #[test]
    fn test_parse_text_formats() {
        assert_eq!(DateCell::from_text("2024-01-10").date(), Some(d(2024, 1, 10)));
        assert_eq!(DateCell::from_text("10/01/2024").date(), Some(d(2024, 1, 10)));
        assert_eq!(DateCell::from_text("2024-01-10 08:30:00").date(), Some(d(2024, 1, 10)));
        assert_eq!(DateCell::from_text("  "), DateCell::Missing);
        assert_eq!(DateCell::from_text("N/A"), DateCell::Missing);
        assert_eq!(
            DateCell::from_text("aguardando"),
            DateCell::Unparseable("aguardando".to_string())
        );
    }

    #[test]
    fn test_excel_serial() {
        // 45301 = 2024-01-10
        assert_eq!(DateCell::from_excel_serial(45301.0).date(), Some(d(2024, 1, 10)));
        assert!(!DateCell::from_excel_serial(-3.0).is_parsed());
    }

    #[test]
    fn test_display_formats() {
        let cell = DateCell::from(d(2024, 1, 5));
        assert_eq!(cell.timeline_format().as_deref(), Some("05/01/2024"));
        assert_eq!(cell.detail_format(), "05-01-2024");
        assert_eq!(DateCell::Missing.detail_format(), "N/A");
        assert_eq!(DateCell::Missing.timeline_format(), None);
        assert_eq!(DateCell::Unparseable("xx".into()).detail_format(), "xx");
        assert_eq!(DateCell::Unparseable("xx".into()).timeline_format(), None);
    }

    #[test]
    fn test_order_months_drops_absent_and_is_idempotent() {
        let counts = vec![
            ("MARÇO".to_string(), 4),
            ("JANEIRO".to_string(), 7),
            ("DEZEMBRO".to_string(), 1),
        ];
        let ordered = order_months(&counts);
        assert_eq!(
            ordered,
            vec![
                ("JANEIRO".to_string(), 7),
                ("MARÇO".to_string(), 4),
                ("DEZEMBRO".to_string(), 1),
            ]
        );
        assert_eq!(order_months(&ordered), ordered);
        assert!(!ordered.iter().any(|(m, _)| m == "FEVEREIRO"));
    }

    #[test]
    fn test_order_months_ignores_unknown_labels() {
        let counts = vec![("janeiro".to_string(), 2), ("ABRIL".to_string(), 3)];
        assert_eq!(order_months(&counts), vec![("ABRIL".to_string(), 3)]);
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(3), Some("MARÇO"));
        assert_eq!(month_label(0), None);
        assert_eq!(month_label(13), None);
    }
}
