//! Indonesian date and time formatting for reports and the summary.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Timelike};

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// `17 Oktober 2026`
pub fn date(d: NaiveDate) -> String {
    format!("{} {} {}", d.day(), MONTHS[d.month0() as usize], d.year())
}

/// `14:05:09`
pub fn time<Tz: TimeZone>(t: &DateTime<Tz>) -> String {
    format!("{:02}:{:02}:{:02}", t.hour(), t.minute(), t.second())
}

/// `17 Oktober 2026, Pukul 14:05:09`
pub fn date_time(t: &DateTime<FixedOffset>) -> String {
    format!("{}, Pukul {}", date(t.date_naive()), time(t))
}

/// Like `date_time` but prints `-` when there is no timestamp.
pub fn optional_date_time(t: Option<&DateTime<FixedOffset>>) -> String {
    t.map(date_time).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date() {
        let d = NaiveDate::from_ymd_opt(2026, 10, 7).unwrap();
        assert_eq!(date(d), "7 Oktober 2026");
        let d = NaiveDate::from_ymd_opt(2027, 1, 31).unwrap();
        assert_eq!(date(d), "31 Januari 2027");
    }

    #[test]
    fn test_date_time_uses_offset() {
        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        let t = "2026-10-17T20:30:05Z"
            .parse::<DateTime<chrono::Utc>>()
            .unwrap()
            .with_timezone(&offset);
        assert_eq!(date_time(&t), "18 Oktober 2026, Pukul 03:30:05");
        assert_eq!(optional_date_time(None), "-");
    }
}
