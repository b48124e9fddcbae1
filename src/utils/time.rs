use chrono::{DateTime, Days, NaiveTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// `YYYY-MM-DD`, as used by sitemap `lastmod`.
pub fn to_sitemap_date(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// First UTC midnight strictly after `from`.
pub fn next_utc_midnight(from: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = from
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap_or(from.date_naive());
    tomorrow.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_lastmod_dates() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 7, 23, 59, 1).unwrap();
        assert_eq!(to_sitemap_date(dt), "2026-03-07");
    }

    #[test]
    fn midnight_is_always_in_the_future() {
        let at_midnight = Utc.with_ymd_and_hms(2026, 3, 7, 0, 0, 0).unwrap();
        assert_eq!(
            next_utc_midnight(at_midnight),
            Utc.with_ymd_and_hms(2026, 3, 8, 0, 0, 0).unwrap()
        );
        let late = Utc.with_ymd_and_hms(2026, 12, 31, 18, 30, 0).unwrap();
        assert_eq!(
            next_utc_midnight(late),
            Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap()
        );
    }
}
