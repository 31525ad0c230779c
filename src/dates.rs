use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

/// Weekday the meetup is held on.
pub const EVENT_WEEKDAY: Weekday = Weekday::Thu;

const TREND_WEEKS_BACK: i64 = 12;
const TREND_WEEKS_AHEAD: i64 = 4;

pub fn next_event_date() -> NaiveDate {
    next_occurrence_of_weekday(EVENT_WEEKDAY, Local::now().date_naive())
}

/// Nearest `target` on or after `reference`. A reference already on `target`
/// is returned as is.
pub fn next_occurrence_of_weekday(target: Weekday, reference: NaiveDate) -> NaiveDate {
    reference + Duration::days(days_until(target, reference))
}

/// Every `target` weekday from the first one on or after `start` up to and
/// including `end`.
pub fn weekdays_in_range(target: Weekday, start: NaiveDate, end: NaiveDate) -> WeekdaysInRange {
    WeekdaysInRange {
        next: next_occurrence_of_weekday(target, start),
        end,
    }
}

/// Range pre-filled in the admin trend form.
pub fn default_trend_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (
        today - Duration::weeks(TREND_WEEKS_BACK),
        today + Duration::weeks(TREND_WEEKS_AHEAD),
    )
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn days_until(target: Weekday, from: NaiveDate) -> i64 {
    let current = from.weekday().num_days_from_sunday() as i64;
    let wanted = target.num_days_from_sunday() as i64;
    (wanted - current).rem_euclid(7)
}

#[derive(Debug, Clone)]
pub struct WeekdaysInRange {
    next: NaiveDate,
    end: NaiveDate,
}

impl Iterator for WeekdaysInRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.next > self.end {
            return None;
        }
        let current = self.next;
        self.next = current + Duration::days(7);
        Some(current)
    }
}
