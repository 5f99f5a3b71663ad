use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, Time};

use crate::ValidationError;

const MONTHS: [(&str, &str, Month); 12] = [
    ("jan", "january", Month::January),
    ("feb", "february", Month::February),
    ("mar", "march", Month::March),
    ("apr", "april", Month::April),
    ("may", "may", Month::May),
    ("jun", "june", Month::June),
    ("jul", "july", Month::July),
    ("aug", "august", Month::August),
    ("sep", "september", Month::September),
    ("oct", "october", Month::October),
    ("nov", "november", Month::November),
    ("dec", "december", Month::December),
];

/// Two-digit years at or above this value belong to the 1900s.
const TWO_DIGIT_YEAR_PIVOT: i32 = 69;

/// Calendar date with whole-day granularity.
///
/// Any time-of-day carried by the input is discarded on parse, so two
/// timestamps on the same calendar day always compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradingDate(Date);

impl TradingDate {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let value = input.trim();
        parse_iso(value)
            .or_else(|| parse_day_month_year(value))
            .or_else(|| parse_month_day_year(value))
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    pub const fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub const fn into_inner(self) -> Date {
        self.0
    }

    /// Absolute number of whole days between two dates.
    pub fn distance_days(self, other: Self) -> i64 {
        (other.0 - self.0).whole_days().abs()
    }
}

impl Display for TradingDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl FromStr for TradingDate {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl From<Date> for TradingDate {
    fn from(value: Date) -> Self {
        Self(value)
    }
}

impl Serialize for TradingDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TradingDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

// `YYYY-MM-DD`, optionally followed by a time of day.
fn parse_iso(value: &str) -> Option<Date> {
    let date_part = value.get(..10)?;
    let rest = &value[10..];
    let date = Date::parse(date_part, format_description!("[year]-[month]-[day]")).ok()?;

    if rest.is_empty() || OffsetDateTime::parse(value, &Rfc3339).is_ok() {
        return Some(date);
    }

    let time_part = rest.strip_prefix('T').or_else(|| rest.strip_prefix(' '))?;
    is_time_of_day(time_part).then_some(date)
}

fn is_time_of_day(value: &str) -> bool {
    let value = value.strip_suffix('Z').unwrap_or(value);
    let value = match value.len().checked_sub(6) {
        Some(split) if value.is_char_boundary(split) && value[split..].starts_with(['+', '-']) => {
            &value[..split]
        }
        _ => value,
    };
    let value = match value.split_once('.') {
        Some((clock, fraction))
            if !fraction.is_empty() && fraction.chars().all(|ch| ch.is_ascii_digit()) =>
        {
            clock
        }
        Some(_) => return false,
        None => value,
    };

    Time::parse(value, format_description!("[hour]:[minute]:[second]")).is_ok()
        || Time::parse(value, format_description!("[hour]:[minute]")).is_ok()
}

// `20-May-87` or `20-May-1987`.
fn parse_day_month_year(value: &str) -> Option<Date> {
    let mut parts = value.split('-');
    let day = parse_day(parts.next()?)?;
    let month = month_from_name(parts.next()?)?;
    let year = expand_year(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Date::from_calendar_date(year, month, day).ok()
}

// `Apr 22, 2020`.
fn parse_month_day_year(value: &str) -> Option<Date> {
    let (month_day, year) = value.split_once(',')?;
    let (month, day) = month_day.trim().split_once(' ')?;
    let year = year.trim();
    if year.len() != 4 {
        return None;
    }
    let year = expand_year(year)?;
    Date::from_calendar_date(year, month_from_name(month)?, parse_day(day.trim())?).ok()
}

fn parse_day(value: &str) -> Option<u8> {
    if value.is_empty() || value.len() > 2 || !value.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn month_from_name(value: &str) -> Option<Month> {
    let value = value.trim().to_ascii_lowercase();
    MONTHS
        .iter()
        .find(|(short, long, _)| value == *short || value == *long)
        .map(|(_, _, month)| *month)
}

fn expand_year(value: &str) -> Option<i32> {
    if !value.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    match value.len() {
        2 => {
            let year: i32 = value.parse().ok()?;
            Some(if year >= TWO_DIGIT_YEAR_PIVOT {
                1900 + year
            } else {
                2000 + year
            })
        }
        4 => value.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn parses_iso_calendar_date() {
        let parsed = TradingDate::parse("2020-01-05").expect("must parse");
        assert_eq!(parsed.into_inner(), date!(2020 - 01 - 05));
        assert_eq!(parsed.to_string(), "2020-01-05");
    }

    #[test]
    fn discards_time_of_day() {
        let midnight = TradingDate::parse("2020-01-09").expect("must parse");
        for input in [
            "2020-01-09T23:59:59Z",
            "2020-01-09T08:30:00.250+02:00",
            "2020-01-09 00:00:00",
            "2020-01-09T12:00",
        ] {
            assert_eq!(TradingDate::parse(input).expect(input), midnight, "{input}");
        }
    }

    #[test]
    fn parses_brent_csv_formats() {
        assert_eq!(
            TradingDate::parse("20-May-87").expect("must parse").into_inner(),
            date!(1987 - 05 - 20)
        );
        assert_eq!(
            TradingDate::parse("04-Jan-12").expect("must parse").into_inner(),
            date!(2012 - 01 - 04)
        );
        assert_eq!(
            TradingDate::parse("Apr 22, 2020").expect("must parse").into_inner(),
            date!(2020 - 04 - 22)
        );
    }

    #[test]
    fn two_digit_years_pivot_at_sixty_nine() {
        assert_eq!(TradingDate::parse("01-Jan-69").expect("parse").into_inner().year(), 1969);
        assert_eq!(TradingDate::parse("01-Jan-68").expect("parse").into_inner().year(), 2068);
    }

    #[test]
    fn rejects_unrecognized_dates() {
        for input in ["", "not-a-date", "2020-13-01", "2020-01-09Tnoon", "31-Feb-20", "Apr 22 2020"] {
            let err = TradingDate::parse(input).expect_err(input);
            assert!(matches!(err, ValidationError::InvalidDate { .. }));
        }
    }

    #[test]
    fn distance_is_absolute_whole_days() {
        let a = TradingDate::parse("2020-01-01").expect("parse");
        let b = TradingDate::parse("2020-01-09").expect("parse");
        assert_eq!(a.distance_days(b), 8);
        assert_eq!(b.distance_days(a), 8);
        assert_eq!(a.distance_days(a), 0);
    }

    #[test]
    fn serde_uses_iso_strings() {
        let parsed: TradingDate = serde_json::from_str("\"12-Mar-20\"").expect("deserialize");
        assert_eq!(serde_json::to_string(&parsed).expect("serialize"), "\"2020-03-12\"");
    }
}
