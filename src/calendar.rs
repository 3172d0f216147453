//! Implementation of (bank) holidays.
//! This is required to verify whether a given date is a working day in
//! Brazil and to walk calendars by business days. The national holidays
//! are a mix of fixed dates and movable days defined relative to Easter
//! Sunday, which is computed algorithmically so that the calendar is
//! valid for any year rather than for a hand-maintained list of years.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Whether a holiday falls on the same date every year or moves with Easter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HolidayKind {
    Fixed,
    Movable,
}

/// A concrete holiday of a specific year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
    pub kind: HolidayKind,
}

/// Rule from which the concrete holidays of a year are derived
#[derive(Debug, Clone)]
pub enum HolidayRule {
    /// Occurs every year on the same month and day
    Fixed {
        month: u32,
        day: u32,
        name: &'static str,
    },
    /// A holiday defined as an offset in days relative to Easter Sunday
    EasterOffset { offset: i64, name: &'static str },
}

/// Calendar of public holidays, evaluated per year from a set of rules.
///
/// The per-year holiday set is fully determined before any query for that
/// year is answered and is memoized behind an `RwLock`, so the calendar is
/// safe to share between threads.
pub struct Calendar {
    rules: Vec<HolidayRule>,
    years: RwLock<BTreeMap<i32, Arc<BTreeMap<NaiveDate, Holiday>>>>,
}

impl Calendar {
    pub fn new(rules: Vec<HolidayRule>) -> Calendar {
        Calendar {
            rules,
            years: RwLock::new(BTreeMap::new()),
        }
    }

    /// Brazilian national holidays
    pub fn brazil() -> Calendar {
        Calendar::new(vec![
            HolidayRule::Fixed {
                month: 1,
                day: 1,
                name: "Confraternização Universal",
            },
            HolidayRule::Fixed {
                month: 4,
                day: 21,
                name: "Tiradentes",
            },
            HolidayRule::Fixed {
                month: 5,
                day: 1,
                name: "Dia do Trabalho",
            },
            HolidayRule::Fixed {
                month: 9,
                day: 7,
                name: "Independência do Brasil",
            },
            HolidayRule::Fixed {
                month: 10,
                day: 12,
                name: "Nossa Senhora Aparecida",
            },
            HolidayRule::Fixed {
                month: 11,
                day: 2,
                name: "Finados",
            },
            HolidayRule::Fixed {
                month: 11,
                day: 15,
                name: "Proclamação da República",
            },
            HolidayRule::Fixed {
                month: 11,
                day: 20,
                name: "Dia da Consciência Negra",
            },
            HolidayRule::Fixed {
                month: 12,
                day: 25,
                name: "Natal",
            },
            HolidayRule::EasterOffset {
                offset: -48,
                name: "Carnaval (segunda-feira)",
            },
            HolidayRule::EasterOffset {
                offset: -47,
                name: "Carnaval (terça-feira)",
            },
            HolidayRule::EasterOffset {
                offset: -2,
                name: "Sexta-feira Santa",
            },
            HolidayRule::EasterOffset {
                offset: 0,
                name: "Páscoa",
            },
            HolidayRule::EasterOffset {
                offset: 60,
                name: "Corpus Christi",
            },
        ])
    }

    /// All holidays of the given year, sorted by date
    pub fn holidays_for(&self, year: i32) -> Vec<Holiday> {
        self.year_map(year).values().cloned().collect()
    }

    /// Check if date is in the set of holidays of its year
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.year_map(date.year()).contains_key(&date)
    }

    /// Display name of the holiday falling on the given date, if any
    pub fn holiday_name(&self, date: NaiveDate) -> Option<String> {
        self.year_map(date.year()).get(&date).map(|h| h.name.clone())
    }

    /// Number of holidays in the closed range `[start, end]`
    pub fn count_between(&self, start: NaiveDate, end: NaiveDate) -> usize {
        if start > end {
            return 0;
        }
        let mut count = 0;
        for year in start.year()..=end.year() {
            count += self
                .year_map(year)
                .range(start..=end)
                .count();
        }
        count
    }

    fn year_map(&self, year: i32) -> Arc<BTreeMap<NaiveDate, Holiday>> {
        if let Some(map) = self
            .years
            .read()
            .expect("holiday cache lock poisoned")
            .get(&year)
        {
            return map.clone();
        }
        let map = Arc::new(self.compute_year(year));
        self.years
            .write()
            .expect("holiday cache lock poisoned")
            .entry(year)
            .or_insert(map)
            .clone()
    }

    fn compute_year(&self, year: i32) -> BTreeMap<NaiveDate, Holiday> {
        let mut holidays = BTreeMap::new();
        let easter = easter_sunday(year);
        for rule in &self.rules {
            let holiday = match rule {
                HolidayRule::Fixed { month, day, name } => Holiday {
                    date: NaiveDate::from_ymd_opt(year, *month, *day)
                        .expect("holiday rule has a valid month and day"),
                    name: (*name).to_string(),
                    kind: HolidayKind::Fixed,
                },
                HolidayRule::EasterOffset { offset, name } => Holiday {
                    date: easter + Duration::days(*offset),
                    name: (*name).to_string(),
                    kind: HolidayKind::Movable,
                },
            };
            holidays.insert(holiday.date, holiday);
        }
        holidays
    }
}

/// Easter Sunday of the given year in the Gregorian calendar
pub fn easter_sunday(year: i32) -> NaiveDate {
    let easter = computus::gregorian(year).expect("easter date within the Gregorian calendar");
    NaiveDate::from_ymd_opt(easter.year, easter.month, easter.day)
        .expect("computus yields a valid date")
}
