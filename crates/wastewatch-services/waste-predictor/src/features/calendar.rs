use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Meteorological season bucket used as a model feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Winter = 0,
    Spring = 1,
    Summer = 2,
    Autumn = 3,
}

impl Season {
    /// Dec–Feb winter, Mar–May spring, Jun–Aug summer, Sep–Nov autumn.
    ///
    /// Out-of-range months fall into autumn, matching the catch-all arm of
    /// the lookup table.
    pub fn from_month(month: u32) -> Season {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Calendar features derived from a single day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarFeatures {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Monday = 0 .. Sunday = 6
    pub weekday: u32,
    pub is_weekend: bool,
    pub season: Season,
}

impl CalendarFeatures {
    pub fn from_date(date: NaiveDate) -> Self {
        let weekday = date.weekday().num_days_from_monday();
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            weekday,
            is_weekend: weekday >= 5,
            season: Season::from_month(date.month()),
        }
    }
}
