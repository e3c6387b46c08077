//! Date resolution backed by chrono.

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};

use crate::ports::{DateResolveError, DateResolver};

/// Explicit formats tried in order, most common first. chrono accepts
/// unpadded numeric components, so `%Y/%m/%d` also matches `2024/1/5`.
const FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%b %d, %Y",
];

/// Resolves dates with chrono: explicit formats plus a small set of relative
/// expressions ("tomorrow", "next friday", "in 3 days") anchored to a
/// reference day.
pub struct ChronoDateResolver {
    today: NaiveDate,
}

impl ChronoDateResolver {
    /// Anchored to the local calendar date at construction time.
    pub fn new() -> Self {
        Self {
            today: Local::now().date_naive(),
        }
    }

    /// Anchored to a fixed reference day, for deterministic resolution.
    pub fn fixed(today: NaiveDate) -> Self {
        Self { today }
    }

    fn resolve_relative(&self, lowered: &str) -> Option<NaiveDate> {
        match lowered {
            "today" => return Some(self.today),
            "tomorrow" => return self.today.checked_add_days(Days::new(1)),
            "yesterday" => return self.today.checked_sub_days(Days::new(1)),
            _ => {}
        }

        let words: Vec<&str> = lowered.split_whitespace().collect();
        match words.as_slice() {
            // "friday" / "next friday": the next occurrence strictly after
            // today, so "next monday" said on a Monday means a week out.
            [day] => self.upcoming(day.parse().ok()?),
            ["next", day] => self.upcoming(day.parse().ok()?),
            ["in", n, "days" | "day"] => self
                .today
                .checked_add_days(Days::new(n.parse().ok()?)),
            [n, "days" | "day", "ago"] => self
                .today
                .checked_sub_days(Days::new(n.parse().ok()?)),
            _ => None,
        }
    }

    fn upcoming(&self, weekday: Weekday) -> Option<NaiveDate> {
        let ahead = (weekday.num_days_from_monday() + 7
            - self.today.weekday().num_days_from_monday())
            % 7;
        let ahead = if ahead == 0 { 7 } else { ahead };
        self.today.checked_add_days(Days::new(ahead as u64))
    }
}

impl Default for ChronoDateResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DateResolver for ChronoDateResolver {
    fn resolve(&self, input: &str) -> Result<NaiveDate, DateResolveError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DateResolveError::unresolvable(input));
        }

        for format in FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                return Ok(date);
            }
        }

        self.resolve_relative(&trimmed.to_lowercase())
            .ok_or_else(|| DateResolveError::unresolvable(input))
    }
}
