//! Recurrence expansion
//!
//! A recurrence such as `2m` or `1y` turns a start date into a lazy, finite
//! sequence of occurrence dates. The expander knows nothing about the
//! ledger; it only enumerates dates.

use std::fmt;

use jiff::ToSpan;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodUnit {
    Week,
    Month,
    Year,
}

impl PeriodUnit {
    pub fn from_suffix(c: char) -> Option<PeriodUnit> {
        match c {
            'w' | 'W' => Some(PeriodUnit::Week),
            'm' | 'M' => Some(PeriodUnit::Month),
            'y' | 'Y' => Some(PeriodUnit::Year),
            _ => None,
        }
    }

    pub fn suffix(self) -> char {
        match self {
            PeriodUnit::Week => 'w',
            PeriodUnit::Month => 'm',
            PeriodUnit::Year => 'y',
        }
    }

    /// Span covering `n` of this unit
    pub fn span(self, n: i64) -> jiff::Span {
        match self {
            PeriodUnit::Week => n.weeks(),
            PeriodUnit::Month => n.months(),
            PeriodUnit::Year => n.years(),
        }
    }
}

/// `<count><unit>`, e.g. `2w`, `1m`, `5y`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recurrence {
    pub count: u32,
    pub unit: PeriodUnit,
}

impl Recurrence {
    pub const MONTHLY: Recurrence = Recurrence {
        count: 1,
        unit: PeriodUnit::Month,
    };

    pub const YEARLY: Recurrence = Recurrence {
        count: 1,
        unit: PeriodUnit::Year,
    };

    /// Parse recurrence text; an empty field means a single occurrence.
    pub fn parse(text: &str) -> Result<Option<Recurrence>, ResolveError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let invalid = || ResolveError::InvalidRecurrence(text.to_string());
        let unit = trimmed
            .chars()
            .last()
            .and_then(PeriodUnit::from_suffix)
            .ok_or_else(invalid)?;
        let count: u32 = trimmed[..trimmed.len() - 1]
            .trim()
            .parse()
            .map_err(|_| invalid())?;
        if count == 0 {
            return Err(invalid());
        }
        Ok(Some(Recurrence { count, unit }))
    }

    /// Like `parse`, for item kinds where a recurrence is mandatory.
    pub fn parse_required(text: &str) -> Result<Recurrence, ResolveError> {
        Recurrence::parse(text)?.ok_or_else(|| ResolveError::InvalidRecurrence(text.to_string()))
    }

    /// Span of `k` steps of this recurrence
    pub fn steps(&self, k: i64) -> jiff::Span {
        self.unit.span(k * i64::from(self.count))
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.suffix())
    }
}

/// Occurrence dates of a (possibly recurring) item.
///
/// Occurrence `k` is `start + k * step`, always computed from `start` so a
/// 31 January start yields 28 February then 31 March. Dates on or after
/// `stop` and after `last` are never produced. Cloning restarts nothing: a
/// clone continues from the same position, and `restart` goes back to the
/// first occurrence.
#[derive(Debug, Clone)]
pub struct Occurrences {
    start: Date,
    recurrence: Option<Recurrence>,
    stop: Option<Date>,
    last: Date,
    index: i64,
    first_index: i64,
    done: bool,
}

impl Occurrences {
    pub fn new(
        start: Date,
        recurrence: Option<Recurrence>,
        stop: Option<Date>,
        last: Date,
    ) -> Self {
        Self {
            start,
            recurrence,
            stop,
            last,
            index: 0,
            first_index: 0,
            done: false,
        }
    }

    /// Skip the first `k` occurrences (and keep skipping them on restart).
    #[must_use]
    pub fn skipping(mut self, k: i64) -> Self {
        self.first_index = k;
        self.index = k;
        self
    }

    pub fn restart(&mut self) {
        self.index = self.first_index;
        self.done = false;
    }

    fn nth_date(&self, k: i64) -> Option<Date> {
        match self.recurrence {
            None if k == 0 => Some(self.start),
            None => None,
            Some(r) => self.start.checked_add(r.steps(k)).ok(),
        }
    }
}

impl Iterator for Occurrences {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        if self.done {
            return None;
        }
        let next = self.nth_date(self.index).filter(|d| {
            *d <= self.last && self.stop.is_none_or(|stop| *d < stop)
        });
        match next {
            Some(d) => {
                self.index += 1;
                Some(d)
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}
