//! Typed forms of the string fields a model is authored with.
//!
//! Value fields may hold a number, the name of a setting, or the `cpi`
//! token. Settings and `BMV` bond markers may also hold a plain word. Date
//! fields hold a literal date or a trigger name, optionally with an offset
//! such as `Retire+6m`. Both are parsed once by `convert` and then resolved
//! against live state by the resolvers.

use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::recurrence::PeriodUnit;

/// Literal date formats accepted in date fields, tried in order
const DATE_FORMATS: [&str; 6] = [
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d, %Y",
    "%a %b %d %Y",
    "%d/%m/%Y",
];

/// Name of the token that stands for the current CPI percentage
pub const CPI_TOKEN: &str = "cpi";

/// Prefix of the word values that mark bond assets
pub const BOND_MARKER_PREFIX: &str = "BMV";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueExpr {
    Literal(f64),
    SettingRef(String),
    CpiToken,
    /// Non-numeric text, e.g. a `BMV` bond marker
    WordValue(String),
}

impl ValueExpr {
    /// Parse a value field. `is_setting` reports whether a name belongs to
    /// the model's settings table. A trailing `%` is dropped, so growth
    /// `5%` reads as 5.
    pub fn parse(text: &str, is_setting: impl Fn(&str) -> bool) -> Option<ValueExpr> {
        Self::parse_with(text, is_setting, parse_number)
    }

    /// Parse a proportion field, where `50%` reads as 0.5.
    pub fn parse_proportion(text: &str, is_setting: impl Fn(&str) -> bool) -> Option<ValueExpr> {
        Self::parse_with(text, is_setting, parse_proportion)
    }

    fn parse_with(
        text: &str,
        is_setting: impl Fn(&str) -> bool,
        number: fn(&str) -> Option<f64>,
    ) -> Option<ValueExpr> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Some(number) = number(trimmed) {
            return Some(ValueExpr::Literal(number));
        }
        if trimmed.eq_ignore_ascii_case(CPI_TOKEN) {
            return Some(ValueExpr::CpiToken);
        }
        if is_setting(trimmed) {
            return Some(ValueExpr::SettingRef(trimmed.to_string()));
        }
        Some(ValueExpr::WordValue(trimmed.to_string()))
    }

    pub fn is_word(&self) -> bool {
        matches!(self, ValueExpr::WordValue(_))
    }
}

impl fmt::Display for ValueExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueExpr::Literal(v) => write!(f, "{v}"),
            ValueExpr::SettingRef(name) => write!(f, "{name}"),
            ValueExpr::CpiToken => write!(f, "{CPI_TOKEN}"),
            ValueExpr::WordValue(word) => write!(f, "{word}"),
        }
    }
}

/// Parse a plain number. Thousands separators and a trailing `%` are
/// ignored.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed);
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .filter(|_| !cleaned.is_empty())
}

/// Parse a proportion; a trailing `%` divides by 100.
pub fn parse_proportion(text: &str) -> Option<f64> {
    match text.trim().strip_suffix('%') {
        Some(percent) => parse_number(percent).map(|v| v / 100.0),
        None => parse_number(text),
    }
}

/// Parse one of the boolean spellings used by stored models.
pub fn parse_flag(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "t" | "true" | "y" | "yes" | "1"
    )
}

/// Signed offset applied to a trigger date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOffset {
    pub amount: i32,
    pub unit: PeriodUnit,
}

impl DateOffset {
    pub fn apply(&self, date: Date) -> Result<Date, ResolveError> {
        date.checked_add(self.unit.span(i64::from(self.amount)))
            .map_err(|_| ResolveError::InvalidDate(format!("{date} {self}")))
    }
}

impl fmt::Display for DateOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}{}", self.amount, self.unit.suffix())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateExpr {
    Literal(Date),
    TriggerRef {
        name: String,
        offset: Option<DateOffset>,
    },
}

impl DateExpr {
    /// Parse a date field; `None` for an empty field.
    pub fn parse(text: &str) -> Option<DateExpr> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Some(d) = parse_literal_date(trimmed) {
            return Some(DateExpr::Literal(d));
        }
        if let Some((name, offset)) = split_offset(trimmed) {
            return Some(DateExpr::TriggerRef {
                name: name.to_string(),
                offset: Some(offset),
            });
        }
        Some(DateExpr::TriggerRef {
            name: trimmed.to_string(),
            offset: None,
        })
    }
}

impl fmt::Display for DateExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateExpr::Literal(d) => write!(f, "{d}"),
            DateExpr::TriggerRef { name, offset: None } => write!(f, "{name}"),
            DateExpr::TriggerRef {
                name,
                offset: Some(offset),
            } => write!(f, "{name}{offset}"),
        }
    }
}

/// Try each accepted literal format, ISO first.
pub fn parse_literal_date(text: &str) -> Option<Date> {
    if let Ok(d) = text.parse::<Date>() {
        return Some(d);
    }
    DATE_FORMATS.iter().find_map(|format| {
        jiff::fmt::strtime::parse(format, text)
            .and_then(|tm| tm.to_date())
            .ok()
    })
}

/// Split `Name+3m` into the trigger name and its offset.
fn split_offset(text: &str) -> Option<(&str, DateOffset)> {
    let idx = text.rfind(['+', '-'])?;
    let (name, rest) = text.split_at(idx);
    let name = name.trim_end();
    if name.is_empty() {
        return None;
    }
    let sign = if rest.starts_with('-') { -1 } else { 1 };
    let body = rest[1..].trim();
    let unit = PeriodUnit::from_suffix(body.chars().last()?)?;
    let amount: i32 = body[..body.len() - 1].trim().parse().ok()?;
    Some((
        name,
        DateOffset {
            amount: sign * amount,
            unit,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn no_settings(_: &str) -> bool {
        false
    }

    #[test]
    fn test_parse_value_literal() {
        assert_eq!(
            ValueExpr::parse("12600", no_settings),
            Some(ValueExpr::Literal(12600.0))
        );
        assert_eq!(
            ValueExpr::parse(" -200,000 ", no_settings),
            Some(ValueExpr::Literal(-200_000.0))
        );
        assert_eq!(
            ValueExpr::parse("5%", no_settings),
            Some(ValueExpr::Literal(5.0))
        );
    }

    #[test]
    fn test_parse_proportion() {
        assert_eq!(
            ValueExpr::parse_proportion("50%", no_settings),
            Some(ValueExpr::Literal(0.5))
        );
        assert_eq!(
            ValueExpr::parse_proportion("0.25", no_settings),
            Some(ValueExpr::Literal(0.25))
        );
        assert_eq!(parse_proportion("1,000%"), Some(10.0));
        assert_eq!(parse_proportion("%"), None);
    }

    #[test]
    fn test_parse_value_references() {
        let is_setting = |name: &str| name == "sharePrice";
        assert_eq!(
            ValueExpr::parse("sharePrice", is_setting),
            Some(ValueExpr::SettingRef("sharePrice".into()))
        );
        assert_eq!(ValueExpr::parse("CPI", is_setting), Some(ValueExpr::CpiToken));
        assert_eq!(
            ValueExpr::parse("BMVbondRate", is_setting),
            Some(ValueExpr::WordValue("BMVbondRate".into()))
        );
        assert_eq!(ValueExpr::parse("  ", is_setting), None);
    }

    #[test]
    fn test_parse_number_rejects_non_finite() {
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number(","), None);
        assert_eq!(parse_number("%"), None);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("T"));
        assert!(parse_flag("true"));
        assert!(!parse_flag("F"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_parse_literal_dates() {
        assert_eq!(parse_literal_date("10 Mar 2018"), Some(date(2018, 3, 10)));
        assert_eq!(parse_literal_date("2018-03-10"), Some(date(2018, 3, 10)));
        assert_eq!(parse_literal_date("March 10, 2018"), Some(date(2018, 3, 10)));
        assert_eq!(parse_literal_date("Retire"), None);
    }

    #[test]
    fn test_parse_trigger_with_offset() {
        assert_eq!(
            DateExpr::parse("Retire+6m"),
            Some(DateExpr::TriggerRef {
                name: "Retire".into(),
                offset: Some(DateOffset {
                    amount: 6,
                    unit: PeriodUnit::Month
                }),
            })
        );
        assert_eq!(
            DateExpr::parse("Move house - 2y"),
            Some(DateExpr::TriggerRef {
                name: "Move house".into(),
                offset: Some(DateOffset {
                    amount: -2,
                    unit: PeriodUnit::Year
                }),
            })
        );
        assert_eq!(
            DateExpr::parse("Pre-retirement"),
            Some(DateExpr::TriggerRef {
                name: "Pre-retirement".into(),
                offset: None,
            })
        );
    }

    #[test]
    fn test_offset_apply_clamps_month_end() {
        let offset = DateOffset {
            amount: 1,
            unit: PeriodUnit::Month,
        };
        assert_eq!(offset.apply(date(2019, 1, 31)).unwrap(), date(2019, 2, 28));
    }
}
