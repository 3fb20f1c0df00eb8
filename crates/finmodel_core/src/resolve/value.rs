//! Value resolution against the live settings table
//!
//! Settings may refer to other settings. Revaluation transactions replace a
//! setting's expression mid-evaluation, so resolution always reads the
//! current table rather than anything captured at parse time.

use rustc_hash::FxHashMap;

use crate::error::{EvaluationError, InvariantError, ResolveError};
use crate::model::{ParsedSetting, ValueExpr, settings};

/// Outcome of resolving a value expression
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Number(f64),
    Word(String),
}

impl Resolved {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Resolved::Number(v) => Some(*v),
            Resolved::Word(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SettingsTable {
    values: FxHashMap<String, ValueExpr>,
}

impl SettingsTable {
    pub fn new(settings: &[ParsedSetting]) -> Self {
        let values = settings
            .iter()
            .map(|s| (s.name.clone(), s.value.clone()))
            .collect();
        Self { values }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ValueExpr> {
        self.values.get(name)
    }

    /// Replace a setting's expression (or add it).
    pub fn set(&mut self, name: &str, value: ValueExpr) {
        self.values.insert(name.to_string(), value);
    }

    /// Resolve an expression to a number or a word.
    pub fn resolve(&self, expr: &ValueExpr) -> Result<Resolved, EvaluationError> {
        let mut visiting = Vec::new();
        self.resolve_inner(expr, &mut visiting)
    }

    /// Resolve an expression that must be numeric. `field` names the
    /// place the value came from for the error message.
    pub fn resolve_number(&self, field: &str, expr: &ValueExpr) -> Result<f64, EvaluationError> {
        match self.resolve(expr)? {
            Resolved::Number(v) => Ok(v),
            Resolved::Word(word) => Err(ResolveError::UnresolvedValue {
                field: field.to_string(),
                text: word,
            }
            .into()),
        }
    }

    /// Like `resolve_number`, treating a missing field as zero.
    pub fn resolve_or_zero(
        &self,
        field: &str,
        expr: Option<&ValueExpr>,
    ) -> Result<f64, EvaluationError> {
        expr.map_or(Ok(0.0), |e| self.resolve_number(field, e))
    }

    /// Numeric value of a named setting
    pub fn number(&self, name: &str) -> Result<f64, EvaluationError> {
        self.resolve_number(name, &ValueExpr::SettingRef(name.to_string()))
    }

    /// Current annual CPI in percent; zero when the model sets none.
    pub fn cpi(&self) -> Result<f64, EvaluationError> {
        self.resolve_number(settings::CPI, &ValueExpr::CpiToken)
    }

    fn resolve_inner<'a>(
        &'a self,
        expr: &'a ValueExpr,
        visiting: &mut Vec<&'a str>,
    ) -> Result<Resolved, EvaluationError> {
        match expr {
            ValueExpr::Literal(v) => Ok(Resolved::Number(*v)),
            ValueExpr::WordValue(word) => Ok(Resolved::Word(word.clone())),
            ValueExpr::CpiToken => match self.values.get_key_value(settings::CPI) {
                Some((name, value)) => self.follow(name, value, visiting),
                None => Ok(Resolved::Number(0.0)),
            },
            ValueExpr::SettingRef(name) => match self.values.get_key_value(name.as_str()) {
                Some((name, value)) => self.follow(name, value, visiting),
                None => Err(ResolveError::UnresolvedValue {
                    field: name.clone(),
                    text: name.clone(),
                }
                .into()),
            },
        }
    }

    fn follow<'a>(
        &'a self,
        name: &'a str,
        value: &'a ValueExpr,
        visiting: &mut Vec<&'a str>,
    ) -> Result<Resolved, EvaluationError> {
        if visiting.contains(&name) {
            return Err(InvariantError::CyclicSetting(name.to_string()).into());
        }
        visiting.push(name);
        let resolved = self.resolve_inner(value, visiting);
        visiting.pop();
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SettingKind;

    fn table(entries: &[(&str, ValueExpr)]) -> SettingsTable {
        let settings: Vec<ParsedSetting> = entries
            .iter()
            .map(|(name, value)| ParsedSetting {
                name: name.to_string(),
                value: value.clone(),
                kind: SettingKind::Custom,
            })
            .collect();
        SettingsTable::new(&settings)
    }

    #[test]
    fn test_literal() {
        let t = table(&[]);
        assert_eq!(
            t.resolve(&ValueExpr::Literal(3.5)).unwrap(),
            Resolved::Number(3.5)
        );
    }

    #[test]
    fn test_chained_settings() {
        let t = table(&[
            ("a", ValueExpr::SettingRef("b".into())),
            ("b", ValueExpr::Literal(42.0)),
        ]);
        assert_eq!(t.number("a").unwrap(), 42.0);
    }

    #[test]
    fn test_cpi_token() {
        let t = table(&[("cpi", ValueExpr::Literal(2.5))]);
        assert_eq!(t.cpi().unwrap(), 2.5);
        assert_eq!(
            t.resolve_number("growth", &ValueExpr::CpiToken).unwrap(),
            2.5
        );
        assert_eq!(table(&[]).cpi().unwrap(), 0.0);
    }

    #[test]
    fn test_unknown_setting() {
        let t = table(&[]);
        assert!(matches!(
            t.resolve(&ValueExpr::SettingRef("missing".into())),
            Err(EvaluationError::Resolve(ResolveError::UnresolvedValue { .. }))
        ));
    }

    #[test]
    fn test_word_value_is_not_a_number() {
        let t = table(&[("bond", ValueExpr::WordValue("BMVrate".into()))]);
        assert_eq!(
            t.resolve(&ValueExpr::SettingRef("bond".into())).unwrap(),
            Resolved::Word("BMVrate".into())
        );
        assert!(t.number("bond").is_err());
    }

    #[test]
    fn test_cycle_is_fatal() {
        let t = table(&[
            ("a", ValueExpr::SettingRef("b".into())),
            ("b", ValueExpr::SettingRef("a".into())),
        ]);
        assert!(matches!(
            t.number("a"),
            Err(EvaluationError::Invariant(InvariantError::CyclicSetting(_)))
        ));
        let self_cpi = table(&[("cpi", ValueExpr::CpiToken)]);
        assert!(self_cpi.cpi().is_err());
    }

    #[test]
    fn test_set_replaces_value() {
        let mut t = table(&[("price", ValueExpr::Literal(1.0))]);
        t.set("price", ValueExpr::Literal(2.0));
        assert_eq!(t.number("price").unwrap(), 2.0);
    }
}
