//! Date resolution through the trigger table

use jiff::civil::Date;
use rustc_hash::FxHashMap;

use crate::error::ResolveError;
use crate::model::{DateExpr, ParsedTrigger};

#[derive(Debug, Clone, Default)]
pub struct TriggerTable {
    triggers: FxHashMap<String, DateExpr>,
}

impl TriggerTable {
    pub fn new(triggers: &[ParsedTrigger]) -> Self {
        Self {
            triggers: triggers
                .iter()
                .map(|t| (t.name.clone(), t.date.clone()))
                .collect(),
        }
    }

    pub fn resolve(&self, expr: &DateExpr) -> Result<Date, ResolveError> {
        let mut visiting = Vec::new();
        self.resolve_inner(expr, &mut visiting)
    }

    pub fn resolve_optional(&self, expr: Option<&DateExpr>) -> Result<Option<Date>, ResolveError> {
        expr.map(|e| self.resolve(e)).transpose()
    }

    fn resolve_inner<'a>(
        &'a self,
        expr: &'a DateExpr,
        visiting: &mut Vec<&'a str>,
    ) -> Result<Date, ResolveError> {
        match expr {
            DateExpr::Literal(d) => Ok(*d),
            DateExpr::TriggerRef { name, offset } => {
                let (key, target) = self
                    .triggers
                    .get_key_value(name.as_str())
                    .ok_or_else(|| ResolveError::UnresolvedDate(expr.to_string()))?;
                // A trigger defined in terms of itself never settles
                if visiting.contains(&key.as_str()) {
                    return Err(ResolveError::UnresolvedDate(expr.to_string()));
                }
                visiting.push(key);
                let base = self.resolve_inner(target, visiting)?;
                visiting.pop();
                match offset {
                    Some(offset) => offset.apply(base),
                    None => Ok(base),
                }
            }
        }
    }
}

/// Resolve a date expression against a trigger table.
pub fn resolve_date(expr: &DateExpr, triggers: &TriggerTable) -> Result<Date, ResolveError> {
    triggers.resolve(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn trigger(name: &str, text: &str) -> ParsedTrigger {
        ParsedTrigger {
            name: name.into(),
            date: DateExpr::parse(text).unwrap(),
        }
    }

    #[test]
    fn test_literal_passes_through() {
        let table = TriggerTable::default();
        let expr = DateExpr::parse("10 Mar 2018").unwrap();
        assert_eq!(resolve_date(&expr, &table).unwrap(), date(2018, 3, 10));
    }

    #[test]
    fn test_trigger_chain_with_offsets() {
        let table = TriggerTable::new(&[
            trigger("Retire", "1 Jan 2040"),
            trigger("Downsize", "Retire+2y"),
        ]);
        let expr = DateExpr::parse("Downsize-1m").unwrap();
        assert_eq!(table.resolve(&expr).unwrap(), date(2041, 12, 1));
    }

    #[test]
    fn test_unknown_trigger() {
        let table = TriggerTable::default();
        let expr = DateExpr::parse("Someday").unwrap();
        assert_eq!(
            table.resolve(&expr),
            Err(ResolveError::UnresolvedDate("Someday".into()))
        );
    }

    #[test]
    fn test_cyclic_triggers() {
        let table = TriggerTable::new(&[trigger("A", "B+1y"), trigger("B", "A")]);
        let expr = DateExpr::parse("A").unwrap();
        assert!(matches!(
            table.resolve(&expr),
            Err(ResolveError::UnresolvedDate(_))
        ));
    }
}
