//! Tax liability of an income or asset
//!
//! Authored as `Person(Kind)[/Person(Kind)[/Person(Kind)]]`, e.g.
//! `Joe(incomeTax)/Joe(NI)`. Parsed once into a map from tax kind to the
//! person who bears it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

const MAX_PARTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaxKind {
    IncomeTax,
    NationalInsurance,
    CapitalGains,
}

impl TaxKind {
    pub fn parse(text: &str) -> Option<TaxKind> {
        match text {
            "incomeTax" => Some(TaxKind::IncomeTax),
            "NI" => Some(TaxKind::NationalInsurance),
            "CGT" => Some(TaxKind::CapitalGains),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaxKind::IncomeTax => "incomeTax",
            TaxKind::NationalInsurance => "NI",
            TaxKind::CapitalGains => "CGT",
        }
    }
}

impl fmt::Display for TaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liability {
    people: BTreeMap<TaxKind, String>,
}

impl Liability {
    pub fn parse(text: &str) -> Result<Liability, ResolveError> {
        let trimmed = text.trim();
        let mut people = BTreeMap::new();
        if trimmed.is_empty() {
            return Ok(Liability { people });
        }

        let invalid = || ResolveError::InvalidLiability(text.to_string());
        let parts: Vec<&str> = trimmed.split('/').collect();
        if parts.len() > MAX_PARTS {
            return Err(invalid());
        }

        for part in parts {
            let (person, kind) = parse_part(part).ok_or_else(invalid)?;
            if people.insert(kind, person.to_string()).is_some() {
                return Err(ResolveError::InconsistentLiabilityPerson(text.to_string()));
            }
        }

        if let (Some(tax_person), Some(ni_person)) = (
            people.get(&TaxKind::IncomeTax),
            people.get(&TaxKind::NationalInsurance),
        ) && tax_person != ni_person
        {
            return Err(ResolveError::InconsistentLiabilityPerson(text.to_string()));
        }

        Ok(Liability { people })
    }

    pub fn person(&self, kind: TaxKind) -> Option<&str> {
        self.people.get(&kind).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Distinct people named for income-side kinds (income tax, NI)
    pub fn income_people(&self) -> Vec<&str> {
        let mut people: Vec<&str> = [TaxKind::IncomeTax, TaxKind::NationalInsurance]
            .into_iter()
            .filter_map(|kind| self.person(kind))
            .collect();
        people.dedup();
        people
    }
}

impl fmt::Display for Liability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .people
            .iter()
            .map(|(kind, person)| format!("{person}({kind})"))
            .collect();
        f.write_str(&parts.join("/"))
    }
}

fn parse_part(part: &str) -> Option<(&str, TaxKind)> {
    let part = part.trim();
    let open = part.find('(')?;
    let inner = part[open + 1..].strip_suffix(')')?;
    let person = part[..open].trim();
    if person.is_empty() {
        return None;
    }
    Some((person, TaxKind::parse(inner.trim())?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single() {
        let l = Liability::parse("Joe(incomeTax)").unwrap();
        assert_eq!(l.person(TaxKind::IncomeTax), Some("Joe"));
        assert_eq!(l.person(TaxKind::NationalInsurance), None);
    }

    #[test]
    fn test_parse_three_parts() {
        let l = Liability::parse("Joe(incomeTax)/Joe(NI)/Jane(CGT)").unwrap();
        assert_eq!(l.person(TaxKind::NationalInsurance), Some("Joe"));
        assert_eq!(l.person(TaxKind::CapitalGains), Some("Jane"));
        assert_eq!(l.income_people(), vec!["Joe"]);
        assert_eq!(l.to_string(), "Joe(incomeTax)/Joe(NI)/Jane(CGT)");
    }

    #[test]
    fn test_parse_empty() {
        assert!(Liability::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_malformed() {
        for text in ["Joe", "Joe(income)", "(NI)", "Joe(NI", "a(NI)/b(CGT)/c(incomeTax)/d(NI)"] {
            assert!(
                matches!(Liability::parse(text), Err(ResolveError::InvalidLiability(_))),
                "{text} should be malformed"
            );
        }
    }

    #[test]
    fn test_inconsistent_people() {
        assert!(matches!(
            Liability::parse("Joe(incomeTax)/Jane(NI)"),
            Err(ResolveError::InconsistentLiabilityPerson(_))
        ));
        assert!(matches!(
            Liability::parse("Joe(NI)/Jane(NI)"),
            Err(ResolveError::InconsistentLiabilityPerson(_))
        ));
    }
}
