//! The engine's output primitive

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// "Item `name` had value `value` as of `date`, caused by `source`."
///
/// The ledger is a chronological sequence of these and is never edited
/// once an entry has been appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub name: String,
    pub date: Date,
    pub value: f64,
    pub source: String,
}

impl Evaluation {
    pub fn new(name: impl Into<String>, date: Date, value: f64, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date,
            value,
            source: source.into(),
        }
    }
}

/// Source tag for growth steps
pub const SOURCE_GROWTH: &str = "growth";
/// Source tag for an item's opening value
pub const SOURCE_START: &str = "start";
/// Source tag for tax settlement
pub const SOURCE_TAX: &str = "tax";

/// Ledger names of the per-person tax lines emitted at tax-year boundaries
pub fn income_tax_name(person: &str) -> String {
    format!("{person} income (incomeTax)")
}

pub fn ni_name(person: &str) -> String {
    format!("{person} income (NI)")
}

pub fn cgt_name(person: &str) -> String {
    format!("{person} gain (CGT)")
}

pub fn net_income_name(person: &str) -> String {
    format!("{person} income (net)")
}

pub fn net_gain_name(person: &str) -> String {
    format!("{person} gain (net)")
}

/// Which of the per-person tax lines an evaluation is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxLineKind {
    IncomeTax,
    NationalInsurance,
    CapitalGains,
    NetIncome,
    NetGain,
}

impl TaxLineKind {
    const SUFFIXES: [(&'static str, TaxLineKind); 5] = [
        (" income (incomeTax)", TaxLineKind::IncomeTax),
        (" income (NI)", TaxLineKind::NationalInsurance),
        (" gain (CGT)", TaxLineKind::CapitalGains),
        (" income (net)", TaxLineKind::NetIncome),
        (" gain (net)", TaxLineKind::NetGain),
    ];

    /// Lines about income rather than gains
    pub fn is_income(self) -> bool {
        matches!(
            self,
            TaxLineKind::IncomeTax | TaxLineKind::NationalInsurance | TaxLineKind::NetIncome
        )
    }

    pub fn is_net(self) -> bool {
        matches!(self, TaxLineKind::NetIncome | TaxLineKind::NetGain)
    }
}

/// Split a tax line name into the person and the kind of line.
pub fn parse_tax_line(name: &str) -> Option<(&str, TaxLineKind)> {
    TaxLineKind::SUFFIXES.iter().find_map(|(suffix, kind)| {
        name.strip_suffix(suffix)
            .filter(|person| !person.is_empty())
            .map(|person| (person, *kind))
    })
}
