use std::fmt;

/// Errors raised when a model field cannot be turned into a concrete value.
///
/// These point at the model author: the input passed validation but still
/// cannot be resolved at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// Neither a number, the `cpi` token, nor a known setting
    UnresolvedValue { field: String, text: String },
    /// Neither a literal date nor a known trigger
    UnresolvedDate(String),
    /// Text that looked like a literal date but could not be parsed
    InvalidDate(String),
    /// Recurrence text not of the form `<n><w|m|y>`
    InvalidRecurrence(String),
    /// Liability text not of the form `Person(Kind)[/Person(Kind)...]`
    InvalidLiability(String),
    /// A liability naming different people for slots that must agree
    InconsistentLiabilityPerson(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnresolvedValue { field, text } => {
                write!(f, "cannot resolve {field} value {text:?}")
            }
            ResolveError::UnresolvedDate(text) => write!(f, "cannot resolve date {text:?}"),
            ResolveError::InvalidDate(text) => write!(f, "invalid date {text:?}"),
            ResolveError::InvalidRecurrence(text) => write!(f, "invalid recurrence {text:?}"),
            ResolveError::InvalidLiability(text) => write!(f, "invalid liability {text:?}"),
            ResolveError::InconsistentLiabilityPerson(text) => {
                write!(f, "inconsistent people in liability {text:?}")
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// Conditions validated input should never reach.
///
/// Hitting one of these means the engine or the upstream validator has a bug,
/// so evaluation stops instead of producing numbers nobody can trust.
#[derive(Debug, Clone, PartialEq)]
pub enum InvariantError {
    UnknownTransactionType { transaction: String, kind: String },
    UnknownSettingType { setting: String, kind: String },
    WordValueWithGrowth { item: String, value: String },
    CyclicSetting(String),
    UnknownItem { transaction: String, item: String },
    MissingSetting(String),
    UnsupportedVersion { found: u32, expected: u32 },
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantError::UnknownTransactionType { transaction, kind } => {
                write!(f, "transaction {transaction:?} has unknown type {kind:?}")
            }
            InvariantError::UnknownSettingType { setting, kind } => {
                write!(f, "setting {setting:?} has unknown type {kind:?}")
            }
            InvariantError::WordValueWithGrowth { item, value } => {
                write!(f, "{item:?} is pinned to word value {value:?} but has growth")
            }
            InvariantError::CyclicSetting(name) => {
                write!(f, "setting {name:?} refers to itself")
            }
            InvariantError::UnknownItem { transaction, item } => {
                write!(f, "transaction {transaction:?} refers to unknown item {item:?}")
            }
            InvariantError::MissingSetting(name) => write!(f, "required setting {name:?} missing"),
            InvariantError::UnsupportedVersion { found, expected } => {
                write!(f, "model schema version {found} is not {expected}")
            }
        }
    }
}

impl std::error::Error for InvariantError {}

/// Failure of a whole evaluation run. No partial ledger accompanies it.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationError {
    Resolve(ResolveError),
    Invariant(InvariantError),
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::Resolve(e) => write!(f, "{e}"),
            EvaluationError::Invariant(e) => write!(f, "internal error: {e}"),
        }
    }
}

impl std::error::Error for EvaluationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EvaluationError::Resolve(e) => Some(e),
            EvaluationError::Invariant(e) => Some(e),
        }
    }
}

impl From<ResolveError> for EvaluationError {
    fn from(err: ResolveError) -> Self {
        EvaluationError::Resolve(err)
    }
}

impl From<InvariantError> for EvaluationError {
    fn from(err: InvariantError) -> Self {
        EvaluationError::Invariant(err)
    }
}

/// Cost-basis operations refused before any state was touched.
#[derive(Debug, Clone, PartialEq)]
pub enum DisposalError {
    InsufficientUnits { requested: f64, held: f64 },
    InvalidProportion(f64),
    Lookup(EvaluationError),
}

impl fmt::Display for DisposalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisposalError::InsufficientUnits { requested, held } => {
                write!(f, "cannot dispose of {requested} units, only {held} held")
            }
            DisposalError::InvalidProportion(p) => write!(f, "invalid disposal proportion {p}"),
            DisposalError::Lookup(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DisposalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DisposalError::Lookup(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EvaluationError> for DisposalError {
    fn from(err: EvaluationError) -> Self {
        DisposalError::Lookup(err)
    }
}

/// Errors building chart data from a ledger
#[derive(Debug, Clone, PartialEq)]
pub enum ChartError {
    Resolve(ResolveError),
    Invariant(InvariantError),
    InvalidViewSetting { setting: String, value: String },
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartError::Resolve(e) => write!(f, "{e}"),
            ChartError::Invariant(e) => write!(f, "internal error: {e}"),
            ChartError::InvalidViewSetting { setting, value } => {
                write!(f, "invalid value {value:?} for view setting {setting:?}")
            }
        }
    }
}

impl std::error::Error for ChartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChartError::Resolve(e) => Some(e),
            ChartError::Invariant(e) => Some(e),
            ChartError::InvalidViewSetting { .. } => None,
        }
    }
}

impl From<ResolveError> for ChartError {
    fn from(err: ResolveError) -> Self {
        ChartError::Resolve(err)
    }
}

impl From<InvariantError> for ChartError {
    fn from(err: InvariantError) -> Self {
        ChartError::Invariant(err)
    }
}

impl From<EvaluationError> for ChartError {
    fn from(err: EvaluationError) -> Self {
        match err {
            EvaluationError::Resolve(e) => ChartError::Resolve(e),
            EvaluationError::Invariant(e) => ChartError::Invariant(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, EvaluationError>;
