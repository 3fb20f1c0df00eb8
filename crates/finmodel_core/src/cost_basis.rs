//! Cost-basis tracking for assets subject to capital gains
//!
//! The basis has a fixed part (purchase prices paid so far) and an optional
//! part driven by a setting. The setting part is read through a lookup at
//! disposal time, so a setting revalued mid-model is never seen stale.

use serde::{Deserialize, Serialize};

use crate::error::{DisposalError, EvaluationError};

/// Units closer than this are treated as equal
const UNIT_EPSILON: f64 = 1e-9;

/// Basis tied to a setting's live value, of which `retained` is still held
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SettingBasis {
    name: String,
    retained: f64,
}

/// What a disposal removed from the tracker
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Disposal {
    pub units_removed: f64,
    pub basis_removed: f64,
}

impl Disposal {
    /// Realised gain (negative for a loss) for the given proceeds
    pub fn gain(&self, proceeds: f64) -> f64 {
        proceeds - self.basis_removed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBasis {
    units: f64,
    fixed: f64,
    setting: Option<SettingBasis>,
}

impl CostBasis {
    /// A holding of `units` bought for `basis` in total
    pub fn fixed(units: f64, basis: f64) -> Self {
        Self {
            units,
            fixed: basis,
            setting: None,
        }
    }

    /// A holding whose basis is the current value of setting `name`
    pub fn from_setting(units: f64, name: impl Into<String>) -> Self {
        Self {
            units,
            fixed: 0.0,
            setting: Some(SettingBasis {
                name: name.into(),
                retained: 1.0,
            }),
        }
    }

    pub fn units(&self) -> f64 {
        self.units
    }

    /// Current total basis. `lookup` resolves the driving setting, if any.
    pub fn basis<L>(&self, lookup: L) -> Result<f64, EvaluationError>
    where
        L: Fn(&str) -> Result<f64, EvaluationError>,
    {
        let setting_part = match &self.setting {
            Some(s) if s.retained > 0.0 => lookup(&s.name)? * s.retained,
            _ => 0.0,
        };
        Ok(self.fixed + setting_part)
    }

    /// Record a purchase of `units` costing `cost`.
    pub fn acquire(&mut self, units: f64, cost: f64) {
        self.units += units;
        self.fixed += cost;
    }

    /// Dispose of fraction `p` (0..=1) of the holding.
    pub fn dispose_proportion<L>(&mut self, p: f64, lookup: L) -> Result<Disposal, DisposalError>
    where
        L: Fn(&str) -> Result<f64, EvaluationError>,
    {
        if !p.is_finite() || p < 0.0 || p > 1.0 + UNIT_EPSILON {
            return Err(DisposalError::InvalidProportion(p));
        }
        if p == 0.0 {
            return Ok(Disposal::default());
        }
        let basis = self.basis(lookup)?;
        if p >= 1.0 - UNIT_EPSILON {
            let disposal = Disposal {
                units_removed: self.units,
                basis_removed: basis,
            };
            self.clear();
            return Ok(disposal);
        }

        let disposal = Disposal {
            units_removed: self.units * p,
            basis_removed: basis * p,
        };
        self.scale(1.0 - p);
        Ok(disposal)
    }

    /// Dispose of `q` units. Nothing changes if fewer than `q` are held.
    pub fn dispose_units<L>(&mut self, q: f64, lookup: L) -> Result<Disposal, DisposalError>
    where
        L: Fn(&str) -> Result<f64, EvaluationError>,
    {
        if q <= 0.0 {
            return Ok(Disposal::default());
        }
        if q > self.units + UNIT_EPSILON {
            return Err(DisposalError::InsufficientUnits {
                requested: q,
                held: self.units,
            });
        }
        let basis = self.basis(lookup)?;
        if (self.units - q).abs() <= UNIT_EPSILON {
            let disposal = Disposal {
                units_removed: self.units,
                basis_removed: basis,
            };
            self.clear();
            return Ok(disposal);
        }

        let p = q / self.units;
        let disposal = Disposal {
            units_removed: q,
            basis_removed: basis * p,
        };
        self.fixed *= 1.0 - p;
        if let Some(s) = self.setting.as_mut() {
            s.retained *= 1.0 - p;
        }
        self.units -= q;
        Ok(disposal)
    }

    fn scale(&mut self, keep: f64) {
        self.units *= keep;
        self.fixed *= keep;
        if let Some(s) = self.setting.as_mut() {
            s.retained *= keep;
        }
    }

    fn clear(&mut self) {
        self.units = 0.0;
        self.fixed = 0.0;
        if let Some(s) = self.setting.as_mut() {
            s.retained = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;

    fn no_settings(name: &str) -> Result<f64, EvaluationError> {
        Err(ResolveError::UnresolvedValue {
            field: name.into(),
            text: name.into(),
        }
        .into())
    }

    #[test]
    fn test_dispose_two_of_three_units() {
        let mut basis = CostBasis::fixed(3.0, 150_000.0);
        let disposal = basis.dispose_units(2.0, no_settings).unwrap();
        assert!((disposal.basis_removed - 100_000.0).abs() < 1e-6);
        assert_eq!(disposal.units_removed, 2.0);
        assert!((disposal.gain(300_000.0) - 200_000.0).abs() < 1e-6);
        assert!((basis.units() - 1.0).abs() < 1e-12);
        assert!((basis.basis(no_settings).unwrap() - 50_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_dispose_all_zeroes_holding() {
        let mut basis = CostBasis::fixed(4.0, 1_000.0);
        basis.dispose_proportion(1.0, no_settings).unwrap();
        assert_eq!(basis.units(), 0.0);
        assert_eq!(basis.basis(no_settings).unwrap(), 0.0);

        let mut basis = CostBasis::fixed(4.0, 1_000.0);
        basis.dispose_units(4.0, no_settings).unwrap();
        assert_eq!(basis.units(), 0.0);
        assert_eq!(basis.basis(no_settings).unwrap(), 0.0);
    }

    #[test]
    fn test_overdisposal_leaves_state_untouched() {
        let mut basis = CostBasis::fixed(3.0, 150_000.0);
        let before = basis.clone();
        assert!(matches!(
            basis.dispose_units(5.0, no_settings),
            Err(DisposalError::InsufficientUnits { .. })
        ));
        assert_eq!(basis, before);
    }

    #[test]
    fn test_zero_disposal_is_noop() {
        let mut basis = CostBasis::fixed(3.0, 150_000.0);
        let before = basis.clone();
        assert_eq!(
            basis.dispose_units(0.0, no_settings).unwrap(),
            Disposal::default()
        );
        assert_eq!(
            basis.dispose_proportion(0.0, no_settings).unwrap(),
            Disposal::default()
        );
        assert_eq!(basis, before);
    }

    #[test]
    fn test_invalid_proportion() {
        let mut basis = CostBasis::fixed(1.0, 10.0);
        assert!(matches!(
            basis.dispose_proportion(1.5, no_settings),
            Err(DisposalError::InvalidProportion(_))
        ));
    }

    #[test]
    fn test_acquire_adds_cost() {
        let mut basis = CostBasis::fixed(1.0, 100.0);
        basis.acquire(1.0, 300.0);
        let disposal = basis.dispose_proportion(0.5, no_settings).unwrap();
        assert_eq!(disposal.basis_removed, 200.0);
        assert_eq!(disposal.units_removed, 1.0);
    }

    #[test]
    fn test_setting_basis_read_at_disposal() {
        let mut basis = CostBasis::from_setting(2.0, "purchase");
        let first = basis
            .dispose_units(1.0, |_| Ok(1_000.0))
            .unwrap();
        assert_eq!(first.basis_removed, 500.0);
        // Setting revalued before the second disposal
        let second = basis.dispose_units(1.0, |_| Ok(3_000.0)).unwrap();
        assert_eq!(second.basis_removed, 1_500.0);
    }

    #[test]
    fn test_lookup_failure_propagates() {
        let mut basis = CostBasis::from_setting(2.0, "missing");
        assert!(matches!(
            basis.dispose_units(1.0, no_settings),
            Err(DisposalError::Lookup(_))
        ));
        assert_eq!(basis.units(), 2.0);
    }
}
