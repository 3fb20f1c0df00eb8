//! UK income tax, National Insurance and capital gains tax
//!
//! Everything here works on whole-tax-year totals for one person. The
//! engine accrues a `TaxAccrual` per person and tax year and settles it at
//! the 5 April boundary.

use serde::{Deserialize, Serialize};

use crate::model::{ALLOWANCE_TAPER_THRESHOLD, TaxYearRates};

/// Personal allowance after the taper: £1 lost per £2 of income above the
/// taper threshold, floored at zero.
pub fn personal_allowance(income: f64, rates: &TaxYearRates) -> f64 {
    let excess = (income - ALLOWANCE_TAPER_THRESHOLD).max(0.0);
    (rates.personal_allowance - excess / 2.0).max(0.0)
}

/// Income left after the (tapered) personal allowance
pub fn taxable_income(income: f64, rates: &TaxYearRates) -> f64 {
    (income - personal_allowance(income, rates)).max(0.0)
}

/// Income tax across the basic, higher and additional bands
pub fn income_tax(income: f64, rates: &TaxYearRates) -> f64 {
    let taxable = taxable_income(income, rates);
    if taxable <= 0.0 {
        return 0.0;
    }

    let basic = taxable.min(rates.basic_band);
    let higher = (taxable.min(rates.additional_threshold) - rates.basic_band).max(0.0);
    let additional = (taxable - rates.additional_threshold).max(0.0);

    basic * rates.basic_rate + higher * rates.higher_rate + additional * rates.additional_rate
}

/// Class 1 NI on a full year's liable income
pub fn national_insurance(income: f64, rates: &TaxYearRates) -> f64 {
    let main = (income.min(rates.ni_upper_earnings_limit) - rates.ni_primary_threshold).max(0.0);
    let upper = (income - rates.ni_upper_earnings_limit).max(0.0);
    main * rates.ni_main_rate + upper * rates.ni_upper_rate
}

/// Part of the basic-rate band not used by `income`
pub fn unused_basic_band(income: f64, rates: &TaxYearRates) -> f64 {
    (rates.basic_band - taxable_income(income, rates)).max(0.0)
}

/// CGT on a year's net gains. Gains over the annual exempt amount that
/// fit in the unused basic band pay the basic CGT rate; the rest pays the
/// higher rate.
pub fn capital_gains_tax(gains: f64, income: f64, rates: &TaxYearRates) -> f64 {
    let chargeable = (gains - rates.cgt_annual_exempt).max(0.0);
    if chargeable <= 0.0 {
        return 0.0;
    }
    let at_basic = chargeable.min(unused_basic_band(income, rates));
    at_basic * rates.cgt_basic_rate + (chargeable - at_basic) * rates.cgt_higher_rate
}

/// What one person accrued in one tax year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxAccrual {
    /// Income liable to income tax or NI
    pub income: f64,
    /// Income liable to income tax
    pub income_tax_base: f64,
    /// Income liable to NI
    pub ni_base: f64,
    /// Realised gains (net of losses)
    pub gains: f64,
    pub had_income: bool,
    pub had_gains: bool,
}

impl TaxAccrual {
    pub fn add_income(&mut self, amount: f64, income_tax: bool, ni: bool) {
        if !(income_tax || ni) {
            return;
        }
        self.had_income = true;
        self.income += amount;
        if income_tax {
            self.income_tax_base += amount;
        }
        if ni {
            self.ni_base += amount;
        }
    }

    pub fn add_gain(&mut self, gain: f64) {
        self.had_gains = true;
        self.gains += gain;
    }
}

/// Tax due from one person for one tax year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxSettlement {
    pub income_tax: f64,
    pub national_insurance: f64,
    pub capital_gains_tax: f64,
    pub net_income: f64,
    pub net_gain: f64,
}

impl TaxSettlement {
    pub fn total(&self) -> f64 {
        self.income_tax + self.national_insurance + self.capital_gains_tax
    }
}

/// Settle a person's tax year.
pub fn settle(accrual: &TaxAccrual, rates: &TaxYearRates) -> TaxSettlement {
    let income_tax = income_tax(accrual.income_tax_base, rates);
    let national_insurance = national_insurance(accrual.ni_base, rates);
    let capital_gains_tax = capital_gains_tax(accrual.gains, accrual.income_tax_base, rates);
    TaxSettlement {
        income_tax,
        national_insurance,
        capital_gains_tax,
        net_income: accrual.income - income_tax - national_insurance,
        net_gain: accrual.gains - capital_gains_tax,
    }
}
