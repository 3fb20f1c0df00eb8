//! UK tax rates and thresholds by tax year
//!
//! Each row is keyed by the calendar year its tax year starts in. Thresholds
//! for years past the last row are projected by compounding CPI forward from
//! the last row; rates stay where the last row left them.

use serde::{Deserialize, Serialize};

/// Income above which the personal allowance is withdrawn, £1 per £2.
/// Not indexed.
pub const ALLOWANCE_TAPER_THRESHOLD: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxYearRates {
    pub start_year: i16,

    // === Income tax ===
    pub personal_allowance: f64,
    /// Width of the basic-rate band, measured on taxable income
    pub basic_band: f64,
    /// Taxable income above which the additional rate applies
    pub additional_threshold: f64,
    pub basic_rate: f64,
    pub higher_rate: f64,
    pub additional_rate: f64,

    // === National Insurance ===
    pub ni_primary_threshold: f64,
    pub ni_upper_earnings_limit: f64,
    pub ni_main_rate: f64,
    pub ni_upper_rate: f64,

    // === Capital gains ===
    pub cgt_annual_exempt: f64,
    pub cgt_basic_rate: f64,
    pub cgt_higher_rate: f64,
}

impl TaxYearRates {
    /// Scale every money threshold by `factor`, leaving rates alone.
    #[must_use]
    pub fn indexed(&self, start_year: i16, factor: f64) -> TaxYearRates {
        TaxYearRates {
            start_year,
            personal_allowance: self.personal_allowance * factor,
            basic_band: self.basic_band * factor,
            additional_threshold: self.additional_threshold * factor,
            ni_primary_threshold: self.ni_primary_threshold * factor,
            ni_upper_earnings_limit: self.ni_upper_earnings_limit * factor,
            cgt_annual_exempt: self.cgt_annual_exempt * factor,
            ..*self
        }
    }
}

const fn row(
    start_year: i16,
    personal_allowance: f64,
    basic_band: f64,
    ni_primary_threshold: f64,
    ni_upper_earnings_limit: f64,
    cgt_annual_exempt: f64,
) -> TaxYearRates {
    TaxYearRates {
        start_year,
        personal_allowance,
        basic_band,
        additional_threshold: 150_000.0,
        basic_rate: 0.20,
        higher_rate: 0.40,
        additional_rate: 0.45,
        ni_primary_threshold,
        ni_upper_earnings_limit,
        ni_main_rate: 0.12,
        ni_upper_rate: 0.02,
        cgt_annual_exempt,
        cgt_basic_rate: 0.10,
        cgt_higher_rate: 0.20,
    }
}

/// Years before 2019 use the 2019/20 income tax and NI thresholds.
const UK_ROWS: [TaxYearRates; 5] = [
    row(2017, 12_500.0, 37_500.0, 8_632.0, 50_000.0, 11_300.0),
    row(2018, 12_500.0, 37_500.0, 8_632.0, 50_000.0, 11_700.0),
    row(2019, 12_500.0, 37_500.0, 8_632.0, 50_000.0, 12_000.0),
    row(2020, 12_500.0, 37_500.0, 9_500.0, 50_000.0, 12_300.0),
    row(2021, 12_570.0, 37_700.0, 9_568.0, 50_270.0, 12_300.0),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxTable {
    rows: Vec<TaxYearRates>,
}

impl Default for TaxTable {
    fn default() -> Self {
        Self::uk()
    }
}

impl TaxTable {
    pub fn uk() -> Self {
        Self {
            rows: UK_ROWS.to_vec(),
        }
    }

    /// Rates for the tax year starting in `year`. `cpi_percent` drives the
    /// projection beyond the last tabulated year.
    pub fn rates_for(&self, year: i16, cpi_percent: f64) -> TaxYearRates {
        let (Some(first), Some(last)) = (self.rows.first(), self.rows.last()) else {
            return row(year, 0.0, 0.0, 0.0, 0.0, 0.0);
        };
        if year <= first.start_year {
            return TaxYearRates {
                start_year: year,
                ..*first
            };
        }
        if year > last.start_year {
            let years_ahead = i32::from(year - last.start_year);
            let factor = (1.0 + cpi_percent / 100.0).powi(years_ahead);
            return last.indexed(year, factor);
        }
        self.rows
            .iter()
            .rev()
            .find(|r| r.start_year <= year)
            .copied()
            .unwrap_or(*first)
    }
}
