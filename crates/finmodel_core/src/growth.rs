//! Growth and CPI compounding
//!
//! Annual rates are given in percent and converted to the equivalent rate
//! for the elapsed number of days, so stepping monthly or yearly over the
//! same interval compounds to the same total.

/// Convert a yearly rate to an n-day rate using compound interest
#[must_use]
#[inline]
pub fn n_day_rate(yearly_rate: f64, n_days: f64) -> f64 {
    (1.0 + yearly_rate).powf(n_days / 365.0) - 1.0
}

/// Factor by which a value grows over `days` given its own annual growth
/// and, unless it is CPI-immune, the CPI rate as well. Both rates are in
/// percent.
#[must_use]
pub fn growth_multiplier(growth_percent: f64, cpi_percent: f64, cpi_immune: bool, days: i32) -> f64 {
    let days = f64::from(days);
    let own = 1.0 + n_day_rate(growth_percent / 100.0, days);
    if cpi_immune {
        own
    } else {
        own * (1.0 + n_day_rate(cpi_percent / 100.0, days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_days_is_identity() {
        assert_eq!(growth_multiplier(5.0, 2.0, false, 0), 1.0);
    }

    #[test]
    fn test_full_year() {
        let m = growth_multiplier(10.0, 0.0, false, 365);
        assert!((m - 1.10).abs() < 1e-12);
    }

    #[test]
    fn test_cpi_immune_ignores_cpi() {
        let immune = growth_multiplier(3.0, 2.0, true, 365);
        let exposed = growth_multiplier(3.0, 2.0, false, 365);
        assert!((immune - 1.03).abs() < 1e-12);
        assert!((exposed - 1.03 * 1.02).abs() < 1e-12);
    }

    #[test]
    fn test_negative_days_discounts() {
        let back = growth_multiplier(10.0, 0.0, true, -365);
        assert!((back - 1.0 / 1.10).abs() < 1e-12);
    }

    #[test]
    fn test_monthly_steps_match_single_step() {
        // Month lengths of 2019
        let months = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        let stepped: f64 = months
            .iter()
            .map(|d| growth_multiplier(7.0, 2.5, false, *d))
            .product();
        let single = growth_multiplier(7.0, 2.5, false, 365);
        assert!((stepped - single).abs() < 1e-9, "{stepped} vs {single}");
    }
}
