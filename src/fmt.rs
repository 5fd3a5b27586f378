use rust_decimal::{Decimal, RoundingStrategy};

/// Format a float as a dollar amount with two decimals: $1234.56, -$50.00
///
/// Rounding works on the exact binary value, so 0.015 (stored just below the
/// tie) gives $0.01 while an exact tie like 0.125 goes up to $0.13.
pub fn money(val: f64) -> String {
    let abs = val.abs();
    let digits = match Decimal::from_f64_retain(abs) {
        Some(d) => {
            let mut cents = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            cents.rescale(2);
            cents.to_string()
        }
        // Beyond Decimal's range every f64 is a whole number.
        None => format!("{abs:.2}"),
    };
    if val < 0.0 {
        format!("-${digits}")
    } else {
        format!("${digits}")
    }
}

/// Relative deviation of `actual` from `planned`. Zero when nothing was planned.
pub fn deviation(actual: f64, planned: f64) -> f64 {
    if planned > 0.0 {
        (actual - planned) / planned
    } else {
        0.0
    }
}

/// Magnitude of a deviation as a whole percentage, without the sign: 0.3 -> "30"
pub fn whole_percent(deviation: f64) -> String {
    format!("{:.0}", (deviation * 100.0).abs().round())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "$1234.56");
        assert_eq!(money(-500.00), "-$500.00");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1000000.99), "$1000000.99");
        assert_eq!(money(42.1), "$42.10");
    }

    #[test]
    fn test_money_sign_goes_before_dollar() {
        assert_eq!(money(-0.5), "-$0.50");
        assert_eq!(money(-0.0), "$0.00");
    }

    #[test]
    fn test_money_rounds_to_cents() {
        assert_eq!(money(0.125), "$0.13");
        assert_eq!(money(0.375), "$0.38");
        assert_eq!(money(2.004), "$2.00");
        assert_eq!(money(-19.999), "-$20.00");
    }

    #[test]
    fn test_money_rounds_the_stored_value() {
        // These sit just below the tie once stored as f64.
        assert_eq!(money(0.015), "$0.01");
        assert_eq!(money(0.245), "$0.24");
        assert_eq!(money(1.005), "$1.00");
        assert_eq!(money(2.675), "$2.67");
        // And these just above it.
        assert_eq!(money(12.345), "$12.35");
        assert_eq!(money(8.345), "$8.35");
        assert_eq!(money(-99.994), "-$99.99");
    }

    #[test]
    fn test_money_tiny_negative_keeps_sign() {
        assert_eq!(money(-0.004), "-$0.00");
    }

    #[test]
    fn test_money_huge_values() {
        assert_eq!(money(1e30), format!("${:.2}", 1e30));
    }

    #[test]
    fn test_deviation() {
        assert!((deviation(1300.0, 1000.0) - 0.3).abs() < 1e-12);
        assert!((deviation(950.0, 1000.0) + 0.05).abs() < 1e-12);
        assert_eq!(deviation(50.0, 0.0), 0.0);
        assert_eq!(deviation(50.0, -10.0), 0.0);
    }

    #[test]
    fn test_whole_percent() {
        assert_eq!(whole_percent(0.3), "30");
        assert_eq!(whole_percent(-0.254), "25");
        assert_eq!(whole_percent(0.125), "13");
        assert_eq!(whole_percent(2.0), "200");
    }
}
