/// Monetary breakdown for one checkout. Amounts are whole currency units
/// stored as integers; the admin fee is computed in basis points so no
/// floating-point value ever touches a currency amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalsBreakdown {
    pub discount: i64,
    pub base_total: i64,
    pub admin_fee: i64,
    pub grand_total: i64,
}

pub fn compute_totals(
    price: i64,
    promo_discount: Option<i64>,
    fee_rate_percent: Option<&str>,
    apply_fee: bool,
) -> TotalsBreakdown {
    let price = price.max(0);
    let discount = promo_discount.unwrap_or(0).clamp(0, price);
    let base_total = price - discount;

    let admin_fee = if apply_fee {
        let basis_points = fee_percent_to_basis_points(fee_rate_percent.unwrap_or(""));
        // round-to-nearest on the basis-point product
        (base_total * basis_points + 5_000) / 10_000
    } else {
        0
    };

    TotalsBreakdown {
        discount,
        base_total,
        admin_fee,
        grand_total: base_total + admin_fee,
    }
}

/// Parses an admin-fee percentage that may arrive as a plain number or a
/// localized string using `.` as thousands separator and `,` as decimal
/// separator (e.g. `"2,5"` means 2.5%). Unparseable input yields 0, the
/// percentage is clamped to `[0, 100]`, and the result is returned as
/// integer basis points (2.5% -> 250).
pub fn fee_percent_to_basis_points(raw: &str) -> i64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let normalized = cleaned.replace('.', "").replace(',', ".");

    let percent = normalized.parse::<f64>().unwrap_or(0.0);
    if !percent.is_finite() {
        return 0;
    }

    (percent.clamp(0.0, 100.0) * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_percent_string_parses_to_basis_points() {
        assert_eq!(fee_percent_to_basis_points("10"), 1_000);
        assert_eq!(fee_percent_to_basis_points("2"), 200);
        assert_eq!(fee_percent_to_basis_points("0"), 0);
    }

    #[test]
    fn localized_percent_string_uses_comma_as_decimal_separator() {
        assert_eq!(fee_percent_to_basis_points("2,5"), 250);
        // thousands-dot stripped, then clamped to 100%
        assert_eq!(fee_percent_to_basis_points("2.500,75"), 10_000);
    }

    #[test]
    fn garbage_percent_string_yields_zero_rate() {
        assert_eq!(fee_percent_to_basis_points("garbage"), 0);
        assert_eq!(fee_percent_to_basis_points(""), 0);
        assert_eq!(fee_percent_to_basis_points("abc%x"), 0);
        assert_eq!(fee_percent_to_basis_points("Rp 2,5%"), 250);
    }

    #[test]
    fn negative_looking_input_never_goes_below_zero() {
        // '-' is stripped before parsing
        assert_eq!(fee_percent_to_basis_points("-5"), 500);
        assert!(fee_percent_to_basis_points("-5") >= 0);
    }

    #[test]
    fn discount_is_clamped_to_price() {
        let totals = compute_totals(100_000, Some(250_000), None, false);
        assert_eq!(totals.discount, 100_000);
        assert_eq!(totals.base_total, 0);
        assert_eq!(totals.grand_total, 0);
    }

    #[test]
    fn negative_discount_is_treated_as_zero() {
        let totals = compute_totals(100_000, Some(-5_000), None, false);
        assert_eq!(totals.discount, 0);
        assert_eq!(totals.base_total, 100_000);
    }

    #[test]
    fn zero_price_yields_all_zero_outputs() {
        let totals = compute_totals(0, Some(50_000), Some("2,5"), true);
        assert_eq!(totals.discount, 0);
        assert_eq!(totals.base_total, 0);
        assert_eq!(totals.admin_fee, 0);
        assert_eq!(totals.grand_total, 0);
    }

    #[test]
    fn admin_fee_is_zero_when_not_applied() {
        let totals = compute_totals(300_000, Some(50_000), Some("10"), false);
        assert_eq!(totals.admin_fee, 0);
        assert_eq!(totals.grand_total, totals.base_total);
    }

    #[test]
    fn gateway_checkout_fee_rounds_to_nearest_unit() {
        let totals = compute_totals(300_000, Some(50_000), Some("2"), true);
        assert_eq!(totals.discount, 50_000);
        assert_eq!(totals.base_total, 250_000);
        assert_eq!(totals.admin_fee, 5_000);
        assert_eq!(totals.grand_total, 255_000);

        // 333 * 2.5% = 8.325 -> 8
        let small = compute_totals(333, None, Some("2,5"), true);
        assert_eq!(small.admin_fee, 8);

        // 340 * 2.5% = 8.5 -> 9
        let half = compute_totals(340, None, Some("2,5"), true);
        assert_eq!(half.admin_fee, 9);
    }

    #[test]
    fn grand_total_always_reconciles() {
        for price in [0_i64, 1, 999, 500_000, 1_250_000] {
            for promo in [None, Some(0), Some(10_000), Some(2_000_000)] {
                for rate in [None, Some("0"), Some("2"), Some("2,5"), Some("junk")] {
                    for apply_fee in [false, true] {
                        let totals = compute_totals(price, promo, rate, apply_fee);
                        assert!(totals.discount >= 0 && totals.discount <= price);
                        assert!(totals.base_total >= 0);
                        assert!(totals.admin_fee >= 0);
                        assert_eq!(totals.grand_total, totals.base_total + totals.admin_fee);
                    }
                }
            }
        }
    }
}
