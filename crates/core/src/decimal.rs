//! Fixed-point amounts (prices, percentages, subtotals).
//!
//! Amounts are `rust_decimal::Decimal` constrained by a total digit count and a
//! number of decimal places, mirroring a `NUMERIC(max_digits, places)` column.

use rust_decimal::Decimal;

use crate::validation::FieldErrors;

/// Digit/place limits for a decimal field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalSpec {
    pub max_digits: u32,
    pub decimal_places: u32,
}

/// `NUMERIC(12, 2)`: unit prices and subtotals.
pub const MONEY: DecimalSpec = DecimalSpec {
    max_digits: 12,
    decimal_places: 2,
};

/// `NUMERIC(4, 2)`: discount percentages.
pub const PERCENTAGE: DecimalSpec = DecimalSpec {
    max_digits: 4,
    decimal_places: 2,
};

impl DecimalSpec {
    /// Record digit/place violations and negative values for `field`.
    pub fn check(&self, errors: &mut FieldErrors, field: &str, value: Decimal) {
        if value.is_sign_negative() && !value.is_zero() {
            errors.add(field, "Ensure this value is greater than or equal to 0.");
            return;
        }

        let normalized = value.normalize();
        let places = normalized.scale();
        let mantissa_digits = normalized.mantissa().unsigned_abs().to_string().len() as u32;
        let digits = mantissa_digits.max(places);
        let whole_digits = digits - places;

        if digits > self.max_digits {
            errors.add(
                field,
                format!(
                    "Ensure that there are no more than {} digits in total.",
                    self.max_digits
                ),
            );
        } else if places > self.decimal_places {
            errors.add(
                field,
                format!(
                    "Ensure that there are no more than {} decimal places.",
                    self.decimal_places
                ),
            );
        } else if whole_digits > self.max_digits - self.decimal_places {
            errors.add(
                field,
                format!(
                    "Ensure that there are no more than {} digits before the decimal point.",
                    self.max_digits - self.decimal_places
                ),
            );
        }
    }

    /// Rescale to the field's decimal places (`150` becomes `150.00`).
    pub fn quantize(&self, value: Decimal) -> Decimal {
        let mut out = value.round_dp(self.decimal_places);
        out.rescale(self.decimal_places);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn money_accepts_ten_whole_digits() {
        let mut errors = FieldErrors::new();
        MONEY.check(&mut errors, "unit_price", dec("9999999999.99"));
        MONEY.check(&mut errors, "zero", dec("0"));
        assert!(errors.is_empty());
    }

    #[test]
    fn money_rejects_extra_places_and_digits() {
        let mut errors = FieldErrors::new();
        MONEY.check(&mut errors, "places", dec("1.005"));
        MONEY.check(&mut errors, "whole", dec("12345678901"));
        MONEY.check(&mut errors, "negative", dec("-1"));

        assert_eq!(
            errors.messages("places"),
            &["Ensure that there are no more than 2 decimal places.".to_string()]
        );
        assert_eq!(
            errors.messages("whole"),
            &["Ensure that there are no more than 10 digits before the decimal point.".to_string()]
        );
        assert!(errors.contains("negative"));
    }

    #[test]
    fn trailing_zeros_do_not_count_as_places() {
        let mut errors = FieldErrors::new();
        PERCENTAGE.check(&mut errors, "discount_percentage", dec("12.5000"));
        assert!(errors.is_empty());
    }

    #[test]
    fn percentage_caps_at_two_whole_digits() {
        let mut errors = FieldErrors::new();
        PERCENTAGE.check(&mut errors, "discount_percentage", dec("100"));
        assert!(errors.contains("discount_percentage"));
    }

    #[test]
    fn quantize_pads_to_two_places() {
        assert_eq!(MONEY.quantize(dec("150")).to_string(), "150.00");
        assert_eq!(MONEY.quantize(dec("2.5")).to_string(), "2.50");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Every non-negative cent amount below 10^10 fits `NUMERIC(12, 2)`.
            #[test]
            fn cent_amounts_fit_money(cents in 0i64..1_000_000_000_000) {
                let value = Decimal::new(cents, 2);
                let mut errors = FieldErrors::new();
                MONEY.check(&mut errors, "unit_price", value);
                prop_assert!(errors.is_empty());

                let quantized = MONEY.quantize(value);
                prop_assert_eq!(quantized.scale(), 2);
                prop_assert_eq!(quantized, value);
            }
        }
    }
}
