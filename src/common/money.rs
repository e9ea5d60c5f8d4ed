// src/common/money.rs

use rust_decimal::{Decimal, RoundingStrategy};

use crate::common::error::AppError;

/// Amounts are stored as NUMERIC(12, 2).
pub const MONEY_SCALE: u32 = 2;

/// Largest value a NUMERIC(12, 2) column holds: 9 999 999 999.99.
pub const MAX_MONEY: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, MONEY_SCALE);

/// Normalises a value to exactly two decimal places ("250" -> "250.00").
pub fn to_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Rejects amounts with more than two decimal places instead of rounding them.
fn ensure_scale(field: &str, value: Decimal) -> Result<(), AppError> {
    if value.normalize().scale() > MONEY_SCALE {
        return Err(AppError::Validation(format!(
            "{field} must have at most {MONEY_SCALE} decimal places"
        )));
    }
    Ok(())
}

/// Rejects amounts the money columns cannot store.
pub fn ensure_storable(field: &str, value: Decimal) -> Result<(), AppError> {
    if value.abs() > MAX_MONEY {
        return Err(AppError::Validation(format!("{field} cannot exceed {MAX_MONEY}")));
    }
    Ok(())
}

pub fn ensure_non_negative(field: &str, value: Decimal) -> Result<Decimal, AppError> {
    ensure_scale(field, value)?;
    ensure_storable(field, value)?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::Validation(format!("{field} cannot be negative")));
    }
    Ok(to_money(value))
}

pub fn ensure_positive(field: &str, value: Decimal) -> Result<Decimal, AppError> {
    ensure_scale(field, value)?;
    ensure_storable(field, value)?;
    if value <= Decimal::ZERO {
        return Err(AppError::Validation(format!("{field} must be greater than zero")));
    }
    Ok(to_money(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_is_always_two_places() {
        assert_eq!(to_money(dec!(250)).to_string(), "250.00");
        assert_eq!(to_money(dec!(10.5)).to_string(), "10.50");
        assert_eq!(to_money(dec!(0.005)).to_string(), "0.01");
    }

    #[test]
    fn negative_amounts_fail_closed() {
        assert!(matches!(
            ensure_non_negative("discount", dec!(-0.01)),
            Err(AppError::Validation(_))
        ));
        assert_eq!(ensure_non_negative("discount", dec!(0)).unwrap().to_string(), "0.00");
    }

    #[test]
    fn positive_rejects_zero() {
        assert!(ensure_positive("amount", dec!(0)).is_err());
        assert_eq!(ensure_positive("amount", dec!(1.5)).unwrap(), dec!(1.50));
    }

    #[test]
    fn amounts_are_bounded_by_the_column_size() {
        assert_eq!(MAX_MONEY.to_string(), "9999999999.99");
        assert!(ensure_positive("amount", dec!(9999999999.99)).is_ok());
        assert!(matches!(
            ensure_positive("amount", dec!(10000000000.00)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            ensure_non_negative("discount", dec!(100000000000)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn sub_cent_precision_is_rejected() {
        assert!(ensure_positive("amount", dec!(10.001)).is_err());
        // trailing zeros are fine
        assert!(ensure_positive("amount", dec!(10.100)).is_ok());
    }
}
