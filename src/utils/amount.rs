//! Random swap amounts and conversion to token base units.

use alloy::primitives::utils::parse_units;
use alloy::primitives::U256;
use rand::Rng;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::AmountBand;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount band {min}-{max} is empty")]
    EmptyBand { min: Decimal, max: Decimal },
    #[error("amount band {min}-{max} cannot be expressed with {precision} decimal places")]
    PrecisionTooLarge { min: Decimal, max: Decimal, precision: u32 },
    #[error("cannot scale {amount} to {decimals} decimals: {reason}")]
    Scale { amount: Decimal, decimals: u8, reason: String },
}

/// Draw a uniformly random amount from `band`, on the grid of its display precision.
///
/// Bounds are rounded inward to that grid, so the result always lies inside
/// `[min, max]` and carries exactly `display_precision` decimal places.
pub fn sample_amount<R: Rng + ?Sized>(band: &AmountBand, rng: &mut R) -> Result<Decimal, AmountError> {
    let precision = band.display_precision;
    let too_large = || AmountError::PrecisionTooLarge {
        min: band.min,
        max: band.max,
        precision,
    };

    let factor = Decimal::from_i128_with_scale(10_i128.checked_pow(precision).ok_or_else(too_large)?, 0);
    let low = (band.min * factor).ceil();
    let high = (band.max * factor).floor();
    if low > high {
        return Err(AmountError::EmptyBand { min: band.min, max: band.max });
    }

    let low_steps = low.mantissa() / 10_i128.pow(low.scale());
    let high_steps = high.mantissa() / 10_i128.pow(high.scale());
    let steps = rng.gen_range(low_steps..=high_steps);

    Ok(Decimal::from_i128_with_scale(steps, precision))
}

/// Scale a human-readable amount to integer base units at `decimals` precision.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<U256, AmountError> {
    let scale_error = |reason: String| AmountError::Scale { amount, decimals, reason };

    if amount.is_sign_negative() {
        return Err(scale_error("negative amount".to_string()));
    }
    if amount.scale() > decimals as u32 {
        return Err(scale_error("more fractional digits than the token supports".to_string()));
    }

    let units = parse_units(&amount.normalize().to_string(), decimals)
        .map_err(|e| scale_error(e.to_string()))?;
    Ok(units.get_absolute())
}
