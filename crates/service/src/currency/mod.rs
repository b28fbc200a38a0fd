//! Currency conversion: TTL rate cache, upstream rate provider, converter
//! and report revenue conversion.

pub mod cache;
pub mod converter;
pub mod errors;
pub mod provider;
pub mod revenue;

pub use cache::ExchangeRateCache;
pub use converter::{Conversion, CurrencyConverter, HistoricalRates, RangeRates, RateQuote, RateSource};
pub use errors::CurrencyError;
pub use provider::{CurrencyApiClient, RateProvider};

use rust_decimal::{Decimal, RoundingStrategy};

/// Monetary amounts are reported with two decimals, halves rounded away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `amount * rate` rounded to cents, rejecting products outside `Decimal`'s range.
pub fn apply_rate(amount: Decimal, rate: Decimal) -> Result<Decimal, CurrencyError> {
    amount
        .checked_mul(rate)
        .map(round_money)
        .ok_or_else(|| CurrencyError::Validation("amount too large".into()))
}

/// Running total that fails instead of overflowing.
pub fn add_money(total: Decimal, amount: Decimal) -> Result<Decimal, CurrencyError> {
    total
        .checked_add(amount)
        .ok_or_else(|| CurrencyError::Validation("amount too large".into()))
}
