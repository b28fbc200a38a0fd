use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use models::enums::{CurrencyCode, ParseLoose};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::cache::ExchangeRateCache;
use super::errors::CurrencyError;
use super::provider::RateProvider;
use super::apply_rate;
use crate::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Same currency on both sides
    Identity,
    Cache,
    Live,
    /// Expired cache entry served because upstream was unavailable or rate-limited
    Stale,
    LocalDatabase,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateQuote {
    pub rate: Decimal,
    pub source: RateSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
    pub rate: Decimal,
    pub converted: Decimal,
    pub source: RateSource,
}

/// Validates and upper-cases a currency code.
/// End-of-day rates for one past day.
#[derive(Debug, Clone, Serialize)]
pub struct HistoricalRates {
    pub date: NaiveDate,
    pub base_currency: String,
    pub rates: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeRates {
    pub base_currency: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub dates: BTreeMap<NaiveDate, BTreeMap<String, Decimal>>,
}

/// Parse a `YYYY-MM-DD` path segment that must not lie in the future.
pub fn past_date(raw: &str) -> Result<NaiveDate, CurrencyError> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CurrencyError::Validation("Invalid date format. Please use YYYY-MM-DD.".into()))?;
    if date > Utc::now().date_naive() {
        return Err(CurrencyError::Validation("Exchange rates are not available for future dates".into()));
    }
    Ok(date)
}

pub fn normalize_code(code: &str) -> Result<CurrencyCode, CurrencyError> {
    CurrencyCode::parse_loose(code).ok_or_else(|| CurrencyError::UnknownCurrency(code.trim().to_uppercase()))
}

#[derive(Clone)]
pub struct CurrencyConverter {
    cache: Arc<ExchangeRateCache>,
    provider: Arc<dyn RateProvider>,
}

impl CurrencyConverter {
    pub fn new(cache: Arc<ExchangeRateCache>, provider: Arc<dyn RateProvider>) -> Self {
        Self { cache, provider }
    }

    pub fn cache(&self) -> &ExchangeRateCache {
        &self.cache
    }

    pub fn provider(&self) -> &dyn RateProvider {
        self.provider.as_ref()
    }

    /// Rate from `from` to `to`: identity, then fresh cache, then upstream
    /// (subject to the per-pair window), then the stale cache entry.
    #[instrument(skip(self))]
    pub async fn rate(&self, from: &str, to: &str) -> Result<RateQuote, CurrencyError> {
        let from = normalize_code(from)?.as_db_str();
        let to = normalize_code(to)?.as_db_str();
        if from == to {
            return Ok(RateQuote { rate: Decimal::ONE, source: RateSource::Identity });
        }
        let key = ExchangeRateCache::key(&from, &to);
        if let Some(rate) = self.cache.get(&key) {
            return Ok(RateQuote { rate, source: RateSource::Cache });
        }

        if !self.cache.can_call_upstream(&key) {
            metrics::RATE_LIMITED_TOTAL.inc();
            return match self.cache.get_stale(&key) {
                Some(rate) => {
                    warn!(%key, "upstream window closed; serving stale rate");
                    Ok(RateQuote { rate, source: RateSource::Stale })
                }
                None => Err(CurrencyError::RateLimited(key)),
            };
        }

        self.cache.mark_upstream_call(&key);
        metrics::RATE_UPSTREAM_CALLS_TOTAL.inc();
        match self.provider.latest_rate(&from, &to).await {
            Ok(rate) => {
                self.cache.set(&key, rate);
                info!(%key, %rate, "rate refreshed from upstream");
                Ok(RateQuote { rate, source: RateSource::Live })
            }
            Err(e) => {
                metrics::RATE_UPSTREAM_ERRORS_TOTAL.inc();
                match self.cache.get_stale(&key) {
                    Some(rate) => {
                        warn!(%key, error = %e, "upstream failed; serving stale rate");
                        Ok(RateQuote { rate, source: RateSource::Stale })
                    }
                    None => Err(e),
                }
            }
        }
    }

    pub async fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Result<Conversion, CurrencyError> {
        if amount < Decimal::ZERO {
            return Err(CurrencyError::Validation("amount must not be negative".into()));
        }
        let quote = self.rate(from, to).await?;
        Ok(Conversion {
            from: from.trim().to_uppercase(),
            to: to.trim().to_uppercase(),
            amount,
            rate: quote.rate,
            converted: apply_rate(amount, quote.rate)?,
            source: quote.source,
        })
    }

    /// Ticket prices are stored in Kenyan shillings; this is the common display path.
    pub async fn convert_ksh_to_target_currency(
        &self,
        amount: Decimal,
        target: &str,
    ) -> Result<Conversion, CurrencyError> {
        self.convert(amount, "KES", target).await
    }

    /// Rates from `base` to every supported currency. Pairs still fresh in the
    /// cache are not requested again.
    #[instrument(skip(self))]
    pub async fn latest(&self, base: &str) -> Result<BTreeMap<String, RateQuote>, CurrencyError> {
        let base = normalize_code(base)?.as_db_str();
        let mut out = BTreeMap::new();
        let mut missing = Vec::new();
        for code in <CurrencyCode as sea_orm::Iterable>::iter() {
            let code = code.as_db_str();
            if code == base {
                continue;
            }
            match self.cache.get(&ExchangeRateCache::key(&base, &code)) {
                Some(rate) => {
                    out.insert(code, RateQuote { rate, source: RateSource::Cache });
                }
                None => missing.push(code),
            }
        }
        if missing.is_empty() {
            return Ok(out);
        }

        let batch_key = ExchangeRateCache::key(&base, "*");
        let fallback = |out: &mut BTreeMap<String, RateQuote>, missing: &[String]| {
            for code in missing {
                if let Some(rate) = self.cache.get_stale(&ExchangeRateCache::key(&base, code)) {
                    out.insert(code.clone(), RateQuote { rate, source: RateSource::Stale });
                }
            }
        };
        if !self.cache.can_call_upstream(&batch_key) {
            metrics::RATE_LIMITED_TOTAL.inc();
            fallback(&mut out, &missing);
            if out.is_empty() {
                return Err(CurrencyError::RateLimited(batch_key));
            }
            return Ok(out);
        }

        self.cache.mark_upstream_call(&batch_key);
        metrics::RATE_UPSTREAM_CALLS_TOTAL.inc();
        match self.provider.latest_rates(&base, &missing).await {
            Ok(rates) => {
                for (code, rate) in rates {
                    if !missing.contains(&code) {
                        continue;
                    }
                    self.cache.set(&ExchangeRateCache::key(&base, &code), rate);
                    out.insert(code, RateQuote { rate, source: RateSource::Live });
                }
                Ok(out)
            }
            Err(e) => {
                metrics::RATE_UPSTREAM_ERRORS_TOTAL.inc();
                fallback(&mut out, &missing);
                if out.is_empty() { Err(e) } else { Ok(out) }
            }
        }
    }

    /// Run one upstream call for `key` under the per-key call window.
    async fn guarded<T, F>(&self, key: String, call: F) -> Result<T, CurrencyError>
    where
        F: std::future::Future<Output = Result<T, CurrencyError>>,
    {
        if !self.cache.can_call_upstream(&key) {
            metrics::RATE_LIMITED_TOTAL.inc();
            return Err(CurrencyError::RateLimited(key));
        }
        self.cache.mark_upstream_call(&key);
        metrics::RATE_UPSTREAM_CALLS_TOTAL.inc();
        call.await.inspect_err(|_| metrics::RATE_UPSTREAM_ERRORS_TOTAL.inc())
    }

    #[instrument(skip(self))]
    pub async fn historical(
        &self,
        base: &str,
        date: NaiveDate,
    ) -> Result<HistoricalRates, CurrencyError> {
        let base = normalize_code(base)?.as_db_str();
        let key = ExchangeRateCache::key(&base, &format!("*@{date}"));
        let rates = self.guarded(key, self.provider.historical_rates(&base, date, &[])).await?;
        if rates.is_empty() {
            return Err(CurrencyError::NotFound(format!("No historical rates found for {base} on {date}")));
        }
        Ok(HistoricalRates { date, base_currency: base, rates })
    }

    #[instrument(skip(self))]
    pub async fn range(
        &self,
        base: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RangeRates, CurrencyError> {
        if start > end {
            return Err(CurrencyError::Validation("start date must not be after end date".into()));
        }
        let base = normalize_code(base)?.as_db_str();
        let key = ExchangeRateCache::key(&base, &format!("*@{start}..{end}"));
        let dates = self.guarded(key, self.provider.range_rates(&base, start, end, &[])).await?;
        if dates.is_empty() {
            return Err(CurrencyError::NotFound(format!("No range rates found for {base} from {start} to {end}")));
        }
        Ok(RangeRates { base_currency: base, start_date: start, end_date: end, dates })
    }
}

/// Rate from the newest active `exchange_rate` row for the pair.
pub async fn local_rate(
    db: &DatabaseConnection,
    from: &str,
    to: &str,
) -> Result<Decimal, CurrencyError> {
    let from_code = normalize_code(from)?.as_db_str();
    let to_code = normalize_code(to)?.as_db_str();
    if from_code == to_code {
        return Ok(Decimal::ONE);
    }
    let from_row = models::currency::find_by_code(db, &from_code)
        .await?
        .ok_or_else(|| CurrencyError::UnknownCurrency(from_code.clone()))?;
    let to_row = models::currency::find_by_code(db, &to_code)
        .await?
        .ok_or_else(|| CurrencyError::UnknownCurrency(to_code.clone()))?;
    let rate = models::exchange_rate::latest_active(db, from_row.id, to_row.id)
        .await?
        .ok_or(CurrencyError::MissingLocalRate { from: from_code, to: to_code })?;
    Ok(rate.rate)
}

pub async fn convert_with_local_rates(
    db: &DatabaseConnection,
    amount: Decimal,
    from: &str,
    to: &str,
) -> Result<Conversion, CurrencyError> {
    let rate = local_rate(db, from, to).await?;
    Ok(Conversion {
        from: from.trim().to_uppercase(),
        to: to.trim().to_uppercase(),
        amount,
        rate,
        converted: apply_rate(amount, rate)?,
        source: RateSource::LocalDatabase,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::provider::mock::StaticRateProvider;
    use std::time::Duration;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn converter(window_secs: u64) -> (CurrencyConverter, Arc<StaticRateProvider>) {
        let provider = Arc::new(
            StaticRateProvider::default()
                .with_rate("KES", "USD", d("0.0077"))
                .with_rate("KES", "EUR", d("0.0071"))
                .with_rate("USD", "KES", d("129.5")),
        );
        let cache = Arc::new(ExchangeRateCache::new(Duration::from_secs(3600), Duration::from_secs(window_secs)));
        (CurrencyConverter::new(cache, provider.clone()), provider)
    }

    #[tokio::test]
    async fn same_currency_is_identity_without_upstream() {
        let (c, p) = converter(10);
        let q = c.rate("usd", "USD").await.unwrap();
        assert_eq!(q, RateQuote { rate: Decimal::ONE, source: RateSource::Identity });
        assert_eq!(p.call_count(), 0);
    }

    #[tokio::test]
    async fn second_lookup_served_from_cache() {
        let (c, p) = converter(10);
        assert_eq!(c.rate("KES", "USD").await.unwrap().source, RateSource::Live);
        assert_eq!(c.rate("KES", "USD").await.unwrap().source, RateSource::Cache);
        assert_eq!(p.call_count(), 1);
    }

    #[tokio::test]
    async fn ksh_conversion_rounds_to_cents() {
        let (c, _) = converter(10);
        let conv = c.convert_ksh_to_target_currency(d("1500"), "usd").await.unwrap();
        assert_eq!(conv.converted, d("11.55"));
        assert_eq!(conv.from, "KES");
        assert_eq!(conv.to, "USD");
    }

    #[tokio::test]
    async fn unknown_currency_rejected() {
        let (c, _) = converter(10);
        let err = c.convert(d("1"), "KES", "XYZ").await.unwrap_err();
        assert_eq!(err.to_string(), "Currency 'XYZ' not found in system");
    }

    #[tokio::test]
    async fn window_refusal_without_cache_is_rate_limited() {
        let (c, p) = converter(10);
        p.fail(true);
        assert!(matches!(c.rate("KES", "USD").await, Err(CurrencyError::Upstream(_))));
        // the failed call still consumed the window
        assert!(matches!(c.rate("KES", "USD").await, Err(CurrencyError::RateLimited(_))));
        assert_eq!(p.call_count(), 1);
    }

    #[tokio::test]
    async fn expired_entry_served_stale_when_upstream_fails() {
        let provider = Arc::new(StaticRateProvider::default());
        let cache = Arc::new(ExchangeRateCache::new(Duration::from_secs(0), Duration::from_secs(0)));
        cache.set("KES_USD", d("0.0075"));
        let c = CurrencyConverter::new(cache, provider.clone());
        provider.fail(true);
        let q = c.rate("KES", "USD").await.unwrap();
        assert_eq!(q, RateQuote { rate: d("0.0075"), source: RateSource::Stale });
    }

    #[tokio::test]
    async fn closed_window_serves_expired_entry_as_stale() {
        let provider = Arc::new(StaticRateProvider::default().with_rate("KES", "USD", d("0.0077")));
        let cache = Arc::new(ExchangeRateCache::new(Duration::from_secs(0), Duration::from_secs(10)));
        let c = CurrencyConverter::new(cache, provider.clone());
        assert_eq!(c.rate("KES", "USD").await.unwrap().source, RateSource::Live);
        let q = c.rate("KES", "USD").await.unwrap();
        assert_eq!(q, RateQuote { rate: d("0.0077"), source: RateSource::Stale });
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn oversized_amount_is_a_validation_error() {
        let (c, _) = converter(10);
        let err = c.convert(Decimal::MAX, "USD", "KES").await.unwrap_err();
        assert!(matches!(err, CurrencyError::Validation(ref m) if m == "amount too large"));
    }

    #[tokio::test]
    async fn negative_amount_rejected() {
        let (c, _) = converter(10);
        assert!(matches!(c.convert(d("-1"), "KES", "USD").await, Err(CurrencyError::Validation(_))));
    }

    #[tokio::test]
    async fn latest_reuses_cached_pairs() {
        let (c, p) = converter(10);
        c.rate("KES", "USD").await.unwrap();
        let rates = c.latest("KES").await.unwrap();
        assert_eq!(rates["USD"].source, RateSource::Cache);
        assert_eq!(rates["EUR"].source, RateSource::Live);
        assert_eq!(p.call_count(), 2);
    }

    #[tokio::test]
    async fn historical_and_range_lookups() {
        let (c, p) = converter(10);
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let h = c.historical("kes", day).await.unwrap();
        assert_eq!(h.base_currency, "KES");
        assert_eq!(h.rates["USD"], d("0.0077"));
        // same day again inside the call window
        assert!(matches!(c.historical("KES", day).await, Err(CurrencyError::RateLimited(_))));

        let end = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        let r = c.range("KES", day, end).await.unwrap();
        assert_eq!(r.dates.len(), 3);
        assert!(matches!(c.range("KES", end, day).await, Err(CurrencyError::Validation(_))));
        assert_eq!(p.call_count(), 2);

        let err = c.historical("GBP", day).await.unwrap_err();
        assert!(matches!(err, CurrencyError::NotFound(_)));
    }

    #[test]
    fn past_date_rules() {
        assert!(past_date("2024-05-01").is_ok());
        assert!(matches!(past_date("01/05/2024"), Err(CurrencyError::Validation(_))));
        let tomorrow = (Utc::now() + chrono::Duration::days(1)).format("%Y-%m-%d").to_string();
        assert!(matches!(past_date(&tomorrow), Err(CurrencyError::Validation(_))));
    }
}
