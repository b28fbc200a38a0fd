//! Upstream exchange-rate API.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, instrument};

use super::errors::CurrencyError;

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Rates from `base` to each of `symbols` (all available when empty).
    async fn latest_rates(&self, base: &str, symbols: &[String]) -> Result<BTreeMap<String, Decimal>, CurrencyError>;

    /// End-of-day rates from `base` on `date`.
    async fn historical_rates(
        &self,
        base: &str,
        date: NaiveDate,
        symbols: &[String],
    ) -> Result<BTreeMap<String, Decimal>, CurrencyError>;

    /// End-of-day rates from `base` for every day in `start..=end`.
    async fn range_rates(
        &self,
        base: &str,
        start: NaiveDate,
        end: NaiveDate,
        symbols: &[String],
    ) -> Result<BTreeMap<NaiveDate, BTreeMap<String, Decimal>>, CurrencyError>;

    async fn latest_rate(&self, from: &str, to: &str) -> Result<Decimal, CurrencyError> {
        let rates = self.latest_rates(from, &[to.to_string()]).await?;
        rates
            .get(to)
            .copied()
            .ok_or_else(|| CurrencyError::Upstream(format!("no rate for {from} to {to} in response")))
    }

    /// Cheap reachability probe used by the status endpoint.
    async fn ping(&self) -> Result<(), CurrencyError> {
        self.latest_rate("USD", "EUR").await.map(|_| ())
    }
}

/// currencyapi.com v3 client.
pub struct CurrencyApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CurrencyApiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CurrencyError> {
        let client = common::upstream::build_client(timeout)?;
        Ok(Self { client, base_url: base_url.into(), api_key: api_key.into() })
    }

    pub fn from_config(cfg: &configs::CurrencyConfig) -> Result<Self, CurrencyError> {
        Self::new(cfg.api_url.clone(), cfg.api_key.clone(), Duration::from_secs(cfg.request_timeout_secs))
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn fetch(
        &self,
        endpoint: &str,
        base: &str,
        symbols: &[String],
        extra: &[(&str, String)],
    ) -> Result<Value, CurrencyError> {
        if !self.has_key() {
            return Err(CurrencyError::NotConfigured);
        }
        let url = format!("{}/{}", self.base_url, endpoint);
        let currencies = symbols.join(",");
        let mut query = vec![("base_currency", base)];
        if !currencies.is_empty() {
            query.push(("currencies", currencies.as_str()));
        }
        for (k, v) in extra {
            query.push((*k, v.as_str()));
        }
        Ok(common::upstream::get_json(&self.client, &url, &query, &[("apikey", self.api_key.as_str())]).await?)
    }
}

/// Extract `{"data": {"EUR": {"code": "EUR", "value": 0.92}}}` into code → rate.
pub fn parse_latest(body: &Value) -> Result<BTreeMap<String, Decimal>, CurrencyError> {
    let data = body
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| CurrencyError::Upstream("response has no data object".into()))?;
    parse_rates(data)
}

fn parse_rates(
    data: &serde_json::Map<String, Value>,
) -> Result<BTreeMap<String, Decimal>, CurrencyError> {
    let mut out = BTreeMap::new();
    for (code, entry) in data {
        let value = entry
            .get("value")
            .and_then(Value::as_f64)
            .and_then(Decimal::from_f64)
            .ok_or_else(|| CurrencyError::Upstream(format!("invalid value for {code}")))?;
        out.insert(code.to_uppercase(), value);
    }
    Ok(out)
}

/// Extract a range response into day → code → rate. currencyapi returns
/// `{"data": [{"datetime": "2024-05-01T23:59:59Z", "currencies": {..}}]}`;
/// an object keyed by date is accepted too.
pub fn parse_range(
    body: &Value,
) -> Result<BTreeMap<NaiveDate, BTreeMap<String, Decimal>>, CurrencyError> {
    let day = |raw: &str| {
        raw.get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .ok_or_else(|| CurrencyError::Upstream(format!("invalid date in range response: {raw}")))
    };
    let mut out = BTreeMap::new();
    match body.get("data") {
        Some(Value::Array(days)) => {
            for entry in days {
                let date = entry.get("datetime").and_then(Value::as_str).map(day).transpose()?;
                let rates = entry.get("currencies").and_then(Value::as_object);
                match (date, rates) {
                    (Some(date), Some(rates)) => {
                        out.insert(date, parse_rates(rates)?);
                    }
                    _ => return Err(CurrencyError::Upstream("range entry without datetime or currencies".into())),
                }
            }
        }
        Some(Value::Object(days)) => {
            for (raw, rates) in days {
                let rates = rates
                    .as_object()
                    .ok_or_else(|| CurrencyError::Upstream(format!("invalid rates for {raw}")))?;
                out.insert(day(raw)?, parse_rates(rates)?);
            }
        }
        _ => return Err(CurrencyError::Upstream("response has no data object".into())),
    }
    Ok(out)
}

#[async_trait]
impl RateProvider for CurrencyApiClient {
    #[instrument(skip(self), fields(base = %base))]
    async fn latest_rates(
        &self,
        base: &str,
        symbols: &[String],
    ) -> Result<BTreeMap<String, Decimal>, CurrencyError> {
        let body = self.fetch("latest", base, symbols, &[]).await?;
        let rates = parse_latest(&body)?;
        debug!(count = rates.len(), "fetched latest rates");
        Ok(rates)
    }

    #[instrument(skip(self, symbols), fields(base = %base, date = %date))]
    async fn historical_rates(
        &self,
        base: &str,
        date: NaiveDate,
        symbols: &[String],
    ) -> Result<BTreeMap<String, Decimal>, CurrencyError> {
        let body = self.fetch("historical", base, symbols, &[("date", date.to_string())]).await?;
        parse_latest(&body)
    }

    #[instrument(skip(self, symbols), fields(base = %base, start = %start, end = %end))]
    async fn range_rates(
        &self,
        base: &str,
        start: NaiveDate,
        end: NaiveDate,
        symbols: &[String],
    ) -> Result<BTreeMap<NaiveDate, BTreeMap<String, Decimal>>, CurrencyError> {
        let window = [
            ("datetime_start", format!("{start}T00:00:00Z")),
            ("datetime_end", format!("{end}T23:59:59Z")),
        ];
        let body = self.fetch("range", base, symbols, &window).await?;
        let days = parse_range(&body)?;
        debug!(days = days.len(), "fetched range rates");
        Ok(days)
    }
}

/// Fixed-rate provider for tests.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    pub struct StaticRateProvider {
        rates: HashMap<(String, String), Decimal>,
        pub calls: AtomicUsize,
        pub failing: AtomicBool,
    }

    impl StaticRateProvider {
        pub fn with_rate(mut self, from: &str, to: &str, rate: Decimal) -> Self {
            self.rates.insert((from.to_string(), to.to_string()), rate);
            self
        }

        pub fn fail(&self, on: bool) {
            self.failing.store(on, Ordering::SeqCst);
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateProvider for StaticRateProvider {
        async fn latest_rates(
            &self,
            base: &str,
            symbols: &[String],
        ) -> Result<BTreeMap<String, Decimal>, CurrencyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(CurrencyError::Upstream("connection refused".into()));
            }
            Ok(self
                .rates
                .iter()
                .filter(|((f, t), _)| f == base && (symbols.is_empty() || symbols.contains(t)))
                .map(|((_, t), r)| (t.clone(), *r))
                .collect())
        }

        async fn historical_rates(
            &self,
            base: &str,
            _date: NaiveDate,
            symbols: &[String],
        ) -> Result<BTreeMap<String, Decimal>, CurrencyError> {
            self.latest_rates(base, symbols).await
        }

        async fn range_rates(
            &self,
            base: &str,
            start: NaiveDate,
            end: NaiveDate,
            symbols: &[String],
        ) -> Result<BTreeMap<NaiveDate, BTreeMap<String, Decimal>>, CurrencyError> {
            let rates = self.latest_rates(base, symbols).await?;
            Ok(start.iter_days().take_while(|d| *d <= end).map(|d| (d, rates.clone())).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_currencyapi_shape() {
        let body = json!({
            "meta": {"last_updated_at": "2024-05-01T23:59:59Z"},
            "data": {
                "USD": {"code": "USD", "value": 0.0077},
                "EUR": {"code": "EUR", "value": 0.0071}
            }
        });
        let rates = parse_latest(&body).unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates["USD"], "0.0077".parse::<Decimal>().unwrap());
    }

    #[test]
    fn missing_data_is_upstream_error() {
        let err = parse_latest(&json!({"message": "Invalid authentication credentials"})).unwrap_err();
        assert!(matches!(err, CurrencyError::Upstream(_)));
    }

    #[test]
    fn parses_range_list_and_object_shapes() {
        let listed = json!({"data": [
            {"datetime": "2024-05-01T23:59:59Z", "currencies": {"USD": {"code": "USD", "value": 0.0075}}},
            {"datetime": "2024-05-02T23:59:59Z", "currencies": {"USD": {"code": "USD", "value": 0.0076}}}
        ]});
        let days = parse_range(&listed).unwrap();
        assert_eq!(days.len(), 2);
        let may2 = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        assert_eq!(days[&may2]["USD"], "0.0076".parse::<Decimal>().unwrap());

        let keyed = json!({"data": {"2024-05-01": {"EUR": {"code": "EUR", "value": 0.0071}}}});
        assert_eq!(parse_range(&keyed).unwrap().len(), 1);

        let bad = json!({"data": [{"datetime": "yesterday", "currencies": {}}]});
        assert!(matches!(parse_range(&bad), Err(CurrencyError::Upstream(_))));
    }

    #[tokio::test]
    async fn client_without_key_is_not_configured() {
        let c = CurrencyApiClient::new("http://127.0.0.1:9", "", Duration::from_secs(1)).unwrap();
        let err = c.latest_rate("KES", "USD").await.unwrap_err();
        assert!(matches!(err, CurrencyError::NotConfigured));
    }
}
