//! Typed access to an action's `request_data` object.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::errors::ActionError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

pub struct Params<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Params<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { map: value.as_object() }
    }

    pub fn has(&self, key: &str) -> bool {
        self.map.is_some_and(|m| m.contains_key(key))
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.and_then(|m| m.get(key)).filter(|v| !v.is_null())
    }

    /// Non-blank string value.
    pub fn str(&self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.str(key).map(str::to_string)
    }

    /// Fails with `Missing required fields: a, b` listing every absent key.
    pub fn require(&self, keys: &[&str]) -> Result<(), ActionError> {
        let missing: Vec<&str> = keys.iter().copied().filter(|k| !self.is_present(k)).collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ActionError::invalid(format!("Missing required fields: {}", missing.join(", "))))
        }
    }

    fn is_present(&self, key: &str) -> bool {
        match self.get(key) {
            None => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(_) => true,
        }
    }

    pub fn uuid(&self, key: &str) -> Result<Option<Uuid>, ActionError> {
        match self.str(key) {
            None => Ok(None),
            Some(s) => Uuid::parse_str(s).map(Some).map_err(|_| ActionError::invalid(format!("Invalid {key}: {s}"))),
        }
    }

    pub fn decimal(&self, key: &str) -> Result<Option<Decimal>, ActionError> {
        let raw = match self.get(key) {
            None => return Ok(None),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(other) => return Err(ActionError::invalid(format!("Invalid {key}: {other}"))),
        };
        raw.parse::<Decimal>()
            .map(Some)
            .map_err(|_| ActionError::invalid(format!("Invalid {key}: {raw}")))
    }

    pub fn int(&self, key: &str) -> Result<Option<i32>, ActionError> {
        let parsed = match self.get(key) {
            None => return Ok(None),
            Some(Value::Number(n)) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
            Some(Value::String(s)) => s.trim().parse::<i32>().ok(),
            Some(_) => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| ActionError::invalid(format!("Invalid {key}")))
    }

    pub fn date(&self, key: &str) -> Result<Option<NaiveDate>, ActionError> {
        self.str(key)
            .map(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| bad_format(s, e)))
            .transpose()
    }

    pub fn time(&self, key: &str) -> Result<Option<NaiveTime>, ActionError> {
        self.str(key)
            .map(|s| NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(|e| bad_format(s, e)))
            .transpose()
    }

    /// String entries of an array value; other entries are skipped.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    }
}

fn bad_format(input: &str, e: chrono::ParseError) -> ActionError {
    ActionError::invalid(format!("Invalid date/time format: '{input}' ({e})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reports_all_missing_fields() {
        let v = json!({"name": "Gala", "description": "", "city": "Nairobi"});
        let err = Params::new(&v).require(&["name", "description", "date", "city"]).unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: description, date");
    }

    #[test]
    fn numbers_accept_strings() {
        let v = json!({"price": "1500.50", "quantity": 20, "bad": true});
        let p = Params::new(&v);
        assert_eq!(p.decimal("price").unwrap(), Some("1500.50".parse().unwrap()));
        assert_eq!(p.int("quantity").unwrap(), Some(20));
        assert!(p.int("bad").is_err());
        assert_eq!(p.decimal("missing").unwrap(), None);
    }

    #[test]
    fn date_and_time_formats() {
        let v = json!({"date": "2030-06-01", "start_time": "18:30", "end_time": "6pm"});
        let p = Params::new(&v);
        assert!(p.date("date").unwrap().is_some());
        assert!(p.time("start_time").unwrap().is_some());
        let err = p.time("end_time").unwrap_err();
        assert!(err.to_string().starts_with("Invalid date/time format"));
    }

    #[test]
    fn non_object_has_nothing() {
        let v = json!([1, 2]);
        let p = Params::new(&v);
        assert!(!p.has("name"));
        assert!(p.require(&["name"]).is_err());
    }
}
