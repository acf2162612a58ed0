/*
[INPUT]:  Decoded JSON objects
[OUTPUT]: Field-named records with lazily coerced field access
[POS]:    Data layer - response entity model
[UPDATE]: When field access or coercion semantics change
*/

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::coerce::coerce_str;

/// Field value as seen through [`Record::field`]
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// Numeric or currency string, coerced
    Decimal(Decimal),
    /// Any other string
    Text(&'a str),
    /// Numbers, booleans, arrays and objects as decoded
    Json(&'a Value),
}

impl FieldValue<'_> {
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One decoded API entity
///
/// Field coercion happens on every [`Record::field`] call and is not cached;
/// the underlying JSON is never modified by reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from any JSON value; non-objects give an empty record
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Field access with numeric coercion
    ///
    /// Returns `None` for absent and null fields.
    ///
    /// Coercion is bounded by [`Decimal`]: 96-bit mantissa, about 28
    /// significant digits. Integers past that range stay
    /// [`FieldValue::Text`] with the original string. Excess fractional
    /// digits are rounded. The raw value is always available via
    /// [`Record::get`].
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match self.0.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(match coerce_str(s) {
                Some(decimal) => FieldValue::Decimal(decimal),
                None => FieldValue::Text(s),
            }),
            other => Some(FieldValue::Json(other)),
        }
    }

    /// Coerced decimal, if the field holds a numeric string or a JSON number
    pub fn decimal(&self, name: &str) -> Option<Decimal> {
        match self.field(name)? {
            FieldValue::Decimal(d) => Some(d),
            FieldValue::Json(Value::Number(n)) => n.to_string().parse().ok(),
            _ => None,
        }
    }

    /// Raw string value without coercion
    pub fn str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Raw JSON value without coercion
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn sample() -> Record {
        Record::from_value(json!({
            "text": "test 123",
            "decimal": "123456.789",
            "btc": "฿ 1.23456789",
            "usd": "$ 1,234,567.89",
            "amount": "1,234.56",
            "greeting": "hello",
            "size": "0.01",
            "count": 7,
            "settled": true,
            "missing": null
        }))
    }

    #[test]
    fn test_text_is_not_coerced() {
        let record = sample();
        assert_eq!(record.field("text"), Some(FieldValue::Text("test 123")));
        assert_eq!(record.field("greeting"), Some(FieldValue::Text("hello")));
    }

    #[test]
    fn test_numeric_and_currency_strings_become_decimals() {
        let record = sample();
        assert_eq!(record.decimal("decimal"), Some(Decimal::from_str("123456.789").unwrap()));
        assert_eq!(record.decimal("btc"), Some(Decimal::from_str("1.23456789").unwrap()));
        assert_eq!(record.decimal("usd"), Some(Decimal::from_str("1234567.89").unwrap()));
    }

    #[test]
    fn test_coercion_is_idempotent_and_leaves_data_alone() {
        let record = sample();
        let first = record.field("amount");
        let second = record.field("amount");
        assert_eq!(first, second);
        assert_eq!(first, Some(FieldValue::Decimal(Decimal::from_str("1234.56").unwrap())));
        assert_eq!(record.get("amount"), Some(&json!("1,234.56")));
    }

    #[test]
    fn test_integer_beyond_decimal_range_stays_text() {
        let huge = "123456789012345678901234567890123456";
        let record = Record::from_value(json!({ "big": huge }));
        assert_eq!(record.field("big"), Some(FieldValue::Text(huge)));
        assert_eq!(record.decimal("big"), None);
        assert_eq!(record.get("big"), Some(&json!(huge)));
    }

    #[test]
    fn test_size_field_does_not_collide_with_len() {
        let record = sample();
        assert_eq!(record.decimal("size"), Some(Decimal::from_str("0.01").unwrap()));
        assert_eq!(record.len(), 10);
    }

    #[test]
    fn test_non_string_values_and_nulls() {
        let record = sample();
        assert_eq!(record.field("count"), Some(FieldValue::Json(&json!(7))));
        assert_eq!(record.decimal("count"), Some(Decimal::from(7)));
        assert_eq!(record.field("settled"), Some(FieldValue::Json(&json!(true))));
        assert_eq!(record.field("missing"), None);
        assert_eq!(record.field("absent"), None);
        assert!(record.contains_key("missing"));
    }

    #[test]
    fn test_non_object_values_become_empty_records() {
        assert!(Record::from_value(json!("")).is_empty());
        assert!(Record::from_value(json!([1, 2])).is_empty());
    }
}
