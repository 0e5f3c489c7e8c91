//! Resource items
//!
//! A resource item is an opaque record with a key field and a
//! `ModifiedDate`. Typed resources implement [`Resource`]; [`Record`] covers
//! collections without a dedicated Rust type.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of a resource item. `0` is never a valid key.
pub type Key = i64;

/// Wire name of the key field unless a resource says otherwise
pub const DEFAULT_KEY_NAME: &str = "id";

/// An item of a backend resource collection
pub trait Resource: Serialize + DeserializeOwned + Send + Sync {
    /// Name of the key field on the wire
    const KEY_NAME: &'static str = DEFAULT_KEY_NAME;

    /// Key of this item, `None` before it has been persisted
    fn key(&self) -> Option<Key>;

    /// Whether the key field is set at all, even to a value [`Resource::key`]
    /// cannot use
    fn has_key(&self) -> bool {
        self.key().is_some()
    }
}

/// One page of a listed collection
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    /// `@odata.count`, present when the query asked for it
    pub count: Option<u64>,
    pub items: Vec<T>,
}

/// OData list envelope: `{ "@odata.count": n, "value": [...] }`
#[derive(Debug, Deserialize)]
pub(crate) struct ODataList<T> {
    #[serde(rename = "@odata.count", default)]
    pub count: Option<u64>,
    pub value: Vec<T>,
}

impl<T> From<ODataList<T>> for ListPage<T> {
    fn from(list: ODataList<T>) -> Self {
        Self {
            count: list.count,
            items: list.value,
        }
    }
}

/// Dynamic resource item
///
/// `ModifiedDate` is decoded into a date; every other field is kept as sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(
        rename = "ModifiedDate",
        default,
        with = "modified_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub modified_date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

impl Resource for Record {
    fn key(&self) -> Option<Key> {
        self.fields.get(Self::KEY_NAME).and_then(key_from_value)
    }

    fn has_key(&self) -> bool {
        !matches!(self.fields.get(Self::KEY_NAME), None | Some(Value::Null))
    }
}

/// Integral JSON numbers only; `5.0` is accepted as `5`
fn key_from_value(value: &Value) -> Option<Key> {
    if let Some(key) = value.as_i64() {
        return Some(key);
    }
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
        .map(|f| f as Key)
}

impl TryFrom<Value> for Record {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

/// Serde adapter for `ModifiedDate` fields
///
/// Accepts RFC 3339 timestamps, offset-less timestamps with a `T` or a space
/// separator (taken as UTC) and plain dates. Strings matching none of these
/// decode to `None` so that one bad item never fails a whole list. Use with
/// `#[serde(default, with = "...")]` on an `Option<DateTime<Utc>>`.
pub mod modified_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    /// Parse a date string as sent by OData backends
    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Some(naive) = NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => {
                let parsed = parse(&s);
                if parsed.is_none() {
                    tracing::warn!("Ignoring unparseable ModifiedDate {:?}", s);
                }
                Ok(parsed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_record_hydrates_modified_date() {
        let record: Record = serde_json::from_value(json!({
            "id": 7,
            "Name": "Chai",
            "ModifiedDate": "2024-03-01T10:15:00Z"
        }))
        .unwrap();

        assert_eq!(
            record.modified_date,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap())
        );
        assert_eq!(record.key(), Some(7));
        assert_eq!(record.get("Name"), Some(&json!("Chai")));
        assert!(record.get("ModifiedDate").is_none());
    }

    #[test]
    fn test_modified_date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        assert_eq!(modified_date::parse("2024-03-01T10:00:00+02:00"), Some(expected));
        assert_eq!(modified_date::parse("2024-03-01T08:00:00"), Some(expected));
        assert_eq!(modified_date::parse("2024-03-01T08:00:00.000"), Some(expected));
        assert_eq!(
            modified_date::parse("2024-03-01"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(modified_date::parse("2024-03-01 08:00:00"), Some(expected));
        assert_eq!(modified_date::parse("2024-03-01 08:00:00.250").map(|d| d.timestamp()), Some(expected.timestamp()));
        assert_eq!(modified_date::parse("yesterday"), None);
    }

    #[test]
    fn test_missing_or_null_date_is_none() {
        let record: Record = serde_json::from_value(json!({"id": 1})).unwrap();
        assert!(record.modified_date.is_none());

        let record: Record = serde_json::from_value(json!({"id": 1, "ModifiedDate": null})).unwrap();
        assert!(record.modified_date.is_none());
    }

    #[test]
    fn test_unparseable_date_decodes_to_none() {
        let record: Record = serde_json::from_value(json!({"id": 4, "ModifiedDate": "soon"})).unwrap();
        assert!(record.modified_date.is_none());
        assert!(record.get("ModifiedDate").is_none());
        assert_eq!(record.key(), Some(4));
    }

    #[test]
    fn test_record_without_key() {
        let record = Record::new().with("Name", "Tofu");
        assert_eq!(record.key(), None);
        assert!(!record.has_key());

        let record = Record::new().with("id", Value::Null);
        assert_eq!(record.key(), None);
        assert!(!record.has_key());
    }

    #[test]
    fn test_record_key_forms() {
        let record = Record::new().with("id", json!(5.0));
        assert_eq!(record.key(), Some(5));
        assert!(record.has_key());

        // Present but unusable: set, yet no key
        for value in [json!("5"), json!(5.5), json!({"a": 1}), json!(true)] {
            let record = Record::new().with("id", value);
            assert!(record.has_key());
            assert_eq!(record.key(), None);
        }
    }

    #[test]
    fn test_record_serializes_date_as_string() {
        let record = Record {
            modified_date: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            fields: Map::new(),
        }
        .with("id", 3);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"id": 3, "ModifiedDate": "2024-01-02T03:04:05+00:00"}));
    }

    #[test]
    fn test_list_envelope() {
        let list: ODataList<Record> = serde_json::from_value(json!({
            "@odata.context": "$metadata#Products",
            "@odata.count": 2,
            "value": [{"id": 1}, {"id": 2}]
        }))
        .unwrap();
        let page = ListPage::from(list);
        assert_eq!(page.count, Some(2));
        assert_eq!(page.items.iter().map(|r| r.key()).collect::<Vec<_>>(), vec![Some(1), Some(2)]);
    }
}
