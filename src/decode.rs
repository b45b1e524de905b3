//! Decode strategies for turning a response body into a sequence of DTOs.
//!
//! Every endpoint returns a list of records. What differs is how the list is
//! encoded and how much structure a record may carry, so the client picks one
//! [`DecodeStrategy`] per endpoint and hands it to [`decode_sequence`].

use crate::legacy::{self, LegacyError};
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde_json::Value;
use std::fmt;

/// How a response body is turned into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeStrategy {
    /// JSON array of flat objects. A field the DTO declares that holds a
    /// collection of objects is rejected rather than silently dropped; fields
    /// the DTO does not declare are ignored.
    Plain,

    /// JSON array of objects that may embed collections of nested records.
    CollectionAware,

    /// Legacy `application/vnd.demo.dto` payload, read by [`crate::legacy`].
    Legacy,
}

impl DecodeStrategy {
    /// The `Accept` header value this strategy has to request, if any.
    pub fn accept(self) -> Option<&'static str> {
        match self {
            DecodeStrategy::Legacy => Some(legacy::MEDIA_TYPE),
            DecodeStrategy::Plain | DecodeStrategy::CollectionAware => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DecodeStrategy::Plain => "plain",
            DecodeStrategy::CollectionAware => "collection-aware",
            DecodeStrategy::Legacy => "legacy",
        }
    }
}

impl fmt::Display for DecodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a body could not be decoded.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    /// The body is not valid JSON, or does not match the record schema.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level value is not a list.
    #[error("expected a list of records, found {found}")]
    NotAList { found: &'static str },

    /// A record did not match the DTO schema.
    #[error("record {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The plain strategy met a field holding nested records.
    #[error("record {index}: field `{field}` holds nested records, which plain decoding does not support")]
    NestedCollection { index: usize, field: String },

    /// The legacy payload is malformed or uses an unsupported construct.
    #[error("legacy payload: {0}")]
    Legacy(#[from] LegacyError),
}

/// Decodes `body` into an ordered list of `T` using `strategy`.
///
/// # Examples
///
/// ```
/// use demo_api_client::decode::{decode_sequence, DecodeStrategy};
/// use demo_api_client::dto::UserV1;
///
/// let users: Vec<UserV1> = decode_sequence(
///     DecodeStrategy::Plain,
///     br#"[{"id": 1, "name": "Ada"}, {"id": 2, "name": "Linus"}]"#,
/// )
/// .unwrap();
///
/// assert_eq!(users.len(), 2);
/// assert_eq!(users[1].name, "Linus");
/// ```
pub fn decode_sequence<T>(strategy: DecodeStrategy, body: &[u8]) -> Result<Vec<T>, DecodeError>
where
    T: DeserializeOwned,
{
    match strategy {
        DecodeStrategy::Plain => decode_plain(body),
        DecodeStrategy::CollectionAware => Ok(serde_json::from_slice(body)?),
        DecodeStrategy::Legacy => decode_legacy(body),
    }
}

fn decode_plain<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, DecodeError> {
    let rows = match serde_json::from_slice::<Value>(body)? {
        Value::Array(rows) => rows,
        other => return Err(DecodeError::NotAList { found: json_kind(&other) }),
    };

    let declared = declared_fields::<T>();
    for (index, row) in rows.iter().enumerate() {
        if let Some(field) = nested_collection_field(row, declared) {
            return Err(DecodeError::NestedCollection {
                index,
                field: field.to_string(),
            });
        }
    }

    records_from(rows)
}

fn decode_legacy<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, DecodeError> {
    match legacy::parse(body)?.into_json() {
        Value::Array(rows) => records_from(rows),
        other => Err(DecodeError::NotAList { found: json_kind(&other) }),
    }
}

fn records_from<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, DecodeError> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::from_value(row).map_err(|source| DecodeError::Record { index, source })
        })
        .collect()
}

/// First field of `row` whose value is an array containing objects.
///
/// With `declared` set, only those fields count; anything else in the row is
/// ignored by the DTO anyway.
fn nested_collection_field<'a>(
    row: &'a Value,
    declared: Option<&[&str]>,
) -> Option<&'a str> {
    let Value::Object(fields) = row else {
        return None;
    };
    fields
        .iter()
        .filter(|(name, _)| declared.map_or(true, |declared| declared.contains(&name.as_str())))
        .find_map(|(name, value)| match value {
            Value::Array(items) if items.iter().any(Value::is_object) => Some(name.as_str()),
            _ => None,
        })
}

/// Wire names of the fields `T` reads, when `T` deserializes as a struct.
fn declared_fields<T: DeserializeOwned>() -> Option<&'static [&'static str]> {
    let mut fields = None;
    let _ = T::deserialize(FieldNames(&mut fields));
    fields
}

/// Deserializer that records the field list a struct asks for, then bails.
struct FieldNames<'a>(&'a mut Option<&'static [&'static str]>);

impl<'de> Deserializer<'de> for FieldNames<'_> {
    type Error = de::value::Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(de::Error::custom("not a struct"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        *self.0 = Some(fields);
        Err(de::Error::custom("field names captured"))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{ItemV1, UserV1, UserV4};

    const USERS_V4: &str = r#"[{
        "id": 7,
        "firstName": "Grace",
        "lastName": "Hopper",
        "email": "grace@example.com",
        "createdAt": "2024-01-02T03:04:05Z",
        "addresses": [
            {"street": "1 Navy Way", "city": "Arlington", "postalCode": "22201", "country": "US"}
        ],
        "roles": [
            {"name": "admin", "grantedAt": "2024-02-01T00:00:00Z"},
            {"name": "editor", "grantedAt": "2024-03-01T00:00:00Z"}
        ]
    }]"#;

    #[test]
    fn test_plain_keeps_order() {
        let users: Vec<UserV1> = decode_sequence(
            DecodeStrategy::Plain,
            br#"[{"id":3,"name":"c"},{"id":1,"name":"a"},{"id":2,"name":"b"}]"#,
        )
        .unwrap();

        let ids: Vec<u64> = users.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_empty_list() {
        let users: Vec<UserV1> = decode_sequence(DecodeStrategy::Plain, b"[]").unwrap();
        assert!(users.is_empty());
    }

    #[test]
    fn test_collection_aware_rehydrates_nested_records() {
        let users: Vec<UserV4> =
            decode_sequence(DecodeStrategy::CollectionAware, USERS_V4.as_bytes()).unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].addresses.len(), 1);
        assert_eq!(users[0].addresses[0].postal_code, "22201");
        assert_eq!(users[0].roles[1].name, "editor");
    }

    #[test]
    fn test_plain_rejects_nested_records() {
        let err =
            decode_sequence::<UserV4>(DecodeStrategy::Plain, USERS_V4.as_bytes()).unwrap_err();

        match err {
            DecodeError::NestedCollection { index, field } => {
                assert_eq!(index, 0);
                assert_eq!(field, "addresses");
            }
            other => panic!("expected NestedCollection, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_ignores_undeclared_nested_records() {
        let users: Vec<UserV1> = decode_sequence(
            DecodeStrategy::Plain,
            br#"[{"id":1,"name":"Ada","links":[{"rel":"self","href":"/users/1"}]}]"#,
        )
        .unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Ada");
    }

    #[test]
    fn test_declared_fields_use_wire_names() {
        assert_eq!(declared_fields::<UserV1>(), Some(&["id", "name"][..]));
        assert!(declared_fields::<UserV4>().unwrap().contains(&"createdAt"));
        assert_eq!(declared_fields::<Value>(), None);
    }

    #[test]
    fn test_plain_allows_scalar_lists() {
        #[derive(serde::Deserialize)]
        struct Tagged {
            tags: Vec<String>,
        }

        let rows: Vec<Tagged> =
            decode_sequence(DecodeStrategy::Plain, br#"[{"tags":["a","b"]}]"#).unwrap();
        assert_eq!(rows[0].tags, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let err =
            decode_sequence::<UserV1>(DecodeStrategy::Plain, br#"[{"id":1,"name":"a"},{"id":2}]"#)
                .unwrap_err();
        match err {
            DecodeError::Record { index, source } => {
                assert_eq!(index, 1);
                assert!(source.to_string().contains("missing field `name`"));
            }
            other => panic!("expected Record error, got {:?}", other),
        }

        let err = decode_sequence::<UserV4>(DecodeStrategy::CollectionAware, br#"[{"id":2}]"#)
            .unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_not_a_list() {
        let err = decode_sequence::<UserV1>(DecodeStrategy::Plain, br#"{"id":1,"name":"a"}"#)
            .unwrap_err();
        assert!(matches!(err, DecodeError::NotAList { found: "object" }));

        let err = decode_sequence::<ItemV1>(DecodeStrategy::Legacy, b"i:5;").unwrap_err();
        assert!(matches!(err, DecodeError::NotAList { found: "number" }));
    }

    #[test]
    fn test_malformed_json() {
        let err = decode_sequence::<UserV1>(DecodeStrategy::Plain, b"not json").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_legacy_items() {
        let payload = r#"a:1:{i:0;O:14:"Api\Dto\ItemV1":3:{s:2:"id";i:9;s:4:"name";s:4:"Pear";s:5:"price";i:3;}}"#;
        let items: Vec<ItemV1> =
            decode_sequence(DecodeStrategy::Legacy, payload.as_bytes()).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 9);
        assert_eq!(items[0].name, "Pear");
        assert_eq!(items[0].price, 3.0);
    }

    #[test]
    fn test_legacy_errors_surface() {
        let err = decode_sequence::<ItemV1>(DecodeStrategy::Legacy, b"a:1:{i:0;r:1;}").unwrap_err();
        assert!(matches!(err, DecodeError::Legacy(_)));
    }

    #[test]
    fn test_accept_header_only_for_legacy() {
        assert_eq!(DecodeStrategy::Legacy.accept(), Some("application/vnd.demo.dto"));
        assert_eq!(DecodeStrategy::Plain.accept(), None);
        assert_eq!(DecodeStrategy::CollectionAware.accept(), None);
    }
}
