//! Record mapping
//!
//! Turns raw JSON:API records (`{"id": ..., "attributes": {...}}`) into
//! [`Route`] and [`Stop`] values. Decoding never fails: every attribute is read
//! leniently, so a missing key, an explicit `null` or a value of the wrong JSON
//! type all decode as "absent", and the `From` conversions below substitute the
//! documented default. Unknown attributes are ignored.

use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use serde_json::Value;

use crate::models::{Route, RouteType, Stop};

/// Decode a field, treating anything that does not fit `T` as absent
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

pub(crate) fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// One raw JSON:API resource object
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, bound = "A: DeserializeOwned + Default")]
pub struct Record<A> {
    /// Resource id, empty when missing
    #[serde(deserialize_with = "lenient_or_default")]
    pub id: String,
    /// Typed attributes
    #[serde(deserialize_with = "lenient_or_default")]
    pub attributes: A,
}

impl<A> Record<A>
where
    A: DeserializeOwned + Default,
{
    /// Decode a record from an arbitrary JSON value
    ///
    /// Anything that is not an object (including `null`) yields an empty record.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_default()
    }
}

/// Route attributes as sent by the API
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RouteAttributes {
    #[serde(deserialize_with = "lenient")]
    pub color: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub text_color: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub long_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub sort_order: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub direction_destinations: Option<Vec<Value>>,
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub route_type: Option<i64>,
}

/// Stop attributes as sent by the API
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StopAttributes {
    #[serde(deserialize_with = "lenient")]
    pub address: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub platform_name: Option<String>,
}

/// An entity that can be requested from a JSON:API endpoint
pub trait Resource: Sized {
    /// Attribute payload of the raw record
    type Attributes: DeserializeOwned + Default;

    /// Resource type name used in `fields[...]`
    const KIND: &'static str;

    /// Attributes to request; kept minimal to bound the payload size
    const FIELDS: &'static [&'static str];

    /// The `fields[<kind>]` query parameter for this resource
    fn fields_param() -> (String, String) {
        (format!("fields[{}]", Self::KIND), Self::FIELDS.join(","))
    }

    /// Map a decoded record to the entity
    fn from_record(record: Record<Self::Attributes>) -> Self;

    /// Map a raw JSON value straight to the entity
    fn from_json(value: Value) -> Self {
        Self::from_record(Record::from_value(value))
    }
}

impl Resource for Route {
    type Attributes = RouteAttributes;

    const KIND: &'static str = "route";
    const FIELDS: &'static [&'static str] = &[
        "color",
        "text_color",
        "long_name",
        "sort_order",
        "type",
        "direction_destinations",
    ];

    fn from_record(record: Record<RouteAttributes>) -> Self {
        Self::from(record)
    }
}

impl Resource for Stop {
    type Attributes = StopAttributes;

    const KIND: &'static str = "stop";
    const FIELDS: &'static [&'static str] =
        &["address", "latitude", "longitude", "name", "platform_name"];

    fn from_record(record: Record<StopAttributes>) -> Self {
        Self::from(record)
    }
}

impl From<Record<RouteAttributes>> for Route {
    fn from(record: Record<RouteAttributes>) -> Self {
        let Record { id, attributes } = record;

        // Keep one slot per direction so indexes still line up with direction ids.
        let destinations = attributes
            .direction_destinations
            .unwrap_or_default()
            .into_iter()
            .map(|value| match value {
                Value::String(destination) => destination,
                _ => String::new(),
            })
            .collect();

        Self {
            route_id: id,
            color: attributes
                .color
                .unwrap_or_else(|| Self::DEFAULT_COLOR.to_string()),
            text_color: attributes
                .text_color
                .unwrap_or_else(|| Self::DEFAULT_TEXT_COLOR.to_string()),
            long_name: attributes.long_name,
            sort_order: attributes.sort_order.unwrap_or(0),
            destinations,
            route_type: attributes
                .route_type
                .map_or(RouteType::Unknown, RouteType::from_code),
        }
    }
}

impl From<Record<StopAttributes>> for Stop {
    fn from(record: Record<StopAttributes>) -> Self {
        let Record { id, attributes } = record;
        Self {
            stop_id: id,
            address: attributes.address.unwrap_or_default(),
            latitude: attributes.latitude,
            longitude: attributes.longitude,
            name: attributes.name,
            platform_name: attributes.platform_name.unwrap_or_default(),
        }
    }
}
