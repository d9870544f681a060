//! MBTA data models
//!
//! Typed representations of routes and stops as returned by the MBTA v3 API.
//! Both are plain value objects: built once from a response record and owned by
//! whoever asked for them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mode of transport served by a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RouteType {
    /// Light rail and streetcars (code 0)
    LightRail,
    /// Subway (code 1)
    HeavyRail,
    /// Commuter rail (code 2)
    CommuterRail,
    /// Bus (code 3)
    Bus,
    /// Ferry (code 4)
    Ferry,
    /// Any missing or unrecognised code
    #[default]
    Unknown,
}

impl RouteType {
    /// Decode the numeric route type used by the API
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            0 => Self::LightRail,
            1 => Self::HeavyRail,
            2 => Self::CommuterRail,
            3 => Self::Bus,
            4 => Self::Ferry,
            _ => Self::Unknown,
        }
    }

    /// Numeric code for this route type, `None` for [`RouteType::Unknown`]
    #[must_use]
    pub const fn code(self) -> Option<u8> {
        match self {
            Self::LightRail => Some(0),
            Self::HeavyRail => Some(1),
            Self::CommuterRail => Some(2),
            Self::Bus => Some(3),
            Self::Ferry => Some(4),
            Self::Unknown => None,
        }
    }

    /// Human readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LightRail => "Light Rail",
            Self::HeavyRail => "Heavy Rail",
            Self::CommuterRail => "Commuter Rail",
            Self::Bus => "Bus",
            Self::Ferry => "Ferry",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A transit line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Route identifier (e.g. "Red", "39")
    pub route_id: String,
    /// Background color as a hex string without `#`
    pub color: String,
    /// Text color as a hex string without `#`
    pub text_color: String,
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    /// Display ordering
    pub sort_order: i64,
    /// Terminal destination per direction
    pub destinations: Vec<String>,
    /// Mode of transport
    pub route_type: RouteType,
}

impl Route {
    /// Default background color
    pub const DEFAULT_COLOR: &'static str = "000000";
    /// Default text color
    pub const DEFAULT_TEXT_COLOR: &'static str = "FFFFFF";

    /// Whether this route was built from an empty record
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_id.is_empty()
    }

    /// Name to show to users, falling back to the id
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.long_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.route_id)
    }
}

/// A stop or station served by a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Stop identifier
    pub stop_id: String,
    /// Street address, empty when unknown
    pub address: String,
    /// Latitude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Platform description, empty when the stop has none
    pub platform_name: String,
}

impl Stop {
    /// Coordinates, when both are known
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}
