//! Wire types for the Routes API `computeRouteMatrix` method.
//!
//! See: <https://developers.google.com/maps/documentation/routes/reference/rest/v2/TopLevel/computeRouteMatrix>

use holiday_core::{BatchResponse, RouteMatrixEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Travel mode requested for every matrix.
pub const TRAVEL_MODE: &str = "DRIVE";

/// Response fields requested through `X-Goog-FieldMask`.
pub const FIELD_MASK: &str = "originIndex,destinationIndex,duration,distanceMeters,status,condition";

/// Request body for one origin and a batch of destinations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixRequest<'a> {
    pub origins: Vec<MatrixWaypoint<'a>>,
    pub destinations: Vec<MatrixWaypoint<'a>>,
    pub travel_mode: &'static str,
}

impl<'a> MatrixRequest<'a> {
    pub fn new(origin: &'a str, destinations: &'a [String]) -> Self {
        Self {
            origins: vec![MatrixWaypoint::address(origin)],
            destinations: destinations
                .iter()
                .map(String::as_str)
                .map(MatrixWaypoint::address)
                .collect(),
            travel_mode: TRAVEL_MODE,
        }
    }
}

/// Waypoint given as a free-text address.
#[derive(Debug, Serialize)]
pub struct MatrixWaypoint<'a> {
    pub waypoint: Address<'a>,
}

impl<'a> MatrixWaypoint<'a> {
    const fn address(address: &'a str) -> Self {
        Self {
            waypoint: Address { address },
        }
    }
}

/// Address wrapper inside a waypoint.
#[derive(Debug, Serialize)]
pub struct Address<'a> {
    pub address: &'a str,
}

/// One element of the response array.
///
/// The service omits zero-valued fields, so every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixElement {
    pub origin_index: Option<usize>,
    pub destination_index: Option<usize>,
    pub distance_meters: Option<u32>,
    pub duration: Option<String>,
    pub condition: Option<String>,
}

impl From<MatrixElement> for RouteMatrixEntry {
    fn from(element: MatrixElement) -> Self {
        Self {
            origin_index: element.origin_index,
            destination_index: element.destination_index,
            distance_meters: element.distance_meters,
            duration: element.duration,
            condition: element.condition,
        }
    }
}

/// Decode a response body, counting elements that fail to decode.
///
/// # Errors
/// Returns the JSON error when the body is not an array.
pub fn decode_elements(body: &[u8]) -> Result<BatchResponse, serde_json::Error> {
    let raw: Vec<Value> = serde_json::from_slice(body)?;
    let mut response = BatchResponse::default();
    for value in raw {
        match serde_json::from_value::<MatrixElement>(value) {
            Ok(element) => response.entries.push(element.into()),
            Err(err) => {
                log::warn!("skipping undecodable route matrix element: {err}");
                response.malformed_entries += 1;
            }
        }
    }
    Ok(response)
}
