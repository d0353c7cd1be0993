//! Provider payloads → normalized records.
//!
//! Every function here is pure and total: an absent or empty `data` array is
//! a zero-result outcome, missing optional fields become `None`/empty, and a
//! record that cannot be read at all is logged and skipped without affecting
//! its neighbours.

use crate::models::{
    Activity, ActivitySearchResult, CheapestDate, CheapestDatesResult, FlightSearchResult,
    HotelSearchResult, HotelSummary, InspirationDestination, InspirationResult, Location,
    LocationSearchResult, NormalizedFlightOffer, NormalizedItinerary, NormalizedSegment,
    SegmentEndpoint,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("{resource} record {index} is not an object")]
    NotAnObject { resource: &'static str, index: usize },

    #[error("{resource} record {index} is malformed: {source}")]
    Malformed {
        resource: &'static str,
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Accepts strings and numbers, anything else reads as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Explicit `null` reads the same as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawPrice {
    #[serde(deserialize_with = "lenient_string")]
    total: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    currency: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    amount: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    currency_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawEndpoint {
    #[serde(deserialize_with = "lenient_string")]
    iata_code: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    at: Option<String>,
}

impl From<RawEndpoint> for SegmentEndpoint {
    fn from(raw: RawEndpoint) -> Self {
        SegmentEndpoint {
            airport: raw.iata_code,
            time: raw.at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawSegment {
    #[serde(deserialize_with = "null_as_default")]
    departure: RawEndpoint,
    #[serde(deserialize_with = "null_as_default")]
    arrival: RawEndpoint,
    #[serde(deserialize_with = "lenient_string")]
    carrier_code: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    number: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    duration: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawItinerary {
    #[serde(deserialize_with = "lenient_string")]
    duration: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    segments: Vec<RawSegment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFlightOffer {
    #[serde(deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    price: RawPrice,
    #[serde(deserialize_with = "null_as_default")]
    itineraries: Vec<RawItinerary>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawHotel {
    #[serde(deserialize_with = "lenient_string")]
    hotel_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    rating: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawHotelOffer {
    #[serde(deserialize_with = "null_as_default")]
    price: RawPrice,
    #[serde(deserialize_with = "lenient_string")]
    check_in_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    check_out_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawHotelListing {
    #[serde(deserialize_with = "null_as_default")]
    hotel: RawHotel,
    #[serde(deserialize_with = "null_as_default")]
    offers: Vec<RawHotelOffer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPicture {
    #[serde(deserialize_with = "lenient_string")]
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawActivity {
    #[serde(deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    short_description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    price: RawPrice,
    #[serde(deserialize_with = "lenient_string")]
    rating: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pictures: Vec<RawPicture>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawAddress {
    #[serde(deserialize_with = "lenient_string")]
    city_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    country_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawLocation {
    #[serde(deserialize_with = "lenient_string")]
    iata_code: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    sub_type: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    address: RawAddress,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawDestination {
    #[serde(deserialize_with = "lenient_string")]
    destination: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    price: RawPrice,
    #[serde(deserialize_with = "lenient_string")]
    departure_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    return_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDate {
    #[serde(deserialize_with = "lenient_string")]
    date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    price: RawPrice,
}

/// Reads each entry of `response.data` as `R`, skipping entries that fail.
fn read_records<'a, R, T>(
    response: &'a Value,
    resource: &'static str,
    convert: impl Fn(R) -> T,
) -> Vec<T>
where
    R: Deserialize<'a>,
{
    let records = match response.get("data") {
        Some(Value::Array(records)) => records,
        Some(Value::Null) | None => {
            debug!("No {} data in provider response", resource);
            return Vec::new();
        }
        Some(_) => {
            warn!("Provider {} data is not a list, treating as empty", resource);
            return Vec::new();
        }
    };

    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| match read_record::<R>(record, resource, index) {
            Ok(raw) => Some(convert(raw)),
            Err(e) => {
                warn!("Skipping {}", e);
                None
            }
        })
        .collect()
}

fn read_record<'a, R>(
    record: &'a Value,
    resource: &'static str,
    index: usize,
) -> Result<R, RecordError>
where
    R: Deserialize<'a>,
{
    if !record.is_object() {
        return Err(RecordError::NotAnObject { resource, index });
    }
    R::deserialize(record).map_err(|source| RecordError::Malformed {
        resource,
        index,
        source,
    })
}

pub fn flights(response: &Value) -> FlightSearchResult {
    let flights = read_records(response, "flight offer", |offer: RawFlightOffer| {
        NormalizedFlightOffer {
            id: offer.id,
            price: offer.price.total,
            currency: offer.price.currency,
            itineraries: offer
                .itineraries
                .into_iter()
                .map(|itinerary| NormalizedItinerary {
                    duration: itinerary.duration,
                    segments: itinerary
                        .segments
                        .into_iter()
                        .map(|segment| NormalizedSegment {
                            departure: segment.departure.into(),
                            arrival: segment.arrival.into(),
                            airline: segment.carrier_code.unwrap_or_default(),
                            flight_number: segment.number.unwrap_or_default(),
                            duration: segment.duration,
                        })
                        .collect(),
                })
                .collect(),
        }
    });

    for (i, flight) in flights.iter().enumerate() {
        if flight.price.is_none() {
            warn!("Flight offer {} has no price", i + 1);
        }
        if flight.itineraries.is_empty() {
            warn!("Flight offer {} has no itineraries", i + 1);
        }
    }

    info!("Normalized {} flight offers", flights.len());
    FlightSearchResult {
        count: flights.len(),
        flights,
    }
}

/// Hotel price and stay dates come from the first offer of each listing.
pub fn hotels(response: &Value) -> HotelSearchResult {
    let hotels = read_records(response, "hotel offer", |listing: RawHotelListing| {
        let first_offer = listing.offers.into_iter().next().unwrap_or_default();
        HotelSummary {
            hotel_id: listing.hotel.hotel_id,
            name: listing.hotel.name,
            rating: listing.hotel.rating,
            price: first_offer.price.total,
            currency: first_offer.price.currency,
            check_in: first_offer.check_in_date,
            check_out: first_offer.check_out_date,
        }
    });

    info!("Normalized {} hotels", hotels.len());
    HotelSearchResult {
        count: hotels.len(),
        hotels,
    }
}

pub fn activities(response: &Value) -> ActivitySearchResult {
    let activities = read_records(response, "activity", |activity: RawActivity| Activity {
        id: activity.id,
        name: activity.name,
        description: activity.short_description,
        price: activity.price.amount,
        currency: activity.price.currency_code,
        rating: activity.rating,
        pictures: activity
            .pictures
            .into_iter()
            .filter_map(|picture| picture.url)
            .collect(),
    });

    info!("Normalized {} activities", activities.len());
    ActivitySearchResult {
        count: activities.len(),
        activities,
    }
}

pub fn locations(response: &Value) -> LocationSearchResult {
    let locations = read_records(response, "location", |location: RawLocation| Location {
        code: location.iata_code,
        name: location.name,
        kind: location.sub_type,
        city: location.address.city_name,
        country: location.address.country_name,
    });

    info!("Normalized {} locations", locations.len());
    LocationSearchResult {
        count: locations.len(),
        locations,
    }
}

pub fn inspiration(response: &Value) -> InspirationResult {
    let destinations = read_records(response, "destination", |dest: RawDestination| {
        InspirationDestination {
            destination: dest.destination,
            price: dest.price.total,
            currency: dest.price.currency,
            departure_date: dest.departure_date,
            return_date: dest.return_date,
        }
    });

    info!("Normalized {} inspiration destinations", destinations.len());
    InspirationResult {
        count: destinations.len(),
        destinations,
    }
}

pub fn cheapest_dates(response: &Value) -> CheapestDatesResult {
    let dates = read_records(response, "flight date", |date: RawDate| CheapestDate {
        date: date.date,
        price: date.price.total,
        currency: date.price.currency,
    });

    info!("Normalized {} cheapest dates", dates.len());
    CheapestDatesResult {
        count: dates.len(),
        dates,
    }
}

/// IATA code of the first AIRPORT-type location, if any.
pub fn first_airport_code(result: &LocationSearchResult) -> Option<String> {
    result
        .locations
        .iter()
        .find(|location| location.kind.as_deref() == Some("AIRPORT"))
        .and_then(|location| location.code.clone())
}
