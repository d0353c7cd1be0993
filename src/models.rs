//! Normalized records produced from provider payloads, and the dashboard
//! presentation model built from normalized flights.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentEndpoint {
    pub airport: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSegment {
    pub departure: SegmentEndpoint,
    pub arrival: SegmentEndpoint,
    /// Carrier code, empty when the provider omitted it.
    pub airline: String,
    pub flight_number: String,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItinerary {
    pub duration: Option<String>,
    pub segments: Vec<NormalizedSegment>,
}

impl NormalizedItinerary {
    pub fn stops(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFlightOffer {
    pub id: Option<String>,
    /// Decimal amount exactly as the provider sent it.
    pub price: Option<String>,
    pub currency: Option<String>,
    pub itineraries: Vec<NormalizedItinerary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightSearchResult {
    pub flights: Vec<NormalizedFlightOffer>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelSummary {
    pub hotel_id: Option<String>,
    pub name: Option<String>,
    pub rating: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelSearchResult {
    pub hotels: Vec<HotelSummary>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub rating: Option<String>,
    pub pictures: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivitySearchResult {
    pub activities: Vec<Activity>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub code: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationSearchResult {
    pub locations: Vec<Location>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InspirationDestination {
    pub destination: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub departure_date: Option<String>,
    pub return_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InspirationResult {
    pub destinations: Vec<InspirationDestination>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheapestDate {
    pub date: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheapestDatesResult {
    pub dates: Vec<CheapestDate>,
    pub count: usize,
}

/// What the traveller asked for; drives the route header and return-leg handling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripContext {
    pub origin_city: String,
    pub destination_city: String,
    pub origin_code: String,
    pub destination_code: String,
    pub departure_date: String,
    pub return_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightCard {
    pub id: String,
    pub airline: String,
    pub flight_number: String,
    pub departure: String,
    pub arrival: String,
    pub duration: String,
    pub price: f64,
    pub stops: usize,
    pub is_optimal: bool,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub booking_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTrendPoint {
    pub date: String,
    pub price: f64,
    pub optimal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub departure: String,
    pub destination: String,
    #[serde(rename = "departureCode")]
    pub departure_code: String,
    #[serde(rename = "destinationCode")]
    pub destination_code: String,
    pub date: String,
    pub departure_display: String,
    pub return_display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardModel {
    pub has_real_data: bool,
    pub route: RouteSummary,
    pub outbound_flights: Vec<FlightCard>,
    pub return_flights: Vec<FlightCard>,
    pub price_data: Vec<PriceTrendPoint>,
}
