//! Normalized flights → dashboard presentation model.
//!
//! Nothing here fails: malformed timestamps and durations fall back to the
//! raw provider string, and an offer that cannot be priced is skipped.

use crate::{
    directory::CarrierDirectory,
    models::{
        DashboardModel, FlightCard, FlightSearchResult, NormalizedFlightOffer,
        NormalizedItinerary, PriceTrendPoint, RouteSummary, TripContext,
    },
};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use tracing::{debug, info, warn};

/// Trend base price when no offer carried a usable price.
pub const FALLBACK_BASE_PRICE: f64 = 500.0;

const OPTIMAL_CHEAPEST: usize = 3;
const DIRECT_FLIGHT_WINDOW: usize = 5;

static ISO_DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?").expect("valid duration pattern"));

pub fn format_for_dashboard(
    flights: &FlightSearchResult,
    trip: &TripContext,
    directory: &CarrierDirectory,
) -> DashboardModel {
    let mut outbound_flights = Vec::new();
    let mut return_flights = Vec::new();
    let mut all_prices = Vec::new();

    for offer in &flights.flights {
        let Some(price) = offer_price(offer) else {
            warn!(
                "Skipping flight offer {:?}: missing or non-numeric price {:?}",
                offer.id, offer.price
            );
            continue;
        };
        all_prices.push(price);

        if let Some(itinerary) = offer.itineraries.first() {
            if let Some(card) = format_single_flight(offer, itinerary, 0, price, directory) {
                outbound_flights.push(card);
            }
        }

        // A second itinerary only counts as a return leg when one was asked for.
        if trip.return_date.is_some() {
            if let Some(itinerary) = offer.itineraries.get(1) {
                if let Some(card) = format_single_flight(offer, itinerary, 1, price, directory) {
                    return_flights.push(card);
                }
            }
        }
    }

    let price_data = price_trend(&all_prices, &trip.departure_date);

    mark_best_deals(&mut outbound_flights);
    mark_best_deals(&mut return_flights);

    info!(
        "Formatted dashboard: {} outbound, {} return flights",
        outbound_flights.len(),
        return_flights.len()
    );

    DashboardModel {
        has_real_data: true,
        route: RouteSummary {
            departure: trip.origin_city.clone(),
            destination: trip.destination_city.clone(),
            departure_code: trip.origin_code.clone(),
            destination_code: trip.destination_code.clone(),
            date: format_date_display(&trip.departure_date),
            departure_display: format_date_display(&trip.departure_date),
            return_display: trip.return_date.as_deref().map(format_date_display),
        },
        outbound_flights,
        return_flights,
        price_data,
    }
}

fn offer_price(offer: &NormalizedFlightOffer) -> Option<f64> {
    offer
        .price
        .as_deref()
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|price| price.is_finite())
}

/// One card per itinerary, summarised from first departure to last arrival.
fn format_single_flight(
    offer: &NormalizedFlightOffer,
    itinerary: &NormalizedItinerary,
    itinerary_index: usize,
    price: f64,
    directory: &CarrierDirectory,
) -> Option<FlightCard> {
    let (Some(first_segment), Some(last_segment)) =
        (itinerary.segments.first(), itinerary.segments.last())
    else {
        warn!("No segments in itinerary {} of offer {:?}", itinerary_index, offer.id);
        return None;
    };

    let airline_code = first_segment.airline.as_str();
    let flight_number = first_segment.flight_number.as_str();

    let flight_number_display = match (airline_code.is_empty(), flight_number.is_empty()) {
        (false, false) => format!("{airline_code} {flight_number}"),
        (false, true) => airline_code.to_string(),
        _ => "Unknown".to_string(),
    };

    let airline = directory.airline_name(airline_code);
    let booking_link = directory.booking_link(&airline, &flight_number_display.replace(' ', ""));

    let card = FlightCard {
        id: format!(
            "{}_{}",
            offer.id.as_deref().unwrap_or_default(),
            itinerary_index
        ),
        airline,
        flight_number: flight_number_display,
        departure: format_time_display(first_segment.departure.time.as_deref().unwrap_or_default()),
        arrival: format_time_display(last_segment.arrival.time.as_deref().unwrap_or_default()),
        duration: format_duration(itinerary.duration.as_deref().unwrap_or_default()),
        price,
        stops: itinerary.stops(),
        is_optimal: false,
        departure_airport: first_segment.departure.airport.clone().unwrap_or_default(),
        arrival_airport: last_segment.arrival.airport.clone().unwrap_or_default(),
        booking_link,
    };

    debug!(
        "Formatted flight: {} {} - {} to {}, price={}, stops={}",
        card.airline, card.flight_number, card.departure, card.arrival, card.price, card.stops
    );
    Some(card)
}

/// Sorts ascending by price (ties keep their order), then flags the three
/// cheapest plus any direct flight among the five cheapest.
pub fn mark_best_deals(flights: &mut [FlightCard]) {
    flights.sort_by(|a, b| a.price.total_cmp(&b.price));

    for flight in flights.iter_mut().take(OPTIMAL_CHEAPEST) {
        flight.is_optimal = true;
    }
    for flight in flights.iter_mut().take(DIRECT_FLIGHT_WINDOW) {
        if flight.stops == 0 {
            flight.is_optimal = true;
        }
    }
}

/// Seven synthetic points, three days either side of departure.
pub fn price_trend(prices: &[f64], departure_date: &str) -> Vec<PriceTrendPoint> {
    let base_price = prices
        .iter()
        .copied()
        .reduce(f64::min)
        .unwrap_or(FALLBACK_BASE_PRICE);

    let base_date = NaiveDate::parse_from_str(departure_date, "%Y-%m-%d")
        .unwrap_or_else(|_| Utc::now().date_naive());

    (-3i64..=3)
        .map(|offset| {
            let date = base_date
                .checked_add_signed(Duration::days(offset))
                .unwrap_or(base_date);

            let price = match offset.cmp(&0) {
                Ordering::Less => base_price * (1.0 + offset.unsigned_abs() as f64 * 0.05),
                Ordering::Equal => base_price,
                Ordering::Greater => base_price * (1.0 + offset as f64 * 0.03),
            };

            PriceTrendPoint {
                date: date.format("%b %d").to_string(),
                price: round_cents(price),
                optimal: round_cents(base_price),
            }
        })
        .collect()
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `hh:mm AM/PM` in the timestamp's own wall-clock time.
pub fn format_time_display(raw: &str) -> String {
    if raw.is_empty() {
        return "N/A".to_string();
    }

    if let Some(parsed) = parse_timestamp(raw) {
        return parsed.format("%I:%M %p").to_string();
    }
    warn!("Failed to parse time '{}', trying date-hour-minute prefix", raw);

    match raw
        .get(..16)
        .and_then(|prefix| NaiveDateTime::parse_from_str(prefix, "%Y-%m-%dT%H:%M").ok())
    {
        Some(parsed) => parsed.format("%I:%M %p").to_string(),
        None => {
            warn!("Failed to parse time '{}', showing it verbatim", raw);
            raw.to_string()
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let has_offset = raw.ends_with('Z') || raw.contains('+') || raw.matches('-').count() > 2;

    if has_offset {
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z"))
            .ok()
            .map(|dt| dt.naive_local())
    } else {
        // No offset: the provider means UTC, which is also the wall-clock shown.
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
            .ok()
    }
}

/// `PT3H30M` → `3h 30m`. Unmatched input is returned verbatim.
pub fn format_duration(raw: &str) -> String {
    if raw.is_empty() {
        return "N/A".to_string();
    }

    match ISO_DURATION.captures(raw) {
        Some(caps) => {
            let hours = caps.get(1).map_or("0", |m| m.as_str());
            let minutes = caps.get(2).map_or("0", |m| m.as_str());
            format!("{hours}h {minutes}m")
        }
        None => raw.to_string(),
    }
}

/// `2024-12-10` → `Dec 10, 2024`.
pub fn format_date_display(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.format("%b %d, %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
