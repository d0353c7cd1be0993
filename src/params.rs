use crate::error::{AppError, Result};
use serde::Deserialize;

pub type QueryPairs = Vec<(&'static str, String)>;

fn default_adults() -> u32 {
    1
}

fn default_hotel_radius() -> u32 {
    50
}

fn default_activity_radius() -> u32 {
    20
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidRequest(format!("{field} is required")));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlightSearchParams {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub return_date: Option<String>,
    #[serde(default = "default_adults")]
    pub adults: u32,
    pub max_price: Option<u32>,
    /// Display names for the route header; the IATA codes are used when absent.
    pub origin_name: Option<String>,
    pub destination_name: Option<String>,
}

impl FlightSearchParams {
    pub fn validate(&self) -> Result<()> {
        require("origin", &self.origin)?;
        require("destination", &self.destination)?;
        require("departure_date", &self.departure_date)
    }

    pub fn query(&self) -> QueryPairs {
        let mut query = vec![
            ("originLocationCode", self.origin.clone()),
            ("destinationLocationCode", self.destination.clone()),
            ("departureDate", self.departure_date.clone()),
            ("adults", self.adults.to_string()),
        ];
        if let Some(return_date) = self.return_date.as_ref().filter(|d| !d.is_empty()) {
            query.push(("returnDate", return_date.clone()));
        }
        if let Some(max_price) = self.max_price {
            query.push(("maxPrice", max_price.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InspirationParams {
    pub origin: String,
    pub max_price: Option<u32>,
    pub departure_date: Option<String>,
}

impl InspirationParams {
    pub fn validate(&self) -> Result<()> {
        require("origin", &self.origin)
    }

    pub fn query(&self) -> QueryPairs {
        let mut query = vec![("origin", self.origin.clone())];
        if let Some(max_price) = self.max_price {
            query.push(("maxPrice", max_price.to_string()));
        }
        if let Some(departure_date) = &self.departure_date {
            query.push(("departureDate", departure_date.clone()));
        }
        query
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotelSearchParams {
    pub city_code: String,
    pub check_in: String,
    pub check_out: String,
    #[serde(default = "default_adults")]
    pub adults: u32,
    #[serde(default = "default_hotel_radius")]
    pub radius: u32,
    pub price_range: Option<String>,
}

impl HotelSearchParams {
    pub fn validate(&self) -> Result<()> {
        require("city_code", &self.city_code)?;
        require("check_in", &self.check_in)?;
        require("check_out", &self.check_out)
    }

    pub fn query(&self) -> QueryPairs {
        let mut query = vec![
            ("cityCode", self.city_code.clone()),
            ("checkInDate", self.check_in.clone()),
            ("checkOutDate", self.check_out.clone()),
            ("adults", self.adults.to_string()),
            ("radius", self.radius.to_string()),
        ];
        if let Some(price_range) = &self.price_range {
            query.push(("priceRange", price_range.clone()));
        }
        query
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivitySearchParams {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_activity_radius")]
    pub radius: u32,
}

impl ActivitySearchParams {
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude)
        {
            return Err(AppError::InvalidRequest(
                "latitude/longitude out of range".to_string(),
            ));
        }
        Ok(())
    }

    pub fn query(&self) -> QueryPairs {
        vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("radius", self.radius.to_string()),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationSearchParams {
    pub keyword: String,
}

impl LocationSearchParams {
    pub fn validate(&self) -> Result<()> {
        require("keyword", &self.keyword)
    }

    pub fn query(&self) -> QueryPairs {
        vec![
            ("keyword", self.keyword.clone()),
            ("subType", "AIRPORT,CITY".to_string()),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheapestDatesParams {
    pub origin: String,
    pub destination: String,
    /// A single date or a `start,end` range, passed through as-is.
    pub departure_date: String,
}

impl CheapestDatesParams {
    pub fn validate(&self) -> Result<()> {
        require("origin", &self.origin)?;
        require("destination", &self.destination)?;
        require("departure_date", &self.departure_date)
    }

    pub fn query(&self) -> QueryPairs {
        vec![
            ("origin", self.origin.clone()),
            ("destination", self.destination.clone()),
            ("departureDate", self.departure_date.clone()),
        ]
    }
}
