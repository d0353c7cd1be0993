use crate::{
    dashboard,
    error::{AppError, Result},
    models::{
        ActivitySearchResult, CheapestDatesResult, DashboardModel, HotelSearchResult,
        InspirationResult, LocationSearchResult, TripContext,
    },
    params::{
        ActivitySearchParams, CheapestDatesParams, FlightSearchParams, HotelSearchParams,
        InspirationParams, LocationSearchParams,
    },
    AppState,
};
use axum::{
    extract::{FromRequestParts, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::info;

/// `Query` whose rejections render as the JSON error body.
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/flights/search", get(search_flights))
        .route("/flights/inspiration", get(flight_inspiration))
        .route("/flights/cheapest-dates", get(cheapest_dates))
        .route("/hotels/search", get(search_hotels))
        .route("/activities/search", get(search_activities))
        .route("/locations/search", get(search_locations))
        .route("/locations/airport-code", get(airport_code))
        .route("/health", get(health_check))
        .route("/", get(root_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Flight offers formatted for the dashboard.
pub async fn search_flights(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<FlightSearchParams>,
) -> Result<Json<DashboardModel>> {
    params.validate()?;
    info!(
        "Flight search {} -> {} on {} (return {:?})",
        params.origin, params.destination, params.departure_date, params.return_date
    );

    let flights = state.provider.search_flights(&params).await?;

    let trip = TripContext {
        origin_city: params
            .origin_name
            .clone()
            .unwrap_or_else(|| params.origin.clone()),
        destination_city: params
            .destination_name
            .clone()
            .unwrap_or_else(|| params.destination.clone()),
        origin_code: params.origin.clone(),
        destination_code: params.destination.clone(),
        departure_date: params.departure_date.clone(),
        return_date: params.return_date.clone().filter(|d| !d.is_empty()),
    };

    Ok(Json(dashboard::format_for_dashboard(
        &flights,
        &trip,
        &state.carriers,
    )))
}

pub async fn flight_inspiration(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<InspirationParams>,
) -> Result<Json<InspirationResult>> {
    params.validate()?;
    Ok(Json(state.provider.flight_inspiration(&params).await?))
}

pub async fn cheapest_dates(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CheapestDatesParams>,
) -> Result<Json<CheapestDatesResult>> {
    params.validate()?;
    Ok(Json(state.provider.cheapest_dates(&params).await?))
}

pub async fn search_hotels(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<HotelSearchParams>,
) -> Result<Json<HotelSearchResult>> {
    params.validate()?;
    Ok(Json(state.provider.search_hotels(&params).await?))
}

pub async fn search_activities(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ActivitySearchParams>,
) -> Result<Json<ActivitySearchResult>> {
    params.validate()?;
    Ok(Json(state.provider.search_activities(&params).await?))
}

pub async fn search_locations(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LocationSearchParams>,
) -> Result<Json<LocationSearchResult>> {
    params.validate()?;
    Ok(Json(state.provider.search_locations(&params).await?))
}

pub async fn airport_code(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LocationSearchParams>,
) -> Result<Json<Value>> {
    params.validate()?;
    let code = state.provider.airport_code(&params.keyword).await;
    Ok(Json(json!({ "keyword": params.keyword, "code": code })))
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "service": "Travel data gateway",
        "status": "running",
        "provider": state.config.api_base_url,
        "endpoints": {
            "flights": "/flights/search",
            "inspiration": "/flights/inspiration",
            "cheapest_dates": "/flights/cheapest-dates",
            "hotels": "/hotels/search",
            "activities": "/activities/search",
            "locations": "/locations/search",
            "airport_code": "/locations/airport-code",
            "health": "/health"
        }
    }))
}
