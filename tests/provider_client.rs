mod common;

use amadeus_proxy::{
    client::{ProviderClient, FLIGHT_OFFERS},
    error::{AppError, TRANSPORT_TIMEOUT_STATUS},
    params::{FlightSearchParams, HotelSearchParams},
};
use axum::http::StatusCode;
use common::{flight_offers_payload, MockProvider, ProviderScript};
use serde_json::json;
use std::time::Duration;

fn client_for(provider: &MockProvider) -> ProviderClient {
    ProviderClient::new(&provider.config(), reqwest::Client::new())
}

#[tokio::test]
async fn token_is_cached_while_valid() {
    let provider = MockProvider::start(ProviderScript::default()).await;
    let client = client_for(&provider);

    let first = client.tokens().get_token().await.unwrap();
    let second = client.tokens().get_token().await.unwrap();

    assert_eq!(first, "token-1");
    assert_eq!(first, second);
    assert_eq!(provider.recorded.token_exchanges(), 1);

    let forms = provider.recorded.token_forms.lock().unwrap().clone();
    assert_eq!(forms[0]["grant_type"], "client_credentials");
    assert_eq!(forms[0]["client_id"], "test-key");
    assert_eq!(forms[0]["client_secret"], "test-secret");
}

#[tokio::test]
async fn token_refreshes_exactly_once_after_expiry() {
    let provider = MockProvider::start(ProviderScript {
        expires_in: 1,
        ..Default::default()
    })
    .await;
    let mut config = provider.config();
    config.token_safety_margin = Duration::ZERO;
    let client = ProviderClient::new(&config, reqwest::Client::new());

    assert_eq!(client.tokens().get_token().await.unwrap(), "token-1");
    assert_eq!(client.tokens().get_token().await.unwrap(), "token-1");
    assert_eq!(provider.recorded.token_exchanges(), 1);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(client.tokens().get_token().await.unwrap(), "token-2");
    assert_eq!(client.tokens().get_token().await.unwrap(), "token-2");
    assert_eq!(provider.recorded.token_exchanges(), 2);
}

#[tokio::test]
async fn token_inside_safety_margin_is_not_reused() {
    // 60s lifetime against the default 5 minute margin: never valid.
    let provider = MockProvider::start(ProviderScript {
        expires_in: 60,
        ..Default::default()
    })
    .await;
    let client = client_for(&provider);

    assert_eq!(client.tokens().get_token().await.unwrap(), "token-1");
    assert_eq!(client.tokens().get_token().await.unwrap(), "token-2");
    assert_eq!(provider.recorded.token_exchanges(), 2);
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    let provider = MockProvider::start(ProviderScript::default()).await;
    let client = client_for(&provider);

    let (a, b, c) = tokio::join!(
        client.tokens().get_token(),
        client.tokens().get_token(),
        client.tokens().get_token()
    );

    assert_eq!(a.unwrap(), "token-1");
    assert_eq!(b.unwrap(), "token-1");
    assert_eq!(c.unwrap(), "token-1");
    assert_eq!(provider.recorded.token_exchanges(), 1);
}

#[tokio::test]
async fn rejected_credentials_are_an_authentication_error() {
    let provider = MockProvider::start(ProviderScript {
        token_status: StatusCode::UNAUTHORIZED,
        ..Default::default()
    })
    .await;
    let client = client_for(&provider);

    let err = client.tokens().get_token().await.unwrap_err();
    assert!(matches!(err, AppError::Authentication(_)));

    // Nothing was cached, so the next call tries again.
    let _ = client.tokens().get_token().await;
    assert_eq!(provider.recorded.token_exchanges(), 2);
}

#[tokio::test]
async fn malformed_token_body_is_an_authentication_error() {
    let provider = MockProvider::start(ProviderScript {
        token_body: Some(json!({ "state": "approved" })),
        ..Default::default()
    })
    .await;
    let client = client_for(&provider);

    let err = client.request(FLIGHT_OFFERS, &[]).await.unwrap_err();
    assert!(matches!(err, AppError::Authentication(_)));
    assert_eq!(provider.recorded.resource_hits(), 0);
}

#[tokio::test]
async fn out_of_range_token_lifetime_is_an_authentication_error() {
    let provider = MockProvider::start(ProviderScript {
        expires_in: 10_000_000_000_000_000,
        ..Default::default()
    })
    .await;
    let client = client_for(&provider);

    let err = client.tokens().get_token().await.unwrap_err();
    assert!(matches!(err, AppError::Authentication(_)));

    // The lock was released and nothing was cached.
    let err = client.request(FLIGHT_OFFERS, &[]).await.unwrap_err();
    assert!(matches!(err, AppError::Authentication(_)));
    assert_eq!(provider.recorded.token_exchanges(), 2);
    assert_eq!(provider.recorded.resource_hits(), 0);
}

#[tokio::test]
async fn explicit_invalidation_forces_a_new_exchange() {
    let provider = MockProvider::start(ProviderScript::default()).await;
    let client = client_for(&provider);

    assert_eq!(client.tokens().get_token().await.unwrap(), "token-1");
    client.tokens().invalidate().await;
    assert_eq!(client.tokens().get_token().await.unwrap(), "token-2");
    assert_eq!(provider.recorded.token_exchanges(), 2);
}

#[tokio::test]
async fn stale_rejection_keeps_refreshed_token() {
    let provider = MockProvider::start(ProviderScript::default()).await;
    let client = client_for(&provider);

    let first = client.tokens().get_token().await.unwrap();
    client.tokens().invalidate_if(&first).await;
    assert_eq!(client.tokens().get_token().await.unwrap(), "token-2");

    // A late 401 for the old token must not discard its replacement.
    client.tokens().invalidate_if(&first).await;
    assert_eq!(client.tokens().get_token().await.unwrap(), "token-2");
    assert_eq!(provider.recorded.token_exchanges(), 2);
}

#[tokio::test]
async fn unreachable_token_endpoint_is_an_authentication_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = amadeus_proxy::config::Config::for_provider(
        &format!("http://{}", addr),
        "key",
        "secret",
    );
    let client = ProviderClient::new(&config, reqwest::Client::new());

    let err = client.tokens().get_token().await.unwrap_err();
    assert!(matches!(err, AppError::Authentication(_)));
}

#[tokio::test]
async fn single_401_is_retried_with_fresh_token() {
    let provider = MockProvider::start(ProviderScript {
        unauthorized_first: 1,
        resource_body: json!({ "data": [{ "id": "1" }] }),
        ..Default::default()
    })
    .await;
    let client = client_for(&provider);

    let body = client.request(FLIGHT_OFFERS, &[]).await.unwrap();

    assert_eq!(body["data"][0]["id"], "1");
    assert_eq!(provider.recorded.resource_hits(), 2);
    assert_eq!(provider.recorded.token_exchanges(), 2);
    assert_eq!(
        provider.recorded.authorizations(),
        vec!["Bearer token-1", "Bearer token-2"]
    );
}

#[tokio::test]
async fn second_401_surfaces_as_upstream_error() {
    let provider = MockProvider::start(ProviderScript {
        unauthorized_first: usize::MAX,
        ..Default::default()
    })
    .await;
    let client = client_for(&provider);

    let err = client.request(FLIGHT_OFFERS, &[]).await.unwrap_err();

    match err {
        AppError::Upstream { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid access token"));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
    assert_eq!(provider.recorded.resource_hits(), 2);
    assert_eq!(provider.recorded.token_exchanges(), 2);
}

#[tokio::test]
async fn other_errors_are_not_retried() {
    let provider = MockProvider::start(ProviderScript {
        resource_status: StatusCode::BAD_REQUEST,
        resource_body: json!({ "errors": [{ "code": 477, "title": "INVALID FORMAT" }] }),
        ..Default::default()
    })
    .await;
    let client = client_for(&provider);

    let err = client.request(FLIGHT_OFFERS, &[]).await.unwrap_err();

    match err {
        AppError::Upstream { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("INVALID FORMAT"));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
    assert_eq!(provider.recorded.resource_hits(), 1);
    assert_eq!(provider.recorded.token_exchanges(), 1);
}

#[tokio::test]
async fn timeout_surfaces_with_synthetic_status() {
    let provider = MockProvider::start(ProviderScript {
        resource_delay: Some(Duration::from_secs(2)),
        ..Default::default()
    })
    .await;
    let mut config = provider.config();
    config.request_timeout = Duration::from_millis(200);
    let client = ProviderClient::new(&config, reqwest::Client::new());

    let err = client.request(FLIGHT_OFFERS, &[]).await.unwrap_err();

    match err {
        AppError::Upstream { status, .. } => assert_eq!(status, TRANSPORT_TIMEOUT_STATUS),
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn flight_search_sends_query_and_normalizes() {
    let provider = MockProvider::start(ProviderScript {
        resource_body: flight_offers_payload(),
        ..Default::default()
    })
    .await;
    let client = client_for(&provider);

    let params: FlightSearchParams = serde_urlencoded::from_str(
        "origin=JFK&destination=CDG&departure_date=2024-12-10&return_date=2024-12-17",
    )
    .unwrap();
    let result = client.search_flights(&params).await.unwrap();

    // The corrupted third offer is dropped, the other two survive.
    assert_eq!(result.count, 2);
    assert_eq!(result.flights[0].price.as_deref(), Some("612.40"));
    assert_eq!(result.flights[1].itineraries[0].segments.len(), 2);

    let uri = &provider.recorded.uris()[0];
    assert!(uri.starts_with("/v2/shopping/flight-offers?"));
    assert!(uri.contains("originLocationCode=JFK"));
    assert!(uri.contains("destinationLocationCode=CDG"));
    assert!(uri.contains("returnDate=2024-12-17"));
    assert!(uri.contains("adults=1"));
}

#[tokio::test]
async fn hotel_search_with_empty_data_is_zero_results() {
    let provider = MockProvider::start(ProviderScript::default()).await;
    let client = client_for(&provider);

    let params: HotelSearchParams =
        serde_urlencoded::from_str("city_code=PAR&check_in=2024-12-10&check_out=2024-12-17")
            .unwrap();
    let result = client.search_hotels(&params).await.unwrap();

    assert_eq!(result.count, 0);
    assert!(result.hotels.is_empty());
    assert!(provider.recorded.uris()[0].starts_with("/v2/shopping/hotel-offers?"));
}

#[tokio::test]
async fn airport_code_picks_first_airport() {
    let provider = MockProvider::start(ProviderScript {
        resource_body: json!({
            "data": [
                { "subType": "CITY", "iataCode": "PAR" },
                { "subType": "AIRPORT", "iataCode": "CDG" },
                { "subType": "AIRPORT", "iataCode": "ORY" }
            ]
        }),
        ..Default::default()
    })
    .await;
    let client = client_for(&provider);

    assert_eq!(client.airport_code("Paris").await.as_deref(), Some("CDG"));
    assert!(provider.recorded.uris()[0].contains("subType=AIRPORT%2CCITY"));
}
