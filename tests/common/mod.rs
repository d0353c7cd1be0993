#![allow(dead_code)]

use amadeus_proxy::config::Config;
use axum::{
    extract::{Form, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

/// How the fake provider behaves.
#[derive(Clone)]
pub struct ProviderScript {
    pub token_status: StatusCode,
    pub token_body: Option<Value>,
    pub expires_in: u64,
    /// The first N resource requests are answered with 401.
    pub unauthorized_first: usize,
    pub resource_status: StatusCode,
    pub resource_body: Value,
    pub resource_delay: Option<Duration>,
}

impl Default for ProviderScript {
    fn default() -> Self {
        Self {
            token_status: StatusCode::OK,
            token_body: None,
            expires_in: 1799,
            unauthorized_first: 0,
            resource_status: StatusCode::OK,
            resource_body: json!({ "data": [] }),
            resource_delay: None,
        }
    }
}

#[derive(Default)]
pub struct Recorded {
    pub token_exchanges: AtomicUsize,
    pub resource_hits: AtomicUsize,
    pub token_forms: Mutex<Vec<HashMap<String, String>>>,
    pub authorizations: Mutex<Vec<String>>,
    pub uris: Mutex<Vec<String>>,
}

impl Recorded {
    pub fn token_exchanges(&self) -> usize {
        self.token_exchanges.load(Ordering::SeqCst)
    }

    pub fn resource_hits(&self) -> usize {
        self.resource_hits.load(Ordering::SeqCst)
    }

    pub fn authorizations(&self) -> Vec<String> {
        self.authorizations.lock().unwrap().clone()
    }

    pub fn uris(&self) -> Vec<String> {
        self.uris.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct MockState {
    script: ProviderScript,
    recorded: Arc<Recorded>,
}

pub struct MockProvider {
    pub base_url: String,
    pub recorded: Arc<Recorded>,
}

impl MockProvider {
    pub async fn start(script: ProviderScript) -> Self {
        let recorded = Arc::new(Recorded::default());
        let state = MockState {
            script,
            recorded: recorded.clone(),
        };

        let app = Router::new()
            .route("/v1/security/oauth2/token", post(token))
            .fallback(resource)
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            recorded,
        }
    }

    pub fn config(&self) -> Config {
        Config::for_provider(&self.base_url, "test-key", "test-secret")
    }
}

async fn token(
    State(state): State<MockState>,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    let n = state.recorded.token_exchanges.fetch_add(1, Ordering::SeqCst) + 1;
    state.recorded.token_forms.lock().unwrap().push(form);

    if !state.script.token_status.is_success() {
        return (state.script.token_status, Json(json!({ "error": "invalid_client" })));
    }

    let body = state.script.token_body.clone().unwrap_or_else(|| {
        json!({
            "type": "amadeusOAuth2Token",
            "access_token": format!("token-{n}"),
            "token_type": "Bearer",
            "expires_in": state.script.expires_in,
            "state": "approved"
        })
    });
    (StatusCode::OK, Json(body))
}

async fn resource(
    State(state): State<MockState>,
    headers: HeaderMap,
    uri: Uri,
) -> impl IntoResponse {
    let hit = state.recorded.resource_hits.fetch_add(1, Ordering::SeqCst) + 1;

    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.recorded.authorizations.lock().unwrap().push(authorization);
    state.recorded.uris.lock().unwrap().push(uri.to_string());

    if let Some(delay) = state.script.resource_delay {
        tokio::time::sleep(delay).await;
    }

    if hit <= state.script.unauthorized_first {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "errors": [{ "status": 401, "title": "Invalid access token" }] })),
        );
    }

    (state.script.resource_status, Json(state.script.resource_body.clone()))
}

pub fn flight_offers_payload() -> Value {
    json!({
        "meta": { "count": 3 },
        "data": [
            {
                "id": "1",
                "price": { "total": "612.40", "currency": "USD" },
                "itineraries": [
                    {
                        "duration": "PT7H25M",
                        "segments": [{
                            "departure": { "iataCode": "JFK", "at": "2024-12-10T18:30:00" },
                            "arrival": { "iataCode": "CDG", "at": "2024-12-11T07:55:00" },
                            "carrierCode": "AF",
                            "number": "23",
                            "duration": "PT7H25M"
                        }]
                    },
                    {
                        "duration": "PT8H40M",
                        "segments": [{
                            "departure": { "iataCode": "CDG", "at": "2024-12-17T10:20:00" },
                            "arrival": { "iataCode": "JFK", "at": "2024-12-17T13:00:00" },
                            "carrierCode": "AF",
                            "number": "22"
                        }]
                    }
                ]
            },
            {
                "id": "2",
                "price": { "total": "455.10", "currency": "USD" },
                "itineraries": [{
                    "duration": "PT10H5M",
                    "segments": [
                        {
                            "departure": { "iataCode": "JFK", "at": "2024-12-10T08:00:00" },
                            "arrival": { "iataCode": "LHR", "at": "2024-12-10T20:00:00" },
                            "carrierCode": "BA",
                            "number": "112"
                        },
                        {
                            "departure": { "iataCode": "LHR", "at": "2024-12-10T21:15:00" },
                            "arrival": { "iataCode": "CDG", "at": "2024-12-10T23:30:00" },
                            "carrierCode": "BA",
                            "number": "318"
                        }
                    ]
                }]
            },
            { "id": "3", "itineraries": "corrupted" }
        ]
    })
}
