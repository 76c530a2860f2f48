use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::report::{BalanceReporter, ReportError};

#[derive(Clone)]
pub struct AppState {
    pub reporter: Arc<BalanceReporter>,
}

impl AppState {
    pub fn new(reporter: Arc<BalanceReporter>) -> Self {
        Self { reporter }
    }
}

/// `nodebalance` 명령 인자. 쿼리스트링(GET)이나 JSON 본문(POST)으로 받는다.
#[derive(Debug, Default, Deserialize)]
pub struct NodeBalanceParams {
    pub mode: Option<String>,
    pub currencies: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/nodebalance",
            get(nodebalance_query_handler).post(nodebalance_json_handler),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API 서버 시작
pub async fn serve(state: AppState, port: u16) -> eyre::Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("nodebalance API server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn nodebalance_query_handler(
    State(state): State<AppState>,
    Query(params): Query<NodeBalanceParams>,
) -> Response {
    nodebalance(&state, params).await
}

async fn nodebalance_json_handler(
    State(state): State<AppState>,
    Json(params): Json<NodeBalanceParams>,
) -> Response {
    nodebalance(&state, params).await
}

async fn nodebalance(state: &AppState, params: NodeBalanceParams) -> Response {
    let result = state
        .reporter
        .report(params.mode.as_deref(), params.currencies.as_deref())
        .await;

    match result {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            let status = match e {
                ReportError::InvalidMode(..) => StatusCode::BAD_REQUEST,
                ReportError::Balance(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error!("nodebalance request failed: {}", e);
            (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::Duration;
    use tower::ServiceExt;

    use super::*;
    use crate::node::FundsSource;
    use crate::rates::resolver::tests::{chain, FakeProvider};
    use crate::rates::RateResolver;
    use crate::report::tests::{sample_funds, FakeFunds};
    use crate::report::Defaults;
    use interface::ProviderId;

    fn app(funds: Arc<FakeFunds>) -> Router {
        let gecko = FakeProvider::ok(ProviderId::CoinGecko, &[("usd", 100_000.0), ("eur", 91_604.0)]);
        let resolver = Arc::new(RateResolver::new(chain(&[&gecko]), Duration::seconds(3600)));
        let reporter = BalanceReporter::new(
            resolver,
            funds as Arc<dyn FundsSource>,
            Defaults::default(),
        );
        router(AppState::new(Arc::new(reporter)))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(FakeFunds::with(sample_funds()))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_get_total_balance() {
        let response = app(FakeFunds::with(sample_funds()))
            .oneshot(
                Request::get("/nodebalance?currencies=usd")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total_balance"]["sats"], "50,060,000 sats");
        assert_eq!(json["total_balance"]["usd"], "50,060.00 USD");
    }

    #[tokio::test]
    async fn test_post_rate_mode() {
        let response = app(FakeFunds::with(sample_funds()))
            .oneshot(
                Request::post("/nodebalance")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"mode": "rate", "currencies": "EUR"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["rates"]["eur"], "91,604.00 EUR");
        assert_eq!(json["cached"], true);
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_mode_is_bad_request() {
        let response = app(FakeFunds::with(sample_funds()))
            .oneshot(
                Request::get("/nodebalance?mode=weekly&currencies=eur")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid mode: weekly."));
    }

    #[tokio::test]
    async fn test_node_failure_is_server_error() {
        let response = app(FakeFunds::broken())
            .oneshot(Request::get("/nodebalance").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to retrieve balance"));
    }
}
