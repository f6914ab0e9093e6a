//! HTTP API for the ETL service.
//!
//! Endpoints:
//! - `GET /health` - Service and upstream health
//! - `POST /etl-pipeline/run-etl-pipeline` - Manual trigger (not mounted in production)
//!
//! The manual trigger answers `202 Accepted` and runs in the background, or
//! `409 Conflict` while another run holds the guard. With `?wait=true` it runs
//! inline and returns the run report.

use crate::config::Environment;
use crate::error::RunError;
use crate::orchestrator::Orchestrator;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use source_gateway::SourceGateway;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Application state shared across handlers.
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub gateway: Arc<dyn SourceGateway>,
    pub environment: Environment,
}

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new().route("/health", get(health_handler));
    if !state.environment.is_production() {
        router = router.route("/etl-pipeline/run-etl-pipeline", post(trigger_handler));
    }
    router.with_state(state).layer(CorsLayer::permissive())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    environment: String,
    etl_running: bool,
    upstream: UpstreamHealth,
}

#[derive(Serialize)]
struct UpstreamHealth {
    reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Always 200; a down upstream is reported in the body.
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let upstream = match state.gateway.health().await {
        Ok(health) => UpstreamHealth {
            reachable: true,
            status: Some(health.status),
            error: None,
        },
        Err(e) => UpstreamHealth {
            reachable: false,
            status: None,
            error: Some(e.to_string()),
        },
    };

    Json(HealthResponse {
        status: "ok",
        environment: state.environment.to_string(),
        etl_running: state.orchestrator.is_running(),
        upstream,
    })
}

#[derive(Debug, Default, Deserialize)]
struct TriggerParams {
    #[serde(default)]
    wait: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

impl ErrorResponse {
    fn new(error: impl ToString, code: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            code: code.to_string(),
        }
    }
}

fn error_response(status: StatusCode, err: &RunError) -> Response {
    (
        status,
        Json(ErrorResponse::new(err, err.kind().to_ascii_uppercase())),
    )
        .into_response()
}

/// POST /etl-pipeline/run-etl-pipeline
async fn trigger_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TriggerParams>,
) -> Response {
    let permit = match state.orchestrator.try_begin() {
        Ok(permit) => permit,
        Err(e) => {
            info!("Manual trigger rejected: {}", e);
            return error_response(StatusCode::CONFLICT, &e);
        }
    };

    if params.wait {
        return match state.orchestrator.run_with_permit(permit).await {
            Ok(report) => (StatusCode::OK, Json(report)).into_response(),
            Err(e) => {
                error!("Manual run failed: {}", e);
                error_response(StatusCode::BAD_GATEWAY, &e)
            }
        };
    }

    info!("Manual ETL run triggered");
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        if let Err(e) = orchestrator.run_with_permit(permit).await {
            error!("Manual run failed: {}", e);
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "status": "started" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::{RawRow, SupermarketChain};
    use normalizer::TransformerRegistry;
    use persistence::MemoryRepository;
    use serde_json::Value;
    use source_gateway::{Error as GatewayError, FileType, ServiceHealth};

    struct StubGateway {
        healthy: bool,
    }

    #[async_trait]
    impl SourceGateway for StubGateway {
        async fn health(&self) -> source_gateway::Result<ServiceHealth> {
            if self.healthy {
                Ok(ServiceHealth {
                    status: "healthy".to_string(),
                    timestamp: "2025-04-04T05:00:00".to_string(),
                })
            } else {
                Err(GatewayError::Timeout {
                    endpoint: "/service_health".to_string(),
                    context: "health check".to_string(),
                })
            }
        }

        async fn list_available_chains(&self) -> source_gateway::Result<Vec<String>> {
            Ok(vec!["SHUFERSAL".to_string(), "VICTORY".to_string()])
        }

        async fn list_files(
            &self,
            _chain: SupermarketChain,
            _file_type: FileType,
        ) -> source_gateway::Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn fetch_file_content(
            &self,
            _chain: SupermarketChain,
            _file_name: &str,
        ) -> source_gateway::Result<Vec<RawRow>> {
            Ok(Vec::new())
        }
    }

    async fn serve(environment: Environment, healthy: bool) -> (String, Arc<AppState>) {
        let gateway: Arc<dyn SourceGateway> = Arc::new(StubGateway { healthy });
        let orchestrator = Arc::new(Orchestrator::new(
            gateway.clone(),
            Arc::new(TransformerRegistry::with_defaults()),
            Arc::new(MemoryRepository::new()),
            2,
        ));
        let state = Arc::new(AppState {
            orchestrator,
            gateway,
            environment,
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = create_router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), state)
    }

    #[tokio::test]
    async fn test_health_reports_upstream() {
        let (base, _) = serve(Environment::Development, true).await;

        let body: Value = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["status"], "ok");
        assert_eq!(body["etl_running"], false);
        assert_eq!(body["upstream"]["reachable"], true);
        assert_eq!(body["upstream"]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_health_is_ok_when_upstream_down() {
        let (base, _) = serve(Environment::Development, false).await;

        let response = reqwest::get(format!("{}/health", base)).await.unwrap();
        assert_eq!(response.status(), 200);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["upstream"]["reachable"], false);
        assert!(body["upstream"]["error"].as_str().unwrap().contains("health check"));
    }

    #[tokio::test]
    async fn test_trigger_waits_for_report() {
        let (base, _) = serve(Environment::Development, true).await;

        let response = reqwest::Client::new()
            .post(format!("{}/etl-pipeline/run-etl-pipeline?wait=true", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: Value = response.json().await.unwrap();
        let chains = body["chains"].as_array().unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0]["chain"], "SHUFERSAL");
    }

    #[tokio::test]
    async fn test_trigger_conflicts_with_running_pipeline() {
        let (base, state) = serve(Environment::Test, true).await;
        let _permit = state.orchestrator.try_begin().unwrap();

        let response = reqwest::Client::new()
            .post(format!("{}/etl-pipeline/run-etl-pipeline", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 409);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], "ALREADY_RUNNING");
    }

    #[tokio::test]
    async fn test_trigger_accepted_in_background() {
        let (base, _) = serve(Environment::Development, true).await;

        let response = reqwest::Client::new()
            .post(format!("{}/etl-pipeline/run-etl-pipeline", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 202);
    }

    #[tokio::test]
    async fn test_background_run_can_be_awaited() {
        let (base, state) = serve(Environment::Development, true).await;

        let response = reqwest::Client::new()
            .post(format!("{}/etl-pipeline/run-etl-pipeline", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 202);

        tokio::time::timeout(std::time::Duration::from_secs(2), state.orchestrator.wait_idle())
            .await
            .unwrap();
        assert!(!state.orchestrator.is_running());
        assert!(state.orchestrator.try_begin().is_ok());
    }

    #[tokio::test]
    async fn test_trigger_not_mounted_in_production() {
        let (base, _) = serve(Environment::Production, true).await;

        let response = reqwest::Client::new()
            .post(format!("{}/etl-pipeline/run-etl-pipeline", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }
}
