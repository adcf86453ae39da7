use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State as AxumState,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::auth::{require_identity, IdentityResolver};
use crate::db::repos::{suggestions as suggestion_repo, usage as usage_repo};
use crate::db::DbPool;
use crate::error::AppError;
use crate::llm::{TextGenerator, TokenUsage};
use crate::pipeline::features::{self, FeatureSuggestion};
use crate::pipeline::{generate, GenerationRequest, PromptSection};
use crate::validation::require_non_empty;

/// Shared state for the HTTP server. Collaborators are injected as trait
/// objects so tests can script the LLM and the auth provider.
pub struct AppState {
    pub pool: DbPool,
    pub llm: Arc<dyn TextGenerator>,
    pub auth: Arc<dyn IdentityResolver>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/generate-prompts", post(generate_prompts))
        .route("/api/suggest-features", post(suggest_features))
        .route("/api/usage", get(usage_status).post(usage_consume))
        .route("/api/suggestions", post(submit_suggestion))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server and run until ctrl-c.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> Result<(), AppError> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("PromptForge API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Response / request bodies
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub prompts: Vec<PromptSection>,
    pub total_prompts: usize,
    pub usage_count: i64,
    pub max_usage: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub usage_count: i64,
    pub max_usage: i64,
    pub remaining: i64,
    pub can_generate: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestFeaturesResponse {
    pub success: bool,
    pub features: Vec<FeatureSuggestion>,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub success: bool,
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestFeaturesBody {
    #[serde(default)]
    pub app_type: String,
    #[serde(default)]
    pub domain: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionBody {
    #[serde(default)]
    pub suggestion: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "promptforge" }))
}

/// POST /api/generate-prompts — run the full assembly pipeline.
///
/// Gate order: identity, then field validation, then a read-only quota
/// check. The ledger is charged only after the whole pipeline succeeds, so
/// a failed or partial run costs nothing. The final charge is atomic and
/// conditional: losing an increment race during generation fails the run
/// instead of exceeding the cap.
async fn generate_prompts(
    AxumState(state): AxumState<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<GenerationRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let identity = require_identity(&headers, state.auth.as_ref()).await?;

    require_non_empty("Application type", &body.app_type)?;
    require_non_empty("Domain", &body.domain)?;

    usage_repo::check_remaining(&state.pool, identity.as_str())?;

    tracing::info!(
        user_id = %identity.as_str(),
        app_type = %body.app_type,
        domain = %body.domain,
        features = body.features.len(),
        "Starting prompt generation"
    );

    let prompts = generate::run(state.llm.as_ref(), &body).await?;
    let record = usage_repo::check_and_consume(&state.pool, identity.as_str())?;

    tracing::info!(
        user_id = %identity.as_str(),
        total_prompts = prompts.len(),
        usage_count = record.usage_count,
        "Prompt generation complete"
    );

    Ok(Json(GenerateResponse {
        success: true,
        total_prompts: prompts.len(),
        prompts,
        usage_count: record.usage_count,
        max_usage: record.max_usage,
    }))
}

/// POST /api/suggest-features — feature research, no auth or quota gate.
async fn suggest_features(
    AxumState(state): AxumState<Arc<AppState>>,
    Json(body): Json<SuggestFeaturesBody>,
) -> Result<Json<SuggestFeaturesResponse>, AppError> {
    let (features, usage) =
        features::suggest(state.llm.as_ref(), &body.app_type, &body.domain).await?;

    Ok(Json(SuggestFeaturesResponse {
        success: true,
        features,
        usage,
    }))
}

/// GET /api/usage — current counters for the caller, creating the record
/// at zero on first sight. Never increments.
async fn usage_status(
    AxumState(state): AxumState<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UsageResponse>, AppError> {
    let identity = require_identity(&headers, state.auth.as_ref()).await?;
    let record = usage_repo::peek(&state.pool, identity.as_str())?;
    Ok(Json(usage_response(&record)))
}

/// POST /api/usage — consume one generation without running the pipeline.
async fn usage_consume(
    AxumState(state): AxumState<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UsageResponse>, AppError> {
    let identity = require_identity(&headers, state.auth.as_ref()).await?;
    let record = usage_repo::check_and_consume(&state.pool, identity.as_str())?;
    Ok(Json(usage_response(&record)))
}

/// POST /api/suggestions — feedback intake, no auth gate.
async fn submit_suggestion(
    AxumState(state): AxumState<Arc<AppState>>,
    Json(body): Json<SuggestionBody>,
) -> Result<(StatusCode, Json<SuggestionResponse>), AppError> {
    let stored = suggestion_repo::create(&state.pool, &body.suggestion)?;

    tracing::info!(id = %stored.id, "Suggestion stored");

    Ok((
        StatusCode::CREATED,
        Json(SuggestionResponse {
            success: true,
            id: stored.id,
        }),
    ))
}

fn usage_response(record: &crate::db::models::UsageRecord) -> UsageResponse {
    UsageResponse {
        usage_count: record.usage_count,
        max_usage: record.max_usage,
        remaining: record.remaining(),
        can_generate: record.can_generate(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::StaticResolver;
    use crate::db::init_test_db;
    use crate::llm::testing::{MockLlm, UnreachableLlm};

    fn state_with(llm: Arc<dyn TextGenerator>) -> Arc<AppState> {
        Arc::new(AppState {
            pool: init_test_db().unwrap(),
            llm,
            auth: Arc::new(StaticResolver::new(&[("valid-token", "user-1")])),
        })
    }

    fn authed_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer valid-token".parse().unwrap());
        headers
    }

    fn generation_body(features: &[&str]) -> GenerationRequest {
        GenerationRequest {
            app_type: "Marketplace".into(),
            domain: "Vintage Watches".into(),
            features: features.iter().map(|s| s.to_string()).collect(),
            design_style: "Modern".into(),
            platform: "Web".into(),
            additional_info: None,
        }
    }

    #[tokio::test]
    async fn test_generate_rejects_unauthenticated_before_any_work() {
        // UnreachableLlm panics if the pipeline runs; an empty header map
        // must short-circuit before quota or generation.
        let state = state_with(Arc::new(UnreachableLlm));

        let err = generate_prompts(
            AxumState(state.clone()),
            HeaderMap::new(),
            Json(generation_body(&["Chat"])),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized));
        // No usage record was created or charged.
        assert_eq!(
            usage_repo::peek(&state.pool, "user-1").unwrap().usage_count,
            0
        );
    }

    #[tokio::test]
    async fn test_generate_rejects_missing_fields() {
        let state = state_with(Arc::new(UnreachableLlm));

        let mut body = generation_body(&[]);
        body.domain = String::new();

        let err = generate_prompts(AxumState(state), authed_headers(), Json(body))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_generate_happy_path_charges_once() {
        let state = state_with(Arc::new(MockLlm::echoing()));

        let response = generate_prompts(
            AxumState(state.clone()),
            authed_headers(),
            Json(generation_body(&["Payments", "Chat"])),
        )
        .await
        .unwrap();

        assert!(response.success);
        assert_eq!(response.total_prompts, 4);
        assert_eq!(response.prompts.len(), 4);
        assert_eq!(response.usage_count, 1);
        assert_eq!(response.max_usage, 5);

        let orders: Vec<i32> = response.prompts.iter().map(|p| p.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);

        assert_eq!(
            usage_repo::peek(&state.pool, "user-1").unwrap().usage_count,
            1
        );
    }

    #[tokio::test]
    async fn test_failed_pipeline_leaves_ledger_unchanged() {
        let llm = Arc::new(MockLlm::scripted(vec![
            Ok("overview".into()),
            Err(AppError::Upstream("boom".into())),
        ]));
        let state = state_with(llm);

        let err = generate_prompts(
            AxumState(state.clone()),
            authed_headers(),
            Json(generation_body(&["Chat"])),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Upstream(_)));
        assert_eq!(
            usage_repo::peek(&state.pool, "user-1").unwrap().usage_count,
            0
        );
    }

    #[tokio::test]
    async fn test_generate_rejects_exhausted_quota_before_llm() {
        let state = state_with(Arc::new(UnreachableLlm));

        for _ in 0..5 {
            usage_repo::check_and_consume(&state.pool, "user-1").unwrap();
        }

        let err = generate_prompts(
            AxumState(state.clone()),
            authed_headers(),
            Json(generation_body(&[])),
        )
        .await
        .unwrap_err();

        match err {
            AppError::QuotaExceeded {
                usage_count,
                max_usage,
            } => {
                assert_eq!(usage_count, 5);
                assert_eq!(max_usage, 5);
            }
            other => panic!("Expected QuotaExceeded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_usage_status_and_consume() {
        let state = state_with(Arc::new(UnreachableLlm));

        let status = usage_status(AxumState(state.clone()), authed_headers())
            .await
            .unwrap();
        assert_eq!(status.usage_count, 0);
        assert_eq!(status.remaining, 5);
        assert!(status.can_generate);

        let consumed = usage_consume(AxumState(state.clone()), authed_headers())
            .await
            .unwrap();
        assert_eq!(consumed.usage_count, 1);
        assert_eq!(consumed.remaining, 4);

        // Status endpoints require a caller identity
        let err = usage_status(AxumState(state), HeaderMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_suggest_features_is_not_auth_gated() {
        let reply = r#"[{"name": "Inventory", "description": "Track stock.", "category": "Essential"}]"#;
        let state = state_with(Arc::new(MockLlm::scripted(vec![Ok(reply.into())])));

        let response = suggest_features(
            AxumState(state),
            Json(SuggestFeaturesBody {
                app_type: "Marketplace".into(),
                domain: "Vintage Watches".into(),
            }),
        )
        .await
        .unwrap();

        assert!(response.success);
        assert_eq!(response.features.len(), 1);
        assert!(response.usage.is_some());
    }

    #[tokio::test]
    async fn test_submit_suggestion_trims_and_creates() {
        let state = state_with(Arc::new(UnreachableLlm));

        let (status, response) = submit_suggestion(
            AxumState(state.clone()),
            Json(SuggestionBody {
                suggestion: "  Add dark mode  ".into(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert!(response.success);

        let stored = suggestion_repo::get_by_id(&state.pool, &response.id).unwrap();
        assert_eq!(stored.suggestion, "Add dark mode");
    }

    #[tokio::test]
    async fn test_submit_suggestion_rejects_whitespace() {
        let state = state_with(Arc::new(UnreachableLlm));

        let err = submit_suggestion(
            AxumState(state),
            Json(SuggestionBody {
                suggestion: "   ".into(),
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }
}
