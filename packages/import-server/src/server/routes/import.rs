use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use product_extraction::{ExtractedProduct, ExtractionOutcome};

use crate::activity::{record_quietly, ActivityEntry};
use crate::auth::Identity;
use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ExtractedProduct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrape_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImportResponse {
    fn imported(outcome: ExtractionOutcome) -> Self {
        Self {
            success: true,
            scrape_method: Some(outcome.strategy.to_string()),
            product: Some(outcome.product),
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            product: None,
            scrape_method: None,
            error: Some(error.into()),
        }
    }
}

/// Import a product from an external URL
///
/// 200 with the record on success; 400 for a bad body, an invalid URL or a
/// failed extraction. Authenticated imports are written to the activity log.
pub async fn import_url_handler(
    Extension(state): Extension<AppState>,
    identity: Option<Extension<Identity>>,
    payload: Result<Json<ImportRequest>, JsonRejection>,
) -> (StatusCode, Json<ImportResponse>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected import request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ImportResponse::failed(format!(
                    "Invalid request body: {}",
                    rejection.body_text()
                ))),
            );
        }
    };

    let identity = identity
        .map(|Extension(identity)| identity)
        .unwrap_or(Identity::Anonymous);

    let outcome = match state.orchestrator.extract(&request.url).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(url = %request.url, error = %e, "Product import failed");
            return (StatusCode::BAD_REQUEST, Json(ImportResponse::failed(e.to_string())));
        }
    };

    info!(
        url = %request.url,
        strategy = %outcome.strategy,
        authenticated = identity.is_authenticated(),
        "Product imported"
    );

    if let Some(user_id) = identity.user_id() {
        let entry = ActivityEntry::product_import(user_id, &outcome);
        record_quietly(state.activity_sink.as_ref(), entry).await;
    }

    (StatusCode::OK, Json(ImportResponse::imported(outcome)))
}
