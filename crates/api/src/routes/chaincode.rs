//! Chaincode invoke and query endpoints

use axum::{extract::State, http::StatusCode, Json};
use ledger_types::{PipelineResult, PipelineStage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::ApiError, state::AppState, ApiResult};

/// Body shared by `/invoke` and `/query`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChaincodeRequest {
    pub enrollment_name: String,
    pub enrollment_secrets: String,
    pub fcn: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ChaincodeRequest {
    fn validate(&self) -> ApiResult<()> {
        if self.enrollment_name.is_empty() {
            return Err(ApiError::BadRequest("enrollmentName is required".to_string()));
        }
        if self.fcn.is_empty() {
            return Err(ApiError::BadRequest("fcn is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub responses: Vec<String>,
}

/// HTTP status reported for a pipeline that stopped at `stage`.
fn failure_status(stage: PipelineStage) -> StatusCode {
    match stage {
        PipelineStage::Enrolling => StatusCode::UNAUTHORIZED,
        PipelineStage::Proposing | PipelineStage::Committing => StatusCode::BAD_GATEWAY,
        PipelineStage::Evaluating => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineStage::Confirming => StatusCode::GATEWAY_TIMEOUT,
    }
}

/// POST /invoke - Submit a transaction and wait for commit confirmation
///
/// The body is the tagged pipeline result, for failures too.
pub async fn invoke(
    State(state): State<AppState>,
    Json(request): Json<ChaincodeRequest>,
) -> ApiResult<(StatusCode, Json<PipelineResult>)> {
    request.validate()?;
    debug!("Invoke {} as {}", request.fcn, request.enrollment_name);

    let result = state
        .coordinator
        .submit_transaction(
            &request.enrollment_name,
            &request.enrollment_secrets,
            &request.fcn,
            request.args,
        )
        .await;

    let status = match result.failed_stage() {
        Some(stage) => failure_status(stage),
        None => StatusCode::OK,
    };
    Ok((status, Json(result)))
}

/// POST /query - Evaluate a chaincode function without ordering it
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<ChaincodeRequest>,
) -> ApiResult<Json<QueryResponse>> {
    request.validate()?;
    debug!("Query {} as {}", request.fcn, request.enrollment_name);

    let responses = state
        .coordinator
        .query_chaincode(
            &request.enrollment_name,
            &request.enrollment_secrets,
            &request.fcn,
            request.args,
        )
        .await?;

    Ok(Json(QueryResponse { responses }))
}
