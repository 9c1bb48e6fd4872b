//! Record handlers
//!
//! One handler per route shape, all domain-parameterized: the `:domain` path
//! segment is parsed into a `RecordDomain` and everything after that is the
//! gateway's generic pipeline. An unknown domain tag reads as a missing
//! resource, not a malformed request.

use axum::{
    extract::{Path, State},
    Json,
};

use core_kernel::TransactionReceipt;
use domain_records::{RecordDomain, RecordState};

use crate::dto::FieldMap;
use crate::error::ApiError;
use crate::AppState;

/// GET /api/:domain/:id - current record state
pub async fn get_current(
    State(state): State<AppState>,
    Path((domain, id)): Path<(String, String)>,
) -> Result<Json<RecordState>, ApiError> {
    let domain: RecordDomain = domain.parse()?;
    let record = state.gateway.get(domain, &id, false).await?;
    Ok(Json(record))
}

/// GET /api/:domain/:id/history - full commitment history, oldest first
pub async fn get_history(
    State(state): State<AppState>,
    Path((domain, id)): Path<(String, String)>,
) -> Result<Json<RecordState>, ApiError> {
    let domain: RecordDomain = domain.parse()?;
    let history = state.gateway.get(domain, &id, true).await?;
    Ok(Json(history))
}

/// POST /api/:domain - append a record entry
pub async fn set_record(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    Json(fields): Json<FieldMap>,
) -> Result<Json<TransactionReceipt>, ApiError> {
    let domain: RecordDomain = domain.parse()?;
    let receipt = state.gateway.set(domain, &fields).await?;
    Ok(Json(receipt))
}
