//! Stored report endpoints

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use barrage_core::{AttackReport, TaskId};
use barrage_interfaces::ReportStore;

use crate::{
    context::AppContext,
    errors::{RestError, RestResult},
};

fn decode(raw: &[u8]) -> RestResult<AttackReport> {
    serde_json::from_slice(raw)
        .map_err(|e| RestError::InternalError(format!("Stored report is malformed: {}", e)))
}

pub async fn list_reports(State(ctx): State<AppContext>) -> RestResult<impl IntoResponse> {
    let reports = ctx
        .reports
        .get_all()
        .await?
        .iter()
        .map(|raw| decode(raw))
        .collect::<RestResult<Vec<_>>>()?;
    Ok(Json(reports))
}

pub async fn get_report(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> RestResult<impl IntoResponse> {
    let raw = ctx.reports.get(&TaskId::from(id))?;
    Ok(Json(decode(&raw)?))
}
