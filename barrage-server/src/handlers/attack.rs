//! Attack management endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use barrage_core::{AttackOpts, AttackParams, TaskId, TaskStatus};
use barrage_interfaces::TaskFilter;
use tracing::info;

use super::StatusQuery;
use crate::{
    context::AppContext,
    errors::{RestError, RestResult},
};

/// Submit and start an attack. Parameters are validated before the task
/// is registered.
pub async fn create_attack(
    State(ctx): State<AppContext>,
    payload: Result<Json<AttackParams>, JsonRejection>,
) -> RestResult<impl IntoResponse> {
    let Json(params) = payload.map_err(|e| RestError::BadRequest(e.body_text()))?;
    AttackOpts::from_params(&TaskId::new(), &params)?;

    let info = ctx.dispatcher.dispatch(params)?;
    Ok((StatusCode::CREATED, Json(info)))
}

/// List attacks in submission order, optionally by status
pub async fn list_attacks(
    State(ctx): State<AppContext>,
    Query(query): Query<StatusQuery>,
) -> RestResult<impl IntoResponse> {
    let filter = match query.status.as_deref() {
        Some(status) => TaskFilter::with_status(status.parse::<TaskStatus>()?),
        None => TaskFilter::default(),
    };
    Ok(Json(ctx.dispatcher.list(&filter)))
}

pub async fn get_attack(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> RestResult<impl IntoResponse> {
    ctx.dispatcher
        .get(&TaskId::from(id.as_str()))
        .map(Json)
        .ok_or_else(|| RestError::not_found("Attack", &id))
}

pub async fn cancel_attack(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> RestResult<impl IntoResponse> {
    info!(task_id = %id, "Cancel requested");
    Ok(Json(ctx.dispatcher.cancel(&TaskId::from(id))?))
}

/// Forget a finished attack and its stored report
pub async fn purge_attack(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> RestResult<impl IntoResponse> {
    Ok(Json(ctx.dispatcher.purge(&TaskId::from(id)).await?))
}
