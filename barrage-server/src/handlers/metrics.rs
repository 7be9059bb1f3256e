//! Prometheus scrape endpoint

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use barrage_interfaces::TaskFilter;
use barrage_metrics::exposition;
use tracing::debug;

use super::StatusQuery;
use crate::{context::AppContext, errors::RestResult};

/// Project the current reports onto the collectors, then render them.
///
/// Without `?status=` only tasks with the configured default status are
/// projected.
pub async fn scrape_metrics(
    State(ctx): State<AppContext>,
    Query(query): Query<StatusQuery>,
) -> RestResult<Response> {
    let filter = TaskFilter::from_query(query.status.as_deref(), ctx.default_status)?;
    let summary = ctx.projector.project(&filter).await?;
    debug!(matched = summary.matched, "Serving scrape");

    let (content_type, body) = exposition::render(ctx.metrics.registry())?;
    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}
