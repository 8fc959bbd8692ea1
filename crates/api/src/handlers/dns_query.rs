use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use dohtunnel_application::use_cases::QueryOutcome;
use dohtunnel_domain::TunnelQuery;
use tracing::{debug, instrument};

use crate::dto::{DnsQueryParams, DohJsonResponse};
use crate::state::AppState;

pub const DNS_JSON_CONTENT_TYPE: &str = "application/dns-json";
pub const NO_CACHE: &str = "no-cache, no-store";

#[instrument(skip(state), name = "api_resolve_query")]
pub async fn resolve_query(
    State(state): State<AppState>,
    Query(params): Query<DnsQueryParams>,
) -> Response {
    let query = TunnelQuery::from_params(params.name.as_deref(), params.record_type.as_deref());

    match state.handle_query.execute(&query).await {
        QueryOutcome::Info(text) => {
            ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response()
        }
        QueryOutcome::Answers(answers) => {
            debug!(
                status = %answers.status(),
                answers = answers.len(),
                "Rendering DoH-JSON response"
            );
            (
                [
                    (header::CONTENT_TYPE, DNS_JSON_CONTENT_TYPE),
                    (header::CACHE_CONTROL, NO_CACHE),
                ],
                Json(DohJsonResponse::from(&answers)),
            )
                .into_response()
        }
    }
}
