use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

use super::audit::{audit_data_quality, render_audit_summary, AuditResult};
use super::dataset::load_csv;
use super::vci::{PatientRecord, RiskShare, VciEngine, VciOutcome};
use crate::error::AppError;

/// Router exposing scoring and auditing over HTTP.
pub fn analytics_router() -> Router {
    Router::new()
        .route("/api/v1/vci/score", post(score_handler))
        .route("/api/v1/audit", post(audit_handler))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    pub(crate) records: Vec<PatientRecord>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreResponse {
    pub(crate) outcomes: Vec<VciOutcome>,
    pub(crate) distribution: Vec<RiskShare>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AuditResponse {
    pub(crate) audit: AuditResult,
    pub(crate) summary: String,
}

pub(crate) async fn score_handler(Json(request): Json<ScoreRequest>) -> Response {
    let engine = VciEngine::new();
    let outcomes: Vec<VciOutcome> = request
        .records
        .iter()
        .map(|record| engine.score(record))
        .collect();
    let distribution = engine.risk_distribution(&outcomes);

    (
        StatusCode::OK,
        Json(ScoreResponse {
            outcomes,
            distribution,
        }),
    )
        .into_response()
}

pub(crate) async fn audit_handler(body: String) -> Result<Response, AppError> {
    let table = load_csv(Cursor::new(body.into_bytes()))?;
    let audit = audit_data_quality(&table);
    let summary = render_audit_summary(&audit);
    Ok((StatusCode::OK, Json(AuditResponse { audit, summary })).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn read_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn score_route_returns_outcomes_and_distribution() {
        let payload = json!({
            "records": [
                {"time_in_hospital": 14, "admission_type_id": 1, "diag_1": "250", "diag_2": "401",
                 "diag_3": "427", "num_procedures": 4, "num_medications": 10, "number_emergency": 5},
                {}
            ]
        });
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/vci/score")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request builds");

        let response = analytics_router()
            .oneshot(request)
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["outcomes"][0]["score"], 18);
        assert_eq!(body["outcomes"][0]["category"], "High");
        assert_eq!(body["outcomes"][1]["score"], 0);
        assert_eq!(body["outcomes"][1]["category"], "Low");
        assert_eq!(body["distribution"][0]["count"], 1);
        assert_eq!(body["distribution"][2]["count"], 1);
    }

    #[tokio::test]
    async fn audit_route_reports_missingness() {
        let csv = "encounter_id,weight\n1,\n2,\n3,70\n";
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/audit")
            .header("content-type", "text/csv")
            .body(Body::from(csv))
            .expect("request builds");

        let response = analytics_router()
            .oneshot(request)
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["audit"]["total_records"], 3);
        assert_eq!(body["audit"]["missing_by_column"][1]["count"], 2);
        assert_eq!(body["audit"]["missing_by_column"][1]["percentage"], 66.67);
        assert!(body["summary"]
            .as_str()
            .expect("summary text")
            .contains("DATA QUALITY AUDIT SUMMARY"));
    }

    #[tokio::test]
    async fn audit_route_rejects_malformed_csv() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/audit")
            .body(Body::from("a,b\n1,2\n3\n"))
            .expect("request builds");

        let response = analytics_router()
            .oneshot(request)
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert!(body["error"]
            .as_str()
            .expect("error text")
            .contains("CSV"));
    }
}
