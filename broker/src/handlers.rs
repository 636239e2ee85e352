use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use common::{
    CompleteRequest, CompleteResponse, FetchResponse, StatusResponse, SubmitRequest,
    SubmitResponse, TaskId, TaskStatus, ERR_MALFORMED_ID, ERR_MALFORMED_JSON, ERR_UNKNOWN_TASK,
    ERR_UNPROCESSABLE_REPORT,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::StoreError;
use crate::state::AppState;

const ERR_INTERNAL: &str = "Internal_Error";

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/internal/pending-count", get(pending_count))
        .route("/api/v1/submit", post(submit))
        .route("/api/v1/status/:id", get(status))
        .route("/api/v1/tasks/next", post(fetch_task))
        .route("/api/v1/tasks/complete", post(complete_task))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/* ---------------- handlers HTTP ---------------- */

async fn health() -> &'static str {
    "ok"
}

// Sólo para el autoscaler: cantidad de tareas esperando, en texto plano
async fn pending_count(State(state): State<AppState>) -> String {
    state.backlog().to_string()
}

// Productor envía una tarea nueva
async fn submit(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<SubmitResponse>) {
    let req: SubmitRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            warn!("submit con JSON inválido: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(SubmitResponse::err(ERR_MALFORMED_JSON)),
            );
        }
    };

    match state.submit(req.data) {
        Ok(id) => (StatusCode::OK, Json(SubmitResponse::ok(id))),
        Err(e) => {
            error!("no se pudo crear la tarea: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SubmitResponse::err(ERR_INTERNAL)),
            )
        }
    }
}

// Estado de una tarea; el output sólo viaja cuando está FINISHED
async fn status(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> (StatusCode, Json<StatusResponse>) {
    let id: TaskId = match raw_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(StatusResponse::err(ERR_MALFORMED_ID)),
            )
        }
    };

    match state.status(id) {
        Ok(task) => {
            let output = (task.status == TaskStatus::Finished).then_some(task.output);
            (
                StatusCode::OK,
                Json(StatusResponse {
                    id: task.id as i64,
                    status: Some(task.status),
                    input: Some(task.input),
                    output,
                    submitted_at: Some(task.submitted_at),
                    started_at: task.started_at,
                    finished_at: task.finished_at,
                    error: String::new(),
                }),
            )
        }
        Err(StoreError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(StatusResponse::err(ERR_UNKNOWN_TASK)),
        ),
        Err(e) => {
            error!("error leyendo tarea {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusResponse::err(ERR_INTERNAL)),
            )
        }
    }
}

// Worker pide la siguiente tarea; bloquea hasta que haya una
async fn fetch_task(
    State(state): State<AppState>,
) -> Result<Json<FetchResponse>, StatusCode> {
    match state.fetch().await {
        Ok(task) => {
            info!(
                "asignando tarea {} (pendientes={})",
                task.id,
                state.backlog()
            );
            Ok(Json(FetchResponse {
                id: task.id,
                input: task.input,
            }))
        }
        Err(e) => {
            error!("fetch falló: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// Worker reporta que terminó una tarea
async fn complete_task(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<CompleteResponse>) {
    let req: CompleteRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            error!("reporte de worker con JSON inválido: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(CompleteResponse::err(ERR_MALFORMED_JSON)),
            );
        }
    };

    match state.complete(req.id, &req.input, req.output) {
        Ok(()) => {
            info!("tarea {} terminada", req.id);
            (StatusCode::OK, Json(CompleteResponse::ok(req.id)))
        }
        Err(e @ StoreError::LockPoisoned(_)) => {
            error!("error completando tarea {}: {}", req.id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CompleteResponse::err(ERR_INTERNAL)),
            )
        }
        Err(e) => {
            // worker y broker no están de acuerdo: bug de protocolo, no del cliente
            error!(
                task_id = req.id,
                "FALLA DE CONSISTENCIA en reporte de worker: {}", e
            );
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(CompleteResponse::err(ERR_UNPROCESSABLE_REPORT)),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Bytes) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, bytes)
    }

    fn as_json(bytes: &Bytes) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn health_responde_ok() {
        let app = build_router(AppState::new());
        let (code, body) = call(&app, "GET", "/health", None).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn submit_con_json_roto_es_malformed() {
        let state = AppState::new();
        let app = build_router(state.clone());

        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/submit")
            .body(Body::from("{no es json"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let v = as_json(&to_bytes(resp.into_body(), usize::MAX).await.unwrap());
        assert_eq!(v, json!({"id": -1, "error": "Malformed_JSON"}));

        // sin efectos
        assert_eq!(state.backlog(), 0);
    }

    #[tokio::test]
    async fn submit_asigna_ids_crecientes_y_suma_backlog() {
        let app = build_router(AppState::new());

        for expected in 0..3 {
            let (code, body) =
                call(&app, "POST", "/api/v1/submit", Some(json!({"data": "hola"}))).await;
            assert_eq!(code, StatusCode::OK);
            assert_eq!(as_json(&body), json!({"id": expected, "error": ""}));
        }

        let (_, body) = call(&app, "GET", "/internal/pending-count", None).await;
        assert_eq!(&body[..], b"3");
    }

    #[tokio::test]
    async fn status_con_id_invalido_o_desconocido() {
        let app = build_router(AppState::new());

        let (code, body) = call(&app, "GET", "/api/v1/status/abc", None).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(as_json(&body)["error"], "Malformed_ID");

        let (code, body) = call(&app, "GET", "/api/v1/status/-4", None).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(as_json(&body)["error"], "Malformed_ID");

        let (code, body) = call(&app, "GET", "/api/v1/status/12", None).await;
        assert_eq!(code, StatusCode::NOT_FOUND);
        let v = as_json(&body);
        assert_eq!(v["id"], -1);
        assert_eq!(v["error"], "Unknown_Task");
    }

    /// Flujo completo por HTTP: submit "abc", fetch, complete, status FINISHED.
    #[tokio::test]
    async fn flujo_completo_por_http() {
        let app = build_router(AppState::new());

        let (_, body) = call(&app, "POST", "/api/v1/submit", Some(json!({"data": "abc"}))).await;
        let id = as_json(&body)["id"].as_u64().unwrap();

        let (_, body) = call(&app, "GET", &format!("/api/v1/status/{id}"), None).await;
        let v = as_json(&body);
        assert_eq!(v["status"], "PENDING");
        assert!(v.get("output").is_none());

        let (code, body) = call(&app, "POST", "/api/v1/tasks/next", None).await;
        assert_eq!(code, StatusCode::OK);
        let fetched: FetchResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!((fetched.id, fetched.input.as_str()), (id, "abc"));

        let (_, body) = call(&app, "GET", &format!("/api/v1/status/{id}"), None).await;
        assert_eq!(as_json(&body)["status"], "PROCESSING");

        let report = json!({
            "id": id,
            "input": "abc",
            "output": common::all_substrings("abc"),
        });
        let (code, body) = call(&app, "POST", "/api/v1/tasks/complete", Some(report)).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(as_json(&body)["id"], id);

        let (_, body) = call(&app, "GET", &format!("/api/v1/status/{id}"), None).await;
        let v = as_json(&body);
        assert_eq!(v["status"], "FINISHED");
        assert_eq!(v["input"], "abc");
        assert_eq!(v["output"], json!(["a", "ab", "abc", "b", "bc", "c"]));
    }

    #[tokio::test]
    async fn complete_con_input_distinto_es_unprocessable() {
        let state = AppState::new();
        let app = build_router(state.clone());
        let id = state.submit("abc".into()).unwrap();
        state.fetch().await.unwrap();

        let report = json!({"id": id, "input": "zzz", "output": ["z"]});
        let (code, body) = call(&app, "POST", "/api/v1/tasks/complete", Some(report)).await;
        assert_eq!(code, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(as_json(&body)["error"], "Unprocessable_Report");

        let task = state.status(id).unwrap();
        assert_eq!(task.status, TaskStatus::Processing);
        assert!(task.output.is_empty());

        let report = json!({"id": 999, "input": "abc", "output": []});
        let (code, _) = call(&app, "POST", "/api/v1/tasks/complete", Some(report)).await;
        assert_eq!(code, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
