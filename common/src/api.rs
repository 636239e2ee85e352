use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{TaskId, TaskStatus, NO_TASK_ID};

/* --------- Códigos de error que viajan en el campo `error` --------- */

pub const ERR_MALFORMED_JSON: &str = "Malformed_JSON";
pub const ERR_MALFORMED_ID: &str = "Malformed_ID";
pub const ERR_UNKNOWN_TASK: &str = "Unknown_Task";
pub const ERR_UNPROCESSABLE_REPORT: &str = "Unprocessable_Report";

/* --------- Productor -> broker --------- */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub id: i64,
    pub error: String,
}

impl SubmitResponse {
    pub fn ok(id: TaskId) -> Self {
        Self {
            id: id as i64,
            error: String::new(),
        }
    }

    pub fn err(code: &str) -> Self {
        Self {
            id: NO_TASK_ID,
            error: code.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Sólo presente cuando la tarea está FINISHED
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Vec<String>>,

    /// -------- Tiempos de la tarea --------
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub error: String,
}

impl StatusResponse {
    pub fn err(code: &str) -> Self {
        Self {
            id: NO_TASK_ID,
            error: code.to_string(),
            ..Default::default()
        }
    }
}

/* --------- Worker <-> broker --------- */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse {
    pub id: TaskId,
    pub input: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteRequest {
    pub id: TaskId,
    /// Input original de la tarea, el broker lo compara contra el guardado
    pub input: String,
    pub output: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteResponse {
    pub id: i64,
    #[serde(default)]
    pub error: String,
}

impl CompleteResponse {
    pub fn ok(id: TaskId) -> Self {
        Self {
            id: id as i64,
            error: String::new(),
        }
    }

    pub fn err(code: &str) -> Self {
        Self {
            id: NO_TASK_ID,
            error: code.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_pendiente_omite_output() {
        let resp = StatusResponse {
            id: 3,
            status: Some(TaskStatus::Pending),
            input: Some("abc".into()),
            ..Default::default()
        };
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["status"], "PENDING");
        assert!(v.get("output").is_none());
        assert_eq!(v["error"], "");
    }

    #[test]
    fn errores_usan_el_sentinela() {
        let v = serde_json::to_value(SubmitResponse::err(ERR_MALFORMED_JSON)).unwrap();
        assert_eq!(v["id"], -1);
        assert_eq!(v["error"], "Malformed_JSON");

        let s = StatusResponse::err(ERR_UNKNOWN_TASK);
        assert_eq!(s.id, NO_TASK_ID);
        assert!(s.status.is_none());
    }
}
