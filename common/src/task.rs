use serde::{Deserialize, Serialize};
use std::fmt;

/// Identidad de una tarea: entero creciente asignado por el broker, nunca se reutiliza.
pub type TaskId = u64;

/// Sentinela de "sin id válido" en las respuestas de error.
pub const NO_TASK_ID: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Processing,
    Finished,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Processing => "PROCESSING",
            TaskStatus::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_se_serializa_en_mayusculas() {
        let s = serde_json::to_string(&TaskStatus::Processing).unwrap();
        assert_eq!(s, "\"PROCESSING\"");

        let back: TaskStatus = serde_json::from_str("\"FINISHED\"").unwrap();
        assert_eq!(back, TaskStatus::Finished);
        assert_eq!(back.to_string(), "FINISHED");
    }
}
