use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use crate::error::{Result, ScaleError};

/// De dónde sale la cantidad de tareas pendientes.
#[async_trait]
pub trait BacklogSource: Send + Sync {
    async fn pending_count(&self) -> Result<u64>;
}

/// Lee el backlog del endpoint interno del broker.
pub struct HttpBacklog {
    client: Client,
    url: String,
}

impl HttpBacklog {
    pub fn new(broker_url: &str) -> Self {
        Self {
            client: Client::new(),
            url: format!("{}/internal/pending-count", broker_url.trim_end_matches('/')),
        }
    }
}

/// Un conteo que no parsea se toma como 0.
pub fn parse_count(body: &str) -> u64 {
    match body.trim().parse::<u64>() {
        Ok(n) => n,
        Err(_) => {
            warn!("conteo de pendientes inválido {:?}, usando 0", body);
            0
        }
    }
}

#[async_trait]
impl BacklogSource for HttpBacklog {
    async fn pending_count(&self) -> Result<u64> {
        let resp = self.client.get(&self.url).send().await?;
        if !resp.status().is_success() {
            return Err(ScaleError::BadStatus(resp.status().as_u16()));
        }
        let body = resp.text().await?;
        Ok(parse_count(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_count_tolera_basura() {
        assert_eq!(parse_count("42"), 42);
        assert_eq!(parse_count(" 7\n"), 7);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("-3"), 0);
        assert_eq!(parse_count("muchas"), 0);
    }

    #[test]
    fn url_del_endpoint_interno() {
        let b = HttpBacklog::new("http://broker:8080/");
        assert_eq!(b.url, "http://broker:8080/internal/pending-count");
    }
}
