use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use super::{LogBatch, LogStore, UserLogs};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/logs";

/// Requests are bounded so a hanging store can't stall event handling for long.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// [LogStore] backed by the logs REST API.
pub struct HttpLogStore {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpLogStore {
    pub fn new(endpoint: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build http client")?;
        Ok(Self { client, endpoint })
    }

    fn user_url(&self, user_id: &str) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Endpoint {} can't hold a user path", self.endpoint))?
            .pop_if_empty()
            .push(user_id);
        Ok(url)
    }
}

#[async_trait]
impl LogStore for HttpLogStore {
    async fn submit(&self, batch: &LogBatch) -> Result<()> {
        debug!("Posting {} entries to {}", batch.logs.len(), self.endpoint);
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(batch)
            .send()
            .await
            .with_context(|| format!("Failed to reach log store at {}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Log store rejected the batch with {status}: {body}");
        }
        Ok(())
    }

    async fn fetch(&self, user_id: &str) -> Result<Option<UserLogs>> {
        let url = self.user_url(user_id)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to reach log store at {url}"))?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(None),
            status if status.is_success() => Ok(Some(
                response
                    .json::<UserLogs>()
                    .await
                    .context("Log store returned malformed logs")?,
            )),
            status => {
                let body = response.text().await.unwrap_or_default();
                bail!("Log store failed to return logs with {status}: {body}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use anyhow::Result;
    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
        routing::{get, post},
        Json, Router,
    };
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use url::Url;

    use crate::tracker::sync::{LogBatch, LogEntry, LogStore};

    use super::HttpLogStore;

    type Received = Arc<Mutex<Vec<Value>>>;

    async fn save_logs(State(received): State<Received>, Json(body): Json<Value>) -> StatusCode {
        let valid = body["userId"].is_string()
            && body["logs"].as_array().is_some_and(|logs| !logs.is_empty());
        if !valid {
            return StatusCode::BAD_REQUEST;
        }
        received.lock().unwrap().push(body);
        StatusCode::OK
    }

    async fn user_logs(Path(user_id): Path<String>) -> impl IntoResponse {
        if user_id == "user-1" {
            Json(json!({
                "_id": "66a0",
                "userId": "user-1",
                "logs": [{ "url": "https://a.com", "timeSpent": 120, "date": "2018-07-04T12:00:00.000Z" }],
                "createdAt": "2018-07-04T12:00:00.000Z",
            }))
            .into_response()
        } else {
            StatusCode::NO_CONTENT.into_response()
        }
    }

    async fn serve(router: Router) -> Result<Url> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        tokio::spawn(async move { axum::serve(listener, router).await });
        Ok(Url::parse(&format!("http://{address}/api/logs"))?)
    }

    async fn log_server() -> Result<(Url, Received)> {
        let received = Received::default();
        let router = Router::new()
            .route("/api/logs", post(save_logs))
            .route("/api/logs/:user_id", get(user_logs))
            .with_state(received.clone());
        Ok((serve(router).await?, received))
    }

    fn batch() -> LogBatch {
        LogBatch {
            user_id: "user-1".into(),
            logs: vec![LogEntry {
                url: "https://a.com".into(),
                time_spent: 120,
                date: Utc.with_ymd_and_hms(2018, 7, 4, 12, 0, 0).unwrap(),
            }],
        }
    }

    #[tokio::test]
    async fn test_submit_posts_batch() -> Result<()> {
        let (endpoint, received) = log_server().await?;
        let store = HttpLogStore::new(endpoint)?;

        store.submit(&batch()).await?;

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0], serde_json::to_value(batch())?);
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_rejected() -> Result<()> {
        let (endpoint, received) = log_server().await?;
        let store = HttpLogStore::new(endpoint)?;
        let empty = LogBatch {
            user_id: "user-1".into(),
            logs: vec![],
        };

        assert!(store.submit(&empty).await.is_err());
        assert!(received.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_server_error() -> Result<()> {
        let router = Router::new().route(
            "/api/logs",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
            }),
        );
        let store = HttpLogStore::new(serve(router).await?)?;

        let error = store.submit(&batch()).await.unwrap_err();
        assert!(error.to_string().contains("500"));
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_unreachable() -> Result<()> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        drop(listener);
        let store = HttpLogStore::new(Url::parse(&format!("http://{address}/api/logs"))?)?;

        assert!(store.submit(&batch()).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_logs() -> Result<()> {
        let (endpoint, _) = log_server().await?;
        let store = HttpLogStore::new(endpoint)?;

        let logs = store.fetch("user-1").await?.expect("user-1 has logs");
        assert_eq!(logs.user_id, "user-1");
        assert_eq!(logs.logs, batch().logs);

        assert_eq!(store.fetch("nobody").await?, None);
        Ok(())
    }

    #[test]
    fn test_user_url() -> Result<()> {
        let store = HttpLogStore::new(Url::parse("http://localhost:3000/api/logs/")?)?;
        assert_eq!(
            store.user_url("user-1")?.as_str(),
            "http://localhost:3000/api/logs/user-1"
        );
        Ok(())
    }
}
