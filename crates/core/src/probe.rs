// crates/core/src/probe.rs
//! Bounded-timeout health probing of external services.
//!
//! Purely observational: a probe never errors, it only answers "healthy or
//! not". Network failures, timeouts and malformed bodies all read as
//! unhealthy, because during normal demo setup most of these services are
//! expected to be down.

use std::time::Duration;

use reqwest::{Client, StatusCode};

/// How a service's health response is judged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthCheck {
    /// HTTP 200 is sufficient.
    StatusOk,
    /// HTTP 200 AND a named JSON body field equals the expected value.
    /// Distinguishes "accepting connections" from "fully initialized".
    BodyField {
        field: &'static str,
        expect: &'static str,
    },
}

/// A logical external service to probe.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub name: &'static str,
    /// Base URL, e.g. `http://localhost:8080`.
    pub url: String,
    /// Health sub-path appended to the base URL ("" probes the base itself).
    pub health_path: &'static str,
    pub check: HealthCheck,
}

impl Endpoint {
    /// Full URL the probe hits.
    pub fn health_url(&self) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), self.health_path)
    }
}

/// Issues health probes with a fixed per-call timeout.
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
}

impl Prober {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client");
        Self { client }
    }

    /// Probe one endpoint. Infallible: any failure reads as unhealthy.
    pub async fn probe(&self, endpoint: &Endpoint) -> bool {
        let url = endpoint.health_url();
        let resp = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::debug!(service = endpoint.name, url = %url, error = %err, "probe failed");
                return false;
            }
        };

        if resp.status() != StatusCode::OK {
            return false;
        }

        match &endpoint.check {
            HealthCheck::StatusOk => true,
            HealthCheck::BodyField { field, expect } => {
                match resp.json::<serde_json::Value>().await {
                    Ok(body) => body.get(field).and_then(|v| v.as_str()) == Some(expect),
                    Err(_) => false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prober() -> Prober {
        Prober::new(Duration::from_millis(500))
    }

    fn endpoint(url: &str, health_path: &'static str, check: HealthCheck) -> Endpoint {
        Endpoint {
            name: "test",
            url: url.to_string(),
            health_path,
            check,
        }
    }

    #[tokio::test]
    async fn test_status_ok_healthy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let ep = endpoint(&server.uri(), "/health", HealthCheck::StatusOk);
        assert!(prober().probe(&ep).await);
    }

    #[tokio::test]
    async fn test_non_200_unhealthy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let ep = endpoint(&server.uri(), "/health", HealthCheck::StatusOk);
        assert!(!prober().probe(&ep).await);
    }

    #[tokio::test]
    async fn test_connection_refused_unhealthy() {
        // Port 9 is the discard port; nothing listens there.
        let ep = endpoint("http://127.0.0.1:9", "/health", HealthCheck::StatusOk);
        assert!(!prober().probe(&ep).await);
    }

    #[tokio::test]
    async fn test_body_field_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "healthy"})),
            )
            .mount(&server)
            .await;

        let ep = endpoint(
            &server.uri(),
            "/health",
            HealthCheck::BodyField {
                field: "status",
                expect: "healthy",
            },
        );
        assert!(prober().probe(&ep).await);
    }

    #[tokio::test]
    async fn test_body_field_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "loading"})),
            )
            .mount(&server)
            .await;

        let ep = endpoint(
            &server.uri(),
            "/health",
            HealthCheck::BodyField {
                field: "status",
                expect: "healthy",
            },
        );
        assert!(!prober().probe(&ep).await);
    }

    #[tokio::test]
    async fn test_body_field_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let ep = endpoint(
            &server.uri(),
            "/health",
            HealthCheck::BodyField {
                field: "status",
                expect: "healthy",
            },
        );
        assert!(!prober().probe(&ep).await);
    }

    #[test]
    fn test_health_url_joins_cleanly() {
        let ep = endpoint("http://localhost:1234/v1/", "/models", HealthCheck::StatusOk);
        assert_eq!(ep.health_url(), "http://localhost:1234/v1/models");

        let ep = endpoint("http://localhost:3003", "", HealthCheck::StatusOk);
        assert_eq!(ep.health_url(), "http://localhost:3003");
    }
}
