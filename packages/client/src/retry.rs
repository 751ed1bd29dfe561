//! HTTP send helper with retry for transient failures.
//!
//! Every request to the backend goes through [`send`]. Connection errors,
//! timeouts, HTTP 429 and HTTP 5xx are retried with exponential backoff
//! when the [`RetryPolicy`] allows it; other 4xx responses are permanent
//! and are turned into a [`ClientError`] carrying the backend's message.

use std::time::Duration;

use munifor_map_models::api::{ApiMessage, ApiValidationErrors};
use reqwest::StatusCode;

use crate::ClientError;
use crate::config::ClientConfig;

/// Maximum length of a response body kept in an error message.
const BODY_PREVIEW_LEN: usize = 200;

/// How often and how patiently to retry a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Single attempt. Used for non-idempotent writes.
    pub const NONE: Self = Self {
        max_retries: 0,
        base_delay: Duration::ZERO,
    };

    /// Policy for idempotent reads, from client settings.
    #[must_use]
    pub const fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_ms),
        }
    }

    /// Delay before retry number `attempt` (1-based).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
    }
}

/// Sends the request built by `build_request`, retrying per `policy`.
///
/// The closure is called once per attempt because a
/// [`reqwest::RequestBuilder`] is consumed by `send()`.
///
/// # Errors
///
/// Returns [`ClientError`] if the request still fails after all retries
/// or the backend answers with a non-retryable error status.
pub async fn send<F>(build_request: F, policy: RetryPolicy) -> Result<reqwest::Response, ClientError>
where
    F: Fn() -> reqwest::RequestBuilder + Send + Sync,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = policy.delay(attempt);
            log::warn!("  retry {attempt}/{} in {delay:?}...", policy.max_retries);
            tokio::time::sleep(delay).await;
        }
        let can_retry = attempt < policy.max_retries;
        attempt += 1;

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && can_retry {
                    log::warn!("  transient error: {e}");
                    continue;
                }
                return Err(ClientError::Http(e));
            }
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }
                if is_retryable_status(status) && can_retry {
                    log::warn!("  HTTP {status}");
                    continue;
                }
                return Err(error_from_response(response).await);
            }
        }
    }
}

/// Returns `true` for statuses worth another attempt.
#[must_use]
pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Returns `true` if the error is likely transient.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_request()
}

async fn error_from_response(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error_from_body(status, &body)
}

/// Converts an error status and its body into a [`ClientError`].
///
/// Understands the backend's `{ "message": … }` and
/// `{ "errors": [{ "field", "message" }] }` bodies; anything else is kept
/// as a truncated preview.
#[must_use]
pub fn error_from_body(status: StatusCode, body: &str) -> ClientError {
    if status == StatusCode::UNAUTHORIZED {
        return ClientError::Unauthorized;
    }
    if let Ok(validation) = serde_json::from_str::<ApiValidationErrors>(body) {
        if !validation.errors.is_empty() {
            return ClientError::Validation {
                errors: validation.errors,
            };
        }
    }
    let message = serde_json::from_str::<ApiMessage>(body).map_or_else(
        |_| body.chars().take(BODY_PREVIEW_LEN).collect::<String>(),
        |m| m.message,
    );
    ClientError::Status {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_from_base() {
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        };
        assert_eq!(policy.delay(1), Duration::from_millis(500));
        assert_eq!(policy.delay(2), Duration::from_secs(1));
    }

    #[test]
    fn rate_limit_and_server_errors_are_retryable() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn message_body_is_extracted() {
        let err = error_from_body(StatusCode::NOT_FOUND, r#"{"message":"Reporte no encontrado"}"#);
        assert!(matches!(
            err,
            ClientError::Status { status: 404, ref message } if message == "Reporte no encontrado"
        ));
    }

    #[test]
    fn validation_body_is_extracted() {
        let err = error_from_body(
            StatusCode::BAD_REQUEST,
            r#"{"errors":[{"field":"id","message":"id is required"}]}"#,
        );
        match err {
            ClientError::Validation { errors } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "id");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unauthorized_and_plain_bodies() {
        assert!(matches!(
            error_from_body(StatusCode::UNAUTHORIZED, ""),
            ClientError::Unauthorized
        ));
        let long = "x".repeat(1000);
        match error_from_body(StatusCode::BAD_GATEWAY, &long) {
            ClientError::Status { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message.len(), BODY_PREVIEW_LEN);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    mod http {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        use actix_web::{App, HttpResponse, HttpServer, web};

        use super::*;

        #[derive(Default)]
        struct Hits {
            flaky: AtomicUsize,
            write: AtomicUsize,
            missing: AtomicUsize,
        }

        async fn flaky(hits: web::Data<Hits>) -> HttpResponse {
            if hits.flaky.fetch_add(1, Ordering::SeqCst) == 0 {
                HttpResponse::ServiceUnavailable().finish()
            } else {
                HttpResponse::Ok().body("ok")
            }
        }

        async fn write(hits: web::Data<Hits>) -> HttpResponse {
            hits.write.fetch_add(1, Ordering::SeqCst);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({ "message": "try later" }))
        }

        async fn missing(hits: web::Data<Hits>) -> HttpResponse {
            hits.missing.fetch_add(1, Ordering::SeqCst);
            HttpResponse::NotFound().json(serde_json::json!({ "message": "Reporte no encontrado" }))
        }

        fn policy() -> RetryPolicy {
            RetryPolicy {
                max_retries: 3,
                base_delay: Duration::from_millis(1),
            }
        }

        /// Starts a backend on an ephemeral port; returns its base URL.
        fn start(hits: &Arc<Hits>) -> (String, actix_web::dev::ServerHandle) {
            let data = web::Data::from(Arc::clone(hits));
            let server = HttpServer::new(move || {
                App::new()
                    .app_data(data.clone())
                    .route("/flaky", web::get().to(flaky))
                    .route("/report/accept", web::put().to(write))
                    .route("/missing", web::get().to(missing))
            })
            .workers(1)
            .bind(("127.0.0.1", 0))
            .unwrap();
            let port = server.addrs()[0].port();
            let server = server.run();
            let handle = server.handle();
            actix_web::rt::spawn(server);
            (format!("http://127.0.0.1:{port}"), handle)
        }

        #[actix_web::test]
        async fn get_retries_server_error_then_succeeds() {
            let hits = Arc::new(Hits::default());
            let (base, handle) = start(&hits);
            let http = reqwest::Client::new();
            let url = format!("{base}/flaky");

            let response = send(|| http.get(&url), policy()).await.unwrap();

            assert_eq!(response.text().await.unwrap(), "ok");
            assert_eq!(hits.flaky.load(Ordering::SeqCst), 2);
            handle.stop(false).await;
        }

        #[actix_web::test]
        async fn review_is_sent_once_even_with_retries_configured() {
            use munifor_map::MapDataSource;
            use munifor_map_models::api::ReportDecision;

            use crate::{ApiClient, ClientConfig, Session};

            let hits = Arc::new(Hits::default());
            let (base, handle) = start(&hits);
            let mut config = ClientConfig::defaults().unwrap();
            config.base_url = base;
            config.max_retries = 3;
            config.retry_base_ms = 1;
            let session = Arc::new(Session::new("tok", None).unwrap());
            let client = ApiClient::new(config, session).unwrap();

            let err = client
                .review_report("r-1", ReportDecision::Accept)
                .await
                .unwrap_err();

            assert!(matches!(
                err,
                ClientError::Status { status: 503, ref message } if message == "try later"
            ));
            assert_eq!(hits.write.load(Ordering::SeqCst), 1);
            handle.stop(false).await;
        }

        #[actix_web::test]
        async fn client_error_is_permanent() {
            let hits = Arc::new(Hits::default());
            let (base, handle) = start(&hits);
            let http = reqwest::Client::new();
            let url = format!("{base}/missing");

            let err = send(|| http.get(&url), policy()).await.unwrap_err();

            assert!(matches!(
                err,
                ClientError::Status { status: 404, ref message } if message == "Reporte no encontrado"
            ));
            assert_eq!(hits.missing.load(Ordering::SeqCst), 1);
            handle.stop(false).await;
        }
    }
}
