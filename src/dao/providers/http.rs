use std::time::Duration;

use rand::Rng;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{
    ProviderId,
    error::{UpstreamError, UpstreamResult},
};
use crate::config::UpstreamSettings;

/// Exponential backoff with random jitter for idempotent upstream calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    fn from_settings(settings: &UpstreamSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_delay: Duration::from_millis(settings.retry_base_delay_ms),
            max_delay: Duration::from_millis(settings.retry_max_delay_ms),
        }
    }

    /// Delay before retry number `attempt` (zero based): the doubled base delay capped at
    /// `max_delay`, plus up to half of it again as jitter.
    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let backoff = self.base_delay.saturating_mul(factor).min(self.max_delay);
        let jitter_ms = (backoff.as_millis() / 2) as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=jitter_ms)
        };
        backoff + Duration::from_millis(jitter)
    }
}

/// HTTP plumbing shared by the provider gateways: timeouts, retries, status and JSON decoding.
#[derive(Clone)]
pub struct UpstreamHttp {
    provider: ProviderId,
    client: Client,
    retry: RetryPolicy,
}

impl UpstreamHttp {
    pub fn new(provider: ProviderId, settings: &UpstreamSettings) -> UpstreamResult<Self> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout())
            .timeout(settings.request_timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| UpstreamError::Client { provider, source })?;

        Ok(Self {
            provider,
            client,
            retry: RetryPolicy::from_settings(settings),
        })
    }

    /// Underlying client used to build requests.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Send `request` and decode a 2xx JSON body into `T`.
    ///
    /// Only `idempotent` requests are retried, and only on transient failures.
    pub async fn send<T>(&self, request: RequestBuilder, idempotent: bool) -> UpstreamResult<T>
    where
        T: DeserializeOwned,
    {
        let mut attempt = 0;
        loop {
            let can_retry = idempotent && attempt < self.retry.max_retries;
            let Some(current) = request.try_clone().filter(|_| can_retry) else {
                return self.execute(request).await.inspect_err(|err| {
                    warn!(provider = %self.provider, error = %err, "upstream call failed");
                });
            };

            match self.execute(current).await {
                Err(err) if err.is_retryable() => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        provider = %self.provider,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "upstream call failed; retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(provider = %self.provider, error = %err, "upstream call failed");
                    return Err(err);
                }
                Ok(value) => return Ok(value),
            }
        }
    }

    async fn execute<T>(&self, request: RequestBuilder) -> UpstreamResult<T>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(|source| self.transport_error(source))?;
        let status = response.status();
        debug!(provider = %self.provider, url = %response.url(), %status, "upstream response");

        let bytes = response
            .bytes()
            .await
            .map_err(|source| self.transport_error(source))?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                provider: self.provider,
                status: status.as_u16(),
                body: error_body(&bytes),
            });
        }

        serde_json::from_slice(&bytes).map_err(|err| UpstreamError::Decode {
            provider: self.provider,
            message: err.to_string(),
        })
    }

    fn transport_error(&self, source: reqwest::Error) -> UpstreamError {
        if source.is_timeout() {
            UpstreamError::Timeout {
                provider: self.provider,
            }
        } else if source.is_decode() {
            UpstreamError::Decode {
                provider: self.provider,
                message: source.to_string(),
            }
        } else {
            UpstreamError::Unreachable {
                provider: self.provider,
                source,
            }
        }
    }
}

/// Upstream error payload: parsed JSON when possible, otherwise the raw text as a JSON string.
fn error_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use axum::{Router, http::StatusCode, routing::get};
    use tokio::net::TcpListener;

    use super::*;

    /// Local server answering `status` on `/games` and counting the requests it receives.
    async fn counting_upstream(status: StatusCode) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/games",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (status, "try again later")
                }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (format!("http://{addr}/games"), hits)
    }

    fn http_with_retries(max_retries: u32) -> UpstreamHttp {
        let settings = UpstreamSettings {
            connect_timeout_ms: 500,
            request_timeout_ms: 2_000,
            max_retries,
            retry_base_delay_ms: 5,
            retry_max_delay_ms: 10,
        };
        UpstreamHttp::new(ProviderId::Moby, &settings).unwrap()
    }

    #[tokio::test]
    async fn transient_status_is_retried_up_to_the_limit() {
        let (url, hits) = counting_upstream(StatusCode::SERVICE_UNAVAILABLE).await;
        let http = http_with_retries(1);

        let err = http
            .send::<Value>(http.client().get(&url), true)
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::Status { status: 503, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn permanent_status_is_not_retried() {
        let (url, hits) = counting_upstream(StatusCode::NOT_FOUND).await;
        let http = http_with_retries(3);

        let err = http
            .send::<Value>(http.client().get(&url), true)
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::Status { status: 404, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_idempotent_requests_are_sent_once() {
        let (url, hits) = counting_upstream(StatusCode::SERVICE_UNAVAILABLE).await;
        let http = http_with_retries(3);

        http.send::<Value>(http.client().get(&url), false)
            .await
            .unwrap_err();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn retry_delay_doubles_and_is_capped() {
        let policy = RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
        };

        let first = policy.delay_for(0);
        assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(150));

        let second = policy.delay_for(1);
        assert!(second >= Duration::from_millis(200) && second <= Duration::from_millis(300));

        let capped = policy.delay_for(10);
        assert!(capped >= Duration::from_millis(300) && capped <= Duration::from_millis(450));
    }

    #[test]
    fn zero_base_delay_has_no_jitter() {
        let policy = RetryPolicy {
            max_retries: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        };
        assert_eq!(policy.delay_for(3), Duration::ZERO);
    }

    #[test]
    fn error_body_wraps_plain_text() {
        assert_eq!(
            error_body(br#"{"code":101,"error":"bad key"}"#),
            serde_json::json!({"code": 101, "error": "bad key"})
        );
        assert_eq!(
            error_body(b"Service Unavailable"),
            Value::String("Service Unavailable".into())
        );
    }

    #[test]
    fn only_transient_statuses_are_retryable() {
        let status = |status| UpstreamError::Status {
            provider: ProviderId::Moby,
            status,
            body: Value::Null,
        };
        assert!(status(429).is_retryable());
        assert!(status(503).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(!status(500).is_retryable());
        assert!(
            UpstreamError::Timeout {
                provider: ProviderId::Igdb
            }
            .is_retryable()
        );
    }
}
