use std::future::Future;
use std::io;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::types::ProbeOutcome;
use crate::error::ProbeError;
use crate::validation;

/// Default connect timeout for a probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Reachability check seam. The sweep and registration flows only see this
/// trait, so tests can substitute scripted outcomes.
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    /// Probe `host:port`.
    ///
    /// Returns `Ok` with `reachable == false` for any network-level failure.
    /// `Err` is reserved for malformed input and faults of the prober itself.
    async fn probe(&self, host: &str, port: u16) -> Result<ProbeOutcome, ProbeError>;
}

/// TCP connect prober
#[derive(Debug, Clone)]
pub struct TcpProber {
    timeout_duration: Duration,
}

impl TcpProber {
    pub fn new(timeout_duration: Duration) -> Self {
        Self { timeout_duration }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_duration
    }

    /// Bound a connect attempt by the timeout and turn it into an outcome.
    /// The connection, or the unfinished attempt, is dropped before returning.
    async fn attempt<F, S>(&self, connect: F) -> ProbeOutcome
    where
        F: Future<Output = io::Result<S>>,
    {
        let checked_at = Utc::now();
        let start = Instant::now();

        match timeout(self.timeout_duration, connect).await {
            Ok(Ok(stream)) => {
                let latency = start.elapsed().as_millis() as u64;
                drop(stream);
                ProbeOutcome::up(checked_at, latency)
            }
            Ok(Err(e)) => ProbeOutcome::down(checked_at, format!("TCP connection failed: {e}")),
            Err(_) => ProbeOutcome::down(
                checked_at,
                format!("TCP connection timeout after {}ms", self.timeout_duration.as_millis()),
            ),
        }
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

#[async_trait::async_trait]
impl Prober for TcpProber {
    async fn probe(&self, host: &str, port: u16) -> Result<ProbeOutcome, ProbeError> {
        validation::validate_endpoint(host, i64::from(port))?;

        // The host is used verbatim; (&str, u16) resolves names and IP literals alike.
        let outcome = self.attempt(TcpStream::connect((host, port))).await;

        debug!(
            host = %host,
            port,
            reachable = outcome.reachable,
            latency_ms = outcome.latency_ms,
            "Probe finished"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_probe_reaches_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let prober = TcpProber::new(Duration::from_secs(2));
        let outcome = prober.probe("127.0.0.1", port).await.unwrap();

        assert!(outcome.reachable);
        assert!(outcome.latency_ms.is_some());
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_tcp_probe_refused_is_down_not_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let prober = TcpProber::new(Duration::from_secs(2));
        let outcome = prober.probe("127.0.0.1", port).await.unwrap();

        assert!(!outcome.reachable);
        assert!(outcome.error.is_some());
    }

    #[tokio::test]
    async fn test_tcp_probe_unresolvable_host_is_down() {
        let prober = TcpProber::new(Duration::from_secs(2));
        let outcome = prober.probe("nonexistent.invalid", 80).await.unwrap();

        assert!(!outcome.reachable);
    }

    #[tokio::test]
    async fn test_hanging_connect_times_out() {
        let timeout_duration = Duration::from_millis(100);
        let prober = TcpProber::new(timeout_duration);

        let start = Instant::now();
        let outcome = prober.attempt(std::future::pending::<io::Result<TcpStream>>()).await;
        let elapsed = start.elapsed();

        assert!(!outcome.reachable);
        assert!(outcome.error.as_deref().unwrap_or_default().contains("timeout after 100ms"));
        assert!(elapsed >= timeout_duration);
        assert!(elapsed < timeout_duration + Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_unroutable_address_returns_within_timeout() {
        // Usually unroutable; whatever the network does, the call is bounded.
        let timeout_duration = Duration::from_millis(300);
        let prober = TcpProber::new(timeout_duration);

        let start = Instant::now();
        prober.probe("10.255.255.1", 81).await.unwrap();

        assert!(start.elapsed() < timeout_duration + Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_tcp_probe_rejects_invalid_input() {
        let prober = TcpProber::default();

        assert!(matches!(
            prober.probe("example.com", 0).await,
            Err(ProbeError::Validation(ValidationError::InvalidPort(0)))
        ));
        assert!(matches!(
            prober.probe("", 80).await,
            Err(ProbeError::Validation(ValidationError::EmptyUrl))
        ));
    }
}
