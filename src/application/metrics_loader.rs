// Metrics loader - fetches snapshots per time range with manual retry
use crate::application::preset_repository::MetricsRepository;
use crate::domain::errors::{DashboardError, DashboardResult};
use crate::domain::metrics::{MetricsSnapshot, TimeRange};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Exponential backoff applied before a manual retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryPolicy {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1000,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): doubles from the
    /// initial delay, capped at the maximum.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32);
        let delay = self.initial_delay_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    /// `attempt` counts consecutive failures
    Failed { error: DashboardError, attempt: u32 },
}

/// Issued per request; only the latest ticket may update the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    range: TimeRange,
}

pub struct MetricsLoader {
    repository: Arc<dyn MetricsRepository>,
    policy: RetryPolicy,
    state: LoadState,
    range: TimeRange,
    snapshot: Option<Arc<MetricsSnapshot>>,
    failures: u32,
    latest_seq: u64,
}

impl MetricsLoader {
    pub fn new(repository: Arc<dyn MetricsRepository>, policy: RetryPolicy) -> Self {
        Self {
            repository,
            policy,
            state: LoadState::Idle,
            range: TimeRange::default(),
            snapshot: None,
            failures: 0,
            latest_seq: 0,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    /// Last successfully loaded snapshot; kept across failures.
    pub fn snapshot(&self) -> Option<&Arc<MetricsSnapshot>> {
        self.snapshot.as_ref()
    }

    /// True only for the first load, when there is nothing to show yet.
    pub fn is_initial_load(&self) -> bool {
        self.state == LoadState::Loading && self.snapshot.is_none()
    }

    pub fn begin_fetch(&mut self, range: TimeRange) -> FetchTicket {
        self.latest_seq += 1;
        self.range = range;
        self.state = LoadState::Loading;
        FetchTicket {
            seq: self.latest_seq,
            range,
        }
    }

    /// Apply a fetch result. Returns false when a newer request has been
    /// issued since `ticket`, in which case the result is dropped.
    pub fn complete(&mut self, ticket: FetchTicket, result: DashboardResult<MetricsSnapshot>) -> bool {
        if ticket.seq != self.latest_seq {
            tracing::debug!(
                "Dropping stale metrics response (seq {} < {})",
                ticket.seq,
                self.latest_seq
            );
            return false;
        }

        match result {
            Ok(snapshot) => {
                self.snapshot = Some(Arc::new(snapshot));
                self.failures = 0;
                self.state = LoadState::Ready;
            }
            Err(error) => {
                self.failures += 1;
                tracing::warn!(
                    "Metrics fetch for {} failed (attempt {}): {}",
                    ticket.range,
                    self.failures,
                    error
                );
                self.state = LoadState::Failed {
                    error,
                    attempt: self.failures,
                };
            }
        }
        true
    }

    pub async fn load(&mut self, range: TimeRange) -> &LoadState {
        let ticket = self.begin_fetch(range);
        let result = self.repository.fetch_metrics(range).await;
        self.complete(ticket, result);
        &self.state
    }

    /// Delay the next manual retry will wait, if the last load failed.
    pub fn next_retry_delay(&self) -> Option<Duration> {
        match self.state {
            LoadState::Failed { attempt, .. } => Some(self.policy.delay_for(attempt)),
            _ => None,
        }
    }

    /// Manual retry: waits out the backoff, then reloads the current range.
    pub async fn retry(&mut self) -> DashboardResult<&LoadState> {
        let delay = self
            .next_retry_delay()
            .ok_or_else(|| DashboardError::validation("retry", "last load did not fail"))?;
        tracing::info!("Retrying metrics fetch in {}ms", delay.as_millis());
        tokio::time::sleep(delay).await;
        let range = self.range;
        Ok(self.load(range).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::preset_repository::memory::ScriptedMetricsRepository;
    use serde_json::json;

    fn snapshot(revenue: u64) -> MetricsSnapshot {
        serde_json::from_value(json!({ "sales": { "totalRevenue": revenue } })).unwrap()
    }

    fn offline() -> DashboardError {
        DashboardError::Network("offline".to_string())
    }

    #[test]
    fn test_backoff_sequence() {
        let policy = RetryPolicy::default();
        let delays: Vec<u128> = (1..=6).map(|a| policy.delay_for(a).as_millis()).collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 10_000, 10_000]);
        assert_eq!(policy.delay_for(100).as_millis(), 10_000);
    }

    #[tokio::test]
    async fn test_failures_increment_attempt_and_keep_last_snapshot() {
        let repo = Arc::new(ScriptedMetricsRepository::new(vec![
            Ok(snapshot(10)),
            Err(offline()),
            Err(offline()),
            Err(offline()),
        ]));
        let mut loader = MetricsLoader::new(repo, RetryPolicy::default());

        assert_eq!(loader.load(TimeRange::Last30Days).await, &LoadState::Ready);
        let mut delays = Vec::new();
        for _ in 0..3 {
            loader.load(TimeRange::Last30Days).await;
            delays.push(loader.next_retry_delay().unwrap().as_millis());
        }
        assert_eq!(delays, vec![1000, 2000, 4000]);
        assert!(matches!(loader.state(), LoadState::Failed { attempt: 3, .. }));
        assert_eq!(
            loader.snapshot().unwrap().sales["totalRevenue"],
            json!(10)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_waits_and_recovers() {
        let repo = Arc::new(ScriptedMetricsRepository::new(vec![Err(offline()), Ok(snapshot(5))]));
        let mut loader = MetricsLoader::new(repo.clone(), RetryPolicy::default());

        loader.load(TimeRange::Last7Days).await;
        assert!(loader.snapshot().is_none());

        let started = tokio::time::Instant::now();
        let state = loader.retry().await.unwrap().clone();
        assert_eq!(state, LoadState::Ready);
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert_eq!(repo.calls(), vec![TimeRange::Last7Days, TimeRange::Last7Days]);
        assert!(loader.next_retry_delay().is_none());
    }

    #[tokio::test]
    async fn test_retry_without_failure_is_rejected() {
        let repo = Arc::new(ScriptedMetricsRepository::new(vec![Ok(snapshot(1))]));
        let mut loader = MetricsLoader::new(repo, RetryPolicy::default());
        loader.load(TimeRange::Last30Days).await;
        assert!(loader.retry().await.is_err());
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let repo = Arc::new(ScriptedMetricsRepository::new(Vec::new()));
        let mut loader = MetricsLoader::new(repo, RetryPolicy::default());

        let first = loader.begin_fetch(TimeRange::Last30Days);
        assert!(loader.is_initial_load());
        let second = loader.begin_fetch(TimeRange::Last90Days);

        assert!(loader.complete(second, Ok(snapshot(90))));
        assert!(!loader.complete(first, Ok(snapshot(30))));
        assert_eq!(loader.range(), TimeRange::Last90Days);
        assert_eq!(loader.snapshot().unwrap().sales["totalRevenue"], json!(90));
        assert_eq!(loader.state(), &LoadState::Ready);
    }
}
