use crate::core::matcher::matching_listings;
use crate::models::Alert;
use crate::services::ListingStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Error from the alert repository capability
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct RepositoryError(pub String);

/// Error from the contact resolution capability
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ResolveError(pub String);

/// Error from the mail transport capability
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct MailError(pub String);

/// Persisted alert collection, read and advanced by the sweep
#[async_trait]
pub trait AlertRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Alert>, RepositoryError>;
    async fn update_last_sent(
        &self,
        alert_id: i64,
        sent_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
}

/// Resolves an alert owner's email address from their user id
#[async_trait]
pub trait ContactResolver: Send + Sync {
    async fn resolve_contact(&self, user_id: &str) -> Result<String, ResolveError>;
}

/// Outbound mail capability
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// Why an alert was skipped this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoMatches,
    CoolingDown,
}

/// Why dispatching an alert failed this run
///
/// All three variants leave the alert eligible for retry on the next sweep.
/// `RepositoryWrite` is the dangerous one: the owner has already been
/// emailed, so the retry is a duplicate notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("owner lookup failed: {0}")]
    UserResolution(String),
    #[error("mail delivery failed: {0}")]
    Mail(String),
    #[error("last_sent update failed after send: {0}")]
    RepositoryWrite(String),
}

/// Terminal state of one alert in one sweep run
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Sent,
    Skipped(SkipReason),
    Failed(DispatchError),
}

/// Aggregate counts for one sweep run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Tuning knobs for the sweep
///
/// A `cooldown` of `None` preserves the at-least-once contract: an alert
/// whose matches persist is re-notified on every run.
#[derive(Debug, Clone, Copy)]
pub struct SweepPolicy {
    pub cooldown: Option<chrono::Duration>,
    pub max_concurrency: usize,
    pub op_timeout: Duration,
}

impl Default for SweepPolicy {
    fn default() -> Self {
        Self {
            cooldown: None,
            max_concurrency: 4,
            op_timeout: Duration::from_secs(10),
        }
    }
}

/// Errors that abort a sweep run before any alert is dispatched
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("a sweep is already running")]
    AlreadyRunning,

    #[error("failed to load alerts: {0}")]
    Repository(#[from] RepositoryError),
}

/// Sweep orchestrator
///
/// Loads the full alert snapshot once per run, dispatches each alert with
/// bounded concurrency, and aggregates typed outcomes into a report. The
/// orchestrator itself is stateless across runs; `last_sent_at` on the
/// alerts is the only durable state it touches.
#[derive(Clone)]
pub struct Sweeper {
    repository: Arc<dyn AlertRepository>,
    contacts: Arc<dyn ContactResolver>,
    mail: Arc<dyn MailTransport>,
    listings: Arc<ListingStore>,
    policy: SweepPolicy,
    run_token: Arc<Mutex<()>>,
}

impl Sweeper {
    pub fn new(
        repository: Arc<dyn AlertRepository>,
        contacts: Arc<dyn ContactResolver>,
        mail: Arc<dyn MailTransport>,
        listings: Arc<ListingStore>,
        policy: SweepPolicy,
    ) -> Self {
        Self {
            repository,
            contacts,
            mail,
            listings,
            policy,
            run_token: Arc::new(Mutex::new(())),
        }
    }

    /// Run one complete pass over all alerts.
    ///
    /// Returns `SweepError::AlreadyRunning` if another run holds the token;
    /// overlapping runs would double-send notifications. Per-alert failures
    /// are counted, never propagated.
    pub async fn run(&self) -> Result<SweepReport, SweepError> {
        let _guard = self
            .run_token
            .clone()
            .try_lock_owned()
            .map_err(|_| SweepError::AlreadyRunning)?;

        let alerts = timeout(self.policy.op_timeout, self.repository.list_all())
            .await
            .map_err(|_| RepositoryError("alert snapshot load timed out".to_string()))??;

        info!("Sweep started: evaluating {} alerts", alerts.len());

        let semaphore = Arc::new(Semaphore::new(self.policy.max_concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for alert in alerts {
            let sweeper = self.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition only limits
                // concurrency; a permit is always granted eventually.
                let _permit = semaphore.acquire_owned().await.ok();
                let outcome = sweeper.dispatch(&alert).await;
                (alert.id, outcome)
            });
        }

        let mut report = SweepReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((alert_id, DispatchOutcome::Sent)) => {
                    report.sent += 1;
                    debug!("Alert {}: notification sent", alert_id);
                }
                Ok((alert_id, DispatchOutcome::Skipped(reason))) => {
                    report.skipped += 1;
                    debug!("Alert {}: skipped ({:?})", alert_id, reason);
                }
                Ok((alert_id, DispatchOutcome::Failed(err))) => {
                    report.failed += 1;
                    warn!("Alert {}: dispatch failed: {}", alert_id, err);
                }
                Err(e) => {
                    report.failed += 1;
                    error!("Dispatch task panicked: {}", e);
                }
            }
        }

        info!(
            "Sweep finished: {} sent, {} skipped, {} failed",
            report.sent, report.skipped, report.failed
        );

        Ok(report)
    }

    /// Dispatch a single alert, once per run.
    ///
    /// A failure at any stage leaves the alert untouched, except the final
    /// `last_sent_at` write: if that fails the email is already out, and the
    /// owner will be re-notified next run.
    pub async fn dispatch(&self, alert: &Alert) -> DispatchOutcome {
        let now = Utc::now();
        if let (Some(cooldown), Some(last_sent)) = (self.policy.cooldown, alert.last_sent_at) {
            if now - last_sent < cooldown {
                return DispatchOutcome::Skipped(SkipReason::CoolingDown);
            }
        }

        let matches = matching_listings(alert, self.listings.all());
        if matches.is_empty() {
            return DispatchOutcome::Skipped(SkipReason::NoMatches);
        }

        let address = match timeout(
            self.policy.op_timeout,
            self.contacts.resolve_contact(&alert.user_id),
        )
        .await
        {
            Ok(Ok(address)) => address,
            Ok(Err(e)) => return DispatchOutcome::Failed(DispatchError::UserResolution(e.to_string())),
            Err(_) => {
                return DispatchOutcome::Failed(DispatchError::UserResolution(
                    "contact resolution timed out".to_string(),
                ))
            }
        };

        let subject = "New matches for your apartment alert";
        let body = format!(
            "We found {} new apartments matching your saved search.",
            matches.len()
        );

        match timeout(self.policy.op_timeout, self.mail.send(&address, subject, &body)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return DispatchOutcome::Failed(DispatchError::Mail(e.to_string())),
            Err(_) => {
                return DispatchOutcome::Failed(DispatchError::Mail(
                    "mail send timed out".to_string(),
                ))
            }
        }

        let sent_at = Utc::now();
        match timeout(
            self.policy.op_timeout,
            self.repository.update_last_sent(alert.id, sent_at),
        )
        .await
        {
            Ok(Ok(())) => DispatchOutcome::Sent,
            Ok(Err(e)) => {
                error!(
                    "Alert {}: notification delivered but last_sent update failed, \
                     owner will be re-notified next sweep: {}",
                    alert.id, e
                );
                DispatchOutcome::Failed(DispatchError::RepositoryWrite(e.to_string()))
            }
            Err(_) => {
                error!(
                    "Alert {}: notification delivered but last_sent update timed out, \
                     owner will be re-notified next sweep",
                    alert.id
                );
                DispatchOutcome::Failed(DispatchError::RepositoryWrite(
                    "last_sent update timed out".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Listing;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    fn listing(id: i64, location: &str, price: f64) -> Listing {
        Listing {
            id,
            name: format!("Apartment {}", id),
            location: location.to_string(),
            price,
            rating: 4.5,
            distance_km: 1.0,
        }
    }

    fn alert(id: i64, location: &str, min_price: f64, max_price: f64) -> Alert {
        Alert {
            id,
            user_id: format!("user-{}", id),
            location: location.to_string(),
            min_price,
            max_price,
            last_sent_at: None,
        }
    }

    struct FakeRepository {
        alerts: Vec<Alert>,
        updates: StdMutex<Vec<i64>>,
        fail_writes: bool,
    }

    impl FakeRepository {
        fn new(alerts: Vec<Alert>) -> Self {
            Self {
                alerts,
                updates: StdMutex::new(Vec::new()),
                fail_writes: false,
            }
        }

        fn failing_writes(alerts: Vec<Alert>) -> Self {
            Self {
                fail_writes: true,
                ..Self::new(alerts)
            }
        }

        fn updated_ids(&self) -> Vec<i64> {
            self.updates.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AlertRepository for FakeRepository {
        async fn list_all(&self) -> Result<Vec<Alert>, RepositoryError> {
            Ok(self.alerts.clone())
        }

        async fn update_last_sent(
            &self,
            alert_id: i64,
            _sent_at: DateTime<Utc>,
        ) -> Result<(), RepositoryError> {
            if self.fail_writes {
                return Err(RepositoryError("write refused".to_string()));
            }
            self.updates.lock().unwrap().push(alert_id);
            Ok(())
        }
    }

    struct FakeResolver {
        fail: bool,
    }

    #[async_trait]
    impl ContactResolver for FakeResolver {
        async fn resolve_contact(&self, user_id: &str) -> Result<String, ResolveError> {
            if self.fail {
                return Err(ResolveError(format!("no such user {}", user_id)));
            }
            Ok(format!("{}@example.com", user_id))
        }
    }

    struct FakeMailer {
        sent: AtomicUsize,
        fail: bool,
    }

    impl FakeMailer {
        fn new() -> Self {
            Self {
                sent: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                sent: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn sent_count(&self) -> usize {
            self.sent.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MailTransport for FakeMailer {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError("relay unavailable".to_string()));
            }
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn store() -> Arc<ListingStore> {
        Arc::new(ListingStore::new(vec![
            listing(1, "Maribor", 75.0),
            listing(2, "Piran", 150.0),
        ]))
    }

    fn sweeper(
        repository: Arc<FakeRepository>,
        resolver: Arc<FakeResolver>,
        mailer: Arc<FakeMailer>,
        policy: SweepPolicy,
    ) -> Sweeper {
        Sweeper::new(repository, resolver, mailer, store(), policy)
    }

    #[tokio::test]
    async fn test_dispatch_sends_and_updates_last_sent() {
        let repository = Arc::new(FakeRepository::new(vec![]));
        let mailer = Arc::new(FakeMailer::new());
        let s = sweeper(
            repository.clone(),
            Arc::new(FakeResolver { fail: false }),
            mailer.clone(),
            SweepPolicy::default(),
        );

        let outcome = s.dispatch(&alert(1, "maribor", 50.0, 100.0)).await;

        assert_eq!(outcome, DispatchOutcome::Sent);
        assert_eq!(mailer.sent_count(), 1);
        assert_eq!(repository.updated_ids(), vec![1]);
    }

    #[tokio::test]
    async fn test_dispatch_no_matches_touches_nothing() {
        let repository = Arc::new(FakeRepository::new(vec![]));
        let mailer = Arc::new(FakeMailer::new());
        let s = sweeper(
            repository.clone(),
            Arc::new(FakeResolver { fail: false }),
            mailer.clone(),
            SweepPolicy::default(),
        );

        let outcome = s.dispatch(&alert(1, "Ljubljana", 200.0, 300.0)).await;

        assert_eq!(outcome, DispatchOutcome::Skipped(SkipReason::NoMatches));
        assert_eq!(mailer.sent_count(), 0);
        assert!(repository.updated_ids().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_resolver_failure_leaves_alert_untouched() {
        let repository = Arc::new(FakeRepository::new(vec![]));
        let mailer = Arc::new(FakeMailer::new());
        let s = sweeper(
            repository.clone(),
            Arc::new(FakeResolver { fail: true }),
            mailer.clone(),
            SweepPolicy::default(),
        );

        let outcome = s.dispatch(&alert(1, "maribor", 50.0, 100.0)).await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Failed(DispatchError::UserResolution(_))
        ));
        assert_eq!(mailer.sent_count(), 0);
        assert!(repository.updated_ids().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_mail_failure_leaves_alert_untouched() {
        let repository = Arc::new(FakeRepository::new(vec![]));
        let s = sweeper(
            repository.clone(),
            Arc::new(FakeResolver { fail: false }),
            Arc::new(FakeMailer::failing()),
            SweepPolicy::default(),
        );

        let outcome = s.dispatch(&alert(1, "maribor", 50.0, 100.0)).await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Failed(DispatchError::Mail(_))
        ));
        assert!(repository.updated_ids().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_write_failure_after_send_reported() {
        let repository = Arc::new(FakeRepository::failing_writes(vec![]));
        let mailer = Arc::new(FakeMailer::new());
        let s = sweeper(
            repository,
            Arc::new(FakeResolver { fail: false }),
            mailer.clone(),
            SweepPolicy::default(),
        );

        let outcome = s.dispatch(&alert(1, "maribor", 50.0, 100.0)).await;

        // The email went out even though the write failed.
        assert_eq!(mailer.sent_count(), 1);
        assert!(matches!(
            outcome,
            DispatchOutcome::Failed(DispatchError::RepositoryWrite(_))
        ));
    }

    #[tokio::test]
    async fn test_cooldown_skips_recently_notified() {
        let repository = Arc::new(FakeRepository::new(vec![]));
        let mailer = Arc::new(FakeMailer::new());
        let policy = SweepPolicy {
            cooldown: Some(chrono::Duration::hours(1)),
            ..SweepPolicy::default()
        };
        let s = sweeper(
            repository.clone(),
            Arc::new(FakeResolver { fail: false }),
            mailer.clone(),
            policy,
        );

        let mut recent = alert(1, "maribor", 50.0, 100.0);
        recent.last_sent_at = Some(Utc::now() - chrono::Duration::minutes(5));

        let outcome = s.dispatch(&recent).await;

        assert_eq!(outcome, DispatchOutcome::Skipped(SkipReason::CoolingDown));
        assert_eq!(mailer.sent_count(), 0);
        assert!(repository.updated_ids().is_empty());
    }

    #[tokio::test]
    async fn test_cooldown_elapsed_sends_again() {
        let repository = Arc::new(FakeRepository::new(vec![]));
        let mailer = Arc::new(FakeMailer::new());
        let policy = SweepPolicy {
            cooldown: Some(chrono::Duration::hours(1)),
            ..SweepPolicy::default()
        };
        let s = sweeper(
            repository,
            Arc::new(FakeResolver { fail: false }),
            mailer.clone(),
            policy,
        );

        let mut stale = alert(1, "maribor", 50.0, 100.0);
        stale.last_sent_at = Some(Utc::now() - chrono::Duration::hours(2));

        let outcome = s.dispatch(&stale).await;

        assert_eq!(outcome, DispatchOutcome::Sent);
        assert_eq!(mailer.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_run_aggregates_outcomes() {
        let alerts = vec![
            alert(1, "maribor", 50.0, 100.0),   // sent
            alert(2, "Ljubljana", 200.0, 300.0), // no matches
            alert(3, "piran", 100.0, 200.0),    // sent
        ];
        let repository = Arc::new(FakeRepository::new(alerts));
        let mailer = Arc::new(FakeMailer::new());
        let s = sweeper(
            repository.clone(),
            Arc::new(FakeResolver { fail: false }),
            mailer.clone(),
            SweepPolicy::default(),
        );

        let report = s.run().await.unwrap();

        assert_eq!(
            report,
            SweepReport {
                sent: 2,
                skipped: 1,
                failed: 0
            }
        );
        assert_eq!(mailer.sent_count(), 2);
        let mut updated = repository.updated_ids();
        updated.sort_unstable();
        assert_eq!(updated, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_run_failure_on_one_alert_does_not_abort_rest() {
        let alerts = vec![
            alert(1, "maribor", 50.0, 100.0),
            alert(2, "piran", 100.0, 200.0),
        ];
        let repository = Arc::new(FakeRepository::new(alerts));
        let s = sweeper(
            repository,
            Arc::new(FakeResolver { fail: true }),
            Arc::new(FakeMailer::new()),
            SweepPolicy::default(),
        );

        let report = s.run().await.unwrap();

        assert_eq!(report.failed, 2);
        assert_eq!(report.sent, 0);
    }

    #[tokio::test]
    async fn test_overlapping_run_rejected() {
        let s = sweeper(
            Arc::new(FakeRepository::new(vec![])),
            Arc::new(FakeResolver { fail: false }),
            Arc::new(FakeMailer::new()),
            SweepPolicy::default(),
        );

        let guard = s.run_token.clone().try_lock_owned().unwrap();
        let result = s.run().await;
        drop(guard);

        assert!(matches!(result, Err(SweepError::AlreadyRunning)));
        assert!(s.run().await.is_ok());
    }
}
