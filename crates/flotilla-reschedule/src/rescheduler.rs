//! Rescheduler: stamps marker values onto services and waits for nodes.
//!
//! Two jobs share one instance:
//!
//! - `reschedule_one` / `reschedule_all` stamp a marker into the
//!   environment of services labeled `filter_label=filter_value`, which
//!   makes the orchestrator recreate their tasks.
//! - `wait_for_node_count` spawns a background loop that polls the joined
//!   node count of a group and, once it reaches the target, runs
//!   `reschedule_all`. At most one loop is active: starting a new wait
//!   signals the previous one, which reports a cancellation status and
//!   exits before rescheduling anything.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use flotilla_core::config::RescheduleConfig;
use flotilla_core::{NodeGroup, ServiceDescriptor};
use flotilla_orchestrator::{
    Inspector, NodeCounter, Orchestrator, OrchestratorError, ServiceLister, ServiceUpdater,
};

use crate::error::{RescheduleError, RescheduleResult, ServiceFailure};
use crate::marker::stamp_marker;

/// Status emitted by a wait that was replaced by a newer one.
pub const CANCELED_STATUS: &str = "rescheduling canceled by another rescheduler";

/// Shortest poll period; zero intervals from hand-built settings are raised to it.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Rescheduler settings, resolved from `[reschedule]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescheduleSettings {
    pub filter_label: String,
    pub filter_value: String,
    pub env_key: String,
    /// Node-count poll interval.
    pub interval: Duration,
    /// Overall wait timeout.
    pub timeout: Duration,
}

impl RescheduleSettings {
    pub fn from_config(cfg: &RescheduleConfig) -> anyhow::Result<Self> {
        let interval = cfg.interval()?;
        if interval.is_zero() {
            anyhow::bail!("reschedule interval must be greater than zero");
        }
        Ok(Self {
            filter_label: cfg.filter_label.clone(),
            filter_value: cfg.filter_value.clone(),
            env_key: cfg.env_key.clone(),
            interval,
            timeout: cfg.timeout()?,
        })
    }
}

/// Services rescheduled by `reschedule_all`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RescheduleSummary {
    pub rescheduled: Vec<String>,
}

impl RescheduleSummary {
    pub fn message(&self) -> String {
        if self.rescheduled.is_empty() {
            "no services rescheduled".to_string()
        } else {
            format!("{} rescheduled", self.rescheduled.join(", "))
        }
    }
}

/// Receivers for the outcome of one wait.
///
/// A wait emits at most one message on each channel, then closes both:
///
/// | Outcome | `status` | `errors` |
/// |---|---|---|
/// | nodes up, reschedule ok | success status | `Ok(())` |
/// | reschedule failed | - | `Err(..)` |
/// | node count unreadable | - | `Err(NodeCount)` |
/// | timed out | - | `Err(Timeout)` |
/// | replaced by a newer wait | [`CANCELED_STATUS`] | - |
pub struct WaitChannels {
    pub status: mpsc::Receiver<String>,
    pub errors: mpsc::Receiver<RescheduleResult<()>>,
}

/// The live wait, owned by the rescheduler.
struct WaitSlot {
    cancel: watch::Sender<bool>,
    active: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// State shared with the background wait loop.
struct Shared {
    orchestrator: Arc<dyn Orchestrator>,
    settings: RescheduleSettings,
}

pub struct Rescheduler {
    shared: Arc<Shared>,
    wait: Mutex<Option<WaitSlot>>,
}

impl Rescheduler {
    pub fn new<O>(orchestrator: Arc<O>, settings: RescheduleSettings) -> Self
    where
        O: Orchestrator + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                orchestrator,
                settings,
            }),
            wait: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &RescheduleSettings {
        &self.shared.settings
    }

    /// Stamp `marker` onto one labeled service.
    pub async fn reschedule_one(&self, service_id: &str, marker: &str) -> RescheduleResult<()> {
        self.shared.reschedule_one(service_id, marker).await
    }

    /// Stamp `marker` onto every labeled service.
    pub async fn reschedule_all(&self, marker: &str) -> RescheduleResult<RescheduleSummary> {
        self.shared.reschedule_all(marker).await
    }

    /// Start waiting for `target` nodes in `group`, then reschedule all
    /// labeled services with `marker`.
    ///
    /// Returns immediately. Any wait already in progress is canceled
    /// first. Must be called from within a tokio runtime.
    pub fn wait_for_node_count(
        &self,
        group: NodeGroup,
        target: u64,
        marker: &str,
    ) -> WaitChannels {
        let (status_tx, status_rx) = mpsc::channel(1);
        let (errors_tx, errors_rx) = mpsc::channel(1);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let active = Arc::new(AtomicBool::new(true));

        let request = WaitRequest {
            group,
            target,
            marker: marker.to_string(),
        };

        let mut slot = self.wait.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.take() {
            if previous.active.load(Ordering::SeqCst) {
                info!("canceling previous node wait");
            }
            let _ = previous.cancel.send(true);
        }

        let handle = tokio::spawn(run_wait(
            self.shared.clone(),
            request,
            cancel_rx,
            active.clone(),
            status_tx,
            errors_tx,
        ));
        *slot = Some(WaitSlot {
            cancel: cancel_tx,
            active,
            handle,
        });

        info!(%group, target, "waiting for nodes before rescheduling");
        WaitChannels {
            status: status_rx,
            errors: errors_rx,
        }
    }

    /// Whether a wait loop is currently polling.
    pub fn is_waiting(&self) -> bool {
        self.wait
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|slot| slot.active.load(Ordering::SeqCst))
    }

    /// Cancel the active wait, if any, and let it exit.
    pub async fn shutdown(&self) {
        let slot = self
            .wait
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(slot) = slot {
            let _ = slot.cancel.send(true);
            if let Err(e) = slot.handle.await {
                warn!(error = %e, "node wait task ended abnormally");
            }
            debug!("rescheduler shut down");
        }
    }
}

impl Shared {
    async fn reschedule_one(&self, service_id: &str, marker: &str) -> RescheduleResult<()> {
        let service = self
            .orchestrator
            .describe(service_id)
            .await
            .map_err(|source| RescheduleError::Inspect {
                service: service_id.to_string(),
                source,
            })?;

        let label = &self.settings.filter_label;
        let value = &self.settings.filter_value;
        match service.labels.get(label) {
            Some(actual) if actual == value => {}
            actual => {
                return Err(RescheduleError::not_labeled(
                    &service.name,
                    label,
                    value,
                    actual.map(String::as_str),
                ));
            }
        }

        let name = service.name.clone();
        self.stamp(service, marker)
            .await
            .map_err(|source| RescheduleError::Update {
                service: name,
                source,
            })
    }

    async fn reschedule_all(&self, marker: &str) -> RescheduleResult<RescheduleSummary> {
        let label = &self.settings.filter_label;
        let value = &self.settings.filter_value;
        let services = self
            .orchestrator
            .list(label, value)
            .await
            .map_err(|source| RescheduleError::List {
                label: label.clone(),
                value: value.clone(),
                source,
            })?;

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for service in services {
            let name = service.name.clone();
            match self.stamp(service, marker).await {
                Ok(()) => succeeded.push(name),
                Err(error) => {
                    warn!(service = %name, %error, "reschedule failed");
                    failed.push(ServiceFailure {
                        service: name,
                        error,
                    });
                }
            }
        }

        if failed.is_empty() {
            Ok(RescheduleSummary {
                rescheduled: succeeded,
            })
        } else {
            Err(RescheduleError::Partial { failed, succeeded })
        }
    }

    /// Write the marker into the service's environment and push the spec.
    async fn stamp(
        &self,
        mut service: ServiceDescriptor,
        marker: &str,
    ) -> Result<(), OrchestratorError> {
        if !stamp_marker(&mut service.env, &self.settings.env_key, marker) {
            debug!(service = %service.name, marker, "marker already set");
            return Ok(());
        }

        let id = service.id.clone();
        let version = service.version;
        let name = service.name.clone();
        self.orchestrator.update(&id, version, service).await?;
        info!(service = %name, key = %self.settings.env_key, marker, "service rescheduled");
        Ok(())
    }
}

struct WaitRequest {
    group: NodeGroup,
    target: u64,
    marker: String,
}

enum WaitOutcome {
    Completed(RescheduleSummary),
    Canceled,
    Failed(RescheduleError),
}

async fn run_wait(
    shared: Arc<Shared>,
    request: WaitRequest,
    mut cancel: watch::Receiver<bool>,
    active: Arc<AtomicBool>,
    status: mpsc::Sender<String>,
    errors: mpsc::Sender<RescheduleResult<()>>,
) {
    let outcome = poll_until_ready(&shared, &request, &mut cancel).await;
    active.store(false, Ordering::SeqCst);

    match outcome {
        WaitOutcome::Completed(summary) => {
            let message = format!(
                "{} {} nodes are up, {}",
                request.target,
                request.group,
                summary.message()
            );
            info!(group = %request.group, target = request.target, "{message}");
            let _ = status.send(message).await;
            let _ = errors.send(Ok(())).await;
        }
        WaitOutcome::Canceled => {
            info!(group = %request.group, target = request.target, "node wait canceled");
            let _ = status.send(CANCELED_STATUS.to_string()).await;
        }
        WaitOutcome::Failed(e) => {
            error!(group = %request.group, target = request.target, error = %e, "node wait failed");
            let _ = errors.send(Err(e)).await;
        }
    }
}

async fn poll_until_ready(
    shared: &Shared,
    request: &WaitRequest,
    cancel: &mut watch::Receiver<bool>,
) -> WaitOutcome {
    let interval = shared.settings.interval.max(MIN_POLL_INTERVAL);
    let timeout = shared.settings.timeout;

    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            // A dropped sender means the rescheduler is gone; stop as well.
            _ = cancel.changed() => return WaitOutcome::Canceled,
            _ = &mut deadline => {
                return WaitOutcome::Failed(RescheduleError::Timeout {
                    waited: timeout,
                    target: request.target,
                    group: request.group,
                });
            }
            _ = ticker.tick() => {}
        }

        let count = match shared.orchestrator.node_count(request.group).await {
            Ok(count) => count,
            Err(source) => {
                return WaitOutcome::Failed(RescheduleError::NodeCount {
                    group: request.group,
                    source,
                });
            }
        };

        if count != request.target {
            debug!(group = %request.group, count, target = request.target, "nodes not ready yet");
            continue;
        }

        // The read above may have raced a newer wait.
        if cancel.has_changed().unwrap_or(true) {
            return WaitOutcome::Canceled;
        }

        return match shared.reschedule_all(&request.marker).await {
            Ok(summary) => WaitOutcome::Completed(summary),
            Err(e) => WaitOutcome::Failed(e),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use tokio::sync::Notify;

    use flotilla_core::ServiceMode;
    use flotilla_orchestrator::{MemoryOrchestrator, OrchestratorFuture};

    const LABEL: &str = "com.flotilla.reschedule";

    fn settings() -> RescheduleSettings {
        RescheduleSettings {
            filter_label: LABEL.to_string(),
            filter_value: "true".to_string(),
            env_key: "RESCHEDULE_DATE".to_string(),
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(100),
        }
    }

    fn service(id: &str, label: Option<&str>) -> ServiceDescriptor {
        let mut labels = HashMap::new();
        if let Some(v) = label {
            labels.insert(LABEL.to_string(), v.to_string());
        }
        ServiceDescriptor {
            id: id.to_string(),
            name: id.to_string(),
            version: 1,
            labels,
            mode: ServiceMode::Replicated { replicas: Some(2) },
            env: vec!["A=1".to_string()],
        }
    }

    async fn setup() -> (MemoryOrchestrator, Rescheduler) {
        let orch = MemoryOrchestrator::new();
        orch.put_service(service("api", Some("true"))).await;
        orch.put_service(service("web", Some("true"))).await;
        orch.put_service(service("db", Some("false"))).await;
        let rescheduler = Rescheduler::new(Arc::new(orch.clone()), settings());
        (orch, rescheduler)
    }

    // ── reschedule_one ──────────────────────────────────────────

    #[tokio::test]
    async fn reschedule_one_stamps_marker() {
        let (orch, r) = setup().await;
        r.reschedule_one("api", "100").await.unwrap();

        let stored = orch.service("api").await.unwrap();
        assert_eq!(stored.env, vec!["A=1", "RESCHEDULE_DATE=100"]);
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn reschedule_one_is_idempotent() {
        let (orch, r) = setup().await;
        r.reschedule_one("api", "100").await.unwrap();
        r.reschedule_one("api", "100").await.unwrap();
        assert_eq!(orch.update_calls("api").await, 1);

        r.reschedule_one("api", "200").await.unwrap();
        assert_eq!(orch.update_calls("api").await, 2);
        assert_eq!(
            orch.service("api").await.unwrap().env,
            vec!["A=1", "RESCHEDULE_DATE=200"]
        );
    }

    #[tokio::test]
    async fn reschedule_one_requires_label() {
        let (orch, r) = setup().await;
        orch.put_service(service("plain", None)).await;

        let err = r.reschedule_one("plain", "1").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "plain is not labeled with com.flotilla.reschedule=true (no label)"
        );
        let err = r.reschedule_one("db", "1").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "db is not labeled with com.flotilla.reschedule=true (com.flotilla.reschedule=false)"
        );
        assert!(err.is_invalid_target());
        assert_eq!(orch.total_update_calls().await, 0);
    }

    #[tokio::test]
    async fn reschedule_one_wraps_update_failure() {
        let (orch, r) = setup().await;
        orch.fail_updates("api").await;
        let err = r.reschedule_one("api", "1").await.unwrap_err();
        assert!(matches!(err, RescheduleError::Update { ref service, .. } if service == "api"));
    }

    #[tokio::test]
    async fn reschedule_one_unknown_service() {
        let (_orch, r) = setup().await;
        let err = r.reschedule_one("ghost", "1").await.unwrap_err();
        assert!(err.is_not_found());
    }

    // ── reschedule_all ──────────────────────────────────────────

    #[tokio::test]
    async fn reschedule_all_updates_labeled_services() {
        let (orch, r) = setup().await;
        let summary = r.reschedule_all("7").await.unwrap();
        assert_eq!(summary.rescheduled, vec!["api", "web"]);
        assert_eq!(summary.message(), "api, web rescheduled");
        assert_eq!(orch.update_calls("db").await, 0);
    }

    #[tokio::test]
    async fn reschedule_all_continues_past_failures() {
        let (orch, r) = setup().await;
        orch.fail_updates("api").await;

        let err = r.reschedule_all("7").await.unwrap_err();
        match err {
            RescheduleError::Partial {
                ref failed,
                ref succeeded,
            } => {
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].service, "api");
                assert_eq!(succeeded, &vec!["web".to_string()]);
            }
            ref other => panic!("expected partial failure, got {other:?}"),
        }
        assert!(err.to_string().starts_with("failed to reschedule api"));
        assert_eq!(orch.update_calls("web").await, 1);
        assert_eq!(orch.update_calls("api").await, 1);
    }

    #[tokio::test]
    async fn reschedule_all_list_failure_updates_nothing() {
        let (orch, r) = setup().await;
        orch.fail_list().await;
        let err = r.reschedule_all("7").await.unwrap_err();
        assert!(matches!(err, RescheduleError::List { .. }));
        assert_eq!(orch.total_update_calls().await, 0);
    }

    #[tokio::test]
    async fn reschedule_all_with_no_matches() {
        let orch = MemoryOrchestrator::new();
        let r = Rescheduler::new(Arc::new(orch), settings());
        let summary = r.reschedule_all("7").await.unwrap();
        assert_eq!(summary.message(), "no services rescheduled");
    }

    // ── wait_for_node_count ─────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn wait_completes_when_target_reached() {
        let (orch, r) = setup().await;
        orch.set_node_count(NodeGroup::Worker, 2).await;
        assert!(!r.is_waiting());

        let mut ch = r.wait_for_node_count(NodeGroup::Worker, 4, "55");
        assert!(r.is_waiting());

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert!(r.is_waiting());
        assert_eq!(orch.total_update_calls().await, 0);

        orch.set_node_count(NodeGroup::Worker, 4).await;
        let status = ch.status.recv().await.unwrap();
        assert_eq!(status, "4 worker nodes are up, api, web rescheduled");
        assert_eq!(ch.errors.recv().await, Some(Ok(())));
        assert!(!r.is_waiting());
        assert_eq!(orch.update_calls("api").await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn manager_group_reads_manager_count() {
        let (orch, r) = setup().await;
        orch.set_node_count(NodeGroup::Manager, 3).await;
        orch.set_node_count(NodeGroup::Worker, 0).await;

        let mut ch = r.wait_for_node_count(NodeGroup::Manager, 3, "1");
        let status = ch.status.recv().await.unwrap();
        assert!(status.starts_with("3 manager nodes are up"));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_times_out() {
        let (orch, r) = setup().await;
        orch.set_node_count(NodeGroup::Worker, 1).await;

        let mut ch = r.wait_for_node_count(NodeGroup::Worker, 3, "1");
        let err = ch.errors.recv().await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "waited 100s for 3 worker nodes to activate");
        assert!(ch.status.recv().await.is_none());
        assert!(!r.is_waiting());
        assert_eq!(orch.total_update_calls().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn node_count_failure_ends_wait() {
        let (orch, r) = setup().await;
        orch.fail_node_count().await;

        let mut ch = r.wait_for_node_count(NodeGroup::Worker, 3, "1");
        let err = ch.errors.recv().await.unwrap().unwrap_err();
        assert!(matches!(err, RescheduleError::NodeCount { group: NodeGroup::Worker, .. }));
        assert!(ch.status.recv().await.is_none());
        assert!(!r.is_waiting());
    }

    #[tokio::test(start_paused = true)]
    async fn reschedule_failure_reported_on_error_channel() {
        let (orch, r) = setup().await;
        orch.set_node_count(NodeGroup::Worker, 3).await;
        orch.fail_updates("web").await;

        let mut ch = r.wait_for_node_count(NodeGroup::Worker, 3, "1");
        let err = ch.errors.recv().await.unwrap().unwrap_err();
        assert!(matches!(err, RescheduleError::Partial { .. }));
        assert!(ch.status.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn second_wait_cancels_first() {
        let (orch, r) = setup().await;
        orch.set_node_count(NodeGroup::Worker, 1).await;

        let mut first = r.wait_for_node_count(NodeGroup::Worker, 3, "first");
        let mut second = r.wait_for_node_count(NodeGroup::Worker, 3, "second");

        assert_eq!(first.status.recv().await.as_deref(), Some(CANCELED_STATUS));
        assert!(first.status.recv().await.is_none());
        assert!(first.errors.recv().await.is_none());
        assert!(r.is_waiting());

        orch.set_node_count(NodeGroup::Worker, 3).await;
        let status = second.status.recv().await.unwrap();
        assert_eq!(status, "3 worker nodes are up, api, web rescheduled");
        assert_eq!(second.errors.recv().await, Some(Ok(())));
        assert_eq!(
            orch.service("api").await.unwrap().env,
            vec!["A=1", "RESCHEDULE_DATE=second"]
        );
        assert_eq!(orch.update_calls("api").await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_active_wait() {
        let (orch, r) = setup().await;
        orch.set_node_count(NodeGroup::Worker, 0).await;

        let mut ch = r.wait_for_node_count(NodeGroup::Worker, 3, "1");
        r.shutdown().await;
        assert_eq!(ch.status.recv().await.as_deref(), Some(CANCELED_STATUS));
        assert!(!r.is_waiting());
    }

    /// Orchestrator whose next node-count read blocks until released.
    struct GatedCounter {
        inner: MemoryOrchestrator,
        gate_next: AtomicBool,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    impl Inspector for GatedCounter {
        fn describe<'a>(&'a self, id: &'a str) -> OrchestratorFuture<'a, ServiceDescriptor> {
            self.inner.describe(id)
        }
    }

    impl ServiceUpdater for GatedCounter {
        fn update<'a>(
            &'a self,
            id: &'a str,
            version: u64,
            spec: ServiceDescriptor,
        ) -> OrchestratorFuture<'a, ()> {
            self.inner.update(id, version, spec)
        }
    }

    impl ServiceLister for GatedCounter {
        fn list<'a>(
            &'a self,
            label: &'a str,
            value: &'a str,
        ) -> OrchestratorFuture<'a, Vec<ServiceDescriptor>> {
            self.inner.list(label, value)
        }
    }

    impl NodeCounter for GatedCounter {
        fn node_count(&self, group: NodeGroup) -> OrchestratorFuture<'_, u64> {
            Box::pin(async move {
                if self.gate_next.swap(false, Ordering::SeqCst) {
                    self.entered.notify_one();
                    self.release.notified().await;
                }
                self.inner.node_count(group).await
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn canceled_in_flight_tick_does_not_reschedule() {
        let (orch, _) = setup().await;
        orch.set_node_count(NodeGroup::Worker, 3).await;
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let gated = GatedCounter {
            inner: orch.clone(),
            gate_next: AtomicBool::new(true),
            entered: entered.clone(),
            release: release.clone(),
        };
        let r = Rescheduler::new(Arc::new(gated), settings());

        // First wait reads a matching count but is held mid-tick.
        let mut first = r.wait_for_node_count(NodeGroup::Worker, 3, "first");
        entered.notified().await;

        let mut second = r.wait_for_node_count(NodeGroup::Worker, 3, "second");
        release.notify_one();

        assert_eq!(first.status.recv().await.as_deref(), Some(CANCELED_STATUS));
        assert!(first.errors.recv().await.is_none());

        assert_eq!(second.errors.recv().await, Some(Ok(())));
        assert_eq!(orch.update_calls("api").await, 1);
        assert_eq!(
            orch.service("api").await.unwrap().env,
            vec!["A=1", "RESCHEDULE_DATE=second"]
        );
    }

    #[test]
    fn settings_from_config() {
        let cfg = RescheduleConfig {
            interval: "5s".to_string(),
            timeout: "2m".to_string(),
            ..RescheduleConfig::default()
        };
        let s = RescheduleSettings::from_config(&cfg).unwrap();
        assert_eq!(s.interval, Duration::from_secs(5));
        assert_eq!(s.timeout, Duration::from_secs(120));
        assert_eq!(s.env_key, "RESCHEDULE_DATE");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let cfg = RescheduleConfig {
            interval: "0s".to_string(),
            ..RescheduleConfig::default()
        };
        let err = RescheduleSettings::from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_still_polls_and_finishes() {
        let orch = MemoryOrchestrator::new();
        orch.put_service(service("api", Some("true"))).await;
        orch.set_node_count(NodeGroup::Worker, 1).await;
        let r = Rescheduler::new(
            Arc::new(orch.clone()),
            RescheduleSettings {
                interval: Duration::ZERO,
                ..settings()
            },
        );

        let mut ch = r.wait_for_node_count(NodeGroup::Worker, 3, "m");
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(r.is_waiting());

        orch.set_node_count(NodeGroup::Worker, 3).await;
        let status = ch.status.recv().await.unwrap();
        assert_eq!(status, "3 worker nodes are up, api rescheduled");
        assert_eq!(ch.errors.recv().await, Some(Ok(())));
        assert!(!r.is_waiting());
    }
}
