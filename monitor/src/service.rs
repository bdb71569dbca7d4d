//! Monitor service
//!
//! Owns all mutable monitoring state and drives the tick pipeline:
//! sample, persist, evaluate and record alerts, sweep old files. The
//! dashboard report is written on demand and once more at shutdown.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::alerts::{Alert, AlertEvaluator, AlertLog, AlertNotifier, LogNotifier};
use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::health::HealthChecker;
use crate::metrics::MetricSample;
use crate::report::{build_report, DashboardReport, ReportInputs};
use crate::retention;
use crate::sampler::MetricsSampler;
use crate::store::MetricsStore;

/// Service lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Idle,
    Running,
    ShuttingDown,
    Terminated,
}

/// Running totals since start
#[derive(Debug, Clone, Default)]
pub struct ServiceStats {
    /// Completed ticks
    pub ticks: u64,

    /// Alerts recorded, including monitoring errors
    pub alerts_raised: u64,

    /// Tick steps that failed
    pub step_failures: u64,

    /// Daily files removed by retention
    pub files_removed: u64,
}

/// Result of a single tick
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// Daily file the sample was appended to
    pub persisted: Option<PathBuf>,

    /// Alerts recorded this tick
    pub alerts: Vec<Alert>,

    /// Daily files deleted by the sweep
    pub removed: Vec<PathBuf>,
}

pub struct MonitorService<H> {
    config: MonitorConfig,
    sampler: MetricsSampler<H>,
    evaluator: AlertEvaluator,
    store: MetricsStore,
    alerts: AlertLog,
    notifier: Box<dyn AlertNotifier>,
    latest: Option<MetricSample>,
    status: ServiceStatus,
    stats: ServiceStats,
}

impl<H: HealthChecker> MonitorService<H> {
    /// Create the service and its log directories
    pub fn new(config: MonitorConfig, checker: H) -> Result<Self> {
        info!("Initializing MCP observability monitor");

        let store = MetricsStore::new(&config.log_dir, config.alerts_dir(), config.max_alerts);
        store.ensure_dirs()?;

        Ok(Self {
            sampler: MetricsSampler::new(checker, config.inventory.clone()),
            evaluator: AlertEvaluator::new(config.alert_thresholds.clone()),
            alerts: AlertLog::new(config.max_alerts),
            notifier: Box::new(LogNotifier),
            latest: None,
            status: ServiceStatus::Idle,
            stats: ServiceStats::default(),
            store,
            config,
        })
    }

    /// Replace the alert notifier
    pub fn with_notifier(mut self, notifier: Box<dyn AlertNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn status(&self) -> ServiceStatus {
        self.status
    }

    pub fn stats(&self) -> &ServiceStats {
        &self.stats
    }

    pub fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    pub fn latest_sample(&self) -> Option<&MetricSample> {
        self.latest.as_ref()
    }

    pub fn store(&self) -> &MetricsStore {
        &self.store
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Idle -> Running
    pub fn start(&mut self) -> Result<()> {
        if self.status != ServiceStatus::Idle {
            warn!(status = ?self.status, "Monitoring already started");
            return Err(MonitorError::Lifecycle(format!(
                "cannot start from {:?}",
                self.status
            )));
        }

        self.status = ServiceStatus::Running;
        info!(
            retention_days = self.config.retention_days,
            log_dir = %self.config.log_dir.display(),
            "Monitoring started"
        );
        Ok(())
    }

    /// Run one sampling cycle stamped with `now`
    ///
    /// A failing persistence or sweep step is logged, recorded as a
    /// `MONITORING_ERROR` alert and skipped; the rest of the tick still runs.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<TickOutcome> {
        if self.status != ServiceStatus::Running {
            return Err(MonitorError::Lifecycle(format!(
                "cannot tick while {:?}",
                self.status
            )));
        }

        debug!(timestamp = %now, "Collecting metrics");
        let sample = self.sampler.sample(now).await;
        let mut outcome = TickOutcome::default();
        let mut raised = Vec::new();

        match self.store.persist_sample(&sample) {
            Ok(path) => outcome.persisted = Some(path),
            Err(e) => {
                error!(error = %e, "Failed to persist metrics");
                self.stats.step_failures += 1;
                raised.push(Alert::monitoring_error(e.to_string(), now));
            }
        }

        let breaches = self.evaluator.evaluate(&sample, now);
        if breaches.is_empty() {
            info!("All systems healthy - no alerts");
        } else {
            info!(count = breaches.len(), "Processing alerts");
        }
        raised.extend(breaches);

        match retention::sweep(&self.config.log_dir, self.config.retention_days, now.date_naive()) {
            Ok(removed) => {
                self.stats.files_removed += removed.len() as u64;
                outcome.removed = removed;
            }
            Err(e) => {
                error!(error = %e, "Retention sweep failed");
                self.stats.step_failures += 1;
                raised.push(Alert::monitoring_error(e.to_string(), now));
            }
        }

        outcome.alerts = self.record_alerts(raised, now);
        self.latest = Some(sample);
        self.stats.ticks += 1;

        Ok(outcome)
    }

    /// Notify, retain and persist alerts; returns everything recorded
    fn record_alerts(&mut self, mut alerts: Vec<Alert>, now: DateTime<Utc>) -> Vec<Alert> {
        if alerts.is_empty() {
            return alerts;
        }

        if let Err(e) = self.store.append_alerts(&alerts) {
            error!(error = %e, "Failed to store alerts");
            self.stats.step_failures += 1;
            alerts.push(Alert::monitoring_error(e.to_string(), now));
        }

        for alert in &alerts {
            self.notifier.notify(alert);
        }

        self.stats.alerts_raised += alerts.len() as u64;
        self.alerts.extend(alerts.iter().cloned());
        alerts
    }

    /// Tick every `period` until `shutdown` resolves, then shut down
    ///
    /// The first tick fires immediately. A tick always runs to completion
    /// before the shutdown signal is observed.
    pub async fn run<F>(&mut self, period: Duration, shutdown: F) -> Result<DashboardReport>
    where
        F: Future<Output = Result<()>>,
    {
        self.start()?;
        info!(interval_ms = period.as_millis() as u64, "Metrics collection active");

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                signal = &mut shutdown => {
                    if let Err(e) = signal {
                        error!(error = %e, "Shutdown signal failed, stopping");
                        self.shutdown()?;
                        return Err(e);
                    }
                    info!("Shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    let outcome = self.tick(Utc::now()).await?;
                    debug!(
                        alerts = outcome.alerts.len(),
                        removed = outcome.removed.len(),
                        "Tick complete"
                    );
                }
            }
        }

        self.shutdown()
    }

    /// Running -> ShuttingDown -> Terminated, writing the final report
    pub fn shutdown(&mut self) -> Result<DashboardReport> {
        if self.status != ServiceStatus::Running {
            return Err(MonitorError::Lifecycle(format!(
                "cannot shut down while {:?}",
                self.status
            )));
        }

        info!("Shutting down monitoring system");
        self.status = ServiceStatus::ShuttingDown;
        let report = self.generate_report(Utc::now());
        self.status = ServiceStatus::Terminated;

        info!(ticks = self.stats.ticks, alerts = self.stats.alerts_raised, "Monitoring system shutdown complete");
        report
    }

    /// Build the dashboard report and write it to `dashboard-report.json`
    pub fn generate_report(&self, now: DateTime<Utc>) -> Result<DashboardReport> {
        let report = build_report(
            ReportInputs {
                alerts: &self.alerts,
                latest: self.latest.as_ref(),
                agent_count: self.sampler.inventory().agents.len(),
                server_count: self.sampler.inventory().mcp_servers.len(),
                uptime_secs: sysinfo::System::uptime(),
            },
            now,
        );

        let path = self.store.write_report(&report)?;
        info!(file = %path.display(), "Dashboard report generated");
        Ok(report)
    }
}
