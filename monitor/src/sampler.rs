//! Metrics sampler
//!
//! Produces one [`MetricSample`] per tick by fanning out a health check for
//! every inventory entry and waiting for all of them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::debug;

use crate::config::Inventory;
use crate::health::HealthChecker;
use crate::metrics::MetricSample;

pub struct MetricsSampler<H> {
    checker: H,
    inventory: Inventory,
}

impl<H: HealthChecker> MetricsSampler<H> {
    pub fn new(checker: H, inventory: Inventory) -> Self {
        Self { checker, inventory }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Take one sample stamped with `timestamp`
    pub async fn sample(&self, timestamp: DateTime<Utc>) -> MetricSample {
        let checker = &self.checker;

        let agents = join_all(self.inventory.agents.iter().map(|name| async move {
            (name.clone(), checker.check_agent(name).await)
        }));
        let servers = join_all(self.inventory.mcp_servers.iter().map(|name| async move {
            (name.clone(), checker.check_mcp_server(name).await)
        }));
        let workflows = join_all(self.inventory.workflows.iter().map(|name| async move {
            (name.clone(), checker.check_workflow(name).await)
        }));

        let (system, agents, servers, workflows) =
            futures::join!(checker.check_system(), agents, servers, workflows);

        debug!(
            agents = agents.len(),
            mcp_servers = servers.len(),
            workflows = workflows.len(),
            "Sample collected"
        );

        MetricSample {
            timestamp,
            system,
            agents: agents.into_iter().collect::<BTreeMap<_, _>>(),
            mcp_servers: servers.into_iter().collect::<BTreeMap<_, _>>(),
            workflows: workflows.into_iter().collect::<BTreeMap<_, _>>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::SimulatedHealthChecker;

    #[tokio::test]
    async fn test_sample_covers_inventory() {
        let inventory = Inventory::default();
        let sampler = MetricsSampler::new(SimulatedHealthChecker::without_delays(), inventory.clone());
        let now = Utc::now();

        let sample = sampler.sample(now).await;

        assert_eq!(sample.timestamp, now);
        assert_eq!(sample.agents.len(), inventory.agents.len());
        assert_eq!(sample.mcp_servers.len(), inventory.mcp_servers.len());
        assert_eq!(sample.workflows.len(), inventory.workflows.len());
        for name in &inventory.mcp_servers {
            assert!(sample.mcp_servers.contains_key(name));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_checks_run_concurrently() {
        let sampler = MetricsSampler::new(SimulatedHealthChecker::new(), Inventory::default());
        let started = tokio::time::Instant::now();

        sampler.sample(Utc::now()).await;

        // Sequential checks could take up to 10*100 + 8*50 + 5*30 ms
        assert!(started.elapsed() <= std::time::Duration::from_millis(100));
    }
}
