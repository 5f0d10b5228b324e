//! 受管系统网关
//!
//! 持有 Monitor / Executor 与各自超时；每次调用在超时内执行，输出结构化审计日志（JSON），
//! 超时或失败时转为 CycleError（Timeout / Monitor / Execute）。

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::time::timeout;

use crate::config::CollaboratorsSection;
use crate::core::CycleError;
use crate::exemplar::traits::{Executor, Monitor};
use crate::knowledge::Plan;

pub struct ManagedSystem {
    monitor: Arc<dyn Monitor>,
    executor: Arc<dyn Executor>,
    monitor_timeout: Duration,
    execute_timeout: Duration,
}

impl ManagedSystem {
    pub fn new(monitor: Arc<dyn Monitor>, executor: Arc<dyn Executor>) -> Self {
        Self::with_timeouts(monitor, executor, &CollaboratorsSection::default())
    }

    pub fn with_timeouts(
        monitor: Arc<dyn Monitor>,
        executor: Arc<dyn Executor>,
        cfg: &CollaboratorsSection,
    ) -> Self {
        Self {
            monitor,
            executor,
            monitor_timeout: Duration::from_secs(cfg.monitor_timeout_secs),
            execute_timeout: Duration::from_secs(cfg.execute_timeout_secs),
        }
    }

    /// 同一对象同时实现 Monitor 与 Executor 时（如 MockExemplar）
    pub fn from_exemplar<T>(exemplar: Arc<T>, cfg: &CollaboratorsSection) -> Self
    where
        T: Monitor + Executor + 'static,
    {
        Self::with_timeouts(exemplar.clone(), exemplar, cfg)
    }

    pub async fn monitor(&self) -> Result<Value, CycleError> {
        let start = Instant::now();
        let result = timeout(self.monitor_timeout, self.monitor.monitor()).await;
        audit("monitor", outcome(&result), start);
        match result {
            Ok(Ok(fresh)) => Ok(fresh),
            Ok(Err(e)) => Err(CycleError::Monitor(e)),
            Err(_) => Err(CycleError::Timeout {
                call: "monitor",
                secs: self.monitor_timeout.as_secs(),
            }),
        }
    }

    pub async fn execute(&self, plan: &Plan) -> Result<bool, CycleError> {
        let start = Instant::now();
        let result = timeout(self.execute_timeout, self.executor.execute(plan)).await;
        audit("execute", outcome(&result), start);
        match result {
            Ok(Ok(accepted)) => Ok(accepted),
            Ok(Err(e)) => Err(CycleError::Execute(e)),
            Err(_) => Err(CycleError::Timeout {
                call: "execute",
                secs: self.execute_timeout.as_secs(),
            }),
        }
    }
}

fn outcome<T, E, TO>(result: &Result<Result<T, E>, TO>) -> &'static str {
    match result {
        Ok(Ok(_)) => "ok",
        Ok(Err(_)) => "error",
        Err(_) => "timeout",
    }
}

fn audit(call: &str, outcome: &str, start: Instant) {
    let audit = serde_json::json!({
        "event": "collaborator_audit",
        "call": call,
        "ok": outcome == "ok",
        "outcome": outcome,
        "duration_ms": start.elapsed().as_millis() as u64,
    });
    tracing::info!(audit = %audit.to_string(), "collaborator");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exemplar::mock::MockExemplar;
    use async_trait::async_trait;
    use serde_json::json;

    struct SlowMonitor;

    #[async_trait]
    impl Monitor for SlowMonitor {
        async fn monitor(&self) -> anyhow::Result<Value> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(json!({}))
        }
    }

    #[tokio::test]
    async fn test_monitor_passes_payload_through() {
        let mock = Arc::new(MockExemplar::new());
        mock.push_payload(json!({"depth": 3}));
        let system = ManagedSystem::from_exemplar(mock, &CollaboratorsSection::default());
        assert_eq!(system.monitor().await.unwrap(), json!({"depth": 3}));
    }

    #[tokio::test]
    async fn test_monitor_error_maps_to_cycle_error() {
        let mock = Arc::new(MockExemplar::new());
        mock.push_failure("endpoint unreachable");
        let system = ManagedSystem::from_exemplar(mock, &CollaboratorsSection::default());
        let err = system.monitor().await.unwrap_err();
        assert!(matches!(err, CycleError::Monitor(_)));
        assert!(err.to_string().contains("endpoint unreachable"));
    }

    #[tokio::test]
    async fn test_monitor_timeout() {
        let cfg = CollaboratorsSection {
            monitor_timeout_secs: 1,
            execute_timeout_secs: 1,
        };
        let system =
            ManagedSystem::with_timeouts(Arc::new(SlowMonitor), Arc::new(MockExemplar::new()), &cfg);
        let err = system.monitor().await.unwrap_err();
        assert!(matches!(
            err,
            CycleError::Timeout {
                call: "monitor",
                secs: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_execute_records_plan() {
        let mock = Arc::new(MockExemplar::new());
        let system = ManagedSystem::from_exemplar(mock.clone(), &CollaboratorsSection::default());
        let plan: Plan = vec![("speed", json!(2))].into_iter().collect();
        assert!(system.execute(&plan).await.unwrap());
        assert_eq!(mock.executed(), vec![plan]);
    }
}
