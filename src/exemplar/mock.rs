//! Mock 受管系统（用于测试，无需网络与容器）
//!
//! monitor 依次弹出预置的负载（或失败），队列为空时返回空对象；execute 记录每个提交的计划。

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::exemplar::traits::{Executor, Monitor};
use crate::knowledge::Plan;

#[derive(Debug)]
pub struct MockExemplar {
    script: Mutex<VecDeque<Result<Value, String>>>,
    executed: Mutex<Vec<Plan>>,
    accept: bool,
}

impl Default for MockExemplar {
    fn default() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            executed: Mutex::new(Vec::new()),
            accept: true,
        }
    }
}

impl MockExemplar {
    pub fn new() -> Self {
        Self::default()
    }

    /// execute 一律返回 false（受管系统拒绝计划）
    pub fn rejecting() -> Self {
        Self {
            accept: false,
            ..Self::default()
        }
    }

    pub fn push_payload(&self, payload: Value) {
        lock(&self.script).push_back(Ok(payload));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        lock(&self.script).push_back(Err(message.into()));
    }

    /// 已提交的计划（提交顺序）
    pub fn executed(&self) -> Vec<Plan> {
        lock(&self.executed).clone()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Monitor for MockExemplar {
    async fn monitor(&self) -> anyhow::Result<Value> {
        let next = lock(&self.script).pop_front();
        match next {
            Some(Ok(payload)) => Ok(payload),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(Value::Object(Default::default())),
        }
    }
}

#[async_trait]
impl Executor for MockExemplar {
    async fn execute(&self, plan: &Plan) -> anyhow::Result<bool> {
        lock(&self.executed).push(plan.clone());
        Ok(self.accept)
    }
}
