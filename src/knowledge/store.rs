//! 知识库：观测序列、分析结果、变更管道、计划
//!
//! 同一时刻只被一个适配周期独占（由 AdaptationLoop 的 &mut self 保证）。
//! 观测序列只追加；分析结果每个 key 后写覆盖；变更管道在每个周期开始时清空。

use std::collections::HashMap;

use serde_json::Value;

use crate::knowledge::plan::{ChangeProposal, Plan, Proposer};

/// 协作方使用的 schema（monitor / execute / adaptation options），核心层不解释其内容
#[derive(Debug, Clone, Default)]
pub struct Schemas {
    pub monitor: Option<Value>,
    pub execute: Option<Value>,
    pub adaptation_options: Option<Value>,
}

#[derive(Debug, Default)]
pub struct Knowledge {
    monitored: HashMap<String, Vec<Value>>,
    analysis: HashMap<String, Value>,
    pipeline: Vec<ChangeProposal>,
    plan: Plan,
    pub adaptation_options: Value,
    pub schemas: Schemas,
}

impl Knowledge {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一次观测；序列不存在时创建
    pub fn record_observation(&mut self, name: impl Into<String>, value: Value) {
        self.monitored.entry(name.into()).or_default().push(value);
    }

    /// 将 monitor 返回的新数据并入观测序列：单条记录（对象）或记录列表（对象数组），每个 key 追加一次。
    /// 返回追加的观测条数；非对象记录记 warn 后跳过。
    pub fn fold_monitored(&mut self, fresh: Value) -> usize {
        match fresh {
            Value::Object(record) => self.fold_record(record),
            Value::Array(records) => records
                .into_iter()
                .map(|r| match r {
                    Value::Object(record) => self.fold_record(record),
                    other => {
                        tracing::warn!("Skipping non-object monitor record: {}", other);
                        0
                    }
                })
                .sum(),
            Value::Null => 0,
            other => {
                tracing::warn!("Skipping non-object monitor payload: {}", other);
                0
            }
        }
    }

    fn fold_record(&mut self, record: serde_json::Map<String, Value>) -> usize {
        let n = record.len();
        for (key, value) in record {
            self.record_observation(key, value);
        }
        n
    }

    pub fn observations(&self, name: &str) -> Option<&[Value]> {
        self.monitored.get(name).map(Vec::as_slice)
    }

    /// 某指标最近一次观测值
    pub fn latest(&self, name: &str) -> Option<&Value> {
        self.monitored.get(name).and_then(|s| s.last())
    }

    pub fn monitored(&self) -> &HashMap<String, Vec<Value>> {
        &self.monitored
    }

    pub fn set_analysis(&mut self, name: impl Into<String>, value: Value) {
        self.analysis.insert(name.into(), value);
    }

    pub fn analysis(&self, name: &str) -> Option<&Value> {
        self.analysis.get(name)
    }

    pub fn analysis_data(&self) -> &HashMap<String, Value> {
        &self.analysis
    }

    pub fn propose_change(&mut self, proposer: Proposer, key: impl Into<String>, value: Value) {
        self.pipeline.push(ChangeProposal::new(proposer, key, value));
    }

    pub fn pipeline(&self) -> &[ChangeProposal] {
        &self.pipeline
    }

    /// 取出并清空变更管道，同一提案不会被观察两次
    pub fn drain_pipeline(&mut self) -> Vec<ChangeProposal> {
        std::mem::take(&mut self.pipeline)
    }

    /// 丢弃 len 之后追加的提案（被条件信号中断的评估轮次）
    pub(crate) fn truncate_pipeline(&mut self, len: usize) -> usize {
        let dropped = self.pipeline.len().saturating_sub(len);
        self.pipeline.truncate(len);
        dropped
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn plan_mut(&mut self) -> &mut Plan {
        &mut self.plan
    }

    /// 取走当前计划（留下空计划）
    pub fn take_plan(&mut self) -> Plan {
        std::mem::take(&mut self.plan)
    }
}
