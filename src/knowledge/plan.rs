//! 变更提案与计划
//!
//! 策略在 plan 阶段产出 ChangeProposal（追加到变更管道）；仲裁后得到 Plan：每个 key 恰好一个值。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 提案者身份：策略名 + 仲裁用优先级 + 本轮评估序号（用于同优先级时的稳定排序）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposer {
    pub strategy: String,
    pub goal: String,
    pub priority: i64,
    pub order: usize,
}

impl Proposer {
    pub fn new(strategy: impl Into<String>, goal: impl Into<String>, priority: i64) -> Self {
        Self {
            strategy: strategy.into(),
            goal: goal.into(),
            priority,
            order: 0,
        }
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }
}

/// 单条变更提案，创建后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeProposal {
    proposer: Proposer,
    key: String,
    value: Value,
}

impl ChangeProposal {
    pub fn new(proposer: Proposer, key: impl Into<String>, value: Value) -> Self {
        Self {
            proposer,
            key: key.into(),
            value,
        }
    }

    pub fn proposer(&self) -> &Proposer {
        &self.proposer
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

/// 已解决的计划：key -> 单一值。交给 execute 协作方后清空
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    entries: BTreeMap<String, Value>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入（覆盖）一个 key 的最终值
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 以 JSON 对象形式导出，供 execute 协作方提交
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Plan {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
