//! 冲突解决策略
//!
//! 策略必须为每个冲突选出唯一取值并写入 Plan。引擎不校验完整性：漏写 key 属于策略缺陷。

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::knowledge::{ChangeProposal, Plan};

/// 同一 key 上的 ≥2 个提案（按提案插入顺序）
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub key: String,
    pub proposals: Vec<ChangeProposal>,
}

pub trait ConflictPolicy: Send + Sync {
    fn name(&self) -> &str {
        "custom"
    }

    fn resolve(&self, conflicts: Vec<Conflict>, plan: &mut Plan);
}

/// 闭包即策略：`|conflicts, plan| { ... }`
impl<F> ConflictPolicy for F
where
    F: Fn(Vec<Conflict>, &mut Plan) + Send + Sync,
{
    fn resolve(&self, conflicts: Vec<Conflict>, plan: &mut Plan) {
        self(conflicts, plan)
    }
}

/// 默认策略：按提案者优先级降序稳定排序取第一个；同优先级保留最早插入的提案
#[derive(Debug, Clone, Copy, Default)]
pub struct HighestPriorityWins;

impl ConflictPolicy for HighestPriorityWins {
    fn name(&self) -> &str {
        "highest_priority"
    }

    fn resolve(&self, conflicts: Vec<Conflict>, plan: &mut Plan) {
        for Conflict { key, mut proposals } in conflicts {
            proposals.sort_by_key(|p| Reverse(p.proposer().priority));
            if let Some(winner) = proposals.into_iter().next() {
                tracing::debug!(
                    key = %key,
                    winner = %winner.proposer().strategy,
                    priority = winner.proposer().priority,
                    "Conflict resolved"
                );
                plan.set(key, winner.into_value());
            }
        }
    }
}

/// 最后写入者胜出（忽略优先级）
#[derive(Debug, Clone, Copy, Default)]
pub struct LastWriterWins;

impl ConflictPolicy for LastWriterWins {
    fn name(&self) -> &str {
        "last_writer"
    }

    fn resolve(&self, conflicts: Vec<Conflict>, plan: &mut Plan) {
        for Conflict { key, proposals } in conflicts {
            if let Some(last) = proposals.into_iter().last() {
                plan.set(key, last.into_value());
            }
        }
    }
}

/// 可由配置选择的内置策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    HighestPriority,
    LastWriter,
}

impl PolicyKind {
    pub fn build(self) -> Box<dyn ConflictPolicy> {
        match self {
            PolicyKind::HighestPriority => Box::new(HighestPriorityWins),
            PolicyKind::LastWriter => Box::new(LastWriterWins),
        }
    }
}
