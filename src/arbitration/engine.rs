//! 仲裁引擎
//!
//! 输入一个周期取出的变更管道：按 key 分组，单提案直接写入 Plan，≥2 个提案构成冲突交给可插拔策略解决。

use std::collections::HashMap;

use serde::Serialize;

use crate::arbitration::policy::{Conflict, ConflictPolicy, HighestPriorityWins};
use crate::knowledge::{ChangeProposal, Plan};

/// 一次仲裁的统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArbitrationReport {
    pub proposals: usize,
    /// 无冲突直接写入的 key 数
    pub trivial: usize,
    /// 发生冲突的 key（首次出现顺序）
    pub conflicts: Vec<String>,
    /// 策略返回后仍不在 Plan 中的冲突 key（策略缺陷，仅记录）
    pub unresolved: Vec<String>,
}

pub struct Arbiter {
    policy: Box<dyn ConflictPolicy>,
}

impl Default for Arbiter {
    fn default() -> Self {
        Self::new(Box::new(HighestPriorityWins))
    }
}

impl Arbiter {
    pub fn new(policy: Box<dyn ConflictPolicy>) -> Self {
        Self { policy }
    }

    pub fn with_policy(policy: impl ConflictPolicy + 'static) -> Self {
        Self::new(Box::new(policy))
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// 合并提案到 plan，冲突交给策略
    pub fn arbitrate(&self, proposals: Vec<ChangeProposal>, plan: &mut Plan) -> ArbitrationReport {
        let total = proposals.len();
        let (singles, conflicts) = detect_conflicts(proposals);

        let trivial = singles.len();
        for p in singles {
            let key = p.key().to_string();
            plan.set(key, p.into_value());
        }

        let conflict_keys: Vec<String> = conflicts.iter().map(|c| c.key.clone()).collect();
        if !conflicts.is_empty() {
            tracing::info!(
                policy = self.policy.name(),
                keys = ?conflict_keys,
                "Resolving conflicts"
            );
            self.policy.resolve(conflicts, plan);
        }

        let unresolved: Vec<String> = conflict_keys
            .iter()
            .filter(|k| !plan.contains_key(k))
            .cloned()
            .collect();
        if !unresolved.is_empty() {
            tracing::warn!(
                policy = self.policy.name(),
                keys = ?unresolved,
                "Conflict policy left keys out of the plan"
            );
        }

        ArbitrationReport {
            proposals: total,
            trivial,
            conflicts: conflict_keys,
            unresolved,
        }
    }
}

/// 按 key 分组（保持 key 首次出现顺序与组内插入顺序），拆分为单提案与冲突
pub fn detect_conflicts(proposals: Vec<ChangeProposal>) -> (Vec<ChangeProposal>, Vec<Conflict>) {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<ChangeProposal>> = HashMap::new();
    for p in proposals {
        let key = p.key().to_string();
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(p);
    }

    let mut singles = Vec::new();
    let mut conflicts = Vec::new();
    for key in order {
        let Some(mut group) = groups.remove(&key) else {
            continue;
        };
        if group.len() == 1 {
            singles.extend(group.pop());
        } else {
            conflicts.push(Conflict {
                key,
                proposals: group,
            });
        }
    }
    (singles, conflicts)
}
