//! 引擎错误类型
//!
//! - SetupError：目标 / 触发器配置错误，注册阶段立即报出
//! - CycleError：适配周期中无法恢复的情况（未消解的条件信号、策略意外失败、协作方失败）

use thiserror::Error;

use crate::strategy::ConditionSignal;

/// 配置期错误（未知目标 / 触发器、重复目标、策略未通过能力检查）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("Goal not found: {0}")]
    GoalNotFound(String),

    #[error("Trigger not found: {0}")]
    TriggerNotFound(String),

    #[error("Goal already registered: {0}")]
    DuplicateGoal(String),

    #[error("Invalid strategy in goal '{goal}': {reason}")]
    InvalidStrategy { goal: String, reason: String },

    #[error("Name must not be empty")]
    EmptyName,
}

/// 适配周期错误；条件信号在重评估上限内被本地恢复，超出后以 UnrecoveredSignal 上抛
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("Unrecovered condition signal: {0}")]
    UnrecoveredSignal(ConditionSignal),

    #[error("Reassessment limit ({limit}) exceeded, signals: {}", format_signals(.signals))]
    ReassessmentLimit {
        limit: usize,
        signals: Vec<ConditionSignal>,
    },

    #[error("Strategy '{strategy}' failed: {reason}")]
    StrategyFailed { strategy: String, reason: String },

    #[error("Monitor failed: {0}")]
    Monitor(#[source] anyhow::Error),

    #[error("Execute failed: {0}")]
    Execute(#[source] anyhow::Error),

    #[error("{call} timed out after {secs}s")]
    Timeout { call: &'static str, secs: u64 },
}

impl CycleError {
    /// 若为未消解的信号，返回该信号
    pub fn signal(&self) -> Option<&ConditionSignal> {
        match self {
            CycleError::UnrecoveredSignal(s) => Some(s),
            _ => None,
        }
    }
}

fn format_signals(signals: &[ConditionSignal]) -> String {
    signals
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
