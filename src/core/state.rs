//! 周期状态：阶段与周期报告
//!
//! Idle -> Monitoring -> Strategizing (-> Strategizing ...) -> Resolving -> Executing -> Idle

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::arbitration::ArbitrationReport;
use crate::knowledge::Plan;
use crate::strategy::ConditionSignal;

/// 适配周期所处阶段
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum CyclePhase {
    #[default]
    Idle,
    Monitoring,
    Strategizing,
    Resolving,
    Executing,
}

/// 一次 adapt 的结果摘要
#[derive(Clone, Debug, Serialize)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// 本周期 strategize 的轮数（1 + 重评估次数）
    pub passes: usize,
    /// 触发重评估的信号（出现顺序）
    pub signals: Vec<ConditionSignal>,
    /// 未进入执行阶段时为 None
    pub arbitration: Option<ArbitrationReport>,
    /// execute 协作方的返回值；未执行时为 None
    pub executed: Option<bool>,
    /// 下发的计划（执行后知识库中的计划已清空）
    pub plan: Plan,
}

impl CycleReport {
    pub(crate) fn new() -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            started_at: Utc::now(),
            passes: 0,
            signals: Vec::new(),
            arbitration: None,
            executed: None,
            plan: Plan::new(),
        }
    }
}
