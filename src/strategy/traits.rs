//! 策略抽象
//!
//! 任何实现 analyze / plan 的类型都是策略；由 GoalRegistry 在注册时做运行期能力检查（名称等），不依赖继承。
//! 策略只能通过 StrategyContext 读写知识库，无法触碰目标激活状态。

use serde_json::Value;
use thiserror::Error;

use crate::knowledge::{Knowledge, Proposer};
use crate::strategy::signal::ConditionSignal;

/// analyze / plan 的非正常返回：条件信号（预期，驱动重评估）或意外失败
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Condition signal raised: {0}")]
    Signal(ConditionSignal),

    #[error("Strategy failed: {0}")]
    Failed(String),
}

impl From<ConditionSignal> for StrategyError {
    fn from(signal: ConditionSignal) -> Self {
        StrategyError::Signal(signal)
    }
}

/// 策略 trait：名称（身份）、可选仲裁优先级、analyze、plan
///
/// - `analyze` 读取观测与分析结果，写入派生值，返回是否进入 plan
/// - `plan` 读取分析结果，对想影响的 key 调用 `ctx.propose`，返回是否产出了提案
///
/// 两者都可以返回 `StrategyError::Signal` 代替布尔值。策略可持有私有状态（如滞回），引擎从不回滚它。
pub trait Strategy: Send {
    fn name(&self) -> &str;

    /// 冲突仲裁用优先级；None 表示沿用所属目标的优先级
    fn priority(&self) -> Option<i64> {
        None
    }

    fn analyze(&mut self, ctx: &mut StrategyContext<'_>) -> Result<bool, StrategyError>;

    fn plan(&mut self, ctx: &mut StrategyContext<'_>) -> Result<bool, StrategyError>;
}

/// 单个策略一次评估所见的上下文：知识库视图 + 提案者身份 + 本周期已出现的信号
pub struct StrategyContext<'a> {
    knowledge: &'a mut Knowledge,
    proposer: Proposer,
    signals: &'a [ConditionSignal],
    state: &'a Value,
}

impl<'a> StrategyContext<'a> {
    pub fn new(
        knowledge: &'a mut Knowledge,
        proposer: Proposer,
        signals: &'a [ConditionSignal],
        state: &'a Value,
    ) -> Self {
        Self {
            knowledge,
            proposer,
            signals,
            state,
        }
    }

    pub fn proposer(&self) -> &Proposer {
        &self.proposer
    }

    pub fn observations(&self, name: &str) -> Option<&[Value]> {
        self.knowledge.observations(name)
    }

    pub fn latest(&self, name: &str) -> Option<&Value> {
        self.knowledge.latest(name)
    }

    /// 最近一次观测转 f64（非数值时为 None）
    pub fn latest_f64(&self, name: &str) -> Option<f64> {
        self.knowledge.latest(name).and_then(Value::as_f64)
    }

    pub fn analysis(&self, name: &str) -> Option<&Value> {
        self.knowledge.analysis(name)
    }

    pub fn set_analysis(&mut self, name: impl Into<String>, value: Value) {
        self.knowledge.set_analysis(name, value);
    }

    pub fn adaptation_options(&self) -> &Value {
        &self.knowledge.adaptation_options
    }

    /// 以当前策略身份向变更管道追加提案
    pub fn propose(&mut self, key: impl Into<String>, value: Value) {
        self.knowledge
            .propose_change(self.proposer.clone(), key, value);
    }

    /// 本周期已出现的条件信号（按出现顺序）
    pub fn signals(&self) -> &[ConditionSignal] {
        self.signals
    }

    /// 协作方提供的不透明状态
    pub fn state(&self) -> &Value {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::signal::SignalKind;
    use serde_json::json;

    const EMPTY: SignalKind = SignalKind::from_static("empty");

    struct MeanStrategy;

    impl Strategy for MeanStrategy {
        fn name(&self) -> &str {
            "mean"
        }

        fn analyze(&mut self, ctx: &mut StrategyContext<'_>) -> Result<bool, StrategyError> {
            let series = ctx.observations("i1").ok_or_else(|| EMPTY.raise())?;
            let sum: f64 = series.iter().filter_map(Value::as_f64).sum();
            let mean = sum / series.len() as f64;
            ctx.set_analysis("mean_i1", json!(mean));
            Ok(mean > 0.0)
        }

        fn plan(&mut self, ctx: &mut StrategyContext<'_>) -> Result<bool, StrategyError> {
            match ctx.analysis("mean_i1").and_then(Value::as_f64) {
                Some(m) if m > 0.0 => {
                    ctx.propose("o1", json!(2));
                    ctx.propose("o2", json!(5));
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }

    #[test]
    fn test_analyze_then_plan_proposes_with_identity() {
        let mut knowledge = Knowledge::new();
        knowledge.record_observation("i1", json!(2.0));
        knowledge.record_observation("i1", json!(4.0));
        let state = Value::Null;
        let mut s = MeanStrategy;
        {
            let mut ctx =
                StrategyContext::new(&mut knowledge, Proposer::new("mean", "adapt", 3), &[], &state);
            assert_eq!(s.analyze(&mut ctx), Ok(true));
            assert_eq!(s.plan(&mut ctx), Ok(true));
        }
        assert_eq!(knowledge.analysis("mean_i1"), Some(&json!(3.0)));
        let proposals = knowledge.drain_pipeline();
        assert_eq!(proposals.len(), 2);
        assert!(proposals.iter().all(|p| p.proposer().priority == 3));
    }

    #[test]
    fn test_analyze_raises_signal_via_question_mark() {
        let mut knowledge = Knowledge::new();
        let state = Value::Null;
        let mut ctx = StrategyContext::new(&mut knowledge, Proposer::new("mean", "adapt", 0), &[], &state);
        let err = MeanStrategy.analyze(&mut ctx).unwrap_err();
        assert_eq!(err, StrategyError::Signal(EMPTY.raise()));
    }
}
