//! 目标管理：目标注册表 + 触发器表
//!
//! active_strategies 先按上下文中的信号应用触发器，再返回激活目标的策略。
//! 该方法会修改目标激活状态：不同信号集多次调用会得到不同结果。

use serde_json::Value;

use crate::core::SetupError;
use crate::goals::registry::{ActiveStrategy, Goal, GoalRegistry, GoalSpec};
use crate::goals::triggers::{GoalChange, Trigger, TriggerTable};
use crate::strategy::{ConditionSignal, SignalKind};

/// 选择策略时的上下文：本周期出现过的信号（按顺序）+ 协作方提供的不透明状态
#[derive(Debug, Clone, Default)]
pub struct AdaptationContext {
    pub signals: Vec<ConditionSignal>,
    pub state: Value,
}

impl AdaptationContext {
    pub fn new(signals: Vec<ConditionSignal>) -> Self {
        Self {
            signals,
            state: Value::Null,
        }
    }

    pub fn with_state(mut self, state: Value) -> Self {
        self.state = state;
        self
    }
}

#[derive(Debug, Default)]
pub struct GoalManagement {
    goals: GoalRegistry,
    triggers: TriggerTable,
}

impl GoalManagement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_goal(&mut self, spec: GoalSpec) -> Result<(), SetupError> {
        self.goals.register(spec)
    }

    /// 设置（或替换同名）触发器：signal 出现时把 goal 的激活标志设为 set_to
    pub fn set_goal_trigger(
        &mut self,
        name: impl Into<String>,
        goal: impl Into<String>,
        set_to: bool,
        signal: impl Into<SignalKind>,
    ) -> Result<(), SetupError> {
        let trigger = Trigger::new(name, goal, set_to, signal);
        if let Some(old) = self.triggers.set(trigger, &self.goals)? {
            tracing::debug!(trigger = %old.name, "Trigger replaced");
        }
        Ok(())
    }

    pub fn remove_goal_trigger(&mut self, name: &str) -> Result<Trigger, SetupError> {
        self.triggers.remove(name)
    }

    /// 显式修改目标激活状态（触发器之外的唯一入口）
    pub fn set_goal_active(&mut self, goal: &str, active: bool) -> Result<(), SetupError> {
        self.goals.set_active(goal, active).map(|_| ())
    }

    /// 只应用触发器，返回应用记录
    pub fn handle_signals(&mut self, signals: &[ConditionSignal]) -> Vec<GoalChange> {
        self.triggers.apply(signals, &mut self.goals)
    }

    /// 应用触发器后返回激活目标中的策略（目标注册顺序）
    pub fn active_strategies(&mut self, ctx: &AdaptationContext) -> Vec<ActiveStrategy<'_>> {
        self.handle_signals(&ctx.signals);
        self.goals.active_strategies_mut()
    }

    /// 当前激活策略名（不应用触发器）
    pub fn active_strategy_names(&self) -> Vec<String> {
        self.goals.active_strategy_names()
    }

    pub fn goal(&self, name: &str) -> Option<&Goal> {
        self.goals.get(name)
    }

    pub fn is_active(&self, name: &str) -> Option<bool> {
        self.goals.is_active(name)
    }

    pub fn goal_names(&self) -> Vec<String> {
        self.goals.goal_names()
    }

    pub fn goals(&self) -> &GoalRegistry {
        &self.goals
    }

    pub fn triggers(&self) -> &TriggerTable {
        &self.triggers
    }
}
