//! 目标注册表
//!
//! 目标 = 具名、可激活、带优先级的策略组。按注册顺序保存；运行期间从不删除。
//! 激活标志只能由触发器命中或显式 API 修改，策略代码拿不到注册表。

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::core::SetupError;
use crate::strategy::Strategy;

/// 注册目标的描述：默认 active = true、priority = 0
pub struct GoalSpec {
    name: String,
    active: bool,
    priority: i64,
    strategies: Vec<Box<dyn Strategy>>,
}

impl GoalSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            priority: 0,
            strategies: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_strategy(mut self, strategy: impl Strategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn with_boxed_strategies(mut self, strategies: Vec<Box<dyn Strategy>>) -> Self {
        self.strategies.extend(strategies);
        self
    }
}

pub struct Goal {
    name: String,
    active: bool,
    priority: i64,
    strategies: Vec<Box<dyn Strategy>>,
}

impl Goal {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    pub fn strategy_names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name().to_string()).collect()
    }
}

impl fmt::Debug for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Goal")
            .field("name", &self.name)
            .field("active", &self.active)
            .field("priority", &self.priority)
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

/// 一个处于激活目标中的策略，附带其目标信息（用于生成提案者身份）
pub struct ActiveStrategy<'a> {
    pub goal: &'a str,
    pub goal_priority: i64,
    pub strategy: &'a mut dyn Strategy,
}

impl ActiveStrategy<'_> {
    /// 仲裁用优先级：策略自报优先，否则沿用目标优先级
    pub fn effective_priority(&self) -> i64 {
        self.strategy.priority().unwrap_or(self.goal_priority)
    }
}

#[derive(Debug, Default)]
pub struct GoalRegistry {
    goals: Vec<Goal>,
    index: HashMap<String, usize>,
}

impl GoalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册目标；名称重复、策略名为空或组内重名时失败
    pub fn register(&mut self, spec: GoalSpec) -> Result<(), SetupError> {
        if spec.name.trim().is_empty() {
            return Err(SetupError::EmptyName);
        }
        if self.index.contains_key(&spec.name) {
            return Err(SetupError::DuplicateGoal(spec.name));
        }
        check_strategies(&spec.name, &spec.strategies)?;

        tracing::debug!(
            goal = %spec.name,
            active = spec.active,
            priority = spec.priority,
            strategies = spec.strategies.len(),
            "Goal registered"
        );
        self.index.insert(spec.name.clone(), self.goals.len());
        self.goals.push(Goal {
            name: spec.name,
            active: spec.active,
            priority: spec.priority,
            strategies: spec.strategies,
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Goal> {
        self.index.get(name).map(|&i| &self.goals[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn is_active(&self, name: &str) -> Option<bool> {
        self.get(name).map(Goal::is_active)
    }

    /// 设置激活标志，返回修改前的值
    pub fn set_active(&mut self, name: &str, active: bool) -> Result<bool, SetupError> {
        let i = *self
            .index
            .get(name)
            .ok_or_else(|| SetupError::GoalNotFound(name.to_string()))?;
        let goal = &mut self.goals[i];
        let previous = goal.active;
        goal.active = active;
        Ok(previous)
    }

    /// 目标名（注册顺序）
    pub fn goal_names(&self) -> Vec<String> {
        self.goals.iter().map(|g| g.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Goal> {
        self.goals.iter()
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// 当前激活目标的策略名，按目标注册顺序拼接
    pub fn active_strategy_names(&self) -> Vec<String> {
        self.goals
            .iter()
            .filter(|g| g.active)
            .flat_map(|g| g.strategies.iter().map(|s| s.name().to_string()))
            .collect()
    }

    /// 当前激活目标的策略（可变），按目标注册顺序拼接
    pub fn active_strategies_mut(&mut self) -> Vec<ActiveStrategy<'_>> {
        let mut out = Vec::new();
        for goal in self.goals.iter_mut().filter(|g| g.active) {
            let Goal {
                name,
                priority,
                strategies,
                ..
            } = goal;
            let name: &str = name;
            for strategy in strategies.iter_mut() {
                out.push(ActiveStrategy {
                    goal: name,
                    goal_priority: *priority,
                    strategy: strategy.as_mut(),
                });
            }
        }
        out
    }
}

/// 运行期能力检查：策略必须有非空且组内唯一的名称（名称即提案者身份）
fn check_strategies(goal: &str, strategies: &[Box<dyn Strategy>]) -> Result<(), SetupError> {
    let mut seen = HashSet::new();
    for s in strategies {
        let name = s.name();
        if name.trim().is_empty() {
            return Err(SetupError::InvalidStrategy {
                goal: goal.to_string(),
                reason: "strategy name is empty".to_string(),
            });
        }
        if !seen.insert(name.to_string()) {
            return Err(SetupError::InvalidStrategy {
                goal: goal.to_string(),
                reason: format!("duplicate strategy '{name}'"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{StrategyContext, StrategyError};

    struct Named(&'static str, Option<i64>);

    impl Strategy for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn priority(&self) -> Option<i64> {
            self.1
        }

        fn analyze(&mut self, _ctx: &mut StrategyContext<'_>) -> Result<bool, StrategyError> {
            Ok(true)
        }

        fn plan(&mut self, _ctx: &mut StrategyContext<'_>) -> Result<bool, StrategyError> {
            Ok(false)
        }
    }

    fn registry() -> GoalRegistry {
        let mut r = GoalRegistry::new();
        r.register(
            GoalSpec::new("search")
                .with_strategy(Named("depth", None))
                .with_strategy(Named("speed", None)),
        )
        .unwrap();
        r.register(
            GoalSpec::new("tracking")
                .with_active(false)
                .with_strategy(Named("track", None)),
        )
        .unwrap();
        r.register(
            GoalSpec::new("battery")
                .with_priority(70)
                .with_strategy(Named("check_battery", Some(5))),
        )
        .unwrap();
        r
    }

    #[test]
    fn test_register_defaults() {
        let r = registry();
        let g = r.get("search").unwrap();
        assert!(g.is_active());
        assert_eq!(g.priority(), 0);
        assert_eq!(r.goal_names(), vec!["search", "tracking", "battery"]);
    }

    #[test]
    fn test_register_duplicate_goal_fails() {
        let mut r = registry();
        let err = r.register(GoalSpec::new("search")).unwrap_err();
        assert_eq!(err, SetupError::DuplicateGoal("search".to_string()));
    }

    #[test]
    fn test_register_rejects_nonconforming_strategies() {
        let mut r = GoalRegistry::new();
        let err = r
            .register(GoalSpec::new("g").with_strategy(Named("", None)))
            .unwrap_err();
        assert!(matches!(err, SetupError::InvalidStrategy { .. }));

        let err = r
            .register(
                GoalSpec::new("g")
                    .with_strategy(Named("a", None))
                    .with_strategy(Named("a", None)),
            )
            .unwrap_err();
        assert!(matches!(err, SetupError::InvalidStrategy { reason, .. } if reason.contains("duplicate")));
        assert!(r.is_empty());

        assert_eq!(r.register(GoalSpec::new("  ")), Err(SetupError::EmptyName));
    }

    #[test]
    fn test_active_strategies_in_registration_order() {
        let mut r = registry();
        assert_eq!(
            r.active_strategy_names(),
            vec!["depth", "speed", "check_battery"]
        );
        r.set_active("tracking", true).unwrap();
        r.set_active("search", false).unwrap();
        assert_eq!(r.active_strategy_names(), vec!["track", "check_battery"]);
    }

    #[test]
    fn test_effective_priority_falls_back_to_goal() {
        let mut r = registry();
        r.set_active("tracking", true).unwrap();
        let active = r.active_strategies_mut();
        let prios: Vec<(String, i64)> = active
            .iter()
            .map(|a| (a.strategy.name().to_string(), a.effective_priority()))
            .collect();
        assert_eq!(
            prios,
            vec![
                ("depth".to_string(), 0),
                ("speed".to_string(), 0),
                ("track".to_string(), 0),
                ("check_battery".to_string(), 5),
            ]
        );
    }

    #[test]
    fn test_set_active_unknown_goal() {
        let mut r = registry();
        assert_eq!(
            r.set_active("nope", true),
            Err(SetupError::GoalNotFound("nope".to_string()))
        );
        assert_eq!(r.set_active("tracking", true), Ok(false));
        assert_eq!(r.is_active("tracking"), Some(true));
    }
}
