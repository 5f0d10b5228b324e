//! 触发器表
//!
//! 触发器：信号类型 -> 将某目标的激活标志设为 set_to。按名称唯一，同名设置会原地替换；
//! 应用顺序 = 首次设置的顺序。

use serde::{Deserialize, Serialize};

use crate::core::SetupError;
use crate::goals::registry::GoalRegistry;
use crate::strategy::{ConditionSignal, SignalKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub name: String,
    pub goal: String,
    pub set_to: bool,
    pub signal: SignalKind,
}

impl Trigger {
    pub fn new(
        name: impl Into<String>,
        goal: impl Into<String>,
        set_to: bool,
        signal: impl Into<SignalKind>,
    ) -> Self {
        Self {
            name: name.into(),
            goal: goal.into(),
            set_to,
            signal: signal.into(),
        }
    }

    pub fn matches(&self, signal: &ConditionSignal) -> bool {
        &self.signal == signal.kind()
    }
}

/// 一次触发器应用的记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalChange {
    pub trigger: String,
    pub goal: String,
    pub active: bool,
    /// 应用前后激活标志是否真的变化
    pub changed: bool,
}

#[derive(Debug, Default)]
pub struct TriggerTable {
    triggers: Vec<Trigger>,
}

impl TriggerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置触发器；目标未注册时返回 GoalNotFound。同名触发器被替换并返回旧值
    pub fn set(
        &mut self,
        trigger: Trigger,
        goals: &GoalRegistry,
    ) -> Result<Option<Trigger>, SetupError> {
        if trigger.name.trim().is_empty() {
            return Err(SetupError::EmptyName);
        }
        if !goals.contains(&trigger.goal) {
            return Err(SetupError::GoalNotFound(trigger.goal));
        }
        match self.triggers.iter_mut().find(|t| t.name == trigger.name) {
            Some(existing) => Ok(Some(std::mem::replace(existing, trigger))),
            None => {
                self.triggers.push(trigger);
                Ok(None)
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Result<Trigger, SetupError> {
        let pos = self
            .triggers
            .iter()
            .position(|t| t.name == name)
            .ok_or_else(|| SetupError::TriggerNotFound(name.to_string()))?;
        Ok(self.triggers.remove(pos))
    }

    pub fn get(&self, name: &str) -> Option<&Trigger> {
        self.triggers.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trigger> {
        self.triggers.iter()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// 匹配某信号的触发器（表内顺序）
    pub fn matching<'a>(
        &'a self,
        signal: &'a ConditionSignal,
    ) -> impl Iterator<Item = &'a Trigger> + 'a {
        self.triggers.iter().filter(move |t| t.matches(signal))
    }

    /// 按信号顺序应用全部匹配的触发器，返回应用记录。
    /// 目标在另一个注册表中不存在时跳过并记 warn。
    pub fn apply(&self, signals: &[ConditionSignal], goals: &mut GoalRegistry) -> Vec<GoalChange> {
        let mut changes = Vec::new();
        for signal in signals {
            for trigger in self.matching(signal) {
                match goals.set_active(&trigger.goal, trigger.set_to) {
                    Ok(previous) => {
                        let changed = previous != trigger.set_to;
                        if changed {
                            tracing::info!(
                                trigger = %trigger.name,
                                goal = %trigger.goal,
                                active = trigger.set_to,
                                signal = %signal,
                                "Goal activation changed"
                            );
                        }
                        changes.push(GoalChange {
                            trigger: trigger.name.clone(),
                            goal: trigger.goal.clone(),
                            active: trigger.set_to,
                            changed,
                        });
                    }
                    Err(e) => tracing::warn!(trigger = %trigger.name, "Trigger skipped: {}", e),
                }
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::registry::GoalSpec;

    const FOUND: SignalKind = SignalKind::from_static("fish_found");
    const LOST: SignalKind = SignalKind::from_static("fish_lost");

    fn goals() -> GoalRegistry {
        let mut r = GoalRegistry::new();
        r.register(GoalSpec::new("search")).unwrap();
        r.register(GoalSpec::new("tracking").with_active(false)).unwrap();
        r
    }

    #[test]
    fn test_set_trigger_unknown_goal() {
        let mut t = TriggerTable::new();
        let err = t
            .set(Trigger::new("x", "missing", false, LOST), &goals())
            .unwrap_err();
        assert_eq!(err, SetupError::GoalNotFound("missing".to_string()));
        assert!(t.is_empty());
    }

    #[test]
    fn test_set_trigger_overwrites_in_place() {
        let g = goals();
        let mut t = TriggerTable::new();
        assert_eq!(t.set(Trigger::new("a", "search", false, FOUND), &g), Ok(None));
        t.set(Trigger::new("b", "tracking", true, FOUND), &g).unwrap();
        let old = t
            .set(Trigger::new("a", "search", true, LOST), &g)
            .unwrap()
            .unwrap();
        assert!(!old.set_to);
        assert_eq!(t.len(), 2);
        let names: Vec<&str> = t.iter().map(|tr| tr.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(t.get("a").unwrap().signal, LOST);
    }

    #[test]
    fn test_remove_trigger() {
        let g = goals();
        let mut t = TriggerTable::new();
        t.set(Trigger::new("a", "search", false, FOUND), &g).unwrap();
        assert_eq!(t.remove("a").unwrap().goal, "search");
        assert_eq!(
            t.remove("a"),
            Err(SetupError::TriggerNotFound("a".to_string()))
        );
    }

    #[test]
    fn test_apply_flips_matching_goals_only() {
        let mut g = goals();
        let mut t = TriggerTable::new();
        t.set(Trigger::new("stop search", "search", false, FOUND), &g).unwrap();
        t.set(Trigger::new("start tracking", "tracking", true, FOUND), &g).unwrap();
        t.set(Trigger::new("restart search", "search", true, LOST), &g).unwrap();

        let changes = t.apply(&[FOUND.raise()], &mut g);
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| c.changed));
        assert_eq!(g.is_active("search"), Some(false));
        assert_eq!(g.is_active("tracking"), Some(true));

        let again = t.apply(&[FOUND.raise()], &mut g);
        assert!(again.iter().all(|c| !c.changed));
    }

    #[test]
    fn test_apply_later_signal_wins() {
        let mut g = goals();
        let mut t = TriggerTable::new();
        t.set(Trigger::new("off", "search", false, FOUND), &g).unwrap();
        t.set(Trigger::new("on", "search", true, LOST), &g).unwrap();
        t.apply(&[FOUND.raise(), LOST.raise()], &mut g);
        assert_eq!(g.is_active("search"), Some(true));
        t.apply(&[LOST.raise(), FOUND.raise()], &mut g);
        assert_eq!(g.is_active("search"), Some(false));
    }
}
