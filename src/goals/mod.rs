//! 目标层：目标注册表、触发器表、目标管理

pub mod management;
pub mod registry;
pub mod triggers;

pub use management::{AdaptationContext, GoalManagement};
pub use registry::{ActiveStrategy, Goal, GoalRegistry, GoalSpec};
pub use triggers::{GoalChange, Trigger, TriggerTable};
