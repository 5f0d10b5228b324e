//! 策略层：Strategy trait、评估上下文、条件信号

pub mod signal;
pub mod traits;

pub use signal::{ConditionSignal, SignalKind};
pub use traits::{Strategy, StrategyContext, StrategyError};
