//! 仲裁层：冲突检测与可插拔的冲突解决策略

pub mod engine;
pub mod policy;

pub use engine::{detect_conflicts, Arbiter, ArbitrationReport};
pub use policy::{Conflict, ConflictPolicy, HighestPriorityWins, LastWriterWins, PolicyKind};
