//! 知识层：观测 / 分析 / 变更管道 / 计划

pub mod plan;
pub mod store;

pub use plan::{ChangeProposal, Plan, Proposer};
pub use store::{Knowledge, Schemas};
