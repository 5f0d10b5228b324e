//! 受管系统协作方：Monitor / Executor 抽象、带超时的网关、Mock 实现

pub mod gateway;
pub mod mock;
pub mod traits;

pub use gateway::ManagedSystem;
pub use mock::MockExemplar;
pub use traits::{Executor, Monitor};
