//! Arbiter - 自适应系统的目标 / 策略仲裁引擎
//!
//! 模块划分：
//! - **knowledge**: 知识库（观测、分析结果、变更管道、计划）
//! - **strategy**: 策略抽象与条件信号
//! - **goals**: 目标注册表、触发器表与目标管理
//! - **arbitration**: 冲突检测与解决策略
//! - **exemplar**: 受管系统协作方（monitor / execute）与 Mock
//! - **core**: 错误、周期状态、反应式适配控制器
//! - **config**: 引擎配置加载（TOML + 环境变量）
//! - **observability**: tracing 初始化

pub mod arbitration;
pub mod config;
pub mod core;
pub mod exemplar;
pub mod goals;
pub mod knowledge;
pub mod observability;
pub mod strategy;

pub use arbitration::{Arbiter, ArbitrationReport, ConflictPolicy, PolicyKind};
pub use config::{load_config, AppConfig};
pub use core::{AdaptationLoop, CycleError, CyclePhase, CycleReport, SetupError};
pub use exemplar::{Executor, ManagedSystem, MockExemplar, Monitor};
pub use goals::{AdaptationContext, GoalChange, GoalManagement, GoalSpec, Trigger};
pub use knowledge::{ChangeProposal, Knowledge, Plan, Proposer};
pub use strategy::{ConditionSignal, SignalKind, Strategy, StrategyContext, StrategyError};
