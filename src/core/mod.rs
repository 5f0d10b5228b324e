//! 核心编排层：错误、周期状态、反应式适配控制器

pub mod controller;
pub mod error;
pub mod state;

pub use controller::AdaptationLoop;
pub use error::{CycleError, SetupError};
pub use state::{CyclePhase, CycleReport};
