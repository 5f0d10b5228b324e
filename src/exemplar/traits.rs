//! 受管系统协作方抽象
//!
//! 传输层（HTTP 轮询、schema 校验、容器生命周期）都在协作方内实现；核心只通过这两个 trait 取数与下发计划。

use async_trait::async_trait;
use serde_json::Value;

use crate::knowledge::Plan;

/// 监控协作方：返回一条记录（JSON 对象）或记录列表（对象数组），由知识库逐 key 追加
#[async_trait]
pub trait Monitor: Send + Sync {
    async fn monitor(&self) -> anyhow::Result<Value>;
}

/// 执行协作方：提交已解决的计划，返回受管系统是否接受
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, plan: &Plan) -> anyhow::Result<bool>;
}
