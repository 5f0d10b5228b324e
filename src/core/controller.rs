//! 反应式适配周期控制器
//!
//! 一次 adapt：monitor 填充知识库 -> 按激活目标评估策略（analyze / plan）-> 遇到条件信号则把信号加入本周期信号集，
//! 重新应用触发器并重跑一轮 -> 稳定后仲裁冲突 -> 把计划交给 execute 协作方。
//!
//! 同一信号类型连续两次成为重评估原因时视为无法消解，直接上抛（防止触发器无法清除的信号导致死循环）。
//! 被信号中断的那一轮产生的提案会被丢弃；策略的私有状态不回滚。

use std::sync::Arc;

use serde_json::Value;
use tracing::Instrument;

use crate::arbitration::{Arbiter, ArbitrationReport};
use crate::config::{AppConfig, CycleSection};
use crate::core::error::CycleError;
use crate::core::state::{CyclePhase, CycleReport};
use crate::exemplar::{Executor, ManagedSystem, Monitor};
use crate::goals::{AdaptationContext, GoalManagement};
use crate::knowledge::{Knowledge, Proposer};
use crate::strategy::{ConditionSignal, Strategy, StrategyContext, StrategyError};

/// 单轮 strategize 的结果
#[derive(Debug)]
enum PassOutcome {
    Completed(bool),
    Interrupted(ConditionSignal),
}

pub struct AdaptationLoop {
    knowledge: Knowledge,
    goals: GoalManagement,
    arbiter: Arbiter,
    system: ManagedSystem,
    cycle: CycleSection,
    phase: CyclePhase,
    state: Value,
}

impl AdaptationLoop {
    pub fn new(goals: GoalManagement, system: ManagedSystem) -> Self {
        Self {
            knowledge: Knowledge::new(),
            goals,
            arbiter: Arbiter::default(),
            system,
            cycle: CycleSection::default(),
            phase: CyclePhase::Idle,
            state: Value::Null,
        }
    }

    /// 按配置构建：协作方超时、冲突策略、周期参数
    pub fn from_config(
        goals: GoalManagement,
        monitor: Arc<dyn Monitor>,
        executor: Arc<dyn Executor>,
        cfg: &AppConfig,
    ) -> Self {
        let system = ManagedSystem::with_timeouts(monitor, executor, &cfg.collaborators);
        Self::new(goals, system)
            .with_arbiter(Arbiter::new(cfg.arbitration.policy.build()))
            .with_cycle_config(cfg.cycle.clone())
    }

    pub fn with_arbiter(mut self, arbiter: Arbiter) -> Self {
        self.arbiter = arbiter;
        self
    }

    pub fn with_cycle_config(mut self, cycle: CycleSection) -> Self {
        self.cycle = cycle;
        self
    }

    pub fn with_knowledge(mut self, knowledge: Knowledge) -> Self {
        self.knowledge = knowledge;
        self
    }

    /// 传给策略的不透明状态（AdaptationContext.state）
    pub fn with_state(mut self, state: Value) -> Self {
        self.state = state;
        self
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn knowledge(&self) -> &Knowledge {
        &self.knowledge
    }

    pub fn knowledge_mut(&mut self) -> &mut Knowledge {
        &mut self.knowledge
    }

    pub fn goals(&self) -> &GoalManagement {
        &self.goals
    }

    /// 周期之间修改目标 / 触发器（周期内无法借用）
    pub fn goals_mut(&mut self) -> &mut GoalManagement {
        &mut self.goals
    }

    /// 运行一次完整的反应式周期
    pub async fn adapt(&mut self) -> Result<CycleReport, CycleError> {
        let mut report = CycleReport::new();
        let span = tracing::info_span!("adapt", cycle_id = %report.cycle_id);
        let result = self.run_cycle(&mut report).instrument(span).await;
        self.enter(CyclePhase::Idle);
        result.map(|()| report)
    }

    async fn run_cycle(&mut self, report: &mut CycleReport) -> Result<(), CycleError> {
        let stale = self.knowledge.drain_pipeline();
        if !stale.is_empty() {
            tracing::debug!(count = stale.len(), "Discarded stale proposals");
        }

        self.monitor().await?;

        self.enter(CyclePhase::Strategizing);
        let should_execute = self.reassess(report)?;
        if !should_execute {
            let dropped = self.knowledge.drain_pipeline();
            tracing::info!(
                passes = report.passes,
                dropped = dropped.len(),
                "No strategy requested execution"
            );
            return Ok(());
        }

        self.enter(CyclePhase::Resolving);
        report.arbitration = Some(self.resolve());

        if self.knowledge.plan().is_empty() && !self.cycle.execute_on_empty_plan {
            tracing::info!("Plan is empty, skipping execute");
            return Ok(());
        }

        self.enter(CyclePhase::Executing);
        let plan = self.knowledge.take_plan();
        tracing::info!(plan = %plan.to_json(), "Executing plan");
        let accepted = self.system.execute(&plan).await?;
        if !accepted {
            tracing::warn!("Managed system rejected the plan");
        }
        report.executed = Some(accepted);
        report.plan = plan;
        Ok(())
    }

    /// monitor 协作方取数并并入观测序列，返回追加的观测条数
    pub async fn monitor(&mut self) -> Result<usize, CycleError> {
        self.enter(CyclePhase::Monitoring);
        let fresh = self.system.monitor().await?;
        let appended = self.knowledge.fold_monitored(fresh);
        tracing::debug!(appended, "Knowledge updated");
        Ok(appended)
    }

    /// 单轮评估：按给定信号应用触发器并评估激活策略，返回是否需要执行。
    /// 单轮内不重评估，策略抛出的信号以 UnrecoveredSignal 返回。
    pub fn strategize(&mut self, signals: &[ConditionSignal]) -> Result<bool, CycleError> {
        match self.run_pass(signals)? {
            PassOutcome::Completed(should_execute) => Ok(should_execute),
            PassOutcome::Interrupted(signal) => Err(CycleError::UnrecoveredSignal(signal)),
        }
    }

    /// 取出变更管道并仲裁进计划
    pub fn resolve(&mut self) -> ArbitrationReport {
        let proposals = self.knowledge.drain_pipeline();
        self.arbiter.arbitrate(proposals, self.knowledge.plan_mut())
    }

    /// 反复 strategize 直到某轮不再出现信号；信号累积在本周期信号集中
    fn reassess(&mut self, report: &mut CycleReport) -> Result<bool, CycleError> {
        let mut signals: Vec<ConditionSignal> = Vec::new();
        loop {
            report.passes += 1;
            match self.run_pass(&signals)? {
                PassOutcome::Completed(should_execute) => {
                    report.signals = signals;
                    return Ok(should_execute);
                }
                PassOutcome::Interrupted(signal) => {
                    if signals.last().is_some_and(|cause| cause.same_kind(&signal)) {
                        tracing::error!(signal = %signal, "Same condition signal raised twice in a row");
                        return Err(CycleError::UnrecoveredSignal(signal));
                    }
                    signals.push(signal);
                    if signals.len() > self.cycle.max_reassessments {
                        return Err(CycleError::ReassessmentLimit {
                            limit: self.cycle.max_reassessments,
                            signals,
                        });
                    }
                    if let Some(cause) = signals.last() {
                        tracing::warn!(
                            signal = %cause,
                            pass = report.passes,
                            "Condition signal raised, reassessing goals"
                        );
                    }
                }
            }
        }
    }

    fn run_pass(&mut self, signals: &[ConditionSignal]) -> Result<PassOutcome, CycleError> {
        let ctx = AdaptationContext::new(signals.to_vec()).with_state(self.state.clone());
        let mark = self.knowledge.pipeline().len();
        let mut should_execute = false;

        let active = self.goals.active_strategies(&ctx);
        tracing::debug!(
            strategies = active.len(),
            signals = ctx.signals.len(),
            "Strategizing"
        );

        for (order, entry) in active.into_iter().enumerate() {
            let proposer =
                Proposer::new(entry.strategy.name(), entry.goal, entry.effective_priority())
                    .with_order(order);
            let mut sctx =
                StrategyContext::new(&mut self.knowledge, proposer, &ctx.signals, &ctx.state);

            match evaluate(&mut *entry.strategy, &mut sctx) {
                Ok(planned) => should_execute |= planned,
                Err(StrategyError::Signal(signal)) => {
                    let dropped = self.knowledge.truncate_pipeline(mark);
                    tracing::debug!(
                        strategy = %entry.strategy.name(),
                        dropped,
                        "Pass interrupted by condition signal"
                    );
                    return Ok(PassOutcome::Interrupted(signal));
                }
                Err(StrategyError::Failed(reason)) => {
                    self.knowledge.truncate_pipeline(mark);
                    return Err(CycleError::StrategyFailed {
                        strategy: entry.strategy.name().to_string(),
                        reason,
                    });
                }
            }
        }
        Ok(PassOutcome::Completed(should_execute))
    }

    fn enter(&mut self, phase: CyclePhase) {
        if self.phase != phase {
            tracing::info!(from = ?self.phase, to = ?phase, "Cycle phase");
            self.phase = phase;
        }
    }
}

/// analyze 为真才 plan；返回是否产出了提案
fn evaluate(
    strategy: &mut dyn Strategy,
    ctx: &mut StrategyContext<'_>,
) -> Result<bool, StrategyError> {
    if !strategy.analyze(ctx)? {
        return Ok(false);
    }
    strategy.plan(ctx)
}
