//! Worker resource scheduler.
//!
//! Owns the worker's [`PlanPool`] and, for every consumed ask plan, a
//! [`ResourcePool`] over that plan's resources from which the plan's tasks
//! are served. A task only claims the storage and GPUs it asks for; CPU,
//! RAM and network are enforced per container, not by the scheduler.

use std::collections::BTreeMap;

use dealmatch_types::{AskPlan, DealMatchError, GpuHasher, PoolConfig, ResourceVector, Result};
use tracing::debug;

use crate::plan_pool::PlanPool;
use crate::pool::ResourcePool;

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pool: PlanPool,
    /// Ask plan ID → pool serving that plan's tasks.
    plan_pools: BTreeMap<String, ResourcePool>,
    /// Task ID → ask plan ID.
    task_to_plan: BTreeMap<String, String>,
}

impl Scheduler {
    #[must_use]
    pub fn new(all: ResourceVector) -> Self {
        Self {
            pool: PlanPool::new(all),
            plan_pools: BTreeMap::new(),
            task_to_plan: BTreeMap::new(),
        }
    }

    /// Create a scheduler, normalizing the capacity's GPUs first if
    /// `config` asks for it.
    pub fn with_config(
        mut all: ResourceVector,
        config: &PoolConfig,
        hasher: &dyn GpuHasher,
    ) -> Result<Self> {
        if config.normalize_on_create {
            all.normalize(hasher)?;
        }
        debug!(
            cpu = all.cpu_core_percents,
            ram = all.ram_bytes,
            gpus = all.gpu.len(),
            "Scheduler created"
        );
        Ok(Self::new(all))
    }

    #[must_use]
    pub fn plans(&self) -> &PlanPool {
        &self.pool
    }

    /// The pool serving the tasks of `plan_id`.
    #[must_use]
    pub fn plan_pool(&self, plan_id: &str) -> Option<&ResourcePool> {
        self.plan_pools.get(plan_id)
    }

    pub fn ask_plan_id_by_task_id(&self, task_id: &str) -> Result<&str> {
        self.task_to_plan
            .get(task_id)
            .map(String::as_str)
            .ok_or_else(|| DealMatchError::UnknownTask(task_id.to_string()))
    }

    pub fn committed_free(&self) -> Result<ResourceVector> {
        self.pool.committed_free()
    }

    pub fn poll_consume(&self, plan: &AskPlan) -> Result<()> {
        self.pool.poll_consume(plan)
    }

    /// Consume an ask plan and open a task pool over its resources.
    /// Does nothing on error.
    pub fn consume(&mut self, plan: AskPlan) -> Result<()> {
        let id = plan.id.clone();
        let resources = plan.resources.clone();
        self.pool.consume(plan)?;
        self.plan_pools.insert(id.clone(), ResourcePool::new(resources));
        debug!(plan = %id, "Ask plan consumed by scheduler");
        Ok(())
    }

    /// See [`PlanPool::make_room_and_commit`].
    pub fn make_room_and_commit(&mut self, plan: &AskPlan) -> Result<Vec<String>> {
        self.pool.make_room_and_commit(plan)
    }

    /// Release an ask plan together with its task pool and task mappings.
    ///
    /// # Errors
    /// Returns `UnknownConsumer` if the plan was never consumed.
    pub fn release(&mut self, plan_id: &str) -> Result<AskPlan> {
        let plan = self.pool.release(plan_id)?;
        self.plan_pools.remove(plan_id);
        self.task_to_plan.retain(|_, owner| owner != plan_id);
        debug!(plan = plan_id, "Ask plan released from scheduler");
        Ok(plan)
    }

    /// Serve a task from the pool of `plan_id`. Does nothing on error.
    ///
    /// # Errors
    /// Returns `AlreadyConsumed` for a known task, `UnknownAskPlan` if the
    /// plan has no pool, or `NotContained` if the plan cannot fit the task.
    pub fn consume_task(
        &mut self,
        plan_id: &str,
        task_id: &str,
        resources: &ResourceVector,
    ) -> Result<()> {
        if self.task_to_plan.contains_key(task_id) {
            return Err(DealMatchError::AlreadyConsumed(task_id.to_string()));
        }
        let pool = self
            .plan_pools
            .get_mut(plan_id)
            .ok_or_else(|| DealMatchError::UnknownAskPlan(plan_id.to_string()))?;

        let claim = ResourceVector {
            storage_bytes: resources.storage_bytes,
            gpu: resources.gpu.clone(),
            ..ResourceVector::default()
        };
        pool.consume(task_id, claim)?;
        self.task_to_plan
            .insert(task_id.to_string(), plan_id.to_string());
        debug!(task = task_id, plan = plan_id, "Task consumed by scheduler");
        Ok(())
    }

    /// Return a task's claim to its plan pool. The task stays mapped to its
    /// plan until [`on_deal_finish`](Self::on_deal_finish).
    pub fn release_task(&mut self, task_id: &str) -> Result<ResourceVector> {
        let plan_id = self
            .task_to_plan
            .get(task_id)
            .ok_or_else(|| DealMatchError::UnknownTask(task_id.to_string()))?;
        let pool = self
            .plan_pools
            .get_mut(plan_id)
            .ok_or_else(|| DealMatchError::UnknownAskPlan(plan_id.clone()))?;

        let claim = pool.release(task_id)?;
        debug!(task = task_id, "Task released");
        Ok(claim)
    }

    /// Resources currently claimed by a task.
    pub fn resource_by_task(&self, task_id: &str) -> Result<&ResourceVector> {
        let plan_id = self.ask_plan_id_by_task_id(task_id)?;
        self.plan_pools
            .get(plan_id)
            .ok_or_else(|| DealMatchError::UnknownAskPlan(plan_id.to_string()))?
            .consumed(task_id)
            .ok_or_else(|| DealMatchError::UnknownConsumer(task_id.to_string()))
    }

    /// Release the task if still running and forget its plan.
    ///
    /// # Errors
    /// Returns `UnknownTask` if the task is not mapped to any plan.
    pub fn on_deal_finish(&mut self, task_id: &str) -> Result<()> {
        if let Err(err) = self.release_task(task_id) {
            debug!(task = task_id, %err, "Task was not running at deal finish");
        }
        self.task_to_plan
            .remove(task_id)
            .map(|_| ())
            .ok_or_else(|| DealMatchError::UnknownTask(task_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use dealmatch_types::{GpuSet, Shortfall};

    use super::*;

    fn vector(cpu: u64, storage: u64, gpus: &[&str]) -> ResourceVector {
        ResourceVector {
            cpu_core_percents: cpu,
            storage_bytes: storage,
            gpu: GpuSet::from_hashes(gpus.iter().copied()),
            ..ResourceVector::default()
        }
    }

    fn scheduler_with_plan() -> Scheduler {
        let mut scheduler = Scheduler::new(vector(800, 1000, &["a", "b", "c"]));
        scheduler
            .consume(AskPlan::new("plan-1", vector(400, 600, &["a", "b"]), 3600))
            .unwrap();
        scheduler
    }

    #[test]
    fn consume_opens_task_pool() {
        let scheduler = scheduler_with_plan();
        let pool = scheduler.plan_pool("plan-1").unwrap();
        assert_eq!(pool.capacity(), &vector(400, 600, &["a", "b"]));
        assert!(scheduler.plan_pool("plan-2").is_none());
    }

    #[test]
    fn failed_plan_consume_opens_no_pool() {
        let mut scheduler = scheduler_with_plan();
        let err = scheduler
            .consume(AskPlan::new("plan-2", vector(500, 0, &[]), 3600))
            .unwrap_err();
        assert!(matches!(err, DealMatchError::NotContained(_)));
        assert!(scheduler.plan_pool("plan-2").is_none());
    }

    #[test]
    fn task_claims_only_storage_and_gpus() {
        let mut scheduler = scheduler_with_plan();
        scheduler
            .consume_task("plan-1", "task-1", &vector(9999, 400, &["a"]))
            .unwrap();

        assert_eq!(scheduler.ask_plan_id_by_task_id("task-1").unwrap(), "plan-1");
        assert_eq!(
            scheduler.resource_by_task("task-1").unwrap(),
            &vector(0, 400, &["a"])
        );
    }

    #[test]
    fn task_must_fit_its_plan() {
        let mut scheduler = scheduler_with_plan();
        scheduler
            .consume_task("plan-1", "task-1", &vector(0, 400, &["a"]))
            .unwrap();

        let err = scheduler
            .consume_task("plan-1", "task-2", &vector(0, 300, &[]))
            .unwrap_err();
        assert_eq!(
            err,
            DealMatchError::NotContained(Shortfall::Storage {
                required: 300,
                available: 200,
            })
        );

        // GPU c belongs to the worker but not to this plan.
        let err = scheduler
            .consume_task("plan-1", "task-3", &vector(0, 0, &["c"]))
            .unwrap_err();
        assert_eq!(err, DealMatchError::NotContained(Shortfall::Gpu));

        assert!(scheduler.ask_plan_id_by_task_id("task-2").is_err());
        assert!(scheduler.ask_plan_id_by_task_id("task-3").is_err());
    }

    #[test]
    fn task_for_unknown_plan_is_rejected() {
        let mut scheduler = scheduler_with_plan();
        let err = scheduler
            .consume_task("ghost", "task-1", &vector(0, 1, &[]))
            .unwrap_err();
        assert_eq!(err, DealMatchError::UnknownAskPlan("ghost".into()));
        assert_eq!(
            scheduler.ask_plan_id_by_task_id("task-1").unwrap_err(),
            DealMatchError::UnknownTask("task-1".into())
        );
    }

    #[test]
    fn duplicate_task_is_rejected() {
        let mut scheduler = scheduler_with_plan();
        scheduler
            .consume_task("plan-1", "task-1", &vector(0, 100, &[]))
            .unwrap();
        assert_eq!(
            scheduler
                .consume_task("plan-1", "task-1", &vector(0, 100, &[]))
                .unwrap_err(),
            DealMatchError::AlreadyConsumed("task-1".into())
        );
    }

    #[test]
    fn release_task_returns_claim_and_keeps_mapping() {
        let mut scheduler = scheduler_with_plan();
        scheduler
            .consume_task("plan-1", "task-1", &vector(0, 400, &["a"]))
            .unwrap();

        let claim = scheduler.release_task("task-1").unwrap();
        assert_eq!(claim, vector(0, 400, &["a"]));
        assert_eq!(
            scheduler.resource_by_task("task-1").unwrap_err(),
            DealMatchError::UnknownConsumer("task-1".into())
        );
        assert_eq!(scheduler.ask_plan_id_by_task_id("task-1").unwrap(), "plan-1");

        // The claim is available again.
        scheduler
            .consume_task("plan-1", "task-2", &vector(0, 600, &["a", "b"]))
            .unwrap();
    }

    #[test]
    fn deal_finish_forgets_task() {
        let mut scheduler = scheduler_with_plan();
        scheduler
            .consume_task("plan-1", "task-1", &vector(0, 400, &["a"]))
            .unwrap();

        scheduler.on_deal_finish("task-1").unwrap();
        assert_eq!(
            scheduler.ask_plan_id_by_task_id("task-1").unwrap_err(),
            DealMatchError::UnknownTask("task-1".into())
        );
        assert_eq!(scheduler.plan_pool("plan-1").unwrap().consumer_count(), 0);
        assert_eq!(
            scheduler.on_deal_finish("task-1").unwrap_err(),
            DealMatchError::UnknownTask("task-1".into())
        );
    }

    #[test]
    fn release_plan_drops_its_tasks() {
        let mut scheduler = scheduler_with_plan();
        scheduler
            .consume_task("plan-1", "task-1", &vector(0, 100, &[]))
            .unwrap();

        let plan = scheduler.release("plan-1").unwrap();
        assert_eq!(plan.id, "plan-1");
        assert!(scheduler.plan_pool("plan-1").is_none());
        assert!(scheduler.ask_plan_id_by_task_id("task-1").is_err());
        assert_eq!(
            scheduler.release("plan-1").unwrap_err(),
            DealMatchError::UnknownConsumer("plan-1".into())
        );
    }
}
