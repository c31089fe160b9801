//! Ask-plan pool: worker capacity shared by spot and forward plans.
//!
//! Consumed plans are tracked by kind. A new plan must fit into the
//! capacity minus the committed forward plans and the consumed plans of
//! its own kind, so spot plans may overlap forward ones until a forward
//! plan is committed to a deal. [`PlanPool::make_room_and_commit`] then
//! ejects the most recently consumed spot plans until the committed set
//! fits again.
//!
//! All mutations are atomic: either the full operation succeeds or the
//! pool is unchanged.

use std::collections::BTreeMap;

use dealmatch_types::{AskPlan, DealMatchError, ResourceVector, Result};
use tracing::{debug, info};

/// Plans keyed by ID, each tagged with its consumption sequence number.
#[derive(Debug, Clone, Default)]
struct PlanMap {
    plans: BTreeMap<String, (u64, AskPlan)>,
}

impl PlanMap {
    fn sum(&self) -> Result<ResourceVector> {
        let mut sum = ResourceVector::default();
        for (_, plan) in self.plans.values() {
            sum.add(&plan.resources)?;
        }
        Ok(sum)
    }

    fn get(&self, id: &str) -> Option<&AskPlan> {
        self.plans.get(id).map(|(_, plan)| plan)
    }

    fn insert(&mut self, seq: u64, plan: AskPlan) {
        self.plans.insert(plan.id.clone(), (seq, plan));
    }

    fn remove(&mut self, id: &str) -> Option<(u64, AskPlan)> {
        self.plans.remove(id)
    }

    /// Remove the most recently consumed plan.
    fn pop_latest(&mut self) -> Option<(u64, AskPlan)> {
        let id = self
            .plans
            .iter()
            .max_by_key(|(_, (seq, _))| *seq)
            .map(|(id, _)| id.clone())?;
        self.plans.remove(&id)
    }
}

/// Subtract `used` from `available`, reporting an overdraft as an
/// inconsistency.
fn deduct(available: &mut ResourceVector, used: &ResourceVector) -> Result<()> {
    available
        .sub(used)
        .map_err(|err| DealMatchError::PoolInconsistency {
            reason: format!("used resources are greater than available for scheduling ({err})"),
        })
}

#[derive(Debug, Clone, Default)]
pub struct PlanPool {
    all: ResourceVector,
    used_spot: PlanMap,
    used_forward: PlanMap,
    committed_spot: PlanMap,
    committed_forward: PlanMap,
    ejected: PlanMap,
    next_seq: u64,
}

impl PlanPool {
    #[must_use]
    pub fn new(all: ResourceVector) -> Self {
        Self {
            all,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn capacity(&self) -> &ResourceVector {
        &self.all
    }

    fn maps(&self) -> [&PlanMap; 5] {
        [
            &self.used_forward,
            &self.used_spot,
            &self.committed_forward,
            &self.committed_spot,
            &self.ejected,
        ]
    }

    /// The plan recorded under `id`, wherever it currently lives.
    #[must_use]
    pub fn plan(&self, id: &str) -> Option<&AskPlan> {
        self.maps().into_iter().find_map(|map| map.get(id))
    }

    #[must_use]
    pub fn is_committed(&self, id: &str) -> bool {
        self.committed_forward.get(id).is_some() || self.committed_spot.get(id).is_some()
    }

    #[must_use]
    pub fn is_ejected(&self, id: &str) -> bool {
        self.ejected.get(id).is_some()
    }

    /// Capacity left for a new plan of the given kind.
    pub fn available_for(&self, spot: bool) -> Result<ResourceVector> {
        let used = if spot {
            &self.used_spot
        } else {
            &self.used_forward
        };
        let mut available = self.all.clone();
        deduct(&mut available, &self.committed_forward.sum()?)?;
        deduct(&mut available, &used.sum()?)?;
        Ok(available)
    }

    /// Check whether `plan` would fit, without recording anything.
    pub fn poll_consume(&self, plan: &AskPlan) -> Result<()> {
        self.available_for(plan.is_spot())?
            .check_contains(&plan.resources)
            .map_err(DealMatchError::NotContained)
    }

    /// Record `plan` as consumed. Does nothing on error.
    ///
    /// # Errors
    /// Returns `NotContained` if the plan does not fit, or
    /// `AlreadyConsumed` if a plan with the same ID is recorded.
    pub fn consume(&mut self, plan: AskPlan) -> Result<()> {
        self.poll_consume(&plan)?;
        if self.plan(&plan.id).is_some() {
            return Err(DealMatchError::AlreadyConsumed(plan.id));
        }

        debug!(plan = %plan.id, spot = plan.is_spot(), "Ask plan consumed");
        let seq = self.next_seq;
        self.next_seq += 1;
        if plan.is_spot() {
            self.used_spot.insert(seq, plan);
        } else {
            self.used_forward.insert(seq, plan);
        }
        Ok(())
    }

    /// Drop `id` from whichever set holds it.
    ///
    /// # Errors
    /// Returns `UnknownConsumer` if no set holds `id`.
    pub fn release(&mut self, id: &str) -> Result<AskPlan> {
        self.take(id).map(|(_, plan)| plan)
    }

    fn take(&mut self, id: &str) -> Result<(u64, AskPlan)> {
        [
            &mut self.used_forward,
            &mut self.used_spot,
            &mut self.committed_forward,
            &mut self.committed_spot,
            &mut self.ejected,
        ]
        .into_iter()
        .find_map(|map| map.remove(id))
        .ok_or_else(|| DealMatchError::UnknownConsumer(id.to_string()))
    }

    /// Commit a consumed plan, ejecting spot plans until every committed
    /// plan fits. Returns the IDs of the ejected plans, latest first.
    ///
    /// # Errors
    /// Returns `NotContained` if ejecting every candidate still leaves too
    /// little room, or `UnknownConsumer` if `plan` was never consumed. The
    /// pool is unchanged on error.
    pub fn make_room_and_commit(&mut self, plan: &AskPlan) -> Result<Vec<String>> {
        let mut next = self.clone();
        let mut ejected = next.shrink_spot(plan)?;
        ejected.extend(next.shrink_committed_spot(plan)?);

        let (seq, _) = next.take(&plan.id)?;
        if plan.is_spot() {
            next.committed_spot.insert(seq, plan.clone());
        } else {
            next.committed_forward.insert(seq, plan.clone());
        }

        info!(plan = %plan.id, ejected = ?ejected, "Ask plan committed");
        *self = next;
        Ok(ejected)
    }

    /// Free capacity once spot plans have yielded to a forward plan.
    fn shrink_spot(&mut self, plan: &AskPlan) -> Result<Vec<String>> {
        if plan.is_spot() {
            return Ok(Vec::new());
        }
        let mut available = self.all.clone();
        deduct(&mut available, &self.used_spot.sum()?)?;
        let mut required = self.committed_forward.sum()?;
        required.add(&plan.resources)?;
        self.eject(&required, available, false)
    }

    fn shrink_committed_spot(&mut self, plan: &AskPlan) -> Result<Vec<String>> {
        let mut available = self.all.clone();
        deduct(&mut available, &self.committed_forward.sum()?)?;
        deduct(&mut available, &self.committed_spot.sum()?)?;
        self.eject(&plan.resources, available, true)
    }

    fn eject(
        &mut self,
        required: &ResourceVector,
        mut available: ResourceVector,
        committed: bool,
    ) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        loop {
            let Err(shortfall) = available.check_capacity(required) else {
                return Ok(ids);
            };
            let popped = if committed {
                self.committed_spot.pop_latest()
            } else {
                self.used_spot.pop_latest()
            };
            let Some((seq, plan)) = popped else {
                return Err(DealMatchError::NotContained(shortfall));
            };

            available.add(&plan.resources)?;
            info!(plan = %plan.id, "Spot plan ejected");
            ids.push(plan.id.clone());
            self.ejected.insert(seq, plan);
        }
    }

    /// Capacity minus every committed plan.
    pub fn committed_free(&self) -> Result<ResourceVector> {
        let mut free = self.all.clone();
        deduct(&mut free, &self.committed_forward.sum()?)?;
        deduct(&mut free, &self.committed_spot.sum()?)?;
        Ok(free)
    }
}
