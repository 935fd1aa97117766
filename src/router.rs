//! Department mapping and officer assignment.

use crate::config::RoutingConfig;
use crate::department::Department;
use crate::workload::WorkloadStore;
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingDecision {
    pub department: Department,
    pub assignee: String,
    pub reason: RoutingReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingReason {
    /// Least loaded officer of the department took the case.
    LoadBalanced { previous_load: u32 },
    /// Priority at or above the escalation threshold.
    Escalated,
    /// No officer carries the department's affinity token.
    NoAffinity,
}

impl RoutingDecision {
    pub fn is_manager(&self) -> bool {
        !matches!(self.reason, RoutingReason::LoadBalanced { .. })
    }
}

pub struct Router {
    departments: BTreeMap<String, Department>,
    fallback: Department,
    escalation_threshold: u8,
    manager_suffix: String,
    workloads: Arc<WorkloadStore>,
}

impl Router {
    pub fn new(config: &RoutingConfig, workloads: Arc<WorkloadStore>) -> Self {
        Self {
            departments: config.departments.clone(),
            fallback: config.fallback_department,
            escalation_threshold: config.escalation_threshold,
            manager_suffix: config.manager_suffix.clone(),
            workloads,
        }
    }

    /// Text before the first underscore: "Pothole_Major" -> "Pothole".
    pub fn base_category(refined_category: &str) -> &str {
        refined_category
            .split('_')
            .next()
            .unwrap_or(refined_category)
    }

    pub fn resolve_department(&self, refined_category: &str) -> Department {
        self.departments
            .get(Self::base_category(refined_category))
            .copied()
            .unwrap_or(self.fallback)
    }

    /// Naive affinity: the officer id's last underscore token equals the
    /// department's leading token ("Officer_B_Water" serves `Water_Supply_Dept`).
    pub fn has_affinity(officer_id: &str, department: Department) -> bool {
        officer_id
            .rsplit('_')
            .next()
            .is_some_and(|token| token == department.leading_token())
    }

    pub fn route(&self, refined_category: &str, priority_score: u8) -> Result<RoutingDecision> {
        let department = self.resolve_department(refined_category);
        let eligible = |id: &str| Self::has_affinity(id, department);

        let decision = if !self.workloads.has_eligible(eligible)? {
            self.manager(department, RoutingReason::NoAffinity)
        } else if priority_score >= self.escalation_threshold {
            self.manager(department, RoutingReason::Escalated)
        } else {
            // Officers cannot leave the table, so an eligible one is still present
            match self.workloads.assign_least_loaded(eligible)? {
                Some(assignment) => RoutingDecision {
                    department,
                    assignee: assignment.officer_id,
                    reason: RoutingReason::LoadBalanced {
                        previous_load: assignment.previous_load,
                    },
                },
                None => self.manager(department, RoutingReason::NoAffinity),
            }
        };

        log::debug!(
            "Routed '{}' (P={}) to {} / {} ({:?})",
            refined_category,
            priority_score,
            decision.department,
            decision.assignee,
            decision.reason
        );

        Ok(decision)
    }

    fn manager(&self, department: Department, reason: RoutingReason) -> RoutingDecision {
        RoutingDecision {
            department,
            assignee: department.manager_id(&self.manager_suffix),
            reason,
        }
    }
}
