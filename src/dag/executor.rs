//! Template DAG execution.
//!
//! Runs the dependency closure of the requested steps in a
//! deterministic topological order. A failing step is contained: it is
//! recorded as failed, its transitive dependents are skipped, and
//! every independent step still executes — partial evidence beats
//! total failure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::template::{Step, Template};
use super::TemplateError;

/// Outcome of one step within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Executed,
    Skipped,
    Failed,
}

/// One entry of the execution trace. `position` is the step's index in
/// the scheduled order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub step_id: String,
    pub status: StepStatus,
    pub position: usize,
}

/// Failure surfaced by a step runner. Contained in the trace; never
/// aborts the run.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct StepFailure(pub String);

/// Seam between the scheduler and whatever the steps actually do.
pub trait StepRunner {
    fn run_step(&mut self, step: &Step) -> Result<(), StepFailure>;
}

/// Runner that executes every step as a no-op. Used for decision-only
/// runs where the caller wants the schedule and trace shape without
/// side effects.
pub struct NoopRunner;

impl StepRunner for NoopRunner {
    fn run_step(&mut self, _step: &Step) -> Result<(), StepFailure> {
        Ok(())
    }
}

/// Full record of one template run, shaped for the downstream evidence
/// packet: the template's full route alongside the actually-executed
/// subset.
#[derive(Debug, Clone, Serialize)]
pub struct DagExecution {
    pub template_id: String,
    pub doc_type: String,
    /// Closure of the requested steps, in scheduled order.
    pub selected_steps: Vec<String>,
    /// Every step the template declares, in declared order.
    pub template_route: Vec<String>,
    pub executed_steps: Vec<String>,
    pub trace: Vec<TraceRecord>,
}

/// Execute `requested_steps` (with their transitive dependencies) on
/// `template`, or the full template when `requested_steps` is `None`.
pub fn execute(
    template: &Template,
    requested_steps: Option<&[String]>,
    runner: &mut dyn StepRunner,
) -> Result<DagExecution, TemplateError> {
    let closure = match requested_steps {
        Some(ids) => template.closure(ids)?,
        None => template.step_ids().into_iter().collect(),
    };
    let schedule = template.topo_order(&closure);

    let mut status: BTreeMap<&str, StepStatus> = BTreeMap::new();
    let mut trace: Vec<TraceRecord> = Vec::new();
    let mut executed: Vec<String> = Vec::new();

    for (position, step) in schedule.iter().enumerate() {
        let deps_satisfied = step
            .depends_on
            .iter()
            .all(|dep| status.get(dep.as_str()) == Some(&StepStatus::Executed));

        let outcome = if !deps_satisfied {
            StepStatus::Skipped
        } else {
            match runner.run_step(step) {
                Ok(()) => StepStatus::Executed,
                Err(failure) => {
                    tracing::warn!(
                        step_id = %step.step_id,
                        error = %failure,
                        "step failed; dependents will be skipped"
                    );
                    StepStatus::Failed
                }
            }
        };

        status.insert(&step.step_id, outcome);
        if outcome == StepStatus::Executed {
            executed.push(step.step_id.clone());
        }
        trace.push(TraceRecord {
            step_id: step.step_id.clone(),
            status: outcome,
            position,
        });
    }

    Ok(DagExecution {
        template_id: template.template_id().to_string(),
        doc_type: template.doc_type().to_string(),
        selected_steps: schedule.iter().map(|s| s.step_id.clone()).collect(),
        template_route: template.step_ids(),
        executed_steps: executed,
        trace,
    })
}
