//! Template DAG definitions: one small, finite step graph per document
//! type.
//!
//! Validation happens entirely at load time — duplicate ids,
//! self-references, dangling dependencies, and cycles are all rejected
//! before a `Template` can exist, so scheduling never has to re-check
//! the contract at runtime.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::TemplateError;

/// One unit of a template DAG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub step_id: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub profile_tags: Vec<String>,
}

/// Raw template payload before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSpec {
    pub template_id: String,
    pub doc_type: String,
    pub steps: Vec<Step>,
}

/// A validated, acyclic step graph for one document type. Fields are
/// private: the only way to obtain a `Template` is through validation.
#[derive(Debug, Clone, Serialize)]
pub struct Template {
    template_id: String,
    doc_type: String,
    steps: Vec<Step>,
}

impl Template {
    pub fn new(spec: TemplateSpec) -> Result<Self, TemplateError> {
        validate(&spec)?;
        Ok(Self {
            template_id: spec.template_id,
            doc_type: spec.doc_type,
            steps: spec.steps,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, TemplateError> {
        let spec: TemplateSpec = serde_json::from_str(raw)
            .map_err(|e| TemplateError::Schema(format!("template payload: {e}")))?;
        Self::new(spec)
    }

    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Step ids in declared order — the template's full route.
    pub fn step_ids(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.step_id.clone()).collect()
    }

    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }

    /// Declared position of a step within the template.
    pub fn position(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.step_id == step_id)
    }

    /// Step ids carrying `tag`, in declared order.
    pub fn steps_tagged(&self, tag: &str) -> Vec<String> {
        self.steps
            .iter()
            .filter(|s| s.profile_tags.iter().any(|t| t == tag))
            .map(|s| s.step_id.clone())
            .collect()
    }

    /// Transitive closure of `requested` under `depends_on`: every
    /// dependency of a requested step is implicitly included.
    pub fn closure(&self, requested: &[String]) -> Result<BTreeSet<String>, TemplateError> {
        let mut closed: BTreeSet<String> = BTreeSet::new();
        let mut pending: Vec<&str> = Vec::new();

        for id in requested {
            if self.step(id).is_none() {
                return Err(TemplateError::UnknownStep(id.clone()));
            }
            pending.push(id);
        }

        while let Some(id) = pending.pop() {
            if !closed.insert(id.to_string()) {
                continue;
            }
            // Dependencies are validated at construction, so the lookup
            // cannot miss.
            if let Some(step) = self.step(id) {
                for dep in &step.depends_on {
                    if !closed.contains(dep) {
                        pending.push(dep);
                    }
                }
            }
        }

        Ok(closed)
    }

    /// Steps of `closure` in a topological order, with ties broken by
    /// declared template position. Deterministic across runs.
    pub(crate) fn topo_order<'a>(&'a self, closure: &BTreeSet<String>) -> Vec<&'a Step> {
        let mut scheduled: Vec<&Step> = Vec::new();
        let mut done: BTreeSet<&str> = BTreeSet::new();

        while scheduled.len() < closure.len() {
            // Earliest declared step whose in-closure dependencies are
            // all scheduled. Validation guarantees acyclicity, so one
            // always exists.
            let next = self.steps.iter().find(|step| {
                closure.contains(&step.step_id)
                    && !done.contains(step.step_id.as_str())
                    && step
                        .depends_on
                        .iter()
                        .filter(|dep| closure.contains(*dep))
                        .all(|dep| done.contains(dep.as_str()))
            });
            match next {
                Some(step) => {
                    done.insert(&step.step_id);
                    scheduled.push(step);
                }
                None => break,
            }
        }

        scheduled
    }
}

fn validate(spec: &TemplateSpec) -> Result<(), TemplateError> {
    let mut ids: BTreeSet<&str> = BTreeSet::new();
    for step in &spec.steps {
        if !ids.insert(&step.step_id) {
            return Err(TemplateError::Schema(format!(
                "duplicate step id: {}",
                step.step_id
            )));
        }
    }

    for step in &spec.steps {
        for dep in &step.depends_on {
            if dep == &step.step_id {
                return Err(TemplateError::Schema(format!(
                    "step depends on itself: {}",
                    step.step_id
                )));
            }
            if !ids.contains(dep.as_str()) {
                return Err(TemplateError::Schema(format!(
                    "step {} depends on undefined step: {dep}",
                    step.step_id
                )));
            }
        }
    }

    detect_cycle(spec)
}

/// Kahn's algorithm over the full template; leftover steps are on a
/// cycle.
fn detect_cycle(spec: &TemplateSpec) -> Result<(), TemplateError> {
    let mut done: BTreeSet<&str> = BTreeSet::new();

    loop {
        let before = done.len();
        for step in &spec.steps {
            if !done.contains(step.step_id.as_str())
                && step.depends_on.iter().all(|d| done.contains(d.as_str()))
            {
                done.insert(&step.step_id);
            }
        }
        if done.len() == spec.steps.len() {
            return Ok(());
        }
        if done.len() == before {
            let stuck: Vec<&str> = spec
                .steps
                .iter()
                .map(|s| s.step_id.as_str())
                .filter(|id| !done.contains(id))
                .collect();
            return Err(TemplateError::Cycle(stuck.join(", ")));
        }
    }
}
