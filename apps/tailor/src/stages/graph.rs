//! Task graph construction and run-order selection.
//!
//! `TaskGraph::build` materializes every catalogue stage in two passes:
//!   1. one node per stage, bound to its worker profile and to the requested
//!      tools that are actually registered (others are omitted);
//!   2. context names resolved to `NodeId`s; names missing from the catalogue
//!      are dropped.
//!
//! `TaskGraph::select` then keeps an ordered subset. A node's context is
//! narrowed to stages that run before it in that order.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::stages::{StageCatalogue, StageConfigError, WorkerProfile};
use crate::tools::ToolRegistry;

/// Typed reference to a node within one `TaskGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct StageNode {
    pub name: String,
    pub instructions: String,
    pub expected_output: String,
    pub worker_name: String,
    pub worker: WorkerProfile,
    /// Only the requested tools that were available at build time.
    pub tools: ToolRegistry,
    pub context: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct TaskGraph {
    nodes: Vec<StageNode>,
    index: HashMap<String, NodeId>,
}

impl TaskGraph {
    pub fn build(
        catalogue: &StageCatalogue,
        available: &ToolRegistry,
    ) -> Result<Self, StageConfigError> {
        let mut nodes = Vec::with_capacity(catalogue.stages.len());
        let mut index = HashMap::with_capacity(catalogue.stages.len());

        // Pass 1: nodes with worker and tools bound.
        for def in &catalogue.stages {
            let worker = catalogue
                .worker(&def.worker)
                .ok_or_else(|| StageConfigError::UnknownWorker {
                    stage: def.name.clone(),
                    worker: def.worker.clone(),
                })?;

            let mut tools = ToolRegistry::new();
            for name in worker.tools.iter().chain(def.tools.iter()) {
                match available.get(name) {
                    Some(tool) => tools.register(tool),
                    None => debug!(stage = %def.name, tool = %name, "tool not available, omitted"),
                }
            }

            let id = NodeId(nodes.len());
            if index.insert(def.name.clone(), id).is_some() {
                return Err(StageConfigError::DuplicateStage(def.name.clone()));
            }
            nodes.push(StageNode {
                name: def.name.clone(),
                instructions: def.instructions.clone(),
                expected_output: def.expected_output.clone(),
                worker_name: def.worker.clone(),
                worker: worker.clone(),
                tools,
                context: Vec::new(),
            });
        }

        // Pass 2: context wiring.
        for (def, node) in catalogue.stages.iter().zip(nodes.iter_mut()) {
            node.context = def
                .context
                .iter()
                .filter_map(|name| {
                    let id = index.get(name).copied();
                    if id.is_none() {
                        warn!(stage = %def.name, context = %name, "context stage not in catalogue, dropped");
                    }
                    id
                })
                .collect();
        }

        Ok(Self { nodes, index })
    }

    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> &StageNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Keeps the named stages in the given order and discards the rest.
    /// An unknown name fails here, before anything runs.
    pub fn select<S: AsRef<str>>(self, order: &[S]) -> Result<ExecutionPlan, StageConfigError> {
        if order.is_empty() {
            return Err(StageConfigError::EmptySelection);
        }

        let mut position: HashMap<NodeId, usize> = HashMap::with_capacity(order.len());
        for (pos, name) in order.iter().enumerate() {
            let name = name.as_ref();
            let id = self
                .id_of(name)
                .ok_or_else(|| StageConfigError::UnknownStage(name.to_string()))?;
            if position.insert(id, pos).is_some() {
                return Err(StageConfigError::RepeatedSelection(name.to_string()));
            }
        }

        let steps = order
            .iter()
            .enumerate()
            .map(|(pos, name)| {
                let node = self.node(self.index[name.as_ref()]).clone();
                let context = node
                    .context
                    .iter()
                    .filter_map(|id| match position.get(id) {
                        Some(&earlier) if earlier < pos => Some(earlier),
                        _ => {
                            debug!(
                                stage = %node.name,
                                context = %self.node(*id).name,
                                "context stage does not run earlier, dropped"
                            );
                            None
                        }
                    })
                    .collect();
                PlannedStage { node, context }
            })
            .collect();

        Ok(ExecutionPlan { steps })
    }
}

/// A selected stage; `context` holds positions of earlier steps.
#[derive(Debug, Clone)]
pub struct PlannedStage {
    pub node: StageNode,
    pub context: Vec<usize>,
}

impl PlannedStage {
    pub fn name(&self) -> &str {
        &self.node.name
    }
}

/// Non-empty ordered run of stages.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    steps: Vec<PlannedStage>,
}

impl ExecutionPlan {
    pub fn steps(&self) -> &[PlannedStage] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.steps.iter().map(PlannedStage::name).collect()
    }
}
