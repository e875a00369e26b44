use crate::compute::environment::{call_environment, ComputeEnvironment};
use crate::compute::functions::{call_named, number_to_string};
use crate::compute::operator::{EdgeOperator, NamedFunction, NodeOperator};
use crate::events::StageEvent;
use crate::stage::entity::EntityId;
use crate::stage::manager::StageManager;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::trace;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub nodes: usize,
    pub sections: usize,
    pub edges: usize,
    pub writes: usize,
}

/// Stateless per-tick evaluator: every call re-derives computed text from the graph.
/// The only state carried between ticks is the random source used by `##RANDOM##`.
pub struct AutoComputeEngine {
    rng: StdRng,
}

impl Default for AutoComputeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoComputeEngine {
    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn tick(&mut self, stage: &mut StageManager, env: &mut ComputeEnvironment<'_>) -> TickReport {
        let mut report = TickReport::default();
        self.node_pass(stage, env, &mut report);
        self.section_pass(stage, env, &mut report);
        self.edge_pass(stage, env, &mut report);
        trace!(
            nodes = report.nodes,
            sections = report.sections,
            edges = report.edges,
            writes = report.writes,
            "auto compute tick"
        );
        report
    }

    fn node_pass(&mut self, stage: &mut StageManager, env: &mut ComputeEnvironment<'_>, report: &mut TickReport) {
        let mut order: Vec<(EntityId, f32)> =
            stage.text_nodes().into_iter().map(|node| (node.id, node.rect.location.y)).collect();
        order.sort_by(|a, b| a.1.total_cmp(&b.1));

        for (id, _) in order {
            // Text is read at visit time: an earlier write in this pass may have changed it.
            let Some(node) = stage.text_node(id) else {
                continue;
            };
            let Some(operator) = NodeOperator::parse(&node.text) else {
                continue;
            };
            env.events.push(StageEvent::OperatorHighlighted { entity: id, rect: node.rect });
            report.nodes += 1;

            let parents = stage.parent_text_nodes(id);
            let results = match operator {
                NodeOperator::Named(function) => {
                    let args = texts_of(stage, &parents);
                    call_named(function, &args, &mut self.rng)
                }
                NodeOperator::Environment(function) => {
                    let children = stage.child_text_nodes(id);
                    call_environment(function, stage, env, &parents, &children)
                }
            };
            let destinations = stage.child_text_nodes(id);
            distribute(stage, env, &destinations, results, report);
        }
    }

    fn section_pass(&mut self, stage: &mut StageManager, env: &mut ComputeEnvironment<'_>, report: &mut TickReport) {
        let sections: Vec<EntityId> = stage.sections().into_iter().map(|section| section.id).collect();
        for id in sections {
            let Some(section) = stage.section(id) else {
                continue;
            };
            let Some(function) = NamedFunction::parse(&section.text) else {
                continue;
            };
            report.sections += 1;

            let mut inputs: Vec<(f32, String)> = section
                .children
                .iter()
                .filter_map(|child| stage.text_node(*child))
                .map(|node| (node.rect.location.x, node.text.clone()))
                .collect();
            inputs.sort_by(|a, b| a.0.total_cmp(&b.0));
            let args: Vec<String> = inputs.into_iter().map(|(_, text)| text).collect();

            let results = call_named(function, &args, &mut self.rng);
            let destinations = stage.child_text_nodes(id);
            distribute(stage, env, &destinations, results, report);
        }
    }

    fn edge_pass(&mut self, stage: &mut StageManager, env: &mut ComputeEnvironment<'_>, report: &mut TickReport) {
        let mut order: Vec<(EntityId, f32)> = stage
            .edges()
            .into_iter()
            .filter_map(|edge| stage.collision_box(edge.source).map(|rect| (edge.id, rect.location.x)))
            .collect();
        order.sort_by(|a, b| a.1.total_cmp(&b.1));

        for (id, _) in order {
            let Some(edge) = stage.edge(id) else {
                continue;
            };
            let Some(operator) = EdgeOperator::parse(&edge.text) else {
                continue;
            };
            let target = edge.target;
            let (Some(source_node), Some(target_node)) = (stage.text_node(edge.source), stage.text_node(target))
            else {
                continue;
            };
            report.edges += 1;

            let (op, args) = match operator {
                EdgeOperator::Binary(op) => (op, vec![source_node.text.clone(), target_node.text.clone()]),
                EdgeOperator::Shorthand { op, operand } => {
                    (op, vec![source_node.text.clone(), number_to_string(operand)])
                }
            };
            let results = call_named(NamedFunction::Math(op), &args, &mut self.rng);
            if let Some(first) = results.into_iter().next() {
                write_text(stage, env, target, first, report);
            }
        }
    }
}

/// Output `i` goes to destination `i`. Surplus outputs are dropped and destinations
/// without an output keep their text.
fn distribute(
    stage: &mut StageManager,
    env: &mut ComputeEnvironment<'_>,
    destinations: &[EntityId],
    results: Vec<String>,
    report: &mut TickReport,
) {
    for (destination, text) in destinations.iter().zip(results) {
        write_text(stage, env, *destination, text, report);
    }
}

fn write_text(
    stage: &mut StageManager,
    env: &mut ComputeEnvironment<'_>,
    id: EntityId,
    text: String,
    report: &mut TickReport,
) {
    let Some(node) = stage.text_node_mut(id) else {
        return;
    };
    if node.rename(text) {
        report.writes += 1;
        env.events.push(StageEvent::NodeRenamed { entity: id, text: node.text.clone() });
    }
}

fn texts_of(stage: &StageManager, ids: &[EntityId]) -> Vec<String> {
    ids.iter().filter_map(|id| stage.text_node(*id)).map(|node| node.text.clone()).collect()
}
