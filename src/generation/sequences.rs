//! Test sequence generation.
//!
//! Walks the flattened graph depth first. Every visited edge is checked
//! against the machine: init descents are followed as they come, eventless
//! edges are checked against what the machine actually did, history edges
//! against the history of the path so far, and every other edge needs an
//! input from its generator, which is then fed to a live machine.

use super::error::GenerationError;
use super::generators::{GeneratorIndex, GeneratorTransition};
use super::strategy::{EdgeContext, Strategy};
use crate::builder::FsmDefinition;
use crate::core::{
    analyze_state_tree, event_label, is_init_state, resolve_history, ControlState, EventKind,
    HistoryTarget, StateHierarchy, INIT_STATE, NO_OUTPUT,
};
use crate::engine::{ExecutionEngine, InputEvent, MachineInstance, StepOutput};
use crate::graph::{
    build_graph, depth_first_traverse_edges, Edge, EdgeId, EdgeTraversal, EdgeVisit, FsmGraph,
    GoalEvaluation,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, trace};

/// Per-path accumulator of the search.
///
/// `control_state_sequence` always starts with [`INIT_STATE`] and holds one
/// more entry than `path`.
#[derive(Clone, Debug, PartialEq)]
pub struct PathTraversalState {
    pub path: Vec<EdgeId>,
    pub control_state_sequence: Vec<ControlState>,
    pub input_sequence: Vec<InputEvent>,
    pub output_sequence: Vec<Value>,
    /// Index, in the steps of the last input, of the last step accounted for.
    pub output_index: usize,
    pub generator_state: Value,
}

impl Default for PathTraversalState {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            control_state_sequence: vec![INIT_STATE.to_string()],
            input_sequence: Vec::new(),
            output_sequence: Vec::new(),
            output_index: 0,
            generator_state: Value::Null,
        }
    }
}

impl PathTraversalState {
    fn advance(&self, id: EdgeId, to: &str) -> Self {
        let mut next = self.clone();
        next.path.push(id);
        next.control_state_sequence.push(to.to_string());
        next
    }
}

/// A generated test: inputs to send, outputs to expect, and the control
/// states the machine goes through.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub input_sequence: Vec<InputEvent>,
    pub output_sequence: Vec<Value>,
    pub control_state_sequence: Vec<ControlState>,
}

impl From<&PathTraversalState> for TestCase {
    fn from(path: &PathTraversalState) -> Self {
        Self {
            input_sequence: path.input_sequence.clone(),
            output_sequence: path.output_sequence.clone(),
            control_state_sequence: path.control_state_sequence.clone(),
        }
    }
}

type ResultCallback<'a> = Box<dyn FnMut(&[TestCase]) + 'a>;

/// Settings of a generation run.
pub struct GenerationSettings<'a, S> {
    pub strategy: S,
    /// Called with all results so far, each time a test case is found.
    pub on_result: Option<ResultCallback<'a>>,
}

impl<'a, S: Strategy> GenerationSettings<'a, S> {
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            on_result: None,
        }
    }

    pub fn on_result<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&[TestCase]) + 'a,
    {
        self.on_result = Some(Box::new(callback));
        self
    }
}

/// Generate test cases for `fsm`.
///
/// `generators` supply the event data of every eventful branch; `engine`
/// runs the machine. Edges whose input cannot be generated, whose guard does
/// not hold, or whose history does not match the path are pruned silently.
///
/// # Errors
///
/// Fails if a transition leaves [`INIT_STATE`] on an event other than `init`,
/// or if the engine fails.
///
/// # Example
///
/// ```rust
/// use chartwalk::builder::{initial_transition, simple_transition, FsmDefinition};
/// use chartwalk::engine::Interpreter;
/// use chartwalk::generation::{
///     generate_test_sequences, AllTransitions, GenerationSettings, GeneratorTransition,
///     InputGenerator,
/// };
/// use serde_json::{json, Value};
///
/// let fsm = FsmDefinition::builder()
///     .states(serde_json::from_value(json!({ "A": "", "B": "" })).unwrap())
///     .add_transition(initial_transition("A"))
///     .add_transition(simple_transition("A", Some("go"), "B"))
///     .build()
///     .unwrap();
/// let generators = [GeneratorTransition::single(
///     "A",
///     Some("go"),
///     "B",
///     InputGenerator::constant(Value::Null),
/// )];
/// let settings = GenerationSettings::new(AllTransitions {
///     target_vertex: "B".into(),
/// });
///
/// let tests = generate_test_sequences(&fsm, &generators, &Interpreter::new(), settings).unwrap();
///
/// assert_eq!(tests.len(), 1);
/// assert_eq!(tests[0].control_state_sequence, ["nok", "A", "B"]);
/// ```
pub fn generate_test_sequences<S, M>(
    fsm: &FsmDefinition,
    generators: &[GeneratorTransition],
    engine: &M,
    settings: GenerationSettings<'_, S>,
) -> Result<Vec<TestCase>, GenerationError>
where
    S: Strategy,
    M: ExecutionEngine + ?Sized,
{
    let graph = build_graph(fsm);
    let mut search = SequenceSearch {
        fsm,
        hierarchy: analyze_state_tree(fsm.states()),
        engine,
        generators: GeneratorIndex::new(generators),
        strategy: settings.strategy,
        on_result: settings.on_result,
    };
    info!(
        vertices = graph.vertices().len(),
        edges = graph.edges().len(),
        generators = search.generators.len(),
        "Generating test sequences"
    );

    let results = depth_first_traverse_edges(&mut search, INIT_STATE, &graph)?;
    info!(test_cases = results.len(), "Generated test sequences");
    Ok(results)
}

/// How a visited edge is handled.
enum VisitCase<'e> {
    /// Leaving the initial state on anything but `init`.
    InitStateEvent,
    /// Leaving the initial state on `init`.
    InitialTransition,
    /// A compound state descending to its default child.
    InitDescent,
    Eventless,
    History { event: &'e str, history: &'e HistoryTarget },
    Eventful { event: &'e str },
}

impl<'e> VisitCase<'e> {
    fn of(edge: &'e Edge) -> Self {
        let from_init_state = is_init_state(edge.from());
        match (from_init_state, EventKind::classify(edge.event()), edge.history()) {
            (true, EventKind::Init, _) => Self::InitialTransition,
            (true, _, _) => Self::InitStateEvent,
            (false, EventKind::Init, _) => Self::InitDescent,
            (false, EventKind::Eventless, _) => Self::Eventless,
            (false, EventKind::Normal(event), Some(history)) => Self::History { event, history },
            (false, EventKind::Normal(event), None) => Self::Eventful { event },
        }
    }
}

/// A machine brought to the end of a path by replaying its inputs.
struct Replay<'a> {
    machine: Box<dyn MachineInstance + 'a>,
    /// Steps of the last input, or of startup if there was none.
    traced: Vec<StepOutput>,
    extended_state: Value,
}

struct SequenceSearch<'a, S, M: ?Sized> {
    fsm: &'a FsmDefinition,
    hierarchy: StateHierarchy,
    engine: &'a M,
    generators: GeneratorIndex,
    strategy: S,
    on_result: Option<ResultCallback<'a>>,
}

type Visit = EdgeVisit<PathTraversalState>;

fn pruned(path: &PathTraversalState) -> Visit {
    EdgeVisit {
        path_state: path.clone(),
        is_traversable: false,
    }
}

/// Append outputs the way they were traced: an array contributes its items.
fn append_outputs(sequence: &mut Vec<Value>, outputs: &Value) {
    match outputs {
        Value::Array(items) => sequence.extend(items.iter().cloned()),
        other => sequence.push(other.clone()),
    }
}

impl<'a, S, M> SequenceSearch<'a, S, M>
where
    S: Strategy,
    M: ExecutionEngine + ?Sized,
{
    fn replay(&self, inputs: &[InputEvent]) -> Result<Replay<'a>, GenerationError> {
        let mut machine = self.engine.create(self.fsm)?;
        let mut traced = machine.start()?;
        let mut extended_state = self.fsm.initial_extended_state().clone();

        for input in inputs {
            traced = machine.send(input)?;
            if let Some(last) = traced.last() {
                extended_state = last.new_extended_state.clone();
            }
        }

        Ok(Replay {
            machine,
            traced,
            extended_state,
        })
    }

    /// Whether a machine entering `target` ends up in `settled`.
    fn settles_in(&self, target: &str, settled: &str) -> bool {
        target == settled
            || self
                .hierarchy
                .leaf_descendants(target)
                .iter()
                .any(|leaf| leaf == settled)
    }

    fn visit_eventless(
        &self,
        id: EdgeId,
        edge: &Edge,
        path: &PathTraversalState,
    ) -> Result<Visit, GenerationError> {
        let replay = self.replay(&path.input_sequence)?;
        let Some(step) = replay.traced.get(path.output_index + 1) else {
            debug!(%edge, "Pruned: machine took no further eventless transition");
            return Ok(pruned(path));
        };

        let guard_holds = edge
            .predicate()
            .map_or(true, |guard| guard.check(&step.extended_state, &NO_OUTPUT));
        if !guard_holds {
            debug!(%edge, "Pruned: guard does not hold");
            return Ok(pruned(path));
        }

        // A traced history edge is only one of the states the history could
        // resolve to; keep the one the machine settled in.
        if edge.history().is_some() && !self.settles_in(edge.to(), &step.target_control_state) {
            debug!(
                %edge,
                settled = %step.target_control_state,
                "Pruned: history resolved elsewhere"
            );
            return Ok(pruned(path));
        }

        let mut next = path.advance(id, edge.to());
        append_outputs(&mut next.output_sequence, &step.outputs);
        next.output_index += 1;
        Ok(EdgeVisit {
            path_state: next,
            is_traversable: true,
        })
    }

    fn visit_history(
        &self,
        id: EdgeId,
        edge: &Edge,
        event: &str,
        history: &HistoryTarget,
        path: &PathTraversalState,
    ) -> Result<Visit, GenerationError> {
        let resolved = resolve_history(
            self.fsm.states(),
            &path.control_state_sequence,
            history.kind(),
            history.parent(),
        )?;
        if resolved.as_deref() != Some(edge.to()) {
            debug!(%edge, resolved = ?resolved, "Pruned: history resolves elsewhere");
            return Ok(pruned(path));
        }
        self.visit_eventful(id, edge, event, path)
    }

    fn visit_eventful(
        &self,
        id: EdgeId,
        edge: &Edge,
        event: &str,
        path: &PathTraversalState,
    ) -> Result<Visit, GenerationError> {
        let Some(generator) =
            self.generators
                .get(edge.transition_origin(), edge.event(), edge.guard_index())
        else {
            debug!(%edge, "Pruned: no input generator");
            return Ok(pruned(path));
        };

        let Replay {
            mut machine,
            extended_state,
            ..
        } = self.replay(&path.input_sequence)?;
        let generated = generator.generate(&extended_state, &path.generator_state);
        if !generated.has_generated_input {
            debug!(%edge, "Pruned: no input can be generated");
            return Ok(pruned(path));
        }

        let input = InputEvent::new(event, generated.input);
        let steps = machine.send(&input)?;
        let Some(first) = steps.first() else {
            debug!(%edge, "Pruned: machine did not accept the generated input");
            return Ok(pruned(path));
        };

        let mut next = path.advance(id, edge.to());
        next.output_sequence.push(first.outputs.clone());
        next.input_sequence.push(input);
        next.output_index = 0;
        if let Some(state) = generated.generator_state {
            next.generator_state = state;
        }
        Ok(EdgeVisit {
            path_state: next,
            is_traversable: true,
        })
    }
}

impl<'a, S, M> EdgeTraversal<Edge> for SequenceSearch<'a, S, M>
where
    S: Strategy,
    M: ExecutionEngine + ?Sized,
{
    type PathState = PathTraversalState;
    type GoalState = Vec<TestCase>;
    type Output = Vec<TestCase>;
    type Error = GenerationError;

    fn initial_path_state(&self) -> PathTraversalState {
        PathTraversalState::default()
    }

    fn initial_goal_state(&self) -> Vec<TestCase> {
        Vec::new()
    }

    fn visit_edge(
        &mut self,
        id: EdgeId,
        graph: &FsmGraph,
        path: &PathTraversalState,
        goal: &Vec<TestCase>,
    ) -> Result<Visit, GenerationError> {
        let edge = graph.edge(id);
        trace!(%edge, depth = path.path.len(), "Visiting edge");

        let context = EdgeContext {
            id,
            graph,
            path,
            results: goal,
        };
        match VisitCase::of(edge) {
            VisitCase::InitialTransition | VisitCase::InitDescent => Ok(EdgeVisit {
                path_state: path.advance(id, edge.to()),
                is_traversable: true,
            }),
            VisitCase::InitStateEvent => Err(GenerationError::InitStateEvent {
                state: edge.from().to_string(),
                event: event_label(edge.event()),
            }),
            _ if !self.strategy.is_traversable_edge(&context) => Ok(pruned(path)),
            VisitCase::Eventless => self.visit_eventless(id, edge, path),
            VisitCase::History { event, history } => {
                self.visit_history(id, edge, event, history, path)
            }
            VisitCase::Eventful { event } => self.visit_eventful(id, edge, event, path),
        }
    }

    fn evaluate_goal(
        &mut self,
        id: EdgeId,
        graph: &FsmGraph,
        path: &PathTraversalState,
        mut goal: Vec<TestCase>,
    ) -> GoalEvaluation<Vec<TestCase>> {
        let context = EdgeContext {
            id,
            graph,
            path,
            results: &goal,
        };
        let is_goal_reached = self.strategy.is_goal_reached(&context);

        if is_goal_reached {
            goal.push(TestCase::from(path));
            debug!(
                test_cases = goal.len(),
                length = path.input_sequence.len(),
                "Found test case"
            );
            if let Some(on_result) = self.on_result.as_mut() {
                on_result(&goal);
            }
        }

        GoalEvaluation {
            is_goal_reached,
            goal_state: goal,
        }
    }

    fn show_results(&self, goal: Vec<TestCase>) -> Vec<TestCase> {
        goal
    }
}
