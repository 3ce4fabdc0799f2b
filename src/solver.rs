use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use fnv::{FnvHashMap, FnvHashSet};
use log::{debug, info};
use serde::{Serialize, Serializer};

use crate::{
    engine::transition,
    filters::{MoveSequence, filter_near_duplicates},
    game::{ALL_DIRECTIONS, Direction, State},
    goals,
    zobrist::{Fingerprint, Zobrist},
};

/// Edit distance under which two reported move sequences count as variants.
const NEAR_DUPLICATE_EDITS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverOptions {
    pub max_depth: usize,
    pub max_nodes: usize,
    pub max_solutions: usize,
    /// Expanded nodes between yield points.
    pub yield_every: usize,
    /// Fingerprint seed; `None` picks a fresh one per session.
    pub seed: Option<u64>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            max_depth: 100,
            max_nodes: 200_000,
            max_solutions: 50,
            yield_every: 500,
            seed: None,
        }
    }
}

/// Shared flag for stopping a search from outside. Observed at yield points.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Receives human-readable status lines while a search runs.
pub trait Progress {
    fn report(&mut self, status: &str);
}

impl<F: FnMut(&str)> Progress for F {
    fn report(&mut self, status: &str) {
        self(status)
    }
}

/// Discards all status lines.
pub struct Silent;

impl Progress for Silent {
    fn report(&mut self, _status: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Termination {
    /// Every reachable state was expanded.
    Exhausted,
    /// The frontier ran dry, but some states were left unexpanded at the
    /// depth limit.
    DepthLimit,
    NodeBudget,
    SolutionBudget,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveStats {
    pub nodes_expanded: usize,
    pub states_visited: usize,
    pub raw_solutions: usize,
    pub raw_dead_ends: usize,
    pub termination: Termination,
}

// Fingerprints are written as decimal strings so that consumers with
// 53-bit numbers read them intact.
fn fingerprint_str<S: Serializer>(fingerprint: &Fingerprint, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(fingerprint)
}

fn fingerprint_set<S: Serializer>(
    set: &FnvHashSet<Fingerprint>,
    s: S,
) -> Result<S::Ok, S::Error> {
    s.collect_seq(set.iter().map(Fingerprint::to_string))
}

fn fingerprint_lists<S: Serializer>(
    lists: &FnvHashMap<Fingerprint, Vec<Fingerprint>>,
    s: S,
) -> Result<S::Ok, S::Error> {
    s.collect_map(lists.iter().map(|(from, to)| {
        let to: Vec<String> = to.iter().map(Fingerprint::to_string).collect();
        (from.to_string(), to)
    }))
}

fn move_code<S: Serializer>(direction: &Direction, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_char(direction.code())
}

/// A transition recorded during the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    #[serde(serialize_with = "fingerprint_str")]
    pub parent: Fingerprint,
    #[serde(serialize_with = "fingerprint_str")]
    pub child: Fingerprint,
    #[serde(rename = "move", serialize_with = "move_code")]
    pub direction: Direction,
    pub losing: bool,
}

/// The explored part of the state graph.
///
/// `edges` are the discovery edges (one per visited state, losing ones
/// included); `links` are the remaining non-losing transitions that led
/// to states already visited. Adjacency covers both, minus losing edges.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateGraph {
    #[serde(serialize_with = "fingerprint_str")]
    pub start: Fingerprint,
    #[serde(serialize_with = "fingerprint_set")]
    pub processed: FnvHashSet<Fingerprint>,
    pub edges: Vec<Edge>,
    pub links: Vec<Edge>,
    #[serde(serialize_with = "fingerprint_lists")]
    pub adjacency: FnvHashMap<Fingerprint, Vec<Fingerprint>>,
    #[serde(serialize_with = "fingerprint_lists")]
    pub reverse: FnvHashMap<Fingerprint, Vec<Fingerprint>>,
    pub depths: FnvHashMap<Fingerprint, usize>,
    #[serde(serialize_with = "fingerprint_set")]
    pub goals: FnvHashSet<Fingerprint>,
    /// States from which a goal is reachable.
    #[serde(serialize_with = "fingerprint_set")]
    pub solvable: FnvHashSet<Fingerprint>,
}

impl StateGraph {
    fn connect(&mut self, edge: &Edge) {
        self.adjacency.entry(edge.parent).or_default().push(edge.child);
        self.adjacency.entry(edge.child).or_default();
        self.reverse.entry(edge.child).or_default().push(edge.parent);
        self.reverse.entry(edge.parent).or_default();
    }

    pub fn successors(&self, fingerprint: Fingerprint) -> &[Fingerprint] {
        self.adjacency
            .get(&fingerprint)
            .map_or(&[], |next| next.as_slice())
    }

    pub fn predecessors(&self, fingerprint: Fingerprint) -> &[Fingerprint] {
        self.reverse
            .get(&fingerprint)
            .map_or(&[], |prev| prev.as_slice())
    }

    /// All states that can reach one of `targets` along non-losing edges.
    pub fn reverse_reachable(
        &self,
        targets: impl IntoIterator<Item = Fingerprint>,
    ) -> FnvHashSet<Fingerprint> {
        let mut reached = FnvHashSet::default();
        let mut queue = VecDeque::new();
        for target in targets {
            if reached.insert(target) {
                queue.push_back(target);
            }
        }
        while let Some(fingerprint) = queue.pop_front() {
            for &prev in self.predecessors(fingerprint) {
                if reached.insert(prev) {
                    queue.push_back(prev);
                }
            }
        }
        reached
    }

    pub fn is_solvable(&self, fingerprint: Fingerprint) -> bool {
        self.solvable.contains(&fingerprint)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveOutcome {
    pub solutions: Vec<MoveSequence>,
    pub dead_ends: Vec<MoveSequence>,
    pub stats: SolveStats,
    pub graph: StateGraph,
    #[serde(skip)]
    pub cancel: CancelToken,
}

impl SolveOutcome {
    /// Final status line.
    pub fn summary(&self) -> String {
        format!(
            "Done. nodes expanded: {}, solutions: {}, dead ends: {}",
            self.stats.nodes_expanded,
            self.solutions.len(),
            self.dead_ends.len()
        )
    }
}

struct Node {
    state: State,
    depth: usize,
    fingerprint: Fingerprint,
}

/// Breadth-first search over every state reachable from a starting state.
///
/// The search is resumable: [`Solver::step`] expands nodes up to the next
/// yield point and returns, leaving the frontier in place.
pub struct Solver {
    initial: State,
    options: SolverOptions,
    cancel: CancelToken,
    zobrist: Zobrist,
    frontier: VecDeque<Node>,
    visited: FnvHashSet<Fingerprint>,
    losing: FnvHashSet<Fingerprint>,
    parents: FnvHashMap<Fingerprint, (Fingerprint, Direction)>,
    solvable: FnvHashSet<Fingerprint>,
    solutions: Vec<MoveSequence>,
    graph: StateGraph,
    nodes_expanded: usize,
    /// Set once a node is dropped unexpanded at `max_depth`.
    depth_limited: bool,
    termination: Option<Termination>,
}

impl Solver {
    pub fn new(initial: &State, options: SolverOptions, cancel: CancelToken) -> Self {
        let width = initial.width() as usize;
        let height = initial.height() as usize;
        let zobrist = match options.seed {
            Some(seed) => Zobrist::new(width, height, seed),
            None => Zobrist::from_entropy(width, height),
        };
        let start = zobrist.fingerprint(initial);

        let mut solver = Solver {
            initial: initial.clone(),
            options,
            cancel,
            zobrist,
            frontier: VecDeque::new(),
            visited: FnvHashSet::default(),
            losing: FnvHashSet::default(),
            parents: FnvHashMap::default(),
            solvable: FnvHashSet::default(),
            solutions: Vec::new(),
            graph: StateGraph {
                start,
                ..StateGraph::default()
            },
            nodes_expanded: 0,
            depth_limited: false,
            termination: None,
        };
        solver.visited.insert(start);
        solver.graph.depths.insert(start, 0);

        // Already solved
        if goals::is_winning(initial) {
            solver.record_solution(start);
        } else {
            solver.frontier.push_back(Node {
                state: initial.clone(),
                depth: 0,
                fingerprint: start,
            });
        }
        solver
    }

    pub fn nodes_expanded(&self) -> usize {
        self.nodes_expanded
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Status line reported at yield points.
    pub fn status(&self) -> String {
        format!(
            "Searching... nodes:{}, queue:{}, solutions:{}",
            self.nodes_expanded,
            self.frontier.len(),
            self.solutions.len()
        )
    }

    /// Expand nodes until the next yield point. Returns the termination
    /// reason once the search is over, `None` if it can be resumed.
    pub fn step(&mut self) -> Option<Termination> {
        if let Some(termination) = self.termination {
            return Some(termination);
        }
        if self.cancel.is_cancelled() {
            return self.terminate(Termination::Cancelled);
        }

        let yield_every = self.options.yield_every.max(1);
        loop {
            if let Some(reason) = self.stop_reason() {
                return self.terminate(reason);
            }
            let Some(node) = self.frontier.pop_front() else {
                return self.terminate(self.drained());
            };
            self.nodes_expanded += 1;
            self.expand(node);

            if self.nodes_expanded % yield_every == 0 {
                debug!("{}", self.status());
                return None;
            }
        }
    }

    /// Run to completion, reporting status at every yield point.
    pub fn run<P: Progress + ?Sized>(mut self, progress: &mut P) -> SolveOutcome {
        info!(
            "solving {}x{} level: max depth {}, max nodes {}, max solutions {}",
            self.initial.width(),
            self.initial.height(),
            self.options.max_depth,
            self.options.max_nodes,
            self.options.max_solutions
        );
        while self.step().is_none() {
            progress.report(&self.status());
        }
        let outcome = self.finish();
        progress.report(&outcome.summary());
        outcome
    }

    fn stop_reason(&self) -> Option<Termination> {
        if self.frontier.is_empty() {
            Some(self.drained())
        } else if self.nodes_expanded >= self.options.max_nodes {
            Some(Termination::NodeBudget)
        } else if self.solutions.len() >= self.options.max_solutions {
            Some(Termination::SolutionBudget)
        } else {
            None
        }
    }

    fn drained(&self) -> Termination {
        if self.depth_limited {
            Termination::DepthLimit
        } else {
            Termination::Exhausted
        }
    }

    fn terminate(&mut self, reason: Termination) -> Option<Termination> {
        self.termination = Some(reason);
        Some(reason)
    }

    fn expand(&mut self, node: Node) {
        if node.depth >= self.options.max_depth {
            self.depth_limited = true;
            return;
        }
        self.graph.processed.insert(node.fingerprint);

        for dir in ALL_DIRECTIONS {
            let next = transition(&node.state, dir);
            if !next.changed {
                continue;
            }
            let child = self.zobrist.fingerprint(&next.state);
            let edge = Edge {
                parent: node.fingerprint,
                child,
                direction: dir,
                losing: false,
            };

            if !self.visited.insert(child) {
                if child != node.fingerprint && !self.losing.contains(&child) {
                    self.graph.links.push(edge);
                }
                continue;
            }

            if goals::is_losing(&next.state) {
                self.losing.insert(child);
                self.graph.edges.push(Edge {
                    losing: true,
                    ..edge
                });
                continue;
            }
            self.graph.edges.push(edge);
            self.parents.insert(child, (node.fingerprint, dir));
            self.graph.depths.insert(child, node.depth + 1);

            if goals::is_winning(&next.state) {
                self.record_solution(child);
                if self.solutions.len() >= self.options.max_solutions {
                    break;
                }
                continue;
            }

            self.frontier.push_back(Node {
                state: next.state,
                depth: node.depth + 1,
                fingerprint: child,
            });
        }
    }

    fn record_solution(&mut self, goal: Fingerprint) {
        self.graph.goals.insert(goal);
        self.mark_solvable(goal);
        let moves = self.path_to(goal);
        self.solutions.push(MoveSequence::new(moves));
    }

    /// Mark `fingerprint` and its discovery ancestors solvable.
    fn mark_solvable(&mut self, mut fingerprint: Fingerprint) {
        while self.solvable.insert(fingerprint) {
            match self.parents.get(&fingerprint) {
                Some(&(parent, _)) => fingerprint = parent,
                None => break,
            }
        }
    }

    fn path(&self, mut fingerprint: Fingerprint) -> Vec<Direction> {
        let mut moves = Vec::new();
        while let Some(&(parent, dir)) = self.parents.get(&fingerprint) {
            moves.push(dir);
            fingerprint = parent;
        }
        moves.reverse();
        moves
    }

    fn path_to(&self, fingerprint: Fingerprint) -> String {
        self.path(fingerprint).into_iter().map(Direction::code).collect()
    }

    /// Rebuild a visited state by replaying its discovery path.
    fn rebuild(&self, fingerprint: Fingerprint) -> State {
        self.path(fingerprint)
            .into_iter()
            .fold(self.initial.clone(), |state, dir| transition(&state, dir).state)
    }

    fn has_solvable_successor(&self, state: &State, solvable: &FnvHashSet<Fingerprint>) -> bool {
        ALL_DIRECTIONS.into_iter().any(|dir| {
            let next = transition(state, dir);
            next.changed && solvable.contains(&self.zobrist.fingerprint(&next.state))
        })
    }

    /// Close the search: compute solvability over the whole explored graph,
    /// classify dead ends and filter near-identical move sequences.
    pub fn finish(mut self) -> SolveOutcome {
        let termination = self.termination.unwrap_or(Termination::Cancelled);

        let mut graph = std::mem::take(&mut self.graph);
        let playable: Vec<Edge> = graph
            .edges
            .iter()
            .chain(&graph.links)
            .filter(|edge| !edge.losing)
            .copied()
            .collect();
        for edge in &playable {
            graph.connect(edge);
        }
        let mut solvable = graph.reverse_reachable(graph.goals.iter().copied());
        solvable.extend(self.solvable.iter().copied());

        let mut dead_ends = Vec::new();
        for edge in &graph.edges {
            if edge.losing
                || !solvable.contains(&edge.parent)
                || solvable.contains(&edge.child)
                || !graph.processed.contains(&edge.child)
            {
                continue;
            }
            let state = self.rebuild(edge.child);
            if self.has_solvable_successor(&state, &solvable) {
                continue;
            }
            dead_ends.push(MoveSequence::new(self.path_to(edge.child)));
        }
        graph.solvable = solvable;

        let stats = SolveStats {
            nodes_expanded: self.nodes_expanded,
            states_visited: self.visited.len(),
            raw_solutions: self.solutions.len(),
            raw_dead_ends: dead_ends.len(),
            termination,
        };
        let outcome = SolveOutcome {
            solutions: filter_near_duplicates(&self.solutions, NEAR_DUPLICATE_EDITS),
            dead_ends: filter_near_duplicates(&dead_ends, NEAR_DUPLICATE_EDITS),
            stats,
            graph,
            cancel: self.cancel,
        };
        info!(
            "search finished ({:?}): {} nodes, {} solutions, {} dead ends",
            termination,
            outcome.stats.nodes_expanded,
            outcome.solutions.len(),
            outcome.dead_ends.len()
        );
        outcome
    }
}

/// Search `initial` to completion with the given options.
pub fn solve<P: Progress + ?Sized>(
    initial: &State,
    options: SolverOptions,
    cancel: CancelToken,
    progress: &mut P,
) -> SolveOutcome {
    Solver::new(initial, options, cancel).run(progress)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Exit on the left, plate right of the box. Pushing the box past the
    // plate strands it against the wall.
    const PLATE_LEVEL: &str = "#E@$_ #";

    fn options() -> SolverOptions {
        SolverOptions {
            seed: Some(1),
            ..SolverOptions::default()
        }
    }

    fn run(text: &str, options: SolverOptions) -> SolveOutcome {
        let state = State::from_text(text).unwrap();
        solve(&state, options, CancelToken::new(), &mut Silent)
    }

    fn play(text: &str, moves: &str) -> State {
        let mut state = State::from_text(text).unwrap();
        for code in moves.chars() {
            let dir = Direction::from_code(code).unwrap();
            let next = transition(&state, dir);
            assert!(next.changed, "move {} failed on:\n{}", code, state);
            state = next.state;
        }
        state
    }

    fn moves(sequences: &[MoveSequence]) -> Vec<&str> {
        sequences.iter().map(|s| s.moves.as_str()).collect()
    }

    #[test]
    fn test_solve_corridor() {
        let outcome = run("#@ E#", options());
        assert_eq!(moves(&outcome.solutions), vec!["dd"]);
        assert_eq!(outcome.solutions[0].length, 2);
        assert_eq!(outcome.stats.termination, Termination::Exhausted);
        assert!(goals::is_winning(&play("#@ E#", "dd")));
    }

    #[test]
    fn test_solve_already_solved() {
        let outcome = run("# + #", options());
        assert_eq!(moves(&outcome.solutions), vec![""]);
        assert_eq!(outcome.stats.nodes_expanded, 0);
    }

    #[test]
    fn test_solve_plate_level() {
        let outcome = run(PLATE_LEVEL, options());

        // Ride the box onto the plate, then fly back to the exit
        assert_eq!(moves(&outcome.solutions), vec!["dda"]);
        assert!(goals::is_winning(&play(PLATE_LEVEL, "dda")));

        // Riding one cell further leaves the box beyond the plate for good
        assert_eq!(moves(&outcome.dead_ends), vec!["ddd"]);
        assert_eq!(outcome.stats.raw_dead_ends, 1);
        assert_eq!(outcome.stats.nodes_expanded, 9);
        assert_eq!(outcome.stats.termination, Termination::Exhausted);
    }

    #[test]
    fn test_max_nodes_one() {
        let outcome = run(
            PLATE_LEVEL,
            SolverOptions {
                max_nodes: 1,
                ..options()
            },
        );
        assert!(outcome.solutions.is_empty());
        assert!(outcome.dead_ends.is_empty());
        assert_eq!(outcome.stats.nodes_expanded, 1);
        assert_eq!(outcome.stats.termination, Termination::NodeBudget);
    }

    #[test]
    fn test_max_solutions() {
        let level = "#####\n\
                     #E  #\n\
                     # @ #\n\
                     #  E#\n\
                     #####";
        let outcome = run(
            level,
            SolverOptions {
                max_solutions: 1,
                ..options()
            },
        );
        assert_eq!(outcome.stats.raw_solutions, 1);
        assert_eq!(outcome.stats.termination, Termination::SolutionBudget);
    }

    #[test]
    fn test_max_depth() {
        let outcome = run(
            "#@  E#",
            SolverOptions {
                max_depth: 2,
                ..options()
            },
        );
        assert!(outcome.solutions.is_empty());
        assert_eq!(outcome.stats.termination, Termination::DepthLimit);
        // The depth-2 state is visited but never expanded
        assert_eq!(outcome.graph.processed.len(), 2);
        assert_eq!(outcome.stats.states_visited, 3);
    }

    #[test]
    fn test_unsolvable_is_exhausted_not_depth_limited() {
        let outcome = run("#@#E#", options());
        assert!(outcome.solutions.is_empty());
        assert_eq!(outcome.stats.nodes_expanded, 1);
        assert_eq!(outcome.stats.termination, Termination::Exhausted);

        // A deep enough limit is never reached
        let outcome = run(
            "#@  E#",
            SolverOptions {
                max_depth: 3,
                ..options()
            },
        );
        assert_eq!(moves(&outcome.solutions), vec!["ddd"]);
        assert_eq!(outcome.stats.termination, Termination::Exhausted);
    }

    #[test]
    fn test_bfs_minimality() {
        let level = "#######\n\
                     #@    #\n\
                     # ##  #\n\
                     #    E#\n\
                     #######";
        let outcome = run(level, options());
        assert!(!outcome.solutions.is_empty());
        let shortest = outcome.solutions[0].length;
        assert_eq!(shortest, 6);
        for solution in &outcome.solutions {
            assert!(solution.length >= shortest);
            assert!(goals::is_winning(&play(level, &solution.moves)));
        }
    }

    #[test]
    fn test_dead_ends_have_no_solvable_successor() {
        for level in [PLATE_LEVEL, "#E@$_  #", "#E_$@  $ #"] {
            let outcome = run(level, options());
            let width = State::from_text(level).unwrap().width() as usize;
            let zobrist = Zobrist::new(width, 1, 1);
            for dead_end in &outcome.dead_ends {
                let state = play(level, &dead_end.moves);
                assert!(!goals::is_winning(&state));
                assert!(!goals::is_losing(&state));
                for dir in ALL_DIRECTIONS {
                    let next = transition(&state, dir);
                    if next.changed {
                        let fingerprint = zobrist.fingerprint(&next.state);
                        assert!(
                            !outcome.graph.is_solvable(fingerprint),
                            "dead end {:?} reaches a solvable state",
                            dead_end.moves
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_losing_edges_are_recorded_not_expanded() {
        let outcome = run("#o@ E#", options());
        assert_eq!(moves(&outcome.solutions), vec!["dd"]);

        let losing: Vec<&Edge> = outcome.graph.edges.iter().filter(|e| e.losing).collect();
        assert_eq!(losing.len(), 1);
        assert_eq!(losing[0].direction, Direction::Left);
        assert_eq!(losing[0].parent, outcome.graph.start);
        assert!(!outcome.graph.processed.contains(&losing[0].child));
        assert_eq!(outcome.graph.successors(losing[0].parent).len(), 1);
        assert!(outcome.dead_ends.is_empty());
    }

    #[test]
    fn test_graph_solvable_set() {
        let outcome = run(PLATE_LEVEL, options());
        let graph = &outcome.graph;
        assert!(graph.is_solvable(graph.start));
        assert_eq!(graph.goals.len(), 1);
        assert_eq!(
            graph.solvable,
            graph.reverse_reachable(graph.goals.iter().copied())
        );
        assert_eq!(graph.depths[&graph.start], 0);
    }

    #[test]
    fn test_cancel_before_start() {
        let state = State::from_text(PLATE_LEVEL).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome = solve(&state, options(), cancel, &mut Silent);
        assert_eq!(outcome.stats.termination, Termination::Cancelled);
        assert_eq!(outcome.stats.nodes_expanded, 0);
        assert!(outcome.cancel.is_cancelled());
    }

    #[test]
    fn test_cancel_at_yield_point() {
        let state = State::from_text(PLATE_LEVEL).unwrap();
        let cancel = CancelToken::new();
        let handle = cancel.clone();
        let mut reports = Vec::new();
        let mut progress = |status: &str| {
            reports.push(status.to_string());
            handle.cancel();
        };
        let outcome = solve(
            &state,
            SolverOptions {
                yield_every: 3,
                ..options()
            },
            cancel,
            &mut progress,
        );
        assert_eq!(outcome.stats.termination, Termination::Cancelled);
        assert_eq!(outcome.stats.nodes_expanded, 3);
        assert_eq!(
            reports,
            vec![
                "Searching... nodes:3, queue:1, solutions:0".to_string(),
                "Done. nodes expanded: 3, solutions: 0, dead ends: 0".to_string(),
            ]
        );
    }

    #[test]
    fn test_step_is_resumable() {
        let state = State::from_text(PLATE_LEVEL).unwrap();
        let mut solver = Solver::new(
            &state,
            SolverOptions {
                yield_every: 2,
                ..options()
            },
            CancelToken::new(),
        );
        assert_eq!(solver.step(), None);
        assert_eq!(solver.nodes_expanded(), 2);
        assert_eq!(solver.step(), None);
        assert_eq!(solver.nodes_expanded(), 4);

        let mut result = None;
        while result.is_none() {
            result = solver.step();
        }
        assert_eq!(result, Some(Termination::Exhausted));
        assert_eq!(solver.nodes_expanded(), 9);
        assert_eq!(solver.step(), Some(Termination::Exhausted));

        let outcome = solver.finish();
        assert_eq!(moves(&outcome.solutions), vec!["dda"]);
    }

    #[test]
    fn test_outcome_serializes() {
        let outcome = run("#@ E#", options());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["solutions"][0]["moves"], "dd");
        assert_eq!(json["stats"]["nodesExpanded"], 2);
        assert_eq!(json["stats"]["termination"], "exhausted");
        assert_eq!(json["graph"]["edges"][0]["move"], "d");

        let start = outcome.graph.start.to_string();
        assert_eq!(json["graph"]["start"], start.as_str());
        assert_eq!(json["graph"]["edges"][0]["parent"], start.as_str());
        assert!(json["graph"]["goals"][0].is_string());
        assert!(json["graph"]["adjacency"][start.as_str()][0].is_string());
    }
}
