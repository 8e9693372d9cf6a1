//! Search strategies over `Collection` states.
//!
//! - `solve_dfs`: exhaustive depth-first search. Returns the first solution found.
//! - `solve_astar`: best-first search ordered by `f = g + h`, where `g` is the
//!   number of moves so far and `h` is `Collection::min_required_moves`.
//!
//! Both searches deduplicate states by the canonical (order independent)
//! equality of `Collection`, and both accept `SearchLimits` so callers can
//! bound the work done on large puzzles.
use crate::engine::{Collection, Move};
use crate::error::ParseAlgorithmError;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

/// Number of expansions between progress log lines.
const PROGRESS_INTERVAL: usize = 100_000;

/// The search strategy to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Exhaustive depth-first search.
    Dfs,
    /// Heuristic best-first (A*-style) search.
    AStar,
}

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;

    /// Parses `dfs`, `a*` or `astar`, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dfs" => Ok(Algorithm::Dfs),
            "a*" | "astar" | "a-star" => Ok(Algorithm::AStar),
            _ => Err(ParseAlgorithmError(s.trim().to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Dfs => f.write_str("Depth-First Search"),
            Algorithm::AStar => f.write_str("A* Search"),
        }
    }
}

/// Resource bounds checked once per expanded state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Stop after expanding this many states.
    pub max_expansions: Option<usize>,
    /// Stop once this instant has passed.
    pub deadline: Option<Instant>,
}

impl SearchLimits {
    /// No node budget and no deadline.
    pub fn unlimited() -> Self {
        SearchLimits::default()
    }

    fn reached(&self, expanded: usize) -> bool {
        self.max_expansions.is_some_and(|max| expanded >= max)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Represents a solution found by a search.
#[derive(Clone, Debug)]
pub struct Solution {
    /// Moves from the starting collection to the solved one. Moves found by
    /// `solve_astar` carry the `f` score at which they were committed.
    pub moves: Vec<Move>,
    /// The solved collection reached by applying `moves`.
    pub collection: Collection,
    /// Number of states expanded before the solution was found.
    pub expanded: usize,
}

/// Result of a search.
#[derive(Clone, Debug)]
pub enum SearchOutcome {
    Solved(Solution),
    /// Every reachable state was explored without finding a solved one.
    Unsolvable { expanded: usize },
    /// A `SearchLimits` bound stopped the search first.
    LimitReached { expanded: usize },
}

impl SearchOutcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SearchOutcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self {
            SearchOutcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }

    /// Number of states expanded by the search.
    pub fn expanded(&self) -> usize {
        match self {
            SearchOutcome::Solved(solution) => solution.expanded,
            SearchOutcome::Unsolvable { expanded } | SearchOutcome::LimitReached { expanded } => {
                *expanded
            }
        }
    }
}

/// Runs `algorithm` on `root` within `limits`.
pub fn solve(root: &Collection, algorithm: Algorithm, limits: &SearchLimits) -> SearchOutcome {
    log::info!("Searching {} containers using {}", root.len(), algorithm);
    let outcome = match algorithm {
        Algorithm::Dfs => solve_dfs_with_limits(root, limits),
        Algorithm::AStar => solve_astar_with_limits(root, limits),
    };
    match &outcome {
        SearchOutcome::Solved(solution) => log::info!(
            "Solved in {} moves after expanding {} states",
            solution.moves.len(),
            solution.expanded
        ),
        SearchOutcome::Unsolvable { expanded } => {
            log::info!("No solution after expanding {} states", expanded)
        }
        SearchOutcome::LimitReached { expanded } => {
            log::warn!("Search limit reached after expanding {} states", expanded)
        }
    }
    outcome
}

/// Solves the puzzle with an unbounded depth-first search.
pub fn solve_dfs(root: &Collection) -> Option<Solution> {
    solve_dfs_with_limits(root, &SearchLimits::unlimited()).into_solution()
}

/// One level of the depth-first path: a state and the index of its next untried move.
struct Frame {
    collection: Collection,
    next_move: usize,
}

/// Depth-first search that returns the first solution found, not necessarily
/// the shortest.
///
/// Moves are tried in `Collection::legal_moves` order and every state is
/// visited at most once. The path is kept on an explicit stack, so deep
/// puzzles cannot overflow the call stack.
pub fn solve_dfs_with_limits(root: &Collection, limits: &SearchLimits) -> SearchOutcome {
    if root.is_solved() {
        return SearchOutcome::Solved(Solution {
            moves: Vec::new(),
            collection: root.clone(),
            expanded: 0,
        });
    }

    let mut visited: HashSet<Collection> = HashSet::new();
    visited.insert(root.clone());
    let mut stack = vec![Frame {
        collection: root.clone(),
        next_move: 0,
    }];
    let mut path: Vec<Move> = Vec::new();
    let mut expanded = 1;

    while let Some(frame) = stack.last_mut() {
        let Some(mv) = frame.collection.legal_moves().get(frame.next_move).copied() else {
            // Backtrack: nothing left to try from this state.
            stack.pop();
            path.pop();
            continue;
        };
        frame.next_move += 1;

        let child = frame.collection.apply(&mv);
        if !visited.insert(child.clone()) {
            continue;
        }
        path.push(mv);

        if child.is_solved() {
            return SearchOutcome::Solved(Solution {
                moves: path,
                collection: child,
                expanded,
            });
        }
        if limits.reached(expanded) {
            return SearchOutcome::LimitReached { expanded };
        }

        expanded += 1;
        if expanded % PROGRESS_INTERVAL == 0 {
            log::debug!(
                "DFS expanded {} states, depth {}, {} visited",
                expanded,
                path.len(),
                visited.len()
            );
        }
        stack.push(Frame {
            collection: child,
            next_move: 0,
        });
    }

    SearchOutcome::Unsolvable { expanded }
}

/// Solves the puzzle with an unbounded best-first search.
pub fn solve_astar(root: &Collection) -> Option<Solution> {
    solve_astar_with_limits(root, &SearchLimits::unlimited()).into_solution()
}

/// Returns `true` if playing `candidate` after `history` would repeat an
/// A→B→A oscillation: the last move is `candidate` reversed and the move
/// before it is `candidate` itself.
///
/// # Examples
/// ```
/// use bottle_sort_solver::engine::Move;
/// use bottle_sort_solver::solver::is_oscillation;
/// let m = Move::new(0, 1);
/// assert!(is_oscillation(&[m, m.reverse()], &m));
/// assert!(!is_oscillation(&[m.reverse()], &m));
/// ```
pub fn is_oscillation(history: &[Move], candidate: &Move) -> bool {
    match history {
        [.., before_last, last] => *last == candidate.reverse() && before_last == candidate,
        _ => false,
    }
}

/// A state discovered by the best-first search.
struct Node {
    collection: Collection,
    moves: Vec<Move>,
    closed: bool,
}

/// Entry in the open set. Entries are never removed eagerly: when a node's
/// path is improved a new entry is pushed and the old one is skipped on pop.
#[derive(Debug, PartialEq, Eq)]
struct OpenEntry {
    score: usize,
    depth: usize,
    seq: usize,
    node: usize,
}

impl Ord for OpenEntry {
    // BinaryHeap pops the greatest entry: lowest score first, then the longest
    // move list, then the earliest pushed.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.depth.cmp(&other.depth))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-first (A*-style) search ordered by `f = g + h`.
///
/// Ties on `f` prefer the longer partial solution, which commits to deep lines
/// before backtracking. A shorter path to a known state replaces the recorded
/// one, and reopens the state if it was already expanded.
pub fn solve_astar_with_limits(root: &Collection, limits: &SearchLimits) -> SearchOutcome {
    let mut nodes = vec![Node {
        collection: root.clone(),
        moves: Vec::new(),
        closed: false,
    }];
    let mut index: HashMap<Collection, usize> = HashMap::new();
    index.insert(root.clone(), 0);

    let mut seq = 0;
    let mut open = BinaryHeap::new();
    open.push(OpenEntry {
        score: root.min_required_moves(),
        depth: 0,
        seq,
        node: 0,
    });
    let mut expanded = 0;

    while let Some(entry) = open.pop() {
        let node = &nodes[entry.node];
        if node.closed || node.moves.len() != entry.depth {
            continue;
        }
        if node.collection.is_solved() {
            return SearchOutcome::Solved(Solution {
                moves: node.moves.clone(),
                collection: node.collection.clone(),
                expanded,
            });
        }
        if node.collection.min_required_moves() == 0 {
            // Every color already sits in a single container without filling
            // it, so no sequence of moves can solve this state.
            nodes[entry.node].closed = true;
            continue;
        }
        if limits.reached(expanded) {
            return SearchOutcome::LimitReached { expanded };
        }

        expanded += 1;
        if expanded % PROGRESS_INTERVAL == 0 {
            log::debug!(
                "A* expanded {} states, f = {}, {} known, {} queued",
                expanded,
                entry.score,
                nodes.len(),
                open.len()
            );
        }

        let children: Vec<(Move, Collection)> = node
            .collection
            .legal_moves()
            .iter()
            .filter(|mv| !is_oscillation(&node.moves, mv))
            .map(|mv| (*mv, node.collection.apply(mv)))
            .collect();
        let parent_moves = node.moves.clone();
        let depth = parent_moves.len() + 1;

        for (mv, child) in children {
            let score = depth + child.min_required_moves();
            let mut moves = parent_moves.clone();
            moves.push(mv.with_score(score));

            let id = match index.get(&child).copied() {
                None => {
                    let id = nodes.len();
                    index.insert(child.clone(), id);
                    nodes.push(Node {
                        collection: child,
                        moves,
                        closed: false,
                    });
                    id
                }
                Some(id) => {
                    let known = &mut nodes[id];
                    if known.moves.len() <= depth {
                        continue;
                    }
                    known.moves = moves;
                    known.closed = false;
                    id
                }
            };
            seq += 1;
            open.push(OpenEntry {
                score,
                depth,
                seq,
                node: id,
            });
        }

        nodes[entry.node].closed = true;
    }

    SearchOutcome::Unsolvable { expanded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::collection_from_str_array;

    /// Applies `moves` to `root` with validation and returns the final collection.
    fn replay(root: &Collection, moves: &[Move]) -> Collection {
        let mut current = root.clone();
        for mv in moves {
            current = current
                .after(mv)
                .unwrap_or_else(|e| panic!("solution contains {e}"));
        }
        current
    }

    fn both(root: &Collection) -> [(Algorithm, Option<Solution>); 2] {
        [
            (Algorithm::Dfs, solve_dfs(root)),
            (Algorithm::AStar, solve_astar(root)),
        ]
    }

    #[test]
    fn test_merges_split_color() {
        let root = collection_from_str_array(&["RR", "R", "."], 3).unwrap();
        let expected = collection_from_str_array(&[".", ".", "RRR"], 3).unwrap();
        for (algorithm, solution) in both(&root) {
            let sol = solution.unwrap_or_else(|| panic!("{algorithm} found no solution"));
            assert_eq!(sol.moves.len(), 1, "{algorithm}");
            assert_eq!(sol.collection, expected, "{algorithm}");
            assert_eq!(replay(&root, &sol.moves), expected);
        }
    }

    #[test]
    fn test_already_solved_returns_no_moves() {
        let root = collection_from_str_array(&["RR"], 2).unwrap();
        for (algorithm, solution) in both(&root) {
            let sol = solution.unwrap_or_else(|| panic!("{algorithm} found no solution"));
            assert!(sol.moves.is_empty(), "{algorithm}");
            assert_eq!(sol.expanded, 0, "{algorithm}");
            assert_eq!(sol.collection, root);
        }
    }

    #[test]
    fn test_unsolvable_terminates() {
        let root = collection_from_str_array(&["RG", "GB", "BR"], 2).unwrap();
        assert!(root.legal_moves().is_empty());
        for (algorithm, solution) in both(&root) {
            assert!(solution.is_none(), "{algorithm} should find no solution");
        }

        let outcome = solve(&root, Algorithm::AStar, &SearchLimits::unlimited());
        assert!(matches!(outcome, SearchOutcome::Unsolvable { .. }));
    }

    #[test]
    fn test_unsolvable_with_moves_terminates() {
        // Two reds cannot fill a container of three.
        let root = collection_from_str_array(&["RG.", "GRG", "..."], 3).unwrap();
        assert!(!root.legal_moves().is_empty());
        for (algorithm, solution) in both(&root) {
            assert!(solution.is_none(), "{algorithm} should find no solution");
        }
    }

    #[test]
    fn test_known_optimum_swap() {
        let root = collection_from_str_array(&["RG", "GR", "."], 2).unwrap();
        let dfs = solve_dfs(&root).expect("dfs solution");
        let astar = solve_astar(&root).expect("astar solution");

        assert_eq!(dfs.moves.len(), 3);
        assert_eq!(astar.moves.len(), 3);
        assert!(astar.moves.len() <= dfs.moves.len());
        assert!(replay(&root, &dfs.moves).is_solved());
        assert!(replay(&root, &astar.moves).is_solved());
        assert_eq!(replay(&root, &astar.moves), astar.collection);

        assert!(dfs.moves.iter().all(|mv| mv.score.is_none()));
        assert!(astar.moves.iter().all(|mv| mv.score.is_some()));
        assert_eq!(astar.moves.last().and_then(|mv| mv.score), Some(3));
    }

    #[test]
    fn test_dfs_follows_legal_move_order() {
        let root = collection_from_str_array(&["RG", "GR", "."], 2).unwrap();
        let dfs = solve_dfs(&root).unwrap();
        assert_eq!(dfs.moves, vec![Move::new(0, 2), Move::new(1, 0), Move::new(1, 2)]);
    }

    #[test]
    fn test_astar_not_longer_on_three_colors() {
        let root = collection_from_str_array(&["RGB", "BRG", "GBR", "...", "..."], 3).unwrap();
        let dfs = solve_dfs(&root).expect("dfs solution");
        let astar = solve_astar(&root).expect("astar solution");
        assert!(replay(&root, &dfs.moves).is_solved());
        assert!(replay(&root, &astar.moves).is_solved());
        assert!(astar.moves.len() <= dfs.moves.len());
    }

    #[test]
    fn test_random_puzzles_agree_on_solvability() {
        for seed in 0..8 {
            let root = Collection::new_random_with_seed(3, 3, 2, seed).unwrap();
            let dfs = solve_dfs(&root);
            let astar = solve_astar(&root);
            assert_eq!(dfs.is_some(), astar.is_some(), "seed {seed}:\n{root}");
            for sol in dfs.iter().chain(astar.iter()) {
                let end = replay(&root, &sol.moves);
                assert!(end.is_solved(), "seed {seed}");
                assert_eq!(end.total_items(), root.total_items());
            }
        }
    }

    #[test]
    fn test_is_oscillation() {
        let m = Move::new(0, 1);
        let other = Move::new(2, 1);
        assert!(is_oscillation(&[m, m.reverse()], &m));
        assert!(is_oscillation(&[other, m, m.reverse()], &m));
        assert!(is_oscillation(&[m.reverse(), m], &m.reverse()));
        assert!(!is_oscillation(&[], &m));
        assert!(!is_oscillation(&[m.reverse()], &m));
        assert!(!is_oscillation(&[other, m.reverse()], &m));
        assert!(!is_oscillation(&[m, m], &m));
    }

    #[test]
    fn test_astar_solutions_contain_no_oscillation() {
        for seed in 0..4 {
            let root = Collection::new_random_with_seed(3, 4, 2, seed).unwrap();
            if let Some(sol) = solve_astar(&root) {
                for window in sol.moves.windows(3) {
                    assert!(
                        !(window[0] == window[2] && window[1] == window[0].reverse()),
                        "seed {seed} oscillates: {:?}",
                        window
                    );
                }
            }
        }
    }

    #[test]
    fn test_expansion_budget() {
        let root = collection_from_str_array(&["RG", "GR", "."], 2).unwrap();
        let limits = SearchLimits {
            max_expansions: Some(1),
            deadline: None,
        };
        for algorithm in [Algorithm::Dfs, Algorithm::AStar] {
            let outcome = solve(&root, algorithm, &limits);
            assert!(
                matches!(outcome, SearchOutcome::LimitReached { expanded: 1 }),
                "{algorithm}: {outcome:?}"
            );
            assert!(outcome.solution().is_none());
        }
    }

    #[test]
    fn test_deadline_in_the_past() {
        let root = collection_from_str_array(&["RG", "GR", "."], 2).unwrap();
        let limits = SearchLimits {
            max_expansions: None,
            deadline: Some(Instant::now()),
        };
        for algorithm in [Algorithm::Dfs, Algorithm::AStar] {
            let outcome = solve(&root, algorithm, &limits);
            assert!(
                matches!(outcome, SearchOutcome::LimitReached { .. }),
                "{algorithm}: {outcome:?}"
            );
        }
    }

    #[test]
    fn test_search_does_not_mutate_root() {
        let root = collection_from_str_array(&["RGB", "BRG", "GBR", "...", "..."], 3).unwrap();
        let before = root.to_string();
        let _ = solve_dfs(&root);
        let _ = solve_astar(&root);
        assert_eq!(root.to_string(), before);
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("dfs".parse::<Algorithm>(), Ok(Algorithm::Dfs));
        assert_eq!(" DFS\n".parse::<Algorithm>(), Ok(Algorithm::Dfs));
        assert_eq!("A*".parse::<Algorithm>(), Ok(Algorithm::AStar));
        assert_eq!("AStar".parse::<Algorithm>(), Ok(Algorithm::AStar));
        assert_eq!(
            "bfs".parse::<Algorithm>(),
            Err(ParseAlgorithmError("bfs".to_string()))
        );
    }

    #[test]
    fn test_outcome_accessors() {
        let root = collection_from_str_array(&["RR", "R", "."], 3).unwrap();
        let outcome = solve(&root, Algorithm::Dfs, &SearchLimits::unlimited());
        assert_eq!(outcome.solution().map(|s| s.moves.len()), Some(1));
        assert_eq!(outcome.expanded(), 1);
        assert!(outcome.into_solution().is_some());
    }
}
