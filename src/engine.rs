//! Core puzzle model for the bottle sorting puzzle.
//!
//! This module defines the game's fundamental components:
//! - `Item`: A colored token identified by its label.
//! - `Container`: A capacity-bounded stack of items with the pour mechanic.
//! - `Move`: A pour from one container index to another.
//! - `Collection`: The full puzzle state. It is an immutable value: applying a
//!   move always produces a new `Collection`, which is what lets the legal move
//!   list and the canonical key be cached safely.
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::cell::OnceCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{BuildError, MoveError};
use crate::heuristics;

/// A colored item. Two items are equal when their labels are equal.
///
/// # Examples
///
/// ```
/// use bottle_sort_solver::engine::Item;
/// assert_eq!(Item::new("red"), Item::from("red"));
/// assert_ne!(Item::new("red"), Item::new("blue"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item(Arc<str>);

impl Item {
    /// Creates an item with the given color label.
    pub fn new(label: &str) -> Self {
        Item(Arc::from(label))
    }

    /// Returns the color label of this item.
    pub fn label(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Item {
    fn from(label: &str) -> Self {
        Item::new(label)
    }
}

impl From<char> for Item {
    fn from(label: char) -> Self {
        Item::new(label.encode_utf8(&mut [0; 4]))
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A capacity-bounded stack of items. Index 0 is the bottom, the last item is the head.
///
/// The number of items matching the head (`matching_head_run`) is kept up to date
/// by every mutation so pours never need to rescan the whole stack.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Container {
    items: Vec<Item>,
    capacity: usize,
    matching_head_run: usize,
}

impl Container {
    /// Creates an empty container.
    ///
    /// # Errors
    /// Returns `BuildError::ZeroCapacity` if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, BuildError> {
        Container::with_items(Vec::new(), capacity)
    }

    /// Creates a container holding `items`, bottom first.
    ///
    /// Items beyond `capacity` are dropped from the top and a warning is logged.
    ///
    /// # Errors
    /// Returns `BuildError::ZeroCapacity` if `capacity` is 0.
    pub fn with_items(mut items: Vec<Item>, capacity: usize) -> Result<Self, BuildError> {
        if capacity == 0 {
            return Err(BuildError::ZeroCapacity);
        }
        if items.len() > capacity {
            log::warn!(
                "container holds {} items but has capacity {}, truncating",
                items.len(),
                capacity
            );
            items.truncate(capacity);
        }
        let mut container = Container {
            items,
            capacity,
            matching_head_run: 0,
        };
        container.recount_head_run();
        Ok(container)
    }

    /// Creates a container from color labels, bottom first.
    ///
    /// # Errors
    /// Returns `BuildError::ZeroCapacity` for a zero capacity and
    /// `BuildError::EmptyLabel` if any label is blank.
    ///
    /// # Examples
    /// ```
    /// use bottle_sort_solver::engine::Container;
    /// let container = Container::from_labels(&["R", "G", "G"], 4).unwrap();
    /// assert_eq!(container.len(), 3);
    /// assert_eq!(container.matching_head_run(), 2);
    /// assert_eq!(container.to_string(), "[RGG ]");
    /// ```
    pub fn from_labels<S: AsRef<str>>(labels: &[S], capacity: usize) -> Result<Self, BuildError> {
        let mut items = Vec::with_capacity(labels.len());
        for (position, label) in labels.iter().enumerate() {
            let label = label.as_ref().trim();
            if label.is_empty() {
                return Err(BuildError::EmptyLabel {
                    container: 0,
                    position,
                });
            }
            items.push(Item::new(label));
        }
        Container::with_items(items, capacity)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of items that can still be added.
    pub fn free_space(&self) -> usize {
        self.capacity.saturating_sub(self.items.len())
    }

    /// The items of this container, bottom first.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Iterates over the items starting from the head.
    pub fn iter_top_down(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().rev()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// The top-most item, or `None` if the container is empty.
    pub fn head(&self) -> Option<&Item> {
        self.items.last()
    }

    /// Count of consecutive items from the top that match the head.
    /// Zero for an empty container, otherwise at least one.
    pub fn matching_head_run(&self) -> usize {
        self.matching_head_run
    }

    /// Returns `true` if every item has the same color (vacuously true when empty).
    pub fn is_unique(&self) -> bool {
        self.matching_head_run == self.items.len()
    }

    /// Returns `true` if the container is empty or full of a single color.
    pub fn is_solved(&self) -> bool {
        self.is_empty() || (self.is_unique() && self.is_full())
    }

    /// Checks whether `item` could be placed on this container.
    pub fn test(&self, item: &Item) -> bool {
        if self.is_full() {
            return false;
        }
        match self.head() {
            None => true,
            Some(head) => head == item,
        }
    }

    /// Adds `item` on top of the container. Returns `false` and leaves the
    /// container untouched if `test(item)` fails.
    pub fn add(&mut self, item: Item) -> bool {
        if !self.test(&item) {
            return false;
        }
        self.items.push(item);
        self.matching_head_run += 1;
        true
    }

    /// Pours the run of head-colored items onto `target`.
    ///
    /// Items are moved one at a time until the run is exhausted or `target` is
    /// full, so a run may only be partially transferred.
    ///
    /// # Returns
    /// `true` if at least one item was moved.
    pub fn pour(&mut self, target: &mut Container) -> bool {
        let head = match self.head() {
            Some(head) => head.clone(),
            None => return false,
        };
        if !target.test(&head) {
            return false;
        }

        let mut moved = 0;
        while !target.is_full() && self.head() == Some(&head) {
            let Some(item) = self.items.pop() else {
                break;
            };
            self.matching_head_run -= 1;
            let added = target.add(item);
            debug_assert!(added, "target accepted the head color");
            moved += 1;
        }

        // The whole run left, so a new head color is exposed.
        if self.matching_head_run == 0 && !self.is_empty() {
            self.recount_head_run();
        }
        moved > 0
    }

    /// Lower bound on the moves needed to sort this container: the number of
    /// adjacent positions holding different colors.
    pub fn min_required_moves(&self) -> usize {
        heuristics::count_color_transitions(&self.items)
    }

    fn recount_head_run(&mut self) {
        self.matching_head_run = match self.items.last() {
            None => 0,
            Some(head) => self
                .items
                .iter()
                .rev()
                .take_while(|item| *item == head)
                .count(),
        };
    }
}

impl fmt::Display for Container {
    /// Formats as `[` + labels bottom to top + padding up to capacity + `]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for item in &self.items {
            write!(f, "{}", item)?;
        }
        for _ in 0..self.free_space() {
            f.write_str(" ")?;
        }
        f.write_str("]")
    }
}

/// A pour from container `src` to container `dest`.
///
/// `score` is only an annotation (the path score at which the best-first
/// search committed the move); two moves are equal when `src` and `dest` match.
#[derive(Clone, Copy, Debug)]
pub struct Move {
    pub src: usize,
    pub dest: usize,
    pub score: Option<usize>,
}

impl Move {
    pub fn new(src: usize, dest: usize) -> Self {
        Move {
            src,
            dest,
            score: None,
        }
    }

    /// Returns this move annotated with `score`.
    pub fn with_score(self, score: usize) -> Self {
        Move {
            score: Some(score),
            ..self
        }
    }

    /// The move that undoes this one, `(dest, src)`, without a score.
    pub fn reverse(&self) -> Self {
        Move::new(self.dest, self.src)
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.src == other.src && self.dest == other.dest
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.src.hash(state);
        self.dest.hash(state);
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.score {
            Some(score) => write!(f, "({}, {}, {})", self.src, self.dest, score),
            None => write!(f, "({}, {})", self.src, self.dest),
        }
    }
}

/// The full puzzle state: an ordered, fixed-size list of containers.
///
/// Equality and hashing ignore container order: two collections holding the
/// same multiset of container contents are the same puzzle state.
#[derive(Clone, Debug)]
pub struct Collection {
    containers: Vec<Container>,
    canonical: Vec<Vec<Item>>,
    legal_moves: OnceCell<Vec<Move>>,
}

impl Collection {
    /// Creates a collection from already-built containers.
    pub fn new(containers: Vec<Container>) -> Self {
        let mut canonical: Vec<Vec<Item>> =
            containers.iter().map(|c| c.items().to_vec()).collect();
        canonical.sort_unstable();
        Collection {
            containers,
            canonical,
            legal_moves: OnceCell::new(),
        }
    }

    /// Creates a collection from rows of color labels, each row bottom first,
    /// with every container sharing `capacity`.
    ///
    /// # Errors
    /// Returns a `BuildError` naming the offending container if any row is invalid.
    ///
    /// # Examples
    /// ```
    /// use bottle_sort_solver::engine::Collection;
    /// let collection = Collection::from_labels(&[vec!["R", "G"], vec!["G", "R"], vec![]], 2).unwrap();
    /// assert_eq!(collection.len(), 3);
    /// assert!(!collection.is_solved());
    /// ```
    pub fn from_labels<S: AsRef<str>>(rows: &[Vec<S>], capacity: usize) -> Result<Self, BuildError> {
        let containers = rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                Container::from_labels(row.as_slice(), capacity).map_err(|e| e.in_container(index))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Collection::new(containers))
    }

    /// Creates a shuffled puzzle with `colors` full containers followed by
    /// `empty` empty containers, reproducible for a given `seed`.
    ///
    /// Colors are labelled `A`..`Z`, then `C26`, `C27`, ...
    ///
    /// # Errors
    /// Returns a `BuildError` if `capacity` or `colors` is 0.
    pub fn new_random_with_seed(
        colors: usize,
        capacity: usize,
        empty: usize,
        seed: u64,
    ) -> Result<Self, BuildError> {
        if capacity == 0 {
            return Err(BuildError::ZeroCapacity);
        }
        if colors == 0 {
            return Err(BuildError::Generation(
                "at least one color is required".to_string(),
            ));
        }

        let mut pool: Vec<Item> = (0..colors)
            .flat_map(|color| std::iter::repeat(Item::new(&color_label(color))).take(capacity))
            .collect();
        let mut rng = SmallRng::seed_from_u64(seed);
        pool.shuffle(&mut rng);

        let mut containers = Vec::with_capacity(colors + empty);
        for chunk in pool.chunks(capacity) {
            containers.push(Container::with_items(chunk.to_vec(), capacity)?);
        }
        for _ in 0..empty {
            containers.push(Container::new(capacity)?);
        }
        Ok(Collection::new(containers))
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    /// Returns the container at `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<&Container> {
        self.containers.get(index)
    }

    /// Number of containers.
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Total number of items across all containers.
    pub fn total_items(&self) -> usize {
        self.containers.iter().map(Container::len).sum()
    }

    /// Returns `true` if every container is solved.
    pub fn is_solved(&self) -> bool {
        self.containers.iter().all(Container::is_solved)
    }

    /// Lower bound on the moves left to solve this collection.
    /// See `heuristics::min_required_moves`.
    pub fn min_required_moves(&self) -> usize {
        heuristics::min_required_moves(self)
    }

    /// All moves worth exploring from this state, computed once and cached.
    ///
    /// Sources that are solved, empty, or already uniform with more than two
    /// items are skipped. Only the first empty destination is offered per
    /// source, since pouring into any empty container leads to the same state.
    pub fn legal_moves(&self) -> &[Move] {
        self.legal_moves.get_or_init(|| self.generate_moves())
    }

    fn generate_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for (x, source) in self.containers.iter().enumerate() {
            if source.is_solved()
                || source.is_empty()
                || (source.is_unique() && source.len() > 2)
            {
                continue;
            }
            let mut used_empty = false;
            for (y, dest) in self.containers.iter().enumerate() {
                if x == y {
                    continue;
                }
                let candidate = Move::new(x, y);
                if !self.is_valid(&candidate) {
                    continue;
                }
                if dest.is_empty() {
                    if used_empty {
                        continue;
                    }
                    used_empty = true;
                }
                moves.push(candidate);
            }
        }
        moves
    }

    /// Checks whether `mv` would pour the source's whole head run into the destination.
    ///
    /// Pouring a uniform container into an empty one is never valid since it
    /// makes no progress.
    pub fn is_valid(&self, mv: &Move) -> bool {
        if mv.src == mv.dest {
            return false;
        }
        let (Some(src), Some(dest)) = (self.get(mv.src), self.get(mv.dest)) else {
            return false;
        };
        if dest.is_full() || src.is_empty() {
            return false;
        }
        if src.is_unique() && dest.is_empty() {
            return false;
        }
        match src.head() {
            Some(head) => dest.test(head) && src.matching_head_run() <= dest.free_space(),
            None => false,
        }
    }

    /// Returns a new collection with `mv` applied. `self` is left untouched.
    ///
    /// # Errors
    /// Returns `MoveError::Invalid` carrying the move if `is_valid(mv)` fails.
    ///
    /// # Examples
    /// ```
    /// use bottle_sort_solver::engine::{Collection, Move};
    /// let start = Collection::from_labels(&[vec!["R", "G"], vec!["R"]], 2).unwrap();
    /// let next = start.after(&Move::new(0, 1)).unwrap_err();
    /// assert_eq!(next.to_string(), "invalid move (0, 1)");
    /// ```
    pub fn after(&self, mv: &Move) -> Result<Collection, MoveError> {
        if !self.is_valid(mv) {
            return Err(MoveError::Invalid(*mv));
        }
        Ok(self.apply(mv))
    }

    /// Applies a move already known to be valid, such as one from `legal_moves`.
    pub(crate) fn apply(&self, mv: &Move) -> Collection {
        let mut containers = self.containers.clone();
        if let Some((src, dest)) = pair_mut(&mut containers, mv.src, mv.dest) {
            src.pour(dest);
        }
        Collection::new(containers)
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Collection {}

impl Hash for Collection {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for Collection {
    /// One line per container, prefixed by its right-aligned index.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, container) in self.containers.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{:>2}: {}", index, container)?;
        }
        Ok(())
    }
}

fn color_label(color: usize) -> String {
    if color < 26 {
        char::from(b'A' + color as u8).to_string()
    } else {
        format!("C{}", color)
    }
}

fn pair_mut<T>(slice: &mut [T], a: usize, b: usize) -> Option<(&mut T, &mut T)> {
    if a == b || a >= slice.len() || b >= slice.len() {
        return None;
    }
    if a < b {
        let (left, right) = slice.split_at_mut(b);
        Some((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = slice.split_at_mut(a);
        Some((&mut right[0], &mut left[b]))
    }
}
