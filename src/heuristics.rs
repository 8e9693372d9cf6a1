use crate::engine::{Collection, Item};
use std::collections::HashMap;

/// Counts adjacent positions in `items` that hold different colors.
///
/// Every such boundary needs at least one pour to separate, so this is a lower
/// bound on the moves needed to sort a single container.
///
/// # Examples
/// ```
/// use bottle_sort_solver::engine::Item;
/// use bottle_sort_solver::heuristics::count_color_transitions;
/// let items: Vec<Item> = "RGGB".chars().map(Item::from).collect();
/// assert_eq!(count_color_transitions(&items), 2);
/// ```
pub fn count_color_transitions(items: &[Item]) -> usize {
    items.windows(2).filter(|pair| pair[0] != pair[1]).count()
}

/// Penalty for colors that sit at the bottom of several containers.
///
/// If a color is the bottom item of `k > 1` containers, at least `k - 1` of
/// those bottoms must be moved before the color can end up in one container.
pub fn bottom_color_penalty(collection: &Collection) -> usize {
    let mut bottoms: HashMap<&Item, usize> = HashMap::new();
    for container in collection.containers() {
        if let Some(bottom) = container.items().first() {
            *bottoms.entry(bottom).or_insert(0) += 1;
        }
    }
    bottoms.values().map(|&count| count - 1).sum()
}

/// Lower-bound estimate of the moves left to solve `collection`.
///
/// The sum of every container's color transitions plus the
/// `bottom_color_penalty`. Zero for a solved collection.
pub fn min_required_moves(collection: &Collection) -> usize {
    let transitions: usize = collection
        .containers()
        .iter()
        .map(|container| count_color_transitions(container.items()))
        .sum();
    transitions + bottom_color_penalty(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::collection_from_str_array;

    #[test]
    fn test_count_color_transitions() {
        let items = |s: &str| s.chars().map(Item::from).collect::<Vec<_>>();
        assert_eq!(count_color_transitions(&items("")), 0);
        assert_eq!(count_color_transitions(&items("R")), 0);
        assert_eq!(count_color_transitions(&items("RRR")), 0);
        assert_eq!(count_color_transitions(&items("RGR")), 2);
        assert_eq!(count_color_transitions(&items("RGBY")), 3);
    }

    #[test]
    fn test_bottom_color_penalty() {
        let collection = collection_from_str_array(&["RG", "RB", "R.", "G.", "."], 2).unwrap();
        assert_eq!(bottom_color_penalty(&collection), 2, "three red bottoms");

        let distinct = collection_from_str_array(&["RG", "GR", "."], 2).unwrap();
        assert_eq!(bottom_color_penalty(&distinct), 0);
    }

    #[test]
    fn test_min_required_moves_combines_both_terms() {
        let collection = collection_from_str_array(&["RGB", "GGR", "R..", "..."], 3).unwrap();
        // transitions: 2 + 1 + 0, red bottoms: 2 -> +1
        assert_eq!(min_required_moves(&collection), 4);
        assert_eq!(collection.min_required_moves(), 4);
    }

    #[test]
    fn test_min_required_moves_zero_when_solved() {
        let solved = collection_from_str_array(&["GGG", "...", "RRR"], 3).unwrap();
        assert!(solved.is_solved());
        assert_eq!(min_required_moves(&solved), 0);

        let empty = collection_from_str_array(&[".", "."], 3).unwrap();
        assert_eq!(min_required_moves(&empty), 0);
    }

    #[test]
    fn test_min_required_moves_bounded_by_item_count() {
        for seed in 0..5 {
            let mut current = Collection::new_random_with_seed(3, 4, 2, seed).unwrap();
            for _ in 0..8 {
                let h = min_required_moves(&current);
                assert!(h <= current.total_items());
                let Some(mv) = current.legal_moves().first().copied() else {
                    break;
                };
                current = current.after(&mv).unwrap();
            }
        }
    }
}
