use std::cmp::Ordering;

use super::types::{ItemId, Strengths};

/// Item ids by descending strength, ties broken by ascending id.
pub fn rank_by_strength(strengths: &Strengths) -> Vec<ItemId> {
    let mut items: Vec<ItemId> = (0..strengths.len()).collect();
    items.sort_by(|&a, &b| compare_items(strengths, a, b));
    items
}

pub fn top_k_by_strength(strengths: &Strengths, k: usize) -> Vec<ItemId> {
    let mut ranked = rank_by_strength(strengths);
    ranked.truncate(k);
    ranked
}

fn compare_items(strengths: &Strengths, a: ItemId, b: ItemId) -> Ordering {
    strengths[b]
        .total_cmp(&strengths[a])
        .then_with(|| a.cmp(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_descending_order() {
        let strengths = array![0.2, 1.9, 0.9];
        assert_eq!(rank_by_strength(&strengths), vec![1, 2, 0]);
    }

    #[test]
    fn test_ties_use_ascending_id() {
        let strengths = array![1.0, 2.0, 1.0, 2.0];
        assert_eq!(rank_by_strength(&strengths), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_top_k_is_prefix() {
        let strengths = array![0.5, 0.1, 2.0, 0.4];
        let ranked = rank_by_strength(&strengths);

        for k in 0..=strengths.len() {
            assert_eq!(top_k_by_strength(&strengths, k), ranked[..k].to_vec());
        }
    }
}
