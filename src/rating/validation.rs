use super::types::ItemId;
use crate::errors::ModelError;

pub fn validate_ranking(ranking: &[ItemId], n_items: usize) -> Result<(), ModelError> {
    if ranking.len() > n_items {
        return Err(ModelError::invalid(format!(
            "Ranking has {} entries but there are only {} items",
            ranking.len(),
            n_items
        )));
    }

    let mut seen = vec![false; n_items];
    for &item in ranking {
        if item >= n_items {
            return Err(ModelError::invalid(format!(
                "Item {} out of range (n_items = {})",
                item, n_items
            )));
        }
        if seen[item] {
            return Err(ModelError::invalid(format!(
                "Item {} appears more than once in ranking",
                item
            )));
        }
        seen[item] = true;
    }

    Ok(())
}

pub fn validate_rankings<R: AsRef<[ItemId]>>(
    rankings: &[R],
    n_items: usize,
) -> Result<(), ModelError> {
    rankings
        .iter()
        .try_for_each(|ranking| validate_ranking(ranking.as_ref(), n_items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_partial_and_empty_rankings() {
        assert!(validate_ranking(&[2, 0], 3).is_ok());
        assert!(validate_ranking(&[], 3).is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_item() {
        let err = validate_ranking(&[0, 3], 3).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = validate_rankings(&[vec![0, 1], vec![1, 1]], 3).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArgument(_)));
    }
}
