use super::types::Strengths;

pub fn calculate_max_change(old_strengths: &Strengths, new_strengths: &Strengths) -> f64 {
    old_strengths
        .iter()
        .zip(new_strengths.iter())
        .map(|(old, new)| compute_change(*old, *new))
        .fold(0.0, f64::max)
}

fn compute_change(old_val: f64, new_val: f64) -> f64 {
    (new_val - old_val).abs()
}

pub fn should_continue(iteration: usize, max_iterations: usize) -> bool {
    iteration < max_iterations
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_max_change_is_largest_absolute_difference() {
        let old = array![1.0, 2.0, 3.0];
        let new = array![1.5, 1.0, 3.0];

        assert_eq!(calculate_max_change(&old, &new), 1.0);
    }

    #[test]
    fn test_should_continue_until_budget() {
        assert!(should_continue(0, 1));
        assert!(!should_continue(1, 1));
    }
}
