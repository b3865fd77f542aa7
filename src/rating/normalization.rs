use super::types::Strengths;

/// Rescale the active entries so the whole vector sums to `total`.
///
/// Inactive entries are left untouched and their mass is subtracted from the
/// target, so items without data keep their current value. When the inactive
/// entries alone already reach `total`, every entry is scaled instead so all
/// of them stay positive.
pub fn rescale_to_total(strengths: &mut Strengths, active: &[bool], total: f64) {
    let fixed_mass = sum_where(strengths, active, false);
    let active_mass = sum_where(strengths, active, true);

    if active_mass <= 0.0 {
        return;
    }

    let target = total - fixed_mass;
    if target > 0.0 {
        apply_scale(strengths, active, target / active_mass);
    } else {
        strengths.mapv_inplace(|s| s * total / (fixed_mass + active_mass));
    }
}

fn sum_where(strengths: &Strengths, active: &[bool], wanted: bool) -> f64 {
    strengths
        .iter()
        .zip(active)
        .filter(|&(_, &is_active)| is_active == wanted)
        .map(|(&s, _)| s)
        .sum()
}

fn apply_scale(strengths: &mut Strengths, active: &[bool], factor: f64) {
    for (s, &is_active) in strengths.iter_mut().zip(active) {
        if is_active {
            *s *= factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_rescale_all_active() {
        let mut strengths = array![2.0, 6.0, 4.0];
        rescale_to_total(&mut strengths, &[true, true, true], 3.0);

        assert!((strengths.sum() - 3.0).abs() < 1e-12);
        assert!((strengths[1] / strengths[0] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_inactive_entries_are_kept() {
        let mut strengths = array![4.0, 4.0, 1.0];
        rescale_to_total(&mut strengths, &[true, true, false], 3.0);

        assert_eq!(strengths[2], 1.0);
        assert!((strengths[0] - 1.0).abs() < 1e-12);
        assert!((strengths[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_heavy_inactive_entries_scale_everything() {
        let mut strengths = array![0.2, 0.1, 10.0];
        rescale_to_total(&mut strengths, &[true, true, false], 3.0);

        assert!(strengths.iter().all(|&s| s > 0.0));
        assert!((strengths.sum() - 3.0).abs() < 1e-12);
        assert!((strengths[0] / strengths[1] - 2.0).abs() < 1e-12);
    }
}
