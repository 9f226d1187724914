use std::cmp::Ordering;

/// Indices of `values` ordered by value, descending.
/// Stable: equal values keep ascending index order. NaN sorts last.
pub fn argsort_desc(values: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| cmp_desc(values[a], values[b]));
    indices
}

/// Index of the first maximum, `None` when empty.
/// NaN never wins.
pub fn argmax_first(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some(b) if values[b] >= value => {}
            _ => best = Some(idx),
        }
    }
    best.or(if values.is_empty() { None } else { Some(0) })
}

/// Descending comparator placing NaN after every number
#[inline]
pub fn cmp_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argsort_handles_empty_and_single() {
        assert!(argsort_desc(&[]).is_empty());
        assert_eq!(argsort_desc(&[0.3]), vec![0]);
    }

    #[test]
    fn argsort_is_stable_on_ties() {
        let values = [0.5, 0.9, 0.5, 0.9, 0.1];
        assert_eq!(argsort_desc(&values), vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn argsort_puts_nan_last() {
        let values = [f64::NAN, -1.0, 2.0];
        assert_eq!(argsort_desc(&values), vec![2, 1, 0]);
    }

    #[test]
    fn argmax_prefers_first_maximum() {
        assert_eq!(argmax_first(&[]), None);
        assert_eq!(argmax_first(&[0.0, 0.0, 0.0]), Some(0));
        assert_eq!(argmax_first(&[0.1, 0.7, 0.7]), Some(1));
        assert_eq!(argmax_first(&[f64::NAN, 0.2]), Some(1));
        assert_eq!(argmax_first(&[f64::NAN]), Some(0));
    }

    #[test]
    fn zero_signs_compare_equal() {
        assert_eq!(cmp_desc(0.0, -0.0), Ordering::Equal);
    }
}
