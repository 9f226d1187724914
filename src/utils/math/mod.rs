use std::iter::Sum;

use num::Float;

/// Euclidean norm of `values`
#[inline]
pub fn l2_norm<N, I>(values: I) -> N
where
    N: Float + Sum,
    I: IntoIterator<Item = N>,
{
    values.into_iter().map(|v| v * v).sum::<N>().sqrt()
}

/// `numerator / denominator`, or zero when the denominator is zero or not finite.
/// Zero norms come from empty queries and parks without known terms.
#[inline]
pub fn safe_div<N: Float>(numerator: N, denominator: N) -> N {
    if denominator == N::zero() || !denominator.is_finite() {
        return N::zero();
    }
    numerator / denominator
}
