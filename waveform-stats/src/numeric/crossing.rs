use crate::Real;
use itertools::Itertools;

/// Interpolated index of the first rising crossing of `level`, scanning
/// sample pairs forward from `from`. A pair counts when the earlier sample
/// is strictly below the later one and `level` lies between them; plateaus
/// never count. `None` when no such pair exists.
pub fn find_rising(samples: &[Real], from: usize, level: Real) -> Option<Real> {
    samples
        .iter()
        .enumerate()
        .tuple_windows()
        .skip(from)
        .find_map(|((below, &lower), (_, &upper))| {
            (lower < upper && lower <= level && level <= upper)
                .then(|| below as Real + (level - lower) / (upper - lower))
        })
}

/// Mirror image of [`find_rising`]: the earlier sample must be strictly
/// above the later one, with `level` between them.
pub fn find_falling(samples: &[Real], from: usize, level: Real) -> Option<Real> {
    samples
        .iter()
        .enumerate()
        .tuple_windows()
        .skip(from)
        .find_map(|((above, &upper), (_, &lower))| {
            (upper > lower && lower <= level && level <= upper)
                .then(|| above as Real + (upper - level) / (upper - lower))
        })
}
