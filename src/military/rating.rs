//! Concentration-of-force rating arithmetic
//!
//! Two forces of equal per-unit strength merged into one group rate
//! proportional to the square of the combined unit count, so ratings add
//! in square-root space:
//!
//! ```text
//! combine(a, b)       = (sqrt(a) + sqrt(b))^2
//! rating_needed(t, c) = (sqrt(t) - sqrt(c))^2   if t > c, else 0
//! ```
//!
//! `rating_needed` is the exact inverse: `combine(c, rating_needed(t, c)) == t`.

use crate::core::types::Rating;

/// Merge two ratings under the superadditive rule. Negative inputs count as zero.
pub fn combine(a: Rating, b: Rating) -> Rating {
    let a = a.max(0.0);
    let b = b.max(0.0);
    if a == 0.0 {
        return b;
    }
    if b == 0.0 {
        return a;
    }
    let root = a.sqrt() + b.sqrt();
    root * root
}

/// Fold any number of ratings into one
pub fn combine_all<I>(ratings: I) -> Rating
where
    I: IntoIterator<Item = Rating>,
{
    ratings.into_iter().fold(0.0, combine)
}

/// Additional rating required to raise `current` up to `target`
pub fn rating_needed(target: Rating, current: Rating) -> Rating {
    let current = current.max(0.0);
    if target <= current {
        return 0.0;
    }
    if current == 0.0 {
        return target;
    }
    let gap = target.sqrt() - current.sqrt();
    gap * gap
}
