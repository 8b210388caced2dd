//! Three independent ways of computing `1 + 2 + ... + n`.
//!
//! Every strategy returns `0` for `n <= 0`. The strategies must agree for every
//! `n`; [`Sums::agree`] checks that for a single evaluation.
use std::{fmt::Display, iter::FusedIterator, ops::RangeInclusive};

use rand::Rng;

/// Range the "new random n" draw samples from.
pub const RANDOM_N_RANGE: RangeInclusive<i64> = 1..=100;

/// Materialises `1..=n` and folds it with addition.
pub fn sum_iterative(n: i64) -> i64 {
    let numbers: Vec<i64> = (1..=n).collect();
    numbers.iter().fold(0, |sum, num| sum + num)
}

/// Tail-accumulating recursion, call as `sum_recursive(n, 0)`.
///
/// There is no depth guard: each step is a real stack frame, so a large enough
/// `n` exhausts the stack and aborts the thread.
pub fn sum_recursive(n: i64, acc: i64) -> i64 {
    if n <= 0 {
        return acc;
    }
    sum_recursive(n - 1, acc + n)
}

/// Folds the lazy sequence produced by [`Naturals::up_to`].
pub fn sum_lazy(n: i64) -> i64 {
    Naturals::up_to(n).fold(0, |sum, num| sum + num)
}

/// Lazily yields `1, 2, ..., end`; once exhausted it stays exhausted.
#[derive(Debug)]
pub struct Naturals {
    next: i64,
    end: i64,
}

impl Naturals {
    pub fn up_to(end: i64) -> Self {
        Self { next: 1, end }
    }
}

impl Iterator for Naturals {
    type Item = i64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.end {
            return None;
        }
        let curr = self.next;
        self.next += 1;
        Some(curr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.next > self.end {
            0
        } else {
            usize::try_from(self.end - self.next + 1).unwrap_or(usize::MAX)
        };
        (remaining, Some(remaining))
    }
}

impl FusedIterator for Naturals {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sums {
    pub iterative: i64,
    pub recursive: i64,
    pub lazy: i64,
}

impl Sums {
    pub fn agree(&self) -> bool {
        self.iterative == self.recursive && self.recursive == self.lazy
    }
}

impl Display for Sums {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Method A (iterative): {}", self.iterative)?;
        writeln!(f, "Method B (recursive): {}", self.recursive)?;
        write!(f, "Method C (lazy):      {}", self.lazy)
    }
}

/// Holds the current `n` and evaluates all three strategies for it.
#[derive(Debug, Clone, Default)]
pub struct SummationEvaluator {
    n: i64,
}

impl SummationEvaluator {
    pub fn new(n: i64) -> Self {
        Self { n }
    }

    pub fn n(&self) -> i64 {
        self.n
    }

    pub fn results(&self) -> Sums {
        Sums {
            iterative: sum_iterative(self.n),
            recursive: sum_recursive(self.n, 0),
            lazy: sum_lazy(self.n),
        }
    }

    /// Draws a new `n` from [`RANDOM_N_RANGE`] and returns it.
    pub fn regenerate<R: Rng>(&mut self, rng: &mut R) -> i64 {
        self.n = rng.random_range(RANDOM_N_RANGE);
        self.n
    }
}
