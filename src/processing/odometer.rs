//! Multi-digit counting state machine behind every section and range iterator.
//!
//! Each digit runs over a range of segment values. The most significant digit
//! varies slowest. In product mode every digit always runs over its own
//! `[lower, upper]`, which enumerates the cartesian product of the segment
//! ranges. In sequential mode the bounds are those of a single contiguous
//! interval: a digit runs from `lower` only while all preceding digits are at
//! their lower bounds, and up to `upper` only while all preceding digits are at
//! their upper bounds. Otherwise it runs from zero or up to its maximum.

use crate::models::SegInt;

/// Predicate rejecting emitted tuples.
pub type Exclusion = Box<dyn Fn(&[SegInt]) -> bool + Send + Sync>;

/// Bounds of one digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digit {
    pub lower: SegInt,
    pub upper: SegInt,
    pub max: SegInt,
}

impl Digit {
    pub fn new(lower: SegInt, upper: SegInt, max: SegInt) -> Self {
        Digit { lower, upper, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    Running,
    Done,
}

pub struct Odometer {
    digits: Vec<Digit>,
    sequential: bool,
    current: Vec<SegInt>,
    ends: Vec<SegInt>,
    /// All preceding digits sit at their lower bound.
    at_lower: Vec<bool>,
    /// All preceding digits sit at their upper bound.
    at_upper: Vec<bool>,
    state: State,
    primed: bool,
    pending: Option<Vec<SegInt>>,
    exclude: Option<Exclusion>,
}

impl Odometer {
    /// Cartesian product of the digit ranges.
    pub fn product(digits: Vec<Digit>) -> Self {
        Self::new(digits, false)
    }

    /// Every tuple from the digit lower bounds to the digit upper bounds,
    /// counting through the full digit domains in between.
    pub fn sequential(digits: Vec<Digit>) -> Self {
        Self::new(digits, true)
    }

    fn new(digits: Vec<Digit>, sequential: bool) -> Self {
        let n = digits.len();
        Odometer {
            digits,
            sequential,
            current: vec![0; n],
            ends: vec![0; n],
            at_lower: vec![true; n],
            at_upper: vec![true; n],
            state: State::Fresh,
            primed: false,
            pending: None,
            exclude: None,
        }
    }

    /// Skip every tuple for which `exclude` returns true.
    pub fn with_exclusion(mut self, exclude: Exclusion) -> Self {
        self.exclude = Some(exclude);
        self
    }

    pub fn digit_count(&self) -> usize {
        self.digits.len()
    }

    pub fn has_next(&mut self) -> bool {
        self.prime();
        self.pending.is_some()
    }

    fn prime(&mut self) {
        if !self.primed {
            self.primed = true;
            self.fill();
        }
    }

    /// Buffer the next tuple that passes the exclusion predicate.
    fn fill(&mut self) {
        self.pending = loop {
            let Some(tuple) = self.step() else {
                break None;
            };
            match &self.exclude {
                Some(exclude) if exclude(&tuple) => {
                    log::trace!("excluded {tuple:?}");
                }
                _ => break Some(tuple),
            }
        };
    }

    fn step(&mut self) -> Option<Vec<SegInt>> {
        match self.state {
            State::Done => None,
            State::Fresh => {
                self.state = State::Running;
                self.reset_from(0);
                Some(self.current.clone())
            }
            State::Running => {
                if self.advance() {
                    Some(self.current.clone())
                } else {
                    self.state = State::Done;
                    None
                }
            }
        }
    }

    /// Move to the next tuple: bump the least significant digit that has not
    /// reached its end and restart every digit after it. Returns false once
    /// no digit can move.
    pub fn advance(&mut self) -> bool {
        let Some(i) = (0..self.digits.len())
            .rev()
            .find(|&i| self.current[i] < self.ends[i])
        else {
            return false;
        };
        self.current[i] += 1;
        self.reset_from(i + 1);
        true
    }

    fn reset_from(&mut self, start: usize) {
        for i in start..self.digits.len() {
            let (at_lower, at_upper) = if i == 0 {
                (true, true)
            } else {
                let prev = self.digits[i - 1];
                (
                    self.at_lower[i - 1] && self.current[i - 1] == prev.lower,
                    self.at_upper[i - 1] && self.current[i - 1] == prev.upper,
                )
            };
            self.at_lower[i] = at_lower;
            self.at_upper[i] = at_upper;
            let digit = self.digits[i];
            self.current[i] = if self.sequential && !at_lower {
                0
            } else {
                digit.lower
            };
            self.ends[i] = if self.sequential && !at_upper {
                digit.max
            } else {
                digit.upper
            };
        }
    }
}

impl Iterator for Odometer {
    type Item = Vec<SegInt>;

    fn next(&mut self) -> Option<Self::Item> {
        self.prime();
        let out = self.pending.take();
        if out.is_some() {
            self.fill();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_digit() {
        let got: Vec<_> = Odometer::product(vec![Digit::new(10, 12, 255)]).collect();
        assert_eq!(got, vec![vec![10], vec![11], vec![12]]);
    }

    #[test]
    fn test_product_order() {
        let got: Vec<_> =
            Odometer::product(vec![Digit::new(1, 2, 255), Digit::new(5, 6, 255)]).collect();
        assert_eq!(got, vec![vec![1, 5], vec![1, 6], vec![2, 5], vec![2, 6]]);
    }

    #[test]
    fn test_single_value_emits_once() {
        let mut odo = Odometer::product(vec![Digit::new(3, 3, 255), Digit::new(4, 4, 255)]);
        assert!(odo.has_next());
        assert_eq!(odo.next(), Some(vec![3, 4]));
        assert!(!odo.has_next());
        assert_eq!(odo.next(), None);
        assert_eq!(odo.next(), None);
    }

    #[test]
    fn test_no_digits_emits_empty_tuple() {
        let got: Vec<_> = Odometer::product(Vec::new()).collect();
        assert_eq!(got, vec![Vec::<SegInt>::new()]);
    }

    #[test]
    fn test_sequential_counts_through_full_domain() {
        // 1.200 .. 2.100 with 8-bit digits
        let odo = Odometer::sequential(vec![Digit::new(1, 2, 255), Digit::new(200, 100, 255)]);
        let got: Vec<_> = odo.collect();
        assert_eq!(got.len(), 56 + 101);
        assert_eq!(got[0], vec![1, 200]);
        assert_eq!(got[55], vec![1, 255]);
        assert_eq!(got[56], vec![2, 0]);
        assert_eq!(got.last(), Some(&vec![2, 100]));
    }

    #[test]
    fn test_sequential_middle_digits_are_full() {
        // 0.0.250 .. 0.2.5: middle value of the second digit runs 0..=255
        let odo = Odometer::sequential(vec![
            Digit::new(0, 0, 255),
            Digit::new(0, 2, 255),
            Digit::new(250, 5, 255),
        ]);
        let got: Vec<_> = odo.collect();
        assert_eq!(got.len(), 6 + 256 + 6);
        let values: Vec<u32> = got.iter().map(|t| t[1] * 256 + t[2]).collect();
        assert!(values.windows(2).all(|w| w[1] == w[0] + 1));
    }

    #[test]
    fn test_exclusion_skips_tuples() {
        let odo = Odometer::product(vec![Digit::new(0, 1, 255), Digit::new(0, 2, 255)])
            .with_exclusion(Box::new(|t: &[SegInt]| t[1] == 0));
        let got: Vec<_> = odo.collect();
        assert_eq!(got, vec![vec![0, 1], vec![0, 2], vec![1, 1], vec![1, 2]]);
    }

    #[test]
    fn test_exclusion_of_everything() {
        let mut odo = Odometer::product(vec![Digit::new(0, 3, 255)]).with_exclusion(Box::new(|_: &[SegInt]| true));
        assert!(!odo.has_next());
        assert_eq!(odo.next(), None);
    }
}
