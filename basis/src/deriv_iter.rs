//! Enumeration of derivative indices.
//!
//! A derivative index of total order D over N centers assigns an order to each
//! of the 3N Cartesian coordinates so that the orders sum to D. Indices are
//! visited in descending lexicographic order: the first one puts all of D on
//! coordinate 0, the last one puts all of D on coordinate 3N-1. Generated
//! kernels pack their per-derivative target buffers in this same order.

use crate::error::ProtocolError;
use crate::helper::binomial;

#[derive(Debug, Clone)]
pub struct DerivIndexIterator {
    order: u32,
    values: Vec<u32>,
    rank: usize,
    range_rank: usize,
}

impl DerivIndexIterator {
    pub fn new(order: u32, ncenters: usize) -> Self {
        assert!(ncenters > 0, "derivative index needs at least one center");
        let ncoords = 3 * ncenters;
        let mut values = vec![0; ncoords];
        values[0] = order;
        Self {
            order,
            values,
            rank: 0,
            range_rank: Self::count(order, ncoords),
        }
    }

    /// Number of ways to distribute `order` over `ncoords` coordinates.
    fn count(order: u32, ncoords: usize) -> usize {
        binomial(order as u64 + ncoords as u64 - 1, ncoords as u64 - 1) as usize
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn ncenters(&self) -> usize {
        self.values.len() / 3
    }

    /// Total number of distinct derivative indices.
    pub fn range_rank(&self) -> usize {
        self.range_rank
    }

    /// Per-coordinate derivative orders of the current index, ordered
    /// center-major: (A_x, A_y, A_z, B_x, ...).
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Position of the current index in the enumeration.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// True when the current index is the final one.
    pub fn last(&self) -> bool {
        self.values[self.values.len() - 1] == self.order
    }

    pub fn next(&mut self) -> Result<(), ProtocolError> {
        let n = self.values.len();
        // rightmost nonzero entry that is not the trailing coordinate
        let k = match (0..n - 1).rev().find(|&i| self.values[i] > 0) {
            Some(k) if !self.last() => k,
            _ => {
                return Err(ProtocolError::DerivIndexExhausted {
                    range_rank: self.range_rank,
                })
            }
        };
        let tail = self.values[n - 1];
        self.values[n - 1] = 0;
        self.values[k] -= 1;
        self.values[k + 1] = tail + 1;
        self.rank += 1;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0);
        self.values[0] = self.order;
        self.rank = 0;
    }

    /// Position of `values` in the enumeration, computed without iterating.
    pub fn rank_of(values: &[u32]) -> usize {
        let n = values.len();
        let mut remaining: u32 = values.iter().sum();
        let mut rank = 0;
        for i in 0..n.saturating_sub(1) {
            // indices agreeing on 0..i but with more weight on coordinate i
            // come first
            let free = n - i - 1;
            for v in (values[i] + 1)..=remaining {
                rank += Self::count(remaining - v, free);
            }
            remaining -= values[i];
        }
        rank
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn enumerate(order: u32, ncenters: usize) -> Vec<Vec<u32>> {
        let mut diter = DerivIndexIterator::new(order, ncenters);
        let mut visited = Vec::new();
        loop {
            visited.push(diter.values().to_vec());
            if diter.last() {
                break;
            }
            diter.next().unwrap();
        }
        visited
    }

    #[test]
    fn test_zero_order_is_single_index() {
        let diter = DerivIndexIterator::new(0, 4);
        assert_eq!(diter.range_rank(), 1);
        assert!(diter.last());
        assert!(diter.values().iter().all(|&v| v == 0));
        assert_eq!(diter.values().len(), 12);
    }

    #[test]
    fn test_first_order_visits_unit_vectors() {
        let visited = enumerate(1, 4);
        let diter = DerivIndexIterator::new(1, 4);
        assert_eq!(diter.range_rank(), 12);
        assert_eq!(visited.len(), 12);
        for (i, values) in visited.iter().enumerate() {
            let mut unit = vec![0; 12];
            unit[i] = 1;
            assert_eq!(values, &unit);
        }
    }

    #[test]
    fn test_range_rank_matches_enumeration() {
        for ncenters in 1..=4 {
            for order in 0..=3 {
                let visited = enumerate(order, ncenters);
                let diter = DerivIndexIterator::new(order, ncenters);
                assert_eq!(visited.len(), diter.range_rank());

                let distinct: HashSet<_> = visited.iter().cloned().collect();
                assert_eq!(distinct.len(), visited.len());
                for values in &visited {
                    assert_eq!(values.iter().sum::<u32>(), order);
                }
            }
        }
    }

    #[test]
    fn test_last_only_on_final_index() {
        let mut diter = DerivIndexIterator::new(2, 2);
        let mut last_count = 0;
        for i in 0..diter.range_rank() {
            if diter.last() {
                last_count += 1;
                assert_eq!(i, diter.range_rank() - 1);
            } else {
                diter.next().unwrap();
            }
        }
        assert_eq!(last_count, 1);
    }

    #[test]
    fn test_next_past_end_is_reported() {
        let mut diter = DerivIndexIterator::new(0, 4);
        assert_eq!(
            diter.next(),
            Err(ProtocolError::DerivIndexExhausted { range_rank: 1 })
        );
    }

    #[test]
    fn test_reset_reproduces_sequence() {
        let mut diter = DerivIndexIterator::new(2, 4);
        let mut first = Vec::new();
        loop {
            first.push(diter.values().to_vec());
            if diter.last() {
                break;
            }
            diter.next().unwrap();
        }

        diter.reset();
        assert_eq!(diter.rank(), 0);
        let mut second = Vec::new();
        loop {
            second.push(diter.values().to_vec());
            if diter.last() {
                break;
            }
            diter.next().unwrap();
        }
        assert_eq!(first, second);
    }

    #[test]
    fn test_rank_of_inverts_enumeration() {
        let mut diter = DerivIndexIterator::new(3, 2);
        loop {
            assert_eq!(DerivIndexIterator::rank_of(diter.values()), diter.rank());
            if diter.last() {
                break;
            }
            diter.next().unwrap();
        }
        assert_eq!(diter.rank() + 1, diter.range_rank());
    }
}
