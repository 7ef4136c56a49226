use std::collections::VecDeque;

use crate::telemetry::Coordinate;

pub const DEFAULT_TRAIL_CAPACITY: usize = 50;

/// Recent positions in arrival order, oldest first. Holds at most `capacity`
/// points; appending past capacity drops the oldest.
#[derive(Debug, Clone)]
pub struct TrailBuffer {
    points: VecDeque<Coordinate>,
    capacity: usize,
}

impl Default for TrailBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_TRAIL_CAPACITY)
    }
}

impl TrailBuffer {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, point: Coordinate) {
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn snapshot(&self) -> Vec<Coordinate> {
        self.points.iter().copied().collect()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<Coordinate> {
        self.points.back().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: usize) -> Coordinate {
        Coordinate::new(i as f64, -(i as f64))
    }

    #[test]
    fn evicts_oldest_first() {
        let (a, b, c, d) = (point(1), point(2), point(3), point(4));
        let mut trail = TrailBuffer::new(3);
        trail.append(a);
        trail.append(b);
        trail.append(c);
        assert_eq!(trail.snapshot(), vec![a, b, c]);

        trail.append(d);
        assert_eq!(trail.snapshot(), vec![b, c, d]);
        assert_eq!(trail.last(), Some(d));
    }

    #[test]
    fn never_exceeds_capacity() {
        for capacity in [1, 2, 7, DEFAULT_TRAIL_CAPACITY] {
            let mut trail = TrailBuffer::new(capacity);
            for i in 0..200 {
                trail.append(point(i));
                assert!(trail.len() <= capacity);
                assert_eq!(trail.len(), (i + 1).min(capacity));
            }
            let snapshot = trail.snapshot();
            let expected: Vec<_> = (200 - capacity..200).map(point).collect();
            assert_eq!(snapshot, expected);
        }
    }

    #[test]
    fn zero_capacity_holds_one_point() {
        let mut trail = TrailBuffer::new(0);
        assert_eq!(trail.capacity(), 1);
        assert!(trail.is_empty());
        trail.append(point(1));
        trail.append(point(2));
        assert_eq!(trail.snapshot(), vec![point(2)]);
    }
}
