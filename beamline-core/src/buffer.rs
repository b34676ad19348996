//! Bounded point ring buffer
//!
//! Single queue between the three point producers (SD stream, IDN, IWP)
//! and the render task. Fixed capacity, FIFO, never blocks. One slot is
//! always kept empty so that `head == tail` unambiguously means empty
//! with only two cursors.
//!
//! The struct itself is not synchronised. The firmware wraps the single
//! instance in a critical-section mutex so producers and the consumer
//! never observe a torn head/tail pair; every operation below touches
//! both cursors inside one lock acquisition.

use crate::point::Point;

/// Reference capacity used by the firmware (usable slots: capacity - 1).
pub const POINT_BUFFER_CAPACITY: usize = 8192;

/// Fixed-capacity circular queue of [`Point`]s.
pub struct PointRing<const N: usize> {
    slots: [Point; N],
    head: usize,
    tail: usize,
}

impl<const N: usize> Default for PointRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PointRing<N> {
    pub const fn new() -> Self {
        Self {
            slots: [Point::BLANK; N],
            head: 0,
            tail: 0,
        }
    }

    /// Number of points currently queued.
    pub fn len(&self) -> usize {
        if self.head >= self.tail {
            self.head - self.tail
        } else {
            N - (self.tail - self.head)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Free slot count.
    ///
    /// Advisory only: under concurrent producers another writer may claim
    /// slots between this snapshot and a subsequent push.
    pub fn capacity_remaining(&self) -> usize {
        (N - 1) - self.len()
    }

    /// Append every point in order, stopping at the first full slot.
    ///
    /// Returns `false` if any point was dropped. Points written before the
    /// failing one stay in the buffer; there is no rollback. Callers must
    /// treat `false` as "some or all points were dropped".
    pub fn try_push_many(&mut self, points: &[Point]) -> bool {
        for p in points {
            let next = (self.head + 1) % N;
            if next == self.tail {
                return false; // buffer full
            }
            self.slots[self.head] = *p;
            self.head = next;
        }
        true
    }

    pub fn try_push_one(&mut self, point: Point) -> bool {
        self.try_push_many(core::slice::from_ref(&point))
    }

    /// Remove and return the oldest point.
    pub fn pop_one(&mut self) -> Option<Point> {
        if self.head == self.tail {
            return None;
        }
        let p = self.slots[self.tail];
        self.tail = (self.tail + 1) % N;
        Some(p)
    }

    /// Pop up to `out.len()` points in FIFO order into `out`.
    ///
    /// Returns the number of points written; fewer than requested if the
    /// buffer empties first.
    pub fn drain_up_to(&mut self, out: &mut [Point]) -> usize {
        let mut count = 0;
        while count < out.len() && self.tail != self.head {
            out[count] = self.slots[self.tail];
            self.tail = (self.tail + 1) % N;
            count += 1;
        }
        count
    }

    /// Drop all buffered points.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pt(tag: u16) -> Point {
        Point {
            x: tag,
            y: tag,
            r: tag,
            g: tag,
            b: tag,
        }
    }

    #[test]
    fn test_empty_buffer() {
        let mut ring: PointRing<8> = PointRing::new();
        assert!(ring.is_empty());
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.capacity_remaining(), 7);
        assert_eq!(ring.pop_one(), None);
    }

    #[test]
    fn test_fifo_order() {
        let mut ring: PointRing<8> = PointRing::new();
        assert!(ring.try_push_many(&[pt(1), pt(2), pt(3)]));
        assert_eq!(ring.pop_one(), Some(pt(1)));
        assert_eq!(ring.pop_one(), Some(pt(2)));
        assert!(ring.try_push_one(pt(4)));
        assert_eq!(ring.pop_one(), Some(pt(3)));
        assert_eq!(ring.pop_one(), Some(pt(4)));
        assert_eq!(ring.pop_one(), None);
    }

    #[test]
    fn test_holds_at_most_capacity_minus_one() {
        let mut ring: PointRing<8> = PointRing::new();
        for i in 0..7 {
            assert!(ring.try_push_one(pt(i)));
        }
        assert_eq!(ring.len(), 7);
        assert_eq!(ring.capacity_remaining(), 0);
        assert!(!ring.try_push_one(pt(99)));
        assert_eq!(ring.len(), 7);
    }

    #[test]
    fn test_partial_push_keeps_prefix() {
        let mut ring: PointRing<8> = PointRing::new();
        // Fill to 5 of 7 usable slots, leaving exactly 2 free.
        assert!(ring.try_push_many(&[pt(0), pt(1), pt(2), pt(3), pt(4)]));
        assert_eq!(ring.capacity_remaining(), 2);

        // Pushing 3 fails, but the first 2 landed (no rollback).
        assert!(!ring.try_push_many(&[pt(10), pt(11), pt(12)]));
        assert_eq!(ring.len(), 7);

        for i in 0..5 {
            assert_eq!(ring.pop_one(), Some(pt(i)));
        }
        assert_eq!(ring.pop_one(), Some(pt(10)));
        assert_eq!(ring.pop_one(), Some(pt(11)));
        assert_eq!(ring.pop_one(), None);
    }

    #[test]
    fn test_drain_up_to() {
        let mut ring: PointRing<8> = PointRing::new();
        ring.try_push_many(&[pt(1), pt(2), pt(3)]);

        let mut out = [Point::BLANK; 2];
        assert_eq!(ring.drain_up_to(&mut out), 2);
        assert_eq!(out, [pt(1), pt(2)]);

        let mut rest = [Point::BLANK; 4];
        assert_eq!(ring.drain_up_to(&mut rest), 1);
        assert_eq!(rest[0], pt(3));
        assert!(ring.is_empty());
    }

    #[test]
    fn test_clear_resets_cursors() {
        let mut ring: PointRing<8> = PointRing::new();
        ring.try_push_many(&[pt(1), pt(2)]);
        ring.pop_one();
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.capacity_remaining(), 7);
        assert_eq!(ring.pop_one(), None);
    }

    #[test]
    fn test_wraparound() {
        let mut ring: PointRing<4> = PointRing::new();
        for round in 0..20u16 {
            assert!(ring.try_push_many(&[pt(round * 2), pt(round * 2 + 1)]));
            assert_eq!(ring.pop_one(), Some(pt(round * 2)));
            assert_eq!(ring.pop_one(), Some(pt(round * 2 + 1)));
        }
    }

    proptest! {
        /// For arbitrary push/pop interleavings the ring never exceeds
        /// capacity - 1 live elements and only ever yields pushed points
        /// in FIFO order.
        #[test]
        fn prop_fifo_and_bounded(ops in proptest::collection::vec(any::<bool>(), 0..256)) {
            let mut ring: PointRing<16> = PointRing::new();
            let mut next_tag: u16 = 0;
            let mut expected_front: u16 = 0;
            let mut live: usize = 0;

            for push in ops {
                if push {
                    if ring.try_push_one(pt(next_tag)) {
                        next_tag += 1;
                        live += 1;
                    } else {
                        // Push may only fail when the ring is at its bound.
                        prop_assert_eq!(live, 15);
                    }
                } else {
                    match ring.pop_one() {
                        Some(p) => {
                            prop_assert_eq!(p, pt(expected_front));
                            expected_front += 1;
                            live -= 1;
                        }
                        None => prop_assert_eq!(live, 0),
                    }
                }
                prop_assert!(ring.len() <= 15);
                prop_assert_eq!(ring.len(), live);
            }
        }
    }
}
