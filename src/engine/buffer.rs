/// Fixed-capacity circular stereo accumulator sitting between the
/// renderer and the output consumer.
///
/// The renderer zeroes a region ahead of the write cursor, lets every
/// sound source accumulate into it, then commits the region by
/// advancing the cursor. The consumer drains committed frames one at a
/// time with [`pop`](StereoRing::pop).
#[derive(Debug, Clone)]
pub struct StereoRing {
    frames: Vec<(f32, f32)>,
    write: usize,
    read: usize,
}

impl StereoRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: vec![(0.0, 0.0); capacity],
            write: 0,
            read: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    /// Committed frames not yet consumed.
    pub fn available(&self) -> usize {
        (self.write + self.frames.len() - self.read) % self.frames.len()
    }

    /// Zero `count` frames ahead of the write cursor without committing
    /// them. Call once per block, before any source accumulates.
    pub fn clear_ahead(&mut self, count: usize) {
        let len = self.frames.len();
        for i in 0..count {
            self.frames[(self.write + i) % len] = (0.0, 0.0);
        }
    }

    /// Add a stereo sample into the uncommitted frame at `offset` past
    /// the write cursor.
    #[inline]
    pub fn accumulate(&mut self, offset: usize, left: f32, right: f32) {
        let idx = (self.write + offset) % self.frames.len();
        let frame = &mut self.frames[idx];
        frame.0 += left;
        frame.1 += right;
    }

    /// Inspect an uncommitted frame at `offset` past the write cursor.
    #[inline]
    pub fn frame_ahead(&self, offset: usize) -> (f32, f32) {
        self.frames[(self.write + offset) % self.frames.len()]
    }

    /// Commit `count` accumulated frames, making them visible to `pop`.
    pub fn advance(&mut self, count: usize) {
        self.write = (self.write + count) % self.frames.len();
    }

    /// Consume one committed frame. Each channel is clamped to [0, 1]
    /// on the way out; the negative half-wave is truncated at this
    /// stage. An empty ring yields silence.
    pub fn pop(&mut self) -> (f32, f32) {
        if self.read == self.write {
            return (0.0, 0.0);
        }
        let (left, right) = self.frames[self.read];
        self.read = (self.read + 1) % self.frames.len();
        (left.clamp(0.0, 1.0), right.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ring_pops_silence() {
        let mut ring = StereoRing::new(16);
        assert_eq!(ring.available(), 0);
        assert_eq!(ring.pop(), (0.0, 0.0));
    }

    #[test]
    fn accumulate_sums_across_sources() {
        let mut ring = StereoRing::new(16);
        ring.clear_ahead(4);
        ring.accumulate(2, 0.25, 0.125);
        ring.accumulate(2, 0.25, 0.125);
        ring.advance(4);
        ring.pop();
        ring.pop();
        assert_eq!(ring.pop(), (0.5, 0.25));
    }

    #[test]
    fn clear_ahead_discards_stale_content() {
        let mut ring = StereoRing::new(4);
        ring.clear_ahead(4);
        ring.accumulate(0, 0.9, 0.9);
        ring.advance(4);
        for _ in 0..4 {
            ring.pop();
        }
        // Wrap around onto the previously written region.
        ring.clear_ahead(4);
        ring.advance(4);
        assert_eq!(ring.pop(), (0.0, 0.0));
    }

    #[test]
    fn pop_clamps_to_the_unit_interval() {
        let mut ring = StereoRing::new(8);
        ring.clear_ahead(2);
        ring.accumulate(0, 1.7, -0.3);
        ring.accumulate(1, 0.5, 0.5);
        ring.advance(2);
        assert_eq!(ring.pop(), (1.0, 0.0));
        assert_eq!(ring.pop(), (0.5, 0.5));
    }
}
