// =============================================================================
// Occupancy bitmap
// =============================================================================
//
// One bit per storage slot, packed LSB-first into `u64` words. Bits at or past
// `len` are always zero, so word-level scans never report a slot outside the
// buffer.

const WORD_BITS: usize = 64;

#[inline]
fn word_index(bit: usize) -> usize {
    bit / WORD_BITS
}

#[inline]
fn bit_mask(bit: usize) -> u64 {
    1u64 << (bit % WORD_BITS)
}

#[derive(Clone, Debug, Default)]
pub(crate) struct OccupancyBitmap {
    words: Vec<u64>,
    len: usize,
}

impl OccupancyBitmap {
    /// An all-clear bitmap covering `len` slots.
    pub(crate) fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    /// A bitmap covering `len` slots with exactly `0..ones` set.
    pub(crate) fn filled(ones: usize, len: usize) -> Self {
        debug_assert!(ones <= len);
        let mut bitmap = Self::new(len);
        let full = ones / WORD_BITS;
        for w in &mut bitmap.words[..full] {
            *w = u64::MAX;
        }
        let rem = ones % WORD_BITS;
        if rem != 0 {
            bitmap.words[full] = (1u64 << rem) - 1;
        }
        bitmap
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Extend (or truncate) to `len` slots. New slots are clear.
    pub(crate) fn resize(&mut self, len: usize) {
        self.words.resize(len.div_ceil(WORD_BITS), 0);
        if len < self.len {
            let rem = len % WORD_BITS;
            if rem != 0 {
                if let Some(last) = self.words.last_mut() {
                    *last &= (1u64 << rem) - 1;
                }
            }
        }
        self.len = len;
    }

    #[inline]
    pub(crate) fn insert(&mut self, bit: usize) {
        debug_assert!(bit < self.len, "bit {bit} out of range {}", self.len);
        self.words[word_index(bit)] |= bit_mask(bit);
    }

    #[inline]
    pub(crate) fn remove(&mut self, bit: usize) {
        if bit < self.len {
            self.words[word_index(bit)] &= !bit_mask(bit);
        }
    }

    #[inline]
    pub(crate) fn contains(&self, bit: usize) -> bool {
        bit < self.len && self.words[word_index(bit)] & bit_mask(bit) != 0
    }

    /// First set bit in `from..end`, if any.
    pub(crate) fn next_set(&self, from: usize, end: usize) -> Option<usize> {
        let end = end.min(self.len);
        if from >= end {
            return None;
        }

        let mut wi = word_index(from);
        let mut w = self.words[wi] & (u64::MAX << (from % WORD_BITS));
        loop {
            if w != 0 {
                let idx = wi * WORD_BITS + w.trailing_zeros() as usize;
                return (idx < end).then_some(idx);
            }
            wi += 1;
            if wi * WORD_BITS >= end {
                return None;
            }
            w = self.words[wi];
        }
    }

    #[cfg(test)]
    pub(crate) fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
}
