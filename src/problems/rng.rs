//! Seeded pseudo-randomness for reproducible question ordering.
//!
//! The seed context string is hashed to 32 bits and drives a xorshift32
//! generator. Anything implementing [`SeededRng`] can stand in for it.

/// A deterministic random source.
pub trait SeededRng {
    fn next_u32(&mut self) -> u32;

    /// Uniform-ish index in `0..bound`. `bound` must be non-zero.
    fn next_index(&mut self, bound: usize) -> usize {
        (self.next_u32() as usize) % bound
    }
}

/// Builds the RNG for a seed context string.
pub type RngFactory = fn(&str) -> Box<dyn SeededRng>;

/// 32-bit rolling string hash (`h = h * 31 + c`, wrapping).
pub fn hash_seed(context: &str) -> u32 {
    context
        .chars()
        .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(c as u32))
}

#[derive(Debug, Clone)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    // xorshift has a fixed point at zero.
    const ZERO_SEED_REPLACEMENT: u32 = 0x9E37_79B9;

    pub fn new(seed: u32) -> Self {
        let state = if seed == 0 { Self::ZERO_SEED_REPLACEMENT } else { seed };
        XorShift32 { state }
    }

    pub fn from_context(context: &str) -> Self {
        Self::new(hash_seed(context))
    }

    pub fn boxed(context: &str) -> Box<dyn SeededRng> {
        Box::new(Self::from_context(context))
    }
}

impl SeededRng for XorShift32 {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl rand::RngCore for XorShift32 {
    fn next_u32(&mut self) -> u32 {
        SeededRng::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        let hi = SeededRng::next_u32(self) as u64;
        let lo = SeededRng::next_u32(self) as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = SeededRng::next_u32(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Fisher-Yates shuffle driven by a seeded generator.
pub fn seeded_shuffle<T>(items: &mut [T], rng: &mut dyn SeededRng) {
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(hash_seed(""), 0);
        assert_eq!(hash_seed("a"), 97);
        assert_eq!(hash_seed("ab"), 97 * 31 + 98);
        assert_eq!(hash_seed("2026-W42|1|vocab|N4"), hash_seed("2026-W42|1|vocab|N4"));
        assert_ne!(hash_seed("2026-W42|1|vocab|N4"), hash_seed("2026-W42|2|vocab|N4"));
    }

    #[test]
    fn test_xorshift_sequence_is_reproducible() {
        let mut a = XorShift32::new(42);
        let mut b = XorShift32::new(42);
        let xs: Vec<u32> = (0..5).map(|_| SeededRng::next_u32(&mut a)).collect();
        let ys: Vec<u32> = (0..5).map(|_| SeededRng::next_u32(&mut b)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|x| *x != 0));
    }

    #[test]
    fn test_zero_seed_does_not_stick() {
        let mut rng = XorShift32::new(0);
        assert_ne!(SeededRng::next_u32(&mut rng), 0);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut items: Vec<u32> = (0..20).collect();
        seeded_shuffle(&mut items, &mut XorShift32::from_context("ctx"));
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());

        let mut again: Vec<u32> = (0..20).collect();
        seeded_shuffle(&mut again, &mut XorShift32::from_context("ctx"));
        assert_eq!(items, again);
    }

    #[test]
    fn test_rng_core_fills_bytes() {
        use rand::RngCore;
        let mut rng = XorShift32::new(7);
        let mut buf = [0u8; 7];
        rng.fill_bytes(&mut buf);
        assert!(buf.iter().any(|b| *b != 0));
    }
}
