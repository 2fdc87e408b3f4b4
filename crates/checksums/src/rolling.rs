//! Rolling 32-bit weak checksums.
//!
//! Two variants are provided. [`ClassicSum`] is the Adler-style sum-of-bytes /
//! sum-of-prefix-sums pair, with every byte offset by a small constant so runs
//! of zeros still perturb the state. [`RabinKarp`] is a polynomial hash with a
//! fixed odd multiplier, which distributes better on structured data and makes
//! deliberate collisions harder to craft.
//!
//! Both produce their digest as a packed `u32` and can be advanced a byte at a
//! time, which is what makes scanning a new file against block checksums of an
//! old file cheap: moving the window forward one byte costs a handful of
//! multiply/add operations rather than rehashing the whole window.

/// A 32-bit checksum over a sliding window of bytes.
///
/// Implementations keep whatever internal state they need to support removing
/// the leading byte and appending a trailing byte in constant time. Callers
/// are expected to keep the window contents themselves; the checksum only
/// needs to be told which byte left and which byte entered.
pub trait RollingSum: Clone + Default {
    /// Clears the state back to an empty window.
    fn reset(&mut self);

    /// Number of bytes currently in the window.
    fn len(&self) -> usize;

    /// Returns `true` if no bytes have been rolled in.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends every byte of `data` to the window.
    fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.rollin(byte);
        }
    }

    /// Appends one byte to the end of the window.
    fn rollin(&mut self, inn: u8);

    /// Removes the leading byte from the window.
    ///
    /// `out` must be the byte that currently heads the window; the checksum
    /// cannot verify this itself.
    fn rollout(&mut self, out: u8);

    /// Slides the window forward by one byte, removing `out` from the front
    /// and appending `inn` at the back. The window length is unchanged.
    fn rotate(&mut self, out: u8, inn: u8);

    /// Returns the packed 32-bit checksum of the current window.
    fn digest(&self) -> u32;
}

/// Offset added to every byte so that all-zero windows of different lengths
/// still produce distinct sums.
const CHAR_OFFSET: u32 = 31;

/// The classic Adler-style rolling checksum.
///
/// The first component (`s1`) accumulates the offset byte values and the
/// second (`s2`) accumulates the running prefix sums, so a byte's position in
/// the window is reflected in `s2`. Both components are taken modulo 2^16
/// when the digest is formed, packed as `(s2 << 16) | s1`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClassicSum {
    s1: u32,
    s2: u32,
    len: usize,
}

impl ClassicSum {
    /// Creates a checksum with an empty window.
    #[must_use]
    pub const fn new() -> Self {
        Self { s1: 0, s2: 0, len: 0 }
    }
}

impl RollingSum for ClassicSum {
    fn reset(&mut self) {
        self.s1 = 0;
        self.s2 = 0;
        self.len = 0;
    }

    fn len(&self) -> usize {
        self.len
    }

    fn update(&mut self, data: &[u8]) {
        let mut s1 = self.s1;
        let mut s2 = self.s2;

        let mut chunks = data.chunks_exact(4);
        for block in &mut chunks {
            s1 = s1.wrapping_add(u32::from(block[0]) + CHAR_OFFSET);
            s2 = s2.wrapping_add(s1);

            s1 = s1.wrapping_add(u32::from(block[1]) + CHAR_OFFSET);
            s2 = s2.wrapping_add(s1);

            s1 = s1.wrapping_add(u32::from(block[2]) + CHAR_OFFSET);
            s2 = s2.wrapping_add(s1);

            s1 = s1.wrapping_add(u32::from(block[3]) + CHAR_OFFSET);
            s2 = s2.wrapping_add(s1);
        }
        for &byte in chunks.remainder() {
            s1 = s1.wrapping_add(u32::from(byte) + CHAR_OFFSET);
            s2 = s2.wrapping_add(s1);
        }

        self.s1 = s1;
        self.s2 = s2;
        self.len += data.len();
    }

    fn rollin(&mut self, inn: u8) {
        self.s1 = self.s1.wrapping_add(u32::from(inn) + CHAR_OFFSET);
        self.s2 = self.s2.wrapping_add(self.s1);
        self.len += 1;
    }

    fn rollout(&mut self, out: u8) {
        debug_assert!(self.len > 0, "rollout on an empty window");
        let out = u32::from(out) + CHAR_OFFSET;
        self.s1 = self.s1.wrapping_sub(out);
        self.s2 = self.s2.wrapping_sub((self.len as u32).wrapping_mul(out));
        self.len -= 1;
    }

    fn rotate(&mut self, out: u8, inn: u8) {
        debug_assert!(self.len > 0, "rotate on an empty window");
        let out = u32::from(out) + CHAR_OFFSET;
        let inn = u32::from(inn) + CHAR_OFFSET;
        self.s1 = self.s1.wrapping_add(inn).wrapping_sub(out);
        self.s2 = self
            .s2
            .wrapping_sub((self.len as u32).wrapping_mul(out))
            .wrapping_add(self.s1);
    }

    fn digest(&self) -> u32 {
        ((self.s2 & 0xffff) << 16) | (self.s1 & 0xffff)
    }
}

/// The RabinKarp polynomial rolling checksum.
///
/// The hash of a window `b[0..n]` is `SEED * MULT^n + sum(b[k] * MULT^(n-1-k))`
/// modulo 2^32. Appending a byte multiplies through by [`Self::MULT`]; removing
/// the leading byte uses the multiplier's modular inverse, which exists because
/// the multiplier is odd.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RabinKarp {
    hash: u32,
    len: usize,
    /// `MULT^len`, maintained incrementally so rotate and rollout never
    /// recompute a power.
    mult_pow: u32,
}

/// `MULT^-1 mod 2^32`.
const MULT_INV: u32 = 0x98f009ad;

/// `SEED * (MULT - 1) mod 2^32`; the correction applied when the leading byte
/// (and with it one power of the seed term) leaves the window.
const SEED_ADJUST: u32 = RabinKarp::SEED.wrapping_mul(RabinKarp::MULT - 1);

impl RabinKarp {
    /// The polynomial multiplier. Odd, so it is invertible modulo 2^32.
    pub const MULT: u32 = 0x08104225;

    /// Initial hash value of the empty window.
    pub const SEED: u32 = 0xDEADBEEF;

    /// Creates a checksum with an empty window.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            hash: Self::SEED,
            len: 0,
            mult_pow: 1,
        }
    }
}

impl Default for RabinKarp {
    fn default() -> Self {
        Self::new()
    }
}

impl RollingSum for RabinKarp {
    fn reset(&mut self) {
        *self = Self::new();
    }

    fn len(&self) -> usize {
        self.len
    }

    fn rollin(&mut self, inn: u8) {
        self.hash = self.hash.wrapping_mul(Self::MULT).wrapping_add(u32::from(inn));
        self.mult_pow = self.mult_pow.wrapping_mul(Self::MULT);
        self.len += 1;
    }

    fn rollout(&mut self, out: u8) {
        debug_assert!(self.len > 0, "rollout on an empty window");
        self.mult_pow = self.mult_pow.wrapping_mul(MULT_INV);
        let gone = u32::from(out).wrapping_add(SEED_ADJUST);
        self.hash = self.hash.wrapping_sub(self.mult_pow.wrapping_mul(gone));
        self.len -= 1;
    }

    fn rotate(&mut self, out: u8, inn: u8) {
        debug_assert!(self.len > 0, "rotate on an empty window");
        let gone = u32::from(out).wrapping_add(SEED_ADJUST);
        self.hash = self
            .hash
            .wrapping_mul(Self::MULT)
            .wrapping_add(u32::from(inn))
            .wrapping_sub(self.mult_pow.wrapping_mul(gone));
    }

    fn digest(&self) -> u32 {
        self.hash
    }
}
