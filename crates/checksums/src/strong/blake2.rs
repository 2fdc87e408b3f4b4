use blake2::Blake2b;
use digest::Digest;
use digest::consts::U32;

use super::StrongDigest;

/// Streaming BLAKE2b-256 hasher, the recommended strong checksum.
///
/// The 32-byte output is the longest strong sum the signature format can
/// carry; signatures truncate it to their configured strong-sum length.
#[derive(Clone, Debug, Default)]
pub struct Blake2 {
    inner: Blake2b<U32>,
}

impl Blake2 {
    /// Creates a hasher with an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Blake2b::<U32>::new(),
        }
    }
}

impl StrongDigest for Blake2 {
    type Digest = [u8; 32];
    const DIGEST_LEN: usize = 32;

    fn new() -> Self {
        Blake2::new()
    }

    fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    fn finalize(self) -> Self::Digest {
        self.inner.finalize().into()
    }
}
