//! Strong block digests.
//!
//! A weak rolling checksum is cheap but collides easily, so every candidate
//! block match is confirmed against a cryptographic digest of the block. The
//! signature format selects either MD4 (the legacy choice, kept for
//! compatibility) or BLAKE2b-256 (the recommended one); both are consumed
//! here as black-box primitives from the RustCrypto `digest` family and
//! exposed behind the [`StrongDigest`] trait.

mod blake2;
mod md4;

pub use blake2::Blake2;
pub use md4::Md4;

/// Trait implemented by the strong checksum algorithms.
///
/// Callers feed data incrementally via [`Self::update`] and obtain the final
/// digest through [`Self::finalize`]. [`DIGEST_LEN`](Self::DIGEST_LEN)
/// exposes the byte width of the result so buffer sizing never hard-codes an
/// algorithm.
pub trait StrongDigest: Sized {
    /// Type returned when finalising the digest.
    type Digest: AsRef<[u8]> + Copy;

    /// Length of the final digest in bytes.
    const DIGEST_LEN: usize;

    /// Creates a hasher with an empty state.
    fn new() -> Self;

    /// Feeds additional bytes into the digest state.
    fn update(&mut self, data: &[u8]);

    /// Finalises the digest and returns the resulting hash.
    fn finalize(self) -> Self::Digest;

    /// Convenience helper that hashes `data` in a single call.
    fn digest(data: &[u8]) -> Self::Digest {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::{Blake2, Md4, StrongDigest};

    #[test]
    fn digest_lengths_are_native() {
        assert_eq!(Md4::digest(b"x").as_ref().len(), Md4::DIGEST_LEN);
        assert_eq!(Blake2::digest(b"x").as_ref().len(), Blake2::DIGEST_LEN);
    }

    #[test]
    fn trait_digest_matches_streaming() {
        let input = b"confirm the weak match";

        let mut streamed = Md4::new();
        streamed.update(&input[..7]);
        streamed.update(&input[7..]);
        assert_eq!(streamed.finalize(), Md4::digest(input));

        let mut streamed = Blake2::new();
        streamed.update(&input[..7]);
        streamed.update(&input[7..]);
        assert_eq!(streamed.finalize(), Blake2::digest(input));
    }
}
