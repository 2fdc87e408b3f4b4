//! File magic numbers.
//!
//! Every delta or signature file opens with a four-byte big-endian magic.
//! For signatures the magic also selects the rolling-sum variant and the
//! strong digest, so a loaded signature carries everything a delta job needs
//! to reproduce its checksums.

/// Longest strong sum any signature format can carry, in bytes.
pub const MAX_STRONG_LEN: usize = 32;

/// A four-byte magic number identifying a delta or signature stream.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Magic {
    /// A delta stream, the literal bytes `rs\x026`.
    Delta,
    /// Signature with the classic rolling sum and MD4 strong sums
    /// (`rs\x016`). Kept for compatibility; MD4 is broken.
    SigMd4,
    /// Signature with the classic rolling sum and BLAKE2 strong sums
    /// (`rs\x017`).
    SigBlake2,
    /// Signature with the RabinKarp rolling sum and MD4 strong sums
    /// (`rs\x01F`).
    SigRkMd4,
    /// Signature with the RabinKarp rolling sum and BLAKE2 strong sums
    /// (`rs\x01G`). The recommended default.
    SigRkBlake2,
}

/// Rolling weak-sum variant selected by a signature magic.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RollsumKind {
    /// The classic Adler-style sum.
    Classic,
    /// The RabinKarp polynomial hash.
    RabinKarp,
}

/// Strong digest selected by a signature magic.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StrongKind {
    /// MD4, 16-byte digests.
    Md4,
    /// BLAKE2b-256, 32-byte digests.
    Blake2,
}

impl StrongKind {
    /// Native digest length in bytes.
    #[must_use]
    pub const fn digest_len(self) -> usize {
        match self {
            Self::Md4 => 16,
            Self::Blake2 => 32,
        }
    }
}

impl Magic {
    /// The signature format new signatures should use.
    pub const RECOMMENDED_SIG: Self = Self::SigRkBlake2;

    /// Returns the magic's numeric value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::Delta => 0x7273_0236,
            Self::SigMd4 => 0x7273_0136,
            Self::SigBlake2 => 0x7273_0137,
            Self::SigRkMd4 => 0x7273_0146,
            Self::SigRkBlake2 => 0x7273_0147,
        }
    }

    /// Looks up the magic for a numeric value read from a stream.
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0x7273_0236 => Some(Self::Delta),
            0x7273_0136 => Some(Self::SigMd4),
            0x7273_0137 => Some(Self::SigBlake2),
            0x7273_0146 => Some(Self::SigRkMd4),
            0x7273_0147 => Some(Self::SigRkBlake2),
            _ => None,
        }
    }

    /// The magic as it appears on the wire.
    #[must_use]
    pub const fn to_be_bytes(self) -> [u8; 4] {
        self.as_u32().to_be_bytes()
    }

    /// Returns `true` for the signature magics.
    #[must_use]
    pub const fn is_signature(self) -> bool {
        !matches!(self, Self::Delta)
    }

    /// Rolling-sum variant for a signature magic, `None` for deltas.
    #[must_use]
    pub const fn rollsum(self) -> Option<RollsumKind> {
        match self {
            Self::Delta => None,
            Self::SigMd4 | Self::SigBlake2 => Some(RollsumKind::Classic),
            Self::SigRkMd4 | Self::SigRkBlake2 => Some(RollsumKind::RabinKarp),
        }
    }

    /// Strong digest for a signature magic, `None` for deltas.
    #[must_use]
    pub const fn strong(self) -> Option<StrongKind> {
        match self {
            Self::Delta => None,
            Self::SigMd4 | Self::SigRkMd4 => Some(StrongKind::Md4),
            Self::SigBlake2 | Self::SigRkBlake2 => Some(StrongKind::Blake2),
        }
    }
}
