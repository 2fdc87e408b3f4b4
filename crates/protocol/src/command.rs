//! The byte-tagged command instruction set.
//!
//! A delta stream is a sequence of commands, each one opcode byte followed by
//! zero to sixteen operand bytes. Short literals encode their length in the
//! opcode itself; longer literals and copies carry explicit big-endian
//! operands whose widths are part of the opcode assignment. The whole
//! instruction set is described by [`COMMAND_TABLE`].

use thiserror::Error;

/// Largest encoded command header: one opcode byte plus two 8-byte operands.
pub const MAX_COMMAND_LEN: usize = 17;

/// Highest literal length that can be encoded in the opcode byte itself.
const MAX_IMMEDIATE_LITERAL: u64 = 0x40;

/// What a command instructs the reader to do.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CommandKind {
    /// Terminates the stream.
    End,
    /// Emit the following bytes verbatim.
    Literal,
    /// Copy a range out of the basis.
    Copy,
    /// A signature table entry; never valid inside a delta stream.
    Signature,
    /// Unassigned opcode.
    Reserved,
}

/// Table entry describing one opcode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CommandSpec {
    /// The command kind this opcode encodes.
    pub kind: CommandKind,
    /// Whether the first operand is packed into the opcode byte itself.
    pub immediate: bool,
    /// Width in bytes of the first explicit operand (0 if none).
    pub param1: u8,
    /// Width in bytes of the second explicit operand (0 if none).
    pub param2: u8,
}

impl CommandSpec {
    /// Total encoded size of the command header, opcode byte included.
    #[must_use]
    pub const fn total_size(&self) -> usize {
        1 + self.param1 as usize + self.param2 as usize
    }

    /// Number of operand bytes that follow the opcode.
    #[must_use]
    pub const fn param_len(&self) -> usize {
        self.param1 as usize + self.param2 as usize
    }
}

const RESERVED: CommandSpec = CommandSpec {
    kind: CommandKind::Reserved,
    immediate: false,
    param1: 0,
    param2: 0,
};

/// The instruction set, indexed by opcode byte.
///
/// Layout:
///
/// - `0x00`: end of stream.
/// - `0x01..=0x40`: immediate literals; the opcode is the length.
/// - `0x41..=0x44`: literals with an explicit 1/2/4/8-byte length.
/// - `0x45..=0x54`: copies, all sixteen (offset width, length width)
///   combinations over 1/2/4/8 bytes, offset width varying slowest.
/// - `0x55..=0x70`: signature entries; invalid in delta streams.
/// - everything else: reserved.
pub static COMMAND_TABLE: [CommandSpec; 256] = build_table();

const OPERAND_WIDTHS: [u8; 4] = [1, 2, 4, 8];

const fn build_table() -> [CommandSpec; 256] {
    let mut table = [RESERVED; 256];

    table[0x00] = CommandSpec {
        kind: CommandKind::End,
        immediate: false,
        param1: 0,
        param2: 0,
    };

    let mut op = 0x01;
    while op <= 0x40 {
        table[op] = CommandSpec {
            kind: CommandKind::Literal,
            immediate: true,
            param1: 0,
            param2: 0,
        };
        op += 1;
    }

    let mut i = 0;
    while i < 4 {
        table[0x41 + i] = CommandSpec {
            kind: CommandKind::Literal,
            immediate: false,
            param1: OPERAND_WIDTHS[i],
            param2: 0,
        };
        i += 1;
    }

    let mut off = 0;
    while off < 4 {
        let mut len = 0;
        while len < 4 {
            table[0x45 + off * 4 + len] = CommandSpec {
                kind: CommandKind::Copy,
                immediate: false,
                param1: OPERAND_WIDTHS[off],
                param2: OPERAND_WIDTHS[len],
            };
            len += 1;
        }
        off += 1;
    }

    let mut op = 0x55;
    while op <= 0x70 {
        table[op] = CommandSpec {
            kind: CommandKind::Signature,
            immediate: false,
            param1: 0,
            param2: 0,
        };
        op += 1;
    }

    table
}

/// A decoded command.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    /// End of stream.
    End,
    /// `len` bytes of literal data follow the header.
    Literal {
        /// Number of literal bytes.
        len: u64,
    },
    /// Copy `len` bytes starting at `offset` in the basis.
    Copy {
        /// Byte offset into the basis.
        offset: u64,
        /// Number of bytes to copy.
        len: u64,
    },
}

impl Command {
    /// Encodes the command header into `buf` and returns the encoded size.
    ///
    /// The smallest sufficient opcode is always chosen: literal lengths up
    /// to 64 use the immediate forms, and explicit operands use the
    /// narrowest of the 1/2/4/8-byte widths that represents the value.
    pub fn encode(&self, buf: &mut [u8; MAX_COMMAND_LEN]) -> usize {
        match *self {
            Self::End => {
                buf[0] = 0x00;
                1
            }
            Self::Literal { len } => {
                debug_assert!(len > 0, "literal commands carry at least one byte");
                if len <= MAX_IMMEDIATE_LITERAL {
                    buf[0] = len as u8;
                    1
                } else {
                    let width = operand_width(len);
                    buf[0] = 0x41 + width_index(width);
                    put_be(&mut buf[1..], len, width);
                    1 + width as usize
                }
            }
            Self::Copy { offset, len } => {
                debug_assert!(len > 0, "copy commands cover at least one byte");
                let off_width = operand_width(offset);
                let len_width = operand_width(len);
                buf[0] = 0x45 + 4 * width_index(off_width) + width_index(len_width);
                put_be(&mut buf[1..], offset, off_width);
                put_be(&mut buf[1 + off_width as usize..], len, len_width);
                1 + off_width as usize + len_width as usize
            }
        }
    }
}

/// Errors raised while decoding a command header.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum WireError {
    /// The opcode is not assigned by the instruction set.
    #[error("reserved command opcode {opcode:#04x}")]
    ReservedOpcode {
        /// The offending opcode byte.
        opcode: u8,
    },
    /// A signature-table opcode appeared inside a delta stream.
    #[error("signature command {opcode:#04x} inside a delta stream")]
    SignatureCommand {
        /// The offending opcode byte.
        opcode: u8,
    },
    /// A literal or copy command decoded to a zero length.
    #[error("zero-length operand for command {opcode:#04x}")]
    ZeroLength {
        /// The offending opcode byte.
        opcode: u8,
    },
}

/// Decodes the operand bytes of `opcode` into a [`Command`].
///
/// `params` must contain exactly the operand bytes the table entry calls
/// for ([`CommandSpec::param_len`]); the caller is responsible for having
/// read them off the stream.
pub fn decode_operands(opcode: u8, params: &[u8]) -> Result<Command, WireError> {
    let spec = &COMMAND_TABLE[opcode as usize];
    debug_assert_eq!(params.len(), spec.param_len());

    match spec.kind {
        CommandKind::End => Ok(Command::End),
        CommandKind::Literal if spec.immediate => Ok(Command::Literal {
            len: u64::from(opcode),
        }),
        CommandKind::Literal => {
            let len = read_be(&params[..spec.param1 as usize]);
            if len == 0 {
                return Err(WireError::ZeroLength { opcode });
            }
            Ok(Command::Literal { len })
        }
        CommandKind::Copy => {
            let offset = read_be(&params[..spec.param1 as usize]);
            let len = read_be(&params[spec.param1 as usize..]);
            if len == 0 {
                return Err(WireError::ZeroLength { opcode });
            }
            Ok(Command::Copy { offset, len })
        }
        CommandKind::Signature => Err(WireError::SignatureCommand { opcode }),
        CommandKind::Reserved => Err(WireError::ReservedOpcode { opcode }),
    }
}

const fn operand_width(value: u64) -> u8 {
    if value <= 0xff {
        1
    } else if value <= 0xffff {
        2
    } else if value <= 0xffff_ffff {
        4
    } else {
        8
    }
}

const fn width_index(width: u8) -> u8 {
    match width {
        1 => 0,
        2 => 1,
        4 => 2,
        _ => 3,
    }
}

fn put_be(buf: &mut [u8], value: u64, width: u8) {
    let bytes = value.to_be_bytes();
    buf[..width as usize].copy_from_slice(&bytes[8 - width as usize..]);
}

fn read_be(bytes: &[u8]) -> u64 {
    let mut value = 0u64;
    for &byte in bytes {
        value = (value << 8) | u64::from(byte);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn table_layout_matches_the_format() {
        assert_eq!(COMMAND_TABLE[0x00].kind, CommandKind::End);

        for op in 0x01..=0x40u8 {
            let spec = &COMMAND_TABLE[op as usize];
            assert_eq!(spec.kind, CommandKind::Literal);
            assert!(spec.immediate);
            assert_eq!(spec.total_size(), 1);
        }

        for (i, width) in [1u8, 2, 4, 8].into_iter().enumerate() {
            let spec = &COMMAND_TABLE[0x41 + i];
            assert_eq!(spec.kind, CommandKind::Literal);
            assert!(!spec.immediate);
            assert_eq!(spec.param1, width);
            assert_eq!(spec.param2, 0);
        }

        for off in 0..4usize {
            for len in 0..4usize {
                let spec = &COMMAND_TABLE[0x45 + off * 4 + len];
                assert_eq!(spec.kind, CommandKind::Copy);
                assert_eq!(spec.param1, [1u8, 2, 4, 8][off]);
                assert_eq!(spec.param2, [1u8, 2, 4, 8][len]);
            }
        }

        for op in 0x55..=0x70u8 {
            assert_eq!(COMMAND_TABLE[op as usize].kind, CommandKind::Signature);
        }

        let reserved = COMMAND_TABLE
            .iter()
            .filter(|spec| spec.kind == CommandKind::Reserved)
            .count();
        assert_eq!(reserved, 256 - 1 - 64 - 4 - 16 - 28);
    }

    #[test]
    fn immediate_literals_use_one_byte() {
        let mut buf = [0u8; MAX_COMMAND_LEN];
        assert_eq!(Command::Literal { len: 1 }.encode(&mut buf), 1);
        assert_eq!(buf[0], 0x01);
        assert_eq!(Command::Literal { len: 64 }.encode(&mut buf), 1);
        assert_eq!(buf[0], 0x40);
    }

    #[test]
    fn explicit_literals_pick_the_narrowest_width() {
        let mut buf = [0u8; MAX_COMMAND_LEN];

        assert_eq!(Command::Literal { len: 65 }.encode(&mut buf), 2);
        assert_eq!(&buf[..2], &[0x41, 65]);

        assert_eq!(Command::Literal { len: 0x1234 }.encode(&mut buf), 3);
        assert_eq!(&buf[..3], &[0x42, 0x12, 0x34]);

        assert_eq!(Command::Literal { len: 0x0001_0000 }.encode(&mut buf), 5);
        assert_eq!(&buf[..5], &[0x43, 0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn copy_opcode_reflects_both_widths() {
        let mut buf = [0u8; MAX_COMMAND_LEN];

        let n = Command::Copy { offset: 0, len: 1 }.encode(&mut buf);
        assert_eq!(&buf[..n], &[0x45, 0x00, 0x01]);

        // 8-byte offset, 1-byte length: 0x45 + 4*3 + 0
        let n = Command::Copy {
            offset: 1 << 40,
            len: 7,
        }
        .encode(&mut buf);
        assert_eq!(n, 10);
        assert_eq!(buf[0], 0x51);
        assert_eq!(&buf[1..9], &(1u64 << 40).to_be_bytes());
        assert_eq!(buf[9], 7);
    }

    #[test]
    fn zero_length_operands_are_corrupt() {
        assert_eq!(
            decode_operands(0x45, &[0x10, 0x00]),
            Err(WireError::ZeroLength { opcode: 0x45 })
        );
        assert_eq!(
            decode_operands(0x41, &[0x00]),
            Err(WireError::ZeroLength { opcode: 0x41 })
        );
    }

    #[test]
    fn reserved_and_signature_opcodes_do_not_decode() {
        assert_eq!(
            decode_operands(0xff, &[]),
            Err(WireError::ReservedOpcode { opcode: 0xff })
        );
        assert_eq!(
            decode_operands(0x55, &[]),
            Err(WireError::SignatureCommand { opcode: 0x55 })
        );
    }

    proptest! {
        #[test]
        fn encode_decode_round_trips_literals(len in 1u64..=u64::MAX) {
            let cmd = Command::Literal { len };
            let mut buf = [0u8; MAX_COMMAND_LEN];
            let n = cmd.encode(&mut buf);

            let spec = &COMMAND_TABLE[buf[0] as usize];
            prop_assert_eq!(spec.total_size(), n);
            prop_assert_eq!(decode_operands(buf[0], &buf[1..n]), Ok(cmd));
        }

        #[test]
        fn encode_decode_round_trips_copies(offset in any::<u64>(), len in 1u64..=u64::MAX) {
            let cmd = Command::Copy { offset, len };
            let mut buf = [0u8; MAX_COMMAND_LEN];
            let n = cmd.encode(&mut buf);

            let spec = &COMMAND_TABLE[buf[0] as usize];
            prop_assert_eq!(spec.total_size(), n);
            prop_assert_eq!(decode_operands(buf[0], &buf[1..n]), Ok(cmd));
        }
    }
}
