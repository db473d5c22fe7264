//! Hash programs: metadata plus an ordered list of ops.
//!
//! A [`Program`] is plain data. Ops carry their opcode as a raw number so
//! that a decoded program can hold opcodes this crate does not know about;
//! those are rejected when the machine reaches them, not when the program is
//! built.

use std::fmt;

use bincode::{Decode, Encode};

use crate::{ConfigError, Error, HashFunction, OutputLengthPolicy};

/// Opcodes understood by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum OpCode {
    /// Push `inputs[index]`.
    PushInput = 1,
    /// Push the op's payload.
    PushBytes = 2,
    /// Pop `branching_factor` values, hash them in pop order, push the digest.
    PopChildrenAndHash = 3,
    /// Pop `index` values, hash them in pop order, push the digest.
    PopNAndHash = 4,
    /// Hash the top `index` values, top first, without popping them; push the
    /// digest.
    PeekNAndHash = 5,
    /// Pop a value and fail unless it equals `inputs[index]`.
    MatchInput = 6,
}

impl OpCode {
    /// Upper-case name used in program listings.
    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::PushInput => "PUSH_INPUT",
            OpCode::PushBytes => "PUSH_BYTES",
            OpCode::PopChildrenAndHash => "POP_CHILDREN_AND_HASH",
            OpCode::PopNAndHash => "POP_N_AND_HASH",
            OpCode::PeekNAndHash => "PEEK_N_AND_HASH",
            OpCode::MatchInput => "MATCH_INPUT",
        }
    }
}

impl TryFrom<u32> for OpCode {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(OpCode::PushInput),
            2 => Ok(OpCode::PushBytes),
            3 => Ok(OpCode::PopChildrenAndHash),
            4 => Ok(OpCode::PopNAndHash),
            5 => Ok(OpCode::PeekNAndHash),
            6 => Ok(OpCode::MatchInput),
            other => Err(other),
        }
    }
}

impl From<OpCode> for u32 {
    fn from(opcode: OpCode) -> Self {
        opcode as u32
    }
}

/// Which hash the machine uses and, for extendable-output functions, how many
/// bytes each digest has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HashConfig {
    /// Wire identifier, see [`HashFunction::id`].
    pub hash_function: u32,
    /// Must be zero for fixed-length functions and nonzero otherwise.
    pub output_length_bytes: u32,
}

/// Program-wide settings checked when a machine is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    /// Hash selection and declared digest length.
    pub hash_config: HashConfig,
    /// Number of inputs the program must be invoked with.
    pub expected_input_count: u32,
    /// Arity of `POP_CHILDREN_AND_HASH`. Unused by every other op.
    pub branching_factor: u32,
}

impl Metadata {
    /// Metadata for a fixed-length hash function.
    pub fn new(
        hash_function: HashFunction,
        expected_input_count: u32,
        branching_factor: u32,
    ) -> Self {
        Metadata {
            hash_config: HashConfig {
                hash_function: hash_function.id(),
                output_length_bytes: 0,
            },
            expected_input_count,
            branching_factor,
        }
    }

    /// Set the declared digest length, as extendable-output functions need.
    pub fn with_output_length(mut self, output_length_bytes: u32) -> Self {
        self.hash_config.output_length_bytes = output_length_bytes;
        self
    }

    /// The selected hash function, if the identifier is known.
    pub fn hash_function(&self) -> Result<HashFunction, ConfigError> {
        HashFunction::try_from(self.hash_config.hash_function)
    }

    /// Output-length policy of the selected hash function.
    pub fn output_length_policy(&self) -> Result<OutputLengthPolicy, ConfigError> {
        self.hash_function().map(HashFunction::policy)
    }
}

/// A single instruction.
///
/// `index` is the operand: an input index for `PUSH_INPUT`/`MATCH_INPUT` and a
/// value count for `POP_N_AND_HASH`/`PEEK_N_AND_HASH`. `payload` is only read
/// by `PUSH_BYTES`; an absent payload is the empty vector.
#[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Op {
    /// Raw opcode, see [`OpCode`].
    pub opcode: u32,
    /// Input index or value count.
    pub index: u64,
    /// Bytes pushed by `PUSH_BYTES`.
    pub payload: Vec<u8>,
}

impl Op {
    /// An op with arbitrary fields, including opcodes the machine rejects.
    pub fn raw(opcode: u32, index: u64, payload: Vec<u8>) -> Self {
        Op {
            opcode,
            index,
            payload,
        }
    }

    fn with_index(opcode: OpCode, index: u64) -> Self {
        Op::raw(opcode.into(), index, Vec::new())
    }

    /// `PUSH_INPUT index`.
    pub fn push_input(index: u64) -> Self {
        Op::with_index(OpCode::PushInput, index)
    }

    /// `PUSH_BYTES` with `payload`.
    pub fn push_bytes(payload: impl Into<Vec<u8>>) -> Self {
        Op::raw(OpCode::PushBytes.into(), 0, payload.into())
    }

    /// `POP_CHILDREN_AND_HASH`.
    pub fn pop_children_and_hash() -> Self {
        Op::with_index(OpCode::PopChildrenAndHash, 0)
    }

    /// `POP_N_AND_HASH n`.
    pub fn pop_n_and_hash(n: u64) -> Self {
        Op::with_index(OpCode::PopNAndHash, n)
    }

    /// `PEEK_N_AND_HASH n`.
    pub fn peek_n_and_hash(n: u64) -> Self {
        Op::with_index(OpCode::PeekNAndHash, n)
    }

    /// `MATCH_INPUT index`.
    pub fn match_input(index: u64) -> Self {
        Op::with_index(OpCode::MatchInput, index)
    }

    /// The decoded opcode, or the raw value if it is unknown.
    pub fn opcode(&self) -> Result<OpCode, u32> {
        OpCode::try_from(self.opcode)
    }
}

/// An immutable hash program. One program may be run by any number of
/// machines, on any number of input sets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Program {
    /// Settings shared by every op.
    pub metadata: Metadata,
    /// Instructions, run in order.
    pub ops: Vec<Op>,
}

/// Upper bound on the size of an encoded program accepted by
/// [`Program::decode_from_slice`].
pub const MAX_ENCODED_PROGRAM_BYTES: usize = 16 * 1024 * 1024;

impl Program {
    /// A program from its metadata and ops.
    pub fn new(metadata: Metadata, ops: impl Into<Vec<Op>>) -> Self {
        Program {
            metadata,
            ops: ops.into(),
        }
    }

    /// Encode to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, Error> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_no_limit();
        bincode::encode_to_vec(self, config)
            .map_err(|e| Error::Encoding(format!("unable to encode program: {}", e)))
    }

    /// Decode from bytes using bincode. Trailing bytes are rejected.
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_limit::<MAX_ENCODED_PROGRAM_BYTES>();
        let (program, read): (Self, usize) = bincode::decode_from_slice(bytes, config)
            .map_err(|e| Error::Encoding(format!("unable to decode program: {}", e)))?;
        if read != bytes.len() {
            return Err(Error::Encoding(format!(
                "unable to decode program: {} trailing bytes",
                bytes.len() - read
            )));
        }
        Ok(program)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode() {
            Ok(OpCode::PushBytes) => write!(f, "PUSH_BYTES {}", hex::encode(&self.payload)),
            Ok(OpCode::PopChildrenAndHash) => f.write_str("POP_CHILDREN_AND_HASH"),
            Ok(opcode) => write!(f, "{} {}", opcode.mnemonic(), self.index),
            Err(raw) => write!(f, "UNKNOWN({}) {}", raw, self.index),
        }
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hash_function() {
            Ok(function) => write!(f, "hash: {}", function)?,
            Err(_) => write!(f, "hash: #{}", self.hash_config.hash_function)?,
        }
        if self.hash_config.output_length_bytes != 0 {
            write!(f, " ({} bytes)", self.hash_config.output_length_bytes)?;
        }
        write!(
            f,
            ", inputs: {}, branching factor: {}",
            self.expected_input_count, self.branching_factor
        )
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.metadata)?;
        for (ip, op) in self.ops.iter().enumerate() {
            writeln!(f, "{:>4}: {}", ip, op)?;
        }
        Ok(())
    }
}
