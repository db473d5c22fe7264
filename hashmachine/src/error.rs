use thiserror::Error;

/// Alias for `core::result::Result<T, Error>`.
pub type Result<T> = core::result::Result<T, Error>;

/// Rejections raised while constructing a machine, before any op runs.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    /// The number of inputs differs from the declared count.
    #[error("invalid input count: program expected {expected}, got {actual}")]
    InputCountMismatch { expected: u32, actual: usize },
    /// No hash function has this identifier.
    #[error("unknown hash function: {0}")]
    UnknownHashFunction(u32),
    /// A fixed-length function was given a nonzero output length.
    #[error("fixed-length hash function '{name}' has non-zero output length {declared}")]
    FixedLengthDeclared { name: &'static str, declared: u32 },
    /// A variable-length function was given a zero output length.
    #[error("variable-length hash function '{name}' has zero output length")]
    VariableLengthMissing { name: &'static str },
}

/// A malformed instruction stream, detected while stepping or reading output.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ProgramError {
    /// The op's opcode is not one the machine runs.
    #[error("invalid program: unknown opcode {0}")]
    UnknownOpcode(u32),
    /// An op names an input at or past the declared input count.
    #[error(
        "invalid program: input index out of bounds {index}, program's expected input count \
         {expected_input_count}"
    )]
    InputIndexOutOfBounds {
        index: u64,
        expected_input_count: u32,
    },
    /// The declared input exists but the input list is shorter.
    #[error(
        "invalid invocation: program expected input at index {index}, invoked with {input_count} \
         total inputs"
    )]
    InputMissing { index: u64, input_count: usize },
    /// An op needs more values than the stack holds.
    #[error("invalid program: stack underflow, expected at least {needed} values, found {found}")]
    StackUnderflow { needed: u64, found: usize },
    /// `POP_CHILDREN_AND_HASH` with a branching factor of zero.
    #[error("bad branching factor in metadata: {0}")]
    BadBranchingFactor(u32),
    /// The run did not leave exactly one value.
    #[error("invalid program: expected one output on stack, stack size: {0}")]
    FinalStackSize(usize),
    /// `step` was called on a halted machine.
    #[error("ip advanced past end of program")]
    AdvancedPastEnd,
}

/// Crate-level error covering every recoverable failure of a hash program.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// Metadata rejected at construction.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Malformed instruction stream.
    #[error(transparent)]
    Program(#[from] ProgramError),
    /// A `MATCH_INPUT` op popped a value that differs from the named input.
    /// This is a failed proof rather than a malformed one.
    #[error(
        "value ({}) does not match input {index} ({})",
        hex::encode(.value),
        hex::encode(.expected)
    )]
    ValueMismatch {
        /// Input index named by the op.
        index: u64,
        /// Value popped from the stack.
        value: Vec<u8>,
        /// The input it was compared with.
        expected: Vec<u8>,
    },
    /// A program could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(String),
}
