//! The table of hash functions a program may select.
//!
//! Each entry fixes the identifier used on the wire, a display name and the
//! output-length policy. Fixed-digest functions must be declared with an
//! output length of zero; extendable-output functions must declare a nonzero
//! length, which becomes the size of every digest they produce.

use std::fmt;

use crate::{
    once_hash::{Blake3OnceHash, Blake3XofOnceHash, FixedOnceHash, OnceHasher, XofOnceHash},
    ConfigError,
};

/// Whether a hash function's digest size is intrinsic or declared by the
/// program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputLengthPolicy {
    /// The digest size is intrinsic; the declared length must be zero.
    Fixed,
    /// The digest size is the declared, nonzero length.
    Variable,
}

/// A hash function a machine can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashFunction {
    /// SHA-256, identifier 1.
    Sha256,
    /// SHAKE128, identifier 2.
    Shake128,
    /// SHAKE256, identifier 3.
    Shake256,
    /// BLAKE3, identifier 4.
    Blake3,
    /// BLAKE3 extendable output, identifier 5.
    Blake3Xof,
}

struct HashFunctionEntry {
    id: u32,
    function: HashFunction,
    name: &'static str,
    policy: OutputLengthPolicy,
    /// Intrinsic digest size; zero for variable-length functions.
    digest_size: usize,
}

// Indexed by `HashFunction as usize`. Identifier 0 is left unassigned so an
// unset field never selects a real function.
static HASH_FUNCTIONS: [HashFunctionEntry; 5] = [
    HashFunctionEntry {
        id: 1,
        function: HashFunction::Sha256,
        name: "SHA-256",
        policy: OutputLengthPolicy::Fixed,
        digest_size: 32,
    },
    HashFunctionEntry {
        id: 2,
        function: HashFunction::Shake128,
        name: "SHAKE128",
        policy: OutputLengthPolicy::Variable,
        digest_size: 0,
    },
    HashFunctionEntry {
        id: 3,
        function: HashFunction::Shake256,
        name: "SHAKE256",
        policy: OutputLengthPolicy::Variable,
        digest_size: 0,
    },
    HashFunctionEntry {
        id: 4,
        function: HashFunction::Blake3,
        name: "BLAKE3",
        policy: OutputLengthPolicy::Fixed,
        digest_size: 32,
    },
    HashFunctionEntry {
        id: 5,
        function: HashFunction::Blake3Xof,
        name: "BLAKE3-XOF",
        policy: OutputLengthPolicy::Variable,
        digest_size: 0,
    },
];

impl HashFunction {
    /// All supported functions, in identifier order.
    pub const ALL: [HashFunction; 5] = [
        HashFunction::Sha256,
        HashFunction::Shake128,
        HashFunction::Shake256,
        HashFunction::Blake3,
        HashFunction::Blake3Xof,
    ];

    fn entry(self) -> &'static HashFunctionEntry {
        &HASH_FUNCTIONS[self as usize]
    }

    /// Look up a function by its wire identifier.
    pub fn from_id(id: u32) -> Option<Self> {
        HASH_FUNCTIONS
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.function)
    }

    /// Wire identifier used in [`HashConfig`](crate::HashConfig).
    pub fn id(self) -> u32 {
        self.entry().id
    }

    /// Display name, e.g. `SHA-256`.
    pub fn name(self) -> &'static str {
        self.entry().name
    }

    /// Whether the digest size is fixed or declared by the program.
    pub fn policy(self) -> OutputLengthPolicy {
        self.entry().policy
    }

    /// Resolve the digest size for a declared output length, rejecting
    /// declarations that contradict the function's policy.
    pub fn output_size(self, declared: u32) -> Result<usize, ConfigError> {
        let entry = self.entry();
        match entry.policy {
            OutputLengthPolicy::Fixed if declared != 0 => Err(ConfigError::FixedLengthDeclared {
                name: entry.name,
                declared,
            }),
            OutputLengthPolicy::Fixed => Ok(entry.digest_size),
            OutputLengthPolicy::Variable if declared == 0 => {
                Err(ConfigError::VariableLengthMissing { name: entry.name })
            }
            OutputLengthPolicy::Variable => Ok(declared as usize),
        }
    }

    /// Build a fresh once-use hasher. `output_size` is only consulted by
    /// variable-length functions.
    pub fn once_hasher(self, output_size: usize) -> OnceHasher {
        match self {
            HashFunction::Sha256 => OnceHasher::Sha256(FixedOnceHash::new()),
            HashFunction::Blake3 => OnceHasher::Blake3(Blake3OnceHash::new()),
            HashFunction::Shake128 => OnceHasher::Shake128(XofOnceHash::new(output_size)),
            HashFunction::Shake256 => OnceHasher::Shake256(XofOnceHash::new(output_size)),
            HashFunction::Blake3Xof => OnceHasher::Blake3Xof(Blake3XofOnceHash::new(output_size)),
        }
    }
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u32> for HashFunction {
    type Error = ConfigError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        HashFunction::from_id(id).ok_or(ConfigError::UnknownHashFunction(id))
    }
}
