//! Hash machine: Merkle proofs as programs.
//!
//! Inclusion proofs, consistency proofs and digest recomputation are all
//! written as short stack programs over a single hash function. One
//! interpreter checks every shape, so verifiers never need per-proof code.
//!
//! # Core types
//!
//! - [`Program`]: metadata plus an ordered list of [`Op`]s.
//! - [`Machine`]: executes a program one op at a time.
//! - [`verify`] / [`verify_with_output`]: run a program to completion and
//!   compare its output with an expected digest.
//! - [`OnceHash`]: the write/sum/reset hash contract the machine drives.
//!
//! # Example
//!
//! ```
//! use hashmachine::{verify, HashFunction, Metadata, Op, Program};
//!
//! // sha256("a" || "b"): the value pushed last is hashed first.
//! let program = Program::new(
//!     Metadata::new(HashFunction::Sha256, 2, 2),
//!     [Op::push_input(1), Op::push_input(0), Op::pop_children_and_hash()],
//! );
//! let root =
//!     hex::decode("fb8e20fc2e4c3f248c60c39bd652f3c1347298bb977b8b4d5903b85055620603").unwrap();
//! assert!(verify(&program, &[b"a".to_vec(), b"b".to_vec()], &root).unwrap());
//! ```
//!
//! Programs from untrusted sources should be bounded in length by the caller;
//! the machine runs whatever it is given.

#![warn(missing_docs)]

mod error;
/// The supported hash functions and their output-length policies.
pub mod hash_function;
mod machine;
/// Write/sum/reset hashes that may be summed once per reset.
pub mod once_hash;
mod program;
#[cfg(test)]
mod tests;
mod verify;

pub use error::{ConfigError, Error, ProgramError, Result};
pub use hash_function::{HashFunction, OutputLengthPolicy};
pub use machine::{Machine, MachineState};
pub use once_hash::{OnceHash, OnceHasher};
pub use program::{HashConfig, Metadata, Op, OpCode, Program, MAX_ENCODED_PROGRAM_BYTES};
pub use verify::{verify, verify_with_output};
