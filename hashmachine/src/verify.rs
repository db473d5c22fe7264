//! Verification entry points.
//!
//! A program either reduces to exactly one digest or fails; nothing in
//! between is observable. An output that differs from the expected digest is
//! a failed proof and is reported as `Ok(false)`, while malformed programs and
//! bad metadata are errors.

use tracing::debug;

use crate::{Machine, Program, Result};

/// Run `program` on `inputs` and compare its output to `expected`.
///
/// Returns whether the output matched, along with the output itself.
pub fn verify_with_output(
    program: &Program,
    inputs: &[Vec<u8>],
    expected: &[u8],
) -> Result<(bool, Vec<u8>)> {
    let mut machine = Machine::new(program, inputs)?;
    machine.run()?;
    let output = machine.output()?;
    let ok = output == expected;
    debug!(ok, output = %hex::encode(&output), "hash program verified");
    Ok((ok, output))
}

/// Run `program` on `inputs` and report whether its output equals
/// `expected`.
pub fn verify(program: &Program, inputs: &[Vec<u8>], expected: &[u8]) -> Result<bool> {
    verify_with_output(program, inputs, expected).map(|(ok, _)| ok)
}
