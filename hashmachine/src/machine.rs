//! The hash machine: a stack interpreter for [`Program`]s.
//!
//! A machine is built for one (program, inputs) pair, stepped until every op
//! has run and then consumed by [`Machine::output`]. Stack values borrow from
//! the program payloads and the inputs where they can; only digests are owned.
//!
//! Every hashing op resets the hasher first and writes values in the order
//! they leave the stack: the most recently pushed value is written first.

use std::borrow::Cow;

use tracing::{debug, trace};

use crate::{
    once_hash::{OnceHash, OnceHasher},
    ConfigError, Error, HashFunction, OpCode, Program, ProgramError, Result,
};

/// Where a machine is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    /// No op has run yet.
    Ready,
    /// Some, but not all, ops have run.
    Running,
    /// Every op has run. Further steps fail.
    Halted,
}

/// Executes a [`Program`] against a fixed list of inputs.
#[derive(Debug)]
pub struct Machine<'a> {
    program: &'a Program,
    inputs: &'a [Vec<u8>],
    hash_function: HashFunction,
    ip: usize,
    hasher: OnceHasher,
    stack: Vec<Cow<'a, [u8]>>,
}

impl<'a> Machine<'a> {
    /// Validate `program`'s metadata against `inputs` and select its hash.
    ///
    /// Checks, in order: the input count, the hash function identifier and the
    /// declared output length.
    pub fn new(program: &'a Program, inputs: &'a [Vec<u8>]) -> Result<Self> {
        let metadata = &program.metadata;
        if metadata.expected_input_count as usize != inputs.len() {
            return Err(ConfigError::InputCountMismatch {
                expected: metadata.expected_input_count,
                actual: inputs.len(),
            }
            .into());
        }
        let hash_function = metadata.hash_function()?;
        let output_size = hash_function.output_size(metadata.hash_config.output_length_bytes)?;

        debug!(
            hash_function = %hash_function,
            output_size,
            inputs = inputs.len(),
            ops = program.ops.len(),
            "hash machine constructed"
        );

        Ok(Machine {
            program,
            inputs,
            hash_function,
            ip: 0,
            hasher: hash_function.once_hasher(output_size),
            stack: Vec::new(),
        })
    }

    /// The hash function selected at construction.
    pub fn hash_function(&self) -> HashFunction {
        self.hash_function
    }

    /// Index of the next op to run.
    pub fn ip(&self) -> usize {
        self.ip
    }

    /// Number of values currently on the stack.
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Where the machine is in its run.
    pub fn state(&self) -> MachineState {
        if self.is_done() {
            MachineState::Halted
        } else if self.ip == 0 {
            MachineState::Ready
        } else {
            MachineState::Running
        }
    }

    /// Whether every op has run.
    pub fn is_done(&self) -> bool {
        self.ip >= self.program.ops.len()
    }

    /// Run the op at `ip` and advance `ip` by one, whether or not the op
    /// succeeds.
    pub fn step(&mut self) -> Result<()> {
        let program: &'a Program = self.program;
        let op = program
            .ops
            .get(self.ip)
            .ok_or(ProgramError::AdvancedPastEnd)?;
        trace!(
            ip = self.ip,
            opcode = op.opcode,
            operand = op.index,
            stack_depth = self.stack.len(),
            "step"
        );
        self.ip += 1;

        match op.opcode() {
            Err(raw) => Err(ProgramError::UnknownOpcode(raw).into()),
            Ok(OpCode::PushInput) => {
                let input = self.input(op.index)?;
                self.stack.push(Cow::Borrowed(input));
                Ok(())
            }
            Ok(OpCode::PushBytes) => {
                self.stack.push(Cow::Borrowed(op.payload.as_slice()));
                Ok(())
            }
            Ok(OpCode::PopChildrenAndHash) => {
                let branching_factor = program.metadata.branching_factor;
                if branching_factor < 1 {
                    return Err(ProgramError::BadBranchingFactor(branching_factor).into());
                }
                self.pop_and_hash(branching_factor as u64)
            }
            Ok(OpCode::PopNAndHash) => self.pop_and_hash(op.index),
            Ok(OpCode::PeekNAndHash) => self.peek_and_hash(op.index),
            Ok(OpCode::MatchInput) => {
                let expected = self.input(op.index)?;
                let value = self.stack.pop().ok_or(ProgramError::StackUnderflow {
                    needed: 1,
                    found: 0,
                })?;
                if *value != *expected {
                    return Err(Error::ValueMismatch {
                        index: op.index,
                        value: value.into_owned(),
                        expected: expected.to_vec(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Step until every op has run, stopping at the first error.
    pub fn run(&mut self) -> Result<()> {
        while !self.is_done() {
            if let Err(error) = self.step() {
                debug!(ip = self.ip - 1, %error, "hash program failed");
                return Err(error);
            }
        }
        Ok(())
    }

    /// Consume the machine and return the single value left on the stack.
    pub fn output(mut self) -> Result<Vec<u8>> {
        let depth = self.stack.len();
        match self.stack.pop() {
            Some(value) if depth == 1 => Ok(value.into_owned()),
            _ => Err(ProgramError::FinalStackSize(depth).into()),
        }
    }

    /// Inputs are bounded by the declared count first, then by the actual
    /// list. The second check only fails for a machine whose inputs were
    /// swapped after construction.
    fn input(&self, index: u64) -> Result<&'a [u8]> {
        let expected_input_count = self.program.metadata.expected_input_count;
        if index >= expected_input_count as u64 {
            return Err(ProgramError::InputIndexOutOfBounds {
                index,
                expected_input_count,
            }
            .into());
        }
        let inputs: &'a [Vec<u8>] = self.inputs;
        usize::try_from(index)
            .ok()
            .and_then(|i| inputs.get(i))
            .map(Vec::as_slice)
            .ok_or_else(|| {
                ProgramError::InputMissing {
                    index,
                    input_count: inputs.len(),
                }
                .into()
            })
    }

    fn require_depth(&self, needed: u64) -> Result<usize> {
        let found = self.stack.len();
        if (found as u64) < needed {
            return Err(ProgramError::StackUnderflow { needed, found }.into());
        }
        Ok(needed as usize)
    }

    fn pop_and_hash(&mut self, n: u64) -> Result<()> {
        let n = self.require_depth(n)?;
        let popped = self.stack.split_off(self.stack.len() - n);
        self.hasher.reset();
        for value in popped.iter().rev() {
            self.hasher.write(value);
        }
        self.push_digest();
        Ok(())
    }

    fn peek_and_hash(&mut self, n: u64) -> Result<()> {
        let n = self.require_depth(n)?;
        let top = self.stack.len() - n;
        self.hasher.reset();
        for value in self.stack[top..].iter().rev() {
            self.hasher.write(value);
        }
        self.push_digest();
        Ok(())
    }

    fn push_digest(&mut self) {
        let digest = self.hasher.sum();
        self.stack.push(Cow::Owned(digest));
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::{Metadata, Op};

    fn sha256(parts: &[&[u8]]) -> Vec<u8> {
        let mut hasher = HashFunction::Sha256.once_hasher(32);
        for part in parts {
            hasher.write(part);
        }
        hasher.sum()
    }

    #[test]
    fn states_follow_ip() {
        let program = Program::new(
            Metadata::new(HashFunction::Sha256, 0, 0),
            [Op::push_bytes(b"x".to_vec()), Op::pop_n_and_hash(1)],
        );
        let mut machine = Machine::new(&program, &[]).expect("valid metadata");
        assert_eq!(machine.state(), MachineState::Ready);
        machine.step().expect("push");
        assert_eq!(machine.state(), MachineState::Running);
        assert_eq!(machine.ip(), 1);
        machine.step().expect("hash");
        assert_eq!(machine.state(), MachineState::Halted);
        assert!(machine.is_done());
        assert_matches!(
            machine.step(),
            Err(Error::Program(ProgramError::AdvancedPastEnd))
        );
        assert_eq!(machine.ip(), 2);
    }

    #[test]
    fn empty_program_is_halted_and_has_no_output() {
        let program = Program::new(Metadata::new(HashFunction::Sha256, 0, 0), []);
        let machine = Machine::new(&program, &[]).expect("valid metadata");
        assert_eq!(machine.state(), MachineState::Halted);
        assert_matches!(
            machine.output(),
            Err(Error::Program(ProgramError::FinalStackSize(0)))
        );
    }

    #[test]
    fn peek_leaves_operands_in_place() {
        let program = Program::new(
            Metadata::new(HashFunction::Sha256, 0, 0),
            [
                Op::push_bytes(b"x".to_vec()),
                Op::push_bytes(b"y".to_vec()),
                Op::peek_n_and_hash(2),
            ],
        );
        let mut machine = Machine::new(&program, &[]).expect("valid metadata");
        machine.run().expect("run");
        assert_eq!(machine.stack_len(), 3);
        assert_eq!(&machine.stack[2][..], sha256(&[b"y", b"x"]).as_slice());
        assert_eq!(&machine.stack[1][..], b"y");
        assert_eq!(&machine.stack[0][..], b"x");
    }

    #[test]
    fn zero_count_hashes_the_empty_string() {
        let program = Program::new(
            Metadata::new(HashFunction::Sha256, 0, 0),
            [Op::pop_n_and_hash(0)],
        );
        let mut machine = Machine::new(&program, &[]).expect("valid metadata");
        machine.run().expect("run");
        assert_eq!(machine.output().expect("one value"), sha256(&[]));
    }

    #[test]
    fn pop_children_uses_branching_factor() {
        let program = Program::new(
            Metadata::new(HashFunction::Sha256, 0, 3),
            [
                Op::push_bytes(b"x".to_vec()),
                Op::push_bytes(b"y".to_vec()),
                Op::push_bytes(b"z".to_vec()),
                Op::pop_children_and_hash(),
            ],
        );
        let mut machine = Machine::new(&program, &[]).expect("valid metadata");
        machine.run().expect("run");
        assert_eq!(machine.output().expect("one value"), sha256(&[b"z", b"y", b"x"]));
    }

    #[test]
    fn pop_children_rejects_zero_branching_factor() {
        let program = Program::new(
            Metadata::new(HashFunction::Sha256, 0, 0),
            [Op::push_bytes(b"x".to_vec()), Op::pop_children_and_hash()],
        );
        let mut machine = Machine::new(&program, &[]).expect("valid metadata");
        machine.step().expect("push");
        assert_matches!(
            machine.step(),
            Err(Error::Program(ProgramError::BadBranchingFactor(0)))
        );
    }

    #[test]
    fn match_input_on_empty_stack_underflows() {
        let inputs = vec![b"a".to_vec()];
        let program = Program::new(
            Metadata::new(HashFunction::Sha256, 1, 0),
            [Op::match_input(0)],
        );
        let mut machine = Machine::new(&program, &inputs).expect("valid metadata");
        assert_matches!(
            machine.step(),
            Err(Error::Program(ProgramError::StackUnderflow {
                needed: 1,
                found: 0
            }))
        );
    }

    #[test]
    fn extendable_output_digests_have_declared_length() {
        let program = Program::new(
            Metadata::new(HashFunction::Shake256, 0, 2).with_output_length(64),
            [
                Op::push_bytes(b"b".to_vec()),
                Op::push_bytes(b"a".to_vec()),
                Op::pop_children_and_hash(),
            ],
        );
        let mut machine = Machine::new(&program, &[]).expect("valid metadata");
        machine.run().expect("run");
        assert_eq!(
            hex::encode(machine.output().expect("one value")),
            "effb6ac214e5d8dbd7e15272e8ed64565fa4a0feda65f13f2fe38f1c24e11fa8c837e99c2437afc571e9\
             ca38dee96998eb3ffde353b5dad6a49360f5871353c2"
        );
    }

    #[test]
    fn short_input_list_is_reported_as_missing() {
        let inputs = vec![b"a".to_vec(), b"b".to_vec()];
        let program = Program::new(
            Metadata::new(HashFunction::Sha256, 2, 0),
            [Op::push_input(0), Op::push_input(1)],
        );
        let mut machine = Machine::new(&program, &inputs).expect("valid metadata");
        machine.inputs = &inputs[..1];
        machine.step().expect("input 0 is present");
        assert_matches!(
            machine.step(),
            Err(Error::Program(ProgramError::InputMissing {
                index: 1,
                input_count: 1
            }))
        );
        assert_eq!(machine.stack_len(), 1);
    }

    #[test]
    fn blake3_programs_run_through_the_machine() {
        let program = Program::new(
            Metadata::new(HashFunction::Blake3, 0, 2),
            [
                Op::push_bytes(b"b".to_vec()),
                Op::push_bytes(b"a".to_vec()),
                Op::pop_children_and_hash(),
            ],
        );
        let mut machine = Machine::new(&program, &[]).expect("valid metadata");
        machine.run().expect("run");
        assert_eq!(
            machine.output().expect("one value"),
            blake3::hash(b"ab").as_bytes().to_vec()
        );

        let program = Program::new(
            Metadata::new(HashFunction::Blake3Xof, 0, 0).with_output_length(48),
            [
                Op::push_bytes(b"x".to_vec()),
                Op::pop_n_and_hash(1),
                Op::push_bytes(b"y".to_vec()),
                Op::pop_n_and_hash(2),
            ],
        );
        let mut machine = Machine::new(&program, &[]).expect("valid metadata");
        machine.run().expect("run");

        let xof = |data: &[u8]| {
            let mut out = [0u8; 48];
            let mut hasher = blake3::Hasher::new();
            hasher.update(data);
            hasher.finalize_xof().fill(&mut out);
            out.to_vec()
        };
        let inner = xof(b"x".as_slice());
        let outer = xof(&[b"y".as_slice(), inner.as_slice()].concat());
        assert_eq!(machine.output().expect("one value"), outer);
    }

    #[test]
    fn failed_step_still_advances_ip() {
        let program = Program::new(
            Metadata::new(HashFunction::Sha256, 0, 0),
            [Op::raw(0, 0, Vec::new()), Op::push_bytes(b"x".to_vec())],
        );
        let mut machine = Machine::new(&program, &[]).expect("valid metadata");
        assert_matches!(
            machine.step(),
            Err(Error::Program(ProgramError::UnknownOpcode(0)))
        );
        assert_eq!(machine.ip(), 1);
        assert_eq!(machine.state(), MachineState::Running);
    }
}
