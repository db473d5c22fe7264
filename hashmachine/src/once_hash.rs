//! Hashes that can be summed only once per reset.
//!
//! [`OnceHash`] is the common denominator of fixed-output digests (SHA-256,
//! BLAKE3) and extendable-output functions (SHAKE, BLAKE3 XOF). An XOF has no
//! natural digest size, so its wrapper is built with the output length it must
//! squeeze on every `sum`. The RustCrypto functions go through the `digest`
//! traits; BLAKE3 is driven through `blake3::Hasher` directly.
//!
//! After `sum` the only legal call is `reset`. A second `write` or `sum` is an
//! interpreter bug and panics instead of surfacing as an
//! [`Error`](crate::Error). Fixed-output and XOF wrappers enforce the same
//! contract.
//!
//! None of these types are meant to be shared between threads while in use.

use std::fmt;

use digest::{Digest, ExtendableOutputReset, FixedOutputReset, Reset, Update, XofReader};
use sha2::Sha256;
use sha3::{Shake128, Shake256};

/// A hash usable for exactly one write/sum cycle between resets.
pub trait OnceHash {
    /// Absorb `data`.
    ///
    /// # Panics
    ///
    /// If called after [`sum`](Self::sum) without an intervening
    /// [`reset`](Self::reset).
    fn write(&mut self, data: &[u8]);

    /// Return the digest of everything written since the last reset.
    ///
    /// # Panics
    ///
    /// If called twice without an intervening [`reset`](Self::reset).
    fn sum(&mut self) -> Vec<u8>;

    /// Clear the state and re-arm the hash for one more use.
    fn reset(&mut self);

    /// Length in bytes of the value returned by [`sum`](Self::sum).
    fn size(&self) -> usize;
}

#[derive(Debug, Clone, Default)]
struct UseGuard {
    summed: bool,
}

impl UseGuard {
    fn ensure_armed(&self) {
        if self.summed {
            panic!("OnceHash: cannot be used after calling sum, must be reset");
        }
    }
}

/// [`OnceHash`] over a fixed-output digest.
#[derive(Debug, Clone, Default)]
pub struct FixedOnceHash<D> {
    hasher: D,
    guard: UseGuard,
}

impl<D: Digest> FixedOnceHash<D> {
    /// A fresh, armed hash.
    pub fn new() -> Self {
        FixedOnceHash {
            hasher: D::new(),
            guard: UseGuard::default(),
        }
    }
}

impl<D: Digest + FixedOutputReset> OnceHash for FixedOnceHash<D> {
    fn write(&mut self, data: &[u8]) {
        self.guard.ensure_armed();
        Digest::update(&mut self.hasher, data);
    }

    fn sum(&mut self) -> Vec<u8> {
        self.guard.ensure_armed();
        self.guard.summed = true;
        Digest::finalize_reset(&mut self.hasher).to_vec()
    }

    fn reset(&mut self) {
        self.guard.summed = false;
        Digest::reset(&mut self.hasher);
    }

    fn size(&self) -> usize {
        <D as Digest>::output_size()
    }
}

/// [`OnceHash`] over an extendable-output function, squeezing a fixed number
/// of bytes per `sum`.
#[derive(Debug, Clone)]
pub struct XofOnceHash<X> {
    hasher: X,
    output_length: usize,
    guard: UseGuard,
}

impl<X: Default> XofOnceHash<X> {
    /// A fresh, armed hash squeezing `output_length` bytes per `sum`.
    pub fn new(output_length: usize) -> Self {
        XofOnceHash {
            hasher: X::default(),
            output_length,
            guard: UseGuard::default(),
        }
    }
}

impl<X: Default + Update + ExtendableOutputReset> OnceHash for XofOnceHash<X> {
    fn write(&mut self, data: &[u8]) {
        self.guard.ensure_armed();
        Update::update(&mut self.hasher, data);
    }

    fn sum(&mut self) -> Vec<u8> {
        self.guard.ensure_armed();
        self.guard.summed = true;
        let mut out = vec![0u8; self.output_length];
        self.hasher.finalize_xof_reset().read(&mut out);
        out
    }

    fn reset(&mut self) {
        self.guard.summed = false;
        Reset::reset(&mut self.hasher);
    }

    fn size(&self) -> usize {
        self.output_length
    }
}

/// [`OnceHash`] over BLAKE3 with its native 32-byte digest.
#[derive(Debug, Clone, Default)]
pub struct Blake3OnceHash {
    hasher: blake3::Hasher,
    guard: UseGuard,
}

impl Blake3OnceHash {
    /// A fresh, armed hash.
    pub fn new() -> Self {
        Self::default()
    }
}

impl OnceHash for Blake3OnceHash {
    fn write(&mut self, data: &[u8]) {
        self.guard.ensure_armed();
        self.hasher.update(data);
    }

    fn sum(&mut self) -> Vec<u8> {
        self.guard.ensure_armed();
        self.guard.summed = true;
        self.hasher.finalize().as_bytes().to_vec()
    }

    fn reset(&mut self) {
        self.guard.summed = false;
        self.hasher.reset();
    }

    fn size(&self) -> usize {
        blake3::OUT_LEN
    }
}

/// [`OnceHash`] over the BLAKE3 extendable output.
#[derive(Debug, Clone)]
pub struct Blake3XofOnceHash {
    hasher: blake3::Hasher,
    output_length: usize,
    guard: UseGuard,
}

impl Blake3XofOnceHash {
    /// A fresh, armed hash squeezing `output_length` bytes per `sum`.
    pub fn new(output_length: usize) -> Self {
        Blake3XofOnceHash {
            hasher: blake3::Hasher::new(),
            output_length,
            guard: UseGuard::default(),
        }
    }
}

impl OnceHash for Blake3XofOnceHash {
    fn write(&mut self, data: &[u8]) {
        self.guard.ensure_armed();
        self.hasher.update(data);
    }

    fn sum(&mut self) -> Vec<u8> {
        self.guard.ensure_armed();
        self.guard.summed = true;
        let mut out = vec![0u8; self.output_length];
        self.hasher.finalize_xof().fill(&mut out);
        out
    }

    fn reset(&mut self) {
        self.guard.summed = false;
        self.hasher.reset();
    }

    fn size(&self) -> usize {
        self.output_length
    }
}

/// The closed set of once-use hashes a machine can drive.
///
/// Built from a [`HashFunction`](crate::HashFunction) when the machine is
/// constructed.
#[derive(Clone)]
pub enum OnceHasher {
    /// SHA-256.
    Sha256(FixedOnceHash<Sha256>),
    /// BLAKE3, 32-byte digests.
    Blake3(Blake3OnceHash),
    /// SHAKE128 at the declared length.
    Shake128(XofOnceHash<Shake128>),
    /// SHAKE256 at the declared length.
    Shake256(XofOnceHash<Shake256>),
    /// BLAKE3 extendable output at the declared length.
    Blake3Xof(Blake3XofOnceHash),
}

impl fmt::Debug for OnceHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OnceHasher::Sha256(_) => "Sha256",
            OnceHasher::Blake3(_) => "Blake3",
            OnceHasher::Shake128(_) => "Shake128",
            OnceHasher::Shake256(_) => "Shake256",
            OnceHasher::Blake3Xof(_) => "Blake3Xof",
        };
        f.debug_struct("OnceHasher")
            .field("function", &name)
            .field("size", &self.size())
            .finish()
    }
}

impl OnceHash for OnceHasher {
    fn write(&mut self, data: &[u8]) {
        match self {
            OnceHasher::Sha256(h) => h.write(data),
            OnceHasher::Blake3(h) => h.write(data),
            OnceHasher::Shake128(h) => h.write(data),
            OnceHasher::Shake256(h) => h.write(data),
            OnceHasher::Blake3Xof(h) => h.write(data),
        }
    }

    fn sum(&mut self) -> Vec<u8> {
        match self {
            OnceHasher::Sha256(h) => h.sum(),
            OnceHasher::Blake3(h) => h.sum(),
            OnceHasher::Shake128(h) => h.sum(),
            OnceHasher::Shake256(h) => h.sum(),
            OnceHasher::Blake3Xof(h) => h.sum(),
        }
    }

    fn reset(&mut self) {
        match self {
            OnceHasher::Sha256(h) => h.reset(),
            OnceHasher::Blake3(h) => h.reset(),
            OnceHasher::Shake128(h) => h.reset(),
            OnceHasher::Shake256(h) => h.reset(),
            OnceHasher::Blake3Xof(h) => h.reset(),
        }
    }

    fn size(&self) -> usize {
        match self {
            OnceHasher::Sha256(h) => h.size(),
            OnceHasher::Blake3(h) => h.size(),
            OnceHasher::Shake128(h) => h.size(),
            OnceHasher::Shake256(h) => h.size(),
            OnceHasher::Blake3Xof(h) => h.size(),
        }
    }
}
