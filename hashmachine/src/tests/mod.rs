
use crate::{HashFunction, Metadata, Op, Program};

// The fixtures use the following SHA-256 tree, where leaves are the
// corresponding letter and every internal node is sha256(left || right).
//
//         ---- o ----
//       /             \
//       g              n
//      /  \           /  \
//    /     \         /    \
//    c      f       j     m
//   / \    / \     / \   / \
//   a  b  d   e   h   i k   l

pub(crate) const C: &str = "fb8e20fc2e4c3f248c60c39bd652f3c1347298bb977b8b4d5903b85055620603";
pub(crate) const F: &str = "959a45d44e6fcf58361ed004681556fe50129f2109e817dec098c00c9e5d2578";
pub(crate) const J: &str = "8f434346648f6b96df89dda901c5176b10a6d83961dd3c1ac88b59b2dc327aa4";
pub(crate) const M: &str = "d3f3fa6892497db10a2417fce9b553464cc5d07718419de8b67e73e460c7daab";
pub(crate) const G: &str = "ab1682a685c30fb608f2ddb0037b611462166e370f7a9b843bd9f24785f43f84";
pub(crate) const N: &str = "a7d5b5be6d095e4f086a893b350914be9685a9da900ff39772fae093c02856c1";
pub(crate) const O: &str = "b0c95d586349baf86db2fb3e489e5b72526a573d70f1882fe9a2cb7590c47ff2";

/// Decode a hex fixture.
pub(crate) fn h(hex_str: &str) -> Vec<u8> {
    hex::decode(hex_str).expect("fixture is valid hex")
}

pub(crate) fn leaf(name: &str) -> Vec<u8> {
    name.as_bytes().to_vec()
}

/// Hashes two inputs: pushes input 1, then input 0, then pops both.
pub(crate) fn hash_pair() -> Program {
    Program::new(
        Metadata::new(HashFunction::Sha256, 2, 2),
        [
            Op::push_input(1),
            Op::push_input(0),
            Op::pop_children_and_hash(),
        ],
    )
}

/// Proves leaf `b` (input 0) is in the tree rooted at `o`.
pub(crate) fn b_in_o() -> Program {
    Program::new(
        Metadata::new(HashFunction::Sha256, 1, 2),
        [
            Op::push_bytes(h(N)),
            Op::push_bytes(h(F)),
            Op::push_input(0),
            Op::push_bytes(leaf("a")),
            Op::pop_n_and_hash(2),
            Op::pop_n_and_hash(2),
            Op::pop_n_and_hash(2),
        ],
    )
}

/// Proves leaf `j` (input 0) is in the tree rooted at `o`.
pub(crate) fn j_in_o() -> Program {
    Program::new(
        Metadata::new(HashFunction::Sha256, 1, 2),
        [
            Op::push_bytes(h(M)),
            Op::push_input(0),
            Op::pop_children_and_hash(),
            Op::push_bytes(h(G)),
            Op::pop_children_and_hash(),
        ],
    )
}

/// Proves leaves `b` (input 0) and `j` (input 1) are both in the tree rooted
/// at `o`.
pub(crate) fn b_and_j_in_o() -> Program {
    Program::new(
        Metadata::new(HashFunction::Sha256, 2, 2),
        [
            Op::push_bytes(h(M)),
            Op::push_input(1),
            Op::pop_children_and_hash(),
            Op::push_bytes(h(F)),
            Op::push_input(0),
            Op::push_bytes(leaf("a")),
            Op::pop_children_and_hash(),
            Op::pop_children_and_hash(),
            Op::pop_children_and_hash(),
        ],
    )
}
