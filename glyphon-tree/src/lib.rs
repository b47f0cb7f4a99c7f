//! The parse tree produced by a parser run, plus a pattern matcher for
//! asserting on its shape in tests.
//!
//! Grounded on `original_source/tests/node_assembler_tests.cpp` for
//! the fluent builder shape (open/attach/close instead of constructing
//! a tree value up front) and `original_source/tests/parse_tree_pattern_tests.cpp`
//! for matching semantics (`loose_syntactic` span-only subtrees,
//! `skip(n)` matching the sum of contiguous skip leaves, and tolerance
//! for one trailing `abort` beyond an otherwise-matched prefix).

mod node;
mod pattern;

pub use node::{Node, Tree, TreeBuilder};
pub use pattern::{Pattern, PatternBuilder, PatternNode};

#[cfg(test)]
mod tests;
