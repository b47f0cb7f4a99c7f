use glyphon_grammar::{LprRef, PprRef};

use crate::node::{Node, Tree};

/// A pattern tree, matched structurally against a `Tree`. Adds
/// `LooseSyntactic`, which compares a syntactic subtree by span only,
/// ignoring its internal shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternNode {
    Syntactic { ppr: PprRef, pos: usize, children: Vec<PatternNode> },
    LooseSyntactic { ppr: PprRef, pos: usize, total_len: usize },
    Lexical { lpr: LprRef, pos: usize, len: usize },
    Failure { pos: usize, len: usize },
    End { pos: usize },
    Skip { len: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Pattern {
    pub roots: Vec<PatternNode>,
}

impl Pattern {
    /// Matches `tree` against this pattern. Matching is exact lockstep
    /// structural comparison, except: `LooseSyntactic` nodes compare
    /// only name/pos/total span, `Skip` patterns consume as many
    /// consecutive `Skip` tree nodes as needed to test their summed
    /// length, and a single trailing `Abort` tree node is tolerated
    /// anywhere the pattern has already been fully satisfied (root
    /// level or inside any syntactic node).
    pub fn matches(&self, tree: &Tree) -> bool {
        match_list(&self.roots, &tree.roots)
    }
}

fn match_list(pattern: &[PatternNode], actual: &[Node]) -> bool {
    let mut cursor = 0usize;
    for p in pattern {
        match p {
            PatternNode::Skip { len } => {
                if !consume_skip(actual, &mut cursor, *len) {
                    return false;
                }
            }
            _ => {
                let Some(node) = actual.get(cursor) else { return false };
                if !match_one(p, node) {
                    return false;
                }
                cursor += 1;
            }
        }
    }
    match actual.len() - cursor {
        0 => true,
        1 => matches!(actual[cursor], Node::Abort),
        _ => false,
    }
}

fn consume_skip(actual: &[Node], cursor: &mut usize, want: usize) -> bool {
    let mut sum = 0usize;
    while let Some(Node::Skip { len }) = actual.get(*cursor) {
        sum += len;
        *cursor += 1;
    }
    sum == want
}

fn match_one(pattern: &PatternNode, node: &Node) -> bool {
    match (pattern, node) {
        (PatternNode::Syntactic { ppr, pos, children }, Node::Syntactic { ppr: a_ppr, pos: a_pos, children: a_children }) => {
            ppr == a_ppr && pos == a_pos && match_list(children, a_children)
        }
        (PatternNode::LooseSyntactic { ppr, pos, total_len }, Node::Syntactic { ppr: a_ppr, pos: a_pos, .. }) => {
            ppr == a_ppr && pos == a_pos && *total_len == node.total_len()
        }
        (PatternNode::Lexical { lpr, pos, len }, Node::Lexical { lpr: a_lpr, pos: a_pos, len: a_len }) => {
            lpr == a_lpr && pos == a_pos && len == a_len
        }
        (PatternNode::Failure { pos, len }, Node::Failure { pos: a_pos, len: a_len }) => pos == a_pos && len == a_len,
        (PatternNode::End { pos }, Node::End { pos: a_pos }) => pos == a_pos,
        _ => false,
    }
}

struct OpenFrame {
    ppr: PprRef,
    pos: usize,
    children: Vec<PatternNode>,
}

/// Mirrors `TreeBuilder`'s fluent API, with `loose_syntactic` added as
/// a sealed leaf (it takes its span up front and is never opened, per
/// `parse_tree_pattern_tests.cpp`'s sealed-on-construction behavior).
#[derive(Default)]
pub struct PatternBuilder {
    stack: Vec<OpenFrame>,
    roots: Vec<PatternNode>,
}

impl PatternBuilder {
    pub fn new() -> Self {
        PatternBuilder::default()
    }

    fn attach(&mut self, node: PatternNode) -> &mut Self {
        match self.stack.last_mut() {
            Some(frame) => frame.children.push(node),
            None => self.roots.push(node),
        }
        self
    }

    pub fn syntactic(&mut self, ppr: PprRef, pos: usize) -> &mut Self {
        self.stack.push(OpenFrame { ppr, pos, children: Vec::new() });
        self
    }

    pub fn loose_syntactic(&mut self, ppr: PprRef, pos: usize, total_len: usize) -> &mut Self {
        self.attach(PatternNode::LooseSyntactic { ppr, pos, total_len })
    }

    pub fn lexical(&mut self, lpr: LprRef, pos: usize, len: usize) -> &mut Self {
        self.attach(PatternNode::Lexical { lpr, pos, len })
    }

    pub fn failure(&mut self, pos: usize, len: usize) -> &mut Self {
        self.attach(PatternNode::Failure { pos, len })
    }

    pub fn end(&mut self, pos: usize) -> &mut Self {
        self.attach(PatternNode::End { pos })
    }

    pub fn skip(&mut self, len: usize) -> &mut Self {
        self.attach(PatternNode::Skip { len })
    }

    pub fn close(&mut self) -> &mut Self {
        let frame = self.stack.pop().expect("close with no open syntactic node");
        let node = PatternNode::Syntactic { ppr: frame.ppr, pos: frame.pos, children: frame.children };
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
        self
    }

    pub fn finish(mut self) -> Pattern {
        while !self.stack.is_empty() {
            self.close();
        }
        Pattern { roots: self.roots }
    }
}
