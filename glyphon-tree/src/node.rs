use std::fmt;

use glyphon_grammar::{LprRef, PprRef};

/// One node of a parse tree. Strictly tree-shaped: no sharing, no
/// cycles, every `Syntactic` node owns its children outright.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Syntactic { ppr: PprRef, pos: usize, children: Vec<Node> },
    Lexical { lpr: LprRef, pos: usize, len: usize },
    Failure { pos: usize, len: usize },
    End { pos: usize },
    Skip { len: usize },
    Abort,
}

impl Node {
    pub fn pos(&self) -> usize {
        match self {
            Node::Syntactic { pos, .. } => *pos,
            Node::Lexical { pos, .. } => *pos,
            Node::Failure { pos, .. } => *pos,
            Node::End { pos } => *pos,
            Node::Skip { .. } | Node::Abort => 0,
        }
    }

    /// Sum of lexical/failure/skip lengths under this node, ignoring
    /// nested syntactic structure. Used by `loose_syntactic` pattern
    /// matching to compare span coverage without caring about shape.
    pub fn total_len(&self) -> usize {
        match self {
            Node::Syntactic { children, .. } => children.iter().map(Node::total_len).sum(),
            Node::Lexical { len, .. } => *len,
            Node::Failure { len, .. } => *len,
            Node::Skip { len } => *len,
            Node::End { .. } | Node::Abort => 0,
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            write!(f, "    ")?;
        }
        match self {
            Node::Syntactic { ppr, pos, children } => {
                writeln!(f, "{}@{pos}", ppr.name())?;
                for child in children {
                    child.write_indented(f, depth + 1)?;
                }
                Ok(())
            }
            Node::Lexical { lpr, pos, len } => writeln!(f, "{}@{pos}..{}", lpr.name(), pos + len),
            Node::Failure { pos, len } => writeln!(f, "failure@{pos}..{}", pos + len),
            Node::End { pos } => writeln!(f, "end@{pos}"),
            Node::Skip { len } => writeln!(f, "skip({len})"),
            Node::Abort => writeln!(f, "abort"),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

/// A completed parse tree. Ordinarily a single `Syntactic` root (every
/// parser run begins by opening the entry rule), but the builder also
/// allows a bare sequence of top-level leaves, matching
/// `node_assembler_tests.cpp`'s lexical/failure/end-only trees.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Tree {
    pub roots: Vec<Node>,
}

impl Tree {
    /// The single root, for the common case of a parser-produced tree.
    pub fn root(&self) -> Option<&Node> {
        self.roots.first()
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for root in &self.roots {
            write!(f, "{root}")?;
        }
        Ok(())
    }
}

struct OpenFrame {
    ppr: PprRef,
    pos: usize,
    children: Vec<Node>,
}

/// Fluent assembler mirroring the parser's own events: `syntactic`
/// opens a node, `close` pops it, and `lexical`/`failure`/`end`/`skip`/
/// `abort` attach leaves to whatever node is currently open (or, if
/// none is open, directly to the tree's top level).
#[derive(Default)]
pub struct TreeBuilder {
    stack: Vec<OpenFrame>,
    roots: Vec<Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder::default()
    }

    fn attach(&mut self, node: Node) -> &mut Self {
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

    pub fn lexical(&mut self, lpr: LprRef, pos: usize, len: usize) -> &mut Self {
        self.attach(Node::Lexical { lpr, pos, len })
    }

    pub fn failure(&mut self, pos: usize, len: usize) -> &mut Self {
        self.attach(Node::Failure { pos, len })
    }

    pub fn end(&mut self, pos: usize) -> &mut Self {
        self.attach(Node::End { pos })
    }

    pub fn skip(&mut self, len: usize) -> &mut Self {
        self.attach(Node::Skip { len })
    }

    pub fn abort(&mut self) -> &mut Self {
        self.attach(Node::Abort)
    }

    /// Closes the innermost open syntactic node, attaching it to its
    /// parent (or to the tree's top level if it had none).
    pub fn close(&mut self) -> &mut Self {
        let frame = self.stack.pop().expect("close with no open syntactic node");
        let node = Node::Syntactic { ppr: frame.ppr, pos: frame.pos, children: frame.children };
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
        self
    }

    /// Number of syntactic nodes still open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn finish(mut self) -> Tree {
        while !self.stack.is_empty() {
            self.close();
        }
        Tree { roots: self.roots }
    }
}
