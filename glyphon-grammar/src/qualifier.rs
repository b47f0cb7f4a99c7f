use std::fmt;

/// Tags a lexer production rule with how it participates in
/// tokenizing. Grounded on `qualifier.h`/`qualifier.cpp` in the
/// original source this system was distilled from: `none` rules are
/// ordinary tokens, `skip` rules match but are filtered from the
/// token stream (whitespace, comments), and `support` rules exist
/// only to be referenced from other rules' bodies and never initiate
/// a top-level match on their own.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Qualifier {
    #[default]
    None,
    Skip,
    Support,
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qualifier::None => Ok(()),
            Qualifier::Skip => write!(f, " (skip)"),
            Qualifier::Support => write!(f, " (support)"),
        }
    }
}
