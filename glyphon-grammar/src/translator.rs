use std::collections::BTreeMap;

use glyphon_symbols::SymbolTraits;

use crate::expr::{Ctx, Expr, Universe};
use crate::grammar::{Grammar, GrammarData, LprMeta, PprMeta};
use crate::qualifier::Qualifier;
use crate::GrammarDiagnostic;

struct Decl {
    name: String,
    qualifier: Qualifier,
    body: Option<Vec<Expr>>,
}

/// Consumes rule declarations and bodies and, on success, produces an
/// immutable `Grammar`. Mirrors the two-pass decl-then-define
/// protocol of `internal/grammar_builder.cpp` in the original source
/// (`add_lpr_decl`/`add_ppr_decl` establish the rule index space,
/// `add_lpr`/`add_ppr` fill in bodies), and its transactional
/// `get_result()` — either every declared rule got a body and no
/// diagnostic fired, or nothing is produced at all.
#[derive(Default)]
pub struct Translator {
    lprs: Vec<Decl>,
    pprs: Vec<Decl>,
    diagnostics: Vec<GrammarDiagnostic>,
    cancelled: bool,
}

impl Translator {
    pub fn new() -> Self {
        Translator::default()
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn diagnostics(&self) -> &[GrammarDiagnostic] {
        &self.diagnostics
    }

    pub fn add_lpr_decl(&mut self, name: impl Into<String>, qualifier: Qualifier) {
        let name = name.into();
        if self.lprs.iter().any(|d| d.name == name) {
            self.diagnostics.push(GrammarDiagnostic::DuplicateName(name));
            return;
        }
        self.lprs.push(Decl { name, qualifier, body: None });
    }

    pub fn add_ppr_decl(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.pprs.iter().any(|d| d.name == name) {
            self.diagnostics.push(GrammarDiagnostic::DuplicateName(name));
            return;
        }
        self.pprs.push(Decl { name, qualifier: Qualifier::None, body: None });
    }

    pub fn add_lpr(&mut self, name: &str, alternatives: Vec<Expr>) {
        match self.lprs.iter_mut().find(|d| d.name == name) {
            None => self.diagnostics.push(GrammarDiagnostic::UndeclaredRule(name.to_string())),
            Some(decl) if decl.body.is_some() => {
                self.diagnostics.push(GrammarDiagnostic::DuplicateDefinition(name.to_string()))
            }
            Some(decl) => decl.body = Some(alternatives),
        }
    }

    pub fn add_ppr(&mut self, name: &str, alternatives: Vec<Expr>) {
        match self.pprs.iter_mut().find(|d| d.name == name) {
            None => self.diagnostics.push(GrammarDiagnostic::UndeclaredRule(name.to_string())),
            Some(decl) if decl.body.is_some() => {
                self.diagnostics.push(GrammarDiagnostic::DuplicateDefinition(name.to_string()))
            }
            Some(decl) => decl.body = Some(alternatives),
        }
    }

    pub fn get_result(mut self) -> Option<Grammar> {
        if self.cancelled {
            return None;
        }
        for decl in self.lprs.iter().chain(self.pprs.iter()) {
            if decl.body.is_none() {
                self.diagnostics.push(GrammarDiagnostic::MissingDefinition(decl.name.clone()));
            }
        }

        let lpr_names: BTreeMap<String, u32> = self
            .lprs
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i as u32))
            .collect();
        let ppr_names: BTreeMap<String, u32> = self
            .pprs
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i as u32))
            .collect();

        let lpr_count = self.lprs.len() as u32;
        let ppr_count = self.pprs.len() as u32;

        let glyph_probe = SymbolTraits::glyph(0);
        let mut glyph_ctx = Ctx::new(Universe::Glyph, &lpr_names, lpr_count, &glyph_probe);
        for (i, decl) in self.lprs.iter().enumerate() {
            for alt in decl.body.iter().flatten() {
                glyph_ctx.add_rule_alternative(i as u32, alt);
            }
        }
        let glyph_total = glyph_ctx.anonymous_count();
        let glyph_traits = SymbolTraits::glyph(glyph_total);
        let glyph_productions = remap_productions(glyph_ctx.productions, glyph_traits.first_nonterminal.0);
        self.diagnostics.extend(glyph_ctx.diagnostics);

        let token_probe = SymbolTraits::token(lpr_count, 0);
        let mut token_ctx = Ctx::new(Universe::Token, &ppr_names, ppr_count, &token_probe);
        for (i, decl) in self.pprs.iter().enumerate() {
            for alt in decl.body.iter().flatten() {
                token_ctx.add_rule_alternative(i as u32, alt);
            }
        }
        let token_total = token_ctx.anonymous_count();
        let token_traits = SymbolTraits::token(lpr_count, token_total);
        let token_productions = remap_productions(token_ctx.productions, token_traits.first_nonterminal.0);
        self.diagnostics.extend(token_ctx.diagnostics);

        let (lexical_table, lexical_diags) = glyphon_tables::build(glyph_traits, glyph_productions);
        let (syntactic_table, syntactic_diags) = glyphon_tables::build(token_traits, token_productions);
        self.diagnostics.extend(lexical_diags.into_iter().map(GrammarDiagnostic::LexicalTable));
        self.diagnostics.extend(syntactic_diags.into_iter().map(GrammarDiagnostic::SyntacticTable));

        if !self.diagnostics.is_empty() {
            return None;
        }

        let lprs = self
            .lprs
            .into_iter()
            .map(|d| LprMeta { name: d.name, qualifier: d.qualifier })
            .collect();
        let pprs = self.pprs.into_iter().map(|d| PprMeta { name: d.name }).collect();

        Some(Grammar::from_data(GrammarData {
            lprs,
            pprs,
            lexical_table,
            syntactic_table,
        }))
    }
}

fn remap_productions(productions: Vec<glyphon_tables::Production>, offset: u32) -> Vec<glyphon_tables::Production> {
    productions
        .into_iter()
        .map(|p| {
            let non_terminal = glyphon_symbols::SymbolId(offset + p.non_terminal.0);
            let atoms = p
                .atoms
                .into_iter()
                .map(|atom| match atom.kind {
                    glyphon_tables::AtomKind::NonTerminal(id) => {
                        let mut a = glyphon_tables::Atom::non_terminal(glyphon_symbols::SymbolId(offset + id.0));
                        a.assertion = atom.assertion;
                        a
                    }
                    glyphon_tables::AtomKind::Terminal(_) => atom,
                })
                .collect();
            glyphon_tables::Production::new(non_terminal, atoms)
        })
        .collect()
}
