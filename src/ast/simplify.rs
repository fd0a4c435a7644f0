//! AST normalization.
//!
//! Simplification canonicalizes the raw parse tree so the structural
//! analyzers see explicit quantifiers and flat sequences:
//!
//! - nested `Concat`/`Alternate` nodes are flattened and adjacent literals
//!   coalesced;
//! - an alternation whose branches are all single characters becomes one
//!   character class (`a|b|c` → `[abc]`);
//! - counted repetitions are expanded: `{n,}` into required copies ending
//!   in a `Plus`, `{n,m}` into required copies followed by optional
//!   (`Quest`) copies, so `Repeat` never survives;
//! - captures are preserved; their presence blocks the alternation rewrite.
//!
//! The pass is idempotent: `simplify(simplify(t)) == simplify(t)`.

use crate::ast::{normalize_ranges, Ast, ClassRange};

/// Normalize an AST into its canonical simplified form.
#[must_use]
pub fn simplify(ast: Ast) -> Ast {
    match ast {
        Ast::Concat(subs) => concat(subs.into_iter().map(simplify).collect()),
        Ast::Alternate(subs) => alternate(subs.into_iter().map(simplify).collect()),
        Ast::Star(sub) => match simplify(*sub) {
            Ast::EmptyMatch => Ast::EmptyMatch,
            sub => Ast::Star(Box::new(sub)),
        },
        Ast::Plus(sub) => match simplify(*sub) {
            Ast::EmptyMatch => Ast::EmptyMatch,
            sub => Ast::Plus(Box::new(sub)),
        },
        Ast::Quest(sub) => match simplify(*sub) {
            Ast::EmptyMatch => Ast::EmptyMatch,
            sub => Ast::Quest(Box::new(sub)),
        },
        Ast::Repeat { node, min, max } => expand_repeat(simplify(*node), min, max),
        Ast::Capture { index, node } => Ast::Capture {
            index,
            node: Box::new(simplify(*node)),
        },
        Ast::CharClass { ranges, negated } => Ast::CharClass {
            ranges: normalize_ranges(ranges),
            negated,
        },
        leaf => leaf,
    }
}

/// Build a canonical concatenation: flatten, drop empty matches, coalesce
/// adjacent literals.
fn concat(subs: Vec<Ast>) -> Ast {
    let mut flat: Vec<Ast> = Vec::with_capacity(subs.len());
    for sub in subs {
        match sub {
            Ast::Concat(inner) => {
                for node in inner {
                    push_concat(&mut flat, node);
                }
            }
            Ast::EmptyMatch => {}
            node => push_concat(&mut flat, node),
        }
    }
    match flat.len() {
        0 => Ast::EmptyMatch,
        1 => flat.pop().unwrap_or(Ast::EmptyMatch),
        _ => Ast::Concat(flat),
    }
}

fn push_concat(flat: &mut Vec<Ast>, node: Ast) {
    match (flat.last_mut(), node) {
        (Some(Ast::Literal(prev)), Ast::Literal(next)) => prev.extend(next),
        (_, Ast::EmptyMatch) => {}
        (_, node) => flat.push(node),
    }
}

/// Build a canonical alternation: flatten, and collapse all-single-character
/// branches into one class.
fn alternate(subs: Vec<Ast>) -> Ast {
    let mut flat: Vec<Ast> = Vec::with_capacity(subs.len());
    for sub in subs {
        match sub {
            Ast::Alternate(inner) => flat.extend(inner),
            node => flat.push(node),
        }
    }

    if flat.len() == 1 {
        return flat.pop().unwrap_or(Ast::EmptyMatch);
    }

    if flat.len() >= 2 && flat.iter().all(is_single_char_branch) {
        let mut ranges: Vec<ClassRange> = Vec::with_capacity(flat.len());
        for branch in &flat {
            match branch {
                Ast::Literal(chars) => {
                    if let Some(&c) = chars.first() {
                        ranges.push(ClassRange::single(c));
                    }
                }
                Ast::CharClass {
                    ranges: branch_ranges,
                    ..
                } => ranges.extend(branch_ranges.iter().copied()),
                _ => {}
            }
        }
        return Ast::CharClass {
            ranges: normalize_ranges(ranges),
            negated: false,
        };
    }

    Ast::Alternate(flat)
}

/// Whether a branch can be folded into a character class.
fn is_single_char_branch(ast: &Ast) -> bool {
    match ast {
        Ast::Literal(chars) => chars.len() == 1,
        Ast::CharClass { negated, .. } => !negated,
        _ => false,
    }
}

/// Expand `{min,max}` into required copies plus an unbounded or optional
/// tail. The expansion is flat, so counted repetitions never read as
/// nested quantifiers downstream.
fn expand_repeat(node: Ast, min: u32, max: Option<u32>) -> Ast {
    if node == Ast::EmptyMatch {
        return Ast::EmptyMatch;
    }

    match max {
        None => match min {
            0 => Ast::Star(Box::new(node)),
            1 => Ast::Plus(Box::new(node)),
            _ => {
                let mut parts: Vec<Ast> = Vec::with_capacity(min as usize);
                for _ in 0..min - 1 {
                    parts.push(node.clone());
                }
                parts.push(Ast::Plus(Box::new(node)));
                concat(parts)
            }
        },
        Some(max) => {
            let mut parts: Vec<Ast> = Vec::with_capacity(max as usize);
            for _ in 0..min {
                parts.push(node.clone());
            }
            for _ in min..max {
                parts.push(Ast::Quest(Box::new(node.clone())));
            }
            concat(parts)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
