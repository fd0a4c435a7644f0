//! Recursive-descent parser for the Perl-compatible Thompson subset.
//!
//! The dialect deliberately excludes everything a Thompson-style engine
//! cannot express: backreferences, lookahead/lookbehind, conditionals, and
//! atomic groups are rejected with [`Error::UnsupportedFeature`] naming the
//! feature. Inline flags `i`, `m`, `s` are accepted; `m` switches anchors to
//! line anchors and `s` makes `.` match newlines. The `i` flag is accepted
//! but leaves the tree untouched, since every downstream rule is structural.

use crate::ast::{Ast, ClassRange};
use crate::error::{Error, Result};

/// Largest count accepted in a `{n,m}` repetition.
const MAX_REPEAT_COUNT: u32 = 1000;

const DIGIT_RANGES: &[ClassRange] = &[ClassRange::new('0', '9')];
const WORD_RANGES: &[ClassRange] = &[
    ClassRange::new('0', '9'),
    ClassRange::new('A', 'Z'),
    ClassRange::new('_', '_'),
    ClassRange::new('a', 'z'),
];
const SPACE_RANGES: &[ClassRange] = &[
    ClassRange::new('\t', '\r'),
    ClassRange::new(' ', ' '),
];

/// Inline flags active at the current parse position.
///
/// `i` is accepted by the flag parser but carries no state: structural
/// analysis never distinguishes letter case.
#[derive(Debug, Clone, Copy, Default)]
struct Flags {
    dotall: bool,
    multiline: bool,
}

/// What a class-context escape contributes to the surrounding class.
enum ClassEscape {
    Single(char),
    Ranges(Vec<ClassRange>),
}

/// Regex parser producing the raw (unsimplified) AST.
///
/// Most callers want [`crate::ast::parse`], which also normalizes the tree.
pub struct Parser {
    chars: Vec<char>,
    pos: usize,
    group_count: u32,
    flags: Flags,
}

impl Parser {
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        Self {
            chars: pattern.chars().collect(),
            pos: 0,
            group_count: 0,
            flags: Flags::default(),
        }
    }

    /// Parse the full pattern into a raw AST.
    pub fn parse(mut self) -> Result<Ast> {
        let node = self.parse_alternation()?;
        match self.peek() {
            None => Ok(node),
            Some(')') => Err(Error::invalid_at("unexpected )", self.pos)),
            Some(c) => Err(Error::invalid_at(format!("unexpected '{c}'"), self.pos)),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.advance() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(Error::invalid_at(
                format!("expected '{expected}', found '{c}'"),
                self.pos - 1,
            )),
            None => Err(Error::invalid_at(
                format!("expected '{expected}', found end of pattern"),
                self.pos,
            )),
        }
    }

    // =========================================================================
    // Grammar
    // =========================================================================

    /// `alternation := concat ('|' concat)*`
    fn parse_alternation(&mut self) -> Result<Ast> {
        let mut branches = vec![self.parse_concat()?];
        while self.peek() == Some('|') {
            self.advance();
            branches.push(self.parse_concat()?);
        }
        if branches.len() == 1 {
            Ok(branches.pop().unwrap_or(Ast::EmptyMatch))
        } else {
            Ok(Ast::Alternate(branches))
        }
    }

    /// `concat := repeat*`; an empty sequence is an empty match.
    fn parse_concat(&mut self) -> Result<Ast> {
        let mut nodes = Vec::new();
        loop {
            match self.peek() {
                None | Some('|') | Some(')') => break,
                Some('*') | Some('+') | Some('?') => {
                    return Err(Error::invalid_at(
                        "missing argument to repetition operator",
                        self.pos,
                    ));
                }
                _ => nodes.push(self.parse_repeat()?),
            }
        }
        match nodes.len() {
            0 => Ok(Ast::EmptyMatch),
            1 => Ok(nodes.pop().unwrap_or(Ast::EmptyMatch)),
            _ => Ok(Ast::Concat(nodes)),
        }
    }

    /// An atom followed by at most one quantifier (plus its lazy marker).
    fn parse_repeat(&mut self) -> Result<Ast> {
        let atom = self.parse_atom()?;

        let node = match self.peek() {
            Some('*') => {
                self.advance();
                Ast::Star(Box::new(self.quantifiable(atom)?))
            }
            Some('+') => {
                self.advance();
                Ast::Plus(Box::new(self.quantifiable(atom)?))
            }
            Some('?') => {
                self.advance();
                Ast::Quest(Box::new(self.quantifiable(atom)?))
            }
            Some('{') => match self.parse_repeat_bounds()? {
                Some((min, max)) => Ast::Repeat {
                    node: Box::new(self.quantifiable(atom)?),
                    min,
                    max,
                },
                // Not a valid repetition; '{' stays in the stream and will
                // be consumed as a literal by the next atom.
                None => return Ok(atom),
            },
            _ => return Ok(atom),
        };

        // Lazy marker; laziness does not change structural ambiguity.
        if self.peek() == Some('?') {
            self.advance();
        }

        // A second repetition operator in a row is invalid in this dialect.
        let stacked = match self.peek() {
            Some('*') | Some('+') | Some('?') => true,
            Some('{') => self.repeat_bounds_ahead(),
            _ => false,
        };
        if stacked {
            return Err(Error::invalid_at(
                "nested repetition operator",
                self.pos,
            ));
        }

        Ok(node)
    }

    /// Reject quantifiers applied to anchors or the empty match.
    fn quantifiable(&self, atom: Ast) -> Result<Ast> {
        match atom {
            Ast::BeginLine | Ast::EndLine | Ast::BeginText | Ast::EndText => Err(
                Error::invalid_at("missing argument to repetition operator", self.pos - 1),
            ),
            other => Ok(other),
        }
    }

    /// Try to parse `{n}`, `{n,}`, or `{n,m}` starting at `{`.
    ///
    /// Returns `None` (with the position restored) when the braces do not
    /// form a repetition, in which case `{` is treated as a literal.
    fn parse_repeat_bounds(&mut self) -> Result<Option<(u32, Option<u32>)>> {
        let saved = self.pos;
        self.advance(); // consume '{'

        let Some(min) = self.parse_number() else {
            self.pos = saved;
            return Ok(None);
        };

        let bounds = match self.peek() {
            Some('}') => {
                self.advance();
                (min, Some(min))
            }
            Some(',') => {
                self.advance();
                match self.peek() {
                    Some('}') => {
                        self.advance();
                        (min, None)
                    }
                    _ => {
                        let Some(max) = self.parse_number() else {
                            self.pos = saved;
                            return Ok(None);
                        };
                        if self.peek() != Some('}') {
                            self.pos = saved;
                            return Ok(None);
                        }
                        self.advance();
                        (min, Some(max))
                    }
                }
            }
            _ => {
                self.pos = saved;
                return Ok(None);
            }
        };

        let (min, max) = bounds;
        if min > MAX_REPEAT_COUNT || max.is_some_and(|m| m > MAX_REPEAT_COUNT) {
            return Err(Error::invalid_at(
                format!("repeat count exceeds {MAX_REPEAT_COUNT}"),
                saved,
            ));
        }
        if max.is_some_and(|m| m < min) {
            return Err(Error::invalid_at("invalid repeat count", saved));
        }
        Ok(Some((min, max)))
    }

    /// Whether a syntactically valid `{n,m}` repetition starts at `pos`.
    fn repeat_bounds_ahead(&self) -> bool {
        let mut probe = Parser {
            chars: self.chars.clone(),
            pos: self.pos,
            group_count: 0,
            flags: self.flags,
        };
        matches!(probe.parse_repeat_bounds(), Ok(Some(_)) | Err(_))
    }

    fn parse_number(&mut self) -> Option<u32> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(c) = self.peek() {
            let Some(digit) = c.to_digit(10) else { break };
            value = value.saturating_mul(10).saturating_add(digit);
            self.advance();
        }
        (self.pos > start).then_some(value)
    }

    fn parse_atom(&mut self) -> Result<Ast> {
        match self.peek() {
            Some('(') => self.parse_group(),
            Some('[') => self.parse_class(),
            Some('.') => {
                self.advance();
                Ok(if self.flags.dotall {
                    Ast::AnyChar
                } else {
                    Ast::AnyCharNoNewline
                })
            }
            Some('^') => {
                self.advance();
                Ok(if self.flags.multiline {
                    Ast::BeginLine
                } else {
                    Ast::BeginText
                })
            }
            Some('$') => {
                self.advance();
                Ok(if self.flags.multiline {
                    Ast::EndLine
                } else {
                    Ast::EndText
                })
            }
            Some('\\') => self.parse_escape(),
            Some(c) => {
                self.advance();
                Ok(Ast::Literal(vec![c]))
            }
            None => Err(Error::invalid_at("unexpected end of pattern", self.pos)),
        }
    }

    // =========================================================================
    // Groups
    // =========================================================================

    fn parse_group(&mut self) -> Result<Ast> {
        self.expect('(')?;

        if self.peek() != Some('?') {
            // Plain capturing group
            self.group_count += 1;
            let index = self.group_count;
            let saved_flags = self.flags;
            let node = self.parse_alternation()?;
            self.flags = saved_flags;
            self.expect(')')?;
            return Ok(Ast::Capture {
                index,
                node: Box::new(node),
            });
        }

        self.advance(); // consume '?'
        match self.peek() {
            Some(':') => {
                self.advance();
                let saved_flags = self.flags;
                let node = self.parse_alternation()?;
                self.flags = saved_flags;
                self.expect(')')?;
                Ok(node)
            }
            Some('=') => Err(Error::unsupported("lookahead assertion")),
            Some('!') => Err(Error::unsupported("negative lookahead assertion")),
            Some('>') => Err(Error::unsupported("atomic group")),
            Some('(') => Err(Error::unsupported("conditional expression")),
            Some('<') => {
                self.advance();
                match self.peek() {
                    Some('=') => Err(Error::unsupported("lookbehind assertion")),
                    Some('!') => Err(Error::unsupported("negative lookbehind assertion")),
                    _ => self.parse_named_capture(),
                }
            }
            Some('P') => {
                self.advance();
                match self.peek() {
                    Some('<') => {
                        self.advance();
                        self.parse_named_capture()
                    }
                    Some('=') => Err(Error::unsupported("named backreference")),
                    _ => Err(Error::invalid_at("invalid group syntax", self.pos)),
                }
            }
            _ => self.parse_flag_group(),
        }
    }

    /// Body of `(?<name>...)` / `(?P<name>...)` after the `<`.
    ///
    /// Named groups are kept as plain captures; the name only matters to a
    /// matching engine.
    fn parse_named_capture(&mut self) -> Result<Ast> {
        let name_start = self.pos;
        while let Some(c) = self.peek() {
            if c == '>' {
                break;
            }
            if !c.is_alphanumeric() && c != '_' {
                return Err(Error::invalid_at("invalid capture group name", self.pos));
            }
            self.advance();
        }
        if self.pos == name_start {
            return Err(Error::invalid_at("empty capture group name", self.pos));
        }
        self.expect('>')?;

        self.group_count += 1;
        let index = self.group_count;
        let saved_flags = self.flags;
        let node = self.parse_alternation()?;
        self.flags = saved_flags;
        self.expect(')')?;
        Ok(Ast::Capture {
            index,
            node: Box::new(node),
        })
    }

    /// `(?flags)` or `(?flags:...)` with flags drawn from `i`, `m`, `s`.
    fn parse_flag_group(&mut self) -> Result<Ast> {
        let mut flags = self.flags;
        let mut negate = false;

        loop {
            match self.peek() {
                Some('i') => {
                    // Case-insensitivity has no structural footprint.
                    self.advance();
                }
                Some('m') => {
                    flags.multiline = !negate;
                    self.advance();
                }
                Some('s') => {
                    flags.dotall = !negate;
                    self.advance();
                }
                Some('-') if !negate => {
                    negate = true;
                    self.advance();
                }
                Some(')') => {
                    self.advance();
                    // Applies to the remainder of the enclosing group.
                    self.flags = flags;
                    return Ok(Ast::EmptyMatch);
                }
                Some(':') => {
                    self.advance();
                    let saved_flags = self.flags;
                    self.flags = flags;
                    let node = self.parse_alternation()?;
                    self.flags = saved_flags;
                    self.expect(')')?;
                    return Ok(node);
                }
                Some(c) => {
                    return Err(Error::invalid_at(format!("unknown flag '{c}'"), self.pos));
                }
                None => {
                    return Err(Error::invalid_at("unterminated group", self.pos));
                }
            }
        }
    }

    // =========================================================================
    // Escapes
    // =========================================================================

    fn parse_escape(&mut self) -> Result<Ast> {
        self.expect('\\')?;
        let Some(c) = self.advance() else {
            return Err(Error::invalid_at("trailing backslash", self.pos));
        };

        match c {
            'd' => Ok(class_from(DIGIT_RANGES, false)),
            'D' => Ok(class_from(DIGIT_RANGES, true)),
            'w' => Ok(class_from(WORD_RANGES, false)),
            'W' => Ok(class_from(WORD_RANGES, true)),
            's' => Ok(class_from(SPACE_RANGES, false)),
            'S' => Ok(class_from(SPACE_RANGES, true)),
            'A' => Ok(Ast::BeginText),
            'z' | 'Z' => Ok(Ast::EndText),
            'b' | 'B' => Err(Error::unsupported("word boundary assertion")),
            '1'..='9' => Err(Error::unsupported("backreference")),
            'p' | 'P' => Err(Error::unsupported("unicode character class")),
            'Q' => Err(Error::unsupported("literal quoting (\\Q...\\E)")),
            'n' => Ok(Ast::Literal(vec!['\n'])),
            't' => Ok(Ast::Literal(vec!['\t'])),
            'r' => Ok(Ast::Literal(vec!['\r'])),
            'f' => Ok(Ast::Literal(vec!['\x0C'])),
            'v' => Ok(Ast::Literal(vec!['\x0B'])),
            'a' => Ok(Ast::Literal(vec!['\x07'])),
            'e' => Ok(Ast::Literal(vec!['\x1B'])),
            '0' => Ok(Ast::Literal(vec!['\0'])),
            'x' => Ok(Ast::Literal(vec![self.parse_hex_escape()?])),
            c if !c.is_alphanumeric() => Ok(Ast::Literal(vec![c])),
            c => Err(Error::invalid_at(
                format!("invalid escape sequence \\{c}"),
                self.pos - 1,
            )),
        }
    }

    /// `\xHH` or `\x{HEX}`.
    fn parse_hex_escape(&mut self) -> Result<char> {
        if self.peek() == Some('{') {
            self.advance();
            let start = self.pos;
            let mut value: u32 = 0;
            while let Some(c) = self.peek() {
                if c == '}' {
                    break;
                }
                let digit = c
                    .to_digit(16)
                    .ok_or_else(|| Error::invalid_at("invalid hex escape", self.pos))?;
                value = value.saturating_mul(16).saturating_add(digit);
                self.advance();
            }
            if self.pos == start {
                return Err(Error::invalid_at("empty hex escape", self.pos));
            }
            self.expect('}')?;
            char::from_u32(value)
                .ok_or_else(|| Error::invalid_at("hex escape out of range", start))
        } else {
            let mut value: u32 = 0;
            for _ in 0..2 {
                let Some(digit) = self.peek().and_then(|c| c.to_digit(16)) else {
                    return Err(Error::invalid_at("invalid hex escape", self.pos));
                };
                value = value * 16 + digit;
                self.advance();
            }
            char::from_u32(value)
                .ok_or_else(|| Error::invalid_at("hex escape out of range", self.pos))
        }
    }

    /// Escape inside a character class: no anchors, `\b` is backspace.
    fn parse_class_escape(&mut self) -> Result<ClassEscape> {
        self.expect('\\')?;
        let Some(c) = self.advance() else {
            return Err(Error::invalid_at("trailing backslash", self.pos));
        };

        match c {
            'd' => Ok(ClassEscape::Ranges(DIGIT_RANGES.to_vec())),
            'D' => Ok(ClassEscape::Ranges(negate_ranges(DIGIT_RANGES))),
            'w' => Ok(ClassEscape::Ranges(WORD_RANGES.to_vec())),
            'W' => Ok(ClassEscape::Ranges(negate_ranges(WORD_RANGES))),
            's' => Ok(ClassEscape::Ranges(SPACE_RANGES.to_vec())),
            'S' => Ok(ClassEscape::Ranges(negate_ranges(SPACE_RANGES))),
            'n' => Ok(ClassEscape::Single('\n')),
            't' => Ok(ClassEscape::Single('\t')),
            'r' => Ok(ClassEscape::Single('\r')),
            'f' => Ok(ClassEscape::Single('\x0C')),
            'v' => Ok(ClassEscape::Single('\x0B')),
            'a' => Ok(ClassEscape::Single('\x07')),
            'e' => Ok(ClassEscape::Single('\x1B')),
            'b' => Ok(ClassEscape::Single('\x08')),
            '0' => Ok(ClassEscape::Single('\0')),
            'x' => Ok(ClassEscape::Single(self.parse_hex_escape()?)),
            'p' | 'P' => Err(Error::unsupported("unicode character class")),
            c if !c.is_alphanumeric() => Ok(ClassEscape::Single(c)),
            c => Err(Error::invalid_at(
                format!("invalid escape sequence \\{c}"),
                self.pos - 1,
            )),
        }
    }

    // =========================================================================
    // Character classes
    // =========================================================================

    fn parse_class(&mut self) -> Result<Ast> {
        let open = self.pos;
        self.expect('[')?;

        let negated = self.peek() == Some('^');
        if negated {
            self.advance();
        }

        let mut ranges: Vec<ClassRange> = Vec::new();
        let mut first = true;

        loop {
            match self.peek() {
                None => return Err(Error::invalid_at("missing closing ]", open)),
                Some(']') if !first => {
                    self.advance();
                    break;
                }
                Some('\\') => match self.parse_class_escape()? {
                    ClassEscape::Ranges(rs) => ranges.extend(rs),
                    ClassEscape::Single(lo) => ranges.push(self.finish_range(lo)?),
                },
                Some(c) => {
                    self.advance();
                    ranges.push(self.finish_range(c)?);
                }
            }
            first = false;
        }

        if ranges.is_empty() {
            return Err(Error::invalid_at("empty character class", open));
        }

        Ok(Ast::CharClass {
            ranges: crate::ast::normalize_ranges(ranges),
            negated,
        })
    }

    /// After reading a class member `lo`, extend it into a range if a
    /// `-` with a right-hand endpoint follows.
    fn finish_range(&mut self, lo: char) -> Result<ClassRange> {
        if self.peek() != Some('-') || matches!(self.peek_at(1), None | Some(']')) {
            return Ok(ClassRange::single(lo));
        }
        self.advance(); // consume '-'

        let hi = match self.peek() {
            Some('\\') => match self.parse_class_escape()? {
                ClassEscape::Single(c) => c,
                ClassEscape::Ranges(_) => {
                    return Err(Error::invalid_at(
                        "character class cannot end a range",
                        self.pos,
                    ));
                }
            },
            Some(c) => {
                self.advance();
                c
            }
            None => return Err(Error::invalid_at("missing closing ]", self.pos)),
        };

        if lo > hi {
            return Err(Error::invalid_at(
                format!("invalid character class range {lo}-{hi}"),
                self.pos,
            ));
        }
        Ok(ClassRange::new(lo, hi))
    }
}

fn class_from(ranges: &[ClassRange], negated: bool) -> Ast {
    Ast::CharClass {
        ranges: ranges.to_vec(),
        negated,
    }
}

/// Complement a set of ranges over the full scalar-value space,
/// skipping the surrogate gap.
fn negate_ranges(ranges: &[ClassRange]) -> Vec<ClassRange> {
    const MAX_SCALAR: u32 = 0x10FFFF;

    let sorted = crate::ast::normalize_ranges(ranges.to_vec());
    let mut out = Vec::new();
    let mut next: u32 = 0;

    for range in sorted {
        let lo = range.lo as u32;
        if lo > next {
            push_scalar_range(&mut out, next, lo - 1);
        }
        next = next.max(range.hi as u32 + 1);
    }
    if next <= MAX_SCALAR {
        push_scalar_range(&mut out, next, MAX_SCALAR);
    }
    out
}

/// Push `lo..=hi` as char ranges, splitting around the surrogate block.
fn push_scalar_range(out: &mut Vec<ClassRange>, lo: u32, hi: u32) {
    const SURROGATE_LO: u32 = 0xD800;
    const SURROGATE_HI: u32 = 0xDFFF;

    let mut push = |lo: u32, hi: u32| {
        if lo > hi {
            return;
        }
        if let (Some(lo), Some(hi)) = (char::from_u32(lo), char::from_u32(hi)) {
            out.push(ClassRange::new(lo, hi));
        }
    };

    if hi < SURROGATE_LO || lo > SURROGATE_HI {
        push(lo, hi);
    } else {
        push(lo, SURROGATE_LO.saturating_sub(1).min(hi));
        push(SURROGATE_HI + 1, hi);
    }
}

// =============================================================================
// Tests
// =============================================================================
