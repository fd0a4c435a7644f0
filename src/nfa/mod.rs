//! Thompson-style NFA construction and epsilon-graph analysis.
//!
//! States live in a contiguous arena and transitions are index pairs, so
//! the quantifier back-edges that make the automaton a real graph need no
//! shared-ownership machinery and destruction stays deterministic.
//!
//! Construction is append-only: once a state is linked it is never
//! rewritten. Epsilon edges may form cycles; a cycle is the signature of a
//! quantifier loop, and exactly what the ambiguity analysis looks for.
//!
//! # Example
//!
//! ```
//! use regrade::{ast, nfa::Nfa};
//!
//! let tree = ast::parse("a+").unwrap();
//! let nfa = Nfa::from_ast(&tree).unwrap();
//! let closure = nfa.epsilon_closure(nfa.start());
//! assert!(closure.contains(nfa.start()));
//! ```

use fixedbitset::FixedBitSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::ast::{Ast, ClassRange};

/// Index of a state in the NFA arena.
pub type StateId = usize;

/// Hard ceiling on arena size. Counted repetitions expand to O(n·|R|)
/// states; anything past this bound degrades to fast-only analysis
/// instead of allocating without limit.
const MAX_STATES: usize = 10_000;

/// Construction error. The only failure mode is exhausting the state
/// budget; unsupported AST shapes degrade to epsilon edges instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NfaError {
    #[error("NFA state budget exceeded: {count} states (limit {limit})")]
    TooManyStates { count: usize, limit: usize },
}

/// Which anchor a transition asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorKind {
    BeginLine,
    EndLine,
    BeginText,
    EndText,
}

/// What causes a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    /// Match one specific character
    Literal(char),
    /// Match a character class
    Class {
        ranges: Vec<ClassRange>,
        negated: bool,
    },
    /// Match any character
    Any,
    /// Match any character except newline
    AnyNoNewline,
    /// Consume no input
    Epsilon,
    /// Assert a position without consuming input
    Anchor(AnchorKind),
}

impl Label {
    #[must_use]
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Label::Epsilon)
    }
}

/// A transition out of a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub to: StateId,
    pub label: Label,
}

/// A state in the NFA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    pub is_accept: bool,
    pub transitions: Vec<Transition>,
    /// States reachable via a single epsilon edge; kept alongside the
    /// labeled transitions so the closure and cycle passes touch only
    /// this adjacency.
    pub epsilon_to: Vec<StateId>,
}

/// A Thompson-style non-deterministic finite automaton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nfa {
    states: Vec<State>,
    start: StateId,
    accept: StateId,
}

impl Nfa {
    /// Build an NFA from a simplified AST using the classic Thompson
    /// constructions, extended for anchors and character classes.
    pub fn from_ast(ast: &Ast) -> Result<Self, NfaError> {
        let mut nfa = Nfa {
            states: Vec::new(),
            start: 0,
            accept: 0,
        };

        let start = nfa.new_state()?;
        let accept = nfa.new_state()?;
        nfa.start = start;
        nfa.accept = accept;
        nfa.states[accept].is_accept = true;

        nfa.build(ast, start, accept)?;
        debug!(states = nfa.states.len(), "built NFA");
        Ok(nfa)
    }

    #[must_use]
    pub fn start(&self) -> StateId {
        self.start
    }

    #[must_use]
    pub fn accept(&self) -> StateId {
        self.accept
    }

    #[must_use]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    #[must_use]
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    // =========================================================================
    // Construction
    // =========================================================================

    fn new_state(&mut self) -> Result<StateId, NfaError> {
        if self.states.len() >= MAX_STATES {
            return Err(NfaError::TooManyStates {
                count: self.states.len(),
                limit: MAX_STATES,
            });
        }
        let id = self.states.len();
        self.states.push(State {
            id,
            is_accept: false,
            transitions: Vec::new(),
            epsilon_to: Vec::new(),
        });
        Ok(id)
    }

    fn add_transition(&mut self, from: StateId, to: StateId, label: Label) {
        if label.is_epsilon() {
            self.states[from].epsilon_to.push(to);
        }
        self.states[from].transitions.push(Transition { to, label });
    }

    fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.add_transition(from, to, Label::Epsilon);
    }

    fn build(&mut self, ast: &Ast, start: StateId, accept: StateId) -> Result<(), NfaError> {
        match ast {
            Ast::Literal(chars) => self.build_literal(chars, start, accept),
            Ast::CharClass { ranges, negated } => {
                self.add_transition(
                    start,
                    accept,
                    Label::Class {
                        ranges: ranges.clone(),
                        negated: *negated,
                    },
                );
                Ok(())
            }
            Ast::AnyChar => {
                self.add_transition(start, accept, Label::Any);
                Ok(())
            }
            Ast::AnyCharNoNewline => {
                self.add_transition(start, accept, Label::AnyNoNewline);
                Ok(())
            }
            Ast::Concat(subs) => self.build_concat(subs, start, accept),
            Ast::Alternate(subs) => self.build_alternate(subs, start, accept),
            Ast::Star(sub) => self.build_loop(sub, start, accept, true),
            Ast::Plus(sub) => self.build_loop(sub, start, accept, false),
            Ast::Quest(sub) => {
                self.add_epsilon(start, accept);
                self.build(sub, start, accept)
            }
            Ast::Repeat { node, min, max } => self.build_repeat(node, *min, *max, start, accept),
            Ast::Capture { node, .. } => {
                // Captures are transparent to the automaton.
                self.build(node, start, accept)
            }
            Ast::EmptyMatch => {
                self.add_epsilon(start, accept);
                Ok(())
            }
            Ast::BeginLine => {
                self.add_transition(start, accept, Label::Anchor(AnchorKind::BeginLine));
                Ok(())
            }
            Ast::EndLine => {
                self.add_transition(start, accept, Label::Anchor(AnchorKind::EndLine));
                Ok(())
            }
            Ast::BeginText => {
                self.add_transition(start, accept, Label::Anchor(AnchorKind::BeginText));
                Ok(())
            }
            Ast::EndText => {
                self.add_transition(start, accept, Label::Anchor(AnchorKind::EndText));
                Ok(())
            }
        }
    }

    fn build_literal(
        &mut self,
        chars: &[char],
        start: StateId,
        accept: StateId,
    ) -> Result<(), NfaError> {
        if chars.is_empty() {
            self.add_epsilon(start, accept);
            return Ok(());
        }

        let mut current = start;
        for (i, &c) in chars.iter().enumerate() {
            let next = if i == chars.len() - 1 {
                accept
            } else {
                self.new_state()?
            };
            self.add_transition(current, next, Label::Literal(c));
            current = next;
        }
        Ok(())
    }

    fn build_concat(
        &mut self,
        subs: &[Ast],
        start: StateId,
        accept: StateId,
    ) -> Result<(), NfaError> {
        if subs.is_empty() {
            self.add_epsilon(start, accept);
            return Ok(());
        }

        let mut current = start;
        for (i, sub) in subs.iter().enumerate() {
            let next = if i == subs.len() - 1 {
                accept
            } else {
                self.new_state()?
            };
            self.build(sub, current, next)?;
            current = next;
        }
        Ok(())
    }

    fn build_alternate(
        &mut self,
        subs: &[Ast],
        start: StateId,
        accept: StateId,
    ) -> Result<(), NfaError> {
        for sub in subs {
            let branch_start = self.new_state()?;
            let branch_end = self.new_state()?;
            self.add_epsilon(start, branch_start);
            self.build(sub, branch_start, branch_end)?;
            self.add_epsilon(branch_end, accept);
        }
        Ok(())
    }

    /// Star and Plus share one construction; Star adds the skip edge.
    ///
    /// The `loop_end → loop_start` epsilon is the intentional back-edge the
    /// ambiguity analysis keys on.
    fn build_loop(
        &mut self,
        sub: &Ast,
        start: StateId,
        accept: StateId,
        skippable: bool,
    ) -> Result<(), NfaError> {
        let loop_start = self.new_state()?;
        let loop_end = self.new_state()?;

        self.add_epsilon(start, loop_start);
        if skippable {
            self.add_epsilon(start, accept);
        }

        self.build(sub, loop_start, loop_end)?;

        self.add_epsilon(loop_end, loop_start);
        self.add_epsilon(loop_end, accept);
        Ok(())
    }

    /// Counted repetition: `min` required copies, then either a star-like
    /// loop (unbounded) or skippable copies up to `max`.
    fn build_repeat(
        &mut self,
        sub: &Ast,
        min: u32,
        max: Option<u32>,
        start: StateId,
        accept: StateId,
    ) -> Result<(), NfaError> {
        let mut current = start;
        for _ in 0..min {
            let next = self.new_state()?;
            self.build(sub, current, next)?;
            current = next;
        }

        match max {
            None => self.build_loop(sub, current, accept, true),
            Some(max) => {
                for _ in min..max {
                    let next = self.new_state()?;
                    self.add_epsilon(current, next);
                    self.build(sub, current, next)?;
                    current = next;
                }
                self.add_epsilon(current, accept);
                Ok(())
            }
        }
    }

    // =========================================================================
    // Epsilon-graph analysis
    // =========================================================================

    /// All states reachable from `id` by epsilon edges only, including
    /// `id` itself. Iterative BFS over a visited bitset, so epsilon cycles
    /// are harmless.
    #[must_use]
    pub fn epsilon_closure(&self, id: StateId) -> FixedBitSet {
        let mut closure = FixedBitSet::with_capacity(self.states.len());
        let mut stack = vec![id];

        while let Some(state) = stack.pop() {
            if closure.contains(state) {
                continue;
            }
            closure.insert(state);
            for &next in &self.states[state].epsilon_to {
                if !closure.contains(next) {
                    stack.push(next);
                }
            }
        }
        closure
    }

    /// Whether an epsilon cycle is reachable from `id`.
    ///
    /// Classic white/gray/black DFS: finding a gray (on-path) state again
    /// is the back-edge that proves a cycle.
    #[must_use]
    pub fn has_epsilon_cycle_from(&self, id: StateId) -> bool {
        let mut on_path = FixedBitSet::with_capacity(self.states.len());
        let mut done = FixedBitSet::with_capacity(self.states.len());
        self.cycle_dfs(id, &mut on_path, &mut done)
    }

    fn cycle_dfs(&self, id: StateId, on_path: &mut FixedBitSet, done: &mut FixedBitSet) -> bool {
        if on_path.contains(id) {
            return true;
        }
        if done.contains(id) {
            return false;
        }

        on_path.insert(id);
        for &next in &self.states[id].epsilon_to {
            if self.cycle_dfs(next, on_path, done) {
                return true;
            }
        }
        on_path.set(id, false);
        done.insert(id);
        false
    }
}

impl std::fmt::Display for Nfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Nfa{{states:{}, start:{}, accept:{}}}",
            self.states.len(),
            self.start,
            self.accept
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
