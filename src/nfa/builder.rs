// Copyright 2015-2016 Joe Neeman.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::error::Error;
use crate::nfa::Nfa;
use range_map::{Range, RangeSet};
use regex_syntax::hir::{Class, Hir, HirKind, Repetition};

/// When constructing an Nfa from a regex, the states have special structure: if the transition
/// accepts any input, then it always moves to the next state. Therefore, there is no need to
/// store the target state of a transition.  Also, the last state is always the accepting state,
/// so there is no need to store whether a state is accepting.
#[derive(Debug, PartialEq)]
struct State {
    chars: RangeSet<u32>,
    eps: Vec<usize>,
}

impl State {
    fn new() -> State {
        State {
            chars: RangeSet::new(),
            eps: Vec::new(),
        }
    }

    fn from_chars(chars: RangeSet<u32>) -> State {
        State {
            chars,
            eps: Vec::new(),
        }
    }
}

// Converts a `Class` into a `RangeSet`. Byte classes are read as classes of the code points
// U+0000 to U+00FF.
fn class_to_set(cc: &Class) -> RangeSet<u32> {
    match *cc {
        Class::Unicode(ref c) => {
            c.ranges().iter().map(|r| Range::new(r.start() as u32, r.end() as u32)).collect()
        },
        Class::Bytes(ref c) => {
            c.ranges().iter().map(|r| Range::new(r.start() as u32, r.end() as u32)).collect()
        },
    }
}

// The code points of a literal. Literals that are not valid UTF-8 can only come from byte-oriented
// patterns, so we read them one byte per code point.
fn literal_symbols(bytes: &[u8]) -> Vec<u32> {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.chars().map(|c| c as u32).collect(),
        Err(_) => bytes.iter().map(|&b| b as u32).collect(),
    }
}

/// Builds an `Nfa` from a `regex_syntax::hir::Hir`.
///
/// Every sub-expression is laid out as a contiguous run of states: its first state is the
/// initial state of the fragment, and its last state is the final one.
#[derive(Debug, PartialEq)]
pub struct NfaBuilder {
    states: Vec<State>,
}

impl NfaBuilder {
    /// Returns the number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Converts this `NfaBuilder` into an `Nfa`.
    pub fn to_automaton(&self) -> Nfa {
        let mut ret = Nfa::with_capacity(self.len());
        for i in 0..self.len() {
            ret.add_state(i + 1 == self.len());
        }

        for (idx, s) in self.states.iter().enumerate() {
            for range in s.chars.ranges() {
                ret.add_transition(idx, idx + 1, range);
            }
            for &eps in &s.eps {
                ret.add_eps(idx, eps);
            }
        }

        ret
    }

    /// Creates an `NfaBuilder` from a `Hir`.
    ///
    /// Fails with `Error::Unsupported` if the expression contains look-around assertions (such as
    /// `^`, `$` or `\b`), which have no counterpart in a plain finite automaton.
    pub fn from_hir(hir: &Hir) -> crate::Result<NfaBuilder> {
        let mut ret = NfaBuilder { states: Vec::new() };
        ret.add_expr(hir)?;
        Ok(ret)
    }

    /// Adds an eps transition between the given states.
    fn add_eps(&mut self, from: usize, to: usize) {
        self.states[from].eps.push(to);
    }

    /// Appends two states, with a given transition between them.
    fn add_single_transition(&mut self, chars: RangeSet<u32>) {
        self.states.push(State::from_chars(chars));
        self.states.push(State::new());
    }

    /// Appends a sequence of states that recognizes a literal.
    fn add_literal(&mut self, symbols: &[u32]) {
        for &sym in symbols {
            self.states.push(State::from_chars(RangeSet::single(sym)));
        }
        self.states.push(State::new());
    }

    /// Appends a sequence of states that recognizes the concatenation of `exprs`.
    fn add_concat_exprs(&mut self, exprs: &[Hir]) -> crate::Result<()> {
        if let Some((expr, rest)) = exprs.split_first() {
            self.add_expr(expr)?;

            for expr in rest {
                let cur_len = self.states.len();
                self.add_eps(cur_len - 1, cur_len);
                self.add_expr(expr)?;
            }
        } else {
            self.states.push(State::new());
        }
        Ok(())
    }

    /// Appends a sequence of states that recognizes one of the expressions in `alts`.
    fn add_alternate_exprs(&mut self, alts: &[Hir]) -> crate::Result<()> {
        // Add the new initial state that feeds into the alternate.
        let init_idx = self.states.len();
        self.states.push(State::new());

        let mut expr_end_indices = Vec::<usize>::with_capacity(alts.len());
        for expr in alts {
            let expr_init_idx = self.states.len();
            self.add_eps(init_idx, expr_init_idx);
            self.add_expr(expr)?;
            expr_end_indices.push(self.states.len() - 1);
        }

        // Make the final state of each alternative point to our new final state.
        self.states.push(State::new());
        let final_idx = self.states.len() - 1;
        for idx in expr_end_indices {
            self.add_eps(idx, final_idx);
        }
        Ok(())
    }

    /// Appends new states, representing multiple copies of `rep.sub`.
    ///
    /// The new states represent a language that accepts at least `rep.min` and at most `rep.max`
    /// copies of `rep.sub`. (If `rep.max` is `None`, there is no upper bound.) Greediness is
    /// ignored: an automaton has no notion of preferring one match over another.
    fn add_repeat(&mut self, rep: &Repetition) -> crate::Result<()> {
        let expr = &*rep.sub;
        let min = rep.min;

        if min == 0 && rep.max == Some(0) {
            // We add a state anyway, in order to maintain the convention that every expr should
            // add at least one state (otherwise keeping track of indices becomes much more
            // tedious).
            self.states.push(State::new());
            return Ok(());
        }

        // The starting index of the repetition that we are currently working on.
        let mut cur_init_idx = self.states.len();
        if min > 0 {
            self.add_expr(expr)?;
            for _ in 1..min {
                cur_init_idx = self.states.len();
                self.add_expr(expr)?;
                self.add_eps(cur_init_idx - 1, cur_init_idx);
            }
        }

        match rep.max {
            Some(max) => {
                let mut init_indices = Vec::<usize>::with_capacity(max.saturating_sub(min) as usize);
                for i in 0..max.saturating_sub(min) {
                    cur_init_idx = self.states.len();
                    self.add_expr(expr)?;
                    init_indices.push(cur_init_idx);

                    if i > 0 || min > 0 {
                        self.add_eps(cur_init_idx - 1, cur_init_idx);
                    }
                }
                let final_idx = self.states.len() - 1;
                for idx in init_indices {
                    self.add_eps(idx, final_idx);
                }
            },
            None => {
                if min == 0 {
                    cur_init_idx = self.states.len();
                    self.add_expr(expr)?;
                    let final_idx = self.states.len() - 1;
                    self.add_eps(cur_init_idx, final_idx);
                }

                let final_idx = self.states.len() - 1;
                self.add_eps(final_idx, cur_init_idx);
            },
        }
        Ok(())
    }

    /// Appends a bunch of new states, representing `expr`.
    fn add_expr(&mut self, expr: &Hir) -> crate::Result<()> {
        match *expr.kind() {
            HirKind::Empty => self.states.push(State::new()),
            HirKind::Literal(ref lit) => self.add_literal(&literal_symbols(&lit.0)),
            HirKind::Class(ref c) => self.add_single_transition(class_to_set(c)),
            HirKind::Look(_) => return Err(Error::Unsupported("look-around assertion")),
            HirKind::Repetition(ref rep) => self.add_repeat(rep)?,

            // We don't support capture groups, so there is no need to keep track of
            // the group name or number.
            HirKind::Capture(ref cap) => self.add_expr(&cap.sub)?,
            HirKind::Concat(ref es) => self.add_concat_exprs(es)?,
            HirKind::Alternation(ref es) => self.add_alternate_exprs(es)?,
        }
        Ok(())
    }
}

impl Nfa {
    /// Builds an automaton for the language of a parsed pattern.
    pub fn from_hir(hir: &Hir) -> crate::Result<Nfa> {
        Ok(NfaBuilder::from_hir(hir)?.to_automaton())
    }

    /// Parses `re` and builds an automaton for its language.
    ///
    /// The pattern is matched as a whole, so look-around assertions (including `^` and `$`) are
    /// rejected with `Error::Unsupported`.
    pub fn from_regex(re: &str) -> crate::Result<Nfa> {
        let hir = regex_syntax::parse(re)?;
        Nfa::from_hir(&hir)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::nfa::builder::{NfaBuilder, State};
    use crate::nfa::Nfa;
    use range_map::{Range, RangeSet};

    fn parse(s: &str) -> crate::Result<NfaBuilder> {
        let hir = regex_syntax::parse(s)?;
        NfaBuilder::from_hir(&hir)
    }

    fn make_builder(n_states: usize) -> NfaBuilder {
        let mut ret = NfaBuilder { states: Vec::new() };
        for _ in 0..n_states {
            ret.states.push(State::new());
        }
        ret
    }

    fn set(ranges: &[(char, char)]) -> RangeSet<u32> {
        ranges.iter().map(|r| Range::new(r.0 as u32, r.1 as u32)).collect()
    }

    #[test]
    fn test_char_class() {
        let builder = parse("[a-z][A-Z]").unwrap();
        let mut target = make_builder(4);
        target.states[0].chars = set(&[('a', 'z')]);
        target.add_eps(1, 2);
        target.states[2].chars = set(&[('A', 'Z')]);

        assert_eq!(builder, target);
    }

    #[test]
    fn test_literal() {
        let builder = parse("aZ").unwrap();
        let mut target = make_builder(3);
        target.states[0].chars = RangeSet::single('a' as u32);
        target.states[1].chars = RangeSet::single('Z' as u32);

        assert_eq!(builder, target);
    }

    #[test]
    fn test_alternate() {
        let builder = parse("ab|cd").unwrap();
        let mut target = make_builder(8);
        target.add_eps(0, 1);
        target.states[1].chars = RangeSet::single('a' as u32);
        target.states[2].chars = RangeSet::single('b' as u32);
        target.add_eps(0, 4);
        target.states[4].chars = RangeSet::single('c' as u32);
        target.states[5].chars = RangeSet::single('d' as u32);
        target.add_eps(3, 7);
        target.add_eps(6, 7);

        assert_eq!(builder, target);
    }

    #[test]
    fn test_repeat_zero_or_more() {
        let builder = parse("ab*z").unwrap();
        let builder2 = parse("ab{0,}z").unwrap();
        let mut target = make_builder(6);
        target.states[0].chars = RangeSet::single('a' as u32);
        target.states[2].chars = RangeSet::single('b' as u32);
        target.states[4].chars = RangeSet::single('z' as u32);
        target.add_eps(1, 2);
        target.add_eps(2, 3);
        target.add_eps(3, 2);
        target.add_eps(3, 4);

        assert_eq!(builder, target);
        assert_eq!(builder2, target);
    }

    #[test]
    fn test_repeat_one_or_more() {
        let builder = parse("ab+z").unwrap();
        let builder2 = parse("ab{1,}z").unwrap();
        let mut target = make_builder(6);
        target.states[0].chars = RangeSet::single('a' as u32);
        target.states[2].chars = RangeSet::single('b' as u32);
        target.states[4].chars = RangeSet::single('z' as u32);
        target.add_eps(1, 2);
        target.add_eps(3, 2);
        target.add_eps(3, 4);

        assert_eq!(builder, target);
        assert_eq!(builder2, target);
    }

    #[test]
    fn test_repeat_zero_or_one() {
        let builder = parse("ab?z").unwrap();
        let builder2 = parse("ab{0,1}z").unwrap();
        let mut target = make_builder(6);
        target.states[0].chars = RangeSet::single('a' as u32);
        target.states[2].chars = RangeSet::single('b' as u32);
        target.states[4].chars = RangeSet::single('z' as u32);
        target.add_eps(1, 2);
        target.add_eps(2, 3);
        target.add_eps(3, 4);

        assert_eq!(builder, target);
        assert_eq!(builder2, target);
    }

    #[test]
    fn test_repeat_exact() {
        let builder = parse("ab{3}z").unwrap();
        let mut target = make_builder(10);
        target.states[0].chars = RangeSet::single('a' as u32);
        target.states[2].chars = RangeSet::single('b' as u32);
        target.states[4].chars = RangeSet::single('b' as u32);
        target.states[6].chars = RangeSet::single('b' as u32);
        target.states[8].chars = RangeSet::single('z' as u32);
        target.add_eps(1, 2);
        target.add_eps(3, 4);
        target.add_eps(5, 6);
        target.add_eps(7, 8);

        assert_eq!(builder, target);
    }

    #[test]
    fn test_repeat_between() {
        let nfa = Nfa::from_regex("a{2,4}").unwrap();
        assert!(!nfa.accepts("a"));
        assert!(nfa.accepts("aa"));
        assert!(nfa.accepts("aaa"));
        assert!(nfa.accepts("aaaa"));
        assert!(!nfa.accepts("aaaaa"));

        let nfa = Nfa::from_regex("(ab){0,2}").unwrap();
        assert!(nfa.accepts(""));
        assert!(nfa.accepts("abab"));
        assert!(!nfa.accepts("aba"));
        assert!(!nfa.accepts("ababab"));
    }

    #[test]
    fn test_case_insensitive() {
        let nfa = Nfa::from_regex("(?i)ab").unwrap();
        assert!(nfa.accepts("aB"));
        assert!(nfa.accepts("Ab"));
        assert!(!nfa.accepts("ac"));
    }

    #[test]
    fn test_empty_pieces() {
        let nfa = Nfa::from_regex("").unwrap();
        assert!(nfa.accepts(""));
        assert!(!nfa.accepts("a"));

        let nfa = Nfa::from_regex("a(|b)c").unwrap();
        assert!(nfa.accepts("ac"));
        assert!(nfa.accepts("abc"));

        // An empty class matches nothing.
        let nfa = Nfa::from_regex(r"a[^\x00-\x{10FFFF}]").unwrap();
        assert!(!nfa.accepts("a"));
        assert!(!nfa.accepts("ab"));
    }

    #[test]
    fn test_dot() {
        let nfa = Nfa::from_regex(".").unwrap();
        assert!(nfa.accepts("\u{10FFFF}"));
        assert!(!nfa.accepts("\n"));

        let nfa = Nfa::from_regex("(?s).").unwrap();
        assert!(nfa.accepts("\n"));
    }

    #[test]
    fn test_unsupported() {
        for re in &["^a", "a$", r"\bword", r"a\B"] {
            match Nfa::from_regex(re) {
                Err(Error::Unsupported(_)) => {},
                other => panic!("{}: expected Unsupported, got {:?}", re, other),
            }
        }
        match Nfa::from_regex("a(") {
            Err(Error::RegexSyntax(_)) => {},
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }
}
