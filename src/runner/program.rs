// Copyright 2015-2016 Joe Neeman.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::dfa::Dfa;
use crate::runner::matcher::{Matcher, Matches};
use crate::MAX_SYMBOL;
use bit_set::BitSet;
use itertools::Itertools;
use refinery::Partition;
use std::fmt::{Debug, Error as FmtError, Formatter};

pub type TableStateIdx = u32;

const DEAD: TableStateIdx = TableStateIdx::MAX;

/// A `Dfa` compiled into a lookup table.
///
/// The symbols are divided into classes, such that every state treats all of the symbols in a
/// class in the same way. Taking a step is then a matter of finding the class of the input symbol
/// and doing one table lookup.
///
/// A `Program` is immutable, and it can be shared between threads; each search keeps its own
/// position in a `Matcher`.
#[derive(Clone)]
pub struct Program {
    /// The log (rounded up) of the number of symbol classes.
    // Storing the log instead of the actual number wastes some space in `table`, but it means that
    // we can shift instead of multiplying when looking up the next state.
    log_num_classes: u32,
    /// The class of each ASCII symbol.
    ascii_class: Vec<u32>,
    /// The boundaries of the elementary intervals: interval `i` starts at `points[i]` and ends
    /// just before `points[i + 1]` (or at `MAX_SYMBOL`, for the last one). `points[0]` is zero.
    points: Vec<u32>,
    /// The class of each elementary interval.
    interval_class: Vec<u32>,
    /// A `num_states << log_num_classes`-long table.
    ///
    /// For a symbol of class `c` in state `state`, the next state is
    /// `table[(state << log_num_classes) + c]`, or `DEAD` if there is no transition.
    table: Vec<TableStateIdx>,
    accept: BitSet,
    num_states: usize,
    init: usize,
}

impl Debug for Program {
    fn fmt(&self, f: &mut Formatter) -> Result<(), FmtError> {
        f.write_fmt(format_args!("Program ({} log_classes, {} states, init {}):\n",
                                 self.log_num_classes,
                                 self.num_states,
                                 self.init))?;
        f.write_str("Intervals: ")?;
        f.debug_map()
            .entries(self.points.iter().zip(self.interval_class.iter()))
            .finish()?;
        f.write_str("\n")?;

        let num_classes = 1 << self.log_num_classes;
        for idx in 0..self.num_states {
            f.write_fmt(format_args!("State {}:\n", idx))?;
            f.debug_map()
                .entries((0usize..num_classes)
                    .map(|c| (c, self.table[(idx << self.log_num_classes) + c]))
                    .filter(|x| x.1 != DEAD))
                .finish()?;
            f.write_str("\n")?;
        }

        f.write_str("Accept: ")?;
        f.debug_set().entries(self.accept.iter()).finish()
    }
}

impl Program {
    /// Compiles a `Dfa` into a table.
    ///
    /// The states of the `Program` are the states of `dfa`, with the same indices. `Dfa::compile`
    /// minimizes before calling this.
    pub fn from_dfa(dfa: &Dfa) -> Program {
        let points = boundary_points(dfa);
        let (interval_class, log_num_classes) = symbol_classes(dfa, &points);
        let num_states = dfa.num_states();

        let mut table = vec![DEAD; num_states << log_num_classes];
        let mut accept = BitSet::with_capacity(num_states);
        for idx in 0..num_states {
            if dfa.is_accept(idx) {
                accept.insert(idx);
            }
            for &(range, target) in dfa.transitions(idx).ranges_values() {
                let mut i = interval_index(&points, range.start);
                while i < points.len() && points[i] <= range.end {
                    let class = interval_class[i] as usize;
                    table[(idx << log_num_classes) + class] = target as TableStateIdx;
                    i += 1;
                }
            }
        }

        let ascii_class = (0..128u32)
            .map(|c| interval_class[interval_index(&points, c)])
            .collect();

        debug!("compiled a Dfa with {} states into a table with {} intervals and 2^{} classes",
               num_states,
               points.len(),
               log_num_classes);
        Program {
            log_num_classes,
            ascii_class,
            points,
            interval_class,
            table,
            accept,
            num_states,
            init: dfa.init(),
        }
    }

    fn class(&self, symbol: u32) -> usize {
        if symbol < 128 {
            self.ascii_class[symbol as usize] as usize
        } else {
            self.interval_class[interval_index(&self.points, symbol)] as usize
        }
    }

    /// The state that follows `state` after consuming `symbol`, if there is one.
    pub fn next_state(&self, state: usize, symbol: u32) -> Option<usize> {
        if symbol > MAX_SYMBOL {
            return None;
        }
        let next = self.table[(state << self.log_num_classes) + self.class(symbol)];
        if next != DEAD {
            Some(next as usize)
        } else {
            None
        }
    }

    /// The state from which every run begins, or `None` if there are no states.
    pub fn init_state(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.init)
        }
    }

    pub fn is_accept(&self, state: usize) -> bool {
        self.accept.contains(state)
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// The number of symbol classes.
    pub fn num_classes(&self) -> usize {
        self.interval_class.iter().max().map_or(1, |&c| c as usize + 1)
    }

    /// Returns true if this program has no states (and so accepts nothing).
    pub fn is_empty(&self) -> bool {
        self.num_states == 0
    }

    /// Tests whether the whole of `input` is accepted.
    pub fn run(&self, input: &str) -> bool {
        self.run_symbols(input.chars().map(|c| c as u32))
    }

    /// Tests whether a sequence of symbols is accepted.
    ///
    /// Symbols above `MAX_SYMBOL` are never accepted.
    pub fn run_symbols<I: IntoIterator<Item=u32>>(&self, input: I) -> bool {
        let mut state = match self.init_state() {
            Some(s) => s,
            None => return false,
        };
        for sym in input {
            match self.next_state(state, sym) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.is_accept(state)
    }

    /// Runs the program on `input`, starting at byte offset `pos`, and returns the largest offset
    /// at which it was in an accepting state.
    ///
    /// If the initial state accepts, the result is at least `pos`. Returns `None` if no prefix of
    /// `&input[pos..]` (including the empty one) is accepted.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is not on a `char` boundary of `input`.
    pub fn longest_match_at(&self, input: &str, pos: usize) -> Option<usize> {
        let mut state = self.init_state()?;
        let mut ret = if self.is_accept(state) { Some(pos) } else { None };

        for (offset, ch) in input[pos..].char_indices() {
            // The inner loop is simple enough that we do the lookup inline, rather than going
            // through `next_state`.
            let next = self.table[(state << self.log_num_classes) + self.class(ch as u32)];
            if next == DEAD {
                break;
            }
            state = next as usize;
            if self.accept.contains(state) {
                ret = Some(pos + offset + ch.len_utf8());
            }
        }
        ret
    }

    /// Creates a `Matcher` for finding successive leftmost-longest matches in `input`.
    pub fn matcher<'p, 't>(&'p self, input: &'t str) -> Matcher<'p, 't> {
        Matcher::new(self, input)
    }

    /// Iterates over the successive leftmost-longest matches in `input`.
    pub fn find_iter<'p, 't>(&'p self, input: &'t str) -> Matches<'p, 't> {
        Matches::new(self.matcher(input))
    }
}

// The symbols at which some transition of `dfa` starts, or just after some transition ends. The
// first point is always zero.
fn boundary_points(dfa: &Dfa) -> Vec<u32> {
    let mut points = vec![0];
    for idx in 0..dfa.num_states() {
        for &(range, _) in dfa.transitions(idx).ranges_values() {
            points.push(range.start);
            if range.end < MAX_SYMBOL {
                points.push(range.end + 1);
            }
        }
    }
    points.sort();
    points.dedup();
    points
}

// The index of the elementary interval containing `symbol`.
fn interval_index(points: &[u32], symbol: u32) -> usize {
    match points.binary_search(&symbol) {
        Ok(i) => i,
        // `points[0] == 0`, so `i` is at least one.
        Err(i) => i - 1,
    }
}

// Finds the elementary intervals that are treated equivalently by `dfa`.
//
// Returns a Vec with one entry per interval, such that vec[i] == vec[j] when intervals i and j
// are equivalent. Also returns the log of the number of classes, rounded up.
fn symbol_classes(dfa: &Dfa, points: &[u32]) -> (Vec<u32>, u32) {
    let n = points.len();
    let mut part = Partition::new(Some(0..n).into_iter(), n);
    let mut buf = Vec::with_capacity(n);

    for idx in 0..dfa.num_states() {
        let mut pieces: Vec<(usize, usize)> = Vec::new();
        for &(range, target) in dfa.transitions(idx).ranges_values() {
            let mut i = interval_index(points, range.start);
            while i < n && points[i] <= range.end {
                pieces.push((target, i));
                i += 1;
            }
        }
        pieces.sort();

        for (_, group) in &pieces.into_iter().chunk_by(|p| p.0) {
            buf.clear();
            buf.extend(group.map(|p| p.1));
            part.refine(&buf);
        }
    }

    let mut ret = vec![0; n];
    for (i, p) in part.iter().enumerate() {
        for &x in p {
            ret[x] = i as u32;
        }
    }
    let size = (part.num_parts() - 1) as u32;

    (ret, 32 - size.leading_zeros())
}

#[cfg(test)]
mod tests {
    use crate::dfa::Dfa;
    use crate::runner::program::Program;
    use crate::nfa::Nfa;

    fn prog(re: &str) -> Program {
        crate::init_logging();
        Dfa::from_regex(re).unwrap().compile()
    }

    #[test]
    fn run() {
        let p = prog("[abc]+");
        assert!(p.run("abcacacbb"));
        assert!(!p.run(""));
        assert!(!p.run("abcd"));

        let p = prog("(abc)|(abcdef)");
        assert!(p.run("abc"));
        assert!(!p.run("abcde"));
        assert!(p.run("abcdef"));
    }

    #[test]
    fn run_non_ascii() {
        let p = prog("[α-ω]+λ|日本");
        assert!(p.run("αβλ"));
        assert!(p.run("日本"));
        assert!(!p.run("αβ"));
        assert!(!p.run("日"));
        assert!(!p.run("abλ"));
    }

    #[test]
    fn run_symbols() {
        let p = prog("ab*");
        assert!(p.run_symbols(vec!['a' as u32, 'b' as u32, 'b' as u32]));
        assert!(!p.run_symbols(vec!['b' as u32]));
        assert!(!p.run_symbols(vec!['a' as u32, 0x110000]));

        // Surrogates aren't chars, but they are symbols.
        let mut nfa = Nfa::new();
        let s = nfa.add_state(false);
        let t = nfa.add_state(true);
        nfa.add_transition(s, t, crate::Range::new(0xD800, 0xDFFF));
        let p = nfa.compile(10).unwrap();
        assert!(p.run_symbols(Some(0xDABC)));
        assert!(!p.run_symbols(Some(0xE000)));
    }

    #[test]
    fn classes() {
        // The classes are [a-c], [d-x], y, z and everything else.
        let p = prog("[a-x]*y|[a-c]z");
        assert_eq!(p.num_classes(), 5);
        assert_eq!(p.class('a' as u32), p.class('c' as u32));
        assert_eq!(p.class('d' as u32), p.class('x' as u32));
        assert!(p.class('c' as u32) != p.class('d' as u32));
        assert_eq!(p.class('!' as u32), p.class('λ' as u32));

        let p = prog("");
        assert_eq!(p.num_classes(), 1);
        assert!(p.run(""));
        assert!(!p.run("a"));
    }

    #[test]
    fn longest_match_at() {
        let p = prog("a+|ab+c");
        assert_eq!(p.longest_match_at("xaaab", 1), Some(4));
        assert_eq!(p.longest_match_at("abbbc", 0), Some(5));
        assert_eq!(p.longest_match_at("abbbd", 0), Some(1));
        assert_eq!(p.longest_match_at("xaaab", 0), None);
        assert_eq!(p.longest_match_at("xaaab", 5), None);

        let p = prog("a*");
        assert_eq!(p.longest_match_at("baac", 0), Some(0));
        assert_eq!(p.longest_match_at("baac", 4), Some(4));
    }

    #[test]
    fn longest_match_at_byte_offsets() {
        let p = prog("é+");
        assert_eq!(p.longest_match_at("xéé!", 1), Some(5));
    }

    #[test]
    fn empty_program() {
        let p = Program::from_dfa(&Dfa::new());
        assert!(p.is_empty());
        assert!(!p.run(""));
        assert_eq!(p.longest_match_at("abc", 0), None);

        let p = prog("[^\\x00-\\x{10FFFF}]");
        assert!(!p.run(""));
        assert!(!p.run("a"));
    }

    #[test]
    fn debug() {
        let p = prog("ab");
        let s = format!("{:?}", p);
        assert!(s.starts_with("Program"));
        assert!(s.contains("State 2"));
    }

    #[test]
    fn send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Program>();
    }
}
