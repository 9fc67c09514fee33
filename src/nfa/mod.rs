// Copyright 2015-2016 Joe Neeman.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use bit_set::BitSet;
use crate::{alphabet, MAX_SYMBOL};
use crate::runner::program::Program;
use range_map::{Range, RangeMultiMap};
use std::fmt::{self, Debug, Formatter};

pub(crate) mod algebra;
mod builder;
mod determinize;

pub use self::builder::NfaBuilder;

// TODO: it would be nice to make StateIdx a new type instead of a type alias. The problem is that
// we need to be able to index Vecs with it, and we can't impl<T> Index<StateIdx> for Vec<T>
// because of coherence rules.
pub type StateIdx = usize;

/// How we represent a set of states. The two important criteria are:
///
/// - it should be reasonably fast even when there are thousands of states (this knocks out
///   BitSet), and
/// - it should be hashable (this knocks out HashSet).
///
/// Note that efficient insertion and O(1) queries are not important. Therefore, we use a sorted
/// Vec. (But be careful to keep it sorted!)
pub type StateSet = Vec<StateIdx>;

#[derive(Clone, Eq, PartialEq)]
pub struct State {
    accept: bool,
    consuming: RangeMultiMap<u32, StateIdx>,
    eps: Vec<StateIdx>,
}

impl State {
    fn new(accept: bool) -> State {
        State {
            accept,
            consuming: RangeMultiMap::new(),
            eps: Vec::new(),
        }
    }
}

/// A non-deterministic finite automaton over code points.
///
/// Transitions are labelled by inclusive ranges of code points, and there may be any number of
/// transitions (with overlapping ranges) out of a state, as well as epsilon transitions. There is
/// exactly one initial state, which defaults to the first state that was added.
#[derive(Clone, Eq, PartialEq)]
pub struct Nfa {
    states: Vec<State>,
    init: StateIdx,
}

impl Nfa {
    /// Returns a new `Nfa` with no states.
    ///
    /// An `Nfa` with no states accepts nothing, but most methods expect at least one state to be
    /// added before they are called.
    pub fn new() -> Nfa {
        Nfa::with_capacity(0)
    }

    /// Returns a new `Nfa` with no states, but with room for `n` of them.
    pub fn with_capacity(n: usize) -> Nfa {
        Nfa {
            states: Vec::with_capacity(n),
            init: 0,
        }
    }

    /// An automaton that accepts no words at all.
    pub fn empty() -> Nfa {
        let mut ret = Nfa::with_capacity(1);
        ret.add_state(false);
        ret
    }

    /// An automaton that accepts only the empty word.
    pub fn empty_string() -> Nfa {
        let mut ret = Nfa::with_capacity(1);
        ret.add_state(true);
        ret
    }

    /// An automaton that accepts exactly the word `s`.
    pub fn literal(s: &str) -> Nfa {
        let mut ret = Nfa::with_capacity(s.chars().count() + 1);
        let mut cur = ret.add_state(false);
        for ch in s.chars() {
            let next = ret.add_state(false);
            ret.add_transition(cur, next, Range::single(ch as u32));
            cur = next;
        }
        ret.set_accept(cur, true);
        ret
    }

    /// An automaton that accepts every one-character word whose character lies between `start`
    /// and `end` (inclusive). If `start > end`, it accepts nothing.
    pub fn char_range(start: char, end: char) -> Nfa {
        let mut ret = Nfa::with_capacity(2);
        let init = ret.add_state(false);
        let fin = ret.add_state(true);
        if start <= end {
            ret.add_transition(init, fin, Range::new(start as u32, end as u32));
        }
        ret
    }

    /// An automaton that accepts every one-character word.
    pub fn any_char() -> Nfa {
        let mut ret = Nfa::with_capacity(2);
        let init = ret.add_state(false);
        let fin = ret.add_state(true);
        ret.add_transition(init, fin, alphabet());
        ret
    }

    /// An automaton that accepts every word.
    pub fn any_string() -> Nfa {
        let mut ret = Nfa::with_capacity(1);
        let s = ret.add_state(true);
        ret.add_transition(s, s, alphabet());
        ret
    }

    /// Adds a new state and returns its index.
    pub fn add_state(&mut self, accept: bool) -> StateIdx {
        self.states.push(State::new(accept));
        self.states.len() - 1
    }

    /// Adds a transition from `source` to `target` on every symbol in `range`.
    ///
    /// # Panics
    ///
    /// Panics if either state doesn't exist, or if `range` is empty or reaches past `MAX_SYMBOL`.
    pub fn add_transition(&mut self, source: StateIdx, target: StateIdx, range: Range<u32>) {
        assert!(target < self.states.len(), "no such state: {}", target);
        assert!(range.start <= range.end && range.end <= MAX_SYMBOL, "bad range: {:?}", range);
        self.states[source].consuming.insert(range, target);
    }

    /// Adds an epsilon transition from `source` to `target`.
    ///
    /// # Panics
    ///
    /// Panics if either state doesn't exist.
    pub fn add_eps(&mut self, source: StateIdx, target: StateIdx) {
        assert!(target < self.states.len(), "no such state: {}", target);
        self.states[source].eps.push(target);
    }

    /// # Panics
    ///
    /// Panics if the state doesn't exist.
    pub fn set_init(&mut self, idx: StateIdx) {
        assert!(idx < self.states.len(), "no such state: {}", idx);
        self.init = idx;
    }

    pub fn init(&self) -> StateIdx {
        self.init
    }

    pub fn set_accept(&mut self, idx: StateIdx, accept: bool) {
        self.states[idx].accept = accept;
    }

    pub fn is_accept(&self, idx: StateIdx) -> bool {
        self.states[idx].accept
    }

    /// Iterates over the indices of the accepting states.
    pub fn accept_states<'a>(&'a self) -> impl Iterator<Item=StateIdx> + 'a {
        self.states.iter().enumerate().filter(|s| s.1.accept).map(|s| s.0)
    }

    pub fn consuming(&self, i: StateIdx) -> &RangeMultiMap<u32, StateIdx> {
        &self.states[i].consuming
    }

    pub fn eps(&self, i: StateIdx) -> &[StateIdx] {
        &self.states[i].eps
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Returns true if this `Nfa` has no states.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The total number of consuming and epsilon transitions.
    pub fn num_transitions(&self) -> usize {
        self.states.iter().map(|s| s.consuming.num_ranges() + s.eps.len()).sum()
    }

    /// Returns true if this automaton has no epsilon transitions and no state has two transitions
    /// with overlapping ranges.
    pub fn is_deterministic(&self) -> bool {
        self.states.iter().all(|st| {
            if !st.eps.is_empty() {
                return false;
            }
            let mut ranges: Vec<_> = st.consuming.ranges_values().map(|x| x.0).collect();
            ranges.sort_by_key(|r| (r.start, r.end));
            ranges.windows(2).all(|w| w[0].end < w[1].start)
        })
    }

    /// Returns the set of states reachable from `states` using only epsilon transitions.
    pub fn eps_closure<I: IntoIterator<Item=StateIdx>>(&self, states: I) -> StateSet {
        let mut closure = BitSet::with_capacity(self.states.len());
        let mut stack: Vec<StateIdx> = Vec::new();
        for s in states {
            if closure.insert(s) {
                stack.push(s);
            }
        }
        while let Some(s) = stack.pop() {
            for &t in &self.states[s].eps {
                if closure.insert(t) {
                    stack.push(t);
                }
            }
        }
        // BitSet iterates in increasing order, so this is sorted.
        closure.iter().collect()
    }

    /// Does the set of states contain an accepting state?
    fn any_accept(&self, states: &[StateIdx]) -> bool {
        states.iter().any(|&s| self.states[s].accept)
    }

    /// Returns true if this automaton accepts the whole of `s`.
    ///
    /// This simulates the automaton directly, one set of states at a time. It is much slower
    /// than running a compiled `Program`.
    pub fn accepts(&self, s: &str) -> bool {
        if self.states.is_empty() {
            return false;
        }

        let mut cur = self.eps_closure(Some(self.init));
        for ch in s.chars() {
            let sym = ch as u32;
            let next = cur.iter()
                .flat_map(|&st| self.states[st].consuming.ranges_values())
                .filter(|x| x.0.start <= sym && sym <= x.0.end)
                .map(|x| x.1);
            cur = self.eps_closure(next);
            if cur.is_empty() {
                return false;
            }
        }
        self.any_accept(&cur)
    }

    /// Returns the transitions of this automaton, indexed by their target states.
    pub fn reversed_transitions(&self) -> Vec<RangeMultiMap<u32, StateIdx>> {
        let mut ret = vec![RangeMultiMap::new(); self.states.len()];

        for (source, st) in self.states.iter().enumerate() {
            for &(range, target) in st.consuming.ranges_values() {
                ret[target].insert(range, source);
            }
        }

        ret
    }

    /// Copies all of the states of `other` into this automaton, and returns the index that
    /// `other`'s state 0 ended up at.
    fn append(&mut self, other: &Nfa) -> StateIdx {
        let offset = self.states.len();
        for st in &other.states {
            let mut st = st.clone();
            st.consuming.map_values(|&x| x + offset);
            for e in &mut st.eps {
                *e += offset;
            }
            self.states.push(st);
        }
        offset
    }

    /// Determinizes, minimizes and compiles this automaton.
    ///
    /// Fails with `Error::TooManyStates` if determinization would need more than `max_states`
    /// states.
    pub fn compile(&self, max_states: usize) -> crate::Result<Program> {
        Ok(self.determinize(max_states)?.compile())
    }
}

impl Default for Nfa {
    fn default() -> Nfa {
        Nfa::new()
    }
}

impl Debug for Nfa {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_fmt(format_args!("Nfa ({} states):\n", self.states.len()))?;
        f.write_fmt(format_args!("Init: {}\n", self.init))?;

        for (st_idx, st) in self.states.iter().enumerate().take(40) {
            f.write_fmt(format_args!("\tState {} ({}):\n",
                                     st_idx,
                                     if st.accept { "accepting" } else { "non-accepting" }))?;

            if !st.consuming.is_empty() {
                f.write_str("\t\tConsuming:\n")?;
                // Cap it at 10 transitions, since it gets unreadable otherwise.
                for &(range, target) in st.consuming.ranges_values().take(10) {
                    f.write_fmt(format_args!("\t\t\t{:?} -- {:?} => {}\n",
                                             range.start, range.end, target))?;
                }
                if st.consuming.num_ranges() > 10 {
                    f.write_str("\t\t\t...\n")?;
                }
            }
            if !st.eps.is_empty() {
                f.write_fmt(format_args!("\t\tEps-transitions: {:?}\n", &st.eps))?;
            }
        }
        if self.states.len() > 40 {
            f.write_fmt(format_args!("\t... ({} more states)\n", self.states.len() - 40))?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use crate::nfa::Nfa;
    use range_map::Range;

    // Creates an Nfa with the given transitions, in which the last state is accepting.
    pub fn trans_nfa(size: usize, transitions: &[(usize, usize, char)]) -> Nfa {
        let mut ret = Nfa::with_capacity(size);
        for i in 0..size {
            ret.add_state(i == size - 1);
        }
        for &(src, tgt, ch) in transitions {
            ret.add_transition(src, tgt, Range::single(ch as u32));
        }
        ret
    }

    #[test]
    fn primitives() {
        assert!(!Nfa::empty().accepts(""));
        assert!(Nfa::empty_string().accepts(""));
        assert!(!Nfa::empty_string().accepts("a"));

        let lit = Nfa::literal("héllo");
        assert!(lit.accepts("héllo"));
        assert!(!lit.accepts("hello"));
        assert!(!lit.accepts("héll"));
        assert!(Nfa::literal("").accepts(""));

        let range = Nfa::char_range('b', 'd');
        assert!(range.accepts("c"));
        assert!(!range.accepts("a"));
        assert!(!range.accepts("cc"));
        assert!(!Nfa::char_range('d', 'b').accepts("c"));

        assert!(Nfa::any_char().accepts("\u{10FFFF}"));
        assert!(!Nfa::any_char().accepts(""));
        assert!(Nfa::any_string().accepts(""));
        assert!(Nfa::any_string().accepts("any old thing"));
        assert!(!Nfa::new().accepts(""));
    }

    #[test]
    fn eps_closure_is_sorted() {
        let mut nfa = trans_nfa(4, &[(0, 1, 'a')]);
        nfa.add_eps(0, 3);
        nfa.add_eps(3, 2);
        nfa.add_eps(2, 0);
        assert_eq!(nfa.eps_closure(Some(0)), vec![0, 2, 3]);
        assert_eq!(nfa.eps_closure(Some(1)), vec![1]);
    }

    #[test]
    fn deterministic() {
        assert!(trans_nfa(3, &[(0, 1, 'a'), (0, 2, 'b')]).is_deterministic());
        assert!(!trans_nfa(3, &[(0, 1, 'a'), (0, 2, 'a')]).is_deterministic());

        let mut nfa = trans_nfa(2, &[(0, 1, 'a')]);
        nfa.add_eps(1, 0);
        assert!(!nfa.is_deterministic());
    }

    #[test]
    fn nondeterministic_simulation() {
        // (a|ab)c, with the choice made on the first 'a'.
        let mut nfa = trans_nfa(5, &[(0, 1, 'a'), (0, 2, 'a'), (2, 3, 'b'), (1, 4, 'c'),
                                     (3, 4, 'c')]);
        nfa.set_init(0);
        assert!(nfa.accepts("ac"));
        assert!(nfa.accepts("abc"));
        assert!(!nfa.accepts("ab"));
        assert_eq!(nfa.num_transitions(), 5);
    }

    #[test]
    #[should_panic]
    fn transition_to_nowhere() {
        let mut nfa = Nfa::empty();
        nfa.add_transition(0, 1, Range::single('a' as u32));
    }

    #[test]
    #[should_panic]
    fn transition_past_alphabet() {
        let mut nfa = Nfa::empty();
        nfa.add_transition(0, 0, Range::new(0, 0x110000));
    }
}
