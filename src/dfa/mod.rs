// Copyright 2015-2016 Joe Neeman.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::graph::Graph;
use crate::nfa::{Nfa, StateIdx};
use crate::runner::program::Program;
use crate::MAX_SYMBOL;
use range_map::{Range, RangeMap, RangeMultiMap};
use std::collections::VecDeque;
use std::fmt::{self, Debug, Formatter};
use std::mem;

mod algebra;
mod minimizer;

use self::minimizer::Minimizer;

#[derive(Clone, Eq, PartialEq)]
struct State {
    transitions: RangeMap<u32, StateIdx>,
    accept: bool,
}

impl State {
    fn new(accept: bool) -> State {
        State {
            transitions: RangeMap::new(),
            accept,
        }
    }
}

/// A deterministic finite automaton over code points.
///
/// Every state has at most one transition for each symbol; symbols with no transition lead to an
/// implicit, non-accepting dead state. The automata returned by `minimize` (and everything built
/// on it, like `from_regex`) are in a canonical form, so two of them are equal (with `==`) if and
/// only if they accept the same language.
#[derive(Clone, Eq, PartialEq)]
pub struct Dfa {
    states: Vec<State>,
    init: StateIdx,
}

// Returns the first Unicode scalar value in the range, skipping surrogates.
fn first_char(r: Range<u32>) -> Option<char> {
    let start = if (0xD800..0xE000).contains(&r.start) { 0xE000 } else { r.start };
    if start <= r.end {
        char::from_u32(start)
    } else {
        None
    }
}

impl Dfa {
    /// Returns a `Dfa` with no states.
    pub fn new() -> Dfa {
        Dfa {
            states: Vec::new(),
            init: 0,
        }
    }

    /// Parses `re` and returns the minimal automaton for its language.
    pub fn from_regex(re: &str) -> crate::Result<Dfa> {
        Dfa::from_regex_bounded(re, usize::MAX)
    }

    /// Like `from_regex`, but fails with `Error::TooManyStates` if determinization needs more
    /// than `max_states` states.
    pub fn from_regex_bounded(re: &str, max_states: usize) -> crate::Result<Dfa> {
        let nfa = Nfa::from_regex(re)?;
        Ok(nfa.determinize(max_states)?.minimize())
    }

    /// Returns the number of states.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// The total number of transitions, counting each range once.
    pub fn num_transitions(&self) -> usize {
        self.states.iter().map(|s| s.transitions.num_ranges()).sum()
    }

    /// Adds a new state and returns its index. The first state added is initial by default.
    pub fn add_state(&mut self, accept: bool) -> StateIdx {
        self.states.push(State::new(accept));
        self.states.len() - 1
    }

    /// Adds a transition from `from` to `to` on every symbol in `range`.
    ///
    /// # Panics
    ///
    /// Panics if either state doesn't exist, if `range` is empty or reaches past `MAX_SYMBOL`, or
    /// if `from` already has a transition to a different state on some symbol in `range`.
    pub fn add_transition(&mut self, from: StateIdx, to: StateIdx, range: Range<u32>) {
        assert!(to < self.states.len(), "no such state: {}", to);
        assert!(range.start <= range.end && range.end <= MAX_SYMBOL, "bad range: {:?}", range);

        let mut trans: Vec<_> = self.states[from].transitions.ranges_values().cloned().collect();
        if let Some(&(r, t)) = trans.iter()
            .find(|&&(r, t)| t != to && r.start <= range.end && range.start <= r.end)
        {
            panic!("state {} already goes to {} on {:?}, can't go to {} on {:?}",
                   from, t, r, to, range);
        }
        trans.push((range, to));
        self.states[from].transitions = trans.into_iter().collect();
    }

    /// Replaces all the transitions out of `from`. The ranges must not overlap.
    pub(crate) fn set_transitions(&mut self, from: StateIdx, transitions: Vec<(Range<u32>, StateIdx)>) {
        self.states[from].transitions = transitions.into_iter().collect();
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

    /// Get transitions from a given state.
    pub fn transitions(&self, state: StateIdx) -> &RangeMap<u32, StateIdx> {
        &self.states[state].transitions
    }

    /// The state that we move to from `state` on consuming `symbol`, if there is one.
    pub fn step(&self, state: StateIdx, symbol: u32) -> Option<StateIdx> {
        self.states[state].transitions.get(symbol).cloned()
    }

    /// Returns true if this automaton accepts the whole of `s`.
    pub fn accepts(&self, s: &str) -> bool {
        if self.states.is_empty() {
            return false;
        }

        let mut state = self.init;
        for ch in s.chars() {
            match self.step(state, ch as u32) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.states[state].accept
    }

    /// Returns an equivalent DFA with a minimal number of states.
    ///
    /// Uses Hopcroft's algorithm. The states of the result are numbered in depth-first order
    /// from the initial state, so the result only depends on the language of `self`.
    pub fn minimize(&self) -> Dfa {
        Minimizer::minimize(self)
    }

    /// Minimizes this automaton and compiles it into a lookup table.
    pub fn compile(&self) -> Program {
        Program::from_dfa(&self.minimize())
    }

    /// Returns the transitions of this automaton, indexed by their target states.
    fn reversed_transitions(&self) -> Vec<RangeMultiMap<u32, StateIdx>> {
        let mut ret = vec![RangeMultiMap::new(); self.states.len()];

        for (source, st) in self.states.iter().enumerate() {
            for &(range, target) in st.transitions.ranges_values() {
                ret[target].insert(range, source);
            }
        }

        ret
    }

    fn map_states<F: FnMut(StateIdx) -> StateIdx>(&mut self, mut map: F) {
        for st in &mut self.states {
            st.transitions.map_values(|x| map(*x));
        }
        self.init = map(self.init);
    }

    /// Sorts states in depth-first alphabetical order.
    ///
    /// This has the following advantages:
    /// - the construction of a `Dfa` becomes deterministic: without sorting, the states aren't in
    ///   deterministic order because `minimize` uses hashing.
    /// - better locality: after sorting, many transitions just go straight to the next state.
    /// - we prune unreachable states.
    pub(crate) fn sort_states(&mut self) {
        if self.states.is_empty() {
            return;
        }
        let sorted = self.dfs_order(Some(self.init));

        // Not every old state will necessarily get mapped to a new one (unreachable states won't).
        let mut state_map: Vec<Option<StateIdx>> = vec![None; self.states.len()];
        let mut old_states = vec![State::new(false); sorted.len()];
        mem::swap(&mut old_states, &mut self.states);

        for (new_idx, old_idx) in sorted.into_iter().enumerate() {
            state_map[old_idx] = Some(new_idx);
            mem::swap(&mut old_states[old_idx], &mut self.states[new_idx]);
        }

        // Every state that a kept state points to was reached by the search, so it has a new
        // index.
        self.map_states(|s| state_map[s].unwrap_or(s));
    }

    /// Returns the same automaton, without the states that are unreachable from the initial
    /// state and the states from which no accepting state can be reached.
    ///
    /// The initial state is always kept, so the result has at least one state (unless `self` has
    /// none).
    fn trimmed(&self) -> Dfa {
        if self.states.is_empty() {
            return self.clone();
        }

        let fwd = self.reachable_from(Some(self.init));
        let back = self.reversed().reachable_from(self.accept_states());
        let keep = |i: StateIdx| i == self.init || (fwd.contains(i) && back.contains(i));

        let mut state_map: Vec<Option<StateIdx>> = vec![None; self.states.len()];
        let mut ret = Dfa::new();
        for i in (0..self.states.len()).filter(|&i| keep(i)) {
            state_map[i] = Some(ret.add_state(self.states[i].accept));
        }
        for (old, new) in state_map.iter().enumerate().filter_map(|(o, n)| n.map(|n| (o, n))) {
            let trans = self.states[old].transitions.ranges_values()
                .filter_map(|&(range, tgt)| state_map[tgt].map(|t| (range, t)))
                .collect();
            ret.set_transitions(new, trans);
        }
        if let Some(init) = state_map[self.init] {
            ret.init = init;
        }
        ret
    }

    /// Returns true if this automaton accepts no words at all.
    pub fn is_empty(&self) -> bool {
        if self.states.is_empty() {
            return true;
        }
        let reachable = self.reachable_from(Some(self.init));
        !reachable.iter().any(|s| self.states[s].accept)
    }

    /// Returns true if the empty word is accepted.
    pub fn accepts_empty_string(&self) -> bool {
        !self.states.is_empty() && self.states[self.init].accept
    }

    /// Returns true if this automaton accepts only finitely many words.
    pub fn is_finite(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        // After trimming, every state lies on a path to an accepting state, so any cycle can be
        // pumped.
        let live = self.trimmed();
        !live.has_cycles_from(Some(live.init))
    }

    /// Returns true if every state has a transition on every symbol of the alphabet.
    pub fn is_total(&self) -> bool {
        !self.states.is_empty() && self.states.iter().all(|st| {
            let mut next = 0u32;
            for &(range, _) in st.transitions.ranges_values() {
                if range.start != next {
                    return false;
                }
                next = range.end + 1;
            }
            next == MAX_SYMBOL + 1
        })
    }

    /// Returns a shortest word accepted by this automaton, or `None` if it accepts nothing.
    ///
    /// Among the shortest words, the one that is smallest in code-point order is returned.
    pub fn shortest_example(&self) -> Option<String> {
        if self.states.is_empty() {
            return None;
        }

        // For every visited state, the state we came from and the char we read to get here.
        let mut parent: Vec<Option<(StateIdx, char)>> = vec![None; self.states.len()];
        let mut visited = vec![false; self.states.len()];
        let mut queue = VecDeque::new();
        visited[self.init] = true;
        queue.push_back(self.init);

        while let Some(cur) = queue.pop_front() {
            if self.states[cur].accept {
                let mut word = Vec::new();
                let mut s = cur;
                while let Some((prev, ch)) = parent[s] {
                    word.push(ch);
                    s = prev;
                }
                return Some(word.into_iter().rev().collect());
            }

            for &(range, tgt) in self.states[cur].transitions.ranges_values() {
                if !visited[tgt] {
                    if let Some(ch) = first_char(range) {
                        visited[tgt] = true;
                        parent[tgt] = Some((cur, ch));
                        queue.push_back(tgt);
                    }
                }
            }
        }
        None
    }
}

impl Default for Dfa {
    fn default() -> Dfa {
        Dfa::new()
    }
}

impl<'a> From<&'a Dfa> for Nfa {
    fn from(dfa: &'a Dfa) -> Nfa {
        let mut ret = Nfa::with_capacity(dfa.num_states());
        for st in &dfa.states {
            ret.add_state(st.accept);
        }
        for (idx, st) in dfa.states.iter().enumerate() {
            for &(range, target) in st.transitions.ranges_values() {
                ret.add_transition(idx, target, range);
            }
        }
        if !dfa.states.is_empty() {
            ret.set_init(dfa.init);
        }
        ret
    }
}

impl Debug for Dfa {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_fmt(format_args!("Dfa ({} states):\n", self.states.len()))?;
        f.write_fmt(format_args!("Init: {}\n", self.init))?;

        for (st_idx, st) in self.states.iter().enumerate().take(40) {
            f.write_fmt(format_args!("\tState {} (accepting: {}):\n", st_idx, st.accept))?;

            if !st.transitions.is_empty() {
                f.write_str("\t\tTransitions:\n")?;
                // Cap it at 5 transitions, since it gets unreadable otherwise.
                for &(range, target) in st.transitions.ranges_values().take(5) {
                    f.write_fmt(format_args!("\t\t\t{} -- {} => {}\n",
                                             range.start, range.end, target))?;
                }
                if st.transitions.num_ranges() > 5 {
                    f.write_str("\t\t\t...\n")?;
                }
            }
        }
        if self.states.len() > 40 {
            f.write_fmt(format_args!("\t...({} more states)\n", self.states.len() - 40))?;
        }
        Ok(())
    }
}
