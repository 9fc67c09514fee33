// Copyright 2016 Joe Neeman.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The regular operations on non-deterministic automata.
//!
//! These all work by copying their operands into a fresh `Nfa` and joining the copies with
//! epsilon transitions, so they never fail and never blow up: the result has at most a couple more
//! states than the operands put together. An operand with no states is treated as accepting
//! nothing.

use crate::nfa::{Nfa, StateIdx};

impl Nfa {
    // The accepting states of `self`, shifted by `offset`.
    fn shifted_accept_states(&self, offset: StateIdx) -> Vec<StateIdx> {
        self.accept_states().map(|s| s + offset).collect()
    }

    /// Returns an automaton accepting the words accepted by either `self` or `other`.
    pub fn union(&self, other: &Nfa) -> Nfa {
        let mut ret = Nfa::with_capacity(self.num_states() + other.num_states() + 1);
        let init = ret.add_state(false);
        for operand in &[self, other] {
            if !operand.is_empty() {
                let offset = ret.append(operand);
                ret.add_eps(init, offset + operand.init());
            }
        }
        ret
    }

    /// Returns an automaton accepting the concatenations of a word accepted by `self` with a word
    /// accepted by `other`.
    pub fn concat(&self, other: &Nfa) -> Nfa {
        if self.is_empty() || other.is_empty() {
            return Nfa::empty();
        }

        let mut ret = self.clone();
        let offset = ret.append(other);
        for s in self.accept_states() {
            ret.set_accept(s, false);
            ret.add_eps(s, offset + other.init());
        }
        ret
    }

    /// Returns an automaton accepting any number (including zero) of concatenated words from
    /// `self`.
    pub fn star(&self) -> Nfa {
        if self.is_empty() {
            return Nfa::empty_string();
        }

        // A fresh initial state, so that accepting the empty word doesn't make anything that
        // loops back to our old initial state accepting.
        let mut ret = Nfa::with_capacity(self.num_states() + 1);
        let init = ret.add_state(true);
        let offset = ret.append(self);
        ret.add_eps(init, offset + self.init());
        for s in self.shifted_accept_states(offset) {
            ret.add_eps(s, init);
        }
        ret
    }

    /// Returns an automaton accepting one or more concatenated words from `self`.
    pub fn plus(&self) -> Nfa {
        if self.is_empty() {
            return Nfa::empty();
        }

        let mut ret = self.clone();
        let init = ret.init();
        for s in self.accept_states() {
            ret.add_eps(s, init);
        }
        ret
    }

    /// Returns an automaton accepting the empty word, and everything that `self` accepts.
    pub fn optional(&self) -> Nfa {
        if self.is_empty() {
            return Nfa::empty_string();
        }

        let mut ret = Nfa::with_capacity(self.num_states() + 1);
        let init = ret.add_state(true);
        let offset = ret.append(self);
        ret.add_eps(init, offset + self.init());
        ret
    }

    /// Returns an automaton accepting between `min` and `max` concatenated words from `self`. If
    /// `max` is `None`, there is no upper bound. If `max < min`, the result accepts nothing.
    pub fn repeat(&self, min: u32, max: Option<u32>) -> Nfa {
        if max.map_or(false, |max| max < min) {
            return Nfa::empty();
        }

        let mut ret = Nfa::empty_string();
        for _ in 0..min {
            ret = ret.concat(self);
        }
        match max {
            None => ret.concat(&self.star()),
            Some(max) => {
                // The optional part is nested, as in (a(a(a)?)?)?, so that every copy can only
                // be entered after the one before it.
                let mut tail = Nfa::empty_string();
                for _ in min..max {
                    tail = self.concat(&tail).optional();
                }
                ret.concat(&tail)
            },
        }
    }

    /// Returns an automaton accepting the reversals of the words accepted by `self`.
    pub fn reverse(&self) -> Nfa {
        if self.is_empty() {
            return Nfa::empty();
        }

        let rev = self.reversed_transitions();
        let mut ret = Nfa::with_capacity(self.num_states() + 1);
        for s in 0..self.num_states() {
            ret.add_state(s == self.init());
        }
        for (target, sources) in rev.iter().enumerate() {
            for &(range, source) in sources.ranges_values() {
                ret.add_transition(target, source, range);
            }
        }
        for s in 0..self.num_states() {
            for &t in self.eps(s) {
                ret.add_eps(t, s);
            }
        }

        let init = ret.add_state(false);
        for s in self.accept_states() {
            ret.add_eps(init, s);
        }
        ret.set_init(init);
        ret
    }
}
