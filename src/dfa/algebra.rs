// Copyright 2016 Joe Neeman.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The operations on deterministic automata: totalization, complement, and the product
//! constructions (intersection, difference and union).
//!
//! None of these operations minimize their results; call `minimize` for that.

use crate::dfa::Dfa;
use crate::error::Error;
use crate::nfa::StateIdx;
use crate::MAX_SYMBOL;
use range_map::Range;
use std::collections::{HashMap, HashSet};

// Splits two sorted lists of non-overlapping ranges into the ranges on which both are defined.
fn overlaps<A: Copy, B: Copy>(xs: &[(Range<u32>, A)], ys: &[(Range<u32>, B)])
-> Vec<(Range<u32>, A, B)> {
    let mut ret = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < xs.len() && j < ys.len() {
        let (x_range, x) = xs[i];
        let (y_range, y) = ys[j];
        if let Some(r) = x_range.intersection(&y_range) {
            ret.push((r, x, y));
        }
        if x_range.end <= y_range.end {
            i += 1;
        }
        if y_range.end <= x_range.end {
            j += 1;
        }
    }
    ret
}

impl Dfa {
    /// Returns an automaton with the same language in which every state has a transition on every
    /// symbol.
    ///
    /// If this automaton is not already total, one non-accepting sink state is added, and every
    /// missing transition goes there. Fails with `Error::TooManyStates` if that would make more
    /// than `max_states` states.
    pub fn totalize(&self, max_states: usize) -> crate::Result<Dfa> {
        let mut ret = self.clone();
        if ret.states.is_empty() {
            ret.add_state(false);
        }
        if ret.is_total() {
            return Ok(ret);
        }
        if ret.num_states() >= max_states {
            debug!("no room for a sink state in a Dfa with {} states", ret.num_states());
            return Err(Error::TooManyStates);
        }

        let sink = ret.add_state(false);
        for idx in 0..ret.states.len() {
            let mut trans: Vec<_> = ret.states[idx].transitions.ranges_values().cloned().collect();
            let mut gaps = Vec::new();
            let mut next = 0u32;
            for &(range, _) in &trans {
                if range.start > next {
                    gaps.push(Range::new(next, range.start - 1));
                }
                next = range.end + 1;
            }
            if next <= MAX_SYMBOL {
                gaps.push(Range::new(next, MAX_SYMBOL));
            }
            trans.extend(gaps.into_iter().map(|r| (r, sink)));
            ret.set_transitions(idx, trans);
        }
        Ok(ret)
    }

    /// Returns an automaton accepting exactly the words that this one rejects.
    ///
    /// The result is total. Fails with `Error::TooManyStates` if totalizing needs more than
    /// `max_states` states.
    pub fn complement(&self, max_states: usize) -> crate::Result<Dfa> {
        let mut ret = self.totalize(max_states)?;
        for st in &mut ret.states {
            st.accept = !st.accept;
        }
        Ok(ret)
    }

    /// Returns an automaton accepting the words accepted by both `self` and `other`.
    pub fn intersect(&self, other: &Dfa, max_states: usize) -> crate::Result<Dfa> {
        Product::run(&self.totalize(max_states)?, &other.totalize(max_states)?, max_states,
                     |a, b| a && b)
    }

    /// Returns an automaton accepting the words accepted by `self` or by `other`.
    ///
    /// Unlike `Nfa::union`, the result is deterministic.
    pub fn union_dfa(&self, other: &Dfa, max_states: usize) -> crate::Result<Dfa> {
        Product::run(&self.totalize(max_states)?, &other.totalize(max_states)?, max_states,
                     |a, b| a || b)
    }

    /// Returns an automaton accepting the words accepted by `self` but not by `other`.
    pub fn difference(&self, other: &Dfa, max_states: usize) -> crate::Result<Dfa> {
        self.intersect(&other.complement(max_states)?, max_states)
    }

    /// Returns true if every word accepted by `self` is also accepted by `other`.
    ///
    /// This explores the product of the two automata on the fly, without building it.
    pub fn subset_of(&self, other: &Dfa) -> bool {
        if self.states.is_empty() {
            return true;
        }

        // `None` is the implicit dead state of `other`.
        let init = (self.init, if other.states.is_empty() { None } else { Some(other.init) });
        let mut seen: HashSet<(StateIdx, Option<StateIdx>)> = HashSet::new();
        let mut stack = vec![init];
        seen.insert(init);

        while let Some((p, q)) = stack.pop() {
            let q_accept = q.map_or(false, |q| other.states[q].accept);
            if self.states[p].accept && !q_accept {
                return false;
            }

            let p_trans: Vec<_> = self.states[p].transitions.ranges_values().cloned().collect();
            let mut next = Vec::new();
            match q {
                Some(q) => {
                    let q_trans: Vec<_> = other.states[q].transitions.ranges_values().cloned().collect();
                    for &(p_range, p_tgt) in &p_trans {
                        let mut covered = 0u64;
                        for (r, _, q_tgt) in overlaps(&[(p_range, ())], &q_trans) {
                            covered += (r.end - r.start) as u64 + 1;
                            next.push((p_tgt, Some(q_tgt)));
                        }
                        if covered < (p_range.end - p_range.start) as u64 + 1 {
                            next.push((p_tgt, None));
                        }
                    }
                },
                None => next.extend(p_trans.iter().map(|&(_, p_tgt)| (p_tgt, None))),
            }

            for pair in next {
                if seen.insert(pair) {
                    stack.push(pair);
                }
            }
        }
        true
    }

    /// Returns true if `self` and `other` accept the same words.
    pub fn equivalent(&self, other: &Dfa) -> bool {
        self.subset_of(other) && other.subset_of(self)
    }
}

// The product construction, run only over the pairs of states that are reachable from the pair of
// initial states.
struct Product<'a, F> {
    left: &'a Dfa,
    right: &'a Dfa,
    accept: F,
    dfa: Dfa,
    state_map: HashMap<(StateIdx, StateIdx), StateIdx>,
    active_states: Vec<(StateIdx, StateIdx)>,
    max_states: usize,
}

impl<'a, F: Fn(bool, bool) -> bool> Product<'a, F> {
    fn run(left: &'a Dfa, right: &'a Dfa, max_states: usize, accept: F) -> crate::Result<Dfa> {
        let mut prod = Product {
            left,
            right,
            accept,
            dfa: Dfa::new(),
            state_map: HashMap::new(),
            active_states: Vec::new(),
            max_states,
        };

        let init = prod.add_state((left.init, right.init))?;
        prod.dfa.set_init(init);
        while let Some(pair) = prod.active_states.pop() {
            let idx = prod.state_map[&pair];
            let left_trans: Vec<_> = left.states[pair.0].transitions.ranges_values().cloned().collect();
            let right_trans: Vec<_> = right.states[pair.1].transitions.ranges_values().cloned().collect();

            let mut trans = Vec::new();
            for (range, l, r) in overlaps(&left_trans, &right_trans) {
                trans.push((range, prod.add_state((l, r))?));
            }
            prod.dfa.set_transitions(idx, trans);
        }

        debug!("product of Dfas with {} and {} states has {} states",
               left.num_states(), right.num_states(), prod.dfa.num_states());
        Ok(prod.dfa)
    }

    fn add_state(&mut self, pair: (StateIdx, StateIdx)) -> crate::Result<StateIdx> {
        if let Some(&idx) = self.state_map.get(&pair) {
            Ok(idx)
        } else if self.dfa.num_states() >= self.max_states {
            debug!("giving up on product construction after {} states", self.max_states);
            Err(Error::TooManyStates)
        } else {
            let accept = (self.accept)(self.left.states[pair.0].accept,
                                       self.right.states[pair.1].accept);
            let idx = self.dfa.add_state(accept);
            self.state_map.insert(pair, idx);
            self.active_states.push(pair);
            Ok(idx)
        }
    }
}
