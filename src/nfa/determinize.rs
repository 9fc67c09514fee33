// Copyright 2016 Joe Neeman.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::dfa::Dfa;
use crate::error::Error;
use crate::nfa::{Nfa, StateIdx, StateSet};
use itertools::Itertools;
use range_map::Range;
use std::collections::HashMap;

impl Nfa {
    /// Splits the outgoing transitions of a set of states into elementary intervals.
    ///
    /// Returns a list of non-overlapping ranges in increasing order, each paired with the
    /// (epsilon-closed) set of states that can be reached by consuming any symbol in the range.
    /// Symbols that lead nowhere are left out.
    pub fn transition_map(&self, states: &[StateIdx]) -> Vec<(Range<u32>, StateSet)> {
        let trans: Vec<(Range<u32>, StateIdx)> = states.iter()
            .flat_map(|&s| self.consuming(s).ranges_values().cloned())
            .collect();
        if trans.is_empty() {
            return Vec::new();
        }

        // The boundary points: every place where some range begins, or where some range has just
        // ended. Between consecutive boundary points, every range either covers everything or
        // nothing.
        let mut start_symbs = Vec::with_capacity(trans.len() * 2);
        for &(range, _) in &trans {
            start_symbs.push(range.start);
            if range.end < u32::MAX {
                start_symbs.push(range.end + 1);
            }
        }
        start_symbs.sort();
        start_symbs.dedup();

        let mut pieces: Vec<(usize, StateIdx)> = Vec::new();
        for &(range, target) in &trans {
            // Every range start is a boundary point, so this search always succeeds.
            let mut idx = start_symbs.binary_search(&range.start).unwrap_or_else(|i| i);
            while idx < start_symbs.len() && start_symbs[idx] <= range.end {
                pieces.push((idx, target));
                idx += 1;
            }
        }
        pieces.sort();
        pieces.dedup();

        let mut ret = Vec::new();
        for (idx, group) in &pieces.into_iter().chunk_by(|p| p.0) {
            let end = if idx + 1 < start_symbs.len() { start_symbs[idx + 1] - 1 } else { u32::MAX };
            let targets = self.eps_closure(group.map(|p| p.1));
            ret.push((Range::new(start_symbs[idx], end), targets));
        }
        ret
    }

    /// Builds a deterministic automaton with the same language as this one, using the subset
    /// construction.
    ///
    /// Only subsets that are reachable from the initial state become states of the result, and
    /// the result has no explicit sink: symbols that lead nowhere have no transition. Fails with
    /// `Error::TooManyStates` if the result would need more than `max_states` states.
    pub fn determinize(&self, max_states: usize) -> crate::Result<Dfa> {
        Determinizer::determinize(self, max_states)
    }
}

struct Determinizer<'a> {
    nfa: &'a Nfa,
    dfa: Dfa,
    state_map: HashMap<StateSet, StateIdx>,
    active_states: Vec<StateSet>,
    max_states: usize,
}

impl<'a> Determinizer<'a> {
    fn determinize(nfa: &Nfa, max_states: usize) -> crate::Result<Dfa> {
        let mut det = Determinizer::new(nfa, max_states);
        det.run()?;
        debug!("determinized an Nfa with {} states into a Dfa with {} states",
               nfa.num_states(), det.dfa.num_states());
        Ok(det.dfa)
    }

    fn new(nfa: &'a Nfa, max_states: usize) -> Determinizer<'a> {
        Determinizer {
            nfa,
            dfa: Dfa::new(),
            state_map: HashMap::new(),
            active_states: Vec::new(),
            max_states,
        }
    }

    // Tries to add a new state to the Dfa.
    //
    // If the state already exists, returns the index of the old one. If there are too many states,
    // returns an error.
    fn add_state(&mut self, s: StateSet) -> crate::Result<StateIdx> {
        if let Some(&idx) = self.state_map.get(&s) {
            Ok(idx)
        } else if self.dfa.num_states() >= self.max_states {
            debug!("giving up on determinization after {} states", self.max_states);
            Err(Error::TooManyStates)
        } else {
            let new_state = self.dfa.add_state(self.nfa.any_accept(&s));
            self.active_states.push(s.clone());
            self.state_map.insert(s, new_state);
            Ok(new_state)
        }
    }

    // Creates a deterministic automaton representing the same language as our `nfa`.
    // Puts the new Dfa in self.dfa.
    fn run(&mut self) -> crate::Result<()> {
        if self.nfa.is_empty() {
            // No states means no words, which we represent by a single rejecting state.
            let init = self.add_state(Vec::new())?;
            self.dfa.set_init(init);
            return Ok(());
        }

        let init = self.add_state(self.nfa.eps_closure(Some(self.nfa.init())))?;
        self.dfa.set_init(init);

        while let Some(state) = self.active_states.pop() {
            let state_idx = self.state_map[&state];
            let trans = self.nfa.transition_map(&state);

            let mut dfa_trans = Vec::with_capacity(trans.len());
            for (range, target) in trans {
                let target_idx = self.add_state(target)?;
                dfa_trans.push((range, target_idx));
            }
            self.dfa.set_transitions(state_idx, dfa_trans);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::nfa::tests::trans_nfa;
    use crate::nfa::Nfa;
    use range_map::Range;

    #[test]
    fn elementary_intervals() {
        let mut nfa = Nfa::with_capacity(3);
        nfa.add_state(false);
        nfa.add_state(false);
        nfa.add_state(true);
        nfa.add_transition(0, 1, Range::new('a' as u32, 'm' as u32));
        nfa.add_transition(0, 2, Range::new('f' as u32, 'z' as u32));

        let map = nfa.transition_map(&[0]);
        assert_eq!(map, vec![
            (Range::new('a' as u32, 'e' as u32), vec![1]),
            (Range::new('f' as u32, 'm' as u32), vec![1, 2]),
            (Range::new('n' as u32, 'z' as u32), vec![2]),
        ]);
    }

    #[test]
    fn transition_targets_are_closed() {
        let mut nfa = trans_nfa(4, &[(0, 1, 'a')]);
        nfa.add_eps(1, 3);
        assert_eq!(nfa.transition_map(&[0]), vec![(Range::single('a' as u32), vec![1, 3])]);
        assert!(nfa.transition_map(&[2]).is_empty());
    }

    #[test]
    fn determinize_simple() {
        let nfa = Nfa::from_regex("a|ab").unwrap();
        let dfa = nfa.determinize(100).unwrap();
        assert!(dfa.accepts("a"));
        assert!(dfa.accepts("ab"));
        assert!(!dfa.accepts("b"));
        assert!(!dfa.accepts(""));
        assert_eq!(dfa.num_states(), 3);
    }

    #[test]
    fn determinize_overlapping_ranges() {
        // [a-m]x | [f-z]y, which needs the range [f-m] to be split out.
        let nfa = Nfa::from_regex("[a-m]x|[f-z]y").unwrap();
        let dfa = nfa.determinize(100).unwrap();
        for w in &["ax", "gx", "gy", "zy"] {
            assert!(dfa.accepts(w), "{}", w);
        }
        for w in &["ay", "zx", "g", ""] {
            assert!(!dfa.accepts(w), "{}", w);
        }
    }

    #[test]
    fn determinize_empty_nfa() {
        let dfa = Nfa::new().determinize(10).unwrap();
        assert_eq!(dfa.num_states(), 1);
        assert!(!dfa.accepts(""));
    }

    #[test]
    fn too_many_states() {
        // The classic blow-up: the 8th symbol from the end is an 'a'.
        let nfa = Nfa::from_regex("[ab]*a[ab]{7}").unwrap();
        match nfa.determinize(100) {
            Err(Error::TooManyStates) => {},
            other => panic!("expected TooManyStates, got {:?}", other),
        }
        assert_eq!(nfa.determinize(1000).unwrap().minimize().num_states(), 256);
    }

    #[test]
    fn state_cap_is_inclusive() {
        let nfa = Nfa::literal("abc");
        assert_eq!(nfa.determinize(4).unwrap().num_states(), 4);
        assert!(nfa.determinize(3).is_err());
    }
}
