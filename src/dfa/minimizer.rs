// Copyright 2015-2016 Joe Neeman.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::dfa::{Dfa, State};
use crate::nfa::{StateIdx, StateSet};
use range_map::{RangeMultiMap, RangeSet};
use refinery::Partition;
use std::collections::{HashMap, HashSet};

pub struct Minimizer {
    partition: Partition,
    distinguishers: HashSet<usize>,
    // The reversed transitions of the dfa.
    rev: Vec<RangeMultiMap<u32, StateIdx>>,
}

impl Minimizer {
    // States that differ in acceptance, or in the set of symbols that they have transitions on,
    // can never be merged. In a trimmed Dfa every missing transition leads to the implicit dead
    // state, which is distinguishable from every real state.
    fn initial_partition(dfa: &Dfa) -> Vec<Vec<StateIdx>> {
        let mut part: HashMap<(bool, RangeSet<u32>), Vec<StateIdx>> = HashMap::new();
        for (idx, st) in dfa.states.iter().enumerate() {
            let chars = st.transitions.to_range_set();
            part.entry((st.accept, chars)).or_insert_with(Vec::new).push(idx);
        }
        part.into_iter().map(|x| x.1).collect()
    }

    // Refine the current partition based on the fact that everything in `splitter` is distinct
    // from everything not in it.
    fn refine(&mut self, splitter: &[StateIdx]) {
        let dists = &mut self.distinguishers;

        self.partition.refine_with_callback(splitter, |p, int_idx, diff_idx| {
            if dists.contains(&int_idx) || p.part(diff_idx).len() < p.part(int_idx).len() {
                dists.insert(diff_idx);
            } else {
                dists.insert(int_idx);
            }
        });
    }

    fn next_distinguisher(&mut self) -> Option<usize> {
        let maybe_elt = self.distinguishers.iter().next().cloned();
        if let Some(elt) = maybe_elt {
            self.distinguishers.remove(&elt);
        }
        maybe_elt
    }

    // For every symbol, the set of states that move into part `part_idx` on that symbol. Each
    // distinct set is returned once.
    fn get_input_sets(&mut self, part_idx: usize) -> Vec<StateSet> {
        let inputs: Vec<_> = self.partition.part(part_idx)
                .iter()
                .flat_map(|s| self.rev[*s].ranges_values().cloned())
                .collect();
        if inputs.is_empty() {
            return Vec::new();
        }

        let inputs = RangeMultiMap::from_vec(inputs);
        let mut sets: Vec<StateSet> = inputs.group()
            .ranges_values()
            .map(|&(_, ref x)| x.clone())
            .collect();
        for set in &mut sets {
            set.sort();
            set.dedup();
        }
        sets.sort();
        sets.dedup();
        sets
    }

    fn compute_partition(&mut self) {
        while let Some(dist) = self.next_distinguisher() {
            let sets = self.get_input_sets(dist);

            for set in &sets {
                self.refine(set);
            }
        }
    }

    pub fn minimize(dfa: &Dfa) -> Dfa {
        let dfa = dfa.trimmed();
        if dfa.num_states() == 0 {
            return dfa;
        }

        let mut min = Minimizer::new(&dfa);
        min.compute_partition();

        // We need to re-index the states: build a map that maps old indices to
        // new indices.
        let mut reps: Vec<StateIdx> = Vec::with_capacity(min.partition.num_parts());
        let mut old_state_to_new = vec![0; dfa.num_states()];
        for part in min.partition.iter() {
            // There are no empty sets in the partition.
            if let Some(&rep_idx) = part.iter().next() {
                for &state in part.iter() {
                    old_state_to_new[state] = reps.len();
                }
                reps.push(rep_idx);
            }
        }

        let mut ret = Dfa::new();
        for &rep in &reps {
            ret.states.push(State::new(dfa.states[rep].accept));
        }
        for (new_idx, &rep) in reps.iter().enumerate() {
            // Merging states can make adjacent ranges go to the same place, so the transitions
            // get re-normalized here.
            let trans = dfa.states[rep].transitions.ranges_values()
                .map(|&(range, tgt)| (range, old_state_to_new[tgt]))
                .collect();
            ret.set_transitions(new_idx, trans);
        }
        ret.init = old_state_to_new[dfa.init];
        ret.sort_states();

        debug!("minimized a Dfa with {} states into one with {} states",
               dfa.num_states(), ret.num_states());
        ret
    }

    fn new(dfa: &Dfa) -> Minimizer {
        let init = Minimizer::initial_partition(dfa);
        let part = Partition::new(init.into_iter().map(|set| set.into_iter()), dfa.num_states());

        // Hopcroft's algorithm may leave out one block of the initial partition: splitting by
        // every other block also splits by their union, which is the complement of the omitted
        // one. For a partial Dfa this relies on the initial blocks being keyed on the transition
        // domain. Two states in one block then have transitions on exactly the same symbols, so
        // a missing transition (into the implicit dead state) can never tell them apart later.
        // We leave out the biggest non-accepting block.
        let mut dists: HashSet<usize> = (0..part.num_parts()).collect();
        let worst = (0..dists.len())
            .filter(|i| !dfa.states[part.part(*i)[0]].accept)
            .max_by_key(|i| part.part(*i).len());
        if let Some(worst) = worst {
            dists.remove(&worst);
        }

        Minimizer {
            partition: part,
            distinguishers: dists,
            rev: dfa.reversed_transitions(),
        }
    }
}
