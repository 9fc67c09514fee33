// Copyright 2016 Joe Neeman.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use bit_set::BitSet;
use crate::dfa::Dfa;
use crate::nfa::StateIdx;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DfsInstruction {
    Continue,
    Stop,
}

pub trait Graph {
    fn num_states(&self) -> usize;

    fn neighbors<'a>(&'a self, i: StateIdx) -> Box<dyn Iterator<Item=StateIdx> + 'a>;

    /// Does a depth-first search of this graph.
    ///
    /// Every time the search visits a new state, `visit` will be called. Every time the search
    /// detects a loop, `cycle` will be called with the states on the loop. The return value of
    /// these callbacks tell the search how to proceed:
    /// on `Continue` the search proceeds normally, and on `Stop` it terminates early.
    ///
    /// Neighbors are explored in the order that `neighbors` returns them, so the order of visits
    /// is a deterministic function of the graph.
    fn dfs<Inits, Visit, Cycle>(&self, init: Inits, mut visit: Visit, mut cycle: Cycle)
    where
        Visit: FnMut(StateIdx) -> DfsInstruction,
        Cycle: FnMut(&[StateIdx]) -> DfsInstruction,
        Inits: IntoIterator<Item=StateIdx>,
    {
        let n = self.num_states();
        let mut stack: Vec<StateIdx> = Vec::with_capacity(n);
        let mut remaining_children_stack: Vec<Box<dyn Iterator<Item=StateIdx> + '_>>
            = Vec::with_capacity(n);
        let mut visiting = vec![false; n];
        let mut done = vec![false; n];

        // For states that we are currently visiting, this is their position on the stack.
        let mut stack_pos = vec![0; n];

        for start_idx in init {
            if done[start_idx] {
                continue;
            }
            if visit(start_idx) == DfsInstruction::Stop {
                return;
            }

            visiting[start_idx] = true;
            stack_pos[start_idx] = 0;
            stack.push(start_idx);
            remaining_children_stack.push(self.neighbors(start_idx));

            // `stack` and `remaining_children_stack` always have the same length.
            while let Some(&cur) = stack.last() {
                let next_child = remaining_children_stack.last_mut().and_then(|c| c.next());
                match next_child {
                    Some(child) if visiting[child] => {
                        if cycle(&stack[stack_pos[child]..]) == DfsInstruction::Stop {
                            return;
                        }
                    },
                    Some(child) if !done[child] => {
                        if visit(child) == DfsInstruction::Stop {
                            return;
                        }
                        visiting[child] = true;
                        stack_pos[child] = stack.len();
                        stack.push(child);
                        remaining_children_stack.push(self.neighbors(child));
                    },
                    Some(_) => {},
                    None => {
                        visiting[cur] = false;
                        done[cur] = true;
                        stack.pop();
                        remaining_children_stack.pop();
                    },
                }
            }
        }
    }

    /// Returns a list of states, visited in depth-first order.
    fn dfs_order<I: IntoIterator<Item=StateIdx>>(&self, init: I) -> Vec<StateIdx> {
        let mut ret: Vec<StateIdx> = Vec::new();
        self.dfs(init, |st| { ret.push(st); DfsInstruction::Continue }, |_| DfsInstruction::Continue);
        ret
    }

    /// The set of states that can be reached from `init` (including `init` itself).
    fn reachable_from<I: IntoIterator<Item=StateIdx>>(&self, init: I) -> BitSet {
        let mut ret = BitSet::with_capacity(self.num_states());
        self.dfs(init, |st| { ret.insert(st); DfsInstruction::Continue }, |_| DfsInstruction::Continue);
        ret
    }

    /// Checks whether there is a cycle reachable from `init`.
    fn has_cycles_from<I: IntoIterator<Item=StateIdx>>(&self, init: I) -> bool {
        let mut found = false;
        self.dfs(init, |_| DfsInstruction::Continue, |_| { found = true; DfsInstruction::Stop });
        found
    }

    /// Returns the same graph, but with every edge pointing the other way.
    fn reversed(&self) -> Reversed {
        let mut preds = vec![Vec::new(); self.num_states()];
        for i in 0..self.num_states() {
            for j in self.neighbors(i) {
                preds[j].push(i);
            }
        }
        for p in &mut preds {
            p.sort();
            p.dedup();
        }
        Reversed { preds }
    }
}

/// A graph that is stored as a list of predecessors of some other graph.
pub struct Reversed {
    preds: Vec<Vec<StateIdx>>,
}

impl Graph for Reversed {
    fn num_states(&self) -> usize {
        self.preds.len()
    }

    fn neighbors<'a>(&'a self, i: StateIdx) -> Box<dyn Iterator<Item=StateIdx> + 'a> {
        Box::new(self.preds[i].iter().cloned())
    }
}

impl Graph for Dfa {
    fn num_states(&self) -> usize {
        Dfa::num_states(self)
    }

    fn neighbors<'a>(&'a self, i: StateIdx) -> Box<dyn Iterator<Item=StateIdx> + 'a> {
        Box::new(self.transitions(i).ranges_values().map(|x| x.1))
    }
}
