// Copyright 2016 Joe Neeman.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Direct construction of the minimal automaton for a finite, sorted set of words.
//!
//! This is the incremental algorithm of Daciuk, Mihov, Watson and Watson: words are added in
//! increasing order, and as soon as a state can no longer change (because no later word can pass
//! through it) it is merged with any equivalent state that was already finished. The automaton is
//! therefore minimal at every step (apart from the path of the last word), and is never much
//! bigger than the final result.

use crate::dfa::Dfa;
use crate::error::Error;
use crate::nfa::StateIdx;
use range_map::Range;
use std::collections::HashMap;
use std::mem;

// A state of the trie under construction. Edges are in increasing order of their labels, and
// once a state is finished, its children are all finished as well. So the node itself works as
// the structural signature of a finished state: two finished states are equivalent exactly when
// their nodes are equal.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct Node {
    accept: bool,
    edges: Vec<(u32, StateIdx)>,
}

impl Node {
    fn new() -> Node {
        Node {
            accept: false,
            edges: Vec::new(),
        }
    }
}

/// Builds the minimal deterministic automaton for a finite set of words.
///
/// The words must be added in strictly increasing order (the order of `str`'s `Ord`, which is the
/// same as ordering by code points).
///
/// # Example
///
/// ```rust
/// use automata_algebra::StringUnionBuilder;
///
/// let mut builder = StringUnionBuilder::new();
/// builder.add("cat").unwrap();
/// builder.add("cats").unwrap();
/// builder.add("dog").unwrap();
/// assert!(builder.add("cow").is_err());
///
/// let dfa = builder.finish();
/// assert!(dfa.accepts("cats"));
/// assert!(!dfa.accepts("ca"));
/// ```
#[derive(Debug)]
pub struct StringUnionBuilder {
    states: Vec<Node>,
    // Maps each finished state to its canonical representative.
    register: HashMap<Node, StateIdx>,
    // The states along the most recently added word: `path[i]` is the state after reading `i`
    // symbols. These are the only unfinished states.
    path: Vec<StateIdx>,
    previous: Vec<u32>,
    num_words: usize,
}

impl StringUnionBuilder {
    pub fn new() -> StringUnionBuilder {
        StringUnionBuilder {
            states: vec![Node::new()],
            register: HashMap::new(),
            path: vec![0],
            previous: Vec::new(),
            num_words: 0,
        }
    }

    /// The number of words that have been added.
    pub fn len(&self) -> usize {
        self.num_words
    }

    pub fn is_empty(&self) -> bool {
        self.num_words == 0
    }

    /// Adds a word to the set.
    ///
    /// Fails with `Error::Unsorted` if `word` is not strictly greater than the word before it,
    /// in which case the builder is left unchanged.
    pub fn add(&mut self, word: &str) -> crate::Result<()> {
        let symbols: Vec<u32> = word.chars().map(|c| c as u32).collect();
        if self.num_words > 0 && symbols <= self.previous {
            return Err(Error::Unsorted { index: self.num_words });
        }

        let prefix_len = self.previous.iter()
            .zip(symbols.iter())
            .take_while(|&(a, b)| a == b)
            .count();
        self.finish_path(prefix_len);

        let mut cur = self.path[prefix_len];
        for &sym in &symbols[prefix_len..] {
            let next = self.states.len();
            self.states.push(Node::new());
            self.states[cur].edges.push((sym, next));
            self.path.push(next);
            cur = next;
        }
        self.states[cur].accept = true;

        self.previous = symbols;
        self.num_words += 1;
        Ok(())
    }

    // Finishes every state on the current path that comes after the first `keep` symbols,
    // starting from the end of the path.
    fn finish_path(&mut self, keep: usize) {
        while self.path.len() > keep + 1 {
            let child = match self.path.pop() {
                Some(c) => c,
                None => break,
            };
            let parent = self.path[self.path.len() - 1];
            let canonical = self.intern(child);

            // The child was reached by the last (that is, the largest) edge of its parent.
            if let Some(edge) = self.states[parent].edges.last_mut() {
                edge.1 = canonical;
            }
        }
    }

    // Returns the registered state that is equivalent to `idx`, registering `idx` if there isn't
    // one.
    fn intern(&mut self, idx: StateIdx) -> StateIdx {
        let node = self.states[idx].clone();
        *self.register.entry(node).or_insert(idx)
    }

    /// Finishes the construction and returns the automaton.
    ///
    /// The result is minimal, and its states are numbered in the same canonical order as those
    /// returned by `Dfa::minimize`.
    pub fn finish(mut self) -> Dfa {
        self.finish_path(0);

        // Only the states reachable from the root survive; the others were merged into
        // registered equivalents.
        let mut state_map: HashMap<StateIdx, StateIdx> = HashMap::new();
        let mut ret = Dfa::new();
        let mut stack = vec![0];
        state_map.insert(0, ret.add_state(self.states[0].accept));
        while let Some(old) = stack.pop() {
            for &(_, child) in &self.states[old].edges {
                if !state_map.contains_key(&child) {
                    state_map.insert(child, ret.add_state(self.states[child].accept));
                    stack.push(child);
                }
            }
        }

        let states = mem::replace(&mut self.states, Vec::new());
        for (&old, &new) in &state_map {
            let trans = states[old].edges.iter()
                .map(|&(sym, child)| (Range::single(sym), state_map[&child]))
                .collect();
            ret.set_transitions(new, trans);
        }
        ret.set_init(state_map[&0]);
        ret.sort_states();

        debug!("built a Dfa with {} states for {} words", ret.num_states(), self.num_words);
        ret
    }
}

impl Default for StringUnionBuilder {
    fn default() -> StringUnionBuilder {
        StringUnionBuilder::new()
    }
}

impl Dfa {
    /// Builds the minimal automaton that accepts exactly the given words.
    ///
    /// The words must be in strictly increasing order; otherwise this fails with
    /// `Error::Unsorted`, giving the position of the first word that is out of order (a duplicate
    /// counts as out of order).
    pub fn from_sorted_strings<I, S>(words: I) -> crate::Result<Dfa>
    where
        I: IntoIterator<Item=S>,
        S: AsRef<str>,
    {
        let mut builder = StringUnionBuilder::new();
        for w in words {
            builder.add(w.as_ref())?;
        }
        Ok(builder.finish())
    }
}
