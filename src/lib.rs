// Copyright 2015-2016 Joe Neeman.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/*!
This crate provides finite automata over the Unicode code points, together with the usual
operations on them: building an automaton from a pattern or from a sorted list of words,
determinization, minimization, and the set operations (union, concatenation, repetition,
intersection, complement, difference).

There are two automaton types. An `Nfa` may have epsilon transitions and overlapping ranges; it is
what the pattern compiler and the closure operations (`union`, `concat`, `star`, ...) produce. A
`Dfa` is deterministic; it is what `determinize`, `minimize` and the product operations
(`intersect`, `complement`, `difference`) produce. Transitions in both are labelled by inclusive
ranges of code points, so even automata for large character classes stay small.

For execution, a `Dfa` is compiled into a `Program`, which is a lookup table indexed by state and
symbol class. A `Program` can test whether a whole string is accepted, or it can search a string
for leftmost-longest matches through a `Matcher`.

# Example: compiling a pattern and finding matches

```rust
use automata_algebra::Dfa;

let prog = Dfa::from_regex("a*").unwrap().compile();
let spans: Vec<_> = prog.find_iter("baac").map(|m| (m.start(), m.end())).collect();
assert_eq!(spans, vec![(0, 0), (1, 3), (3, 3), (4, 4)]);
```

# Example: set operations

```rust
use automata_algebra::{Dfa, Nfa};

let words = Dfa::from_sorted_strings(&["abc", "abcdef"]).unwrap();
let pattern = Nfa::from_regex("(abc)|(abcdef)").unwrap().determinize(1000).unwrap();
assert!(words.equivalent(&pattern));

let short = Dfa::from_regex("[a-z]{1,3}").unwrap();
let only_long = words.difference(&short, 1000).unwrap();
assert!(only_long.accepts("abcdef"));
assert!(!only_long.accepts("abc"));
```
*/

extern crate bit_set;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate range_map;
extern crate refinery;
extern crate regex_syntax;

#[cfg(test)]
extern crate env_logger;
#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
extern crate quickcheck_macros;

mod dfa;
mod error;
mod graph;
mod nfa;
mod runner;
mod string_union;

pub use dfa::Dfa;
pub use error::Error;
pub use nfa::{Nfa, NfaBuilder, StateIdx};
pub use range_map::Range;
pub use runner::matcher::{Match, Matcher, Matches};
pub use runner::program::Program;
pub use string_union::StringUnionBuilder;

pub type Result<T> = std::result::Result<T, Error>;

/// The largest symbol that an automaton may consume.
///
/// Symbols are Unicode scalar values, represented as `u32`. The alphabet is the range
/// `0..=MAX_SYMBOL`.
pub const MAX_SYMBOL: u32 = 0x10FFFF;

/// The whole alphabet, as a single range.
pub fn alphabet() -> Range<u32> {
    Range::new(0, MAX_SYMBOL)
}

#[cfg(test)]
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
