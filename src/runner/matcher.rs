// Copyright 2016 Joe Neeman.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::error::Error;
use crate::runner::program::Program;
use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MatchState {
    /// There is no current match.
    Seeking,
    /// The most recent call to `find` found a match at this span.
    HasMatch { start: usize, end: usize },
    /// There are no more matches.
    Done,
}

/// Finds successive leftmost-longest matches of a `Program` in a string.
///
/// Each call to `find` looks for a match starting at the earliest possible position (at or after
/// the end of the previous match), and takes the longest match that starts there. A match may be
/// empty; after an empty match, the search resumes one character later. In particular, there may
/// be an empty match at the very end of the input.
///
/// Offsets are byte offsets into the input, and they always fall on `char` boundaries.
///
/// # Example
///
/// ```rust
/// use automata_algebra::Dfa;
///
/// let prog = Dfa::from_regex("abax").unwrap().compile();
/// let mut m = prog.matcher("ababax");
/// assert!(m.find());
/// assert_eq!(m.group().unwrap(), "abax");
/// assert_eq!((m.start().unwrap(), m.end().unwrap()), (2, 6));
/// assert!(!m.find());
/// assert!(m.group().is_err());
/// ```
#[derive(Clone, Debug)]
pub struct Matcher<'p, 't> {
    program: &'p Program,
    input: &'t str,
    // The offset at which the next search starts. This can be one more than the length of the
    // input, after an empty match at the end.
    cursor: usize,
    state: MatchState,
}

impl<'p, 't> Matcher<'p, 't> {
    pub fn new(program: &'p Program, input: &'t str) -> Matcher<'p, 't> {
        Matcher {
            program,
            input,
            cursor: 0,
            state: MatchState::Seeking,
        }
    }

    // The offset of the character boundary that follows `pos`. At the end of the input, this is
    // one past the end.
    fn next_boundary(&self, pos: usize) -> usize {
        match self.input[pos..].chars().next() {
            Some(ch) => pos + ch.len_utf8(),
            None => pos + 1,
        }
    }

    /// Looks for the next match, returning true if there was one.
    ///
    /// Once this returns false, it will always return false.
    pub fn find(&mut self) -> bool {
        if self.state == MatchState::Done {
            return false;
        }

        let mut trial = self.cursor;
        while trial <= self.input.len() {
            if let Some(end) = self.program.longest_match_at(self.input, trial) {
                self.state = MatchState::HasMatch { start: trial, end };
                self.cursor = if end == trial { self.next_boundary(trial) } else { end };
                return true;
            }
            trial = self.next_boundary(trial);
        }

        self.cursor = trial;
        self.state = MatchState::Done;
        false
    }

    fn span(&self) -> crate::Result<(usize, usize)> {
        match self.state {
            MatchState::HasMatch { start, end } => Ok((start, end)),
            _ => Err(Error::NoMatch),
        }
    }

    /// The text of the current match.
    ///
    /// Fails with `Error::NoMatch` unless the last call to `find` returned true.
    pub fn group(&self) -> crate::Result<&'t str> {
        let (start, end) = self.span()?;
        Ok(&self.input[start..end])
    }

    /// The offset at which the current match starts.
    ///
    /// Fails with `Error::NoMatch` unless the last call to `find` returned true.
    pub fn start(&self) -> crate::Result<usize> {
        Ok(self.span()?.0)
    }

    /// The offset at which the current match ends.
    ///
    /// Fails with `Error::NoMatch` unless the last call to `find` returned true.
    pub fn end(&self) -> crate::Result<usize> {
        Ok(self.span()?.1)
    }

    /// The current match, if there is one.
    pub fn current(&self) -> Option<Match<'t>> {
        self.span().ok().map(|(start, end)| Match::new(self.input, start, end))
    }
}

/// A single match found by a `Matcher`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match<'t> {
    input: &'t str,
    start: usize,
    end: usize,
}

impl<'t> Match<'t> {
    fn new(input: &'t str, start: usize, end: usize) -> Match<'t> {
        Match {
            input,
            start,
            end,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn as_str(&self) -> &'t str {
        &self.input[self.range()]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// An iterator over the successive matches in a string.
///
/// This is created by `Program::find_iter`.
#[derive(Clone, Debug)]
pub struct Matches<'p, 't> {
    matcher: Matcher<'p, 't>,
}

impl<'p, 't> Matches<'p, 't> {
    pub(crate) fn new(matcher: Matcher<'p, 't>) -> Matches<'p, 't> {
        Matches { matcher }
    }
}

impl<'p, 't> Iterator for Matches<'p, 't> {
    type Item = Match<'t>;

    fn next(&mut self) -> Option<Match<'t>> {
        if self.matcher.find() {
            self.matcher.current()
        } else {
            None
        }
    }
}
