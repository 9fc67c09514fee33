// Copyright 2015-2016 Joe Neeman.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::error;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The pattern could not be parsed.
    RegexSyntax(regex_syntax::Error),
    /// The pattern parsed, but uses a feature that has no finite-automaton counterpart here.
    Unsupported(&'static str),
    /// An operation would have produced more states than it was allowed to.
    TooManyStates,
    /// The word at position `index` of a string-union input was not strictly greater than its
    /// predecessor.
    Unsorted { index: usize },
    /// A match accessor was called on a `Matcher` that is not holding a match.
    NoMatch,
}

use crate::error::Error::*;
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RegexSyntax(ref e) => write!(f, "Regex syntax error: {}", e),
            Unsupported(s) => write!(f, "Unsupported pattern feature: {}", s),
            TooManyStates => write!(f, "State overflow"),
            Unsorted { index } => write!(f, "Input word {} is out of order", index),
            NoMatch => write!(f, "No current match"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            RegexSyntax(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<regex_syntax::Error> for Error {
    fn from(e: regex_syntax::Error) -> Error {
        RegexSyntax(e)
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use std::error::Error as StdError;

    #[test]
    fn display() {
        assert_eq!(Error::TooManyStates.to_string(), "State overflow");
        assert_eq!(Error::Unsorted { index: 3 }.to_string(), "Input word 3 is out of order");
        assert_eq!(Error::NoMatch.to_string(), "No current match");
    }

    #[test]
    fn syntax_source() {
        let err: Error = regex_syntax::parse("a(").unwrap_err().into();
        assert!(err.to_string().starts_with("Regex syntax error"));
        assert!(err.source().is_some());
        assert!(Error::Unsupported("look-around").source().is_none());
    }
}
