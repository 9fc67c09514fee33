extern crate automata_algebra;

use automata_algebra::{Dfa, Error, Nfa, StringUnionBuilder};

const MAX: usize = 10_000;

fn dfa(re: &str) -> Dfa {
    Dfa::from_regex(re).unwrap()
}

#[test]
fn boolean_operations() {
    let letters = dfa("[a-z]+");
    let has_q = dfa("[a-z]*q[a-z]*");

    let no_q = letters.difference(&has_q, MAX).unwrap();
    assert!(no_q.equivalent(&dfa("[a-pr-z]+")));

    let both = letters.intersect(&has_q, MAX).unwrap();
    assert!(both.equivalent(&has_q));

    let either = no_q.union_dfa(&both, MAX).unwrap();
    assert!(either.equivalent(&letters));

    let not_letters = letters.complement(MAX).unwrap();
    assert!(not_letters.accepts(""));
    assert!(not_letters.accepts("a1"));
    assert!(!not_letters.accepts("abc"));
    assert!(not_letters.intersect(&letters, MAX).unwrap().is_empty());
}

#[test]
fn closure_operations() {
    let ab = Nfa::literal("ab");
    let c = Nfa::char_range('c', 'e');

    let re = ab.union(&c).star().concat(&Nfa::literal("!").optional());
    let expected = Nfa::from_regex("(ab|[c-e])*!?").unwrap();
    let got = re.determinize(MAX).unwrap().minimize();
    assert_eq!(got, expected.determinize(MAX).unwrap().minimize());

    let rep = ab.repeat(2, Some(3)).determinize(MAX).unwrap();
    assert!(rep.equivalent(&dfa("(ab){2,3}")));
    assert!(ab.plus().determinize(MAX).unwrap().equivalent(&dfa("(ab)+")));

    // The operands are unchanged.
    assert!(ab.accepts("ab") && !ab.accepts("abab"));
}

#[test]
fn reverse() {
    let fwd = Nfa::from_regex("ab*c|d").unwrap();
    let rev = fwd.reverse().determinize(MAX).unwrap();
    assert!(!rev.equivalent(&dfa("b*a|d")));
    assert!(rev.equivalent(&dfa("cb*a|d")));
}

#[test]
fn queries() {
    let d = dfa("(ab|c){1,2}");
    assert!(d.is_finite());
    assert!(!d.is_empty());
    assert!(!d.accepts_empty_string());
    assert_eq!(d.shortest_example(), Some("c".to_owned()));
    assert!(dfa("c|abc").subset_of(&dfa("a?b?c")));
    assert!(!dfa("a?b?c").subset_of(&dfa("c|abc")));

    assert!(!dfa("x+").is_finite());
    assert!(dfa("[^\\x00-\\x{10FFFF}]").is_empty());
}

#[test]
fn string_union_matches_pattern() {
    let words = ["fifteen", "fifty", "five", "four", "fourteen", "forty"];
    let mut sorted = words.to_vec();
    sorted.sort();

    let mut builder = StringUnionBuilder::new();
    for w in &sorted {
        builder.add(w).unwrap();
    }
    let direct = builder.finish();

    let pattern = dfa(&words.join("|"));
    assert_eq!(direct, pattern);
    assert!(direct.is_finite());

    match Dfa::from_sorted_strings(&words) {
        Err(Error::Unsorted { index: 5 }) => {},
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn state_caps() {
    // The last 10 characters must be remembered, so the Dfa needs 2^10 states.
    let nfa = Nfa::from_regex("[ab]*a[ab]{9}").unwrap();
    assert_eq!(nfa.determinize(100), Err(Error::TooManyStates));
    assert_eq!(Dfa::from_regex_bounded("[ab]*a[ab]{9}", 100), Err(Error::TooManyStates));
    assert_eq!(nfa.determinize(MAX).unwrap().minimize().num_states(), 1024);
}

#[test]
fn unsupported_patterns() {
    match Nfa::from_regex("^abc$") {
        Err(Error::Unsupported(_)) => {},
        other => panic!("unexpected {:?}", other),
    }
    match Dfa::from_regex("(abc") {
        Err(Error::RegexSyntax(_)) => {},
        other => panic!("unexpected {:?}", other),
    }
}
