extern crate automata_algebra;
extern crate serde_json;

use automata_algebra::{Dfa, Error};
use serde_json::Value;

const INPUT: &'static str = include_str!("matches.json");

#[test]
fn external_tests() {
    let val: Value = serde_json::from_str(INPUT).unwrap();
    let tests = val.as_array().unwrap();
    for test in tests {
        let test = test.as_object().unwrap();
        let name = test.get("name").unwrap().as_str().unwrap();
        let re_str = test.get("pattern").unwrap().as_str().unwrap();
        let text = test.get("text").unwrap().as_str().unwrap();
        let expected: Vec<(usize, usize)> = test.get("matches").unwrap()
            .as_array().unwrap()
            .iter()
            .map(|span| {
                let span = span.as_array().unwrap();
                (span[0].as_u64().unwrap() as usize, span[1].as_u64().unwrap() as usize)
            })
            .collect();
        println!("{}: re: {:?}, text: {:?}", name, re_str, text);

        let prog = Dfa::from_regex(re_str).unwrap().compile();
        let mut matcher = prog.matcher(text);
        let mut found = Vec::new();
        while matcher.find() {
            let (start, end) = (matcher.start().unwrap(), matcher.end().unwrap());
            assert_eq!(matcher.group().unwrap(), &text[start..end]);
            found.push((start, end));
        }
        assert_eq!(found, expected, "{}", name);
        assert_eq!(matcher.group(), Err(Error::NoMatch), "{}", name);

        let iterated: Vec<_> = prog.find_iter(text).map(|m| (m.start(), m.end())).collect();
        assert_eq!(iterated, expected, "{}", name);
    }
}

#[test]
fn whole_input() {
    let prog = Dfa::from_regex("[abc]+").unwrap().compile();
    assert!(prog.run("abcacacbb"));
    assert!(!prog.run("abcacacbbd"));
}

#[test]
fn sorted_strings() {
    let dfa = Dfa::from_sorted_strings(&["abc", "abcdef"]).unwrap();
    assert!(dfa.accepts("abc"));
    assert!(!dfa.accepts("abcde"));
    assert!(dfa.accepts("abcdef"));
    assert!(!dfa.accepts("abcdefg"));

    let prog = dfa.compile();
    assert!(prog.run("abc"));
    assert!(!prog.run("abcde"));
    assert!(prog.run("abcdef"));
    assert!(!prog.run("abcdefg"));

    let found: Vec<_> = prog.find_iter("abcde").map(|m| m.as_str()).collect();
    assert_eq!(found, vec!["abc"]);
}

#[test]
fn shared_between_threads() {
    use std::sync::Arc;
    use std::thread;

    let prog = Arc::new(Dfa::from_regex("[0-9]+").unwrap().compile());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let prog = prog.clone();
            thread::spawn(move || {
                let text = format!("x{}y{}z", i, i * 100);
                prog.find_iter(&text).map(|m| m.as_str().to_owned()).collect::<Vec<_>>()
            })
        })
        .collect();
    for (i, h) in handles.into_iter().enumerate() {
        assert_eq!(h.join().unwrap(), vec![i.to_string(), (i * 100).to_string()]);
    }
}
