use anyhow::Result;
use re_automata::{
    compiler::Config, nfa_from_string, CompileError, Compiler, Label, Matcher,
};
use re_automata_syntax::ErrorKind;

#[test]
fn state_counts() -> Result<()> {
    crate::init_logger();
    let cases = [
        ("a", 2),
        (".", 2),
        ("$", 2),
        ("[abc]", 2),
        ("[^abc]", 2),
        ("(a)", 2),
        ("a*", 3),
        ("a+", 2),
        ("a?", 2),
        ("a|b", 6),
        ("ab", 4),
        ("19|20", 10),
    ];
    for (pattern, states) in cases {
        let nfa = nfa_from_string(pattern)?;
        assert_eq!(nfa.len(), states, "{}", pattern);
    }
    Ok(())
}

#[test]
fn tables_never_hold_colliding_labels() -> Result<()> {
    let patterns =
        ["[a-fd-z0-5]", "[a-ca-cb]x|[^q]", "(.|[x-z])*", "[\u{D000}-\u{F000}\u{E000}]"];
    for pattern in patterns {
        let nfa = nfa_from_string(pattern)?;
        for state in nfa.states() {
            let labels: Vec<&Label> = state.transitions().iter().map(|(l, _)| l).collect();
            for pair in labels.windows(2) {
                assert!(pair[0] < pair[1], "{}: {} !< {}", pattern, pair[0], pair[1]);
            }
        }
    }
    Ok(())
}

#[test]
fn nfa_and_dfa_agree() -> Result<()> {
    crate::init_logger();
    let cases: &[(&str, &[&str], &[&str])] = &[
        ("19|20", &["19", "20"], &["1", "190", "21", ""]),
        ("(a|b)*abb", &["abb", "babb"], &["ab", "abba"]),
        ("[^abc]x?", &["d", "dx", "é"], &["a", "dxx", ""]),
        ("a.$", &["ab", "a\n"], &["a", "abc"]),
        ("(a|b)?c+", &["c", "acc", "bccc"], &["ab", "abc"]),
        ("[a-z]+[0-9]", &["abc1"], &["1", "abc"]),
        ("(ba*)*", &["", "b", "bab", "baab"], &["a", "aab", "ab"]),
        ("(ba+)*", &["", "ba", "baaba"], &["a", "b", "bab"]),
        ("(a+b)?", &["", "ab", "aaab"], &["a", "aa", "b"]),
        ("((ab)+c)?", &["", "abc", "ababc"], &["ab", "abab", "c"]),
        ("(ba*)?d", &["d", "bd", "baad"], &["ad", "aad"]),
        ("(a*|b+)*c", &["c", "abbac"], &["", "abba"]),
    ];
    for &(pattern, accepted, rejected) in cases {
        let nfa = nfa_from_string(pattern)?;
        let dfa = nfa.minimize()?;
        let raw = nfa.to_dfa()?;
        for input in accepted {
            assert!(nfa.is_match(input), "{} !~ {:?}", pattern, input);
            assert!(raw.is_match(input), "{} !~ {:?}", pattern, input);
            assert!(dfa.is_match(input), "{} !~ {:?}", pattern, input);
        }
        for input in rejected {
            assert!(!nfa.is_match(input), "{} ~ {:?}", pattern, input);
            assert!(!raw.is_match(input), "{} ~ {:?}", pattern, input);
            assert!(!dfa.is_match(input), "{} ~ {:?}", pattern, input);
        }
    }
    Ok(())
}

#[test]
fn long_chains_compile() -> Result<()> {
    let pattern = "a".repeat(300_000);
    let nfa = nfa_from_string(&pattern)?;
    assert_eq!(nfa.len(), 600_000);
    assert!(nfa.is_match(&pattern));
    assert!(!nfa.is_match(&pattern[1..]));

    let pattern = format!("{}b", "a|".repeat(100_000));
    let nfa = nfa_from_string(&pattern)?;
    assert_eq!(nfa.len(), 400_002);
    assert!(nfa.is_match("a"));
    assert!(!nfa.is_match("ab"));
    Ok(())
}

#[test]
fn find_reports_character_offsets() -> Result<()> {
    let nfa = nfa_from_string("b+c")?;
    let found = Matcher::new(&nfa).find("ééabbbc").map(|m| m.range());
    assert_eq!(found, Some(3..7));
    Ok(())
}

#[test]
fn syntax_errors() {
    let cases = [
        ("a|", ErrorKind::UnexpectedEof, 2),
        ("(ab", ErrorKind::UnclosedGroup, 0),
        ("[ab", ErrorKind::UnclosedClass, 0),
        ("ab\\", ErrorKind::DanglingEscape, 2),
        ("*a", ErrorKind::UnexpectedMeta('*'), 0),
        ("[z-a]", ErrorKind::InvalidRange { start: 'z', end: 'a' }, 1),
    ];
    for (pattern, kind, position) in cases {
        match nfa_from_string(pattern) {
            Err(CompileError::Syntax(err)) => {
                assert_eq!(err.kind(), &kind, "{}", pattern);
                assert_eq!(err.position(), position, "{}", pattern);
                assert_eq!(err.pattern(), pattern);
            }
            other => panic!("{}: expected a syntax error, got {:?}", pattern, other),
        }
    }
}

#[test]
fn configured_limits() {
    let config = Config::new().nfa_size_limit(Some(5));
    let err = Compiler::new().configure(config).build("a|b").unwrap_err();
    assert_eq!(err, CompileError::TooComplex { limit: 5 });

    let config = Config::new().dfa_size_limit(Some(3));
    let err = Compiler::new().configure(config).build_dfa("(a|b)*a(a|b)").unwrap_err();
    assert_eq!(err, CompileError::TooComplex { limit: 3 });

    let deep = format!("{}a{}", "(".repeat(300), ")".repeat(300));
    assert!(matches!(
        nfa_from_string(&deep),
        Err(CompileError::Syntax(ref e)) if e.kind() == &ErrorKind::NestLimitExceeded(250)
    ));
    let config = Config::new().nest_limit(300);
    assert_eq!(Compiler::new().configure(config).build(&deep).map(|n| n.len()), Ok(2));
}
