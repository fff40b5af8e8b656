//! Integration tests for lexer + parser pipeline
//! Tests line classification and word expansion at the parsing boundary

use crash_ast::Directive;
use crash_lexer::LineShape;
use crash_parser::expansion::expand;
use crash_parser::{Parser, split_arguments};
use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn test_shape_and_directive_agree() {
    let cases = [
        "ls -la",
        "sleep 3 &",
        "cd /tmp; ls",
        "A=b; ls &",
        "   ",
        "a;;b",
    ];

    for line in cases {
        let shape = LineShape::scan(line);
        match Parser::new(line).parse() {
            Directive::Empty => assert!(line.trim().is_empty(), "{line:?}"),
            Directive::Assign { .. } => assert!(shape.assignment, "{line:?}"),
            Directive::Command { background, .. } => {
                assert!(!shape.assignment, "{line:?}");
                assert_eq!(background, shape.background, "{line:?}");
            }
            Directive::Chain(_) => {
                assert!(!shape.assignment, "{line:?}");
                assert!(shape.chained, "{line:?}");
            }
        }
    }
}

#[test]
fn test_assignment_takes_precedence() {
    assert_eq!(
        Parser::new("A=b; ls &").parse(),
        Directive::Assign {
            name: "A".to_string(),
            value: "b; ls &".to_string(),
        }
    );
}

#[test]
fn test_chaining_drops_background_marker() {
    assert_eq!(
        Parser::new("sleep 1; sleep 2 &").parse(),
        Directive::Chain(vec!["sleep 1".to_string(), "sleep 2".to_string()])
    );
}

#[test]
fn test_chain_pieces_are_trimmed() {
    assert_eq!(
        Parser::new(" echo a ;  echo b;echo c ").parse(),
        Directive::Chain(vec![
            "echo a".to_string(),
            "echo b".to_string(),
            "echo c".to_string(),
        ])
    );
}

#[test]
fn test_expanded_command_becomes_argv() {
    let vars = env(&[("HOME", "/home/me"), ("TARGET", "build dir")]);
    let expanded = expand("ls  ~/src ${TARGET} ${NOPE:-x} ${TARGET:+y}", &vars);
    let argv = split_arguments(&expanded);

    assert_eq!(argv.command(), "ls");
    assert_eq!(
        argv.as_slice(),
        &["ls", "/home/me/src", "build", "dir", "x", "y"]
    );
}

#[test]
fn test_expansion_to_nothing_leaves_no_command() {
    let argv = split_arguments(&expand("$UNSET_A $UNSET_B", &env(&[])));
    assert_eq!(argv.command(), "");
}
