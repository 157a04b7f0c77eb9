use super::*;

#[test]
fn test_default_routing() {
    let r = BoardRouter::default();
    assert_eq!(r.route("Google Chrome", "https://example.com"), Board::Links);
    assert_eq!(
        r.route("Visual Studio Code", "function f(){return;}"),
        Board::Code
    );
    assert_eq!(r.route("iTerm2", "$ ls -la"), Board::Commands);
    assert_eq!(r.route("Notes", "just a thought"), Board::Notes);
}

#[test]
fn test_browser_domain_like_content_is_link() {
    let r = BoardRouter::default();
    assert_eq!(r.route("Safari", "example.com/path"), Board::Links);
    assert_eq!(r.route("Firefox", "www.rust-lang.org"), Board::Links);
    // plain prose in a browser is not a link
    assert_eq!(r.route("Safari", "hello world"), Board::Notes);
}

#[test]
fn test_terminal_plain_command() {
    let r = BoardRouter::default();
    assert_eq!(r.route("Terminal", "git status"), Board::Commands);
    assert_eq!(r.route("kitty", "sudo reboot"), Board::Commands);
    // the same text from a non-terminal app is a note
    assert_eq!(r.route("Notes", "git status"), Board::Notes);
}

#[test]
fn test_editor_python_keywords() {
    let r = BoardRouter::default();
    assert_eq!(r.route("Sublime Text", "import os"), Board::Code);
    assert_eq!(r.route("Notes", "import os"), Board::Notes);
}

#[test]
fn test_generic_fallbacks_apply_to_any_app() {
    let r = BoardRouter::default();
    assert_eq!(r.route("Slack", "see https://x.dev"), Board::Links);
    assert_eq!(r.route("Slack", "run it with --release"), Board::Commands);
    assert_eq!(r.route("Slack", "let x = 1;"), Board::Code);
}

#[test]
fn test_content_is_trimmed_before_matching() {
    let r = BoardRouter::default();
    assert_eq!(r.route("iTerm2", "   $ echo hi  "), Board::Commands);
}

#[test]
fn test_custom_rules_override_defaults() {
    let custom = vec![
        RuleSpec {
            predicates: vec![PredicateSpec::new(PredicateKind::ContentContains, "SECRET")],
            board: Board::Notes,
        },
        RuleSpec {
            predicates: vec![PredicateSpec::always()],
            board: Board::Links,
        },
    ];
    let r = BoardRouter::new(&custom);
    assert_eq!(r.route("Any", "SECRET DATA"), Board::Notes);
    assert_eq!(r.route("Any", "http://ok"), Board::Links);
}

#[test]
fn test_custom_rules_from_json() {
    let json = r#"[
        {"predicates": [{"type": "content_contains", "value": "SECRET"}], "board": "NOTES"},
        {"predicates": [{"type": "app_contains", "value": ["slack", "discord"]}], "board": "other"},
        {"predicates": [{"type": "always", "value": true}], "board": "LINKS"}
    ]"#;
    let specs: Vec<RuleSpec> = serde_json::from_str(json).unwrap();
    let r = BoardRouter::new(&specs);
    assert_eq!(r.route("Any", "SECRET DATA"), Board::Notes);
    assert_eq!(r.route("Discord", "hey"), Board::Other);
    assert_eq!(r.route("Any", "anything"), Board::Links);
}

#[test]
fn test_malformed_pattern_never_matches() {
    let specs = vec![
        RuleSpec {
            predicates: vec![PredicateSpec::new(PredicateKind::ContentRegex, "([unclosed")],
            board: Board::Code,
        },
        RuleSpec {
            predicates: vec![PredicateSpec::always()],
            board: Board::Other,
        },
    ];
    let r = BoardRouter::new(&specs);
    assert_eq!(r.route("Any", "([unclosed"), Board::Other);

    // the pattern survives export unchanged
    let exported = r.rules_as_spec();
    assert_eq!(exported, specs);
}

#[test]
fn test_predicates_independently() {
    let app = Predicate::compile(&PredicateSpec::new(PredicateKind::AppContains, "Chrome"));
    assert!(app.matches("google chrome", ""));
    assert!(!app.matches("safari", ""));

    let app_re = Predicate::compile(&PredicateSpec::new(PredicateKind::AppRegex, "^ITERM"));
    assert!(app_re.matches("iterm2", ""));

    let prefix = Predicate::compile(&PredicateSpec::any_of(
        PredicateKind::ContentPrefix,
        &["$", "sudo "],
    ));
    assert!(prefix.matches("", "sudo ls"));
    assert!(!prefix.matches("", "ls"));

    let contains = Predicate::compile(&PredicateSpec::new(PredicateKind::ContentContains, "TODO"));
    assert!(contains.matches("", "a TODO here"));
    assert!(!contains.matches("", "a todo here"), "content matching is case-sensitive");

    assert!(Predicate::Always.matches("", ""));
}

#[test]
fn test_empty_rule_never_matches() {
    let specs = vec![
        RuleSpec {
            predicates: vec![],
            board: Board::Code,
        },
        RuleSpec {
            predicates: vec![PredicateSpec::always()],
            board: Board::Other,
        },
    ];
    assert_eq!(BoardRouter::new(&specs).route("Any", "x"), Board::Other);
}

#[test]
fn test_no_match_falls_back_to_notes() {
    let specs = vec![RuleSpec {
        predicates: vec![PredicateSpec::new(PredicateKind::ContentPrefix, "#")],
        board: Board::Code,
    }];
    assert_eq!(BoardRouter::new(&specs).route("Any", "plain"), Board::Notes);
}

#[test]
fn test_export_round_trip_preserves_routing() {
    let original = BoardRouter::default();
    let exported = original.rules_as_spec();
    assert_eq!(exported, default_rule_specs());

    let json = serde_json::to_string(&exported).unwrap();
    let parsed: Vec<RuleSpec> = serde_json::from_str(&json).unwrap();
    let rebuilt = BoardRouter::new(&parsed);

    let samples = [
        ("Google Chrome", "https://example.com"),
        ("Visual Studio Code", "fn main() {}"),
        ("iTerm2", "$ ls -la"),
        ("Notes", "just a thought"),
        ("Slack", "cargo build --release"),
    ];
    for (app, content) in samples {
        assert_eq!(original.route(app, content), rebuilt.route(app, content));
    }
}

#[test]
fn test_set_rules_replaces_table() {
    let mut r = BoardRouter::default();
    r.set_rules(&[RuleSpec {
        predicates: vec![PredicateSpec::always()],
        board: Board::Other,
    }]);
    assert_eq!(r.rules().len(), 1);
    assert_eq!(r.route("Google Chrome", "https://example.com"), Board::Other);
}

#[test]
fn test_from_config_empty_uses_defaults() {
    let r = BoardRouter::from_config(Some(&[]));
    assert_eq!(r.rules().len(), default_rule_specs().len());
    let r = BoardRouter::from_config(None);
    assert_eq!(r.route("Notes", "hello"), Board::Notes);
}

#[test]
fn test_board_parsing() {
    assert_eq!("links".parse::<Board>().unwrap(), Board::Links);
    assert_eq!("CODE".parse::<Board>().unwrap(), Board::Code);
    assert!("pictures".parse::<Board>().is_err());
    assert_eq!(serde_json::to_string(&Board::Commands).unwrap(), "\"commands\"");
    assert_eq!(Board::Notes.to_string(), "notes");
}
