use pretty_assertions::assert_eq;
use regex::Regex;
use rulemark_engine::{
    Capture, Engine, EngineConfig, MatchScope, Matcher, NodeData, OrderPolicy, ParseError, Parser,
    Rule, RuleSetBuilder, RuleSetError, Scope, State, default_rules, ignore_capture,
};
use tempfile::TempDir;

/// `@name` mentions, rendered as profile links.
fn mention() -> Rule {
    Rule::new(
        Matcher::inline(Regex::new(r"^@([a-z]+)").unwrap()),
        |capture, _, _| Ok(NodeData::new().field("user", capture.group(1)).into()),
    )
    .with_html(|node, _, _| {
        format!("<a href=\"/u/{0}\">@{0}</a>", node.text("user").unwrap_or_default())
    })
}

#[test]
fn test_custom_rules_extend_the_default_grammar() {
    let rules = default_rules()
        .rule_with_order("mention", mention(), 11.5)
        .build()
        .unwrap();
    let engine = Engine::with_rules(rules);

    let nodes = engine.parse_with_scope("hi @bob!", Scope::Inline).unwrap();
    assert_eq!(engine.render_html(&nodes), "hi <a href=\"/u/bob\">@bob</a>!");
}

#[test]
fn test_explicit_order_survives_removing_a_default_rule() {
    let rules = default_rules()
        .rule_with_order("mention", mention(), 22.5)
        .remove("nptable")
        .unwrap()
        .build()
        .unwrap();
    let names: Vec<&str> = rules.names().collect();
    let at = names.iter().position(|&n| n == "mention").unwrap();
    assert_eq!(names[at - 1..=at + 1].to_vec(), vec!["u", "mention", "del"]);
}

#[test]
fn test_replacing_a_rule_keeps_its_position() {
    let shout = Rule::new(
        Matcher::inline(Regex::new(r"^~~([\s\S]+?)~~").unwrap()),
        |capture, _, _| Ok(NodeData::new().field("text", capture.group(1)).into()),
    )
    .with_html(|node, _, _| node.text("text").unwrap_or_default().to_uppercase());

    let builder = default_rules().replace("del", shout).unwrap();
    let before: Vec<String> = default_rules().names().map(str::to_string).collect();
    let after: Vec<String> = builder.names().map(str::to_string).collect();
    assert_eq!(before, after);

    let engine = Engine::with_rules(builder.build().unwrap());
    let nodes = engine.parse_with_scope("~~quiet~~", Scope::Inline).unwrap();
    assert_eq!(engine.render_html(&nodes), "QUIET");
}

#[test]
fn test_input_nothing_matches_is_an_error() {
    let rules = RuleSetBuilder::new()
        .rule("a", Rule::new(Matcher::any_scope(Regex::new("^a+").unwrap()), ignore_capture))
        .build()
        .unwrap();
    let err = Parser::new(&rules)
        .parse("aab", &mut State::inline())
        .unwrap_err();
    assert!(matches!(&err, ParseError::NoMatch { remainder } if remainder == "b"));
    assert!(err.to_string().contains("could not find rule"));
}

#[test]
fn test_block_grammar_alone_rejects_an_unterminated_line() {
    let empty = Engine::new().parse_with_scope("", Scope::Inline).unwrap();
    assert!(empty.is_empty());

    let rules = default_rules().build().unwrap();
    let err = Parser::new(&rules)
        .parse("no blank line after this", &mut State::block())
        .unwrap_err();
    assert!(matches!(err, ParseError::NoMatch { .. }));
}

#[test]
fn test_empty_capture_is_an_error() {
    let rules = RuleSetBuilder::new()
        .rule(
            "greedy",
            Rule::new(
                Matcher::custom(MatchScope::Any, |_, _, _| Some(Capture::whole(""))),
                ignore_capture,
            ),
        )
        .build()
        .unwrap();
    let err = Parser::new(&rules)
        .parse("x", &mut State::block())
        .unwrap_err();
    assert!(matches!(err, ParseError::EmptyMatch { rule } if rule == "greedy"));
}

#[test]
fn test_rule_failure_keeps_the_underlying_error() {
    let rules = RuleSetBuilder::new()
        .rule(
            "include",
            Rule::new(
                Matcher::inline(Regex::new(r"^!include (\S+)").unwrap()),
                |capture, _, _| {
                    let text = std::fs::read_to_string(capture.group(1))
                        .map_err(|e| ParseError::failed("include", e))?;
                    Ok(NodeData::new().field("text", text).into())
                },
            ),
        )
        .build()
        .unwrap();
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.md");

    let err = Parser::new(&rules)
        .parse(&format!("!include {}", missing.display()), &mut State::inline())
        .unwrap_err();
    assert!(matches!(&err, ParseError::Failed { rule, .. } if rule == "include"));

    let source = std::error::Error::source(&err).unwrap();
    let io_err = source.downcast_ref::<std::io::Error>().unwrap();
    assert_eq!(io_err.kind(), std::io::ErrorKind::NotFound);
}

#[test]
fn test_nested_failure_restores_scope() {
    let rules = RuleSetBuilder::new()
        .rule(
            "wrap",
            Rule::new(
                Matcher::block(Regex::new(r"^\[([^\]]*)\]").unwrap()),
                |capture, parser, state| {
                    let content = parser.parse_inline(capture.group(1), state)?;
                    Ok(NodeData::new().field("content", content).into())
                },
            ),
        )
        .build()
        .unwrap();
    let mut state = State::block();
    let result = Parser::new(&rules).parse("[oops]", &mut state);

    assert!(result.is_err());
    assert!(!state.is_inline());
}

#[test]
fn test_non_finite_order_is_rejected_or_replaced_by_policy() {
    let strict = RuleSetBuilder::new()
        .rule_with_order("bad", mention(), f64::NAN)
        .build();
    assert!(matches!(strict, Err(RuleSetError::InvalidOrder { .. })));

    let lenient = RuleSetBuilder::new()
        .rule("first", mention())
        .rule_with_order("bad", mention(), f64::INFINITY)
        .order_policy(OrderPolicy::Fallback)
        .build()
        .unwrap();
    let names: Vec<&str> = lenient.names().collect();
    assert_eq!(names, vec!["first", "bad"]);
    assert_eq!(lenient.entries()[1].order(), 1.0);
}

#[test]
fn test_alias_cycles_are_reported() {
    let result = RuleSetBuilder::new()
        .rule_ordered_as("a", mention(), "b")
        .rule_ordered_as("b", mention(), "a")
        .build();
    assert!(matches!(result, Err(RuleSetError::AliasCycle { .. })));
}

#[test]
fn test_engine_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        r#"
scope = "inline"
disabled_rules = ["strong"]
"#,
    )
    .unwrap();

    let config = EngineConfig::load_from_path(&config_path).unwrap().unwrap();
    let engine = Engine::from_config(&config).unwrap();
    assert_eq!(engine.scope(), Scope::Inline);

    let nodes = engine.parse("**a**\n\n").unwrap();
    assert_eq!(engine.render_html(&nodes), "**a**\n\n");
}
