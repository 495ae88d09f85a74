mod common;

use arborist::runtime::{TokenType, EOF};
use arborist::{
    stringify, ArboristError, Calc, Frontend, FrontendConfig, ParseTreeNode,
    SharedPredictionCache,
};
use common::{isolated, parse};

const WELL_FORMED: &[&str] = &[
    "1",
    "x = 1 + 2 * 3;",
    "f(1, g(2), \"three\") ^ -4",
    "# comment only\n",
    "a = (b - c) % 2\nd = a / 1.5e2;\n",
    "greeting = \"multi\nline\"",
];

const MALFORMED: &[&str] = &[
    "1 + * 2",
    "(((",
    ")))",
    "x = = 3",
    "f(1,,2)",
    "@#$ 1 ~",
    "a = \"unterminated",
    "; ; ;",
];

fn assert_well_formed(node: &ParseTreeNode, rule_names: &[&str]) {
    match node {
        ParseTreeNode::Rule { name, children } => {
            assert!(rule_names.contains(&name.as_str()), "unknown rule {name}");
            for child in children {
                assert_well_formed(child, rule_names);
            }
        }
        ParseTreeNode::Terminal { text, .. } => {
            assert!(node.children().is_empty());
            assert!(!text.contains('\n') && !text.contains('\r'));
        }
    }
}

#[test]
fn well_formed_inputs_have_no_errors_and_keep_every_token() {
    let frontend = isolated();
    for source in WELL_FORMED {
        let output = frontend.parse(source).unwrap();
        assert!(!output.has_errors(), "{source:?}: {:?}", output.parser_errors);

        let leaves: Vec<String> = output
            .tree
            .leaves()
            .iter()
            .map(|leaf| match leaf {
                ParseTreeNode::Terminal { symbol, text } => format!("{symbol}:{text}"),
                ParseTreeNode::Rule { .. } => unreachable!(),
            })
            .collect();
        let tokens: Vec<String> = frontend
            .tokenize(source)
            .unwrap()
            .tokens
            .iter()
            .filter(|t| !t.is_eof())
            .map(|t| {
                let symbol = arborist::grammars::calc::VOCABULARY
                    .symbolic_name(t.token_type)
                    .unwrap();
                format!("{symbol}:{}", arborist::tree::escape_text(&t.text))
            })
            .collect();
        assert_eq!(leaves, tokens, "{source:?}");
    }
}

#[test]
fn every_input_yields_a_well_formed_tree() {
    let frontend = isolated();
    for source in WELL_FORMED.iter().chain(MALFORMED) {
        let output = frontend.parse(source).unwrap();
        assert!(output.tree.is_rule());
        assert_eq!(output.tree.name(), "program");
        assert_well_formed(&output.tree, &arborist::grammars::calc::RULE_NAMES);
    }
}

#[test]
fn malformed_inputs_report_errors() {
    let frontend = isolated();
    for source in MALFORMED {
        let output = frontend.parse(source).unwrap();
        assert!(output.has_errors(), "{source:?} parsed cleanly");
    }
}

#[test]
fn empty_input_gives_an_empty_program() {
    let output = parse("");
    assert_eq!(output.tree, ParseTreeNode::rule("program", vec![]));
    assert!(output.lexer_errors.is_empty());
    assert!(output.parser_errors.is_empty());
    assert_eq!(stringify(&output.tree, "program"), "program\n");
}

#[test]
fn dangling_operator_reports_once_and_keeps_a_tree() {
    let output = parse("1 + * 2");
    assert!(output.lexer_errors.is_empty());
    assert_eq!(output.parser_errors.len(), 1);

    let error = &output.parser_errors[0];
    assert_eq!((error.line, error.column), (1, 4));
    assert_eq!(error.message(), "no viable alternative at input '*'");
    assert_eq!(error.to_string(), "Line 1:4 no viable alternative at input '*'");

    assert!(!output.tree.children().is_empty());
    assert_eq!(output.tree.leaves().len(), 4);
}

#[test]
fn missing_token_is_conjured() {
    let output = parse("(1");
    let messages: Vec<String> = output.parser_errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(messages, vec!["Line 1:2 missing ')' at '<EOF>'"]);
    let last = output.tree.leaves().last().map(|leaf| leaf.to_string());
    assert_eq!(last.as_deref(), Some("RPAREN\n"));
    assert!(stringify(&output.tree, "program").contains("RPAREN(\"<missing ')'>\")"));
}

#[test]
fn extraneous_token_is_dropped_inline() {
    let output = parse("f(1 2)");
    let messages: Vec<String> = output.parser_errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(messages, vec!["Line 1:4 extraneous input '2' expecting ')'"]);
}

#[test]
fn lexer_errors_are_ordered_by_position() {
    let output = parse("1 ~ 2\n3\n4 ` 5 ! 6");
    let positions: Vec<(usize, usize)> =
        output.lexer_errors.iter().map(|e| (e.line, e.column)).collect();
    assert_eq!(positions, vec![(1, 2), (3, 2), (3, 6)]);
    assert!(output.parser_errors.is_empty());
}

#[test]
fn lexer_and_parser_errors_stay_apart() {
    let output = parse("x = @");
    assert_eq!(output.lexer_errors.len(), 1);
    assert_eq!(output.parser_errors.len(), 1);
    assert!(output.lexer_errors[0].message().starts_with("token recognition error"));
    assert!(output.parser_errors[0].message().starts_with("no viable alternative"));

    let (tree, (lexer_errors, parser_errors)) = output.clone().into_parts();
    assert_eq!(tree, output.tree);
    assert_eq!(lexer_errors, output.lexer_errors);
    assert_eq!(parser_errors, output.parser_errors);
    assert_eq!(output.error_count(), 2);
}

#[test]
fn stringify_round_trip_is_deterministic() {
    let source = "total = price * (1 + rate) ^ years;\nlog(\"done\")";
    let first = stringify(&parse(source).tree, "program");
    let second = stringify(&parse(source).tree, "program");
    assert_eq!(first, second);
    assert!(first.starts_with("program\n  statement\n    assignment\n"));
    assert!(first.ends_with('\n'));
}

#[test]
fn root_label_is_free_text() {
    let output = parse("1");
    let rendered = stringify(&output.tree, "calc file");
    assert_eq!(rendered.lines().next(), Some("calc file"));
}

#[test]
fn start_rule_comes_from_config() {
    let frontend = isolated().config(FrontendConfig::default().with_start_rule("expression"));
    assert_eq!(frontend.start_rule(), "expression");
    let output = frontend.parse("1 + 2").unwrap();
    assert_eq!(output.tree.name(), "expression");
    assert!(!output.has_errors());
}

#[test]
fn unknown_start_rule_is_fatal() {
    let frontend = isolated().config(FrontendConfig::default().with_start_rule("module"));
    let err = frontend.parse("1").unwrap_err();
    assert!(matches!(err, ArboristError::UnknownEntryPoint { ref rule } if rule == "module"));
}

#[test]
fn tokenize_lists_tokens_and_lexer_errors() {
    let output = isolated().tokenize("a = 1 ?").unwrap();
    let types: Vec<TokenType> = output.tokens.iter().map(|t| t.token_type).collect();
    assert_eq!(types.last(), Some(&EOF));
    assert_eq!(types.len(), 4);
    assert_eq!(output.lexer_errors.len(), 1);
    let indices: Vec<usize> = output.tokens.iter().map(|t| t.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn convenience_parse_uses_the_calc_grammar() {
    let output = arborist::parse("y = 2").unwrap();
    assert_eq!(output.tree.name(), "program");
    assert!(!output.has_errors());
    assert!(Frontend::<Calc>::new().cache().ptr_eq(&SharedPredictionCache::global()));
}

#[test]
fn output_serializes_to_json() {
    let output = parse("1 +");
    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["tree"]["Rule"]["name"], "program");
    assert_eq!(json["parser_errors"][0]["line"], 1);
    assert!(json["lexer_errors"].as_array().unwrap().is_empty());
}

fn deeply_nested(depth: usize) -> String {
    format!("{}1", "-".repeat(depth))
}

#[test]
fn deep_nesting_is_a_syntax_error_not_a_lexer_failure() {
    // Spawned with a main-thread sized stack; the rule limit keeps recursion well
    // inside it.
    let handle = std::thread::Builder::new()
        .stack_size(8 * 1024 * 1024)
        .spawn(|| {
            let source = deeply_nested(7_000);
            let output = parse(&source);
            let tokens = isolated().tokenize(&source).unwrap();
            (output, tokens)
        })
        .unwrap();
    let (output, tokens) = handle.join().unwrap();

    assert!(output.lexer_errors.is_empty(), "{:?}", output.lexer_errors.first());
    assert!(tokens.lexer_errors.is_empty());
    assert_eq!(tokens.tokens.len(), 7_002);

    let first = output.parser_errors.first().map(ToString::to_string).unwrap_or_default();
    assert!(
        first.contains("rule nesting exceeds 400 levels at input '-'"),
        "{first}"
    );
}

#[test]
fn rule_depth_limit_comes_from_config() {
    let source = deeply_nested(20);
    assert!(!parse(&source).has_errors());

    let shallow = isolated().config(FrontendConfig::default().with_max_rule_depth(10));
    let output = shallow.parse(&source).unwrap();
    assert!(output.lexer_errors.is_empty());
    assert!(output.parser_errors[0]
        .to_string()
        .contains("rule nesting exceeds 10 levels"));
}
