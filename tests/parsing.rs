use barry::{Grammar, Idea, Jam, Lexer, LineView, Operator, Parser, Spelled};
use rstest::rstest;

fn render_tokens(input: &str) -> String {
    let grammar = Grammar::default();
    Lexer::new(input, &grammar)
        .map(|(span, lexeme)| {
            Spelled {
                literal: &input[span],
                lexeme: &lexeme,
            }
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_highlight(input: &str) -> String {
    let parsed = Parser::default().parse_line(input);
    parsed
        .spans()
        .map(|(span, lexeme)| {
            let literal = &input[span.clone()];
            format!("{span:?} {}", Spelled { literal, lexeme })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_eval(lines: &[&str]) -> String {
    let parser = Parser::default();
    lines
        .iter()
        .map(|line| {
            let tree = parser.parse(line).tree;
            format!("{} => {}", LineView(&tree), tree.eval())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn tokenize_output() {
    insta::assert_snapshot!(render_tokens(r#"total: 1.5 + "x""#), @r#"
    WORD total total
    LABEL : null
    SPACE " " null
    NUMBER 1.5 1.5
    SPACE " " null
    ADD + null
    SPACE " " null
    TEXT "x" "x"
    "#);
}

#[test]
fn highlight_output() {
    insta::assert_snapshot!(render_highlight("a : 1 ) 2"), @r#"
    0..3 LABEL a : null
    3..4 SPACE " " null
    4..5 NUMBER 1 1
    5..6 SPACE " " null
    6..9 UNPARSED ) 2 null
    "#);
}

#[test]
fn eval_output() {
    insta::assert_snapshot!(render_eval(&["1+2*3", "a:2 b:3", "1+", "(1 2) * 3"]), @r"
    1+2*3 => 7
    a:2 b:3 => (2 3)
    1+_ => _
    (1 2) _*3 => ((1 2) _)
    ");
}

#[test]
fn library_entry_point() {
    assert_eq!(barry::parse("()"), Idea::Empty);
    assert_eq!(barry::parse("(42)"), Idea::Number(42.0));
    assert_eq!(barry::parse("-7"), Idea::Number(-7.0));
    assert_eq!(barry::parse("#"), Idea::Word("#".into()));

    let tree = barry::parse("1+2*3");
    assert_eq!(tree.to_string(), "1+2*3");
    assert_eq!(tree.eval(), Idea::Number(7.0));
    assert_eq!(barry::parse("(1+2)*3").eval(), Idea::Number(9.0));
}

#[test]
fn duplicate_labels_in_a_list() {
    let Idea::List(list) = barry::parse("a:1 a:2") else {
        panic!("expected a list");
    };
    let names: Vec<_> = list
        .items()
        .iter()
        .map(|item| match item {
            Idea::Label(label) => label.name(),
            _ => None,
        })
        .collect();
    assert_eq!(names, [Some("a"), Some("a'")]);
    assert!(list.label("a'").is_some());
}

#[test]
fn stray_close_is_reported() {
    let parsed = Parser::default().parse_line("a : 1 ) 2");
    assert_eq!(parsed.jams.len(), 1);
    assert_eq!(parsed.jams[0].jam, Jam::UnmatchedClose);
    assert_eq!(parsed.jams[0].span, 6..7);
}

#[rstest]
#[case("(1+2)*3")]
#[case("1+2*3")]
#[case("a:1+2")]
#[case("x:(1 2)")]
#[case("1+(a:2)")]
#[case("2*(3+4)")]
#[case("(1+2)+3")]
#[case("(2*3)*4")]
#[case("((1+2)+3)+4")]
#[case("(1+2)+3+4")]
#[case("\"some text\" word 12.5")]
fn complete_trees_read_back(#[case] input: &str) {
    let parser = Parser::default();
    let tree = parser.parse(input).tree;
    let again = parser.parse(&LineView(&tree).to_string()).tree;
    assert_eq!(again, tree);
}

#[test]
fn extended_grammar() {
    let grammar = Grammar::default()
        .with_seal("×", Operator::Multiply.constructor())
        .and_then(|grammar| grammar.with_name("plus", Operator::Add.constructor()))
        .unwrap();
    let parser = Parser::new(grammar);
    assert_eq!(parser.parse("2×3").tree.eval(), Idea::Number(6.0));
    assert_eq!(parser.parse("2 plus 3").tree.eval(), Idea::Number(5.0));
    assert_eq!(parser.parse("2 plus 3").tree.to_string(), "2+3");
}

#[test]
fn parser_is_shared_between_threads() {
    let parser = Parser::default();
    let results: Vec<Idea> = std::thread::scope(|scope| {
        let handles: Vec<_> = ["1+1", "2*3", "(4)"]
            .into_iter()
            .map(|input| {
                let parser = &parser;
                scope.spawn(move || parser.parse(input).tree.eval())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(
        results,
        [Idea::Number(2.0), Idea::Number(6.0), Idea::Number(4.0)]
    );
}
