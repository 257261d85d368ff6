use loxwalk::{parser::Parser, printer, Diagnostics};
use pretty_assertions::assert_eq;

fn print_expression(source: &str) -> String {
    let mut diagnostics = Diagnostics::new();
    let tokens = loxwalk::scan(source, &mut diagnostics);
    assert!(diagnostics.is_empty());
    let expr = Parser::new(tokens.into_iter())
        .parse_expression()
        .expect("expression parses");
    printer::print(&expr)
}

#[test]
fn precedence_shows_in_the_tree() {
    assert_eq!("(+ 1 (* 2 3))", print_expression("1 + 2 * 3"));
    assert_eq!("(* (group (+ 1 2)) 3)", print_expression("(1 + 2) * 3"));
    assert_eq!("(== (< 1 2) true)", print_expression("1 < 2 == true"));
    assert_eq!("(or a (and b c))", print_expression("a or b and c"));
    assert_eq!("(! (! (- 4)))", print_expression("!!-4"));
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!("(= a (= b 1))", print_expression("a = b = 1"));
}

#[test]
fn calls_chain_left_to_right() {
    assert_eq!("(call (call f 1) 2 x)", print_expression("f(1)(2, x)"));
}

#[test]
fn parsing_is_deterministic() {
    let source = r#"
        fun count(n) {
            for (var i = 0; i < n; i = i + 1) {
                if (i == 3) break;
                print i;
            }
            return n;
        }
        print count(5);
    "#;
    let mut diagnostics = Diagnostics::new();
    let tokens = loxwalk::scan(source, &mut diagnostics);

    let first = Parser::new(tokens.clone().into_iter()).parse(&mut diagnostics);
    let second = Parser::new(tokens.into_iter()).parse(&mut diagnostics);

    assert!(diagnostics.is_empty());
    assert_eq!(2, first.len());
    assert_eq!(first, second);
}

#[test]
fn invalid_assignment_is_returned_as_the_error() {
    let mut diagnostics = Diagnostics::new();
    let tokens = loxwalk::scan("1 = 2", &mut diagnostics);
    let err = Parser::new(tokens.into_iter()).parse_expression().unwrap_err();
    assert_eq!("[line 1] Error at '=': Invalid assignment target.", err.to_string());
}

#[test]
fn trailing_tokens_after_an_expression_are_rejected() {
    let mut diagnostics = Diagnostics::new();
    let tokens = loxwalk::scan("1 2", &mut diagnostics);
    let err = Parser::new(tokens.into_iter()).parse_expression().unwrap_err();
    assert_eq!("[line 1] Error at '2': Expect end of expression.", err.to_string());
}
