use crate::expr::Expr;

/// Renders an expression as a parenthesised prefix tree, e.g.
/// `(* (- 123) (group 45.67))`. Only used for debugging.
pub fn print(e: &Expr) -> String {
    match e {
        Expr::Assign(a) => parenthesize(&format!("= {}", a.name.lexeme), &[a.value.as_ref()]),
        Expr::Binary(b) => parenthesize(&b.op.lexeme, &[b.left.as_ref(), b.right.as_ref()]),
        Expr::Call(c) => {
            let mut exprs: Vec<&Expr> = vec![c.callee.as_ref()];
            exprs.extend(c.arguments.iter());
            parenthesize("call", &exprs)
        },
        Expr::Grouping(g) => parenthesize("group", &[g.expression.as_ref()]),
        Expr::Literal(l) => l.value.to_string(),
        Expr::Logical(l) => parenthesize(&l.op.lexeme, &[l.left.as_ref(), l.right.as_ref()]),
        Expr::Unary(u) => parenthesize(&u.op.lexeme, &[u.right.as_ref()]),
        Expr::Variable(v) => v.name.lexeme.clone(),
    }
}

fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
    let mut s = String::new();
    s.push('(');
    s.push_str(name);

    for e in exprs.iter() {
        s.push(' ');
        s.push_str(print(e).as_str());
    }

    s.push(')');
    s
}
