use std::rc::Rc;

use astgen::generate_ast;

use crate::{
    expr::Expr,
    token::Token,
};

// Function bodies sit behind an `Rc` so that every function value created
// from a declaration shares the parsed body rather than copying it.
generate_ast!(
    Stmt,
    [
        Block      => { statements: Vec<Stmt> };
        Break      => { keyword: Token };
        Expression => { expression: Expr };
        Function   => { name: Token, params: Vec<Token>, body: Rc<[Stmt]> };
        If         => { condition: Expr, then_branch: Box<Stmt>, else_branch: Option<Box<Stmt>> };
        Print      => { expression: Expr };
        Return     => { keyword: Token, value: Option<Expr> };
        Var        => { name: Token, initializer: Option<Expr> };
        While      => { condition: Expr, body: Box<Stmt> };
    ]
);
