#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) lexeme: String,
    pub(crate) line: usize,
}

impl Token {
    pub fn new<S: Into<String>>(kind: TokenKind, lexeme: S, line: usize) -> Self {
        Token { kind, lexeme: lexeme.into(), line }
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfFile
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    LeftParen, RightParen, LeftBrace, RightBrace,
    Comma, Dot, Minus, Plus, Semicolon, Slash, Star,

    Bang, BangEqual,
    Equal, EqualEqual,
    Greater, GreaterEqual,
    Less, LessEqual,

    Identifier, String(String), Number(f64),

    And, Break, Class, Else, False, Fun, For, If, Nil, Or,
    Print, Return, Super, This, True, Var, While,

    EndOfFile,
}

impl TokenKind {
    /// Keywords that open a new declaration or statement. Panic-mode
    /// recovery stops discarding tokens when it sees one of these.
    pub(crate) fn starts_declaration(&self) -> bool {
        use TokenKind::*;
        matches!(self, Class | Fun | Var | For | If | While | Print | Return)
    }
}
