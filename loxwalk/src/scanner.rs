use crate::{
    error::{Error, Result},
    token::{Token, TokenKind},
};
use peekmore::{PeekMore, PeekMoreIterator};
use phf::phf_map;
use std::str::Chars;

static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "and" => TokenKind::And,
    "break" => TokenKind::Break,
    "class" => TokenKind::Class,
    "else" => TokenKind::Else,
    "false" => TokenKind::False,
    "for" => TokenKind::For,
    "fun" => TokenKind::Fun,
    "if" => TokenKind::If,
    "nil" => TokenKind::Nil,
    "or" => TokenKind::Or,
    "print" => TokenKind::Print,
    "return" => TokenKind::Return,
    "super" => TokenKind::Super,
    "this" => TokenKind::This,
    "true" => TokenKind::True,
    "var" => TokenKind::Var,
    "while" => TokenKind::While,
};

/// Turns source text into tokens. Lexical errors are yielded in place of
/// the offending token and scanning carries on after them.
pub struct Scanner<'a> {
    src: PeekMoreIterator<Chars<'a>>,
    lexeme_buffer: String,
    line: usize,
}

impl <'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Result<Token>> {
        loop {
            let kind = self.next_token_kind()?;

            let lexeme = self.lexeme_buffer.clone();
            self.lexeme_buffer.clear();

            if let Some(kind) = kind {
                return Some(kind.map(|kind| Token {
                    kind,
                    lexeme,
                    line: self.line,
                }))
            }
        }
    }
}

impl <'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src: src.chars().peekmore(),
            lexeme_buffer: String::new(),
            line: 1,
        }
    }

    /// Scans the whole source, terminating the sequence with a single
    /// `EndOfFile` token.
    pub fn scan_tokens(mut self) -> Vec<Result<Token>> {
        let mut tokens = self.by_ref().collect::<Vec<Result<Token>>>();
        tokens.push(Ok(Token {
            kind: TokenKind::EndOfFile,
            lexeme: "".to_string(),
            line: self.line,
        }));
        tokens
    }

    // Outer `None` means the source is exhausted; inner `None` means the
    // characters consumed produced no token (whitespace, comments).
    fn next_token_kind(&mut self) -> Option<Option<Result<TokenKind>>> {
        let next_char = self.src.next()?;
        self.lexeme_buffer.push(next_char);

        use TokenKind::*;
        let kind = match next_char {
            '(' => Some(Ok(LeftParen)),
            ')' => Some(Ok(RightParen)),
            '{' => Some(Ok(LeftBrace)),
            '}' => Some(Ok(RightBrace)),
            ',' => Some(Ok(Comma)),
            '.' => Some(Ok(Dot)),
            '-' => Some(Ok(Minus)),
            '+' => Some(Ok(Plus)),
            ';' => Some(Ok(Semicolon)),
            '*' => Some(Ok(Star)),
            '!' => Some(Ok(if self.does_next_match('=') { BangEqual } else { Bang })),
            '=' => Some(Ok(if self.does_next_match('=') { EqualEqual } else { Equal })),
            '<' => Some(Ok(if self.does_next_match('=') { LessEqual } else { Less })),
            '>' => Some(Ok(if self.does_next_match('=') { GreaterEqual } else { Greater })),
            '/' => {
                if self.does_next_match('/') {
                    self.advance_until_match('\n');
                    None
                } else if self.does_next_match('*') {
                    self.skip_block_comment().err().map(Err)
                } else {
                    Some(Ok(Slash))
                }
            },
            ' ' | '\r' | '\t' => None,
            '\n' => {
                self.line += 1;
                None
            },
            '"' => Some(self.extract_string()),
            c if c.is_ascii_digit() => Some(self.extract_number()),
            c if can_start_identifier(&c) => Some(self.extract_identifier()),
            c => Some(Err(Error::lexical(self.line, format!("Unexpected character '{}'.", c)))),
        };
        Some(kind)
    }

    fn does_next_match(&mut self, c: char) -> bool {
        match self.src.peek() {
            Some(next) if c == *next => {
                self.lexeme_buffer.push(c);
                self.src.next();
                true
            }
            _ => false,
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let start_line = self.line;
        while let Some(c) = self.src.next() {
            match c {
                '*' if self.src.peek() == Some(&'/') => {
                    self.src.next();
                    return Ok(())
                },
                '\n' => self.line += 1,
                _ => {},
            }
        }
        Err(Error::lexical(start_line, "Unterminated block comment."))
    }

    fn extract_string(&mut self) -> Result<TokenKind> {
        let mut newline_count = 0;
        self.advance_until_match_for_each('"', |c| if c == '\n' { newline_count += 1 });
        self.line += newline_count;
        match self.src.next() {
            None => Err(Error::lexical(self.line, "Unterminated string.")),
            Some(q) => { // q here must be " due to advance_until_match
                self.lexeme_buffer.push(q);
                Ok(TokenKind::String(self.lexeme_buffer.trim_matches('"').to_string()))
            },
        }
    }

    fn extract_number(&mut self) -> Result<TokenKind> {
        self.advance_until(|n| !n.is_ascii_digit());

        if let Some(&'.') = self.src.peek() {
            if let Some(maybe_digit) = self.src.peek_nth(1) {
                if maybe_digit.is_ascii_digit() {
                    self.lexeme_buffer.push('.');
                    self.src.next();
                    self.advance_until(|n| !n.is_ascii_digit());
                }
            }
        }

        match self.lexeme_buffer.parse() {
            Err(_) => Err(Error::lexical(
                self.line,
                format!("Could not convert {} into a number.", self.lexeme_buffer)
            )),
            Ok(number) => Ok(TokenKind::Number(number)),
        }
    }

    fn extract_identifier(&mut self) -> Result<TokenKind> {
        self.advance_until(|n| !is_part_of_valid_identifier(n));

        let text = self.lexeme_buffer.as_str();
        match KEYWORDS.get(text) {
            Some(token) => Ok(token.clone()),
            None => Ok(TokenKind::Identifier)
        }
    }

    fn advance_until_match(&mut self, c: char) {
        self.advance_until(|n| n == &c)
    }

    fn advance_until(&mut self, should_stop: impl Fn(&char) -> bool) {
        self.advance_until_for_each(should_stop, |_| {})
    }

    fn advance_until_match_for_each(
        &mut self,
        c: char,
        f: impl FnMut(char),
    ) {
        self.advance_until_for_each(|n| n == &c, f);
    }

    fn advance_until_for_each(
        &mut self,
        should_stop: impl Fn(&char) -> bool,
        mut f: impl FnMut(char),
    ) {
        while let Some(next) = self.src.peek().copied() {
            if should_stop(&next) { break }
            self.src.next();
            self.lexeme_buffer.push(next);
            f(next);
        }
    }
}

fn can_start_identifier(c: &char) -> bool {
    c.is_ascii_alphabetic() || c == &'_'
}

fn is_part_of_valid_identifier(c: &char) -> bool {
    can_start_identifier(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Scanner::new(src)
            .scan_tokens()
            .into_iter()
            .map(|t| t.expect("source should scan cleanly").kind)
            .collect()
    }

    #[test]
    fn single_and_double_character_operators() {
        use TokenKind::*;
        assert_eq!(
            vec![Bang, BangEqual, Equal, EqualEqual, Less, LessEqual, Greater, GreaterEqual, Slash, EndOfFile],
            kinds("! != = == < <= > >= /")
        );
    }

    #[test]
    fn keywords_and_identifiers() {
        use TokenKind::*;
        assert_eq!(
            vec![Var, Identifier, While, Break, Identifier, EndOfFile],
            kinds("var breaker while break _x1")
        );
    }

    #[test]
    fn number_literals_with_and_without_fractions() {
        use TokenKind::*;
        assert_eq!(
            vec![Number(12.0), Number(3.25), Number(7.0), Dot, EndOfFile],
            kinds("12 3.25 7.")
        );
    }

    #[test]
    fn string_literal_payload_excludes_quotes() {
        let tokens = Scanner::new("\"hi there\"").scan_tokens();
        let token = tokens[0].as_ref().expect("string should scan");
        assert_eq!(TokenKind::String("hi there".into()), token.kind);
        assert_eq!("\"hi there\"", token.lexeme);
    }

    #[test]
    fn comments_are_skipped_and_lines_counted() {
        let tokens: Vec<_> = Scanner::new("// one\n/* two\nthree */ print")
            .scan_tokens()
            .into_iter()
            .map(|t| t.expect("source should scan cleanly"))
            .collect();
        assert_eq!(TokenKind::Print, tokens[0].kind);
        assert_eq!(3, tokens[0].line);
        assert_eq!(TokenKind::EndOfFile, tokens[1].kind);
        assert_eq!(3, tokens[1].line);
    }

    #[test]
    fn scanning_continues_after_lexical_errors() {
        let results = Scanner::new("@ 1 # \"open").scan_tokens();
        let errors: Vec<String> = results.iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.to_string())
            .collect();
        assert_eq!(
            vec![
                "[line 1] Error: Unexpected character '@'.".to_string(),
                "[line 1] Error: Unexpected character '#'.".to_string(),
                "[line 1] Error: Unterminated string.".to_string(),
            ],
            errors
        );
        assert!(results.iter().any(|r| matches!(r, Ok(t) if t.kind == TokenKind::Number(1.0))));
    }

    #[test]
    fn unterminated_block_comment_is_reported() {
        let results = Scanner::new("/* never closed").scan_tokens();
        assert_eq!(2, results.len());
        assert_eq!(
            "[line 1] Error: Unterminated block comment.",
            results[0].as_ref().unwrap_err().to_string()
        );
    }

    #[test]
    fn exactly_one_end_of_file_token() {
        let eofs = kinds("print 1;").into_iter().filter(|k| *k == TokenKind::EndOfFile).count();
        assert_eq!(1, eofs);
    }
}
