use logos::{Lexer, Logos};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Default, Error)]
pub enum LexerError {
    #[default]
    #[error("unknown token")]
    UnknownToken,
    #[error("unterminated string")]
    UnterminatedString,
}

#[derive(Debug, PartialEq, Logos)]
#[logos(skip r"[ \t\r\n\f]+", error = LexerError)]
pub enum Token {
    #[token("|")]
    Pipe,
    #[token(">>")]
    Append,
    #[token(">")]
    Write,
    #[token("<")]
    Read,
    #[token("&")]
    Background,

    /// A run of plain characters and double-quoted spans. Quotes group
    /// whitespace and operators into the word and are dropped.
    #[regex(r#"([^ \t\r\n\f|<>&"]|"[^"]*")+"#, word_callback)]
    Word(String),
    #[regex(r#""[^"]*"#)]
    Unterminated,
}

impl Token {
    pub fn is_redirection(&self) -> bool {
        matches!(self, Self::Append | Self::Write | Self::Read)
    }
}

fn word_callback(lex: &mut Lexer<Token>) -> String {
    lex.slice().replace('"', "")
}
