// escape table adapted from https://github.com/euank/snailquote

use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCodepointError {
    #[error("expected {expected} hex digits, found {found:?}")]
    TooShort { expected: usize, found: String },
    #[error("could not parse {string} as u32 hex: {source}")]
    ParseHexFailed {
        #[source]
        source: ParseIntError,
        string: String,
    },
    #[error("could not parse {value} as a unicode char")]
    ParseUnicodeFailed { value: u32 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnescapeError {
    #[error("\\{kind} escape could not be parsed at {index} in {string}: {source}")]
    InvalidCodepoint {
        kind: char,
        #[source]
        source: ParseCodepointError,
        index: usize,
        string: String,
    },
}

/// Decodes backslash escapes the way `echo` text is written to the terminal
/// and to redirection targets. Unknown escapes are kept verbatim, so a
/// Windows-style path like `C:\dir` survives untouched.
pub fn unescape(s: &str) -> Result<String, UnescapeError> {
    let mut chars = s.chars().enumerate().peekable();
    let mut res = String::with_capacity(s.len());

    while let Some((idx, c)) = chars.next() {
        if c != '\\' {
            res.push(c);
            continue;
        }

        let Some(&(_, c2)) = chars.peek() else {
            // trailing backslash
            res.push(c);
            break;
        };

        let decoded = match c2 {
            'a' => '\u{07}',
            'b' => '\u{08}',
            'v' => '\u{0B}',
            'f' => '\u{0C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'e' | 'E' => '\u{1B}',
            '0' => '\0',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            'x' | 'u' | 'U' => {
                chars.next();
                let parsed = match c2 {
                    'x' => parse_fixed(&mut chars, 2),
                    'U' => parse_fixed(&mut chars, 8),
                    _ if matches!(chars.peek(), Some((_, '{'))) => {
                        chars.next();
                        parse_braced(&mut chars)
                    }
                    _ => parse_fixed(&mut chars, 4),
                };
                res.push(parsed.map_err(|source| UnescapeError::InvalidCodepoint {
                    kind: c2,
                    source,
                    index: idx,
                    string: String::from(s),
                })?);
                continue;
            }
            _ => {
                res.push(c);
                continue;
            }
        };

        chars.next();
        res.push(decoded);
    }

    Ok(res)
}

fn parse_fixed<I>(chars: &mut std::iter::Peekable<I>, len: usize) -> Result<char, ParseCodepointError>
where
    I: Iterator<Item = (usize, char)>,
{
    let mut digits = String::with_capacity(len);
    while digits.len() < len {
        match chars.peek() {
            Some(&(_, c)) if c.is_ascii_hexdigit() => {
                digits.push(c);
                chars.next();
            }
            _ => break,
        }
    }

    if digits.len() < len {
        return Err(ParseCodepointError::TooShort {
            expected: len,
            found: digits,
        });
    }

    to_char(digits)
}

fn parse_braced<I>(chars: &mut I) -> Result<char, ParseCodepointError>
where
    I: Iterator<Item = (usize, char)>,
{
    let seq: String = chars
        .take_while(|&(_, c)| c != '}')
        .map(|(_, c)| c)
        .collect();

    to_char(seq)
}

fn to_char(digits: String) -> Result<char, ParseCodepointError> {
    u32::from_str_radix(&digits, 16)
        .map_err(|e| ParseCodepointError::ParseHexFailed {
            source: e,
            string: digits,
        })
        .and_then(|u| char::from_u32(u).ok_or(ParseCodepointError::ParseUnicodeFailed { value: u }))
}
