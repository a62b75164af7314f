//! Tokenizer for option strings
//!
//! Turns directive text into a lazy, finite sequence of [`Token`]s carrying
//! line/column positions for diagnostics.
//!
//! ## Grammar
//!
//! ```text
//! directive    := "--" identifier [ valuepart ]
//! valuepart    := "=" value | WS value
//! value        := quoted-value | bare-token
//! quoted-value := '"' (escaped-char | any-char-except-quote)* '"'
//! bare-token   := (any-char-except-WS-and-newline)+
//! ```
//!
//! A newline ends a statement and is reported as [`TokenKind::Separator`].
//! `#` at a token boundary starts a comment that runs to the end of the line.
//! Malformed input produces a single [`TokenKind::Syntax`] token, after which
//! the sequence ends.

use std::borrow::Cow;

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, tag, take_till, take_till1, take_while, take_while1},
    character::complete::{char, none_of},
    combinator::{opt, value},
    sequence::{delimited, preceded},
    IResult, Slice,
};
use nom_locate::LocatedSpan;

/// Input span with line/column tracking
pub type Span<'a> = LocatedSpan<&'a str>;

type Res<'a, O> = IResult<Span<'a>, O>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Directive name, without the leading `--`
    Directive,
    Value,
    /// Quoted value, with escapes already resolved
    QuotedValue,
    /// End of line
    Separator,
    End,
    /// Malformed input; `text` describes the problem
    Syntax,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: Cow<'a, str>,
    pub line: u32,
    pub column: usize,
}

impl Token<'_> {
    pub fn is_value(&self) -> bool {
        matches!(self.kind, TokenKind::Value | TokenKind::QuotedValue)
    }

    /// `line:column` for diagnostics
    pub fn position(&self) -> String {
        format!("{}:{}", self.line, self.column)
    }
}

/// Lazy token stream over one piece of option text.
///
/// Cloning yields an independent cursor, so a stream can be restarted from
/// any point.
#[derive(Clone, Debug)]
pub struct Tokenizer<'a> {
    rest: Span<'a>,
    glued_value: bool,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            rest: Span::new(text),
            glued_value: false,
            finished: false,
        }
    }

    fn token(&self, kind: TokenKind, text: impl Into<Cow<'a, str>>, at: Span<'a>) -> Token<'a> {
        Token {
            kind,
            text: text.into(),
            line: at.location_line(),
            column: at.get_utf8_column(),
        }
    }

    fn syntax_error(&mut self, message: &str, at: Span<'a>) -> Token<'a> {
        self.finished = true;
        self.token(TokenKind::Syntax, message.to_string(), at)
    }

    fn skip_blanks(&mut self) {
        if let Ok((rest, _)) = blanks_and_comment(self.rest) {
            self.rest = rest;
        }
    }

    fn value_token(&mut self) -> Token<'a> {
        let at = self.rest;
        if at.fragment().starts_with('"') {
            return match quoted_value(at.fragment()) {
                Ok((rest, text)) => {
                    self.rest = at.slice(at.fragment().len() - rest.len()..);
                    self.token(TokenKind::QuotedValue, text, at)
                }
                Err(_) => {
                    let (message, offset) = quote_error(at.fragment());
                    self.syntax_error(&message, at.slice(offset..))
                }
            };
        }

        match bare_value(at) {
            Ok((rest, text)) => {
                self.rest = rest;
                self.token(TokenKind::Value, *text.fragment(), at)
            }
            Err(_) => self.syntax_error("expected a value", at),
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.finished {
            return None;
        }

        let glued = std::mem::take(&mut self.glued_value);
        if glued && starts_value(self.rest.fragment()) {
            return Some(self.value_token());
        }

        self.skip_blanks();
        let at = self.rest;
        let fragment = *at.fragment();

        if fragment.is_empty() {
            self.finished = true;
            return Some(self.token(TokenKind::End, "", at));
        }

        if fragment.starts_with('\n') {
            if let Ok((rest, _)) = newline(at) {
                self.rest = rest;
            }
            return Some(self.token(TokenKind::Separator, "\n", at));
        }

        if fragment.starts_with("--") {
            return Some(match directive_name(at) {
                Ok((rest, name)) => {
                    let (rest, equals) = equals_sign(rest).unwrap_or((rest, None));
                    if equals.is_none() && !ends_directive(rest.fragment()) {
                        return Some(self.syntax_error(
                            "expected '=' or whitespace after directive name",
                            rest,
                        ));
                    }
                    self.rest = rest;
                    self.glued_value = equals.is_some();
                    self.token(TokenKind::Directive, *name.fragment(), at)
                }
                Err(_) => self.syntax_error("expected a directive name after '--'", at),
            });
        }

        Some(self.value_token())
    }
}

fn starts_value(fragment: &str) -> bool {
    fragment.chars().next().is_some_and(|c| !c.is_whitespace())
}

/// A directive name must be followed by `=`, whitespace, a comment or the end
fn ends_directive(fragment: &str) -> bool {
    match fragment.chars().next() {
        None => true,
        Some(c) => is_blank(c) || c == '\n' || c == '#',
    }
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn blanks_and_comment(input: Span<'_>) -> Res<'_, ()> {
    let (input, _) = take_while(is_blank)(input)?;
    let (input, _) = opt(preceded(char('#'), take_till(|c: char| c == '\n')))(input)?;
    Ok((input, ()))
}

fn newline(input: Span<'_>) -> Res<'_, Span<'_>> {
    tag("\n")(input)
}

fn directive_name(input: Span<'_>) -> Res<'_, Span<'_>> {
    preceded(tag("--"), take_while1(is_identifier_char))(input)
}

fn equals_sign(input: Span<'_>) -> Res<'_, Option<char>> {
    opt(char('='))(input)
}

fn bare_value(input: Span<'_>) -> Res<'_, Span<'_>> {
    take_till1(|c: char| c.is_whitespace())(input)
}

fn quoted_value(input: &str) -> IResult<&str, String> {
    let (input, text) = delimited(
        char('"'),
        opt(escaped_transform(
            none_of("\"\\"),
            '\\',
            alt((
                value('"', char('"')),
                value('\\', char('\\')),
                value('\n', char('n')),
                value('\t', char('t')),
            )),
        )),
        char('"'),
    )(input)?;
    Ok((input, text.unwrap_or_default()))
}

/// Describe why `fragment` (starting at its opening quote) is not a valid
/// quoted value, with the byte offset the problem starts at
fn quote_error(fragment: &str) -> (String, usize) {
    let mut chars = fragment.char_indices().skip(1);
    while let Some((offset, c)) = chars.next() {
        match c {
            '"' => break,
            '\\' => match chars.next() {
                None => break,
                Some((_, '"' | '\\' | 'n' | 't')) => {}
                Some((_, other)) => {
                    return (format!("invalid escape '\\{other}' in quoted value"), offset)
                }
            },
            _ => {}
        }
    }
    ("unterminated quoted value".to_string(), 0)
}

/// Collect every token of `text`, ending with `End` or `Syntax`
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    Tokenizer::new(text).collect()
}
