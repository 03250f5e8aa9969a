use regex::Regex;

use super::{Filter, Operator, Selector};

/// Failure to parse a filter expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parse error at position {position} in {input:?}: {reason}")]
pub struct ParseError {
    pub input: String,
    pub position: usize,
    pub reason: String,
}

/// Parse one filter expression: comma separated selectors, all of which
/// must match.
pub fn parse(input: &str) -> Result<Filter, ParseError> {
    let mut parser = Parser {
        input,
        chars: input.char_indices().collect(),
        pos: 0,
    };

    let mut selectors = Vec::new();
    loop {
        parser.skip_whitespace();
        selectors.push(parser.selector()?);
        parser.skip_whitespace();

        match parser.peek() {
            None => break,
            Some(',') => {
                parser.pos += 1;
            }
            Some(c) => return Err(parser.error(format!("unexpected {c:?}, expected ','"))),
        }
    }

    Ok(Filter { selectors })
}

struct Parser<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser<'_> {
    fn selector(&mut self) -> Result<Selector, ParseError> {
        let fieldpath = self.fieldpath()?;
        self.skip_whitespace();

        if matches!(self.peek(), None | Some(',')) {
            return Ok(Selector {
                fieldpath,
                operator: Operator::Present,
            });
        }

        let start = self.pos;
        let op = match (self.peek(), self.peek_at(1)) {
            (Some('='), Some('=')) => "==",
            (Some('!'), Some('=')) => "!=",
            (Some('~'), Some('=')) => "~=",
            (Some(c), _) => return Err(self.error(format!("expected operator, found {c:?}"))),
            (None, _) => return Err(self.error("expected operator".to_string())),
        };
        self.pos += 2;
        self.skip_whitespace();

        let value = self.value()?;
        let operator = match op {
            "==" => Operator::Equal(value),
            "!=" => Operator::NotEqual(value),
            _ => {
                let re = Regex::new(&value).map_err(|err| ParseError {
                    input: self.input.to_string(),
                    position: self.offset(start),
                    reason: format!("invalid regular expression: {err}"),
                })?;
                Operator::Matches(re)
            }
        };

        Ok(Selector {
            fieldpath,
            operator,
        })
    }

    fn fieldpath(&mut self) -> Result<Vec<String>, ParseError> {
        let mut segments = vec![self.segment()?];
        while self.peek() == Some('.') {
            self.pos += 1;
            segments.push(self.segment()?);
        }
        Ok(segments)
    }

    fn segment(&mut self) -> Result<String, ParseError> {
        if self.peek() == Some('"') {
            return self.quoted();
        }

        let start = self.pos;
        while let Some(c) = self.peek()
            && is_field_char(c)
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(match self.peek() {
                Some(c) => self.error(format!("expected field name, found {c:?}")),
                None => self.error("expected field name".to_string()),
            });
        }
        Ok(self.slice(start, self.pos))
    }

    fn value(&mut self) -> Result<String, ParseError> {
        if self.peek() == Some('"') {
            return self.quoted();
        }

        let start = self.pos;
        while let Some(c) = self.peek()
            && c != ','
        {
            self.pos += 1;
        }
        let value = self.slice(start, self.pos).trim_end().to_string();
        if value.is_empty() {
            return Err(self.error("expected value".to_string()));
        }
        Ok(value)
    }

    fn quoted(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        self.pos += 1;

        let mut out = String::new();
        loop {
            match self.peek() {
                None => {
                    self.pos = start;
                    return Err(self.error("unterminated quoted string".to_string()));
                }
                Some('"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some('\\') => {
                    match self.peek_at(1) {
                        Some(c @ ('"' | '\\')) => out.push(c),
                        Some('n') => out.push('\n'),
                        Some('t') => out.push('\t'),
                        _ => {
                            self.pos += 1;
                            return Err(self.error("invalid escape sequence".to_string()));
                        }
                    }
                    self.pos += 2;
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek()
            && c.is_whitespace()
        {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).map(|(_, c)| *c)
    }

    fn offset(&self, pos: usize) -> usize {
        self.chars
            .get(pos)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.input.len())
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.input[self.offset(start)..self.offset(end)].to_string()
    }

    fn error(&self, reason: String) -> ParseError {
        ParseError {
            input: self.input.to_string(),
            position: self.offset(self.pos),
            reason,
        }
    }
}

fn is_field_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}
