//! Sorted N-Triples serialization of graph documents.
//!
//! Only the subset of N-Triples the converter emits is supported: IRI
//! subjects and predicates, IRI or literal objects. Literals may carry a
//! datatype or a language tag. Blank nodes are rejected.

use std::fmt;
use std::fmt::Write as _;
use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

/// The object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Iri(String),
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl Term {
    pub fn iri<S: Into<String>>(iri: S) -> Self {
        Term::Iri(iri.into())
    }

    pub fn string<S: Into<String>>(value: S) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed<S: Into<String>, D: Into<String>>(value: S, datatype: D) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            Term::Literal { .. } => None,
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Term::Iri(_) => None,
            Term::Literal { value, .. } => Some(value),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Iri(iri) => write_iri(f, iri),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                f.write_char('"')?;
                for c in value.chars() {
                    match c {
                        '\\' => f.write_str("\\\\")?,
                        '"' => f.write_str("\\\"")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        '\t' => f.write_str("\\t")?,
                        c => f.write_char(c)?,
                    }
                }
                f.write_char('"')?;
                if let Some(dt) = datatype {
                    f.write_str("^^")?;
                    write_iri(f, dt)?;
                } else if let Some(lang) = language {
                    write!(f, "@{}", lang)?;
                }
                Ok(())
            }
        }
    }
}

fn write_iri(f: &mut fmt::Formatter, iri: &str) -> fmt::Result {
    f.write_char('<')?;
    for c in iri.chars() {
        match c {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' | '\u{0}'..='\u{20}' => {
                write!(f, "\\u{:04X}", c as u32)?
            }
            c => f.write_char(c)?,
        }
    }
    f.write_char('>')
}

/// A single statement of the graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new<S: Into<String>, P: Into<String>>(subject: S, predicate: P, object: Term) -> Self {
        Triple {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_iri(f, &self.subject)?;
        f.write_char(' ')?;
        write_iri(f, &self.predicate)?;
        write!(f, " {} .", self.object)
    }
}

/// Render the triples as N-Triples lines, sorted and without duplicates.
pub fn to_sorted_string<'a, I>(triples: I) -> String
where
    I: IntoIterator<Item = &'a Triple>,
{
    let mut lines = triples
        .into_iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>();
    lines.sort();
    lines.dedup();
    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------

/// A syntax error in an N-Triples document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("N-Triples syntax error on line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

struct Cursor<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn error<T, S: Into<String>>(&self, message: S) -> Result<T, SyntaxError> {
        Err(SyntaxError {
            line: self.line,
            message: message.into(),
        })
    }

    fn skip_whitespace(&mut self) {
        while let Some(' ') | Some('\t') = self.chars.peek().copied() {
            self.chars.next();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), SyntaxError> {
        match self.chars.next() {
            Some(c) if c == expected => Ok(()),
            Some(c) => self.error(format!("expected {:?}, found {:?}", expected, c)),
            None => self.error(format!("expected {:?}, found end of line", expected)),
        }
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char, SyntaxError> {
        let mut code = 0u32;
        for _ in 0..digits {
            match self.chars.next().and_then(|c| c.to_digit(16)) {
                Some(d) => code = code * 16 + d,
                None => return self.error("invalid unicode escape"),
            }
        }
        match char::from_u32(code) {
            Some(c) => Ok(c),
            None => self.error(format!("invalid code point U+{:X}", code)),
        }
    }

    fn iri(&mut self) -> Result<String, SyntaxError> {
        self.expect('<')?;
        let mut iri = String::new();
        loop {
            match self.chars.next() {
                Some('>') => return Ok(iri),
                Some('\\') => match self.chars.next() {
                    Some('u') => iri.push(self.hex_escape(4)?),
                    Some('U') => iri.push(self.hex_escape(8)?),
                    _ => return self.error("invalid escape in IRI"),
                },
                Some(c) => iri.push(c),
                None => return self.error("unterminated IRI"),
            }
        }
    }

    fn literal(&mut self) -> Result<Term, SyntaxError> {
        self.expect('"')?;
        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some('"') => break,
                Some('\\') => match self.chars.next() {
                    Some('t') => value.push('\t'),
                    Some('b') => value.push('\u{8}'),
                    Some('n') => value.push('\n'),
                    Some('r') => value.push('\r'),
                    Some('f') => value.push('\u{c}'),
                    Some('"') => value.push('"'),
                    Some('\'') => value.push('\''),
                    Some('\\') => value.push('\\'),
                    Some('u') => value.push(self.hex_escape(4)?),
                    Some('U') => value.push(self.hex_escape(8)?),
                    _ => return self.error("invalid escape in literal"),
                },
                Some(c) => value.push(c),
                None => return self.error("unterminated literal"),
            }
        }
        match self.chars.peek().copied() {
            Some('^') => {
                self.chars.next();
                self.expect('^')?;
                let datatype = self.iri()?;
                Ok(Term::typed(value, datatype))
            }
            Some('@') => {
                self.chars.next();
                let mut language = String::new();
                while let Some(c) = self.chars.peek().copied() {
                    if c.is_ascii_alphanumeric() || c == '-' {
                        language.push(c);
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                if language.is_empty() {
                    return self.error("empty language tag");
                }
                Ok(Term::Literal {
                    value,
                    datatype: None,
                    language: Some(language),
                })
            }
            _ => Ok(Term::string(value)),
        }
    }

    fn subject(&mut self) -> Result<String, SyntaxError> {
        match self.chars.peek().copied() {
            Some('<') => self.iri(),
            Some('_') => self.error("blank nodes are not supported"),
            Some(c) => self.error(format!("unexpected {:?} in subject position", c)),
            None => self.error("missing subject"),
        }
    }

    fn object(&mut self) -> Result<Term, SyntaxError> {
        match self.chars.peek().copied() {
            Some('<') => self.iri().map(Term::Iri),
            Some('"') => self.literal(),
            Some('_') => self.error("blank nodes are not supported"),
            Some(c) => self.error(format!("unexpected {:?} in object position", c)),
            None => self.error("missing object"),
        }
    }

    fn triple(&mut self) -> Result<Triple, SyntaxError> {
        let subject = self.subject()?;
        self.skip_whitespace();
        let predicate = self.iri()?;
        self.skip_whitespace();
        let object = self.object()?;
        self.skip_whitespace();
        self.expect('.')?;
        self.skip_whitespace();
        match self.chars.peek().copied() {
            None | Some('#') => Ok(Triple {
                subject,
                predicate,
                object,
            }),
            Some(c) => self.error(format!("trailing {:?} after statement", c)),
        }
    }
}

/// Parse an N-Triples document.
pub fn parse(text: &str) -> Result<Vec<Triple>, SyntaxError> {
    let mut triples = Vec::new();
    for (i, raw) in text.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let trimmed = line.trim_start_matches([' ', '\t']);
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut cursor = Cursor {
            chars: trimmed.chars().peekable(),
            line: i + 1,
        };
        triples.push(cursor.triple()?);
    }
    Ok(triples)
}
