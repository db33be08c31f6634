//! Flattening of GenBank location trees into spans.
//!
//! A GenBank location is a tree (`complement(join(1..10,20..30))`), while an
//! SBOL3 feature only has a list of locations. The tree is split into its
//! leaves (the spans, which become SBOL3 locations) and a layout string that
//! records how the leaves nest, with `#k` standing for the `k`-th span:
//!
//! ```text
//! complement(join(#0,#1))
//! order(#0,external(J00194.1,<0..>10))
//! ```
//!
//! Locations that point into other records (`external`) and gaps stay inline
//! in the layout. The layout is omitted when it is the one rebuilt by
//! default from the spans alone: a single span, or a `join` of all spans,
//! each wrapped in `complement(...)` when on the reverse strand.

use gb_io::seq::After;
use gb_io::seq::Before;
use gb_io::seq::GapLength;
use gb_io::seq::Location;

use super::error::ConversionError;
use super::error::Site;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

/// A leaf of a location tree, in gb-io coordinates (0-based, half-open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    /// The interval `[start, end)`; `before`/`after` mark fuzzy ends.
    Range {
        start: i64,
        end: i64,
        before: bool,
        after: bool,
        strand: Strand,
    },
    /// A site between two bases (`a^b`).
    Between { start: i64, end: i64, strand: Strand },
}

impl Span {
    pub fn strand(&self) -> Strand {
        match self {
            Span::Range { strand, .. } | Span::Between { strand, .. } => *strand,
        }
    }

    pub fn bounds(&self) -> (i64, i64) {
        match *self {
            Span::Range { start, end, .. } | Span::Between { start, end, .. } => (start, end),
        }
    }

    fn to_location(self) -> Location {
        match self {
            Span::Range {
                start,
                end,
                before,
                after,
                ..
            } => Location::Range((start, Before(before)), (end, After(after))),
            Span::Between { start, end, .. } => Location::Between(start, end),
        }
    }
}

/// Convert a gb-io interval `[start, end)` to an SBOL3 one (1-based, inclusive).
pub fn to_sbol_range(start: i64, end: i64) -> (i64, i64) {
    (start + 1, end)
}

/// Convert an SBOL3 interval (1-based, inclusive) to a gb-io one `[start, end)`.
pub fn from_sbol_range(start: i64, end: i64) -> (i64, i64) {
    (start - 1, end)
}

/// The location of a feature: its spans and how they nest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLocation {
    pub spans: Vec<Span>,
    /// `None` when the default layout rebuilds the original tree.
    pub layout: Option<String>,
}

impl FeatureLocation {
    pub fn from_location(location: &Location) -> Self {
        let mut spans = Vec::new();
        let layout = render(location, Strand::Forward, Some(&mut spans));
        let layout = if layout == default_layout(&spans) {
            None
        } else {
            Some(layout)
        };
        FeatureLocation { spans, layout }
    }

    pub fn to_location(&self, site: Site) -> Result<Location, ConversionError> {
        match &self.layout {
            Some(layout) => {
                let mut parser = Parser {
                    text: layout,
                    pos: 0,
                    spans: Some(&self.spans),
                    used: vec![false; self.spans.len()],
                    site,
                };
                let location = parser.location(Strand::Forward)?;
                if parser.pos != layout.len() {
                    return Err(parser.malformed("trailing characters"));
                }
                if let Some(unused) = parser.used.iter().position(|u| !u) {
                    return Err(parser.malformed(&format!("span #{} is never used", unused)));
                }
                Ok(location)
            }
            None => {
                let mut leaves = self
                    .spans
                    .iter()
                    .map(|span| {
                        let leaf = span.to_location();
                        match span.strand() {
                            Strand::Forward => leaf,
                            Strand::Reverse => Location::Complement(Box::new(leaf)),
                        }
                    })
                    .collect::<Vec<_>>();
                match leaves.len() {
                    0 => Err(ConversionError::MalformedLayout {
                        site,
                        layout: String::new(),
                        reason: String::from("empty location"),
                    }),
                    1 => Ok(leaves.remove(0)),
                    _ => Ok(Location::Join(leaves)),
                }
            }
        }
    }
}

/// Render a whole location inline, without extracting spans.
pub fn encode_inline(location: &Location) -> String {
    render(location, Strand::Forward, None)
}

/// Parse a location rendered with [`encode_inline`].
pub fn decode_inline(text: &str, site: Site) -> Result<Location, ConversionError> {
    let mut parser = Parser {
        text,
        pos: 0,
        spans: None,
        used: Vec::new(),
        site,
    };
    let location = parser.location(Strand::Forward)?;
    if parser.pos != text.len() {
        return Err(parser.malformed("trailing characters"));
    }
    Ok(location)
}

fn default_layout(spans: &[Span]) -> String {
    let leaf = |(i, span): (usize, &Span)| match span.strand() {
        Strand::Forward => format!("#{}", i),
        Strand::Reverse => format!("complement(#{})", i),
    };
    match spans.len() {
        0 => String::new(),
        1 => leaf((0, &spans[0])),
        _ => format!(
            "join({})",
            spans.iter().enumerate().map(leaf).collect::<Vec<_>>().join(",")
        ),
    }
}

fn flip(strand: Strand) -> Strand {
    match strand {
        Strand::Forward => Strand::Reverse,
        Strand::Reverse => Strand::Forward,
    }
}

fn escape_accession(accession: &str) -> String {
    let mut out = String::with_capacity(accession.len());
    for c in accession.chars() {
        if matches!(c, '\\' | ',' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn render(location: &Location, strand: Strand, spans: Option<&mut Vec<Span>>) -> String {
    let list = |name: &str, parts: &[Location], spans: Option<&mut Vec<Span>>| {
        let mut spans = spans;
        let rendered = parts
            .iter()
            .map(|part| render(part, strand, spans.as_deref_mut()))
            .collect::<Vec<_>>();
        format!("{}({})", name, rendered.join(","))
    };
    match location {
        Location::Range((start, Before(before)), (end, After(after))) => match spans {
            Some(spans) => {
                spans.push(Span::Range {
                    start: *start,
                    end: *end,
                    before: *before,
                    after: *after,
                    strand,
                });
                format!("#{}", spans.len() - 1)
            }
            None => format!(
                "{}{}..{}{}",
                if *before { "<" } else { "" },
                start,
                if *after { ">" } else { "" },
                end
            ),
        },
        Location::Between(start, end) => match spans {
            Some(spans) => {
                spans.push(Span::Between {
                    start: *start,
                    end: *end,
                    strand,
                });
                format!("#{}", spans.len() - 1)
            }
            None => format!("{}^{}", start, end),
        },
        Location::Complement(inner) => {
            format!("complement({})", render(inner, flip(strand), spans))
        }
        Location::Join(parts) => list("join", parts, spans),
        Location::Order(parts) => list("order", parts, spans),
        Location::Bond(parts) => list("bond", parts, spans),
        Location::OneOf(parts) => list("one-of", parts, spans),
        Location::External(accession, inner) => match inner {
            Some(inner) => format!(
                "external({},{})",
                escape_accession(accession),
                render(inner, Strand::Forward, None)
            ),
            None => format!("external({})", escape_accession(accession)),
        },
        Location::Gap(GapLength::Known(n)) => format!("gap({})", n),
        Location::Gap(GapLength::Unknown) => String::from("gap()"),
        Location::Gap(GapLength::Unk100) => String::from("gap(unk100)"),
    }
}

// ---------------------------------------------------------------------------

struct Parser<'a> {
    text: &'a str,
    pos: usize,
    spans: Option<&'a [Span]>,
    used: Vec<bool>,
    site: Site,
}

impl<'a> Parser<'a> {
    fn malformed(&self, reason: &str) -> ConversionError {
        ConversionError::MalformedLayout {
            site: self.site,
            layout: self.text.to_string(),
            reason: format!("{} at offset {}", reason, self.pos),
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), ConversionError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.malformed(&format!("expected {:?}", token)))
        }
    }

    fn integer(&mut self) -> Result<i64, ConversionError> {
        let rest = self.rest();
        let mut len = 0;
        if rest.starts_with('-') {
            len += 1;
        }
        len += rest[len..].bytes().take_while(u8::is_ascii_digit).count();
        match rest[..len].parse::<i64>() {
            Ok(n) => {
                self.pos += len;
                Ok(n)
            }
            Err(_) => Err(self.malformed("expected an integer")),
        }
    }

    fn list(&mut self, strand: Strand) -> Result<Vec<Location>, ConversionError> {
        let mut parts = vec![self.location(strand)?];
        while self.eat(",") {
            parts.push(self.location(strand)?);
        }
        self.expect(")")?;
        Ok(parts)
    }

    fn accession(&mut self) -> Result<String, ConversionError> {
        let mut accession = String::new();
        let mut chars = self.rest().char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, e)) => accession.push(e),
                    None => break,
                },
                ',' | ')' => {
                    self.pos += i;
                    return Ok(accession);
                }
                c => accession.push(c),
            }
        }
        Err(self.malformed("unterminated accession"))
    }

    fn span(&mut self, strand: Strand) -> Result<Location, ConversionError> {
        let index = self.integer()?;
        let spans = self.spans.unwrap_or(&[]);
        let span = usize::try_from(index)
            .ok()
            .and_then(|i| spans.get(i).map(|s| (i, s)));
        match span {
            Some((i, span)) => {
                if self.used[i] {
                    return Err(self.malformed(&format!("span #{} used twice", i)));
                }
                if span.strand() != strand {
                    return Err(self.malformed(&format!("span #{} is on the wrong strand", i)));
                }
                self.used[i] = true;
                Ok(span.to_location())
            }
            None => Err(ConversionError::DanglingSpan {
                site: self.site,
                index: usize::try_from(index).unwrap_or(usize::MAX),
                count: spans.len(),
            }),
        }
    }

    fn location(&mut self, strand: Strand) -> Result<Location, ConversionError> {
        if self.eat("#") {
            if self.spans.is_none() {
                return Err(self.malformed("span reference in inline location"));
            }
            self.span(strand)
        } else if self.eat("complement(") {
            let inner = self.location(flip(strand))?;
            self.expect(")")?;
            Ok(Location::Complement(Box::new(inner)))
        } else if self.eat("join(") {
            self.list(strand).map(Location::Join)
        } else if self.eat("order(") {
            self.list(strand).map(Location::Order)
        } else if self.eat("bond(") {
            self.list(strand).map(Location::Bond)
        } else if self.eat("one-of(") {
            self.list(strand).map(Location::OneOf)
        } else if self.eat("external(") {
            let accession = self.accession()?;
            let inner = if self.eat(",") {
                let spans = self.spans.take();
                let inner = self.location(Strand::Forward);
                self.spans = spans;
                Some(Box::new(inner?))
            } else {
                None
            };
            self.expect(")")?;
            Ok(Location::External(accession, inner))
        } else if self.eat("gap(") {
            let length = if self.eat(")") {
                return Ok(Location::Gap(GapLength::Unknown));
            } else if self.eat("unk100") {
                GapLength::Unk100
            } else {
                GapLength::Known(self.integer()?)
            };
            self.expect(")")?;
            Ok(Location::Gap(length))
        } else if self.spans.is_none() {
            let before = self.eat("<");
            let start = self.integer()?;
            if self.eat("^") {
                return Ok(Location::Between(start, self.integer()?));
            }
            self.expect("..")?;
            let after = self.eat(">");
            let end = self.integer()?;
            Ok(Location::Range((start, Before(before)), (end, After(after))))
        } else {
            Err(self.malformed("unexpected token"))
        }
    }
}
