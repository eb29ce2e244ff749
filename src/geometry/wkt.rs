//! Well-known text reader and writer
//!
//! The reader accepts the full OGC simple-feature grammar so that any
//! well-formed geometry can be classified by kind. Only polygonal results
//! carry their coordinates back to the caller; every other kind is reduced
//! to [`ParsedGeometry::Other`].
//!
//! Z and M ordinates are accepted and dropped.

use std::fmt;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use thiserror::Error;

/// Geometry type keyword of a WKT string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryKind {
    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "POINT" => Some(GeometryKind::Point),
            "LINESTRING" => Some(GeometryKind::LineString),
            "POLYGON" => Some(GeometryKind::Polygon),
            "MULTIPOINT" => Some(GeometryKind::MultiPoint),
            "MULTILINESTRING" => Some(GeometryKind::MultiLineString),
            "MULTIPOLYGON" => Some(GeometryKind::MultiPolygon),
            "GEOMETRYCOLLECTION" => Some(GeometryKind::GeometryCollection),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            GeometryKind::Point => "POINT",
            GeometryKind::LineString => "LINESTRING",
            GeometryKind::Polygon => "POLYGON",
            GeometryKind::MultiPoint => "MULTIPOINT",
            GeometryKind::MultiLineString => "MULTILINESTRING",
            GeometryKind::MultiPolygon => "MULTIPOLYGON",
            GeometryKind::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Result of reading a WKT string
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    Other(GeometryKind),
}

impl ParsedGeometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            ParsedGeometry::Polygon(_) => GeometryKind::Polygon,
            ParsedGeometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            ParsedGeometry::Other(kind) => *kind,
        }
    }
}

/// Failure to turn boundary text into a multi-polygon
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// The text is not valid WKT
    #[error("malformed geometry text at byte {position}: {message} in {text:?}")]
    Syntax {
        text: String,
        position: usize,
        message: String,
    },
    /// Valid WKT, but not a multi-polygon
    #[error("expected MULTIPOLYGON, found {kind} in {text:?}")]
    WrongKind { kind: GeometryKind, text: String },
    /// `MULTIPOLYGON EMPTY`
    #[error("multipolygon has no polygons: {text:?}")]
    Empty { text: String },
}

/// Read any WKT geometry
pub fn parse_wkt(text: &str) -> Result<ParsedGeometry, GeometryError> {
    let mut reader = Reader::new(text);
    let geometry = reader.geometry().and_then(|g| {
        reader.expect_end()?;
        Ok(g)
    });
    geometry.map_err(|fault| GeometryError::Syntax {
        text: text.to_string(),
        position: fault.position,
        message: fault.message,
    })
}

/// Read boundary text, accepting only a non-empty `MULTIPOLYGON`
pub fn parse_multipolygon(text: &str) -> Result<MultiPolygon<f64>, GeometryError> {
    match parse_wkt(text)? {
        ParsedGeometry::MultiPolygon(mp) if mp.0.is_empty() => Err(GeometryError::Empty {
            text: text.to_string(),
        }),
        ParsedGeometry::MultiPolygon(mp) => Ok(mp),
        other => Err(GeometryError::WrongKind {
            kind: other.kind(),
            text: text.to_string(),
        }),
    }
}

/// Encode a multi-polygon as `MULTIPOLYGON(((x y,...)),...)`
pub fn to_wkt(geometry: &MultiPolygon<f64>) -> String {
    if geometry.0.is_empty() {
        return "MULTIPOLYGON EMPTY".to_string();
    }

    let mut out = String::from("MULTIPOLYGON(");
    for (i, polygon) in geometry.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('(');
        let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
        for (j, ring) in rings.enumerate() {
            if j > 0 {
                out.push(',');
            }
            write_ring(&mut out, ring);
        }
        out.push(')');
    }
    out.push(')');
    out
}

fn write_ring(out: &mut String, ring: &LineString<f64>) {
    out.push('(');
    for (k, c) in ring.0.iter().enumerate() {
        if k > 0 {
            out.push(',');
        }
        out.push_str(&format!("{} {}", c.x, c.y));
    }
    // geo closes polygon rings on construction; keep hand-built ones valid too
    if let (Some(first), Some(last)) = (ring.0.first(), ring.0.last())
        && first != last
    {
        out.push_str(&format!(",{} {}", first.x, first.y));
    }
    out.push(')');
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Number(f64),
    LParen,
    RParen,
    Comma,
    End,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => write!(f, "'{w}'"),
            Token::Number(n) => write!(f, "number {n}"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Comma => f.write_str("','"),
            Token::End => f.write_str("end of text"),
        }
    }
}

#[derive(Debug)]
struct Fault {
    position: usize,
    message: String,
}

type Parse<T> = Result<T, Fault>;

/// Deepest GEOMETRYCOLLECTION nesting accepted
const MAX_NESTING: usize = 64;

/// Recursive-descent reader over the WKT grammar
struct Reader<'a> {
    text: &'a str,
    pos: usize,
    peeked: Option<(usize, Token)>,
    depth: usize,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            peeked: None,
            depth: 0,
        }
    }

    fn fault<T>(&self, position: usize, message: impl Into<String>) -> Parse<T> {
        Err(Fault {
            position,
            message: message.into(),
        })
    }

    fn lex(&mut self) -> Parse<(usize, Token)> {
        let text = self.text;
        let bytes = text.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        let start = self.pos;
        let Some(&b) = bytes.get(start) else {
            return Ok((start, Token::End));
        };

        let token = match b {
            b'(' => {
                self.pos += 1;
                Token::LParen
            }
            b')' => {
                self.pos += 1;
                Token::RParen
            }
            b',' => {
                self.pos += 1;
                Token::Comma
            }
            b'-' | b'+' | b'.' | b'0'..=b'9' => {
                let mut end = start + 1;
                while end < bytes.len() {
                    let c = bytes[end];
                    let sign_after_exponent =
                        (c == b'-' || c == b'+') && matches!(bytes[end - 1], b'e' | b'E');
                    if c.is_ascii_digit() || c == b'.' || c == b'e' || c == b'E' || sign_after_exponent
                    {
                        end += 1;
                    } else {
                        break;
                    }
                }
                let literal = &text[start..end];
                let value: f64 = match literal.parse() {
                    Ok(v) => v,
                    Err(_) => return self.fault(start, format!("invalid number '{literal}'")),
                };
                self.pos = end;
                Token::Number(value)
            }
            c if c.is_ascii_alphabetic() => {
                let mut end = start + 1;
                while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
                    end += 1;
                }
                self.pos = end;
                Token::Word(text[start..end].to_ascii_uppercase())
            }
            _ => {
                let ch = text[start..].chars().next().unwrap_or('?');
                return self.fault(start, format!("unexpected character '{ch}'"));
            }
        };
        Ok((start, token))
    }

    fn peek(&mut self) -> Parse<&Token> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lex()?);
        }
        match &self.peeked {
            Some((_, token)) => Ok(token),
            None => self.fault(self.pos, "lexer produced no token"),
        }
    }

    fn next(&mut self) -> Parse<(usize, Token)> {
        match self.peeked.take() {
            Some(t) => Ok(t),
            None => self.lex(),
        }
    }

    fn expect(&mut self, want: Token) -> Parse<()> {
        let (at, got) = self.next()?;
        if got == want {
            Ok(())
        } else {
            self.fault(at, format!("expected {want}, found {got}"))
        }
    }

    fn expect_end(&mut self) -> Parse<()> {
        let (at, got) = self.next()?;
        match got {
            Token::End => Ok(()),
            other => self.fault(at, format!("trailing input starting with {other}")),
        }
    }

    /// Consume `EMPTY` if it is next
    fn empty(&mut self) -> Parse<bool> {
        if matches!(self.peek()?, Token::Word(w) if w == "EMPTY") {
            self.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// `'(' item {',' item} ')'`, or `EMPTY`
    fn list<T>(&mut self, mut item: impl FnMut(&mut Self) -> Parse<T>) -> Parse<Vec<T>> {
        if self.empty()? {
            return Ok(Vec::new());
        }
        self.expect(Token::LParen)?;
        let mut items = vec![item(self)?];
        loop {
            let (at, token) = self.next()?;
            match token {
                Token::Comma => items.push(item(self)?),
                Token::RParen => return Ok(items),
                other => return self.fault(at, format!("expected ',' or ')', found {other}")),
            }
        }
    }

    fn geometry(&mut self) -> Parse<ParsedGeometry> {
        if self.depth >= MAX_NESTING {
            return self.fault(self.pos, "geometry nesting too deep");
        }
        self.depth += 1;
        let parsed = self.tagged_geometry();
        self.depth -= 1;
        parsed
    }

    fn tagged_geometry(&mut self) -> Parse<ParsedGeometry> {
        let (at, token) = self.next()?;
        let kind = match token {
            Token::Word(w) => match GeometryKind::from_keyword(&w) {
                Some(kind) => kind,
                None => return self.fault(at, format!("unknown geometry type '{w}'")),
            },
            other => return self.fault(at, format!("expected geometry type, found {other}")),
        };
        self.dimension_tag()?;

        let parsed = match kind {
            GeometryKind::Point => {
                self.list(Self::coord)?;
                ParsedGeometry::Other(kind)
            }
            GeometryKind::LineString => {
                self.list(Self::coord)?;
                ParsedGeometry::Other(kind)
            }
            GeometryKind::Polygon => ParsedGeometry::Polygon(self.polygon()?),
            GeometryKind::MultiPoint => {
                self.list(Self::multipoint_member)?;
                ParsedGeometry::Other(kind)
            }
            GeometryKind::MultiLineString => {
                self.list(|r| r.list(Self::coord))?;
                ParsedGeometry::Other(kind)
            }
            GeometryKind::MultiPolygon => {
                ParsedGeometry::MultiPolygon(MultiPolygon::new(self.list(Self::polygon)?))
            }
            GeometryKind::GeometryCollection => {
                self.list(Self::geometry)?;
                ParsedGeometry::Other(kind)
            }
        };
        Ok(parsed)
    }

    /// Optional `Z`, `M` or `ZM` after the type keyword
    fn dimension_tag(&mut self) -> Parse<()> {
        if matches!(self.peek()?, Token::Word(w) if w == "Z" || w == "M" || w == "ZM") {
            self.next()?;
        }
        Ok(())
    }

    fn coord(&mut self) -> Parse<Coord<f64>> {
        let x = self.number()?;
        let y = self.number()?;
        // up to two extra ordinates (z, m)
        for _ in 0..2 {
            if matches!(self.peek()?, Token::Number(_)) {
                self.next()?;
            }
        }
        Ok(Coord { x, y })
    }

    fn number(&mut self) -> Parse<f64> {
        let (at, token) = self.next()?;
        match token {
            Token::Number(n) => Ok(n),
            other => self.fault(at, format!("expected number, found {other}")),
        }
    }

    /// MULTIPOINT members may be written bare (`1 2`) or wrapped (`(1 2)`)
    fn multipoint_member(&mut self) -> Parse<()> {
        if matches!(self.peek()?, Token::Number(_)) {
            self.coord()?;
        } else {
            self.list(Self::coord)?;
        }
        Ok(())
    }

    fn ring(&mut self) -> Parse<LineString<f64>> {
        let at = self.pos;
        let coords = self.list(Self::coord)?;
        if coords.is_empty() {
            return self.fault(at, "polygon ring cannot be EMPTY");
        }
        Ok(LineString::new(coords))
    }

    fn polygon(&mut self) -> Parse<Polygon<f64>> {
        let mut rings = self.list(Self::ring)?.into_iter();
        let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
        Ok(Polygon::new(exterior, rings.collect()))
    }
}
