use std::fmt;
use std::io;
use std::ops::Range;

/// A position in a text i.e. a `line` number starting from 0, a `column` number starting from 0
/// (in number of code points) and a global file `offset` starting from 0 (in number of bytes).
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub struct TextPosition {
    pub line: u64,
    pub column: u64,
    pub offset: u64,
}

impl TextPosition {
    pub(crate) const START: Self = Self {
        line: 0,
        column: 0,
        offset: 0,
    };
}

fn fmt_location(f: &mut fmt::Formatter<'_>, location: &Range<TextPosition>) -> fmt::Result {
    if location.start.offset + 1 >= location.end.offset {
        write!(
            f,
            "at line {} column {}",
            location.start.line + 1,
            location.start.column + 1
        )
    } else if location.start.line == location.end.line {
        write!(
            f,
            "at line {} between columns {} and {}",
            location.start.line + 1,
            location.start.column + 1,
            location.end.column + 1
        )
    } else {
        write!(
            f,
            "between line {} column {} and line {} column {}",
            location.start.line + 1,
            location.start.column + 1,
            location.end.line + 1,
            location.end.column + 1
        )
    }
}

/// A malformed token: unterminated literal, invalid escape sequence, invalid
/// percent-encoding, invalid UTF-8...
///
/// Always fatal to the current parse.
#[derive(Debug, thiserror::Error)]
pub struct LexError {
    pub(crate) location: Range<TextPosition>,
    pub(crate) message: String,
}

impl LexError {
    /// The location of the error inside of the file.
    #[inline]
    pub fn location(&self) -> Range<TextPosition> {
        self.location.clone()
    }

    /// The error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lexer error ")?;
        fmt_location(f, &self.location)?;
        write!(f, ": {}", self.message)
    }
}

/// The token stream does not match any grammar production at the current position.
///
/// Reports the expected production and the actual token. Fatal: no error recovery
/// is attempted and no partial graph is returned.
#[derive(Debug, thiserror::Error)]
pub struct SyntaxError {
    pub(crate) location: Range<TextPosition>,
    pub(crate) expected: String,
    pub(crate) found: String,
}

impl SyntaxError {
    /// The location of the error inside of the file.
    #[inline]
    pub fn location(&self) -> Range<TextPosition> {
        self.location.clone()
    }

    /// The grammar production that was expected.
    #[inline]
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// The token that was actually found.
    #[inline]
    pub fn found(&self) -> &str {
        &self.found
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parser error ")?;
        fmt_location(f, &self.location)?;
        write!(f, ": expected {}, found {}", self.expected, self.found)
    }
}

/// A term could not be resolved to an absolute IRI: reference to an undeclared
/// prefix, relative IRI without a base IRI in scope, or an IRI that is invalid
/// after resolution.
#[derive(Debug, thiserror::Error)]
pub struct ResolutionError {
    pub(crate) location: Range<TextPosition>,
    pub(crate) message: String,
}

impl ResolutionError {
    /// The location of the error inside of the file.
    #[inline]
    pub fn location(&self) -> Range<TextPosition> {
        self.location.clone()
    }

    /// The error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resolution error ")?;
        fmt_location(f, &self.location)?;
        write!(f, ": {}", self.message)
    }
}

/// The grammar accepted a construct that cannot be represented in the triple/quad
/// model, like an N3 formula or variable.
#[derive(Debug, thiserror::Error)]
pub struct UnsupportedConstruct {
    pub(crate) location: Range<TextPosition>,
    pub(crate) construct: String,
}

impl UnsupportedConstruct {
    /// The location of the error inside of the file.
    #[inline]
    pub fn location(&self) -> Range<TextPosition> {
        self.location.clone()
    }

    /// A short name of the unsupported construct.
    #[inline]
    pub fn construct(&self) -> &str {
        &self.construct
    }
}

impl fmt::Display for UnsupportedConstruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported construct ")?;
        fmt_location(f, &self.location)?;
        write!(
            f,
            ": {} cannot be represented in the quad model",
            self.construct
        )
    }
}

/// An error raised while parsing a document.
///
/// It is the union of the lexer, grammar, resolution and unsupported-construct
/// error kinds. All of them are fatal: a failed parse yields no partial graph.
#[derive(Debug, thiserror::Error)]
pub enum TurtleError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Unsupported(#[from] UnsupportedConstruct),
}

impl TurtleError {
    /// The location of the error inside of the file.
    pub fn location(&self) -> Range<TextPosition> {
        match self {
            Self::Lex(e) => e.location(),
            Self::Syntax(e) => e.location(),
            Self::Resolution(e) => e.location(),
            Self::Unsupported(e) => e.location(),
        }
    }
}

impl From<TurtleError> for io::Error {
    #[inline]
    fn from(error: TurtleError) -> Self {
        Self::new(io::ErrorKind::InvalidData, error)
    }
}

/// A parsing error for the reader-based APIs.
///
/// It is the union of [`TurtleError`] and [`io::Error`].
#[derive(Debug, thiserror::Error)]
pub enum TurtleParseError {
    /// I/O error during parsing (file not found...).
    #[error(transparent)]
    Io(#[from] io::Error),
    /// An error in the file content.
    #[error(transparent)]
    Syntax(#[from] TurtleError),
}

impl From<TurtleParseError> for io::Error {
    #[inline]
    fn from(error: TurtleParseError) -> Self {
        match error {
            TurtleParseError::Syntax(e) => e.into(),
            TurtleParseError::Io(e) => e,
        }
    }
}
