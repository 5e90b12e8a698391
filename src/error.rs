use std::fmt;

/// Which selector grammar a syntax error came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Grammar {
    Css,
    Xpath,
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grammar::Css => f.write_str("CSS"),
            Grammar::Xpath => f.write_str("XPath"),
        }
    }
}

/// All user-visible failures.
///
/// Parse and compile failures are returned as `Err`; violations of the
/// document store invariants are bugs and panic instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The markup parser rejected its input.
    #[error("markup parse failed: {0}")]
    ParseMarkup(String),

    /// A tuple-tree had an invalid shape.
    #[error("malformed tuple-tree: {0}")]
    MalformedTree(String),

    /// A CSS or XPath expression failed to tokenize or parse.
    #[error("{grammar} selector syntax error at byte {pos}: {msg}")]
    SelectorSyntax {
        grammar: Grammar,
        pos: usize,
        msg: String,
    },

    /// A selector parsed but is structurally invalid, e.g. a pseudo-class
    /// with arguments it does not accept, or an unparsable `an+b` formula.
    #[error("invalid selector: {0}")]
    SelectorValidation(String),

    /// An XPath expression misuses a value type, e.g. `count("x")` or a
    /// union over non-node-set operands.
    #[error("XPath type error: {0}")]
    XPathType(String),
}

impl Error {
    pub(crate) fn css(pos: usize, msg: impl Into<String>) -> Error {
        Error::SelectorSyntax {
            grammar: Grammar::Css,
            pos,
            msg: msg.into(),
        }
    }

    pub(crate) fn xpath(pos: usize, msg: impl Into<String>) -> Error {
        Error::SelectorSyntax {
            grammar: Grammar::Xpath,
            pos,
            msg: msg.into(),
        }
    }
}
