//! Error types with rich diagnostics using miette
//!
//! Dimension parse errors carry source spans; every other error aborts the
//! current guest call with a descriptive message.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = BindError> = std::result::Result<T, E>;

// ============================================================================
// Dimension Errors
// ============================================================================

/// Errors that occur while reading a dimension string such as `"12pt"`.
#[derive(Error, Diagnostic, Debug)]
pub enum DimensionError {
    #[error("invalid dimension: {message}")]
    #[diagnostic(
        code(glu::dimension::syntax),
        help("expected a number with an optional unit, e.g. `12pt` or `-1.5cm`")
    )]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("unknown unit: {unit}")]
    #[diagnostic(
        code(glu::dimension::unknown_unit),
        help("known units are pt, bp, cm, mm, in, pc, dd, cc, sp and px")
    )]
    UnknownUnit {
        unit: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not a unit")]
        span: SourceSpan,
    },

    #[error("dimension out of range: {value}")]
    #[diagnostic(
        code(glu::dimension::out_of_range),
        help("scaled points must fit in a signed 64-bit integer, about ±1.4e14 pt")
    )]
    OutOfRange { value: String },
}

impl DimensionError {
    /// Unknown unit given on its own, e.g. to `sp_to_unit`.
    pub fn unknown_unit(unit: &str) -> Self {
        DimensionError::UnknownUnit {
            unit: unit.to_string(),
            src: NamedSource::new("<unit>", unit.to_string()),
            span: (0, unit.len()).into(),
        }
    }

    pub fn out_of_range(value: impl std::fmt::Display) -> Self {
        DimensionError::OutOfRange {
            value: value.to_string(),
        }
    }
}

// ============================================================================
// Binding Errors
// ============================================================================

/// Errors raised by engine operations. Each one aborts the guest call that
/// triggered it.
#[derive(Error, Diagnostic, Debug)]
pub enum BindError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidDimension(#[from] DimensionError),

    #[error("division by zero")]
    #[diagnostic(code(glu::dimension::division_by_zero))]
    DivideByZero,

    #[error("unknown node type: {name}")]
    #[diagnostic(code(glu::node::unknown_variant))]
    UnknownVariant {
        name: String,
        #[help]
        suggestion: Option<String>,
    },

    #[error("{context}: expected {expected}, got {got}")]
    #[diagnostic(code(glu::type_mismatch))]
    TypeMismatch {
        context: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("cannot set unknown attribute `{key}` on {variant}")]
    #[diagnostic(code(glu::attr::unknown_key))]
    UnknownKey {
        variant: &'static str,
        key: String,
        #[help]
        suggestion: Option<String>,
    },

    #[error("attribute `{key}` of {variant} is read-only")]
    #[diagnostic(code(glu::attr::read_only))]
    ReadOnly { variant: &'static str, key: String },

    #[error("chain integrity violated: {message}")]
    #[diagnostic(
        code(glu::node::chain_integrity),
        help("detach the node with `node.delete` or copy it with `node.copy_list` first")
    )]
    ChainIntegrity { message: String },

    #[error("bad argument #{position} to `{function}`: {message}")]
    #[diagnostic(code(glu::bad_argument))]
    BadArgument {
        function: String,
        position: usize,
        message: String,
    },

    #[error("{service} failed: {message}")]
    #[diagnostic(code(glu::external_service))]
    ExternalService {
        service: &'static str,
        message: String,
    },
}

impl BindError {
    pub fn type_mismatch(
        context: impl Into<String>,
        expected: &'static str,
        got: &'static str,
    ) -> Self {
        BindError::TypeMismatch {
            context: context.into(),
            expected,
            got,
        }
    }

    pub fn unknown_variant(name: &str, known: &[&str]) -> Self {
        BindError::UnknownVariant {
            name: name.to_string(),
            suggestion: suggest(name, known),
        }
    }

    pub fn unknown_key(variant: &'static str, key: &str, known: &[&str]) -> Self {
        BindError::UnknownKey {
            variant,
            key: key.to_string(),
            suggestion: suggest(key, known),
        }
    }

    pub fn external(service: &'static str, message: impl Into<String>) -> Self {
        BindError::ExternalService {
            service,
            message: message.into(),
        }
    }
}

/// "did you mean" hint for a misspelt name, if one candidate is close enough.
fn suggest(name: &str, candidates: &[&str]) -> Option<String> {
    let lowered = name.to_ascii_lowercase();
    candidates
        .iter()
        .map(|c| (edit_distance(&lowered, c), *c))
        .filter(|(d, _)| *d <= 2)
        .min_by_key(|(d, _)| *d)
        .map(|(_, c)| format!("did you mean `{c}`?"))
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == *cb {
                diag
            } else {
                1 + diag.min(above).min(row[j])
            };
            diag = above;
        }
    }
    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_variant_names() {
        let err = BindError::unknown_variant("glyp", &["glyph", "glue", "kern"]);
        match err {
            BindError::UnknownVariant { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("did you mean `glyph`?"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn no_suggestion_for_distant_names() {
        let err = BindError::unknown_variant("paragraph", &["glyph", "glue", "kern"]);
        assert!(matches!(
            err,
            BindError::UnknownVariant {
                suggestion: None,
                ..
            }
        ));
    }

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance("kern", "kern"), 0);
        assert_eq!(edit_distance("kern", "ker"), 1);
        assert_eq!(edit_distance("hlist", "vlist"), 1);
        assert_eq!(edit_distance("", "glue"), 4);
    }
}
