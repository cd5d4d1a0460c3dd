//! Parse dimension strings with the pest grammar in `dimension.pest`

use miette::{NamedSource, SourceSpan};
use pest::Parser;
use pest::error::InputLocation;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::errors::DimensionError;
use crate::types::{ScaledPoint, Unit};

#[derive(Parser)]
#[grammar = "dimension.pest"]
pub struct DimensionParser;

/// Parse a dimension string such as `"12pt"`, `"-1.5cm"` or `"10"`.
///
/// The unit is case-insensitive and defaults to points.
pub fn parse_dimension(source: &str) -> Result<ScaledPoint, DimensionError> {
    let pairs = DimensionParser::parse(Rule::dimension, source)
        .map_err(|e| syntax_error(source, e))?;

    let mut magnitude = 0.0;
    let mut unit = Unit::Pt;
    for pair in pairs.flat_map(|p| p.into_inner()) {
        match pair.as_rule() {
            Rule::number => magnitude = parse_number(&pair, source)?,
            Rule::unit => unit = parse_unit(&pair, source)?,
            _ => {}
        }
    }

    let sp = ScaledPoint::checked_from_unit(magnitude, unit)
        .ok_or_else(|| DimensionError::out_of_range(source.trim()))?;
    crate::log::trace!(source, sp = sp.raw(), "parsed dimension");
    Ok(sp)
}

fn parse_number(pair: &Pair<Rule>, source: &str) -> Result<f64, DimensionError> {
    pair.as_str().parse::<f64>().map_err(|e| DimensionError::Syntax {
        message: e.to_string(),
        src: named(source),
        span: span_of(pair),
    })
}

fn parse_unit(pair: &Pair<Rule>, source: &str) -> Result<Unit, DimensionError> {
    let name = pair.as_str();
    Unit::from_name(name).ok_or_else(|| DimensionError::UnknownUnit {
        unit: name.to_string(),
        src: named(source),
        span: span_of(pair),
    })
}

fn syntax_error(source: &str, err: pest::error::Error<Rule>) -> DimensionError {
    let span: SourceSpan = match err.location {
        InputLocation::Pos(pos) => (pos, 0).into(),
        InputLocation::Span((start, end)) => (start, end - start).into(),
    };
    let message = if source.trim().is_empty() {
        "empty string".to_string()
    } else {
        err.variant.message().into_owned()
    };
    DimensionError::Syntax {
        message,
        src: named(source),
        span,
    }
}

fn named(source: &str) -> NamedSource<String> {
    NamedSource::new("<dimension>", source.to_string())
}

fn span_of(pair: &Pair<Rule>) -> SourceSpan {
    let span = pair.as_span();
    (span.start(), span.end() - span.start()).into()
}
