//! The `glu` namespace: scaled points and guest logging.

use super::{Args, Namespace};
use crate::errors::Result;
use crate::session::Session;
use crate::types::FACTOR;
use crate::value::Value;

pub(super) fn namespace() -> Namespace {
    Namespace::new("glu")
        .constant("factor", FACTOR)
        .function("sp", sp)
        .function("sp_from_pt", sp_from_pt)
        .function("sp_to_pt", sp_to_pt)
        .function("sp_to_unit", sp_to_unit)
        .function("max", max)
        .function("min", min)
        .function("debug", |s, a| log(s, a, Level::Debug))
        .function("info", |s, a| log(s, a, Level::Info))
        .function("warn", |s, a| log(s, a, Level::Warn))
        .function("error", |s, a| log(s, a, Level::Error))
}

/// `glu.sp("12pt")`
fn sp(_: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let s = args.check_str(1)?;
    Ok(vec![Value::Dimension(s.parse()?)])
}

/// `glu.sp_from_pt(12.5)`
fn sp_from_pt(_: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let pt = args.check_number(1)?;
    Ok(vec![Value::Dimension(Value::Number(pt).to_dimension()?)])
}

fn sp_to_pt(_: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let sp = args.check_dimension(1)?;
    Ok(vec![Value::Number(sp.to_pt())])
}

/// `glu.sp_to_unit(dim, "mm")`
fn sp_to_unit(_: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let sp = args.check_dimension(1)?;
    let unit = args.check_str(2)?;
    Ok(vec![Value::Number(sp.to_unit_named(unit)?)])
}

fn max(_: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let (a, b) = (args.check_dimension(1)?, args.check_dimension(2)?);
    Ok(vec![Value::Dimension(a.max(b))])
}

fn min(_: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let (a, b) = (args.check_dimension(1)?, args.check_dimension(2)?);
    Ok(vec![Value::Dimension(a.min(b))])
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// `glu.info("message", key1, value1, ...)`
fn log(session: &mut Session, args: &Args<'_>, level: Level) -> Result<Vec<Value>> {
    let message = guest_message(session, args)?;
    emit(level, &message);
    Ok(Vec::new())
}

#[cfg(feature = "tracing")]
fn emit(level: Level, message: &str) {
    use crate::defaults::GUEST_LOG_TARGET;
    match level {
        Level::Debug => tracing::debug!(target: GUEST_LOG_TARGET, "{message}"),
        Level::Info => tracing::info!(target: GUEST_LOG_TARGET, "{message}"),
        Level::Warn => tracing::warn!(target: GUEST_LOG_TARGET, "{message}"),
        Level::Error => tracing::error!(target: GUEST_LOG_TARGET, "{message}"),
    }
}

#[cfg(not(feature = "tracing"))]
fn emit(_: Level, _: &str) {}

/// `message (k1=v1, k2=v2)`. A trailing value without a key is shown as
/// `!BADKEY=value`.
fn guest_message(session: &Session, args: &Args<'_>) -> Result<String> {
    let mut message = args.check_str(1)?.to_string();
    let pairs: Vec<String> = args
        .rest(2)
        .chunks(2)
        .map(|pair| match pair {
            [key, value] => format!("{}={}", session.tostring(key), session.tostring(value)),
            [value] => format!("!BADKEY={}", session.tostring(value)),
            _ => String::new(),
        })
        .collect();
    if !pairs.is_empty() {
        message.push_str(&format!(" ({})", pairs.join(", ")));
    }
    Ok(message)
}
