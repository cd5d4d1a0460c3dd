//! The `frontend` namespace: text, colors, options, tables and node adapters.

use super::{Args, Namespace};
use crate::carriers::{ImageNode, VListBox};
use crate::color::Color;
use crate::errors::{BindError, Result};
use crate::node::{NodeRef, NodeType, Variant};
use crate::session::Session;
use crate::settings::{FontFamily, Language, Text, TypesettingOptions};
use crate::tables::TableSpec;
use crate::types::ScaledPoint;
use crate::value::{Handle, Value};

pub(super) fn namespace() -> Namespace {
    Namespace::new("frontend")
        .function("text", text)
        .function("color", color)
        .function("sp", sp)
        .function("sp_string", sp_string)
        .function("options", options)
        .function("fontfamily", fontfamily)
        .function("language", language)
        .function("image", image)
        .function("vlist", vlist)
        .function("table", table)
}

/// `frontend.text()`: an empty text, optionally with settings.
fn text(_: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let text = Text::new();
    if let Some(settings) = args.opt_table(1)? {
        text.apply(settings);
    }
    Ok(vec![Handle::new(text).into()])
}

/// `frontend.color(r, g, b[, a])`
fn color(_: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let (r, g, b) = (
        args.check_number(1)?,
        args.check_number(2)?,
        args.check_number(3)?,
    );
    let a = args.opt_number(4, 1.0)?;
    Ok(vec![Handle::new(Color::rgb(r, g, b, a)).into()])
}

/// `frontend.sp(12)`: points to a ScaledPoint.
fn sp(_: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let pt = args.check_number(1)?;
    Ok(vec![Value::Number(pt).to_dimension()?.into()])
}

/// `frontend.sp_string("12pt")`
fn sp_string(_: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let s = args.check_str(1)?;
    Ok(vec![s.parse::<ScaledPoint>()?.into()])
}

/// `frontend.options{leading = "14pt", ...}`
fn options(_: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let table = args.check_table(1)?;
    Ok(vec![Handle::new(TypesettingOptions::from_table(table)).into()])
}

fn fontfamily(_: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let name = args.check_str(1)?.to_string();
    Ok(vec![Handle::new(FontFamily { name }).into()])
}

fn language(_: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let name = args.check_str(1)?.to_string();
    Ok(vec![Handle::new(Language { name }).into()])
}

/// `frontend.image(node)`: wrap an `image` node.
fn image(session: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let node = wrapped(session, args, NodeType::Image)?;
    Ok(vec![Handle::new(ImageNode(node)).into()])
}

/// `frontend.vlist(node)`: wrap a `vlist` node.
fn vlist(session: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let node = wrapped(session, args, NodeType::VList)?;
    Ok(vec![Handle::new(VListBox(node)).into()])
}

/// `frontend.table{max_width = "10cm", ...}`: an empty table.
fn table(_: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let table = match args.opt_table(1)? {
        Some(options) => TableSpec::from_options(options),
        None => TableSpec::new(),
    };
    Ok(vec![Handle::new(table).into()])
}

fn wrapped(
    session: &Session,
    args: &Args<'_>,
    expected: NodeType,
) -> Result<Option<NodeRef>> {
    let node = args.node(session, 1)?;
    match node.map(|n| session.arena().kind(n).node_type()) {
        Some(found) if found != expected => Err(BindError::type_mismatch(
            args.function(),
            expected.name(),
            found.name(),
        )),
        _ => Ok(node),
    }
}
