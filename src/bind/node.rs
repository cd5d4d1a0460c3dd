//! The `node` namespace: creating nodes and working on chains.
//!
//! Every chain argument may be a node, a node carrier or nil; every chain
//! result is the new head (nil for an empty chain).

use super::{Args, Namespace};
use crate::errors::Result;
use crate::node::GlueOrder;
use crate::session::Session;
use crate::value::Value;

pub(super) fn namespace() -> Namespace {
    GlueOrder::ALL
        .iter()
        .fold(Namespace::new("node"), |ns, order| {
            ns.constant(order.name(), order.code())
        })
        .function("new", new)
        .function("insert_after", insert_after)
        .function("insert_before", insert_before)
        .function("delete", delete)
        .function("copy_list", copy_list)
        .function("tail", tail)
        .function("hpack", hpack)
        .function("hpack_to", hpack_to)
        .function("vpack", vpack)
        .function("dimensions", dimensions)
        .function("string", string)
        .function("keys", keys)
}

/// `node.new("glyph")`
fn new(session: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let name = args.check_str(1)?;
    Ok(vec![Value::Node(session.create(name)?)])
}

/// `node.insert_after(head, cur, new)`
fn insert_after(session: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let (head, cur, new) = (
        args.node(session, 1)?,
        args.node(session, 2)?,
        args.node(session, 3)?,
    );
    let head = session.arena_mut().insert_after(head, cur, new)?;
    Ok(vec![head.into()])
}

/// `node.insert_before(head, cur, new)`
fn insert_before(session: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let (head, cur, new) = (
        args.node(session, 1)?,
        args.node(session, 2)?,
        args.node(session, 3)?,
    );
    let head = session.arena_mut().insert_before(head, cur, new)?;
    Ok(vec![head.into()])
}

/// `node.delete(head, cur)`
fn delete(session: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let (head, cur) = (args.node(session, 1)?, args.node(session, 2)?);
    Ok(vec![session.arena_mut().delete(head, cur).into()])
}

fn copy_list(session: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let head = args.node(session, 1)?;
    Ok(vec![session.arena_mut().copy_list(head).into()])
}

fn tail(session: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let head = args.node(session, 1)?;
    Ok(vec![session.arena().tail(head).into()])
}

fn hpack(session: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let head = args.node(session, 1)?;
    Ok(vec![Value::Node(session.hpack(head, None)?)])
}

/// `node.hpack_to(head, width)`
fn hpack_to(session: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let head = args.node(session, 1)?;
    let width = args.check_dimension(2)?;
    Ok(vec![Value::Node(session.hpack(head, Some(width))?)])
}

fn vpack(session: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let head = args.node(session, 1)?;
    Ok(vec![Value::Node(session.vpack(head)?)])
}

/// `local wd, ht, dp = node.dimensions(head)`
fn dimensions(session: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let head = args.node(session, 1)?;
    let extent = session.dimensions(head)?;
    Ok(vec![
        extent.width.into(),
        extent.height.into(),
        extent.depth.into(),
    ])
}

/// Debug rendering of a chain.
fn string(session: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let head = args.node(session, 1)?;
    Ok(vec![Value::Str(session.arena().debug_string(head))])
}

fn keys(session: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let node = args.check_node(session, 1)?;
    let keys = session.keys(node).into_iter().map(Value::from).collect();
    Ok(vec![Value::List(keys)])
}
