//! Native function tables exposed to the guest.
//!
//! A host interpreter registers every [`Namespace`] of a [`Registry`] under
//! its name and forwards calls through [`Registry::call`]. Arguments are
//! positional and 1-based, as the guest sees them.

mod font;
mod frontend;
mod glu;
mod node;

use std::collections::BTreeMap;

use crate::errors::{BindError, Result};
use crate::node::NodeRef;
use crate::session::Session;
use crate::types::ScaledPoint;
use crate::value::{HostObject, Table, Value};

/// Signature of every native function.
pub type NativeFn = fn(&mut Session, &Args<'_>) -> Result<Vec<Value>>;

/// Positional arguments of one native call.
#[derive(Clone, Copy, Debug)]
pub struct Args<'a> {
    function: &'a str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(function: &'a str, values: &'a [Value]) -> Self {
        Args { function, values }
    }

    pub fn function(&self) -> &'a str {
        self.function
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    /// Argument at 1-based `pos`; a missing argument is nil.
    pub fn get(&self, pos: usize) -> Option<&'a Value> {
        pos.checked_sub(1).and_then(|i| self.values.get(i))
    }

    /// Arguments from `pos` on.
    pub fn rest(&self, pos: usize) -> &'a [Value] {
        let start = pos.saturating_sub(1).min(self.values.len());
        &self.values[start..]
    }

    pub fn bad(&self, pos: usize, message: impl Into<String>) -> BindError {
        BindError::BadArgument {
            function: self.function.to_string(),
            position: pos,
            message: message.into(),
        }
    }

    fn expected(&self, pos: usize, what: &str) -> BindError {
        let got = self.get(pos).map_or("no value", Value::type_name);
        self.bad(pos, format!("{what} expected, got {got}"))
    }

    pub fn check_str(&self, pos: usize) -> Result<&'a str> {
        self.get(pos)
            .and_then(Value::as_str)
            .ok_or_else(|| self.expected(pos, "string"))
    }

    pub fn check_number(&self, pos: usize) -> Result<f64> {
        self.get(pos)
            .and_then(Value::as_number)
            .ok_or_else(|| self.expected(pos, "number"))
    }

    pub fn check_int(&self, pos: usize) -> Result<i64> {
        self.get(pos)
            .and_then(Value::as_int)
            .ok_or_else(|| self.expected(pos, "integer"))
    }

    /// A number, or `default` when the argument is nil or absent.
    pub fn opt_number(&self, pos: usize, default: f64) -> Result<f64> {
        match self.get(pos) {
            None | Some(Value::Nil) => Ok(default),
            Some(_) => self.check_number(pos),
        }
    }

    /// A dimension in any accepted form.
    pub fn check_dimension(&self, pos: usize) -> Result<ScaledPoint> {
        match self.get(pos) {
            None => Err(self.expected(pos, "dimension")),
            Some(v) => v.to_dimension().map_err(|e| match e {
                BindError::TypeMismatch { .. } => self.expected(pos, "dimension"),
                other => other,
            }),
        }
    }

    /// A dimension, or `default` when the argument is nil, absent or does
    /// not convert.
    pub fn opt_dimension(&self, pos: usize, default: ScaledPoint) -> ScaledPoint {
        self.get(pos)
            .and_then(|v| v.to_dimension().ok())
            .unwrap_or(default)
    }

    pub fn check_table(&self, pos: usize) -> Result<&'a Table> {
        self.get(pos)
            .and_then(Value::as_table)
            .ok_or_else(|| self.bad(pos, "table expected"))
    }

    pub fn opt_table(&self, pos: usize) -> Result<Option<&'a Table>> {
        match self.get(pos) {
            None | Some(Value::Nil) => Ok(None),
            Some(_) => self.check_table(pos).map(Some),
        }
    }

    /// A node, node carrier or nil.
    pub fn node(&self, session: &Session, pos: usize) -> Result<Option<NodeRef>> {
        let value = self.get(pos).unwrap_or(&Value::Nil);
        session.node_of(value, self.function).map_err(|e| match e {
            BindError::TypeMismatch {
                got: "foreign node", ..
            } => self.bad(pos, "node belongs to another session"),
            _ => self.expected(pos, "node"),
        })
    }

    /// Like [`Args::node`], but nil is rejected.
    pub fn check_node(&self, session: &Session, pos: usize) -> Result<NodeRef> {
        self.node(session, pos)?
            .ok_or_else(|| self.expected(pos, "node"))
    }

    /// A host object of type `T`.
    pub fn check_handle<T: HostObject>(&self, pos: usize, expected: &str) -> Result<&'a T> {
        self.get(pos)
            .and_then(Value::as_handle)
            .and_then(|h| h.downcast_ref::<T>())
            .ok_or_else(|| self.expected(pos, expected))
    }
}

/// One guest module: functions plus constants.
#[derive(Clone, Debug, Default)]
pub struct Namespace {
    name: &'static str,
    functions: BTreeMap<&'static str, NativeFn>,
    constants: BTreeMap<&'static str, Value>,
}

impl Namespace {
    pub fn new(name: &'static str) -> Self {
        Namespace {
            name,
            ..Namespace::default()
        }
    }

    pub fn function(mut self, name: &'static str, f: NativeFn) -> Self {
        self.functions.insert(name, f);
        self
    }

    pub fn constant(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.constants.insert(name, value.into());
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn lookup(&self, name: &str) -> Option<NativeFn> {
        self.functions.get(name).copied()
    }

    pub fn functions(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }

    pub fn constants(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.constants.iter().map(|(k, v)| (*k, v))
    }
}

/// All namespaces a host exposes.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    namespaces: BTreeMap<&'static str, Namespace>,
}

impl Registry {
    /// The `glu`, `node`, `font` and `frontend` namespaces.
    pub fn standard() -> Self {
        let mut registry = Registry::default();
        registry.register(glu::namespace());
        registry.register(node::namespace());
        registry.register(font::namespace());
        registry.register(frontend::namespace());
        registry
    }

    pub fn register(&mut self, namespace: Namespace) {
        self.namespaces.insert(namespace.name, namespace);
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.get(name)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.values()
    }

    /// Call `ns.name(args...)`.
    pub fn call(
        &self,
        session: &mut Session,
        ns: &str,
        name: &str,
        args: &[Value],
    ) -> Result<Vec<Value>> {
        let f = self
            .namespace(ns)
            .and_then(|n| n.lookup(name))
            .ok_or_else(|| BindError::type_mismatch(format!("{ns}.{name}"), "a function", "nil"))?;
        let function = format!("{ns}.{name}");
        crate::log::trace!(function = %function, args = args.len(), "native call");
        f(session, &Args::new(&function, args))
    }

    /// Value of the constant `ns.name`.
    pub fn constant(&self, ns: &str, name: &str) -> Option<&Value> {
        self.namespace(ns).and_then(|n| n.constants.get(name))
    }
}
