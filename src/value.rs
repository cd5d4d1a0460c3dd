//! Values crossing the guest boundary.
//!
//! A host interpreter converts its own values to [`Value`] before calling a
//! native function and converts the results back. Nodes travel as arena
//! references; every other host object travels as a reference-counted
//! [`Handle`].

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::errors::{BindError, DimensionError, Result};
use crate::node::NodeRef;
use crate::parse::parse_dimension;
use crate::session::Session;
use crate::types::ScaledPoint;

/// String-keyed table, e.g. an options argument.
pub type Table = BTreeMap<String, Value>;

#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Number(f64),
    Str(String),
    Dimension(ScaledPoint),
    Node(NodeRef),
    Handle(Handle),
    List(Vec<Value>),
    Table(Table),
}

impl Value {
    /// Name of the value's type as guest error messages show it.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Dimension(_) => "ScaledPoint",
            Value::Node(_) => "node",
            Value::Handle(h) => h.type_tag(),
            Value::List(_) => "list",
            Value::Table(_) => "table",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Everything except nil and false.
    pub fn truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Integers, and numbers without a fractional part.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<&Handle> {
        match self {
            Value::Handle(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Coerce a dimension operand: a ScaledPoint as is, a number as points,
    /// a string through the dimension parser.
    pub fn to_dimension(&self) -> Result<ScaledPoint> {
        match self {
            Value::Dimension(sp) => Ok(*sp),
            Value::Int(i) => ScaledPoint::checked_pt(*i)
                .ok_or_else(|| DimensionError::out_of_range(format!("{i}pt")).into()),
            Value::Number(n) => ScaledPoint::checked_from_pt(*n)
                .ok_or_else(|| DimensionError::out_of_range(format!("{n}pt")).into()),
            Value::Str(s) => Ok(parse_dimension(s)?),
            other => Err(BindError::type_mismatch(
                "dimension",
                "ScaledPoint, number or string with unit",
                other.type_name(),
            )),
        }
    }

    /// Text form used when a value is logged or appended as text.
    pub fn to_text(&self) -> String {
        match self {
            Value::Nil => "nil".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Str(s) => s.clone(),
            Value::Dimension(sp) => sp.to_string(),
            Value::Node(r) => format!("node {r}"),
            Value::Handle(h) => h.to_string(),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(Value::to_text).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Table(t) => {
                let parts: Vec<String> =
                    t.iter().map(|(k, v)| format!("{k}={}", v.to_text())).collect();
                format!("{{{}}}", parts.join(", "))
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Int(a), Value::Number(b)) | (Value::Number(b), Value::Int(a)) => *a as f64 == *b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Dimension(a), Value::Dimension(b)) => a == b,
            (Value::Node(a), Value::Node(b)) => a == b,
            (Value::Handle(a), Value::Handle(b)) => a.ptr_eq(b),
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<ScaledPoint> for Value {
    fn from(sp: ScaledPoint) -> Self {
        Value::Dimension(sp)
    }
}

impl From<NodeRef> for Value {
    fn from(r: NodeRef) -> Self {
        Value::Node(r)
    }
}

impl From<Option<NodeRef>> for Value {
    fn from(r: Option<NodeRef>) -> Self {
        r.map_or(Value::Nil, Value::Node)
    }
}

impl From<Handle> for Value {
    fn from(h: Handle) -> Self {
        Value::Handle(h)
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Value::Table(t)
    }
}

/// A host object the guest holds a reference to.
pub trait HostObject: Any + fmt::Debug {
    /// Tag used for checked downcasts and in error messages.
    fn type_tag(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    /// Attribute read; `None` when the object has no such key.
    fn index(&self, _key: &str) -> Option<Value> {
        None
    }

    /// Attribute write.
    fn new_index(&self, key: &str, _value: Value) -> Result<()> {
        Err(BindError::unknown_key(self.type_tag(), key, &[]))
    }

    /// Method call `this:name(args)`; `None` when there is no such method.
    fn call_method(
        &self,
        _session: &mut Session,
        _this: &Handle,
        _name: &str,
        _args: &[Value],
    ) -> Option<Result<Vec<Value>>> {
        None
    }

    /// Objects that wrap a single node expose it here.
    fn as_node_carrier(&self) -> Option<&dyn NodeCarrier> {
        None
    }

    fn display(&self) -> String {
        self.type_tag().to_string()
    }
}

/// Capability of a host object that wraps exactly one node.
///
/// `get` and the chain operations look through carriers to the wrapped node.
pub trait NodeCarrier {
    /// The wrapped node, if there is one.
    fn carried_node(&self) -> Option<NodeRef>;
}

/// Shared reference to a [`HostObject`].
#[derive(Clone)]
pub struct Handle(Rc<dyn HostObject>);

impl Handle {
    pub fn new<T: HostObject>(object: T) -> Self {
        Handle(Rc::new(object))
    }

    pub fn type_tag(&self) -> &'static str {
        self.0.type_tag()
    }

    pub fn object(&self) -> &dyn HostObject {
        &*self.0
    }

    pub fn downcast_ref<T: HostObject>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Checked downcast for argument handling.
    pub fn expect<T: HostObject>(&self, context: &str, expected: &'static str) -> Result<&T> {
        self.downcast_ref::<T>()
            .ok_or_else(|| BindError::type_mismatch(context, expected, self.type_tag()))
    }

    pub fn ptr_eq(&self, other: &Handle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Node behind a [`NodeCarrier`]; `None` for other objects and for
    /// carriers that hold no node.
    pub fn carried_node(&self) -> Option<NodeRef> {
        self.0.as_node_carrier().and_then(|c| c.carried_node())
    }

    pub fn is_node_carrier(&self) -> bool {
        self.0.as_node_carrier().is_some()
    }
}

/// Identity, not structural equality.
impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&self.0).finish()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Wrapper(Option<NodeRef>);

    impl HostObject for Wrapper {
        fn type_tag(&self) -> &'static str {
            "Wrapper"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_node_carrier(&self) -> Option<&dyn NodeCarrier> {
            Some(self)
        }
    }

    impl NodeCarrier for Wrapper {
        fn carried_node(&self) -> Option<NodeRef> {
            self.0
        }
    }

    #[test]
    fn dimension_coercion() {
        assert_eq!(Value::Int(3).to_dimension().unwrap(), ScaledPoint::pt(3));
        assert_eq!(Value::Number(0.5).to_dimension().unwrap(), ScaledPoint(32768));
        assert_eq!(Value::from("1in").to_dimension().unwrap(), ScaledPoint::pt(72));
        assert!(matches!(
            Value::from("1xx").to_dimension(),
            Err(BindError::InvalidDimension(_))
        ));
        assert!(matches!(
            Value::Bool(true).to_dimension(),
            Err(BindError::TypeMismatch { got: "boolean", .. })
        ));
    }

    #[test]
    fn carriers_fail_closed() {
        let full = Handle::new(Wrapper(Some(NodeRef(4))));
        let empty = Handle::new(Wrapper(None));
        assert_eq!(full.carried_node(), Some(NodeRef(4)));
        assert_eq!(empty.carried_node(), None);
        assert!(empty.is_node_carrier());
        assert!(full.downcast_ref::<Wrapper>().is_some());
    }

    #[test]
    fn handle_equality_is_identity() {
        let a = Handle::new(Wrapper(None));
        let b = Handle::new(Wrapper(None));
        assert_eq!(Value::Handle(a.clone()), Value::Handle(a.clone()));
        assert_ne!(Value::Handle(a), Value::Handle(b));
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Nil.truthy());
        assert!(!Value::Bool(false).truthy());
        assert!(Value::Int(0).truthy());
        assert_eq!(Value::Number(2.0).as_int(), Some(2));
        assert_eq!(Value::Number(2.5).as_int(), None);
    }
}
