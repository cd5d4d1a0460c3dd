//! One document build: the node arena plus the external services, and the
//! generic operations a guest performs on values.

use crate::errors::{BindError, DimensionError, Result};
use crate::font::ShapingService;
use crate::node::{
    ActionType, Direction, Extent, FieldError, FieldKind, FieldValue, GlueOrder, GlueSign,
    LayoutService, NaturalLayout, NodeArena, NodeRef, Variant,
};
use crate::types::{ScaledPoint, Unit};
use crate::value::Value;

/// Keys every node answers to, before its variant fields.
pub const BASELINE_KEYS: [&str; 4] = ["next", "prev", "type", "id"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Lt,
    Le,
}

pub struct Session {
    arena: NodeArena,
    layout: Box<dyn LayoutService>,
    shaper: Option<Box<dyn ShapingService>>,
}

/// Configures the services of a [`Session`].
#[derive(Default)]
pub struct SessionBuilder {
    layout: Option<Box<dyn LayoutService>>,
    shaper: Option<Box<dyn ShapingService>>,
}

impl SessionBuilder {
    pub fn layout(mut self, layout: impl LayoutService + 'static) -> Self {
        self.layout = Some(Box::new(layout));
        self
    }

    pub fn shaper(mut self, shaper: impl ShapingService + 'static) -> Self {
        self.shaper = Some(Box::new(shaper));
        self
    }

    pub fn build(self) -> Session {
        Session {
            arena: NodeArena::new(),
            layout: self.layout.unwrap_or_else(|| Box::new(NaturalLayout)),
            shaper: self.shaper,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Session with the natural layout service and no shaper.
    pub fn new() -> Self {
        SessionBuilder::default().build()
    }

    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut NodeArena {
        &mut self.arena
    }

    pub fn shaper(&self) -> Result<&dyn ShapingService> {
        self.shaper
            .as_deref()
            .ok_or_else(|| BindError::external("shaping", "no shaping service configured"))
    }

    pub fn create(&mut self, name: &str) -> Result<NodeRef> {
        self.arena.create(name)
    }

    pub fn hpack(&mut self, head: Option<NodeRef>, width: Option<ScaledPoint>) -> Result<NodeRef> {
        self.arena.hpack(self.layout.as_ref(), head, width)
    }

    pub fn vpack(&mut self, head: Option<NodeRef>) -> Result<NodeRef> {
        self.arena.vpack(self.layout.as_ref(), head)
    }

    pub fn dimensions(&self, head: Option<NodeRef>) -> Result<Extent> {
        self.layout.dimensions(&self.arena, head, Direction::Horizontal)
    }

    // ------------------------------------------------------------------
    // Attribute access
    // ------------------------------------------------------------------

    /// Read `key` of a node. Unknown keys are absent, not an error.
    pub fn get(&self, node: NodeRef, key: &str) -> Option<Value> {
        let n = self.arena.get(node)?;
        match key {
            "next" => Some(n.next().into()),
            "prev" => Some(n.prev().into()),
            "type" => Some(Value::Str(n.node_type().name().to_string())),
            "id" => Some(Value::Int(n.id() as i64)),
            _ => n.kind.get(key).map(field_to_value),
        }
    }

    /// Write `key` of a node, checking the key and the value's type.
    ///
    /// `next` and `prev` are raw link writes. Sub-chain fields go through
    /// [`NodeArena::adopt_list`].
    pub fn set(&mut self, node: NodeRef, key: &str, value: Value) -> Result<()> {
        let variant = self
            .arena
            .get(node)
            .ok_or_else(|| foreign(node, key))?
            .node_type()
            .name();
        match key {
            "next" => {
                let target = self.node_of(&value, "next")?;
                if target.is_some_and(|t| self.arena.reachable(Some(t)).contains(&node)) {
                    return Err(BindError::ChainIntegrity {
                        message: format!("node {node} would reach itself through `next`"),
                    });
                }
                self.arena.set_next(node, target);
                return Ok(());
            }
            "prev" => {
                let target = self.node_of(&value, "prev")?;
                self.arena.set_prev(node, target);
                return Ok(());
            }
            "type" | "id" => {
                return Err(BindError::ReadOnly {
                    variant,
                    key: key.to_string(),
                });
            }
            _ => {}
        }

        let kind = self
            .arena
            .kind(node)
            .kind_of(key)
            .ok_or_else(|| BindError::unknown_key(variant, key, &self.keys(node)))?;
        let context = format!("{variant}.{key}");
        let field = self.coerce(kind, &value, &context)?;
        if let FieldValue::Chain(head) = field {
            self.arena.adopt_list(node, key, head)?;
            return Ok(());
        }
        self.arena
            .kind_mut(node)
            .set(key, field)
            .map_err(|e| match e {
                FieldError::ReadOnly => BindError::ReadOnly {
                    variant,
                    key: key.to_string(),
                },
                FieldError::Unknown => BindError::unknown_key(variant, key, &[]),
                FieldError::Kind { expected } => {
                    BindError::type_mismatch(context, expected.describe(), value.type_name())
                }
            })
    }

    /// All keys of a node: baseline keys, then its variant fields. Empty for
    /// a node this session does not hold.
    pub fn keys(&self, node: NodeRef) -> Vec<&'static str> {
        let Some(n) = self.arena.get(node) else {
            return Vec::new();
        };
        let mut keys = BASELINE_KEYS.to_vec();
        keys.extend(n.kind.keys());
        keys
    }

    /// Node argument: a node, a [`NodeCarrier`](crate::value::NodeCarrier)
    /// handle, or nil. Nodes held by another session are rejected.
    pub fn node_of(&self, value: &Value, context: &str) -> Result<Option<NodeRef>> {
        let node = match value {
            Value::Nil => None,
            Value::Node(r) => Some(*r),
            Value::Handle(h) if h.is_node_carrier() => h.carried_node(),
            other => return Err(BindError::type_mismatch(context, "node", other.type_name())),
        };
        match node {
            Some(r) if self.arena.get(r).is_none() => Err(foreign(r, context)),
            _ => Ok(node),
        }
    }

    fn coerce(&self, kind: FieldKind, value: &Value, context: &str) -> Result<FieldValue> {
        let coerced = match kind {
            FieldKind::Int => value.as_int().map(FieldValue::Int),
            FieldKind::Float => value.as_number().map(FieldValue::Float),
            FieldKind::Bool => match value {
                Value::Bool(b) => Some(FieldValue::Bool(*b)),
                _ => None,
            },
            FieldKind::Str => value.as_str().map(|s| FieldValue::Str(s.to_string())),
            FieldKind::Dimension => match value.to_dimension() {
                Ok(sp) => Some(FieldValue::Dimension(sp)),
                Err(BindError::TypeMismatch { .. }) => None,
                Err(e) => return Err(e),
            },
            FieldKind::Chain => return self.node_of(value, context).map(FieldValue::Chain),
            FieldKind::GlueOrder => {
                coded(value, GlueOrder::from_code, GlueOrder::from_name).map(FieldValue::GlueOrder)
            }
            FieldKind::GlueSign => {
                coded(value, GlueSign::from_code, GlueSign::from_name).map(FieldValue::GlueSign)
            }
            FieldKind::Action => {
                coded(value, ActionType::from_code, ActionType::from_name).map(FieldValue::Action)
            }
        };
        coerced.ok_or_else(|| BindError::type_mismatch(context, kind.describe(), value.type_name()))
    }

    // ------------------------------------------------------------------
    // Generic guest operations
    // ------------------------------------------------------------------

    /// `target[key]` / `target.key`.
    pub fn index(&self, target: &Value, key: &str) -> Result<Option<Value>> {
        match target {
            Value::Node(r) => Ok(self.get(*r, key)),
            Value::Dimension(sp) => Ok(match key {
                "pt" => Some(Value::Number(sp.to_pt())),
                "sp" => Some(Value::Int(sp.raw())),
                _ => None,
            }),
            Value::Handle(h) => {
                if let Some(v) = h.object().index(key) {
                    return Ok(Some(v));
                }
                Ok(h.carried_node().and_then(|node| self.get(node, key)))
            }
            other => Err(BindError::type_mismatch(
                format!("index `{key}`"),
                "node, ScaledPoint or host object",
                other.type_name(),
            )),
        }
    }

    /// `target.key = value`.
    pub fn new_index(&mut self, target: &Value, key: &str, value: Value) -> Result<()> {
        match target {
            Value::Node(r) => self.set(*r, key, value),
            Value::Handle(h) => match (h.object().new_index(key, value.clone()), h.carried_node()) {
                (Err(BindError::UnknownKey { .. }), Some(node)) => self.set(node, key, value),
                (result, _) => result,
            },
            other => Err(BindError::type_mismatch(
                format!("assign `{key}`"),
                "node or host object",
                other.type_name(),
            )),
        }
    }

    /// `target:name(args)`.
    pub fn call_method(&mut self, target: &Value, name: &str, args: &[Value]) -> Result<Vec<Value>> {
        match target {
            Value::Dimension(sp) => {
                let unit = match name {
                    "to_pt" => Unit::Pt,
                    "to_mm" => Unit::Mm,
                    "to_cm" => Unit::Cm,
                    "to_in" => Unit::In,
                    _ => return Err(no_method(name, target)),
                };
                Ok(vec![Value::Number(sp.to_unit(unit))])
            }
            Value::Handle(h) => {
                let this = h.clone();
                match this.object().call_method(self, &this, name, args) {
                    Some(result) => result,
                    None => Err(no_method(name, target)),
                }
            }
            _ => Err(no_method(name, target)),
        }
    }

    /// Binary arithmetic on dimension operands.
    pub fn arith(&self, op: ArithOp, a: &Value, b: &Value) -> Result<Value> {
        match op {
            ArithOp::Add | ArithOp::Sub => {
                let (x, y) = (operand(a, op)?, operand(b, op)?);
                let result = match op {
                    ArithOp::Add => x.checked_add(y),
                    _ => x.checked_sub(y),
                };
                result
                    .map(Value::Dimension)
                    .ok_or_else(|| out_of_range(x, op, y))
            }
            ArithOp::Mul => match (a, b) {
                (Value::Dimension(sp), n) | (n, Value::Dimension(sp)) if n.as_number().is_some() => {
                    let factor = n.as_number().unwrap_or_default();
                    sp.checked_mul(factor)
                        .map(Value::Dimension)
                        .ok_or_else(|| out_of_range(*sp, op, factor))
                }
                _ => Err(mismatched(op, a, b, "a ScaledPoint and a number")),
            },
            ArithOp::Div => match (a, b) {
                (Value::Dimension(x), Value::Dimension(y)) => Ok(Value::Number(x.try_ratio(*y)?)),
                (Value::Dimension(x), n) => match n.as_number() {
                    Some(n) => Ok(Value::Dimension(x.try_div(n)?)),
                    None => Err(mismatched(op, a, b, "a number or ScaledPoint divisor")),
                },
                _ => Err(mismatched(op, a, b, "a ScaledPoint dividend")),
            },
        }
    }

    /// Unary minus.
    pub fn neg(&self, a: &Value) -> Result<Value> {
        match a {
            Value::Dimension(sp) => sp
                .checked_neg()
                .map(Value::Dimension)
                .ok_or_else(|| DimensionError::out_of_range(format!("-({sp})")).into()),
            other => Err(BindError::type_mismatch(
                "operand of unary -",
                "ScaledPoint",
                other.type_name(),
            )),
        }
    }

    pub fn compare(&self, op: CompareOp, a: &Value, b: &Value) -> Result<bool> {
        match (op, a, b) {
            (CompareOp::Eq, Value::Dimension(x), Value::Dimension(y)) => Ok(x == y),
            (CompareOp::Lt, Value::Dimension(x), Value::Dimension(y)) => Ok(x < y),
            (CompareOp::Le, Value::Dimension(x), Value::Dimension(y)) => Ok(x <= y),
            (CompareOp::Eq, _, _) => Ok(a == b),
            (_, Value::Dimension(_), other) | (_, other, _) => Err(BindError::type_mismatch(
                "comparison",
                "two ScaledPoints",
                other.type_name(),
            )),
        }
    }

    /// Guest-visible string form of a value.
    pub fn tostring(&self, value: &Value) -> String {
        match value {
            Value::Node(r) => match self.arena.get(*r) {
                Some(n) => n.kind.to_string(),
                None => format!("invalid node {r}"),
            },
            other => other.to_text(),
        }
    }
}

fn foreign(node: NodeRef, context: &str) -> BindError {
    BindError::type_mismatch(format!("{context} (node {node})"), "a node of this session", "foreign node")
}

fn field_to_value(field: FieldValue) -> Value {
    match field {
        FieldValue::Int(i) => Value::Int(i),
        FieldValue::Float(f) => Value::Number(f),
        FieldValue::Bool(b) => Value::Bool(b),
        FieldValue::Str(s) => Value::Str(s),
        FieldValue::Dimension(sp) => Value::Dimension(sp),
        FieldValue::Chain(head) => head.into(),
        FieldValue::GlueOrder(o) => Value::Int(o.code()),
        FieldValue::GlueSign(s) => Value::Int(s.code()),
        FieldValue::Action(a) => Value::Int(a.code()),
    }
}

/// Enum field from its integer code or its name.
fn coded<T>(value: &Value, from_code: fn(i64) -> Option<T>, from_name: fn(&str) -> Option<T>) -> Option<T> {
    match value {
        Value::Str(s) => from_name(s),
        _ => value.as_int().and_then(from_code),
    }
}

fn operand(value: &Value, op: ArithOp) -> Result<ScaledPoint> {
    match value.to_dimension() {
        Err(BindError::TypeMismatch { expected, got, .. }) => Err(BindError::type_mismatch(
            format!("operand of {}", op.symbol()),
            expected,
            got,
        )),
        other => other,
    }
}

fn out_of_range(a: impl std::fmt::Display, op: ArithOp, b: impl std::fmt::Display) -> BindError {
    DimensionError::out_of_range(format!("{a} {} {b}", op.symbol())).into()
}

fn mismatched(op: ArithOp, a: &Value, b: &Value, expected: &'static str) -> BindError {
    let got = if matches!(a, Value::Dimension(_)) {
        b.type_name()
    } else {
        a.type_name()
    };
    BindError::type_mismatch(format!("operands of {}", op.symbol()), expected, got)
}

fn no_method(name: &str, target: &Value) -> BindError {
    BindError::type_mismatch(
        format!("method `{name}`"),
        "a value with that method",
        target.type_name(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp(s: &str) -> Value {
        Value::Dimension(s.parse().unwrap())
    }

    #[test]
    fn baseline_keys() {
        let mut session = Session::new();
        let g = session.create("glyph").unwrap();
        assert_eq!(session.get(g, "type"), Some(Value::from("glyph")));
        assert_eq!(session.get(g, "next"), Some(Value::Nil));
        assert!(matches!(session.get(g, "id"), Some(Value::Int(_))));
        assert!(matches!(
            session.set(g, "id", Value::Int(3)),
            Err(BindError::ReadOnly { .. })
        ));
        assert!(matches!(
            session.set(g, "type", Value::from("kern")),
            Err(BindError::ReadOnly { .. })
        ));
    }

    #[test]
    fn dimension_fields_accept_all_forms() {
        let mut session = Session::new();
        let g = session.create("glyph").unwrap();
        session.set(g, "width", Value::Int(5)).unwrap();
        assert_eq!(session.get(g, "width"), Some(sp("5pt")));
        session.set(g, "width", Value::from("1in")).unwrap();
        assert_eq!(session.get(g, "width"), Some(sp("72pt")));
        session.set(g, "width", sp("2pt")).unwrap();
        assert_eq!(session.get(g, "width"), Some(sp("2pt")));
        assert!(matches!(
            session.set(g, "width", Value::from("2 parsecs")),
            Err(BindError::InvalidDimension(_))
        ));
    }

    #[test]
    fn type_checked_writes() {
        let mut session = Session::new();
        let p = session.create("penalty").unwrap();
        let err = session.set(p, "penalty", Value::from("high")).unwrap_err();
        match err {
            BindError::TypeMismatch { context, expected, got } => {
                assert_eq!(context, "penalty.penalty");
                assert_eq!(expected, "integer");
                assert_eq!(got, "string");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(matches!(
            session.set(p, "bogus", Value::Int(1)),
            Err(BindError::UnknownKey { .. })
        ));
        assert_eq!(session.get(p, "bogus"), None);
    }

    #[test]
    fn enum_fields_by_code_or_name() {
        let mut session = Session::new();
        let g = session.create("glue").unwrap();
        session.set(g, "stretch_order", Value::Int(2)).unwrap();
        assert_eq!(session.get(g, "stretch_order"), Some(Value::Int(2)));
        session.set(g, "shrink_order", Value::from("filll")).unwrap();
        assert_eq!(session.get(g, "shrink_order"), Some(Value::Int(3)));
        assert!(session.set(g, "stretch_order", Value::Int(9)).is_err());
    }

    #[test]
    fn list_field_adopts_chain() {
        let mut session = Session::new();
        let b = session.create("hlist").unwrap();
        let k = session.create("kern").unwrap();
        session.set(b, "list", Value::Node(k)).unwrap();
        assert_eq!(session.get(b, "list"), Some(Value::Node(k)));
        session.set(b, "list", Value::Nil).unwrap();
        assert_eq!(session.get(b, "list"), Some(Value::Nil));
        assert!(matches!(
            session.set(b, "list", Value::Int(1)),
            Err(BindError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn arithmetic_coerces_operands() {
        let session = Session::new();
        let sum = session.arith(ArithOp::Add, &sp("1pt"), &Value::from("2pt")).unwrap();
        assert_eq!(sum, sp("3pt"));
        let diff = session.arith(ArithOp::Sub, &Value::Int(5), &sp("2pt")).unwrap();
        assert_eq!(diff, sp("3pt"));
        let twice = session.arith(ArithOp::Mul, &Value::Int(2), &sp("3pt")).unwrap();
        assert_eq!(twice, sp("6pt"));
        let ratio = session.arith(ArithOp::Div, &sp("6pt"), &sp("3pt")).unwrap();
        assert_eq!(ratio, Value::Number(2.0));
        assert!(matches!(
            session.arith(ArithOp::Div, &sp("6pt"), &Value::Int(0)),
            Err(BindError::DivideByZero)
        ));
        assert!(matches!(
            session.arith(ArithOp::Mul, &sp("1pt"), &sp("1pt")),
            Err(BindError::TypeMismatch { .. })
        ));
        assert!(matches!(
            session.arith(ArithOp::Add, &sp("1pt"), &Value::Bool(true)),
            Err(BindError::TypeMismatch { got: "boolean", .. })
        ));
    }

    #[test]
    fn comparisons() {
        let session = Session::new();
        assert!(session.compare(CompareOp::Lt, &sp("3pt"), &sp("5pt")).unwrap());
        assert!(session.compare(CompareOp::Le, &sp("5pt"), &sp("5pt")).unwrap());
        assert!(!session.compare(CompareOp::Eq, &sp("5pt"), &sp("3pt")).unwrap());
        assert!(session.compare(CompareOp::Lt, &sp("3pt"), &Value::Int(5)).is_err());
    }

    #[test]
    fn dimension_index_and_methods() {
        let mut session = Session::new();
        let one_inch = sp("1in");
        assert_eq!(session.index(&one_inch, "pt").unwrap(), Some(Value::Number(72.0)));
        assert_eq!(
            session.index(&one_inch, "sp").unwrap(),
            Some(Value::Int(72 * 65536))
        );
        let inches = session.call_method(&one_inch, "to_in", &[]).unwrap();
        assert_eq!(inches, vec![Value::Number(1.0)]);
        assert!(session.call_method(&one_inch, "to_furlong", &[]).is_err());
        assert_eq!(session.tostring(&one_inch), "72pt");
    }

    #[test]
    fn nodes_of_another_session_are_rejected() {
        let mut home = Session::new();
        let kerns: Vec<_> = (0..4).map(|_| home.create("kern").unwrap()).collect();
        let mut away = Session::new();
        let stray = Value::Node(kerns[3]);
        assert!(matches!(
            away.set(kerns[3], "kern", Value::Int(1)),
            Err(BindError::TypeMismatch { got: "foreign node", .. })
        ));
        assert!(away.new_index(&stray, "kern", Value::Int(1)).is_err());
        assert!(away.node_of(&stray, "t").is_err());
        assert_eq!(away.get(kerns[3], "kern"), None);
        assert!(away.keys(kerns[3]).is_empty());

        let local = away.create("kern").unwrap();
        assert!(away.set(local, "next", stray).is_err());
        assert_eq!(away.get(local, "next"), Some(Value::Nil));
    }

    #[test]
    fn next_writes_can_not_close_a_loop() {
        let mut session = Session::new();
        let a = session.create("kern").unwrap();
        let b = session.create("kern").unwrap();
        session.set(a, "next", Value::Node(b)).unwrap();
        assert!(matches!(
            session.set(b, "next", Value::Node(a)),
            Err(BindError::ChainIntegrity { .. })
        ));
        assert!(session.set(a, "next", Value::Node(a)).is_err());

        let boxed = session.create("hlist").unwrap();
        session.set(boxed, "list", Value::Node(a)).unwrap();
        assert!(matches!(
            session.set(b, "next", Value::Node(boxed)),
            Err(BindError::ChainIntegrity { .. })
        ));
        assert!(session.dimensions(Some(boxed)).is_ok());
    }

    #[test]
    fn arithmetic_overflow_is_an_error() {
        let mut session = Session::new();
        let big = sp("90000000000000pt");
        assert!(matches!(
            session.arith(ArithOp::Add, &big, &big),
            Err(BindError::InvalidDimension(DimensionError::OutOfRange { .. }))
        ));
        assert!(session.arith(ArithOp::Sub, &session.neg(&big).unwrap(), &big).is_err());
        assert!(session.arith(ArithOp::Mul, &big, &Value::Int(3)).is_err());
        assert!(session.arith(ArithOp::Div, &big, &Value::Number(1e-9)).is_err());
        assert!(session.arith(ArithOp::Add, &Value::Int(1 << 50), &sp("1pt")).is_err());
        assert!(session.neg(&Value::Dimension(ScaledPoint(i64::MIN))).is_err());

        let g = session.create("glyph").unwrap();
        assert!(matches!(
            session.set(g, "width", Value::Int(1 << 50)),
            Err(BindError::InvalidDimension(DimensionError::OutOfRange { .. }))
        ));
        assert!(session.set(g, "width", Value::Number(f64::INFINITY)).is_err());
        assert_eq!(session.get(g, "width"), Some(sp("0pt")));
    }

    #[test]
    fn missing_shaper_is_an_external_error() {
        let session = Session::new();
        assert!(matches!(
            session.shaper(),
            Err(BindError::ExternalService { service: "shaping", .. })
        ));
    }
}
