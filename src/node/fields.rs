//! Field descriptor tables: the string-keyed view of node bodies.

use std::fmt;

use super::NodeRef;
use super::variants::{ActionType, GlueOrder, GlueSign};
use crate::types::ScaledPoint;

/// Kind of a field, checked before any write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Float,
    Bool,
    Str,
    Dimension,
    Chain,
    GlueOrder,
    GlueSign,
    Action,
}

impl FieldKind {
    pub fn describe(self) -> &'static str {
        match self {
            FieldKind::Int => "integer",
            FieldKind::Float => "number",
            FieldKind::Bool => "boolean",
            FieldKind::Str => "string",
            FieldKind::Dimension => "ScaledPoint, number or string with unit",
            FieldKind::Chain => "node or nil",
            FieldKind::GlueOrder => "glue order (0-3 or normal/fil/fill/filll)",
            FieldKind::GlueSign => "glue sign (0-2 or none/stretching/shrinking)",
            FieldKind::Action => "action type",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Typed value of a single field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Dimension(ScaledPoint),
    Chain(Option<NodeRef>),
    GlueOrder(GlueOrder),
    GlueSign(GlueSign),
    Action(ActionType),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Str(_) => FieldKind::Str,
            FieldValue::Dimension(_) => FieldKind::Dimension,
            FieldValue::Chain(_) => FieldKind::Chain,
            FieldValue::GlueOrder(_) => FieldKind::GlueOrder,
            FieldValue::GlueSign(_) => FieldKind::GlueSign,
            FieldValue::Action(_) => FieldKind::Action,
        }
    }
}

/// Why a field write was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldError {
    Unknown,
    ReadOnly,
    Kind { expected: FieldKind },
}

/// Accessor pair for one key of a node body `T`.
pub struct Field<T: 'static> {
    pub key: &'static str,
    pub kind: FieldKind,
    pub get: fn(&T) -> FieldValue,
    /// `None` for read-only fields.
    pub set: Option<fn(&mut T, FieldValue)>,
}

/// A node body with a static field table.
pub trait Fields: Sized + 'static {
    const FIELDS: &'static [Field<Self>];
}

pub fn lookup<T: Fields>(key: &str) -> Option<&'static Field<T>> {
    T::FIELDS.iter().find(|f| f.key == key)
}

pub fn read<T: Fields>(body: &T, key: &str) -> Option<FieldValue> {
    lookup::<T>(key).map(|f| (f.get)(body))
}

pub fn write<T: Fields>(body: &mut T, key: &str, value: FieldValue) -> Result<(), FieldError> {
    let field = lookup::<T>(key).ok_or(FieldError::Unknown)?;
    let set = field.set.ok_or(FieldError::ReadOnly)?;
    if value.kind() != field.kind {
        return Err(FieldError::Kind {
            expected: field.kind,
        });
    }
    set(body, value);
    Ok(())
}

pub fn keys<T: Fields>() -> Vec<&'static str> {
    T::FIELDS.iter().map(|f| f.key).collect()
}

/// Builds a [`Field`] for `$ty.$member` whose value travels as
/// `FieldValue::$kind`.
macro_rules! field {
    ($ty:ty, $key:literal, $member:ident : $kind:ident) => {
        $crate::node::fields::Field::<$ty> {
            key: $key,
            kind: $crate::node::fields::FieldKind::$kind,
            get: {
                fn get(body: &$ty) -> $crate::node::fields::FieldValue {
                    $crate::node::fields::FieldValue::$kind(Clone::clone(&body.$member))
                }
                get
            },
            set: Some({
                fn set(body: &mut $ty, value: $crate::node::fields::FieldValue) {
                    if let $crate::node::fields::FieldValue::$kind(v) = value {
                        body.$member = v;
                    }
                }
                set as fn(&mut $ty, $crate::node::fields::FieldValue)
            }),
        }
    };
    ($ty:ty, $key:literal, $member:ident : $kind:ident, read_only) => {
        $crate::node::fields::Field::<$ty> {
            key: $key,
            kind: $crate::node::fields::FieldKind::$kind,
            get: {
                fn get(body: &$ty) -> $crate::node::fields::FieldValue {
                    $crate::node::fields::FieldValue::$kind(Clone::clone(&body.$member))
                }
                get
            },
            set: None,
        }
    };
}

/// Implements [`Variant`](super::Variant) on top of a [`Fields`] table.
macro_rules! impl_variant {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl $crate::node::Variant for $ty {
                fn node_type(&self) -> $crate::node::NodeType {
                    $crate::node::NodeType::$ty
                }

                fn get(&self, key: &str) -> Option<$crate::node::fields::FieldValue> {
                    $crate::node::fields::read(self, key)
                }

                fn set(
                    &mut self,
                    key: &str,
                    value: $crate::node::fields::FieldValue,
                ) -> Result<(), $crate::node::fields::FieldError> {
                    $crate::node::fields::write(self, key, value)
                }

                fn kind_of(&self, key: &str) -> Option<$crate::node::fields::FieldKind> {
                    $crate::node::fields::lookup::<$ty>(key).map(|f| f.kind)
                }

                fn keys(&self) -> Vec<&'static str> {
                    $crate::node::fields::keys::<$ty>()
                }
            }
        )+
    };
}

pub(crate) use field;
pub(crate) use impl_variant;
