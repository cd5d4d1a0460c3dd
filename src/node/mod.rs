//! Node model: the closed set of node variants, their arena and the chain
//! operations on top of it.
//!
//! Every node lives in a [`NodeArena`] and is addressed by a [`NodeRef`].
//! Chains are doubly linked through `next`/`prev`; boxes and discretionaries
//! own separate sub-chains through their `list`, `pre`, `post` and `replace`
//! fields.

mod arena;
mod display;
pub mod fields;
mod list;
mod pack;
mod variants;

use std::fmt;

use enum_dispatch::enum_dispatch;

pub use arena::{Chain, Node, NodeArena};
pub use fields::{FieldError, FieldKind, FieldValue};
pub use pack::{BoxMetrics, Direction, Extent, LayoutService, NaturalLayout};
pub use variants::{
    ActionType, Disc, Glue, GlueOrder, GlueSign, Glyph, HList, Image, Kern, Lang, Penalty, Rule,
    StartStop, VList,
};

/// Index of a node inside its [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeRef(pub(crate) u32);

impl NodeRef {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discriminant of a node variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Glyph,
    Glue,
    Kern,
    Disc,
    Penalty,
    Rule,
    HList,
    VList,
    Image,
    Lang,
    StartStop,
}

impl NodeType {
    pub const ALL: [NodeType; 11] = [
        NodeType::Glyph,
        NodeType::Glue,
        NodeType::Kern,
        NodeType::Disc,
        NodeType::Penalty,
        NodeType::Rule,
        NodeType::HList,
        NodeType::VList,
        NodeType::Image,
        NodeType::Lang,
        NodeType::StartStop,
    ];

    /// Names accepted by [`NodeType::from_name`].
    pub const NAMES: [&'static str; 11] = [
        "glyph",
        "glue",
        "kern",
        "disc",
        "penalty",
        "rule",
        "hlist",
        "vlist",
        "image",
        "lang",
        "startstop",
    ];

    pub const fn name(self) -> &'static str {
        match self {
            NodeType::Glyph => "glyph",
            NodeType::Glue => "glue",
            NodeType::Kern => "kern",
            NodeType::Disc => "disc",
            NodeType::Penalty => "penalty",
            NodeType::Rule => "rule",
            NodeType::HList => "hlist",
            NodeType::VList => "vlist",
            NodeType::Image => "image",
            NodeType::Lang => "lang",
            NodeType::StartStop => "startstop",
        }
    }

    /// Exact, lowercase lookup.
    pub fn from_name(name: &str) -> Option<NodeType> {
        NodeType::ALL.into_iter().find(|t| t.name() == name)
    }

    /// A zero-valued node body of this type.
    pub fn instantiate(self) -> NodeKind {
        match self {
            NodeType::Glyph => Glyph::default().into(),
            NodeType::Glue => Glue::default().into(),
            NodeType::Kern => Kern::default().into(),
            NodeType::Disc => Disc::default().into(),
            NodeType::Penalty => Penalty::default().into(),
            NodeType::Rule => Rule::default().into(),
            NodeType::HList => HList::default().into(),
            NodeType::VList => VList::default().into(),
            NodeType::Image => Image::default().into(),
            NodeType::Lang => Lang::default().into(),
            NodeType::StartStop => StartStop::default().into(),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// String-keyed access to the fields of a node body.
///
/// Used at the guest boundary only; crate code matches on [`NodeKind`]
/// and touches the fields directly.
#[enum_dispatch]
pub trait Variant {
    fn node_type(&self) -> NodeType;

    /// Field value, or `None` if the variant has no such key.
    fn get(&self, key: &str) -> Option<FieldValue>;

    fn set(&mut self, key: &str, value: FieldValue) -> Result<(), FieldError>;

    /// Kind of the field named `key`.
    fn kind_of(&self, key: &str) -> Option<FieldKind>;

    /// Variant-specific keys in declaration order.
    fn keys(&self) -> Vec<&'static str>;
}

/// Body of a node: one of the closed set of variants.
#[enum_dispatch(Variant)]
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Glyph,
    Glue,
    Kern,
    Disc,
    Penalty,
    Rule,
    HList,
    VList,
    Image,
    Lang,
    StartStop,
}

impl NodeKind {
    /// Sub-chains owned by this node, keyed by field name.
    pub fn sub_chains(&self) -> Vec<(&'static str, Option<NodeRef>)> {
        match self {
            NodeKind::HList(b) => vec![("list", b.list)],
            NodeKind::VList(b) => vec![("list", b.list)],
            NodeKind::Disc(d) => vec![("pre", d.pre), ("post", d.post), ("replace", d.replace)],
            _ => Vec::new(),
        }
    }

    /// Mutable slot of the sub-chain stored under `key`.
    pub(crate) fn sub_chain_mut(&mut self, key: &str) -> Option<&mut Option<NodeRef>> {
        match (self, key) {
            (NodeKind::HList(b), "list") => Some(&mut b.list),
            (NodeKind::VList(b), "list") => Some(&mut b.list),
            (NodeKind::Disc(d), "pre") => Some(&mut d.pre),
            (NodeKind::Disc(d), "post") => Some(&mut d.post),
            (NodeKind::Disc(d), "replace") => Some(&mut d.replace),
            _ => None,
        }
    }
}
