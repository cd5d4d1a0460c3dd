//! Frontend adapters that wrap a single node.
//!
//! Neither adapter has attributes of its own: reads and writes fall
//! through to the wrapped node.

use std::any::Any;

use crate::node::NodeRef;
use crate::value::{HostObject, NodeCarrier};

/// A placed image, wrapping an `image` node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImageNode(pub Option<NodeRef>);

/// A finished vertical box, wrapping a `vlist` node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VListBox(pub Option<NodeRef>);

macro_rules! carrier {
    ($ty:ident, $tag:literal) => {
        impl NodeCarrier for $ty {
            fn carried_node(&self) -> Option<NodeRef> {
                self.0
            }
        }

        impl HostObject for $ty {
            fn type_tag(&self) -> &'static str {
                $tag
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_node_carrier(&self) -> Option<&dyn NodeCarrier> {
                Some(self)
            }

            fn display(&self) -> String {
                match self.0 {
                    Some(node) => format!("{} {node}", $tag),
                    None => format!("{} (empty)", $tag),
                }
            }
        }
    };
}

carrier!(ImageNode, "ImageNode");
carrier!(VListBox, "VList");
