//! Human-readable dump of a chain, one node per line.
//!
//! Node identities are left out so the output only depends on the chain's
//! structure and contents.

use std::fmt;

use super::{GlueOrder, NodeArena, NodeKind, NodeRef};
use crate::types::ScaledPoint;

impl NodeArena {
    /// Render the chain at `head`, nested sub-chains indented below their
    /// container.
    pub fn debug_string(&self, head: Option<NodeRef>) -> String {
        let mut out = String::new();
        self.write_chain(&mut out, head, 0);
        out
    }

    fn write_chain(&self, out: &mut String, head: Option<NodeRef>, level: usize) {
        for r in self.iter(head) {
            let kind = self.kind(r);
            out.push_str(&"  ".repeat(level));
            out.push_str(&kind.to_string());
            out.push('\n');
            for (key, sub) in kind.sub_chains() {
                if sub.is_none() {
                    continue;
                }
                out.push_str(&"  ".repeat(level + 1));
                out.push_str(key);
                out.push_str(":\n");
                self.write_chain(out, sub, level + 2);
            }
        }
    }
}

fn flex(amount: ScaledPoint, order: GlueOrder) -> String {
    match order {
        GlueOrder::Normal => amount.to_string(),
        _ => format!("{}{}", amount.to_pt(), order.name()),
    }
}

/// One-line summary of a node body, without its sub-chains.
impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Glyph(g) => {
                write!(
                    f,
                    "glyph {:?} U+{:04X} wd={} ht={} dp={}",
                    g.components, g.codepoint, g.width, g.height, g.depth
                )?;
                if g.yoffset != ScaledPoint::ZERO {
                    write!(f, " yoffset={}", g.yoffset)?;
                }
                Ok(())
            }
            NodeKind::Glue(g) => write!(
                f,
                "glue {} plus {} minus {}",
                g.width,
                flex(g.stretch, g.stretch_order),
                flex(g.shrink, g.shrink_order)
            ),
            NodeKind::Kern(k) => write!(f, "kern {}", k.kern),
            NodeKind::Disc(d) => write!(f, "disc penalty={}", d.penalty),
            NodeKind::Penalty(p) => write!(f, "penalty {} wd={}", p.penalty, p.width),
            NodeKind::Rule(r) => {
                write!(f, "rule wd={} ht={} dp={}", r.width, r.height, r.depth)?;
                if r.hide {
                    f.write_str(" hidden")?;
                }
                Ok(())
            }
            NodeKind::HList(b) => write!(
                f,
                "hlist wd={} ht={} dp={} glue_set={} {} {} badness={}",
                b.width, b.height, b.depth, b.glue_set, b.glue_sign, b.glue_order, b.badness
            ),
            NodeKind::VList(b) => write!(
                f,
                "vlist wd={} ht={} dp={} glue_set={} {} {}",
                b.width, b.height, b.depth, b.glue_set, b.glue_sign, b.glue_order
            ),
            NodeKind::Image(i) => write!(f, "image wd={} ht={} page={}", i.width, i.height, i.page),
            NodeKind::Lang(l) => write!(f, "lang {:?}", l.lang),
            NodeKind::StartStop(ss) => write!(f, "startstop {}", ss.action),
        }
    }
}
