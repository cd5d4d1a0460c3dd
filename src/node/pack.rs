//! Box packing: natural sizes and glue setting.
//!
//! The engine never measures chains itself. It asks a [`LayoutService`],
//! which embedders can replace; [`NaturalLayout`] is the built-in one.

use super::{GlueOrder, GlueSign, HList, NodeArena, NodeKind, NodeRef, VList};
use crate::defaults::{INF_BAD, OVERFULL_BADNESS};
use crate::errors::Result;
use crate::types::ScaledPoint;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
}

/// Width, height and depth of a chain or box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Extent {
    pub width: ScaledPoint,
    pub height: ScaledPoint,
    pub depth: ScaledPoint,
}

/// Everything packing decides about a new box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxMetrics {
    pub extent: Extent,
    pub glue_set: f64,
    pub glue_sign: GlueSign,
    pub glue_order: GlueOrder,
    pub badness: i64,
}

/// Measures chains for packing. Implementations report failures as
/// [`BindError::ExternalService`](crate::errors::BindError::ExternalService).
pub trait LayoutService {
    /// Natural extent of the chain, traversed head to tail.
    fn dimensions(&self, arena: &NodeArena, head: Option<NodeRef>, dir: Direction)
    -> Result<Extent>;

    /// Metrics of a horizontal box around the chain, set to `width` if
    /// given, natural width otherwise.
    fn hpack(
        &self,
        arena: &NodeArena,
        head: Option<NodeRef>,
        width: Option<ScaledPoint>,
    ) -> Result<BoxMetrics>;

    /// Metrics of a vertical box around the chain at natural height.
    fn vpack(&self, arena: &NodeArena, head: Option<NodeRef>) -> Result<BoxMetrics>;
}

/// TeX-like packing at natural size.
#[derive(Clone, Copy, Debug, Default)]
pub struct NaturalLayout;

/// Stretch and shrink totals per glue order.
#[derive(Default)]
struct GlueTotals {
    stretch: [ScaledPoint; 4],
    shrink: [ScaledPoint; 4],
}

impl GlueTotals {
    fn add(&mut self, stretch: ScaledPoint, stretch_order: GlueOrder, shrink: ScaledPoint, shrink_order: GlueOrder) {
        self.stretch[stretch_order.code() as usize] += stretch;
        self.shrink[shrink_order.code() as usize] += shrink;
    }

    /// Highest order with a non-zero total.
    fn dominant(totals: &[ScaledPoint; 4]) -> Option<(GlueOrder, ScaledPoint)> {
        GlueOrder::ALL
            .iter()
            .rev()
            .map(|o| (*o, totals[o.code() as usize]))
            .find(|(_, total)| *total != ScaledPoint::ZERO)
    }
}

fn measure_horizontal(arena: &NodeArena, head: Option<NodeRef>, totals: &mut GlueTotals) -> Extent {
    fn grow(w: ScaledPoint, h: ScaledPoint, d: ScaledPoint, ext: &mut Extent) {
        ext.width += w;
        ext.height = ext.height.max(h);
        ext.depth = ext.depth.max(d);
    }

    let mut ext = Extent::default();
    for r in arena.iter(head) {
        match arena.kind(r) {
            NodeKind::Glyph(g) => grow(g.width, g.height + g.yoffset, g.depth - g.yoffset, &mut ext),
            NodeKind::Glue(g) => {
                ext.width += g.width;
                totals.add(g.stretch, g.stretch_order, g.shrink, g.shrink_order);
            }
            NodeKind::Kern(k) => ext.width += k.kern,
            NodeKind::Penalty(p) => ext.width += p.width,
            NodeKind::Rule(rule) => grow(rule.width, rule.height, rule.depth, &mut ext),
            NodeKind::HList(b) => grow(b.width, b.height - b.shift, b.depth + b.shift, &mut ext),
            NodeKind::VList(b) => grow(b.width, b.height, b.depth, &mut ext),
            NodeKind::Image(i) => grow(i.width, i.height, ScaledPoint::ZERO, &mut ext),
            NodeKind::Disc(d) => {
                let inner = measure_horizontal(arena, d.replace, totals);
                grow(inner.width, inner.height, inner.depth, &mut ext);
            }
            NodeKind::Lang(_) | NodeKind::StartStop(_) => {}
        }
    }
    ext
}

fn measure_vertical(arena: &NodeArena, head: Option<NodeRef>, totals: &mut GlueTotals) -> Extent {
    fn stack(w: ScaledPoint, h: ScaledPoint, d: ScaledPoint, ext: &mut Extent, depth: &mut ScaledPoint) {
        ext.height += *depth + h;
        *depth = d;
        ext.width = ext.width.max(w);
    }

    let mut ext = Extent::default();
    // depth of the previous item, pending until something follows it
    let mut depth = ScaledPoint::ZERO;
    for r in arena.iter(head) {
        match arena.kind(r) {
            NodeKind::HList(b) => stack(b.width + b.shift, b.height, b.depth, &mut ext, &mut depth),
            NodeKind::VList(b) => stack(b.width + b.shift_x, b.height, b.depth, &mut ext, &mut depth),
            NodeKind::Rule(rule) => stack(rule.width, rule.height, rule.depth, &mut ext, &mut depth),
            NodeKind::Glyph(g) => stack(g.width, g.height, g.depth, &mut ext, &mut depth),
            NodeKind::Image(i) => stack(i.width, i.height, ScaledPoint::ZERO, &mut ext, &mut depth),
            NodeKind::Glue(g) => {
                stack(ScaledPoint::ZERO, g.width, ScaledPoint::ZERO, &mut ext, &mut depth);
                totals.add(g.stretch, g.stretch_order, g.shrink, g.shrink_order);
            }
            NodeKind::Kern(k) => stack(ScaledPoint::ZERO, k.kern, ScaledPoint::ZERO, &mut ext, &mut depth),
            NodeKind::Disc(_) | NodeKind::Penalty(_) | NodeKind::Lang(_) | NodeKind::StartStop(_) => {}
        }
    }
    ext.depth = depth;
    ext
}

/// TeX badness of stretching or shrinking by `amount` given `total`
/// flexibility: about 100·(amount/total)³, at most [`INF_BAD`].
pub fn badness(amount: ScaledPoint, total: ScaledPoint) -> i64 {
    if amount == ScaledPoint::ZERO {
        return 0;
    }
    if total <= ScaledPoint::ZERO {
        return INF_BAD;
    }
    let ratio = amount.raw() as f64 / total.raw() as f64;
    ((100.0 * ratio.powi(3)).round() as i64).min(INF_BAD)
}

impl NaturalLayout {
    fn set_glue(natural: ScaledPoint, target: ScaledPoint, totals: &GlueTotals) -> BoxMetrics {
        let excess = target - natural;
        let mut metrics = BoxMetrics::default();
        if excess > ScaledPoint::ZERO {
            match GlueTotals::dominant(&totals.stretch) {
                Some((order, total)) => {
                    metrics.glue_sign = GlueSign::Stretching;
                    metrics.glue_order = order;
                    metrics.glue_set = excess.raw() as f64 / total.raw() as f64;
                    if order == GlueOrder::Normal {
                        metrics.badness = badness(excess, total);
                    }
                }
                None => metrics.badness = INF_BAD,
            }
        } else if excess < ScaledPoint::ZERO {
            let deficit = -excess;
            match GlueTotals::dominant(&totals.shrink) {
                Some((order, total)) => {
                    metrics.glue_sign = GlueSign::Shrinking;
                    metrics.glue_order = order;
                    metrics.glue_set = deficit.raw() as f64 / total.raw() as f64;
                    if order == GlueOrder::Normal {
                        if deficit > total {
                            metrics.glue_set = 1.0;
                            metrics.badness = OVERFULL_BADNESS;
                        } else {
                            metrics.badness = badness(deficit, total);
                        }
                    }
                }
                None => metrics.badness = OVERFULL_BADNESS,
            }
        }
        metrics
    }
}

impl LayoutService for NaturalLayout {
    fn dimensions(&self, arena: &NodeArena, head: Option<NodeRef>, dir: Direction) -> Result<Extent> {
        let mut totals = GlueTotals::default();
        Ok(match dir {
            Direction::Horizontal => measure_horizontal(arena, head, &mut totals),
            Direction::Vertical => measure_vertical(arena, head, &mut totals),
        })
    }

    fn hpack(
        &self,
        arena: &NodeArena,
        head: Option<NodeRef>,
        width: Option<ScaledPoint>,
    ) -> Result<BoxMetrics> {
        let mut totals = GlueTotals::default();
        let natural = measure_horizontal(arena, head, &mut totals);
        let mut metrics = match width {
            Some(target) => Self::set_glue(natural.width, target, &totals),
            None => BoxMetrics::default(),
        };
        metrics.extent = Extent {
            width: width.unwrap_or(natural.width),
            ..natural
        };
        Ok(metrics)
    }

    fn vpack(&self, arena: &NodeArena, head: Option<NodeRef>) -> Result<BoxMetrics> {
        let mut totals = GlueTotals::default();
        Ok(BoxMetrics {
            extent: measure_vertical(arena, head, &mut totals),
            ..BoxMetrics::default()
        })
    }
}

impl NodeArena {
    /// Wrap the chain in a new horizontal box. The box's `list` is the chain
    /// itself, links untouched.
    pub fn hpack(
        &mut self,
        layout: &dyn LayoutService,
        head: Option<NodeRef>,
        width: Option<ScaledPoint>,
    ) -> Result<NodeRef> {
        let m = layout.hpack(self, head, width)?;
        crate::log::debug!(
            width = %m.extent.width,
            glue_set = m.glue_set,
            badness = m.badness,
            "hpack"
        );
        Ok(self.alloc(HList {
            width: m.extent.width,
            height: m.extent.height,
            depth: m.extent.depth,
            list: head,
            glue_set: m.glue_set,
            glue_sign: m.glue_sign,
            glue_order: m.glue_order,
            shift: ScaledPoint::ZERO,
            badness: m.badness,
        }))
    }

    /// Wrap the chain in a new vertical box.
    pub fn vpack(&mut self, layout: &dyn LayoutService, head: Option<NodeRef>) -> Result<NodeRef> {
        let m = layout.vpack(self, head)?;
        crate::log::debug!(height = %m.extent.height, depth = %m.extent.depth, "vpack");
        Ok(self.alloc(VList {
            width: m.extent.width,
            height: m.extent.height,
            depth: m.extent.depth,
            list: head,
            glue_set: m.glue_set,
            glue_sign: m.glue_sign,
            glue_order: m.glue_order,
            shift_x: ScaledPoint::ZERO,
        }))
    }
}
