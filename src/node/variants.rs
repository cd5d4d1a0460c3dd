//! Node bodies and their field tables.

use std::fmt;

use super::NodeRef;
use super::fields::{Field, Fields, field, impl_variant};
use crate::types::ScaledPoint;

/// Small enums that travel to the guest as integer codes or names.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $first:ident = $first_code:literal => $first_text:literal
            $(, $variant:ident = $code:literal => $text:literal)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $first,
            $($variant,)*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$name::$first, $($name::$variant,)*];

            pub const fn code(self) -> i64 {
                match self {
                    $name::$first => $first_code,
                    $($name::$variant => $code,)*
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $name::$first => $first_text,
                    $($name::$variant => $text,)*
                }
            }

            pub fn from_code(code: i64) -> Option<$name> {
                Self::ALL.iter().copied().find(|v| v.code() == code)
            }

            /// Case-insensitive name lookup.
            pub fn from_name(name: &str) -> Option<$name> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.name().eq_ignore_ascii_case(name))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$first
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

coded_enum! {
    /// Order of infinity of stretch or shrink.
    GlueOrder {
        Normal = 0 => "normal",
        Fil = 1 => "fil",
        Fill = 2 => "fill",
        Filll = 3 => "filll",
    }
}

coded_enum! {
    /// Direction in which the glue of a packed box is set.
    GlueSign {
        None = 0 => "none",
        Stretching = 1 => "stretching",
        Shrinking = 2 => "shrinking",
    }
}

coded_enum! {
    /// What a start/stop marker triggers at shipout.
    ActionType {
        None = 0 => "none",
        PdfLiteral = 1 => "pdf_literal",
        Color = 2 => "color",
        Hyperlink = 3 => "hyperlink",
        User = 4 => "user",
    }
}

/// A shaped character.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Glyph {
    pub codepoint: i64,
    /// Characters this glyph stands for (more than one for ligatures).
    pub components: String,
    pub width: ScaledPoint,
    pub height: ScaledPoint,
    pub depth: ScaledPoint,
    /// Vertical shift; positive raises the glyph.
    pub yoffset: ScaledPoint,
    pub hyphenate: bool,
}

impl Fields for Glyph {
    const FIELDS: &'static [Field<Self>] = &[
        field!(Glyph, "codepoint", codepoint: Int),
        field!(Glyph, "components", components: Str),
        field!(Glyph, "width", width: Dimension),
        field!(Glyph, "height", height: Dimension),
        field!(Glyph, "depth", depth: Dimension),
        field!(Glyph, "yoffset", yoffset: Dimension),
        field!(Glyph, "hyphenate", hyphenate: Bool),
    ];
}

/// Stretchable space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Glue {
    pub width: ScaledPoint,
    pub stretch: ScaledPoint,
    pub shrink: ScaledPoint,
    pub stretch_order: GlueOrder,
    pub shrink_order: GlueOrder,
}

impl Fields for Glue {
    const FIELDS: &'static [Field<Self>] = &[
        field!(Glue, "width", width: Dimension),
        field!(Glue, "stretch", stretch: Dimension),
        field!(Glue, "shrink", shrink: Dimension),
        field!(Glue, "stretch_order", stretch_order: GlueOrder),
        field!(Glue, "shrink_order", shrink_order: GlueOrder),
    ];
}

/// Fixed space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Kern {
    pub kern: ScaledPoint,
}

impl Fields for Kern {
    const FIELDS: &'static [Field<Self>] = &[field!(Kern, "kern", kern: Dimension)];
}

/// Discretionary break: `pre`/`post` when broken, `replace` otherwise.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Disc {
    pub pre: Option<NodeRef>,
    pub post: Option<NodeRef>,
    pub replace: Option<NodeRef>,
    pub penalty: i64,
}

impl Fields for Disc {
    const FIELDS: &'static [Field<Self>] = &[
        field!(Disc, "pre", pre: Chain),
        field!(Disc, "post", post: Chain),
        field!(Disc, "replace", replace: Chain),
        field!(Disc, "penalty", penalty: Int),
    ];
}

/// Line-break cost.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Penalty {
    pub penalty: i64,
    pub width: ScaledPoint,
}

impl Fields for Penalty {
    const FIELDS: &'static [Field<Self>] = &[
        field!(Penalty, "penalty", penalty: Int),
        field!(Penalty, "width", width: Dimension),
    ];
}

/// Filled rectangle, optionally wrapped in raw PDF.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rule {
    pub width: ScaledPoint,
    pub height: ScaledPoint,
    pub depth: ScaledPoint,
    pub pre: String,
    pub post: String,
    pub hide: bool,
}

impl Fields for Rule {
    const FIELDS: &'static [Field<Self>] = &[
        field!(Rule, "width", width: Dimension),
        field!(Rule, "height", height: Dimension),
        field!(Rule, "depth", depth: Dimension),
        field!(Rule, "pre", pre: Str),
        field!(Rule, "post", post: Str),
        field!(Rule, "hide", hide: Bool),
    ];
}

/// Horizontal box.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HList {
    pub width: ScaledPoint,
    pub height: ScaledPoint,
    pub depth: ScaledPoint,
    pub list: Option<NodeRef>,
    pub glue_set: f64,
    pub glue_sign: GlueSign,
    pub glue_order: GlueOrder,
    /// Downward displacement inside the enclosing list.
    pub shift: ScaledPoint,
    /// Set by packing.
    pub badness: i64,
}

impl Fields for HList {
    const FIELDS: &'static [Field<Self>] = &[
        field!(HList, "width", width: Dimension),
        field!(HList, "height", height: Dimension),
        field!(HList, "depth", depth: Dimension),
        field!(HList, "list", list: Chain),
        field!(HList, "glue_set", glue_set: Float),
        field!(HList, "glue_sign", glue_sign: GlueSign),
        field!(HList, "glue_order", glue_order: GlueOrder),
        field!(HList, "shift", shift: Dimension),
        field!(HList, "badness", badness: Int, read_only),
    ];
}

/// Vertical box.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VList {
    pub width: ScaledPoint,
    pub height: ScaledPoint,
    pub depth: ScaledPoint,
    pub list: Option<NodeRef>,
    pub glue_set: f64,
    pub glue_sign: GlueSign,
    pub glue_order: GlueOrder,
    pub shift_x: ScaledPoint,
}

impl Fields for VList {
    const FIELDS: &'static [Field<Self>] = &[
        field!(VList, "width", width: Dimension),
        field!(VList, "height", height: Dimension),
        field!(VList, "depth", depth: Dimension),
        field!(VList, "list", list: Chain),
        field!(VList, "glue_set", glue_set: Float),
        field!(VList, "glue_sign", glue_sign: GlueSign),
        field!(VList, "glue_order", glue_order: GlueOrder),
        field!(VList, "shift_x", shift_x: Dimension),
    ];
}

/// Placed image.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Image {
    pub width: ScaledPoint,
    pub height: ScaledPoint,
    pub page: i64,
    pub used: bool,
}

impl Fields for Image {
    const FIELDS: &'static [Field<Self>] = &[
        field!(Image, "width", width: Dimension),
        field!(Image, "height", height: Dimension),
        field!(Image, "page", page: Int),
        field!(Image, "used", used: Bool),
    ];
}

/// Switches the hyphenation language for the following nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Lang {
    pub lang: String,
}

impl Fields for Lang {
    const FIELDS: &'static [Field<Self>] = &[field!(Lang, "lang", lang: Str)];
}

/// Marker that opens or closes an action such as a hyperlink.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StartStop {
    pub action: ActionType,
}

impl Fields for StartStop {
    const FIELDS: &'static [Field<Self>] = &[field!(StartStop, "action", action: Action)];
}

impl_variant!(Glyph, Glue, Kern, Disc, Penalty, Rule, HList, VList, Image, Lang, StartStop);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{FieldError, FieldKind, FieldValue, NodeType, Variant};

    #[test]
    fn coded_enums() {
        assert_eq!(GlueOrder::from_code(2), Some(GlueOrder::Fill));
        assert_eq!(GlueOrder::from_name("FILLL"), Some(GlueOrder::Filll));
        assert_eq!(GlueOrder::from_code(4), None);
        assert_eq!(GlueSign::default(), GlueSign::None);
        assert_eq!(ActionType::Hyperlink.code(), 3);
        assert_eq!(ActionType::from_name("pdf_literal"), Some(ActionType::PdfLiteral));
    }

    #[test]
    fn read_and_write_fields() {
        let mut g = Glyph::default();
        g.set("width", FieldValue::Dimension(ScaledPoint::pt(5))).unwrap();
        g.set("components", FieldValue::Str("fi".into())).unwrap();
        assert_eq!(g.width, ScaledPoint::pt(5));
        assert_eq!(g.get("components"), Some(FieldValue::Str("fi".into())));
        assert_eq!(g.get("kern"), None);
        assert_eq!(g.node_type(), NodeType::Glyph);
    }

    #[test]
    fn write_checks_kind() {
        let mut k = Kern::default();
        assert_eq!(
            k.set("kern", FieldValue::Int(3)),
            Err(FieldError::Kind {
                expected: FieldKind::Dimension
            })
        );
        assert_eq!(k.set("width", FieldValue::Int(3)), Err(FieldError::Unknown));
    }

    #[test]
    fn badness_is_read_only() {
        let mut h = HList::default();
        assert_eq!(h.set("badness", FieldValue::Int(5)), Err(FieldError::ReadOnly));
        assert_eq!(h.get("badness"), Some(FieldValue::Int(0)));
        assert_eq!(h.kind_of("list"), Some(FieldKind::Chain));
    }

    #[test]
    fn keys_in_declaration_order() {
        assert_eq!(
            Glue::default().keys(),
            ["width", "stretch", "shrink", "stretch_order", "shrink_order"]
        );
        assert_eq!(StartStop::default().keys(), ["action"]);
    }
}
