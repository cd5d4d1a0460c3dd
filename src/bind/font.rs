//! The `font` namespace: font instances for shaping.

use super::{Args, Namespace};
use crate::defaults::{SPACE_DIVISOR, SPACE_SHRINK_DIVISOR, SPACE_STRETCH_DIVISOR};
use crate::errors::Result;
use crate::font::{Font, FontMetrics};
use crate::session::Session;
use crate::types::ScaledPoint;
use crate::value::{Handle, Value};

pub(super) fn namespace() -> Namespace {
    Namespace::new("font").function("new", new)
}

/// `font.new("Serif", "10pt"[, {space = "3pt", ...}])`
///
/// Spacing entries that are absent or not dimensions fall back to fractions
/// of the size.
fn new(_: &mut Session, args: &Args<'_>) -> Result<Vec<Value>> {
    let name = args.check_str(1)?.to_string();
    let size = args.check_dimension(2)?;
    if size <= ScaledPoint::ZERO {
        return Err(args.bad(2, format!("font size must be positive, got {size}")));
    }
    let spacing = args.opt_table(3)?;
    let given = |key: &str| {
        spacing
            .and_then(|t| t.get(key))
            .and_then(|v| v.to_dimension().ok())
    };
    let space = given("space").unwrap_or(ScaledPoint(size.raw() / SPACE_DIVISOR));
    let metrics = FontMetrics {
        name,
        size,
        space,
        space_stretch: given("space_stretch")
            .unwrap_or(ScaledPoint(space.raw() / SPACE_STRETCH_DIVISOR)),
        space_shrink: given("space_shrink").unwrap_or(ScaledPoint(space.raw() / SPACE_SHRINK_DIVISOR)),
    };
    crate::log::debug!(font = %metrics.name, size = %metrics.size, "new font");
    Ok(vec![Handle::new(Font::new(metrics)).into()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::Registry;
    use crate::errors::BindError;
    use crate::value::Table;

    #[test]
    fn spacing_defaults_follow_the_size() {
        let registry = Registry::standard();
        let mut s = Session::new();
        let font = registry
            .call(&mut s, "font", "new", &[Value::from("Serif"), Value::from("12pt")])
            .unwrap();
        let f = font[0].as_handle().and_then(|h| h.downcast_ref::<Font>()).unwrap();
        assert_eq!(f.metrics.size, ScaledPoint::pt(12));
        assert_eq!(f.metrics.space, ScaledPoint::pt(4));
        assert_eq!(f.metrics.space_stretch, ScaledPoint::pt(2));
        assert_eq!(s.index(&font[0], "name").unwrap(), Some(Value::from("Serif")));
        assert_eq!(s.tostring(&font[0]), "font.Font Serif 12pt");
    }

    #[test]
    fn spacing_from_options() {
        let registry = Registry::standard();
        let mut s = Session::new();
        let mut spacing = Table::new();
        spacing.insert("space".into(), Value::from("3pt"));
        spacing.insert("space_shrink".into(), Value::Bool(true));
        let font = registry
            .call(
                &mut s,
                "font",
                "new",
                &[Value::from("Serif"), Value::Int(10), Value::Table(spacing)],
            )
            .unwrap();
        assert_eq!(
            s.index(&font[0], "space").unwrap(),
            Some(Value::Dimension(ScaledPoint::pt(3)))
        );
        assert_eq!(
            s.index(&font[0], "space_shrink").unwrap(),
            Some(Value::Dimension(ScaledPoint::pt(1)))
        );
    }

    #[test]
    fn size_must_be_positive() {
        let registry = Registry::standard();
        let mut s = Session::new();
        assert!(matches!(
            registry.call(&mut s, "font", "new", &[Value::from("Serif"), Value::Int(0)]),
            Err(BindError::BadArgument { position: 2, .. })
        ));
        assert!(registry.call(&mut s, "font", "new", &[Value::from("Serif")]).is_err());
        assert!(registry.call(&mut s, "font", "new", &[Value::Int(1), Value::Int(10)]).is_err());
    }
}
