//! End-to-end guest scenarios through the registry and the session.

use glu::carriers::ImageNode;
use glu::font::{Atom, Feature, Font, FontMetrics, ShapingService};
use glu::node::{FieldKind, Variant};
use glu::{BindError, Handle, NodeRef, NodeType, Registry, ScaledPoint, Session, Value};

fn pt(n: i64) -> Value {
    Value::Dimension(ScaledPoint::pt(n))
}

fn one(values: Vec<Value>) -> Value {
    assert_eq!(values.len(), 1, "expected a single result, got {values:?}");
    values.into_iter().next().unwrap_or_default()
}

fn node(value: &Value) -> NodeRef {
    match value {
        Value::Node(r) => *r,
        other => panic!("expected a node, got {other:?}"),
    }
}

#[test]
fn centimetres_to_millimetres() {
    let registry = Registry::standard();
    let mut s = Session::new();
    let cm = one(registry.call(&mut s, "glu", "sp", &["1cm".into()]).unwrap());
    let mm = one(registry.call(&mut s, "glu", "sp_to_unit", &[cm, "mm".into()]).unwrap());
    match mm {
        Value::Number(n) => assert!((n - 10.0).abs() < 1e-4, "got {n}"),
        other => panic!("expected a number, got {other:?}"),
    }
}

#[test]
fn delete_glue_between_glyphs() {
    let registry = Registry::standard();
    let mut s = Session::new();
    let mut head = Value::Nil;
    let mut made = Vec::new();
    for name in ["glyph", "glue", "glyph"] {
        let n = one(registry.call(&mut s, "node", "new", &[name.into()]).unwrap());
        let tail = one(registry.call(&mut s, "node", "tail", &[head.clone()]).unwrap());
        head = one(
            registry
                .call(&mut s, "node", "insert_after", &[head, tail, n.clone()])
                .unwrap(),
        );
        made.push(n);
    }
    let (a, glue, b) = (made[0].clone(), made[1].clone(), made[2].clone());

    let head = one(
        registry
            .call(&mut s, "node", "delete", &[head, glue.clone()])
            .unwrap(),
    );
    assert_eq!(head, a);
    assert_eq!(s.index(&a, "next").unwrap(), Some(b.clone()));
    assert_eq!(s.index(&b, "prev").unwrap(), Some(a.clone()));
    assert_eq!(s.index(&b, "next").unwrap(), Some(Value::Nil));
    assert_eq!(s.index(&glue, "next").unwrap(), Some(Value::Nil));
    assert_eq!(s.index(&glue, "prev").unwrap(), Some(Value::Nil));
}

#[test]
fn hpack_keeps_the_chain() {
    let registry = Registry::standard();
    let mut s = Session::new();
    let mut head = Value::Nil;
    for _ in 0..4 {
        let g = one(registry.call(&mut s, "node", "new", &["glyph".into()]).unwrap());
        head = one(
            registry
                .call(&mut s, "node", "insert_before", &[head, Value::Nil, g])
                .unwrap(),
        );
    }
    let before: Vec<u64> = s
        .arena()
        .iter(Some(node(&head)))
        .map(|r| s.arena()[r].id())
        .collect();

    let hbox = one(registry.call(&mut s, "node", "hpack", &[head.clone()]).unwrap());
    let list = s.index(&hbox, "list").unwrap().unwrap_or_default();
    assert_eq!(list, head);
    let after: Vec<u64> = s
        .arena()
        .iter(Some(node(&list)))
        .map(|r| s.arena()[r].id())
        .collect();
    assert_eq!(before, after);
    assert_eq!(s.index(&hbox, "type").unwrap(), Some("hlist".into()));
}

#[test]
fn max_and_min_of_points() {
    let registry = Registry::standard();
    let mut s = Session::new();
    let (a, b) = (pt(5), pt(3));
    assert_eq!(
        one(registry.call(&mut s, "glu", "max", &[a.clone(), b.clone()]).unwrap()),
        pt(5)
    );
    assert_eq!(one(registry.call(&mut s, "glu", "min", &[a, b]).unwrap()), pt(3));
}

/// A value of the right kind for every field, with what reading it back
/// should produce.
fn sample(s: &mut Session, kind: FieldKind) -> (Value, Value) {
    match kind {
        FieldKind::Int => (Value::Int(7), Value::Int(7)),
        FieldKind::Float => (Value::Number(0.25), Value::Number(0.25)),
        FieldKind::Bool => (Value::Bool(true), Value::Bool(true)),
        FieldKind::Str => ("q".into(), "q".into()),
        FieldKind::Dimension => ("3pt".into(), pt(3)),
        FieldKind::Chain => {
            let k = Value::Node(s.create("kern").unwrap_or_else(|e| panic!("{e}")));
            (k.clone(), k)
        }
        FieldKind::GlueOrder | FieldKind::Action => (Value::Int(2), Value::Int(2)),
        FieldKind::GlueSign => ("shrinking".into(), Value::Int(2)),
    }
}

#[test]
fn every_variant_key_round_trips() {
    let mut s = Session::new();
    for ty in NodeType::ALL {
        let n = s.create(ty.name()).unwrap();
        let keys = s.arena().kind(n).keys();
        assert!(!keys.is_empty(), "{ty} has no fields");
        for key in keys {
            let kind = s.arena().kind(n).kind_of(key).unwrap();
            let (written, expected) = sample(&mut s, kind);
            match s.set(n, key, written) {
                Ok(()) => assert_eq!(s.get(n, key), Some(expected), "{ty}.{key}"),
                Err(BindError::ReadOnly { .. }) => assert_eq!(key, "badness"),
                Err(e) => panic!("{ty}.{key}: {e}"),
            }
        }
        assert_eq!(s.get(n, "bogus"), None);
        assert!(matches!(
            s.set(n, "bogus", Value::Int(1)),
            Err(BindError::UnknownKey { .. })
        ));
    }
}

#[test]
fn image_adapter_exposes_node_fields() {
    let registry = Registry::standard();
    let mut s = Session::new();
    let img = one(registry.call(&mut s, "node", "new", &["image".into()]).unwrap());
    let adapter = one(registry.call(&mut s, "frontend", "image", &[img.clone()]).unwrap());

    s.new_index(&adapter, "width", "4cm".into()).unwrap();
    s.new_index(&adapter, "height", Value::Int(30)).unwrap();
    assert_eq!(s.index(&img, "height").unwrap(), Some(pt(30)));
    assert_eq!(
        s.index(&adapter, "width").unwrap(),
        s.index(&img, "width").unwrap()
    );

    // Chain operations see through the adapter.
    let k = one(registry.call(&mut s, "node", "new", &["kern".into()]).unwrap());
    let head = one(
        registry
            .call(&mut s, "node", "insert_after", &[adapter.clone(), adapter, k.clone()])
            .unwrap(),
    );
    assert_eq!(head, img);
    assert_eq!(s.index(&img, "next").unwrap(), Some(k));

    let empty = Value::Handle(Handle::new(ImageNode(None)));
    assert_eq!(s.index(&empty, "width").unwrap(), None);
}

struct Monospace;

impl ShapingService for Monospace {
    fn shape(
        &self,
        font: &FontMetrics,
        text: &str,
        features: &[Feature],
    ) -> Result<Vec<Atom>, String> {
        if features.iter().any(|f| f.tag == "fail") {
            return Err("feature not supported".to_string());
        }
        Ok(text
            .chars()
            .map(|c| Atom {
                advance: if c == ' ' { font.space } else { font.size * 0.5 },
                height: font.size * 0.7,
                codepoint: c as i64,
                components: c.to_string(),
                is_space: c == ' ',
                ..Atom::default()
            })
            .collect())
    }
}

#[test]
fn shaping_through_a_font_handle() {
    let mut s = Session::builder().shaper(Monospace).build();
    let font = Value::Handle(Handle::new(Font::new(FontMetrics {
        name: "mono".into(),
        size: ScaledPoint::pt(10),
        space: ScaledPoint::pt(3),
        ..FontMetrics::default()
    })));
    assert_eq!(s.index(&font, "size").unwrap(), Some(pt(10)));

    let atoms = one(s.call_method(&font, "shape", &["a b".into()]).unwrap());
    let Value::List(atoms) = atoms else {
        panic!("expected a list of atoms");
    };
    assert_eq!(atoms.len(), 3);
    assert_eq!(s.index(&atoms[0], "advance").unwrap(), Some(pt(5)));
    assert_eq!(s.index(&atoms[1], "is_space").unwrap(), Some(Value::Bool(true)));
    assert_eq!(s.tostring(&atoms[2]), "b");

    let err = s
        .call_method(&font, "shape", &["a".into(), "fail".into()])
        .unwrap_err();
    assert!(matches!(err, BindError::ExternalService { service: "shaping", .. }));
}

#[test]
fn shaping_without_a_service() {
    let mut s = Session::new();
    let font = Value::Handle(Handle::new(Font::new(FontMetrics::default())));
    assert!(matches!(
        s.call_method(&font, "shape", &["a".into()]),
        Err(BindError::ExternalService { .. })
    ));
}

#[test]
fn splicing_a_node_twice_is_rejected() {
    let registry = Registry::standard();
    let mut s = Session::new();
    let a = one(registry.call(&mut s, "node", "new", &["kern".into()]).unwrap());
    let b = one(registry.call(&mut s, "node", "new", &["kern".into()]).unwrap());
    let head = one(
        registry
            .call(&mut s, "node", "insert_after", &[a.clone(), a.clone(), b.clone()])
            .unwrap(),
    );
    let err = registry
        .call(&mut s, "node", "insert_after", &[head.clone(), b.clone(), a.clone()])
        .unwrap_err();
    assert!(matches!(err, BindError::ChainIntegrity { .. }));
    // Nothing changed.
    assert_eq!(s.index(&a, "next").unwrap(), Some(b.clone()));
    assert_eq!(s.index(&b, "next").unwrap(), Some(Value::Nil));

    let hbox = one(registry.call(&mut s, "node", "hpack", &[head.clone()]).unwrap());
    assert!(matches!(
        s.new_index(&a, "list", hbox.clone()),
        Err(BindError::UnknownKey { .. })
    ));
    assert!(matches!(
        s.new_index(&hbox, "list", hbox.clone()),
        Err(BindError::ChainIntegrity { .. })
    ));
}

#[test]
fn nested_lists_can_not_loop() {
    let registry = Registry::standard();
    let mut s = Session::new();
    let d1 = one(registry.call(&mut s, "node", "new", &["disc".into()]).unwrap());
    let d2 = one(registry.call(&mut s, "node", "new", &["disc".into()]).unwrap());
    s.new_index(&d1, "replace", d2.clone()).unwrap();
    assert!(matches!(
        s.new_index(&d2, "replace", d1.clone()),
        Err(BindError::ChainIntegrity { .. })
    ));
    assert!(matches!(
        s.new_index(&d2, "post", d2.clone()),
        Err(BindError::ChainIntegrity { .. })
    ));
    assert_eq!(s.index(&d2, "replace").unwrap(), Some(Value::Nil));

    let k = one(registry.call(&mut s, "node", "new", &["kern".into()]).unwrap());
    s.new_index(&k, "kern", "2pt".into()).unwrap();
    let hbox = one(registry.call(&mut s, "node", "hpack", &[k.clone()]).unwrap());
    let err = registry
        .call(&mut s, "node", "insert_after", &[k.clone(), k.clone(), hbox.clone()])
        .unwrap_err();
    assert!(matches!(err, BindError::ChainIntegrity { .. }));
    assert!(matches!(
        s.new_index(&k, "next", hbox.clone()),
        Err(BindError::ChainIntegrity { .. })
    ));

    // The box is still walkable.
    let dims = registry.call(&mut s, "node", "dimensions", &[hbox.clone()]).unwrap();
    assert_eq!(dims[0], pt(2));
    let rendered = one(registry.call(&mut s, "node", "string", &[hbox]).unwrap());
    assert!(matches!(rendered, Value::Str(ref text) if text.contains("kern")));
}

#[test]
fn deleting_a_box_keeps_its_contents() {
    let registry = Registry::standard();
    let mut s = Session::new();
    let g1 = one(registry.call(&mut s, "node", "new", &["glyph".into()]).unwrap());
    let g2 = one(registry.call(&mut s, "node", "new", &["glyph".into()]).unwrap());
    let inner = one(
        registry
            .call(&mut s, "node", "insert_after", &[g1.clone(), g1.clone(), g2.clone()])
            .unwrap(),
    );
    for kind in ["hpack", "vpack"] {
        let boxed = one(registry.call(&mut s, "node", kind, &[inner.clone()]).unwrap());
        let before = one(registry.call(&mut s, "node", "new", &["kern".into()]).unwrap());
        let head = one(
            registry
                .call(&mut s, "node", "insert_after", &[before.clone(), before.clone(), boxed.clone()])
                .unwrap(),
        );
        let head = one(registry.call(&mut s, "node", "delete", &[head, boxed.clone()]).unwrap());
        assert_eq!(head, before);
        assert_eq!(s.index(&before, "next").unwrap(), Some(Value::Nil));
        assert_eq!(s.index(&boxed, "list").unwrap(), Some(inner.clone()), "{kind}");
        assert_eq!(s.index(&g1, "next").unwrap(), Some(g2.clone()));
        assert_eq!(s.index(&g2, "prev").unwrap(), Some(g1.clone()));

        // Free the list for the next box.
        s.new_index(&boxed, "list", Value::Nil).unwrap();
    }
}

#[test]
fn nodes_stay_in_their_session() {
    let registry = Registry::standard();
    let mut first = Session::new();
    let mut second = Session::new();
    let mut made = Vec::new();
    for _ in 0..3 {
        made.push(one(registry.call(&mut first, "node", "new", &["glue".into()]).unwrap()));
    }
    let stray = made[2].clone();

    let err = registry
        .call(&mut second, "node", "tail", &[stray.clone()])
        .unwrap_err();
    assert!(matches!(err, BindError::BadArgument { position: 1, .. }));
    assert!(err.to_string().contains("another session"));
    assert!(matches!(
        second.new_index(&stray, "width", "1pt".into()),
        Err(BindError::TypeMismatch { .. })
    ));
    assert_eq!(second.index(&stray, "width").unwrap(), None);
    assert!(second.keys(node(&stray)).is_empty());
    assert!(registry.call(&mut second, "node", "keys", &[stray]).is_err());
}

#[test]
fn dimensions_out_of_range() {
    let registry = Registry::standard();
    let mut s = Session::new();
    let err = registry
        .call(&mut s, "glu", "sp", &["200000000000000pt".into()])
        .unwrap_err();
    assert!(matches!(
        err,
        BindError::InvalidDimension(glu::DimensionError::OutOfRange { .. })
    ));
    assert!(registry.call(&mut s, "glu", "sp_from_pt", &[Value::Number(1e300)]).is_err());
    assert!(registry.call(&mut s, "frontend", "sp", &[Value::Number(f64::NAN)]).is_err());

    let big = one(registry.call(&mut s, "glu", "sp", &["100000000000000pt".into()]).unwrap());
    assert!(s.arith(glu::ArithOp::Add, &big, &big).is_err());
    assert!(s.arith(glu::ArithOp::Mul, &big, &Value::Int(-2)).is_err());
    assert_eq!(s.arith(glu::ArithOp::Sub, &big, &big).unwrap(), pt(0));
}

#[test]
fn building_a_table() {
    let registry = Registry::standard();
    let mut s = Session::new();
    let mut options = glu::Table::new();
    options.insert("max_width".into(), "12cm".into());
    options.insert("stretch".into(), Value::Bool(true));
    options.insert("leading".into(), Value::Bool(true));
    let table = one(
        registry
            .call(&mut s, "frontend", "table", &[Value::Table(options)])
            .unwrap(),
    );
    assert_eq!(s.index(&table, "stretch").unwrap(), Some(Value::Bool(true)));
    assert_eq!(s.index(&table, "leading").unwrap(), Some(pt(0)));

    let widths = Value::List(vec!["4cm".into(), "8cm".into()]);
    s.call_method(&table, "set_columns", &[widths]).unwrap();
    for label in ["left", "right"] {
        let row = one(s.call_method(&table, "add_row", &[]).unwrap());
        let cell = one(s.call_method(&row, "add_cell", &[]).unwrap());
        s.new_index(&cell, "halign", label.into()).unwrap();
        s.new_index(&cell, "padding_left", "1mm".into()).unwrap();
        let cell = one(s.call_method(&cell, "set_contents", &[label.into()]).unwrap());
        assert_eq!(s.index(&cell, "halign").unwrap(), Some(label.into()));
    }
    assert_eq!(s.tostring(&table), "Table 2 rows, 2 columns");
    assert!(matches!(
        registry.call(&mut s, "frontend", "table", &["wide".into()]),
        Err(BindError::BadArgument { .. })
    ));
}

#[test]
fn fonts_from_the_font_namespace() {
    let registry = Registry::standard();
    let mut s = Session::builder().shaper(Monospace).build();
    let font = one(
        registry
            .call(&mut s, "font", "new", &["mono".into(), Value::Int(10)])
            .unwrap(),
    );
    let atoms = one(s.call_method(&font, "shape", &["ab".into()]).unwrap());
    let Value::List(atoms) = atoms else {
        panic!("expected a list of atoms");
    };
    assert_eq!(atoms.len(), 2);
    assert_eq!(s.index(&atoms[1], "advance").unwrap(), Some(pt(5)));
}
