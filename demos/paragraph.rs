//! Shape a sentence with a toy shaper, collect it in a text and read the
//! typesetting options.
//!
//! RUST_LOG=glu::guest=info cargo run --example paragraph --features tracing

use glu::font::{Atom, Feature, Font, FontMetrics, ShapingService};
use glu::{Handle, Registry, ScaledPoint, Session, Table, Value};

/// Every glyph is half an em wide.
struct HalfEm;

impl ShapingService for HalfEm {
    fn shape(
        &self,
        font: &FontMetrics,
        text: &str,
        _features: &[Feature],
    ) -> Result<Vec<Atom>, String> {
        Ok(text
            .chars()
            .map(|c| Atom {
                advance: if c == ' ' { font.space } else { font.size * 0.5 },
                height: font.size * 0.7,
                depth: font.size * 0.2,
                codepoint: c as i64,
                components: c.to_string(),
                is_space: c == ' ',
                ..Atom::default()
            })
            .collect())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("{:?}", miette::Report::new(e));
        std::process::exit(1);
    }
}

fn run() -> glu::Result<()> {
    let registry = Registry::standard();
    let mut s = Session::builder().shaper(HalfEm).build();
    let font = Value::Handle(Handle::new(Font::new(FontMetrics {
        name: "toy".into(),
        size: ScaledPoint::pt(10),
        space: ScaledPoint::pt(3),
        space_stretch: ScaledPoint::pt(2),
        space_shrink: ScaledPoint::pt(1),
    })));

    let sentence = "glue between boxes";
    let atoms = match first(s.call_method(&font, "shape", &[sentence.into()])?) {
        Value::List(atoms) => atoms,
        _ => Vec::new(),
    };

    let mut head = Value::Nil;
    for atom in &atoms {
        let is_space = s.index(atom, "is_space")?.is_some_and(|v| v.truthy());
        let n = if is_space {
            let glue = first(registry.call(&mut s, "node", "new", &["glue".into()])?);
            for key in ["space", "space_stretch", "space_shrink"] {
                let amount = s.index(&font, key)?.unwrap_or_default();
                let field = match key {
                    "space" => "width",
                    "space_stretch" => "stretch",
                    _ => "shrink",
                };
                s.new_index(&glue, field, amount)?;
            }
            glue
        } else {
            let glyph = first(registry.call(&mut s, "node", "new", &["glyph".into()])?);
            for (from, to) in [("advance", "width"), ("height", "height"), ("depth", "depth")] {
                let v = s.index(atom, from)?.unwrap_or_default();
                s.new_index(&glyph, to, v)?;
            }
            let cp = s.index(atom, "codepoint")?.unwrap_or_default();
            s.new_index(&glyph, "codepoint", cp)?;
            glyph
        };
        let tail = first(registry.call(&mut s, "node", "tail", &[head.clone()])?);
        head = first(registry.call(&mut s, "node", "insert_after", &[head, tail, n])?);
    }

    let dims = registry.call(&mut s, "node", "dimensions", &[head.clone()])?;
    registry.call(
        &mut s,
        "glu",
        "info",
        &[
            "shaped".into(),
            "width".into(),
            dims[0].clone(),
            "height".into(),
            dims[1].clone(),
        ],
    )?;

    let text = first(registry.call(&mut s, "frontend", "text", &[])?);
    s.call_method(&text, "append", &[sentence.into()])?;
    let mut settings = Table::new();
    settings.insert("font_weight".into(), "semibold".into());
    settings.insert("halign".into(), "justify".into());
    settings.insert("no_such_setting".into(), Value::Int(1));
    s.call_method(&text, "settings", &[settings.into()])?;

    let mut options = Table::new();
    options.insert("leading".into(), "12pt".into());
    options.insert("indent_left".into(), "1cm".into());
    let opts = first(registry.call(&mut s, "frontend", "options", &[options.into()])?);
    println!("text:    {}", s.tostring(&text));
    println!("leading: {}", s.tostring(&s.index(&opts, "leading")?.unwrap_or_default()));
    println!("indent:  {}", s.tostring(&s.index(&opts, "indent_left")?.unwrap_or_default()));

    let hbox = first(registry.call(&mut s, "node", "hpack_to", &[head, "100pt".into()])?);
    let rendered = first(registry.call(&mut s, "node", "string", &[hbox])?);
    println!("{}", s.tostring(&rendered));
    Ok(())
}

fn first(values: Vec<Value>) -> Value {
    values.into_iter().next().unwrap_or_default()
}
