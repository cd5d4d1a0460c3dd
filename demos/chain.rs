//! Build a short chain through the guest functions and pack it to a width.
//!
//! cargo run --example chain --features tracing -- 120pt

use glu::{Registry, Session, Value};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let width = std::env::args().nth(1).unwrap_or_else(|| "100pt".to_string());
    if let Err(e) = run(&width) {
        eprintln!("{:?}", miette::Report::new(e));
        std::process::exit(1);
    }
}

fn run(width: &str) -> glu::Result<()> {
    let registry = Registry::standard();
    let mut s = Session::new();
    let mut head = Value::Nil;

    for (i, word) in ["boxes", "and", "glue"].iter().enumerate() {
        if i > 0 {
            let glue = first(registry.call(&mut s, "node", "new", &["glue".into()])?);
            s.new_index(&glue, "width", "3.33pt".into())?;
            s.new_index(&glue, "stretch", "1.66pt".into())?;
            s.new_index(&glue, "shrink", "1.11pt".into())?;
            head = append(&registry, &mut s, head, glue)?;
        }
        for c in word.chars() {
            let glyph = first(registry.call(&mut s, "node", "new", &["glyph".into()])?);
            s.new_index(&glyph, "codepoint", Value::Int(c as i64))?;
            s.new_index(&glyph, "components", c.to_string().into())?;
            s.new_index(&glyph, "width", "5pt".into())?;
            s.new_index(&glyph, "height", "7pt".into())?;
            head = append(&registry, &mut s, head, glyph)?;
        }
    }

    let hbox = first(registry.call(&mut s, "node", "hpack_to", &[head, width.into()])?);
    let rendered = first(registry.call(&mut s, "node", "string", &[hbox])?);
    println!("{}", s.tostring(&rendered));
    Ok(())
}

fn append(registry: &Registry, s: &mut Session, head: Value, new: Value) -> glu::Result<Value> {
    let tail = first(registry.call(s, "node", "tail", &[head.clone()])?);
    Ok(first(registry.call(s, "node", "insert_after", &[head, tail, new])?))
}

fn first(values: Vec<Value>) -> Value {
    values.into_iter().next().unwrap_or_default()
}
