//! glu - scripting bindings for a boxes-and-glue layout model
//!
//! The crate lets dynamically typed guest code build and inspect the node
//! chains of a typesetting engine:
//!
//! - [`ScaledPoint`]: fixed-point lengths with a unit grammar (`"12pt"`,
//!   `"-1.5cm"`) and the guest arithmetic on them
//! - [`node`]: the node variants, their arena and the chain operations
//! - [`Session`]: attribute access by string key, type-checked against each
//!   variant's field table
//! - [`settings`]: lenient marshalling of typesetting settings
//! - [`tables`]: tables of rows and cells built through `frontend.table`
//! - [`bind`]: the `glu`, `node`, `font` and `frontend` function tables a host
//!   interpreter exposes
//!
//! ```
//! use glu::{Registry, Session, Value};
//!
//! let registry = Registry::standard();
//! let mut session = Session::new();
//! let kern = registry.call(&mut session, "node", "new", &["kern".into()]).unwrap();
//! session.new_index(&kern[0], "kern", "1cm".into()).unwrap();
//! let width = session.index(&kern[0], "kern").unwrap().unwrap();
//! let mm = session.call_method(&width, "to_mm", &[]).unwrap();
//! assert!(matches!(mm[..], [Value::Number(n)] if (n - 10.0).abs() < 1e-3));
//! ```

pub mod bind;
pub mod carriers;
pub mod color;
pub mod defaults;
pub mod errors;
pub mod font;
mod log;
pub mod node;
pub mod parse;
pub mod session;
pub mod settings;
pub mod tables;
pub mod types;
pub mod value;

pub use bind::{Args, NativeFn, Namespace, Registry};
pub use errors::{BindError, DimensionError, Result};
pub use node::{NodeArena, NodeKind, NodeRef, NodeType};
pub use parse::parse_dimension;
pub use session::{ArithOp, CompareOp, Session, SessionBuilder};
pub use types::{ScaledPoint, Unit};
pub use value::{Handle, HostObject, NodeCarrier, Table, Value};
