//! Default values and limits

/// Badness of a box whose glue can not reach the target size.
pub const INF_BAD: i64 = 10_000;
/// Badness reported for boxes that stay wider than their target.
pub const OVERFULL_BADNESS: i64 = 1_000_000;

/// Weight used when a font weight name is not recognized.
pub const FONT_WEIGHT: u16 = 400;
/// Rows affected by `indent_left` unless `indent_left_rows` says otherwise.
pub const INDENT_LEFT_ROWS: i64 = 1;

/// Components at or below this value select the 0-1 color scale.
pub const UNIT_COLOR_SCALE_MAX: f64 = 1.0;
pub const BYTE_COLOR_SCALE_MAX: f64 = 255.0;

/// OpenType features requested when a shape call names none.
pub const SHAPING_FEATURES: &[&str] = &["kern", "liga"];

/// `tracing` target for messages logged from guest code.
pub const GUEST_LOG_TARGET: &str = "glu::guest";

/// Interword space of a font, as a fraction of its size, when the host gives
/// none. Stretch and shrink default to a half and a third of the space.
pub const SPACE_DIVISOR: i64 = 3;
pub const SPACE_STRETCH_DIVISOR: i64 = 2;
pub const SPACE_SHRINK_DIVISOR: i64 = 3;
