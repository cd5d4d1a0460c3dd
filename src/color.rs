//! Colors handed between guest code and the frontend.

use std::any::Any;
use std::fmt;

use crate::defaults::{BYTE_COLOR_SCALE_MAX, UNIT_COLOR_SCALE_MAX};
use crate::value::{HostObject, Value};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Color {
    /// Components and alpha in 0..=1.
    Rgb { r: f64, g: f64, b: f64, a: f64 },
    /// Components and alpha in 0..=1.
    Cmyk {
        c: f64,
        m: f64,
        y: f64,
        k: f64,
        a: f64,
    },
}

impl Color {
    /// RGB color from components on either the 0-1 or the 0-255 scale.
    ///
    /// The 0-1 scale is assumed when no component exceeds 1. Alpha is
    /// always on the 0-1 scale.
    pub fn rgb(r: f64, g: f64, b: f64, a: f64) -> Color {
        let unit_scale = [r, g, b].iter().all(|c| *c <= UNIT_COLOR_SCALE_MAX);
        let scale = if unit_scale { 1.0 } else { BYTE_COLOR_SCALE_MAX };
        Color::Rgb {
            r: r / scale,
            g: g / scale,
            b: b / scale,
            a,
        }
    }

    pub fn cmyk(c: f64, m: f64, y: f64, k: f64) -> Color {
        Color::Cmyk { c, m, y, k, a: 1.0 }
    }

    pub fn alpha(&self) -> f64 {
        match self {
            Color::Rgb { a, .. } | Color::Cmyk { a, .. } => *a,
        }
    }

    /// Component by guest key; `None` for keys of the other color space.
    pub fn component(&self, key: &str) -> Option<f64> {
        match (self, key) {
            (_, "a" | "alpha") => Some(self.alpha()),
            (Color::Rgb { r, .. }, "r" | "red") => Some(*r),
            (Color::Rgb { g, .. }, "g" | "green") => Some(*g),
            (Color::Rgb { b, .. }, "b" | "blue") => Some(*b),
            (Color::Cmyk { c, .. }, "c" | "cyan") => Some(*c),
            (Color::Cmyk { m, .. }, "m" | "magenta") => Some(*m),
            (Color::Cmyk { y, .. }, "y" | "yellow") => Some(*y),
            (Color::Cmyk { k, .. }, "k" | "black") => Some(*k),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Rgb { r, g, b, a } => write!(f, "rgb({r} {g} {b} / {a})"),
            Color::Cmyk { c, m, y, k, a } => write!(f, "cmyk({c} {m} {y} {k} / {a})"),
        }
    }
}

impl HostObject for Color {
    fn type_tag(&self) -> &'static str {
        "Color"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn index(&self, key: &str) -> Option<Value> {
        self.component(key).map(Value::Number)
    }

    fn display(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_scale_detected() {
        let c = Color::rgb(1.0, 0.5, 0.0, 1.0);
        assert_eq!(c.component("red"), Some(1.0));
        assert_eq!(c.component("g"), Some(0.5));
    }

    #[test]
    fn byte_scale_detected() {
        let c = Color::rgb(255.0, 0.0, 51.0, 0.5);
        assert_eq!(c.component("r"), Some(1.0));
        assert_eq!(c.component("b"), Some(0.2));
        assert_eq!(c.component("alpha"), Some(0.5));
    }

    #[test]
    fn keys_follow_color_space() {
        let rgb = Color::rgb(0.0, 0.0, 0.0, 1.0);
        assert_eq!(rgb.component("cyan"), None);
        let cmyk = Color::cmyk(0.1, 0.2, 0.3, 0.4);
        assert_eq!(cmyk.component("k"), Some(0.4));
        assert_eq!(cmyk.component("r"), None);
        assert_eq!(cmyk.index("magenta"), Some(Value::Number(0.2)));
    }
}
