//! Fonts, shaped atoms and the shaping service seam.
//!
//! Shaping itself is external: a [`ShapingService`] turns text into
//! [`Atom`]s for a given [`FontMetrics`].

use std::any::Any;
use std::fmt;

use crate::bind::Args;
use crate::defaults::SHAPING_FEATURES;
use crate::errors::{BindError, Result};
use crate::session::Session;
use crate::types::ScaledPoint;
use crate::value::{Handle, HostObject, Value};

/// OpenType feature request such as `+kern`, `-liga` or `ss01=2`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feature {
    pub tag: String,
    pub value: u32,
}

impl Feature {
    /// Parse a feature string; `None` if it is malformed.
    pub fn parse(s: &str) -> Option<Feature> {
        let s = s.trim();
        let (tag, value) = match s.split_once('=') {
            Some((tag, value)) => (tag, value.trim().parse().ok()?),
            None => match s.strip_prefix('-') {
                Some(tag) => (tag, 0),
                None => (s.strip_prefix('+').unwrap_or(s), 1),
            },
        };
        let tag = tag.trim();
        let valid = (1..=4).contains(&tag.len()) && tag.chars().all(|c| c.is_ascii_alphanumeric());
        valid.then(|| Feature {
            tag: tag.to_string(),
            value,
        })
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.tag, self.value)
    }
}

/// Size and inter-word spacing of a font instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FontMetrics {
    pub name: String,
    pub size: ScaledPoint,
    pub space: ScaledPoint,
    pub space_stretch: ScaledPoint,
    pub space_shrink: ScaledPoint,
}

/// One shaped unit: a glyph or a space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Atom {
    pub advance: ScaledPoint,
    pub height: ScaledPoint,
    pub depth: ScaledPoint,
    pub codepoint: i64,
    pub components: String,
    pub is_space: bool,
    pub hyphenate: bool,
    pub kern_after: ScaledPoint,
}

/// Text shaping backend.
pub trait ShapingService {
    /// Shape `text`; errors are reported to the guest as opaque messages.
    fn shape(
        &self,
        font: &FontMetrics,
        text: &str,
        features: &[Feature],
    ) -> std::result::Result<Vec<Atom>, String>;
}

/// A font handed to the guest by the host.
#[derive(Clone, Debug)]
pub struct Font {
    pub metrics: FontMetrics,
}

impl Font {
    pub fn new(metrics: FontMetrics) -> Self {
        Font { metrics }
    }

    /// `font:shape(text, features...)`: a list of atoms.
    fn shape(&self, session: &Session, args: &Args<'_>) -> Result<Vec<Value>> {
        let text = args.check_str(1)?;
        let mut features: Vec<Feature> = args
            .rest(2)
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|s| {
                let feature = Feature::parse(s);
                if feature.is_none() {
                    crate::log::debug!(feature = s, "ignoring malformed feature");
                }
                feature
            })
            .collect();
        if features.is_empty() {
            features = SHAPING_FEATURES.iter().filter_map(|s| Feature::parse(s)).collect();
        }

        let atoms = session
            .shaper()?
            .shape(&self.metrics, text, &features)
            .map_err(|message| BindError::external("shaping", message))?;
        crate::log::debug!(font = %self.metrics.name, atoms = atoms.len(), "shaped text");
        Ok(vec![Value::List(
            atoms.into_iter().map(|a| Value::Handle(Handle::new(a))).collect(),
        )])
    }
}

impl HostObject for Font {
    fn type_tag(&self) -> &'static str {
        "font.Font"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn index(&self, key: &str) -> Option<Value> {
        let m = &self.metrics;
        match key {
            "size" => Some(m.size.into()),
            "space" => Some(m.space.into()),
            "space_stretch" => Some(m.space_stretch.into()),
            "space_shrink" => Some(m.space_shrink.into()),
            "name" => Some(m.name.as_str().into()),
            _ => None,
        }
    }

    fn call_method(
        &self,
        session: &mut Session,
        _this: &Handle,
        name: &str,
        args: &[Value],
    ) -> Option<Result<Vec<Value>>> {
        match name {
            "shape" => Some(self.shape(session, &Args::new("font:shape", args))),
            _ => None,
        }
    }

    fn display(&self) -> String {
        format!("font.Font {} {}", self.metrics.name, self.metrics.size)
    }
}

impl HostObject for Atom {
    fn type_tag(&self) -> &'static str {
        "font.Atom"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn index(&self, key: &str) -> Option<Value> {
        match key {
            "advance" => Some(self.advance.into()),
            "height" => Some(self.height.into()),
            "depth" => Some(self.depth.into()),
            "codepoint" => Some(self.codepoint.into()),
            "components" => Some(self.components.as_str().into()),
            "is_space" => Some(self.is_space.into()),
            "hyphenate" => Some(self.hyphenate.into()),
            "kern_after" => Some(self.kern_after.into()),
            _ => None,
        }
    }

    fn display(&self) -> String {
        self.components.clone()
    }
}
