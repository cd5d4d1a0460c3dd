//! Typesetting settings: the lenient side of the guest boundary.
//!
//! Unlike node attributes, settings never fail. Unknown keys and values of
//! the wrong type are dropped, and the rest of the table still applies.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::bind::Args;
use crate::carriers::VListBox;
use crate::color::Color;
use crate::defaults::{FONT_WEIGHT, INDENT_LEFT_ROWS};
use crate::errors::Result;
use crate::session::Session;
use crate::types::ScaledPoint;
use crate::value::{Handle, HostObject, Table, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingKind {
    FontFamily,
    FontWeight,
    FontStyle,
    Size,
    Color,
    Leading,
    HAlign,
    VAlign,
    MarginLeft,
    MarginRight,
    MarginTop,
    MarginBottom,
    PaddingLeft,
    PaddingRight,
    PaddingTop,
    PaddingBottom,
    BackgroundColor,
    IndentLeft,
    Hyperlink,
    TextDecoration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const BOLD: FontWeight = FontWeight(700);

    /// Weight from a CSS-like name or a number such as `"600"`.
    /// Case, hyphens and underscores are ignored.
    pub fn resolve(name: &str, default: FontWeight) -> FontWeight {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        if let Ok(n) = key.parse::<u16>() {
            return FontWeight(n);
        }
        let weight = match key.as_str() {
            "thin" | "hairline" => 100,
            "extralight" | "ultralight" => 200,
            "light" => 300,
            "normal" | "regular" | "book" => 400,
            "medium" => 500,
            "semibold" | "demibold" => 600,
            "bold" => 700,
            "extrabold" | "ultrabold" => 800,
            "black" | "heavy" => 900,
            _ => return default,
        };
        FontWeight(weight)
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        FontWeight(FONT_WEIGHT)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub fn resolve(name: &str) -> FontStyle {
        match name.to_ascii_lowercase().as_str() {
            "italic" => FontStyle::Italic,
            "oblique" => FontStyle::Oblique,
            _ => FontStyle::Normal,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HAlign {
    #[default]
    Default,
    Left,
    Right,
    Center,
    Justified,
}

impl HAlign {
    pub fn resolve(name: &str) -> HAlign {
        match name.to_ascii_lowercase().as_str() {
            "left" => HAlign::Left,
            "right" => HAlign::Right,
            "center" => HAlign::Center,
            "justified" | "justify" => HAlign::Justified,
            _ => HAlign::Default,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HAlign::Default => "default",
            HAlign::Left => "left",
            HAlign::Right => "right",
            HAlign::Center => "center",
            HAlign::Justified => "justified",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VAlign {
    #[default]
    Default,
    Top,
    Middle,
    Bottom,
}

impl VAlign {
    pub fn resolve(name: &str) -> VAlign {
        match name.to_ascii_lowercase().as_str() {
            "top" => VAlign::Top,
            "middle" | "center" => VAlign::Middle,
            "bottom" => VAlign::Bottom,
            _ => VAlign::Default,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VAlign::Default => "default",
            VAlign::Top => "top",
            VAlign::Middle => "middle",
            VAlign::Bottom => "bottom",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextDecoration {
    Underline,
    LineThrough,
}

/// A color given by name (resolved later by the frontend) or by value.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorSetting {
    Named(String),
    Value(Color),
}

#[derive(Clone, Debug, PartialEq)]
pub enum SettingValue {
    FontFamily(Handle),
    FontWeight(FontWeight),
    FontStyle(FontStyle),
    Dimension(ScaledPoint),
    Color(ColorSetting),
    HAlign(HAlign),
    VAlign(VAlign),
    Str(String),
    Decoration(TextDecoration),
}

pub type Settings = BTreeMap<SettingKind, SettingValue>;

/// Interpret one setting. `None` means the pair is ignored.
pub fn resolve(key: &str, value: &Value) -> Option<(SettingKind, SettingValue)> {
    let normalized: String = key.chars().filter(|c| *c != '_').collect::<String>().to_ascii_lowercase();
    let dimension = |kind| {
        value
            .to_dimension()
            .ok()
            .map(|sp| (kind, SettingValue::Dimension(sp)))
    };
    let resolved = match normalized.as_str() {
        "fontfamily" => font_family(value).map(|h| (SettingKind::FontFamily, SettingValue::FontFamily(h))),
        "fontweight" => match value {
            Value::Str(s) => Some(FontWeight::resolve(s, FontWeight::default())),
            _ => value.as_int().and_then(|n| u16::try_from(n).ok()).map(FontWeight),
        }
        .map(|w| (SettingKind::FontWeight, SettingValue::FontWeight(w))),
        "fontstyle" => value
            .as_str()
            .map(|s| (SettingKind::FontStyle, SettingValue::FontStyle(FontStyle::resolve(s)))),
        "size" | "fontsize" => dimension(SettingKind::Size),
        "color" => color(value).map(|c| (SettingKind::Color, SettingValue::Color(c))),
        "backgroundcolor" => {
            color(value).map(|c| (SettingKind::BackgroundColor, SettingValue::Color(c)))
        }
        "leading" => dimension(SettingKind::Leading),
        "halign" | "align" => value
            .as_str()
            .map(|s| (SettingKind::HAlign, SettingValue::HAlign(HAlign::resolve(s)))),
        "valign" => value
            .as_str()
            .map(|s| (SettingKind::VAlign, SettingValue::VAlign(VAlign::resolve(s)))),
        "marginleft" => dimension(SettingKind::MarginLeft),
        "marginright" => dimension(SettingKind::MarginRight),
        "margintop" => dimension(SettingKind::MarginTop),
        "marginbottom" => dimension(SettingKind::MarginBottom),
        "paddingleft" => dimension(SettingKind::PaddingLeft),
        "paddingright" => dimension(SettingKind::PaddingRight),
        "paddingtop" => dimension(SettingKind::PaddingTop),
        "paddingbottom" => dimension(SettingKind::PaddingBottom),
        "indentleft" => dimension(SettingKind::IndentLeft),
        "hyperlink" => value
            .as_str()
            .map(|s| (SettingKind::Hyperlink, SettingValue::Str(s.to_string()))),
        "underline" => value.truthy().then_some((
            SettingKind::TextDecoration,
            SettingValue::Decoration(TextDecoration::Underline),
        )),
        "linethrough" => value.truthy().then_some((
            SettingKind::TextDecoration,
            SettingValue::Decoration(TextDecoration::LineThrough),
        )),
        _ => None,
    };
    if resolved.is_none() {
        crate::log::warn!(key, value = value.type_name(), "ignoring setting");
    }
    resolved
}

fn font_family(value: &Value) -> Option<Handle> {
    value
        .as_handle()
        .filter(|h| h.downcast_ref::<FontFamily>().is_some())
        .cloned()
}

fn color(value: &Value) -> Option<ColorSetting> {
    match value {
        Value::Str(s) => Some(ColorSetting::Named(s.clone())),
        Value::Handle(h) => h.downcast_ref::<Color>().map(|c| ColorSetting::Value(*c)),
        _ => None,
    }
}

/// Resolve every string key of `table` into `settings`.
pub fn apply_table(settings: &mut Settings, table: &Table) {
    for (key, value) in table {
        if let Some((kind, value)) = resolve(key, value) {
            settings.insert(kind, value);
        }
    }
}

// ----------------------------------------------------------------------------
// Host objects
// ----------------------------------------------------------------------------

/// A named font family known to the frontend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontFamily {
    pub name: String,
}

impl HostObject for FontFamily {
    fn type_tag(&self) -> &'static str {
        "FontFamily"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn index(&self, key: &str) -> Option<Value> {
        (key == "name").then(|| Value::from(self.name.as_str()))
    }

    fn display(&self) -> String {
        format!("FontFamily {}", self.name)
    }
}

/// A hyphenation language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Language {
    pub name: String,
}

impl HostObject for Language {
    fn type_tag(&self) -> &'static str {
        "Language"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn index(&self, key: &str) -> Option<Value> {
        (key == "name").then(|| Value::from(self.name.as_str()))
    }

    fn display(&self) -> String {
        format!("Language {}", self.name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TextItem {
    Str(String),
    Text(Handle),
    VList(Handle),
}

/// Content item from a guest value: strings and numbers become text, texts
/// and vertical boxes are kept as handles.
pub fn text_item(value: &Value) -> Option<TextItem> {
    match value {
        Value::Str(s) => Some(TextItem::Str(s.clone())),
        Value::Int(_) | Value::Number(_) => Some(TextItem::Str(value.to_text())),
        Value::Handle(h) if h.downcast_ref::<Text>().is_some() => Some(TextItem::Text(h.clone())),
        Value::Handle(h) if h.downcast_ref::<VListBox>().is_some() => Some(TextItem::VList(h.clone())),
        _ => {
            crate::log::debug!(item = value.type_name(), "skipping text item");
            None
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextContent {
    pub items: Vec<TextItem>,
    pub settings: Settings,
}

/// Formatted text under construction: items plus settings.
#[derive(Debug, Default)]
pub struct Text {
    content: RefCell<TextContent>,
}

impl Text {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the items and settings.
    pub fn content(&self) -> TextContent {
        self.content.borrow().clone()
    }

    /// Append strings, numbers (as text), nested texts and vertical boxes.
    /// Other values are skipped, and so is any text that already contains
    /// this one.
    pub fn append(&self, items: &[Value]) {
        let items: Vec<TextItem> = items
            .iter()
            .filter(|v| !self.nested_in(v))
            .filter_map(text_item)
            .collect();
        self.content.borrow_mut().items.extend(items);
    }

    /// Whether `value` is a text that is or contains this one.
    fn nested_in(&self, value: &Value) -> bool {
        let nested = value
            .as_handle()
            .and_then(|h| h.downcast_ref::<Text>())
            .is_some_and(|t| t.contains(self));
        if nested {
            crate::log::warn!("a text can not contain itself");
        }
        nested
    }

    fn contains(&self, other: &Text) -> bool {
        std::ptr::eq(self, other)
            || self.content.borrow().items.iter().any(|item| match item {
                TextItem::Text(h) => h.downcast_ref::<Text>().is_some_and(|t| t.contains(other)),
                _ => false,
            })
    }

    /// Apply one setting; returns whether it was recognized.
    pub fn set(&self, key: &str, value: &Value) -> bool {
        match resolve(key, value) {
            Some((kind, value)) => {
                self.content.borrow_mut().settings.insert(kind, value);
                true
            }
            None => false,
        }
    }

    pub fn apply(&self, table: &Table) {
        apply_table(&mut self.content.borrow_mut().settings, table);
    }

    pub fn setting(&self, kind: SettingKind) -> Option<SettingValue> {
        self.content.borrow().settings.get(&kind).cloned()
    }

    /// Concatenated string items, nested texts included.
    pub fn plain_text(&self) -> String {
        let content = self.content.borrow();
        let mut out = String::new();
        for item in &content.items {
            match item {
                TextItem::Str(s) => out.push_str(s),
                TextItem::Text(h) => {
                    if let Some(t) = h.downcast_ref::<Text>() {
                        out.push_str(&t.plain_text());
                    }
                }
                TextItem::VList(_) => {}
            }
        }
        out
    }

    fn call(&self, this: &Handle, name: &str, args: &Args<'_>) -> Option<Result<Vec<Value>>> {
        let result = match name {
            "append" => {
                self.append(args.values());
                Ok(())
            }
            "set" => args.check_str(1).map(|key| {
                self.set(key, args.get(2).unwrap_or(&Value::Nil));
            }),
            "settings" => args.check_table(1).map(|table| self.apply(table)),
            _ => return None,
        };
        Some(result.map(|()| vec![Value::Handle(this.clone())]))
    }
}

impl HostObject for Text {
    fn type_tag(&self) -> &'static str {
        "Text"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn call_method(
        &self,
        _session: &mut Session,
        this: &Handle,
        name: &str,
        args: &[Value],
    ) -> Option<Result<Vec<Value>>> {
        let function = format!("text:{name}");
        self.call(this, name, &Args::new(&function, args))
    }

    fn display(&self) -> String {
        format!("Text {:?}", self.plain_text())
    }
}

// ----------------------------------------------------------------------------
// Typesetting options
// ----------------------------------------------------------------------------

/// Options for formatting a paragraph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypesettingOptions {
    pub leading: Option<ScaledPoint>,
    pub font_size: Option<ScaledPoint>,
    pub font_family: Option<Handle>,
    pub language: Option<Handle>,
    pub halign: Option<HAlign>,
    /// Indentation and the number of rows it applies to.
    pub indent_left: Option<(ScaledPoint, i64)>,
}

impl TypesettingOptions {
    /// Read the options from a table. Absent or ill-typed entries stay
    /// unset.
    pub fn from_table(table: &Table) -> TypesettingOptions {
        let dimension = |key: &str| table.get(key).and_then(|v| v.to_dimension().ok());
        let handle_of = |keys: &[&str], tag: &str| {
            keys.iter()
                .filter_map(|k| table.get(*k))
                .filter_map(Value::as_handle)
                .find(|h| h.type_tag() == tag)
                .cloned()
        };
        let indent_left = dimension("indent_left").map(|sp| {
            let rows = table
                .get("indent_left_rows")
                .and_then(Value::as_int)
                .unwrap_or(INDENT_LEFT_ROWS);
            (sp, rows)
        });
        TypesettingOptions {
            leading: dimension("leading"),
            font_size: dimension("font_size").or_else(|| dimension("fontsize")),
            font_family: handle_of(&["font_family", "fontfamily"], "FontFamily"),
            language: handle_of(&["language"], "Language"),
            halign: table.get("halign").and_then(Value::as_str).map(HAlign::resolve),
            indent_left,
        }
    }
}

impl HostObject for TypesettingOptions {
    fn type_tag(&self) -> &'static str {
        "TypesettingOptions"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn index(&self, key: &str) -> Option<Value> {
        match key {
            "leading" => self.leading.map(Value::from),
            "font_size" => self.font_size.map(Value::from),
            "font_family" => self.font_family.clone().map(Value::from),
            "language" => self.language.clone().map(Value::from),
            "halign" => self.halign.map(|h| Value::from(h.name())),
            "indent_left" => self.indent_left.map(|(sp, _)| Value::from(sp)),
            "indent_left_rows" => self.indent_left.map(|(_, rows)| Value::from(rows)),
            _ => None,
        }
    }
}
