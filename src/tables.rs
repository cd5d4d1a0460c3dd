//! Tables assembled by guest code: a table holds rows, a row holds cells.
//!
//! `frontend.table{...}` reads its options leniently like the other
//! frontend constructors. Attribute writes on the objects themselves are
//! checked, the same as node attributes.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::bind::Args;
use crate::errors::{BindError, Result};
use crate::session::Session;
use crate::settings::{ColorSetting, FontFamily, HAlign, TextItem, VAlign, text_item};
use crate::types::ScaledPoint;
use crate::value::{Handle, HostObject, Table, Value};

const TABLE_KEYS: &[&str] = &["max_width", "stretch", "font_size", "leading", "font_family"];

const CELL_DIMENSIONS: &[&str] = &[
    "padding_left",
    "padding_right",
    "padding_top",
    "padding_bottom",
    "border_left_width",
    "border_right_width",
    "border_top_width",
    "border_bottom_width",
];

const CELL_KEYS: &[&str] = &[
    "halign",
    "valign",
    "colspan",
    "rowspan",
    "background_color",
    "padding_left",
    "padding_right",
    "padding_top",
    "padding_bottom",
    "border_left_width",
    "border_right_width",
    "border_top_width",
    "border_bottom_width",
];

fn dimension(value: &Value, context: &str) -> Result<ScaledPoint> {
    value.to_dimension().map_err(|e| match e {
        BindError::TypeMismatch { expected, got, .. } => {
            BindError::type_mismatch(context, expected, got)
        }
        other => other,
    })
}

// ----------------------------------------------------------------------------
// Table
// ----------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableState {
    pub max_width: ScaledPoint,
    pub stretch: bool,
    pub font_size: ScaledPoint,
    pub leading: ScaledPoint,
    pub font_family: Option<Handle>,
    /// Column widths from `set_columns`.
    pub columns: Vec<ScaledPoint>,
    pub rows: Vec<Handle>,
}

#[derive(Debug, Default)]
pub struct TableSpec {
    state: RefCell<TableState>,
}

impl TableSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table from an options table. Ill-typed entries are skipped.
    pub fn from_options(options: &Table) -> Self {
        let dimension = |key: &str| options.get(key).and_then(|v| v.to_dimension().ok());
        let state = TableState {
            max_width: dimension("max_width").unwrap_or_default(),
            stretch: matches!(options.get("stretch"), Some(Value::Bool(true))),
            font_size: dimension("font_size").unwrap_or_default(),
            leading: dimension("leading").unwrap_or_default(),
            font_family: options
                .get("font_family")
                .and_then(Value::as_handle)
                .filter(|h| h.downcast_ref::<FontFamily>().is_some())
                .cloned(),
            ..TableState::default()
        };
        TableSpec {
            state: RefCell::new(state),
        }
    }

    pub fn state(&self) -> TableState {
        self.state.borrow().clone()
    }

    pub fn add_row(&self) -> Handle {
        let row = Handle::new(TableRow::default());
        self.state.borrow_mut().rows.push(row.clone());
        row
    }

    /// Replace the column widths. Entries that are not dimensions are
    /// dropped.
    pub fn set_columns(&self, widths: &[Value]) {
        let columns = widths.iter().filter_map(|w| w.to_dimension().ok()).collect();
        self.state.borrow_mut().columns = columns;
    }
}

impl HostObject for TableSpec {
    fn type_tag(&self) -> &'static str {
        "Table"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn index(&self, key: &str) -> Option<Value> {
        let state = self.state.borrow();
        match key {
            "max_width" => Some(state.max_width.into()),
            "stretch" => Some(state.stretch.into()),
            "font_size" => Some(state.font_size.into()),
            "leading" => Some(state.leading.into()),
            "font_family" => Some(state.font_family.clone().map(Value::from).unwrap_or_default()),
            _ => None,
        }
    }

    fn new_index(&self, key: &str, value: Value) -> Result<()> {
        let context = format!("Table.{key}");
        let mut state = self.state.borrow_mut();
        match key {
            "max_width" => state.max_width = dimension(&value, &context)?,
            "font_size" => state.font_size = dimension(&value, &context)?,
            "leading" => state.leading = dimension(&value, &context)?,
            "stretch" => state.stretch = value.truthy(),
            "font_family" => match value {
                Value::Nil => state.font_family = None,
                Value::Handle(h) if h.downcast_ref::<FontFamily>().is_some() => {
                    state.font_family = Some(h)
                }
                other => {
                    return Err(BindError::type_mismatch(context, "FontFamily", other.type_name()));
                }
            },
            _ => return Err(BindError::unknown_key("Table", key, TABLE_KEYS)),
        }
        Ok(())
    }

    fn call_method(
        &self,
        _session: &mut Session,
        this: &Handle,
        name: &str,
        args: &[Value],
    ) -> Option<Result<Vec<Value>>> {
        match name {
            "add_row" => Some(Ok(vec![self.add_row().into()])),
            "set_columns" => Some(match args.first() {
                Some(Value::List(widths)) => {
                    self.set_columns(widths);
                    Ok(vec![this.clone().into()])
                }
                other => Err(Args::new("table:set_columns", args).bad(
                    1,
                    format!("list expected, got {}", other.map_or("no value", Value::type_name)),
                )),
            }),
            _ => None,
        }
    }

    fn display(&self) -> String {
        let state = self.state.borrow();
        format!("Table {} rows, {} columns", state.rows.len(), state.columns.len())
    }
}

// ----------------------------------------------------------------------------
// Rows and cells
// ----------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TableRow {
    cells: RefCell<Vec<Handle>>,
}

impl TableRow {
    pub fn cells(&self) -> Vec<Handle> {
        self.cells.borrow().clone()
    }

    pub fn add_cell(&self) -> Handle {
        let cell = Handle::new(TableCell::default());
        self.cells.borrow_mut().push(cell.clone());
        cell
    }
}

impl HostObject for TableRow {
    fn type_tag(&self) -> &'static str {
        "TableRow"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn call_method(
        &self,
        _session: &mut Session,
        _this: &Handle,
        name: &str,
        _args: &[Value],
    ) -> Option<Result<Vec<Value>>> {
        (name == "add_cell").then(|| Ok(vec![self.add_cell().into()]))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CellState {
    pub halign: HAlign,
    pub valign: VAlign,
    pub colspan: i64,
    pub rowspan: i64,
    pub background_color: Option<ColorSetting>,
    /// Paddings and border widths by key; unset ones read as zero.
    pub dimensions: BTreeMap<&'static str, ScaledPoint>,
    pub contents: Vec<TextItem>,
}

impl Default for CellState {
    fn default() -> Self {
        CellState {
            halign: HAlign::Default,
            valign: VAlign::Default,
            colspan: 1,
            rowspan: 1,
            background_color: None,
            dimensions: BTreeMap::new(),
            contents: Vec::new(),
        }
    }
}

impl CellState {
    pub fn dimension(&self, key: &str) -> ScaledPoint {
        self.dimensions.get(key).copied().unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct TableCell {
    state: RefCell<CellState>,
}

impl TableCell {
    pub fn state(&self) -> CellState {
        self.state.borrow().clone()
    }

    /// Append contents; values that can not be typeset are skipped.
    pub fn set_contents(&self, items: &[Value]) {
        let items: Vec<TextItem> = items.iter().filter_map(text_item).collect();
        self.state.borrow_mut().contents.extend(items);
    }
}

fn span(value: &Value, context: String) -> Result<i64> {
    match value.as_int() {
        Some(n) if n >= 1 => Ok(n),
        Some(_) => Err(BindError::type_mismatch(context, "span of at least 1", "integer")),
        None => Err(BindError::type_mismatch(context, "integer", value.type_name())),
    }
}

impl HostObject for TableCell {
    fn type_tag(&self) -> &'static str {
        "TableCell"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn index(&self, key: &str) -> Option<Value> {
        let state = self.state.borrow();
        match key {
            "halign" => Some(state.halign.name().into()),
            "valign" => Some(state.valign.name().into()),
            "colspan" => Some(state.colspan.into()),
            "rowspan" => Some(state.rowspan.into()),
            "background_color" => Some(match &state.background_color {
                Some(ColorSetting::Named(name)) => name.as_str().into(),
                Some(ColorSetting::Value(c)) => Handle::new(*c).into(),
                None => Value::Nil,
            }),
            _ if CELL_DIMENSIONS.iter().any(|k| *k == key) => Some(state.dimension(key).into()),
            _ => None,
        }
    }

    fn new_index(&self, key: &str, value: Value) -> Result<()> {
        let context = format!("TableCell.{key}");
        let mut state = self.state.borrow_mut();
        match key {
            "halign" | "valign" => {
                let name = value
                    .as_str()
                    .ok_or_else(|| BindError::type_mismatch(&context, "string", value.type_name()))?;
                if key == "halign" {
                    state.halign = HAlign::resolve(name);
                } else {
                    state.valign = VAlign::resolve(name);
                }
            }
            "colspan" => state.colspan = span(&value, context)?,
            "rowspan" => state.rowspan = span(&value, context)?,
            "background_color" => {
                state.background_color = match &value {
                    Value::Nil => None,
                    Value::Str(name) => Some(ColorSetting::Named(name.clone())),
                    Value::Handle(h) => match h.downcast_ref::<crate::color::Color>() {
                        Some(c) => Some(ColorSetting::Value(*c)),
                        None => {
                            return Err(BindError::type_mismatch(context, "color", h.type_tag()));
                        }
                    },
                    other => {
                        return Err(BindError::type_mismatch(context, "color", other.type_name()));
                    }
                }
            }
            _ => match CELL_DIMENSIONS.iter().find(|k| **k == key) {
                Some(k) => {
                    let sp = dimension(&value, &context)?;
                    state.dimensions.insert(*k, sp);
                }
                None => return Err(BindError::unknown_key("TableCell", key, CELL_KEYS)),
            },
        }
        Ok(())
    }

    fn call_method(
        &self,
        _session: &mut Session,
        this: &Handle,
        name: &str,
        args: &[Value],
    ) -> Option<Result<Vec<Value>>> {
        (name == "set_contents").then(|| {
            self.set_contents(args);
            Ok(vec![this.clone().into()])
        })
    }
}
