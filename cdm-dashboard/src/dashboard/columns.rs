//! Grid column definitions.

use cdm::format_timestamp;
use serde_json::Value;

pub const POSITION_FIELDS: [&str; 3] = ["security", "quantity", "updated"];
pub const TRADE_FIELDS: [&str; 5] = ["security", "quantity", "side", "state", "updated"];
pub const CDM_TRADE_FIELDS: [&str; 8] = [
    "id",
    "security",
    "quantity",
    "side",
    "state",
    "cdmVersion",
    "businessEventType",
    "updated",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRenderer {
    Plain,
    /// Value shown as a tag, e.g. `[6.0.0]`.
    Chip,
    Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub field: &'static str,
    pub renderer: CellRenderer,
}

impl ColumnDef {
    fn for_field(field: &'static str) -> Self {
        let renderer = match field {
            "cdmVersion" | "businessEventType" => CellRenderer::Chip,
            "updated" => CellRenderer::Timestamp,
            _ => CellRenderer::Plain,
        };
        Self { field, renderer }
    }

    /// Header text: `businessEventType` becomes `Business Event Type`.
    pub fn header(&self) -> String {
        let mut header = String::new();
        for (i, c) in self.field.chars().enumerate() {
            if i == 0 {
                header.extend(c.to_uppercase());
            } else if c.is_uppercase() {
                header.push(' ');
                header.push(c);
            } else {
                header.push(c);
            }
        }
        header
    }

    /// Cell text for `row`; missing values render empty.
    pub fn cell(&self, row: &Value) -> String {
        let text = match row.get(self.field) {
            None | Some(Value::Null) => return String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        match self.renderer {
            CellRenderer::Plain => text,
            CellRenderer::Chip => format!("[{}]", text),
            CellRenderer::Timestamp => format_timestamp(&text),
        }
    }
}

/// Column sets of the three grids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    pub positions: Vec<ColumnDef>,
    pub trades: Vec<ColumnDef>,
    pub cdm_trades: Vec<ColumnDef>,
}

impl ColumnSet {
    /// Rebuilds every set from the fixed field lists.
    pub fn rebuild(&mut self) {
        self.positions = POSITION_FIELDS.iter().copied().map(ColumnDef::for_field).collect();
        self.trades = TRADE_FIELDS.iter().copied().map(ColumnDef::for_field).collect();
        self.cdm_trades = CDM_TRADE_FIELDS.iter().copied().map(ColumnDef::for_field).collect();
    }
}
