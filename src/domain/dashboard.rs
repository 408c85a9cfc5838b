// Dashboard domain model
use super::decoration::DecorationFrame;
use super::series::{SeriesTable, TimeRange};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    Data(SeriesTable),
    /// Nothing in range; carries the informational message to show instead of a chart
    NoData(String),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Panel {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub state: PanelState,
}

impl Panel {
    pub fn new(id: String, title: String, unit: Option<String>, state: PanelState) -> Self {
        Self {
            id,
            title,
            unit,
            state,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub range: TimeRange,
    pub generated_at: DateTime<Utc>,
    pub panels: Vec<Panel>,
    pub decoration: DecorationFrame,
}

impl Dashboard {
    pub fn new(
        range: TimeRange,
        generated_at: DateTime<Utc>,
        panels: Vec<Panel>,
        decoration: DecorationFrame,
    ) -> Self {
        Self {
            range,
            generated_at,
            panels,
            decoration,
        }
    }
}
