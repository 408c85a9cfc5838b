// Mapper to convert domain models to JSON views
use crate::domain::dashboard::{Dashboard, Panel, PanelState};
use crate::domain::decoration::DecorationFrame;
use crate::domain::series::{RangeBounds, SeriesTable};
use chrono::SecondsFormat;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub range_minutes: u32,
    pub generated_at: String,
    pub panels: Vec<PanelView>,
    pub decoration: DecorationFrame,
}

#[derive(Debug, Serialize)]
pub struct PanelView {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    #[serde(flatten)]
    pub body: PanelBody,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelBody {
    Data { x: Vec<String>, y: Vec<SeriesView> },
    NoData { message: String },
    Error { message: String },
}

#[derive(Debug, Serialize)]
pub struct SeriesView {
    pub name: String,
    /// NaN becomes null
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Serialize)]
pub struct RangeView {
    pub min_minutes: u32,
    pub max_minutes: u32,
    pub default_minutes: u32,
}

impl From<RangeBounds> for RangeView {
    fn from(bounds: RangeBounds) -> Self {
        Self {
            min_minutes: bounds.min_minutes,
            max_minutes: bounds.max_minutes,
            default_minutes: bounds.default_minutes,
        }
    }
}

pub fn dashboard_to_view(dashboard: Dashboard) -> DashboardView {
    DashboardView {
        range_minutes: dashboard.range.minutes(),
        generated_at: dashboard
            .generated_at
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        panels: dashboard.panels.into_iter().map(panel_to_view).collect(),
        decoration: dashboard.decoration,
    }
}

fn panel_to_view(panel: Panel) -> PanelView {
    let body = match panel.state {
        PanelState::Data(table) => table_to_body(&table),
        PanelState::NoData(message) => PanelBody::NoData { message },
        PanelState::Failed(message) => PanelBody::Error { message },
    };

    PanelView {
        id: panel.id,
        title: panel.title,
        unit: panel.unit,
        body,
    }
}

fn table_to_body(table: &SeriesTable) -> PanelBody {
    let x = table
        .times()
        .into_iter()
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .collect();

    let y = table
        .fields()
        .iter()
        .filter_map(|name| {
            let column = table.column(name).ok()?;
            Some(SeriesView {
                name: name.clone(),
                values: column.into_iter().map(|v| Some(v).filter(|v| !v.is_nan())).collect(),
            })
        })
        .collect();

    PanelBody::Data { x, y }
}
