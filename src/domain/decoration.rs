// Decorative visualizations driven by the latest humidity reading
use serde::Serialize;
use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalityState {
    /// Closed, below 40% humidity
    Dormant,
    /// Open, 40% up to 80%
    Active,
    /// Open and saturated, 80% and above
    Vivid,
}

impl VitalityState {
    pub fn from_humidity(humidity: f64) -> Self {
        if humidity >= 80.0 {
            Self::Vivid
        } else if humidity >= 40.0 {
            Self::Active
        } else {
            // NaN lands here too
            Self::Dormant
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecorationFrame {
    pub kind: &'static str,
    pub humidity: f64,
    pub state: VitalityState,
    pub color: &'static str,
    pub params: BTreeMap<&'static str, f64>,
}

/// Swappable renderer for the decorative panel
pub trait Decoration: Send + Sync {
    fn name(&self) -> &'static str;
    fn render(&self, humidity: f64) -> DecorationFrame;
}

/// Linear map of `value` from [0, 100] onto [lo, hi], unclamped
fn map_percent(value: f64, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * value / 100.0
}

/// Growing plant: stem and leaves scale with humidity
#[derive(Debug, Default, Clone, Copy)]
pub struct PlantSketch;

impl Decoration for PlantSketch {
    fn name(&self) -> &'static str {
        "plant"
    }

    fn render(&self, humidity: f64) -> DecorationFrame {
        let color = if humidity > 60.0 {
            "#008000"
        } else if humidity > 30.0 {
            "#556b2f"
        } else {
            "#a9a9a9"
        };

        let params = BTreeMap::from([
            ("plant_height", map_percent(humidity, 100.0, 300.0)),
            ("leaf_size", map_percent(humidity, 30.0, 80.0)),
            ("leaf_angle", map_percent(humidity, 0.0, FRAC_PI_4)),
        ]);

        DecorationFrame {
            kind: self.name(),
            humidity,
            state: VitalityState::from_humidity(humidity),
            color,
            params,
        }
    }
}

/// Flower that opens as humidity rises
#[derive(Debug, Default, Clone, Copy)]
pub struct FlowerSketch;

impl Decoration for FlowerSketch {
    fn name(&self) -> &'static str {
        "flower"
    }

    fn render(&self, humidity: f64) -> DecorationFrame {
        let state = VitalityState::from_humidity(humidity);
        let (opening, saturation, color) = match state {
            VitalityState::Dormant => (0.0, 0.3, "#8b7d6b"),
            VitalityState::Active => (0.6, 0.7, "#ff69b4"),
            VitalityState::Vivid => (1.0, 1.0, "#ff1493"),
        };

        DecorationFrame {
            kind: self.name(),
            humidity,
            state,
            color,
            params: BTreeMap::from([("petal_opening", opening), ("saturation", saturation)]),
        }
    }
}

pub fn decoration_by_name(name: &str) -> Option<Box<dyn Decoration>> {
    match name {
        "plant" => Some(Box::new(PlantSketch)),
        "flower" => Some(Box::new(FlowerSketch)),
        _ => None,
    }
}
