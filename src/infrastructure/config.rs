use crate::domain::series::RangeBounds;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct GardenConfig {
    pub influx: InfluxSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
    #[serde(default = "default_groups")]
    pub groups: Vec<SignalGroupConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardSettings {
    pub min_minutes: u32,
    pub max_minutes: u32,
    pub default_minutes: u32,
    /// Name of the decorative visualization ("plant" or "flower")
    pub decoration: String,
    /// Signal group whose latest value drives the decoration
    pub decoration_group: String,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        let bounds = RangeBounds::default();
        Self {
            min_minutes: bounds.min_minutes,
            max_minutes: bounds.max_minutes,
            default_minutes: bounds.default_minutes,
            decoration: "plant".to_string(),
            decoration_group: "humidity".to_string(),
        }
    }
}

impl DashboardSettings {
    pub fn range_bounds(&self) -> RangeBounds {
        RangeBounds {
            min_minutes: self.min_minutes,
            max_minutes: self.max_minutes,
            default_minutes: self.default_minutes,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SignalGroupConfig {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub measurement: String,
    pub fields: Vec<String>,
    /// Output column name when the three fields should collapse into their magnitude
    #[serde(default)]
    pub magnitude: Option<String>,
    #[serde(default)]
    pub empty_message: Option<String>,
}

impl SignalGroupConfig {
    pub fn no_data_message(&self) -> String {
        self.empty_message
            .clone()
            .unwrap_or_else(|| format!("No {} data in this range.", self.title.to_lowercase()))
    }
}

fn group(
    id: &str,
    title: &str,
    unit: Option<&str>,
    measurement: &str,
    fields: &[&str],
    magnitude: Option<&str>,
) -> SignalGroupConfig {
    SignalGroupConfig {
        id: id.to_string(),
        title: title.to_string(),
        unit: unit.map(str::to_string),
        measurement: measurement.to_string(),
        fields: fields.iter().map(|f| f.to_string()).collect(),
        magnitude: magnitude.map(str::to_string),
        empty_message: None,
    }
}

/// Temperature, humidity, movement and orientation, in render order
pub fn default_groups() -> Vec<SignalGroupConfig> {
    vec![
        group("temperature", "Temperature", Some("°C"), "airSensor", &["temperature"], None),
        group("humidity", "Humidity", Some("%"), "airSensor", &["humidity"], None),
        group(
            "movement",
            "Movement",
            None,
            "accelerometer",
            &["ax", "ay", "az"],
            Some("accel_magnitude"),
        ),
        group("orientation", "Orientation", None, "gyroscope", &["gx", "gy", "gz"], None),
    ]
}

/// `GARDEN__<SECTION>__<KEY>` variables, e.g. `GARDEN__INFLUX__TOKEN`
fn environment() -> config::Environment {
    config::Environment::with_prefix("GARDEN").separator("__")
}

fn build_config<S>(file: S, env: config::Environment) -> anyhow::Result<GardenConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder()
        .add_source(file)
        .add_source(env)
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Load `config/garden` (or `$GARDEN_CONFIG`) overlaid with `GARDEN__*` environment variables
pub fn load_config() -> anyhow::Result<GardenConfig> {
    let path = std::env::var("GARDEN_CONFIG").unwrap_or_else(|_| "config/garden".to_string());
    build_config(config::File::with_name(&path).required(false), environment())
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    fn parse(toml: &str) -> GardenConfig {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = parse(
            r#"
            [influx]
            url = "http://localhost:8086"
            token = "secret"
            org = "koru"
            bucket = "garden"
            "#,
        );

        assert_eq!(config.influx.bucket, "garden");
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.dashboard.range_bounds(), RangeBounds::default());
        assert_eq!(config.dashboard.decoration, "plant");
        assert_eq!(config.groups, default_groups());
    }

    #[test]
    fn test_groups_and_dashboard_override() {
        let config = parse(
            r#"
            [influx]
            url = "http://influx:8086"
            token = "t"
            org = "o"
            bucket = "b"

            [dashboard]
            max_minutes = 120
            decoration = "flower"

            [[groups]]
            id = "soil"
            title = "Soil moisture"
            measurement = "soilSensor"
            fields = ["moisture"]
            empty_message = "Soil sensor is quiet."
            "#,
        );

        assert_eq!(config.dashboard.max_minutes, 120);
        assert_eq!(config.dashboard.min_minutes, 10);
        assert_eq!(config.dashboard.decoration, "flower");
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.groups[0].magnitude, None);
        assert_eq!(config.groups[0].no_data_message(), "Soil sensor is quiet.");
    }

    #[test]
    fn test_no_data_message_defaults_to_title() {
        let groups = default_groups();
        assert_eq!(groups[2].no_data_message(), "No movement data in this range.");
        assert_eq!(groups[2].magnitude.as_deref(), Some("accel_magnitude"));
    }

    #[test]
    fn test_environment_overrides_file() {
        let toml = r#"
            [influx]
            url = "http://localhost:8086"
            token = "from-file"
            org = "koru"
            bucket = "garden"

            [dashboard]
            max_minutes = 180
            "#;
        let vars: config::Map<String, String> = [
            ("GARDEN__INFLUX__TOKEN", "from-env"),
            ("GARDEN__DASHBOARD__MAX_MINUTES", "120"),
            ("GARDEN_CONFIG", "ignored.toml"),
            ("OTHER__INFLUX__ORG", "ignored"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = build_config(
            File::from_str(toml, FileFormat::Toml),
            environment().source(Some(vars)),
        )
        .unwrap();

        assert_eq!(config.influx.token, "from-env");
        assert_eq!(config.influx.org, "koru");
        assert_eq!(config.dashboard.max_minutes, 120);
        assert_eq!(config.dashboard.min_minutes, 10);
    }

    #[test]
    fn test_environment_alone_supplies_influx_section() {
        let vars: config::Map<String, String> = [
            ("GARDEN__INFLUX__URL", "http://influx:8086"),
            ("GARDEN__INFLUX__TOKEN", "t"),
            ("GARDEN__INFLUX__ORG", "o"),
            ("GARDEN__INFLUX__BUCKET", "b"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = build_config(
            File::with_name("does/not/exist").required(false),
            environment().source(Some(vars)),
        )
        .unwrap();

        assert_eq!(config.influx.url, "http://influx:8086");
        assert_eq!(config.groups, default_groups());
    }

    #[test]
    fn test_missing_influx_section_fails() {
        let result = Config::builder()
            .add_source(File::from_str("[server]\nbind = \"127.0.0.1:9000\"", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize::<GardenConfig>();
        assert!(result.is_err());
    }
}
