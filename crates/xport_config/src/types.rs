//! Configuration types deserialized from `xport.toml`.

use serde::{Deserialize, Deserializer};

/// The configuration of one export run.
///
/// Every section is optional; an empty file yields [`ExportConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExportConfig {
    /// Run chaining behaviour.
    #[serde(default)]
    pub run: RunConfig,
    /// Names used by the lazily resolved document singletons.
    #[serde(default)]
    pub lookup: LookupConfig,
    /// Geometric tolerances applied while deriving artifacts.
    #[serde(default)]
    pub precision: PrecisionConfig,
}

/// Settings that relate this run to the one before it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RunConfig {
    /// Keep the site record produced by the previous run when this run is
    /// chained onto it with a partial clear.
    #[serde(default)]
    pub share_site_with_previous_run: bool,
}

/// Named lookups tried before falling back to document defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LookupConfig {
    /// Name of the phase to export. Absent means the document's default phase.
    #[serde(default, deserialize_with = "deserialize_lookup_name")]
    pub phase: Option<String>,
    /// Name of the material used for elements without one.
    #[serde(default, deserialize_with = "deserialize_lookup_name")]
    pub default_material: Option<String>,
}

/// Tolerances used when comparing derived geometry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrecisionConfig {
    /// Length tolerance in model units.
    #[serde(default = "default_length_tolerance")]
    pub length_tolerance: f64,
    /// Angular tolerance in radians.
    #[serde(default = "default_angle_tolerance")]
    pub angle_tolerance: f64,
}

impl Default for PrecisionConfig {
    fn default() -> Self {
        Self {
            length_tolerance: default_length_tolerance(),
            angle_tolerance: default_angle_tolerance(),
        }
    }
}

fn default_length_tolerance() -> f64 {
    1e-6
}

fn default_angle_tolerance() -> f64 {
    1e-9
}

/// Deserializes a lookup name, treating blank strings as absent.
fn deserialize_lookup_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|name| {
        let trimmed = name.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }))
}
