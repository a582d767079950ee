//! On-disk model descriptor schema
//!
//! Two serializations of the same descriptor exist in the wild: the flat
//! Keras 0.x shape (`{"layers": [{...}, ...]}`, one object per layer with
//! the class name in a `name` field) and the wrapped 1.x shape
//! (`{"class_name": "Sequential", "config": [{"class_name": C, "config": {...}}]}`).
//! Extraction normalizes both back to the flat per-layer maps so the
//! migration rules can run uniformly.

use serde_json::{Map, Value};

use crate::errors::{MigrateError, Result};

/// File name suffix for architecture files
pub const MODEL_ARCH_SUFFIX: &str = ".model_arch.json";

/// File name suffix for the paired binary weight files
pub const MODEL_WEIGHTS_SUFFIX: &str = ".model_weights.h5";

/// Housekeeping keys with no meaning in the 1.x format
pub const DROP_LAYER_KEYS: &[&str] = &["custom_name", "cache_enabled"];

/// Keys removed from any layer config when their value is null.
/// The 1.x consumer treats an explicitly absent field differently
/// from a null one.
pub const NULLABLE_KEYS: &[&str] = &[
    "W_constraint",
    "b_constraint",
    "W_regularizer",
    "b_regularizer",
    "activity_regularizer",
];

/// One layer record, class tag under `name`, config fields alongside
pub type LayerMap = Map<String, Value>;

/// The closed set of layer kinds the migrator understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Dense,
    Activation,
    Dropout,
    Unknown,
}

impl LayerKind {
    /// Classify a class tag
    pub fn from_class(class: &str) -> Self {
        match class {
            "Dense" => LayerKind::Dense,
            "Activation" => LayerKind::Activation,
            "Dropout" => LayerKind::Dropout,
            _ => LayerKind::Unknown,
        }
    }
}

/// Extract the flat layer list from either on-disk shape.
///
/// A wrapped descriptor is unwrapped layer by layer: the class tag moves
/// back into the `name` field so partially converted files can be
/// re-processed uniformly. A flat descriptor without a `layers` key yields
/// an empty list, matching the legacy behavior.
pub fn raw_layers(model: &Value) -> Result<Vec<LayerMap>> {
    let obj = model
        .as_object()
        .ok_or_else(|| MigrateError::MalformedModel("top level is not a JSON object".into()))?;

    if obj.get("class_name").and_then(Value::as_str) == Some("Sequential") {
        let wrapped = obj
            .get("config")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                MigrateError::MalformedModel("Sequential config is not a list".into())
            })?;

        let mut layers = Vec::with_capacity(wrapped.len());
        for (idx, entry) in wrapped.iter().enumerate() {
            let class = entry
                .get("class_name")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    MigrateError::MalformedLayer(format!("layer {idx} has no class_name"))
                })?;
            let mut flat = entry
                .get("config")
                .and_then(Value::as_object)
                .cloned()
                .ok_or_else(|| {
                    MigrateError::MalformedLayer(format!("layer {idx} config is not an object"))
                })?;
            flat.insert("name".to_string(), Value::String(class.to_string()));
            layers.push(flat);
        }
        return Ok(layers);
    }

    let flat = match obj.get("layers") {
        Some(v) => v.as_array().ok_or_else(|| {
            MigrateError::MalformedModel("layers is not a list".into())
        })?,
        None => return Ok(Vec::new()),
    };

    flat.iter()
        .enumerate()
        .map(|(idx, entry)| {
            entry.as_object().cloned().ok_or_else(|| {
                MigrateError::MalformedLayer(format!("layer {idx} is not an object"))
            })
        })
        .collect()
}

/// Class tag of a flat layer record
pub fn class_name(layer: &LayerMap) -> Result<&str> {
    layer
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| MigrateError::MalformedLayer("layer has no name field".into()))
}

/// Re-wrap migrated layers under the Sequential container tag
pub fn wrap_sequential(layers: Vec<Value>) -> Value {
    serde_json::json!({
        "class_name": "Sequential",
        "config": layers,
    })
}

/// Read and parse a model descriptor file
pub fn read_model(path: &std::path::Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Write a model descriptor pretty-printed with two-space indentation,
/// the layout the legacy tooling produced
pub fn write_model(path: &std::path::Path, model: &Value) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(model)?)?;
    Ok(())
}

/// A positive integer width, treating null/zero/missing as unset
pub fn dim(value: Option<&Value>) -> Option<u64> {
    value.and_then(Value::as_u64).filter(|&d| d > 0)
}

/// Last element of a non-empty `input_shape` array, if usable
pub fn shape_width(value: Option<&Value>) -> Option<u64> {
    value
        .and_then(Value::as_array)
        .and_then(|shape| shape.last())
        .and_then(Value::as_u64)
        .filter(|&d| d > 0)
}
