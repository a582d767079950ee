//! Flat 0.x to wrapped 1.x conversion
//!
//! Per-layer key migration: the first Dense layer derives `input_dim` from
//! `input_shape` when unset, every later Dense layer loses its width fields
//! entirely (the 1.x loader chains shapes itself in this lineage).

use std::path::Path;

use serde_json::Value;

use crate::backup;
use crate::errors::Result;
use crate::schema::{self, LayerKind, LayerMap};

use super::{housekeep, strip_nulls, wrap_layer};

/// Width fields join the nullable set in this lineage: a null `input_dim`
/// trips the 1.x Dense input-width assertion on load.
const CONVERT_NULLABLE_KEYS: &[&str] = &[
    "input_dim",
    "input_shape",
    "W_constraint",
    "b_constraint",
    "W_regularizer",
    "b_regularizer",
    "activity_regularizer",
];

/// Convert a model descriptor from either on-disk shape to the wrapped
/// 1.x shape
pub fn convert_model(model: &Value) -> Result<Value> {
    let raw = schema::raw_layers(model)?;

    let mut out = Vec::with_capacity(raw.len());
    let mut first_dense_seen = false;
    for flat in &raw {
        let is_dense = LayerKind::from_class(schema::class_name(flat)?) == LayerKind::Dense;
        let is_first_dense = is_dense && !first_dense_seen;
        if is_dense {
            first_dense_seen = true;
        }
        out.push(convert_layer(flat, is_first_dense)?);
    }

    Ok(schema::wrap_sequential(out))
}

fn convert_layer(flat: &LayerMap, is_first_dense: bool) -> Result<Value> {
    let (class, mut config) = housekeep(flat)?;

    if LayerKind::from_class(&class) == LayerKind::Dense {
        if is_first_dense {
            if schema::dim(config.get("input_dim")).is_none() {
                if let Some(width) = schema::shape_width(config.get("input_shape")) {
                    config.insert("input_dim".to_string(), width.into());
                }
            }
            // input_shape is not a valid Dense config key in 1.x
            config.shift_remove("input_shape");
        } else {
            // Intermediate Dense layers must not carry width fields at all
            config.shift_remove("input_dim");
            config.shift_remove("input_shape");
        }
    }

    strip_nulls(&mut config, CONVERT_NULLABLE_KEYS);
    Ok(wrap_layer(&class, config))
}

/// Convert one architecture file in place, backing up the original bytes
/// under the 0.x lineage suffix on first touch
pub fn convert_file(path: &Path) -> Result<Vec<String>> {
    let model = schema::read_model(path)?;
    let converted = convert_model(&model)?;

    let mut report = Vec::new();
    if let Some(backup_path) = backup::backup_once(path, backup::KERAS0X_SUFFIX)? {
        report.push(format!("Backed up original: {}", backup_path.display()));
    }

    schema::write_model(path, &converted)?;

    if let Some(line) = first_dense_report(&converted) {
        report.push(line);
    }
    report.push(format!("Written: {}", path.display()));
    Ok(report)
}

/// First Dense layer config, for post-write verification output
fn first_dense_report(model: &Value) -> Option<String> {
    let layers = model.get("config")?.as_array()?;
    let dense = layers
        .iter()
        .find(|lyr| lyr.get("class_name").and_then(Value::as_str) == Some("Dense"))?;
    let cfg = dense.get("config")?;

    let show = |key: &str| match cfg.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
        None => "MISSING".to_string(),
    };

    Some(format!(
        "First Dense: input_dim={}  output_dim={}  name={}",
        show("input_dim"),
        show("output_dim"),
        show("name"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_dense_derives_input_dim_from_shape() {
        let model = json!({
            "layers": [
                {"name": "Dense", "output_dim": 512, "input_dim": null, "input_shape": [9]},
            ],
        });

        let converted = convert_model(&model).unwrap();
        let cfg = &converted["config"][0]["config"];
        assert_eq!(cfg["input_dim"], json!(9));
        assert!(cfg.get("input_shape").is_none());
    }

    #[test]
    fn test_first_dense_keeps_explicit_input_dim() {
        let model = json!({
            "layers": [
                {"name": "Dense", "output_dim": 512, "input_dim": 40, "input_shape": [9]},
            ],
        });

        let converted = convert_model(&model).unwrap();
        assert_eq!(converted["config"][0]["config"]["input_dim"], json!(40));
    }

    #[test]
    fn test_later_dense_loses_width_fields() {
        let model = json!({
            "layers": [
                {"name": "Dense", "output_dim": 512, "input_shape": [9]},
                {"name": "Dense", "output_dim": 2, "input_dim": null},
            ],
        });

        let converted = convert_model(&model).unwrap();
        let second = &converted["config"][1]["config"];
        assert!(second.get("input_dim").is_none());
        assert!(second.get("input_shape").is_none());
        assert_eq!(second["output_dim"], json!(2));
    }

    #[test]
    fn test_null_regularizers_are_dropped() {
        let model = json!({
            "layers": [
                {
                    "name": "Dense",
                    "output_dim": 16,
                    "input_dim": 4,
                    "W_regularizer": null,
                    "b_constraint": null,
                    "activation": "tanh",
                },
            ],
        });

        let converted = convert_model(&model).unwrap();
        let cfg = &converted["config"][0]["config"];
        assert!(cfg.get("W_regularizer").is_none());
        assert!(cfg.get("b_constraint").is_none());
        assert_eq!(cfg["activation"], json!("tanh"));
    }

    #[test]
    fn test_non_dense_layers_pass_through() {
        let model = json!({
            "layers": [
                {"name": "Dropout", "p": 0.5, "cache_enabled": true},
            ],
        });

        let converted = convert_model(&model).unwrap();
        assert_eq!(converted["class_name"], json!("Sequential"));
        let layer = &converted["config"][0];
        assert_eq!(layer["class_name"], json!("Dropout"));
        assert_eq!(layer["config"]["p"], json!(0.5));
        assert!(layer["config"].get("cache_enabled").is_none());
    }

    #[test]
    fn test_wrapped_input_is_reconverted_cleanly() {
        let model = json!({
            "class_name": "Sequential",
            "config": [
                {"class_name": "Dense", "config": {"name": "dense", "output_dim": 8, "input_dim": 3}},
            ],
        });

        let converted = convert_model(&model).unwrap();
        let cfg = &converted["config"][0]["config"];
        assert_eq!(cfg["input_dim"], json!(3));
        assert_eq!(cfg["name"], json!("dense"));
    }
}
