//! Layer field migrator
//!
//! Pure transformations over the flat layer maps, shared by the `convert`
//! and `patch` subcommands. Every layer gets the same housekeeping pass
//! (drop dead keys, alias the instance name); Dense-specific width rules
//! live with each variant.

pub mod convert;
pub mod patch;

pub use convert::{convert_file, convert_model};
pub use patch::{patch_file, patch_model, DenseLink};

use serde_json::Value;

use crate::errors::Result;
use crate::schema::{self, LayerMap};

/// Housekeeping rules shared by every migration: drop the keys with no
/// meaning in the 1.x format and replace the class tag with an instance
/// name (`custom_name` if present, else the lower-cased class name).
fn housekeep(flat: &LayerMap) -> Result<(String, LayerMap)> {
    let class = schema::class_name(flat)?.to_string();

    let mut config = LayerMap::new();
    for (k, v) in flat {
        if schema::DROP_LAYER_KEYS.contains(&k.as_str()) {
            continue;
        }
        if k == "name" {
            let instance = flat
                .get("custom_name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| class.to_lowercase());
            config.insert("name".to_string(), Value::String(instance));
            continue;
        }
        config.insert(k.clone(), v.clone());
    }

    Ok((class, config))
}

/// Remove the listed keys when their value is null, preserving the order
/// of everything else
fn strip_nulls(config: &mut LayerMap, keys: &[&str]) {
    for key in keys {
        if config.get(*key).map_or(false, Value::is_null) {
            config.shift_remove(*key);
        }
    }
}

fn wrap_layer(class: &str, config: LayerMap) -> Value {
    serde_json::json!({
        "class_name": class,
        "config": config,
    })
}
