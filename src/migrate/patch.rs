//! Dense input-width chain patching
//!
//! The 1.x loader asserts `input_shape[-1] == input_dim` on every Dense
//! layer, not just the first, so `input_dim` must be threaded through the
//! whole Dense subsequence: the first layer's width comes from
//! `input_shape` (or an explicit `input_dim`), every later layer's width is
//! forced to the previous Dense layer's `output_dim`.

use std::path::Path;

use serde_json::Value;

use crate::backup;
use crate::errors::{MigrateError, Result};
use crate::schema::{self, LayerKind};

use super::{housekeep, strip_nulls, wrap_layer};

/// One link of the threaded Dense chain, kept for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenseLink {
    pub input_dim: u64,
    pub output_dim: u64,
}

/// Patch a model descriptor from either on-disk shape into the wrapped
/// 1.x shape with a consistent Dense width chain. Returns the patched
/// descriptor and the chain itself.
pub fn patch_model(model: &Value) -> Result<(Value, Vec<DenseLink>)> {
    let raw = schema::raw_layers(model)?;

    // First pass: thread the expected input width through the Dense layers
    let mut links: Vec<DenseLink> = Vec::new();
    for (idx, flat) in raw.iter().enumerate() {
        if LayerKind::from_class(schema::class_name(flat)?) != LayerKind::Dense {
            continue;
        }
        let output_dim = schema::dim(flat.get("output_dim"))
            .ok_or(MigrateError::MissingOutputDim { index: idx })?;
        let input_dim = match links.last() {
            Some(prev) => prev.output_dim,
            None => schema::shape_width(flat.get("input_shape"))
                .or_else(|| schema::dim(flat.get("input_dim")))
                .ok_or(MigrateError::MissingInputWidth)?,
        };
        links.push(DenseLink {
            input_dim,
            output_dim,
        });
    }

    // Second pass: rebuild the layer list with the corrected widths
    let mut out = Vec::with_capacity(raw.len());
    let mut dense_idx = 0;
    for flat in &raw {
        let (class, mut config) = housekeep(flat)?;
        if LayerKind::from_class(&class) == LayerKind::Dense {
            config.insert("input_dim".to_string(), links[dense_idx].input_dim.into());
            config.shift_remove("input_shape");
            dense_idx += 1;
        }
        strip_nulls(&mut config, schema::NULLABLE_KEYS);
        out.push(wrap_layer(&class, config));
    }

    Ok((schema::wrap_sequential(out), links))
}

/// Patch one architecture file in place. Restores from the backup first
/// when one exists, so repeated runs patch the original bytes rather than
/// a previous patch.
pub fn patch_file(path: &Path) -> Result<Vec<String>> {
    let mut report = Vec::new();

    if backup::restore_from_backup(path, backup::ORIG_SUFFIX)? {
        report.push("Restoring from original backup first...".to_string());
    }

    let model = schema::read_model(path)?;
    let (patched, links) = patch_model(&model)?;

    report.push("Dense layer chain:".to_string());
    for (i, link) in links.iter().enumerate() {
        report.push(format!(
            "  Dense[{i}]: input_dim={} -> output_dim={}",
            link.input_dim, link.output_dim
        ));
    }

    if let Some(backup_path) = backup::backup_once(path, backup::ORIG_SUFFIX)? {
        report.push(format!("Backed up original: {}", backup_path.display()));
    }

    schema::write_model(path, &patched)?;
    report.push(format!("Written: {}", path.display()));
    Ok(report)
}
