//! Binary model artifact: save and load the fitted pipeline

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::pipeline::Pipeline;

/// Bumped whenever the serialized layout of [`Pipeline`] changes
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Envelope written to disk around the fitted pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    /// Version of this crate that wrote the artifact
    pub crate_version: String,
    /// Creation time (RFC 3339)
    pub created_at: String,
    pub pipeline: Pipeline,
}

/// Create a directory and its parents if missing
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.as_os_str().is_empty() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Create the parent directory of a file path if missing
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) => ensure_dir(parent),
        None => Ok(()),
    }
}

/// Serialize a fitted pipeline to `path`, replacing any existing file
pub fn save_pipeline(pipeline: &Pipeline, path: &Path) -> Result<()> {
    if !pipeline.is_fitted() {
        return Err(PipelineError::NotFitted("Pipeline".to_string()));
    }

    ensure_parent_dir(path)?;

    let artifact = ModelArtifact {
        format_version: ARTIFACT_FORMAT_VERSION,
        crate_version: env!("CARGO_PKG_VERSION").to_string(),
        created_at: Utc::now().to_rfc3339(),
        pipeline: pipeline.clone(),
    };

    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, &artifact)?;
    writer.flush()?;
    Ok(())
}

/// Read the full artifact envelope from `path`
pub fn load_artifact(path: &Path) -> Result<ModelArtifact> {
    if !path.is_file() {
        return Err(PipelineError::ArtifactNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path)?;
    let artifact: ModelArtifact =
        bincode::deserialize(&bytes).map_err(|e| PipelineError::ArtifactCorrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if artifact.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(PipelineError::ArtifactCorrupt {
            path: path.to_path_buf(),
            message: format!(
                "unsupported artifact format version {} (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            ),
        });
    }

    Ok(artifact)
}

/// Load the fitted pipeline stored at `path`
pub fn load_pipeline(path: &Path) -> Result<Pipeline> {
    Ok(load_artifact(path)?.pipeline)
}
