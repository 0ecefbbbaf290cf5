mod compare;
mod rasterize;

pub use compare::{compare_images, generate_diff_image, CompareResult};
pub use rasterize::rasterize_document;

use std::path::PathBuf;

use image::RgbaImage;
use scenepaint::{Engine, EngineConfig};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisualTestError {
    #[error("Failed to compare images: {0}")]
    Compare(String),
    #[error("Failed to rasterize document: {0}")]
    Rasterize(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, VisualTestError>;

/// Configuration for a cross-backend test
#[derive(Clone)]
pub struct VisualTestConfig {
    /// Name used for artifacts written on failure
    pub name: String,
    /// Similarity threshold (0.0 to 1.0, default 0.99)
    pub similarity_threshold: f64,
}

impl Default for VisualTestConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            similarity_threshold: 0.99,
        }
    }
}

/// Result of a cross-backend test
pub struct VisualTestResult {
    /// Whether the test passed (similarity >= threshold)
    pub passed: bool,
    /// The similarity score (0.0 to 1.0)
    pub similarity: f64,
    /// Path to the raster surface (written on failure)
    pub raster_path: Option<PathBuf>,
    /// Path to the rasterized document (written on failure)
    pub document_path: Option<PathBuf>,
    /// Path to diff image (written on failure)
    pub diff_path: Option<PathBuf>,
}

/// Get the path to the output directory for test artifacts
pub fn output_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("output")
}

fn artifact_path(name: &str, kind: &str) -> PathBuf {
    output_dir().join(format!("{}_{}.png", name, kind))
}

/// Rasterize the engine's exported document at the engine's surface size.
pub fn render_document(engine: &Engine) -> Result<RgbaImage> {
    let EngineConfig {
        background_color, ..
    } = engine.config();
    let document = engine.export_document_blocking();
    rasterize_document(&document, background_color.to_rgba8())
}

/// Compare the engine's presented surface with its exported document.
///
/// The engine must already have rendered the scene under test.
pub fn compare_backends(engine: &Engine, config: &VisualTestConfig) -> Result<VisualTestResult> {
    let raster = engine.snapshot_rgba();
    let document = render_document(engine)?;

    let compare_result = compare_images(&raster, &document)?;
    let passed = compare_result.similarity >= config.similarity_threshold;

    let mut result = VisualTestResult {
        passed,
        similarity: compare_result.similarity,
        raster_path: None,
        document_path: None,
        diff_path: None,
    };

    // Keep artifacts around for inspection on failure
    if !passed {
        std::fs::create_dir_all(output_dir())?;
        let raster_path = artifact_path(&config.name, "raster");
        let document_path = artifact_path(&config.name, "document");
        let diff_path = artifact_path(&config.name, "diff");
        raster.save(&raster_path)?;
        document.save(&document_path)?;
        generate_diff_image(&raster, &document)?.save(&diff_path)?;
        result.raster_path = Some(raster_path);
        result.document_path = Some(document_path);
        result.diff_path = Some(diff_path);
    }

    Ok(result)
}
