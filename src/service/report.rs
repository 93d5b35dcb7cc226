//! Lab report pipeline: staged image uploads concatenated into a single PDF.
//!
//! Staged files use per-call timestamped names so concurrent requests never
//! collide. Assembly is all-or-nothing: if any accepted image fails to
//! decode, no PDF is written. Cleanup of staged images is best-effort.

use crate::error::LabdeskError;
use chrono::Utc;
use printpdf::{Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, RawImage, XObjectTransform};
use std::fs;
use std::path::PathBuf;

/// Upload extension allow-list. Anything else is discarded silently.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a)))
        .unwrap_or(false)
}

/// Reduce a client-supplied file name to a safe single path component.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub filename: String,
    pub path: PathBuf,
    pub pages: usize,
}

/// Owns the staging and output directories for report generation.
#[derive(Clone)]
pub struct ReportStore {
    upload_dir: PathBuf,
    pdf_dir: PathBuf,
}

impl ReportStore {
    pub fn new(upload_dir: impl Into<PathBuf>, pdf_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let upload_dir = upload_dir.into();
        let pdf_dir = pdf_dir.into();
        fs::create_dir_all(&upload_dir)?;
        fs::create_dir_all(&pdf_dir)?;
        Ok(Self {
            upload_dir,
            pdf_dir,
        })
    }

    /// Persist one accepted image under a collision-resistant name.
    pub fn stage_image(&self, original_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let stamp = Utc::now().format("%Y%m%d%H%M%S%6f");
        let path = self
            .upload_dir
            .join(format!("{stamp}_{}", sanitize_filename(original_name)));
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Concatenate the staged images, in order, into one PDF in the output
    /// directory, then delete the staged files (best-effort). Fails without
    /// writing anything if any image cannot be decoded.
    pub fn assemble_pdf(&self, staged: &[PathBuf]) -> Result<GeneratedReport, LabdeskError> {
        let mut images = Vec::with_capacity(staged.len());
        for path in staged {
            images.push(fs::read(path)?);
        }
        let bytes = images_to_pdf(&images).map_err(LabdeskError::Pdf)?;

        let filename = format!("Report_{}.pdf", Utc::now().format("%Y%m%d_%H%M%S%6f"));
        let path = self.pdf_dir.join(&filename);
        fs::write(&path, &bytes)?;

        for staged_path in staged {
            let _ = fs::remove_file(staged_path);
        }

        Ok(GeneratedReport {
            filename,
            path,
            pages: staged.len(),
        })
    }

    /// Resolve a previously generated PDF by bare file name. Path separators
    /// and traversal components are rejected outright.
    pub fn pdf_path(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty() || filename.contains(['/', '\\']) || filename.contains("..") {
            return None;
        }
        let path = self.pdf_dir.join(filename);
        path.is_file().then_some(path)
    }
}

/// Build a PDF with one page per image, each page sized to its image.
/// Any decode failure aborts the whole document.
pub fn images_to_pdf(images: &[Vec<u8>]) -> Result<Vec<u8>, String> {
    let mut doc = PdfDocument::new("Lab Report");
    let mut pages = Vec::with_capacity(images.len());

    for bytes in images {
        let mut warnings = Vec::new();
        let image = RawImage::decode_from_bytes(bytes, &mut warnings)
            .map_err(|e| format!("image decode failed: {e}"))?;
        let (width_mm, height_mm) = page_size_mm(image.width, image.height);
        let image_id = doc.add_image(&image);
        pages.push(PdfPage::new(
            Mm(width_mm),
            Mm(height_mm),
            vec![Op::UseXobject {
                id: image_id,
                // page size above is computed at the same density
                transform: XObjectTransform {
                    dpi: Some(96.0),
                    ..Default::default()
                },
            }],
        ));
    }

    let mut warnings = Vec::new();
    Ok(doc
        .with_pages(pages)
        .save(&PdfSaveOptions::default(), &mut warnings))
}

/// Page dimensions for an image rendered at 96 dpi.
fn page_size_mm(width_px: usize, height_px: usize) -> (f32, f32) {
    const MM_PER_PX: f32 = 25.4 / 96.0;
    (width_px as f32 * MM_PER_PX, height_px as f32 * MM_PER_PX)
}
