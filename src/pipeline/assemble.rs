//! PDF assembly: one page per slide image, sized to the image.
//!
//! Built directly with lopdf: each page holds a single RGB image XObject
//! scaled to the full media box. Nothing time- or randomness-dependent is
//! written (no creation date, no document ID), so identical slides always
//! produce identical bytes.

use crate::error::DeckError;
use crate::pipeline::postprocess::SlideImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

const PRODUCER: &str = concat!("slides2pdf ", env!("CARGO_PKG_VERSION"));

/// Build the PDF in memory.
///
/// Pages appear in input order. `dpi` converts pixels to points. Each bitmap
/// is moved into its image stream and deflated as soon as it is added, so
/// only one slide is held uncompressed at a time.
pub fn assemble_pdf(
    slides: Vec<SlideImage>,
    title: Option<&str>,
    dpi: u32,
) -> Result<Vec<u8>, DeckError> {
    if slides.is_empty() {
        return Err(DeckError::PdfAssembly {
            detail: "no slides to assemble".into(),
        });
    }
    let dpi = dpi.max(1) as f32;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(slides.len());

    for slide in slides {
        let (w, h) = slide.image.dimensions();
        let (w_pt, h_pt) = (w as f32 * 72.0 / dpi, h as f32 * 72.0 / dpi);
        let index = slide.index;

        let mut image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(w),
                "Height" => i64::from(h),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            slide.image.into_raw(),
        );
        image.compress().map_err(|e| DeckError::PdfAssembly {
            detail: format!("slide {index}: {e}"),
        })?;
        let image_id = doc.add_object(image);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        w_pt.into(),
                        Object::Integer(0),
                        Object::Integer(0),
                        h_pt.into(),
                        Object::Integer(0),
                        Object::Integer(0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content.encode().map_err(|e| DeckError::PdfAssembly {
            detail: format!("slide {index}: {e}"),
        })?;
        let content_id = doc.add_object(Stream::new(lopdf::Dictionary::new(), encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), w_pt.into(), h_pt.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
        });
        kids.push(page_id.into());
        debug!("Page {} ← slide {} ({}x{} px)", kids.len(), index, w, h);
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut info = dictionary! { "Producer" => Object::string_literal(PRODUCER) };
    if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
        info.set("Title", text_string(title.trim()));
    }
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", info_id);

    doc.compress();

    let mut buf = Vec::new();
    doc.save_to(&mut buf).map_err(|e| DeckError::PdfAssembly {
        detail: e.to_string(),
    })?;
    info!("Assembled {} pages ({} bytes)", count, buf.len());
    Ok(buf)
}

/// Write `bytes` to `path` atomically (temp file in the same directory, then rename).
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DeckError> {
    let write_err = |source: std::io::Error| DeckError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    std::fs::create_dir_all(parent_dir(path)).map_err(write_err)?;

    let mut tmp = sibling_temp_file(path, ".deck-").map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Temp file next to `dest` that will be renamed over it.
///
/// Gets the mode a plain write would: the destination's current mode if it
/// exists, else 0666 minus the umask.
pub(crate) fn sibling_temp_file(dest: &Path, prefix: &str) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(prefix).suffix(".pdf");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let tmp = builder.tempfile_in(parent_dir(dest))?;
    if let Ok(meta) = std::fs::metadata(dest) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }
    Ok(tmp)
}

pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn text_string(s: &str) -> Object {
    if s.is_ascii() {
        return Object::string_literal(s);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

// ── File naming ──────────────────────────────────────────────────────────

static RE_NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9-]+").unwrap());

/// File name for a deck: the page title's letters, else a slug of the URL.
pub fn deck_file_name(title: Option<&str>, url: &str) -> String {
    let from_title: String = title
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect();
    if !from_title.is_empty() {
        return format!("{from_title}.pdf");
    }

    let stem = reqwest::Url::parse(url)
        .ok()
        .map(|u| {
            let host = u.host_str().unwrap_or_default().trim_start_matches("www.").to_string();
            let last = u
                .path_segments()
                .and_then(|mut s| s.rfind(|seg| !seg.is_empty() && *seg != "pub"))
                .unwrap_or_default()
                .to_string();
            let raw = if last.is_empty() { host } else { format!("{host}-{last}") };
            RE_NON_SLUG
                .replace_all(&raw, "-")
                .trim_matches('-')
                .to_string()
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "deck".to_string());
    format!("{stem}.pdf")
}
