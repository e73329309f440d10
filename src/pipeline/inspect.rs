//! Read metadata back from a PDF: title, page count, text-layer pages.
//!
//! A page counts as having a text layer when its resources reference a font,
//! either directly or through a form XObject. ocrmypdf grafts its invisible
//! text as a form XObject, so both paths matter.

use crate::error::DeckError;
use crate::output::DocumentMetadata;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::Path;
use tracing::debug;

/// Form XObjects nest; this bounds the walk on malformed files.
const MAX_FORM_DEPTH: usize = 8;

/// Extract metadata from a PDF file without rendering it.
pub async fn extract_metadata(pdf_path: &Path) -> Result<DocumentMetadata, DeckError> {
    let path = pdf_path.to_path_buf();
    tokio::task::spawn_blocking(move || extract_metadata_blocking(&path))
        .await
        .map_err(|e| DeckError::Internal(format!("Metadata task panicked: {}", e)))?
}

/// Blocking implementation of metadata extraction.
pub fn extract_metadata_blocking(pdf_path: &Path) -> Result<DocumentMetadata, DeckError> {
    if !pdf_path.exists() {
        return Err(DeckError::FileNotFound {
            path: pdf_path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(pdf_path).map_err(|e| DeckError::CorruptPdf {
        path: pdf_path.to_path_buf(),
        detail: e.to_string(),
    })?;
    metadata_from_bytes(&bytes).map_err(|detail| DeckError::CorruptPdf {
        path: pdf_path.to_path_buf(),
        detail,
    })
}

/// Metadata of an in-memory PDF.
pub fn metadata_from_bytes(bytes: &[u8]) -> Result<DocumentMetadata, String> {
    let doc = Document::load_mem(bytes).map_err(|e| e.to_string())?;
    let pages = doc.get_pages();

    let text_layer_pages = pages
        .values()
        .filter(|&&id| page_has_fonts(&doc, id))
        .count();
    debug!("{} of {} pages carry fonts", text_layer_pages, pages.len());

    let info = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|o| resolve(&doc, o))
        .and_then(|o| o.as_dict().ok());
    let info_text = |key: &[u8]| -> Option<String> {
        info.and_then(|d| d.get(key).ok())
            .and_then(|o| resolve(&doc, o))
            .and_then(decode_text_string)
            .filter(|s| !s.is_empty())
    };

    Ok(DocumentMetadata {
        title: info_text(b"Title"),
        producer: info_text(b"Producer"),
        page_count: pages.len(),
        pdf_version: doc.version.clone(),
        text_layer_pages,
    })
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn page_has_fonts(doc: &Document, page_id: ObjectId) -> bool {
    // Resources may be inherited from an ancestor Pages node.
    let mut node = doc.get_dictionary(page_id).ok();
    while let Some(dict) = node {
        if let Some(res) = dict
            .get(b"Resources")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_dict().ok())
        {
            return resources_have_fonts(doc, res, 0);
        }
        node = dict
            .get(b"Parent")
            .ok()
            .and_then(|o| o.as_reference().ok())
            .and_then(|id| doc.get_dictionary(id).ok());
    }
    false
}

fn resources_have_fonts(doc: &Document, resources: &Dictionary, depth: usize) -> bool {
    let has_direct = resources
        .get(b"Font")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .is_some_and(|fonts| !fonts.is_empty());
    if has_direct {
        return true;
    }
    if depth >= MAX_FORM_DEPTH {
        return false;
    }

    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
    else {
        return false;
    };

    xobjects.iter().any(|(_, obj)| {
        let Some(Object::Stream(stream)) = resolve(doc, obj) else {
            return false;
        };
        let is_form = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            == Some(b"Form".as_slice());
        is_form
            && stream
                .dict
                .get(b"Resources")
                .ok()
                .and_then(|o| resolve(doc, o))
                .and_then(|o| o.as_dict().ok())
                .is_some_and(|res| resources_have_fonts(doc, res, depth + 1))
    })
}

/// Decode a PDF text string (UTF-16BE with BOM, else byte-per-char).
fn decode_text_string(obj: &Object) -> Option<String> {
    let Object::String(bytes, _) = obj else {
        return None;
    };
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return Some(String::from_utf16_lossy(&units));
    }
    Some(bytes.iter().map(|&b| b as char).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::assemble::assemble_pdf;
    use crate::pipeline::postprocess::SlideImage;
    use image::{Rgb, RgbImage};
    use lopdf::{dictionary, Stream};

    fn slides(n: usize) -> Vec<SlideImage> {
        (1..=n)
            .map(|i| SlideImage {
                index: i,
                image: RgbImage::from_pixel(16, 9, Rgb([i as u8 * 20, 0, 0])),
                cropped: false,
            })
            .collect()
    }

    #[test]
    fn reads_back_assembled_deck() {
        let bytes = assemble_pdf(slides(4), Some("Café Pitch"), 100).unwrap();
        let meta = metadata_from_bytes(&bytes).unwrap();
        assert_eq!(meta.page_count, 4);
        assert_eq!(meta.title.as_deref(), Some("Café Pitch"));
        assert!(meta.producer.unwrap().starts_with("slides2pdf"));
        assert_eq!(meta.pdf_version, "1.5");
        assert_eq!(meta.text_layer_pages, 0);
    }

    #[test]
    fn detects_fonts_inside_form_xobjects() {
        let bytes = assemble_pdf(slides(2), None, 100).unwrap();
        let mut doc = Document::load_mem(&bytes).unwrap();

        // Graft a text layer onto page 1 the way ocrmypdf does.
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let form_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(10), Object::Integer(10)],
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            },
            b"BT 3 Tr /F1 12 Tf (hi) Tj ET".to_vec(),
        ));
        let page1 = doc.get_pages()[&1];
        let page = doc.get_object_mut(page1).unwrap().as_dict_mut().unwrap();
        let resources = page.get_mut(b"Resources").unwrap().as_dict_mut().unwrap();
        let xobjects = resources.get_mut(b"XObject").unwrap().as_dict_mut().unwrap();
        xobjects.set("TxT0", form_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        let meta = metadata_from_bytes(&out).unwrap();
        assert_eq!(meta.page_count, 2);
        assert_eq!(meta.text_layer_pages, 1);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = extract_metadata_blocking(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, DeckError::FileNotFound { .. }));
    }

    #[test]
    fn garbage_is_corrupt() {
        assert!(metadata_from_bytes(b"%PDF-1.4 garbage").is_err());
    }
}
