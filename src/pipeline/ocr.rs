//! OCR pass: add an invisible text layer with `ocrmypdf`.
//!
//! The tool writes to a temp file next to the assembled PDF, which replaces
//! the original only after a successful exit. Any failure leaves the
//! assembled PDF exactly as it was and is reported as an [`OcrOutcome`],
//! never as a fatal error.

use crate::config::CaptureConfig;
use crate::error::OcrError;
use crate::output::OcrOutcome;
use crate::pipeline::assemble::sibling_temp_file;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Keep only the end of the tool's stderr; the last lines carry the reason.
const STDERR_TAIL_CHARS: usize = 600;

/// Run OCR over `pdf_path` in place.
pub async fn run_ocr(pdf_path: &Path, config: &CaptureConfig) -> OcrOutcome {
    match ocr_in_place(pdf_path, config).await {
        Ok(()) => {
            info!("OCR text layer added to {}", pdf_path.display());
            OcrOutcome::Applied
        }
        Err(e) => {
            warn!("OCR failed, keeping the PDF without a text layer: {e}");
            OcrOutcome::Failed(e)
        }
    }
}

async fn ocr_in_place(pdf_path: &Path, config: &CaptureConfig) -> Result<(), OcrError> {
    let io_err = |e: std::io::Error| OcrError::Io {
        detail: e.to_string(),
    };
    let tmp = sibling_temp_file(pdf_path, ".ocr-").map_err(io_err)?;

    let args = ocr_args(pdf_path, tmp.path(), config.ocr_language.as_deref());
    debug!("Running {} {:?}", config.ocr_binary, args);

    let output = Command::new(&config.ocr_binary)
        .args(&args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => OcrError::ToolMissing {
                tool: config.ocr_binary.clone(),
            },
            _ => io_err(e),
        })?;

    if !output.status.success() {
        return Err(OcrError::Failed {
            status: output.status.to_string(),
            stderr: stderr_tail(&output.stderr),
        });
    }

    // The tool may have recreated its output file; restore the deck's mode.
    let perms = std::fs::metadata(pdf_path).map_err(io_err)?.permissions();
    std::fs::set_permissions(tmp.path(), perms).map_err(io_err)?;
    tmp.persist(pdf_path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// Command-line arguments for ocrmypdf.
///
/// `--output-type pdf` keeps the original image streams instead of
/// converting to PDF/A, so the visual appearance is unchanged.
pub fn ocr_args(input: &Path, output: &Path, language: Option<&str>) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--output-type".into(), "pdf".into()];
    if let Some(lang) = language.filter(|l| !l.trim().is_empty()) {
        args.push("-l".into());
        args.push(lang.trim().into());
    }
    args.push(input.as_os_str().to_owned());
    args.push(output.as_os_str().to_owned());
    args
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let count = text.chars().count();
    if count <= STDERR_TAIL_CHARS {
        return text.to_string();
    }
    let tail: String = text.chars().skip(count - STDERR_TAIL_CHARS).collect();
    format!("\u{2026}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_without_language() {
        let args = ocr_args(Path::new("in.pdf"), Path::new("out.pdf"), None);
        assert_eq!(args, vec!["--output-type", "pdf", "in.pdf", "out.pdf"]);
    }

    #[test]
    fn args_with_language() {
        let args = ocr_args(Path::new("in.pdf"), Path::new("out.pdf"), Some("eng+deu"));
        assert_eq!(
            args,
            vec!["--output-type", "pdf", "-l", "eng+deu", "in.pdf", "out.pdf"]
        );
    }

    #[test]
    fn stderr_is_truncated_from_the_front() {
        let long = "x".repeat(STDERR_TAIL_CHARS + 50) + "reason";
        let tail = stderr_tail(long.as_bytes());
        assert!(tail.ends_with("reason"));
        assert_eq!(tail.chars().count(), STDERR_TAIL_CHARS + 1);
    }

    #[tokio::test]
    async fn missing_tool_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("deck.pdf");
        std::fs::write(&pdf, b"%PDF-1.5 original").unwrap();

        let config = CaptureConfig::builder()
            .ocr_binary("slides2pdf-no-such-ocr-tool")
            .build()
            .unwrap();
        let outcome = run_ocr(&pdf, &config).await;

        assert_eq!(
            outcome,
            OcrOutcome::Failed(OcrError::ToolMissing {
                tool: "slides2pdf-no-such-ocr-tool".into()
            })
        );
        assert_eq!(std::fs::read(&pdf).unwrap(), b"%PDF-1.5 original");
        // The temp output was cleaned up.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_tool_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("deck.pdf");
        std::fs::write(&pdf, b"%PDF-1.5 original").unwrap();

        let config = CaptureConfig::builder().ocr_binary("false").build().unwrap();
        let outcome = run_ocr(&pdf, &config).await;

        assert!(matches!(outcome, OcrOutcome::Failed(OcrError::Failed { .. })));
        assert_eq!(std::fs::read(&pdf).unwrap(), b"%PDF-1.5 original");
    }

    /// Stand-in for ocrmypdf: copies its input with a marker appended.
    #[cfg(unix)]
    fn fake_ocr_tool(dir: &Path) -> String {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-ocrmypdf");
        std::fs::write(
            &script,
            "#!/bin/sh\nfor arg; do in=$out; out=$arg; done\n\
             cat \"$in\" > \"$out\" && printf ' +text' >> \"$out\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_tool_replaces_pdf_in_place() {
        use std::os::unix::fs::PermissionsExt;

        let tools = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("deck.pdf");
        std::fs::write(&pdf, b"%PDF-1.5 original").unwrap();
        std::fs::set_permissions(&pdf, std::fs::Permissions::from_mode(0o644)).unwrap();

        let config = CaptureConfig::builder()
            .ocr_binary(fake_ocr_tool(tools.path()))
            .ocr_language("eng")
            .build()
            .unwrap();
        let outcome = run_ocr(&pdf, &config).await;

        assert_eq!(outcome, OcrOutcome::Applied);
        assert_eq!(std::fs::read(&pdf).unwrap(), b"%PDF-1.5 original +text");
        let mode = std::fs::metadata(&pdf).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
        // Only the deck remains; the temp output was renamed over it.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
