use log::debug;
use lopdf::Document;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("failed to load PDF: {0}")]
    Load(#[from] lopdf::Error),

    #[error("failed to extract text from page {page}: {reason}")]
    Page { page: u32, reason: String },

    #[error("the PDF contains no extractable text")]
    NoText,
}

/// Text of every page of the PDF in `bytes`, in page order.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let document = Document::load_mem(bytes)?;
    let pages = document.get_pages();
    debug!("Loaded PDF with {} pages ({} bytes)", pages.len(), bytes.len());

    let mut text = String::new();
    for page in pages.keys() {
        let page_text = document
            .extract_text(&[*page])
            .map_err(|e| ExtractionError::Page {
                page: *page,
                reason: e.to_string(),
            })?;
        text.push_str(&page_text);
    }

    if text.trim().is_empty() {
        return Err(ExtractionError::NoText);
    }
    Ok(text)
}
