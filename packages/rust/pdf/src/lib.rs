//! PDF document processing for docintel.
//!
//! Turns a PDF file into a [`DocumentRecord`]: title, heading outline and
//! per-page text. The analysis engine never touches PDF bytes; it only sees
//! the records produced here.

mod backend;
mod outline;
mod text;

use std::path::Path;

use docintel_shared::{DocumentRecord, Result};

pub use backend::LopdfProcessor;
pub use outline::{RawOutlineEntry, outline_from_entries};
pub use text::{clean_page_text, decode_pdf_string};

/// Source of extracted document structure.
///
/// Implementations must be usable from blocking worker threads.
pub trait DocumentProcessor: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Extract the structure of the PDF at `path`.
    fn process(&self, path: &Path) -> Result<DocumentRecord>;
}
