use crate::error::CrawlError;
use std::fs;
use std::path::Path;

/// Write a page to disk, creating parent directories and replacing any previous file
pub fn write_page(path: &Path, html: &str) -> Result<(), CrawlError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CrawlError::io(parent, e))?;
    }
    fs::write(path, html).map_err(|e| CrawlError::io(path, e))?;

    ::log::debug!("Wrote {} bytes to {}", html.len(), path.display());
    Ok(())
}
