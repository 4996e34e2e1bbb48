//! Page selection for rasterization and collection of rendered pages.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use toolbite_core::TransformError;

/// Value of the `pages` option that selects every page.
pub const ALL_PAGES: &str = "-1";

/// File name prefix every rasterizer uses for its output.
pub const PAGE_FILE_PREFIX: &str = "page-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSelection {
    All,
    /// 1-based page numbers, sorted and deduplicated.
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Parse the `pages` option: absent, empty or `-1` selects every page,
    /// otherwise a comma separated list of 1-based page numbers.
    pub fn parse(raw: Option<&str>) -> Result<Self, TransformError> {
        let raw = match raw.map(str::trim) {
            None | Some("") | Some(ALL_PAGES) => return Ok(PageSelection::All),
            Some(raw) => raw,
        };

        let mut pages = raw
            .split(',')
            .map(|part| match part.trim().parse::<u32>() {
                Ok(page) if page > 0 => Ok(page),
                _ => Err(TransformError::validation(format!(
                    "Invalid page number '{}': pages must be -1 or a comma separated list of page numbers",
                    part.trim()
                ))),
            })
            .collect::<Result<Vec<u32>, TransformError>>()?;

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, PageSelection::All)
    }
}

pub fn page_file_name(page: u32) -> String {
    format!("{}{}.png", PAGE_FILE_PREFIX, page)
}

/// Page number of a rasterizer output file. Accepts zero-padded numbers.
fn page_number(path: &Path) -> Option<u32> {
    let name = path.file_name()?.to_str()?;
    name.strip_prefix(PAGE_FILE_PREFIX)?
        .strip_suffix(".png")?
        .parse()
        .ok()
}

/// Rendered page files in `dir`, in page order.
pub async fn collect_pages(dir: &Path) -> Result<Vec<(u32, PathBuf)>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read output directory {}", dir.display()))?;

    let mut pages = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if let Some(page) = page_number(&path) {
            pages.push((page, path));
        }
    }

    pages.sort_by_key(|(page, _)| *page);
    Ok(pages)
}
