//! File export and import.
//!
//! A `.cbo` file is the grid serialized as JSON, prefixed with a UTF-8 byte
//! order mark. Outlines are a zip archive with one JSON file per column,
//! listing each row title followed by the blocks in that row's cell.

use std::io::{Cursor, Write};
use std::path::Path;

use serde::Serialize;
use timeliner_api::{Block, Grid, Timeline};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

const BOM: char = '\u{feff}';

/// A file ready to be written or offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub contents: Vec<u8>,
}

/// Export the document's grid as `<name>.cbo`.
pub fn export_document(doc: &Timeline) -> Result<ExportFile> {
    let json = serde_json::to_string(&doc.data)?;
    let mut contents = String::with_capacity(json.len() + BOM.len_utf8());
    contents.push(BOM);
    contents.push_str(&json);

    Ok(ExportFile {
        filename: format!("{}.cbo", doc.display_name()),
        contents: contents.into_bytes(),
    })
}

/// Parse an exported (or hand-written) grid. A leading BOM is ignored.
pub fn import_grid(text: &str) -> Result<Grid> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    Ok(serde_json::from_str(text)?)
}

/// Document name for an imported file: the file name without its last
/// extension, or `untitled`.
pub fn import_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("untitled")
        .to_string()
}

/// One line of a column outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OutlineEntry<'a> {
    Row { title: &'a str },
    Block(&'a Block),
}

/// The outline of every column, in column order.
pub fn column_outlines(grid: &Grid) -> Vec<Vec<OutlineEntry<'_>>> {
    (0..grid.column_count())
        .map(|column| {
            grid.rows
                .iter()
                .flat_map(|row| {
                    let blocks = row.columns.get(column).into_iter().flatten();
                    std::iter::once(OutlineEntry::Row { title: &row.title })
                        .chain(blocks.map(OutlineEntry::Block))
                })
                .collect()
        })
        .collect()
}

/// Zip the column outlines into `<name>-outlines.zip`.
pub fn export_outlines(doc: &Timeline) -> Result<ExportFile> {
    let name = doc.display_name();
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for (i, outline) in column_outlines(&doc.data).iter().enumerate() {
        zip.start_file(format!("{name}-column-{}.json", i + 1), options)?;
        zip.write_all(&serde_json::to_vec_pretty(outline)?)?;
    }

    let contents = zip.finish()?.into_inner();
    tracing::debug!(bytes = contents.len(), "outline archive written");
    Ok(ExportFile {
        filename: format!("{name}-outlines.zip"),
        contents,
    })
}
