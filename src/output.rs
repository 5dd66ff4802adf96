//! Writers for the `docindex` output formats.

use crate::controls::{OutputFormat, OutputOptions};
use crate::location::Location;
use crate::outline::outline;
use crate::store::IndexRecordStore;
use anyhow::{Context, Result};
use index_parser::IndexRecord;
use std::borrow::Cow;
use std::io::Write;

/// Writes `store` to `writer` in `format`, applying `options` first.
///
/// The manifest always describes the whole payload; the category filter does not apply to it.
pub fn write_store<W: Write>(
    writer: &mut W,
    store: &IndexRecordStore,
    format: OutputFormat,
    options: &OutputOptions,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let records = select_records(store, options)?;
            serde_json::to_writer_pretty(&mut *writer, &records)
                .context("failed to write JSON records")?;
            writeln!(writer)?;
        }
        OutputFormat::Jsonl => {
            for record in select_records(store, options)? {
                serde_json::to_writer(&mut *writer, &record)
                    .context("failed to write JSONL record")?;
                writeln!(writer)?;
            }
        }
        OutputFormat::Outline => {
            let records = select_records(store, options)?;
            write_outline(writer, records.iter().map(|record| &**record))?;
        }
        OutputFormat::Manifest => {
            serde_json::to_writer_pretty(&mut *writer, &store.manifest())
                .context("failed to write manifest")?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// Filters by category and, when a base URL is set, rewrites locations to absolute URLs.
///
/// Records are only cloned when their location changes.
pub fn select_records<'a>(
    store: &'a IndexRecordStore,
    options: &OutputOptions,
) -> Result<Vec<Cow<'a, IndexRecord>>> {
    let mut selected = Vec::new();
    for record in store.iterate() {
        if !options.is_category_selected(&record.category) {
            continue;
        }
        match options.base_url() {
            Some(base) => {
                let resolved = Location::parse(&record.location)
                    .resolve(base)
                    .with_context(|| format!("failed to resolve location {:?}", record.location))?;
                let mut owned = record.clone();
                owned.location = resolved.into();
                selected.push(Cow::Owned(owned));
            }
            None => selected.push(Cow::Borrowed(record)),
        }
    }
    Ok(selected)
}

/// Renders the page/section tree, one page per block.
///
/// ```text
/// Home (/)
///   # Intro
///   3 body entries
/// ```
pub fn write_outline<'a, W, I>(writer: &mut W, records: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a IndexRecord>,
{
    for page in outline(records) {
        let path = if page.path.is_empty() { "/" } else { page.path };
        writeln!(writer, "{} ({})", page.page, path)?;
        for title in page.section_titles() {
            writeln!(writer, "  # {title}")?;
        }
        match page.body.len() {
            0 => {}
            1 => writeln!(writer, "  1 body entry")?,
            n => writeln!(writer, "  {n} body entries")?,
        }
    }
    Ok(())
}
