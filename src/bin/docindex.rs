use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;
use docindex::{write_store, Cli, IndexRecordStore};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let options = cli.output_options()?;

    let store = if cli.reads_stdin() {
        IndexRecordStore::from_reader(io::stdin().lock())
            .context("failed to load search index from stdin")?
    } else {
        IndexRecordStore::from_path(&cli.input)
            .with_context(|| format!("failed to load search index {}", cli.input.display()))?
    };
    eprintln!(
        "loaded {} records ({} pages) from {}",
        store.len(),
        store.pages().len(),
        cli.input.display()
    );

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    write_store(&mut writer, &store, cli.format, &options)?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}
