//! Text rendering of a ledger summary.

use mdcledger::LedgerSummary;
use std::io::{self, Write};

pub fn render<W: Write>(summary: &LedgerSummary, out: &mut W) -> io::Result<()> {
    match &summary.banner {
        Some(label) => writeln!(out, "Summary  {label}")?,
        None => writeln!(out, "Summary")?,
    }
    writeln!(out, "  Total Duration: {}", summary.total_duration)?;
    writeln!(out, "  Total Charge:   ${}", summary.total_charge)?;
    writeln!(out, "  Rate:           ${}/min", summary.rate_per_minute)?;
    writeln!(out)?;

    if summary.is_empty() {
        writeln!(out, "No files uploaded")?;
        writeln!(out, "Upload files to get started")?;
        return Ok(());
    }

    writeln!(out, "Uploaded Files ({})", summary.file_count)?;
    let width = summary
        .entries
        .iter()
        .map(|e| e.name.chars().count())
        .max()
        .unwrap_or(0);
    for row in &summary.entries {
        writeln!(
            out,
            "  [{:<5}] {:<width$}  {:>8}  {}",
            row.kind.as_str(),
            row.name,
            row.duration.to_string(),
            row.id,
        )?;
    }
    Ok(())
}

pub fn render_json<W: Write>(summary: &LedgerSummary, out: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, summary)?;
    writeln!(out)
}
