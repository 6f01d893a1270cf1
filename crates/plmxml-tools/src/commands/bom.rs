use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::Table;
use plmxml::CancelToken;

use crate::accessors::{BomRow, DocumentAccessor};
use crate::utils::{diagnostics, file as file_utils};
use crate::{BomFormat, LoadArgs};

pub fn execute(
    args: &LoadArgs,
    format: BomFormat,
    output: Option<&Path>,
    cancel: &CancelToken,
) -> Result<()> {
    let doc = file_utils::load_document(args, cancel)?;
    let rows = DocumentAccessor::new(&doc).bom_rows();

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            write_rows(&rows, format, io::BufWriter::new(file))?;
            log::info!("Wrote {} BOM rows to {}", rows.len(), path.display());
        }
        None => write_rows(&rows, format, io::stdout().lock())?,
    }

    diagnostics::report(doc.diagnostics());
    Ok(())
}

pub fn write_rows<W: Write>(rows: &[BomRow], format: BomFormat, mut writer: W) -> Result<()> {
    match format {
        BomFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, rows)?;
            writeln!(writer)?;
        }
        BomFormat::Csv => write_csv(rows, &mut writer)?,
        BomFormat::Text => write_table(rows, &mut writer)?,
    }
    writer.flush()?;
    Ok(())
}

fn write_csv<W: Write>(rows: &[BomRow], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(BomRow::HEADERS)?;
    for row in rows {
        csv.write_record(row.record())?;
    }
    csv.flush()?;
    Ok(())
}

fn write_table<W: Write>(rows: &[BomRow], mut writer: W) -> io::Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(comfy_table::ContentArrangement::DynamicFullWidth);
    table.set_header(BomRow::HEADERS.to_vec());

    for row in rows {
        // Indent names so the hierarchy stays readable in a flat table
        let mut record = row.record();
        record[2] = format!("{}{}", "  ".repeat(row.level), record[2]);
        table.add_row(record.to_vec());
    }

    writeln!(writer, "{table}")
}
