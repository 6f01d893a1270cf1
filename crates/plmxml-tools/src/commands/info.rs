use anyhow::Result;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, Color, Table};
use plmxml::CancelToken;

use crate::accessors::{DocumentAccessor, DocumentSummary};
use crate::utils::{color::heading, diagnostics, file as file_utils};
use crate::{LoadArgs, OutputFormat};

pub fn execute(args: &LoadArgs, format: OutputFormat, cancel: &CancelToken) -> Result<()> {
    let doc = file_utils::load_document(args, cancel)?;
    let accessor = DocumentAccessor::new(&doc);
    let summary = accessor.summary();

    match format {
        OutputFormat::Text => {
            output_text(&summary);
            diagnostics::report(doc.diagnostics());
        }
        // Diagnostics are part of the JSON document
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

fn output_text(summary: &DocumentSummary) {
    println!("{}", heading("Document Summary"));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);

    let fields = [
        ("Schema Version", summary.schema_version.clone()),
        ("Author", summary.author.clone()),
        ("Exported", summary.exported.clone()),
        ("Transfer Context", summary.transfer_context.clone()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            table.add_row(vec![Cell::new(label).fg(Color::Cyan), Cell::new(value)]);
        }
    }

    if !summary.views.is_empty() {
        table.add_row(vec![
            Cell::new("Views").fg(Color::Cyan),
            Cell::new(summary.views.join(", ")),
        ]);
    }
    table.add_row(vec![
        Cell::new("Roots").fg(Color::Cyan),
        Cell::new(summary.roots.join(", ")),
    ]);
    table.add_row(vec![
        Cell::new("Tree Nodes").fg(Color::Cyan),
        Cell::new(summary.nodes.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Items").fg(Color::Cyan),
        Cell::new(summary.items.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Datasets").fg(Color::Cyan),
        Cell::new(summary.datasets.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Diagnostics").fg(Color::Cyan),
        Cell::new(summary.diagnostics.len().to_string()),
    ]);
    println!("{table}");

    if !summary.elements.is_empty() {
        println!();
        println!("{}", heading("Elements"));

        let mut elements = Table::new();
        elements.load_preset(UTF8_FULL_CONDENSED);
        elements.set_header(vec!["Kind", "Count"]);
        for entry in &summary.elements {
            elements.add_row(vec![
                Cell::new(entry.kind).fg(Color::Cyan),
                Cell::new(entry.count.to_string()),
            ]);
        }
        println!("{elements}");
    }

    if !summary.diagnostic_counts.is_empty() {
        println!();
        println!("{}", heading("Diagnostics"));

        let mut counts = Table::new();
        counts.load_preset(UTF8_FULL_CONDENSED);
        counts.set_header(vec!["Kind", "Count"]);
        for entry in &summary.diagnostic_counts {
            counts.add_row(vec![
                Cell::new(entry.kind).fg(Color::Yellow),
                Cell::new(entry.count.to_string()),
            ]);
        }
        println!("{counts}");
    }
}
