use anyhow::Result;
use colored::Colorize;
use plmxml::CancelToken;

use crate::LoadArgs;
use crate::accessors::DocumentAccessor;
use crate::utils::{diagnostics, file as file_utils};

pub fn execute(args: &LoadArgs, query: &str, cancel: &CancelToken) -> Result<()> {
    let doc = file_utils::load_document(args, cancel)?;
    let hits = DocumentAccessor::new(&doc).search(query);

    for hit in &hits {
        println!("{}", hit.path);
    }
    if hits.is_empty() {
        eprintln!("{}", format!("No nodes match '{query}'").dimmed());
    }

    diagnostics::report(doc.diagnostics());
    Ok(())
}
