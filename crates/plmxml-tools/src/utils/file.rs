use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use plmxml::{CancelToken, Plmxml, Source};

use crate::LoadArgs;

/// Read a PLMXML file, automatically decompressing if it's a .zst file
pub fn read_plmxml_bytes(path: &Path) -> Result<Vec<u8>> {
    if path.extension().and_then(|s| s.to_str()) == Some("zst") {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open compressed file: {:?}", path))?;

        let mut decoder = zstd::Decoder::new(file).context("Failed to create zstd decoder")?;
        let mut content = Vec::new();
        decoder
            .read_to_end(&mut content)
            .context("Failed to decompress file")?;

        Ok(content)
    } else {
        std::fs::read(path).with_context(|| format!("Failed to read file: {:?}", path))
    }
}

/// Load and build a document with the flags given on the command line
pub fn load_document(args: &LoadArgs, cancel: &CancelToken) -> Result<Plmxml> {
    let bytes = read_plmxml_bytes(&args.file)?;

    let mut source = Source::new(&bytes);
    if let Some(dir) = args.file.parent() {
        source = source.with_base_dir(dir);
    }

    let doc = Plmxml::load(source, &args.build_options(), cancel)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    log::debug!(
        "Loaded {}: {} nodes, {} diagnostics",
        args.file.display(),
        doc.tree().len(),
        doc.diagnostics().len()
    );
    Ok(doc)
}
