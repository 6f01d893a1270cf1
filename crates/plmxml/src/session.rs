use std::path::Path;

use crate::{BuildOptions, CancelToken, Plmxml, Result, Source};

/// The currently open document
///
/// A new document replaces the current one only once it is completely
/// built. A failed or cancelled load leaves the previous document (or the
/// "nothing open" state) untouched.
#[derive(Debug, Default)]
pub struct Session {
    current: Option<Plmxml>,
    options: BuildOptions,
}

impl Session {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            current: None,
            options,
        }
    }

    pub fn current(&self) -> Option<&Plmxml> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: BuildOptions) {
        self.options = options;
    }

    pub fn open(&mut self, path: impl AsRef<Path>, cancel: &CancelToken) -> Result<&Plmxml> {
        let path = path.as_ref();
        log::debug!("Opening {}", path.display());
        let doc = Plmxml::load_file(path, &self.options, cancel)?;
        Ok(&*self.current.insert(doc))
    }

    pub fn load<'a>(&mut self, source: impl Into<Source<'a>>, cancel: &CancelToken) -> Result<&Plmxml> {
        let doc = Plmxml::load(source, &self.options, cancel)?;
        Ok(&*self.current.insert(doc))
    }

    /// Drop the current document
    pub fn close(&mut self) -> Option<Plmxml> {
        self.current.take()
    }
}
