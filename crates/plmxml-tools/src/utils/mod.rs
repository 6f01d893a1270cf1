pub mod color;
pub mod diagnostics;
pub mod file;
