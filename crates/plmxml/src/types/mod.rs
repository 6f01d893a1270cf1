pub mod dataset;
pub mod element;
pub mod header;
pub mod item;
pub mod node;

#[allow(ambiguous_glob_reexports)]
pub use dataset::*;
#[allow(ambiguous_glob_reexports)]
pub use element::*;
#[allow(ambiguous_glob_reexports)]
pub use header::*;
#[allow(ambiguous_glob_reexports)]
pub use item::*;
#[allow(ambiguous_glob_reexports)]
pub use node::*;
