pub mod bom;
pub mod info;
pub mod search;
pub mod tree;
