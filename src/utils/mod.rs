pub mod header;
pub mod pagination;
pub mod validation;
