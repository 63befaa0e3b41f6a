pub mod context;
pub mod index;
pub mod schema;
pub mod source;
