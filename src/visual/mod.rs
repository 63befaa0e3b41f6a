pub mod locator;
pub mod machine;
pub mod paint;
pub mod state;
