pub mod engine;
pub mod event_bus;
pub mod history;
pub mod planner;
pub mod state;
pub mod stream;
