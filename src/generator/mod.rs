pub mod backend;
pub mod command;
pub mod error;
pub mod flow;
