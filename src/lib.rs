#[macro_use]
mod macros;

pub mod api;
pub mod parser;
pub mod report;
pub mod schema;
pub mod template;
