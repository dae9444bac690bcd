pub mod config;
pub mod data_types;
pub mod identifier;
pub mod logging;
pub mod manager;
pub mod metadata;
pub mod parser;
pub mod refresh;
pub mod rows;

#[cfg(test)]
pub(crate) mod testutils;
