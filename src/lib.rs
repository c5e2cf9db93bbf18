pub mod commands;
pub mod config;
pub mod db;
pub mod llm;
pub mod models;
pub mod plan;
pub mod progression;
pub mod store;
pub mod tracking;

#[cfg(test)]
mod test_utils;
