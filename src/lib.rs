pub mod app;
pub mod cache;
pub mod config;
pub mod fetch;
pub mod humanize;
pub mod observability;
pub mod parsers;
pub mod providers;

#[cfg(test)]
mod test_utils;
