pub mod check;
pub mod loader;
pub mod query;

#[cfg(test)]
mod query_tests;
