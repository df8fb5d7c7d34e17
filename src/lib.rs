pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;
pub mod matrix;
#[cfg(test)]
mod test_support;
pub mod ui;
pub mod usecases;
