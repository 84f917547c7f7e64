pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod headless;
pub mod pages;
pub mod router;
pub mod session;
pub mod ui;
