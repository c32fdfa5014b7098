mod app;
mod cli;
mod config;
mod effects;
mod logging;
mod session;

pub use app::run;
