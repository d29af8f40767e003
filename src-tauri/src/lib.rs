pub mod core;
pub mod desktop_app;
pub mod shell;
