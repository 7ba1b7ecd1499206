pub mod render;
pub mod setup;
pub mod show;
pub mod symbols;
pub mod ui;
pub mod watch;
