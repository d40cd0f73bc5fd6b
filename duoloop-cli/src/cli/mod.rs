pub mod args;
pub mod create;
pub mod settings;
pub mod simulate;
