pub mod fs;
pub mod ui;

pub use crate::fs::save;
