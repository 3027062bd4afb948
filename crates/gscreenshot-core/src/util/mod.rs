// Utility modules

pub mod cache;
pub mod desktop;
pub mod detect;
pub mod encode;
pub mod filename;
pub mod scaling;
pub mod temp_files;
