pub mod files;
pub mod logs;
pub mod paths;
pub mod progress;
pub mod utils;
