pub mod build_config;
pub mod runtime_config;
