pub mod descriptor;
pub mod store;
