pub mod fetcher;
pub mod release;
