pub mod build;
pub mod migrate;
pub mod search;
pub mod stats;
