pub mod suggestions;
pub mod usage;
