pub mod openrouter;

pub use openrouter::{scan_for_array, ArrayScan, OpenRouterClient};
