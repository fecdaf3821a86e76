// Adapters layer: concrete implementations of the domain ports (http source, local files).

pub mod fs;
pub mod http;
