pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{FailingReader, init_tracing, open_cache, seeded_bytes};
