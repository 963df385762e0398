// Gallery (result cache) module
// Author: kelexine (https://github.com/kelexine)

pub mod manager;
pub mod models;
pub mod storage;

pub use manager::ResultCache;
pub use models::{ArtifactKind, CacheEntry, GenerationResult};
pub use storage::{FileStorage, MemoryStorage, Storage};

/// Storage key the gallery lives under.
pub const STORAGE_KEY: &str = "generatedImages";

/// Number of most recent artifacts kept by default.
pub const DEFAULT_CAPACITY: usize = 20;
