pub mod page_cache;
pub mod tagged_cache;

pub use page_cache::{CachedPage, PageCache, RevalidateType};
pub use tagged_cache::{CacheSource, Tagged, TaggedCache};
