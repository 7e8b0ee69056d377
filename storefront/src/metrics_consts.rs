pub const CACHE_HIT_COUNTER: &str = "storefront_cache_hit_total";
pub const CACHE_MISS_COUNTER: &str = "storefront_cache_miss_total";
pub const CACHE_INVALIDATION_COUNTER: &str = "storefront_cache_invalidation_total";
pub const REQUEST_REWRITE_COUNTER: &str = "storefront_request_rewrite_total";
pub const OVERRIDE_COOKIE_REJECTED_COUNTER: &str = "storefront_override_cookie_rejected_total";
pub const INVALID_FLAG_CODE_COUNTER: &str = "storefront_invalid_flag_code_total";
pub const PRERENDERED_PAGES_GAUGE: &str = "storefront_prerendered_pages";
