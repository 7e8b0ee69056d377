use envconfig::Envconfig;
use once_cell::sync::Lazy;
use std::net::SocketAddr;
use std::ops::Deref;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlexBool(pub bool);

impl FromStr for FlexBool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(FlexBool(true)),
            "false" | "0" | "no" | "off" | "" => Ok(FlexBool(false)),
            _ => Err(format!("Invalid boolean value: {}", s)),
        }
    }
}

impl From<FlexBool> for bool {
    fn from(flex: FlexBool) -> Self {
        flex.0
    }
}

impl Deref for FlexBool {
    type Target = bool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Product ids whose detail pages get rendered for every flag combination at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductIdList(pub Vec<String>);

impl FromStr for ProductIdList {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            return Ok(ProductIdList(Vec::new()));
        }

        let mut ids: Vec<String> = Vec::new();
        for part in s.split(',').map(|p| p.trim()) {
            if part.is_empty() {
                return Err(format!("Invalid product id list: {}", s));
            }
            if !ids.iter().any(|id| id == part) {
                ids.push(part.to_string());
            }
        }
        Ok(ProductIdList(ids))
    }
}

impl Deref for ProductIdList {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(default = "127.0.0.1:3000")]
    pub address: SocketAddr,

    // Keys both the override cookie encryption and the flag code signature.
    // Empty means a random secret is generated per process.
    #[envconfig(from = "FLAGS_SECRET", default = "")]
    pub flags_secret: String,

    #[envconfig(from = "SECURE_COOKIES", default = "false")]
    pub secure_cookies: FlexBool,

    #[envconfig(default = "1000")]
    pub max_concurrency: usize,

    #[envconfig(default = "false")]
    pub enable_metrics: bool,

    #[envconfig(from = "CACHE_MAX_ENTRIES", default = "10000")]
    pub cache_max_entries: u64,

    #[envconfig(from = "PAGE_CACHE_TTL_SECONDS", default = "900")]
    pub page_cache_ttl_seconds: u64,

    #[envconfig(from = "PRERENDER_PRODUCT_IDS", default = "1,2,3")]
    pub prerender_product_ids: ProductIdList,

    #[envconfig(from = "DEBUG", default = "false")]
    pub debug: FlexBool,

    #[envconfig(from = "OTEL_URL")]
    pub otel_url: Option<String>,

    #[envconfig(from = "OTEL_SAMPLING_RATE", default = "1.0")]
    pub otel_sampling_rate: f64,

    #[envconfig(from = "OTEL_SERVICE_NAME", default = "storefront")]
    pub otel_service_name: String,

    #[envconfig(from = "OTEL_EXPORT_TIMEOUT_SECS", default = "3")]
    pub otel_export_timeout_secs: u64,

    #[envconfig(from = "OTEL_LOG_LEVEL", default = "info")]
    pub otel_log_level: tracing::Level,
}

impl Config {
    pub fn default_test_config() -> Self {
        Self {
            address: SocketAddr::from_str("127.0.0.1:0").unwrap(),
            flags_secret: "test-flags-secret".to_string(),
            secure_cookies: FlexBool(false),
            max_concurrency: 1000,
            enable_metrics: false,
            cache_max_entries: 1000,
            page_cache_ttl_seconds: 900,
            prerender_product_ids: ProductIdList(vec!["1".to_string()]),
            debug: FlexBool(false),
            otel_url: None,
            otel_sampling_rate: 1.0,
            otel_service_name: "storefront".to_string(),
            otel_export_timeout_secs: 3,
            otel_log_level: tracing::Level::INFO,
        }
    }
}

pub static DEFAULT_TEST_CONFIG: Lazy<Config> = Lazy::new(Config::default_test_config);
