/// Configuration default values
///
/// Central place for every default used by the configuration structs.
// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024; // 10MB

// Vision model defaults
pub const DEFAULT_VISION_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_VISION_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_VISION_TIMEOUT: &str = "60s";
pub const API_KEY_ENV_VARS: [&str; 2] = ["WASTESNAP_API_KEY", "GEMINI_API_KEY"];

// Result cache defaults
pub const DEFAULT_CACHE_CAPACITY: usize = 5;
pub const DEFAULT_STORAGE_KEY: &str = "wastesnap_upload_history";
pub const DEFAULT_CACHE_PATH: &str = "./data/cache";
