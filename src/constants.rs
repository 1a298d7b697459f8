pub const APPLICATION_JSON: &str = "application/json";

pub const BEARER_SCHEME: &str = "Bearer";

pub const STATUS_OPEN: &str = "OPEN";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: &str = "3333";
pub const DEFAULT_POOL_SIZE: &str = "10";

/// Lifetime of tokens issued by `TokenService::issue`, in seconds.
pub const TOKEN_TTL_SECS: i64 = 3600;
