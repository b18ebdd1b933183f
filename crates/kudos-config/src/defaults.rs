//! Serde default values for configuration fields.

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_min_connections() -> u32 {
    1
}

pub fn default_connect_timeout_secs() -> u64 {
    30
}

pub fn default_max_lifetime_secs() -> u64 {
    1800 // 30 minutes
}

pub fn default_idle_timeout_secs() -> u64 {
    600 // 10 minutes
}

pub fn default_allocation_enabled() -> bool {
    true
}

pub fn default_allocation_period_secs() -> u64 {
    30 * 24 * 60 * 60 // one month
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "text".to_string()
}
