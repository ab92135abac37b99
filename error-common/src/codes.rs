// Stable error codes returned in API error bodies.
// Front-end code switches on these, so values never change once published.

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
    pub const INVALID_FORMAT: &str = "VALIDATION_1003";
}

pub mod session {
    pub const SESSION_REQUIRED: &str = "SESSION_2001";
    pub const SESSION_EXPIRED: &str = "SESSION_2002";
    pub const INVALID_PASSWORD: &str = "SESSION_2003";
    pub const NOT_CONFIGURED: &str = "SESSION_2004";
}

pub mod resource {
    pub const NOT_FOUND: &str = "RESOURCE_3001";
    pub const CONFLICT: &str = "RESOURCE_3002";
}

pub mod store {
    pub const STORE_UNAVAILABLE: &str = "STORE_4001";
    pub const QUERY_FAILED: &str = "STORE_4002";
}

pub mod notification {
    pub const DELIVERY_FAILED: &str = "NOTIFY_5001";
    pub const NO_RECIPIENT: &str = "NOTIFY_5002";
}

pub mod internal {
    pub const INTERNAL: &str = "INTERNAL_9001";
}
