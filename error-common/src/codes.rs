// Standardized error codes returned alongside coarse client messages.
// Codes identify the category, never the gate that failed.

pub mod policy {
    pub const ACCESS_DENIED: &str = "POLICY_1001";
    pub const RATE_LIMITED: &str = "POLICY_1002";
    pub const ACCOUNT_UNAVAILABLE: &str = "POLICY_1003";
}

pub mod credential {
    pub const INVALID_CREDENTIALS: &str = "AUTH_2001";
}

pub mod security {
    pub const SESSION_INVALID: &str = "SEC_3001";
}

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_4001";
}

pub mod system {
    pub const UNAVAILABLE: &str = "SYSTEM_5001";
}
