// Stable error codes reported alongside ScribeError

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
    pub const UNSUPPORTED_FILE_TYPE: &str = "VALIDATION_1003";
}

pub mod authentication {
    pub const INVALID_CREDENTIALS: &str = "AUTH_2001";
    pub const ACCOUNT_EXISTS: &str = "AUTH_2002";
}

pub mod transcription {
    pub const PROVIDER_FAILED: &str = "STT_3001";
    pub const AUDIO_UNREADABLE: &str = "STT_3002";
}

pub mod ai {
    pub const ESCALATION_EXHAUSTED: &str = "AI_5001";
    pub const NO_RECORDS: &str = "AI_5002";
}

pub mod email {
    pub const DELIVERY_FAILED: &str = "EMAIL_6001";
    pub const INBOX_UNAVAILABLE: &str = "EMAIL_6002";
}

pub mod storage {
    pub const NOT_FOUND: &str = "STORE_7001";
    pub const IO_FAILED: &str = "STORE_7002";
}

pub mod system {
    pub const CONFIGURATION: &str = "SYS_9001";
    pub const INTERNAL: &str = "SYS_9002";
}
