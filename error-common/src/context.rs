use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Error context information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    pub request_id: Option<String>,
    pub patient_id: Option<String>,
    pub operation: Option<String>,
    pub additional: HashMap<String, String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a fresh request with a generated id.
    pub fn for_operation(operation: &str) -> Self {
        Self::new()
            .with_request_id(Uuid::new_v4().to_string())
            .with_operation(operation.to_string())
    }

    pub fn with_request_id(mut self, request_id: String) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_patient_id(mut self, patient_id: String) -> Self {
        self.patient_id = Some(patient_id);
        self
    }

    pub fn with_operation(mut self, operation: String) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn add_context<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.additional.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_operation_generates_request_id() {
        let a = ErrorContext::for_operation("process_audio");
        let b = ErrorContext::for_operation("process_audio");

        assert_eq!(a.operation.as_deref(), Some("process_audio"));
        assert!(a.request_id.is_some());
        assert_ne!(a.request_id, b.request_id);
    }
}
