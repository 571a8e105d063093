//! REST endpoint layout of the appliance API

/// URL builder rooted at the appliance base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    /// Create a builder; a trailing `/` on the base URL is dropped
    pub fn new(base_url: impl Into<String>) -> Self {
        let base = base_url.into().trim_end_matches('/').to_string();
        Self { base }
    }

    /// `GET` target listing every customer account
    pub fn users(&self) -> String {
        format!("{}/restapi/users", self.base)
    }

    /// Dynamic-IP location collection of one customer (list and create)
    pub fn locations(&self, customer_id: i64) -> String {
        format!("{}/restapi/users/{}/locations/dynamicip", self.base, customer_id)
    }

    /// One dynamic-IP location (update and delete)
    pub fn location(&self, customer_id: i64, location_id: i64) -> String {
        format!(
            "{}/restapi/users/{}/locations/dynamicip/{}",
            self.base, customer_id, location_id
        )
    }
}
