//! Domain and wire types
//!
//! `CustomerAccount` and `Location` are the in-memory domain records. The
//! `*Record` and [`Envelope`] types mirror the JSON the appliance returns from
//! its list endpoints.

use serde::{Deserialize, Deserializer, Serialize};

/// Type tag of the only location kind this client manages
pub const DYNAMIC_IP_KIND: &str = "dynamicip";

/// A tenant on the appliance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerAccount {
    pub id: i64,
    pub account_name: String,
    pub email: String,
}

/// A dynamic-IP location owned by one customer account
///
/// `id == 0` means the location does not exist on the appliance yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub customer_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub ip: String,
    pub hostname: String,
    pub tag: String,
    pub policy_id: i64,
}

impl Location {
    /// A location that has not been created on the appliance yet
    pub fn new(customer_id: i64, name: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            id: 0,
            customer_id,
            kind: DYNAMIC_IP_KIND.to_string(),
            name: name.into(),
            ip: ip.into(),
            hostname: String::new(),
            tag: String::new(),
            policy_id: 0,
        }
    }

    /// Set the appliance-assigned id
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Whether the appliance has assigned an id to this location
    pub fn is_created(&self) -> bool {
        self.id != 0
    }
}

/// List envelope shared by every collection endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct Envelope<T> {
    #[serde(deserialize_with = "null_as_default")]
    pub object: String,
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub code: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub total: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub data: Vec<T>,
}

impl<T> Envelope<T> {
    /// Whether the appliance reports more records than this page carries
    pub fn is_truncated(&self) -> bool {
        self.total > self.count
    }
}

/// Accounts envelope from `GET /restapi/users`
pub type UsersPage = Envelope<UserRecord>;

/// Locations envelope from `GET /restapi/users/{id}/locations/dynamicip`
pub type LocationPage = Envelope<LocationRecord>;

/// One user account as returned by the appliance
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub object: String,
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub created: String,
    #[serde(deserialize_with = "null_as_default")]
    pub account_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub timezone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub license: String,
    #[serde(rename = "lastlogin", deserialize_with = "null_as_default")]
    pub last_login: String,
}

impl From<&UserRecord> for CustomerAccount {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            account_name: record.account_name.clone(),
            email: record.email.clone(),
        }
    }
}

/// One location as returned by the appliance
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LocationRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub object: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub code: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "policyid", deserialize_with = "null_as_default")]
    pub policy_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub ip: String,
}

impl LocationRecord {
    /// Build the domain location, attributing it to `customer_id`
    pub fn to_location(&self, customer_id: i64) -> Location {
        let kind = if self.kind.is_empty() {
            DYNAMIC_IP_KIND.to_string()
        } else {
            self.kind.clone()
        };

        Location {
            id: self.id,
            customer_id,
            kind,
            name: self.name.clone(),
            ip: self.ip.clone(),
            hostname: String::new(),
            tag: String::new(),
            policy_id: self.policy_id,
        }
    }
}

// JSON `null` decodes to the field's default, matching absent fields
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_page_decodes() {
        let json = r#"{
            "object": "list",
            "code": 200,
            "count": 2,
            "total": 2,
            "data": [
                {"object": "user", "id": 11, "account_name": "acme", "email": "ops@acme.test", "timezone": "UTC"},
                {"object": "user", "id": 12, "account_name": "globex", "email": null}
            ]
        }"#;

        let page: UsersPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.count, 2);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].account_name, "acme");
        assert_eq!(page.data[1].email, "");

        let account = CustomerAccount::from(&page.data[0]);
        assert_eq!(
            account,
            CustomerAccount {
                id: 11,
                account_name: "acme".to_string(),
                email: "ops@acme.test".to_string(),
            }
        );
    }

    #[test]
    fn missing_data_decodes_as_empty() {
        let page: LocationPage = serde_json::from_str(r#"{"object": "list", "count": 0}"#).unwrap();
        assert!(page.data.is_empty());
        assert!(!page.is_truncated());
    }

    #[test]
    fn location_record_maps_to_location() {
        let json = r#"{"object": "location", "type": "dynamicip", "code": 0, "id": 42, "name": " home ", "policyid": 7, "ip": "1.2.3.4"}"#;
        let record: LocationRecord = serde_json::from_str(json).unwrap();

        let location = record.to_location(5);
        assert_eq!(location.id, 42);
        assert_eq!(location.customer_id, 5);
        assert_eq!(location.kind, DYNAMIC_IP_KIND);
        assert_eq!(location.policy_id, 7);
        // Raw values are kept; only index keys are trimmed
        assert_eq!(location.name, " home ");
    }

    #[test]
    fn null_data_decodes_as_empty() {
        let page: UsersPage =
            serde_json::from_str(r#"{"object": "list", "count": null, "total": null, "data": null}"#).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.count, 0);
    }

    #[test]
    fn truncated_page_detected() {
        let page: LocationPage = serde_json::from_str(r#"{"count": 25, "total": 40, "data": []}"#).unwrap();
        assert!(page.is_truncated());
    }

    #[test]
    fn new_location_is_not_created() {
        let location = Location::new(5, "home", "1.2.3.4");
        assert!(!location.is_created());
        assert!(location.with_id(42).is_created());
    }
}
