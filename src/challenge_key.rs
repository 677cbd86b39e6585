use std::fmt::{Display, Formatter};

/// Identity a puzzle is issued for: who is asking, and for what.
///
/// The client id is typically an address or a hashed identity, the resource id
/// an operation such as `GET:/v1/quotes/random`. A key with either half empty is
/// invalid and must not be used to address a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChallengeKey {
    client_id: String,
    resource_id: String,
}

impl ChallengeKey {
    pub fn new(client_id: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            resource_id: resource_id.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub fn is_valid(&self) -> bool {
        !self.client_id.is_empty() && !self.resource_id.is_empty()
    }

    /// Resource field for puzzles issued to this client.
    ///
    /// `:` separates stamp fields, so it is replaced by `.` (IPv6 clients).
    pub fn puzzle_resource(&self) -> String {
        self.client_id.replace(':', ".")
    }
}

impl Display for ChallengeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.client_id, self.resource_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_form_joins_with_colon() {
        let cases = [
            ("", "", ":"),
            ("client-id", "", "client-id:"),
            ("", "resource-id", ":resource-id"),
            ("client-id", "resource-id", "client-id:resource-id"),
        ];
        for (client, resource, want) in cases {
            assert_eq!(ChallengeKey::new(client, resource).to_string(), want);
        }
    }

    #[test]
    fn validity_requires_both_halves() {
        assert!(!ChallengeKey::new("", "").is_valid());
        assert!(!ChallengeKey::new("client-id", "").is_valid());
        assert!(!ChallengeKey::new("", "resource-id").is_valid());
        assert!(ChallengeKey::new("client-id", "resource-id").is_valid());
    }

    #[test]
    fn accessors() {
        let key = ChallengeKey::new("10.0.0.1", "GET:/v1/quotes/random");
        assert_eq!(key.client_id(), "10.0.0.1");
        assert_eq!(key.resource_id(), "GET:/v1/quotes/random");
        assert_eq!(key.to_string(), "10.0.0.1:GET:/v1/quotes/random");
    }

    #[test]
    fn puzzle_resource_has_no_separator() {
        assert_eq!(ChallengeKey::new("::1", "r").puzzle_resource(), "..1");
        assert_eq!(ChallengeKey::new("10.0.0.1", "r").puzzle_resource(), "10.0.0.1");
    }
}
