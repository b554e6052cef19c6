//! Remote wire format.
//!
//! The remote API answers `GET <base>/users?page=<n>` with:
//!
//! ```text
//! { "data": [ {id, email, first_name, last_name, avatar}, ... ],
//!   "page": 1, "per_page": 6, "total": 12, "total_pages": 2 }
//! ```
//!
//! Only `data` is required. `total_pages`, when present, bounds pagination.

use crate::error::{ProtocolError, ProtocolResult};
use crate::record::{Timestamp, UserId, UserRecord};
use serde::{Deserialize, Serialize};

/// A user as the remote API describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    /// Stable identity.
    pub id: u64,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Avatar URL.
    #[serde(default)]
    pub avatar: String,
}

impl RemoteUser {
    /// Converts to a local record with the given discovery time.
    #[must_use]
    pub fn into_record(self, created_at: Timestamp) -> UserRecord {
        UserRecord {
            id: UserId::new(self.id),
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            avatar: self.avatar,
            created_at,
        }
    }
}

impl From<&UserRecord> for RemoteUser {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id.get(),
            email: record.email.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            avatar: record.avatar.clone(),
        }
    }
}

/// One page of the remote user listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersPage {
    /// Users on this page, in server order.
    pub data: Vec<RemoteUser>,
    /// Page number echoed by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size used by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    /// Total number of users across all pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Total number of pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
}

impl UsersPage {
    /// Decodes a page from a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::EmptyBody`] for a blank body and
    /// [`ProtocolError::Json`] if the body is not a users page.
    pub fn decode(body: &[u8]) -> ProtocolResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ProtocolError::EmptyBody);
        }
        Ok(serde_json::from_slice(body)?)
    }

    /// Encodes the page to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Converts every user on the page to a local record.
    ///
    /// Records carry [`Timestamp::UNSET`] until merged.
    #[must_use]
    pub fn into_records(self) -> Vec<UserRecord> {
        self.data
            .into_iter()
            .map(|user| user.into_record(Timestamp::UNSET))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQRES_PAGE_2: &str = r#"{
        "page": 2,
        "per_page": 6,
        "total": 12,
        "total_pages": 2,
        "data": [
            {"id": 7, "email": "michael.lawson@reqres.in", "first_name": "Michael", "last_name": "Lawson", "avatar": "https://reqres.in/img/faces/7-image.jpg"},
            {"id": 8, "email": "lindsay.ferguson@reqres.in", "first_name": "Lindsay", "last_name": "Ferguson", "avatar": "https://reqres.in/img/faces/8-image.jpg"}
        ],
        "support": {"url": "https://reqres.in/#support-heading", "text": "ignored"}
    }"#;

    #[test]
    fn decode_full_page() {
        let page = UsersPage::decode(REQRES_PAGE_2.as_bytes()).unwrap();
        assert_eq!(page.page, Some(2));
        assert_eq!(page.per_page, Some(6));
        assert_eq!(page.total, Some(12));
        assert_eq!(page.total_pages, Some(2));
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].first_name, "Michael");
        assert_eq!(page.data[1].last_name, "Ferguson");
    }

    #[test]
    fn decode_without_pagination_metadata() {
        let page = UsersPage::decode(br#"{"data": []}"#).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total_pages, None);
    }

    #[test]
    fn decode_empty_body() {
        assert!(matches!(UsersPage::decode(b""), Err(ProtocolError::EmptyBody)));
        assert!(matches!(
            UsersPage::decode(b"  \n"),
            Err(ProtocolError::EmptyBody)
        ));
    }

    #[test]
    fn decode_missing_data_fails() {
        let result = UsersPage::decode(br#"{"page": 1}"#);
        assert!(matches!(result, Err(ProtocolError::Json(_))));
    }

    #[test]
    fn decode_garbage_fails() {
        assert!(matches!(
            UsersPage::decode(b"<html>502</html>"),
            Err(ProtocolError::Json(_))
        ));
    }

    #[test]
    fn records_keep_order_and_are_unstamped() {
        let records = UsersPage::decode(REQRES_PAGE_2.as_bytes())
            .unwrap()
            .into_records();
        let ids: Vec<u64> = records.iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![7, 8]);
        assert!(records.iter().all(|r| r.created_at == Timestamp::UNSET));
        assert_eq!(records[0].avatar, "https://reqres.in/img/faces/7-image.jpg");
    }

    #[test]
    fn encode_skips_absent_metadata() {
        let page = UsersPage {
            data: vec![RemoteUser {
                id: 1,
                email: "a@b.c".into(),
                first_name: "A".into(),
                last_name: "B".into(),
                avatar: String::new(),
            }],
            total_pages: Some(1),
            ..Default::default()
        };
        let json: serde_json::Value = serde_json::from_slice(&page.encode().unwrap()).unwrap();
        assert_eq!(json["total_pages"], 1);
        assert!(json.get("page").is_none());
        assert_eq!(UsersPage::decode(&page.encode().unwrap()).unwrap(), page);
    }
}
