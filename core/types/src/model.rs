//! OpenSocial domain model
//!
//! Field names follow the OpenSocial JSON schema (camelCase on the wire). Every
//! field except the identifier is optional; providers differ a lot in what they
//! fill in, so unknown fields are ignored and missing lists default to empty.

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer};

/// Treats an explicit JSON `null` the same as a missing identifier
#[cfg(feature = "serde")]
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Structured name of a person
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Name {
    /// Full name, formatted for display
    pub formatted: Option<String>,
    /// Family (last) name
    pub family_name: Option<String>,
    /// Given (first) name
    pub given_name: Option<String>,
}

/// E-mail address of a person
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Email {
    /// The address
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: String,
    /// Kind of address (e.g. "work")
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: Option<String>,
}

/// Organization a person belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Organization {
    /// Organization name
    pub name: Option<String>,
    /// Department within the organization
    pub department: Option<String>,
    /// Job title
    pub title: Option<String>,
}

/// Phone number of a person
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhoneNumber {
    /// The number
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: String,
    /// Kind of number (e.g. "mobile")
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: Option<String>,
}

/// Photo of a person
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Photo {
    /// URL of the photo
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: String,
    /// Kind of photo (e.g. "thumbnail")
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: Option<String>,
}

/// Account of a person at some domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Account {
    /// Domain of the account
    pub domain: Option<String>,
    /// User id at that domain
    pub userid: Option<String>,
    /// User name at that domain
    pub username: Option<String>,
}

/// An OpenSocial person
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Person {
    /// Identifier; external form as parsed, internal form once converted
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "null_as_empty"))]
    pub id: String,
    /// Display name
    pub display_name: Option<String>,
    /// Nickname
    pub nickname: Option<String>,
    /// Structured name
    pub name: Option<Name>,
    /// E-mail addresses
    #[cfg_attr(feature = "serde", serde(default))]
    pub emails: Vec<Email>,
    /// Organizations
    #[cfg_attr(feature = "serde", serde(default))]
    pub organizations: Vec<Organization>,
    /// Free-form tags
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<String>,
    /// Phone numbers
    #[cfg_attr(feature = "serde", serde(default))]
    pub phone_numbers: Vec<PhoneNumber>,
    /// Photos
    #[cfg_attr(feature = "serde", serde(default))]
    pub photos: Vec<Photo>,
    /// Accounts
    #[cfg_attr(feature = "serde", serde(default))]
    pub accounts: Vec<Account>,
    /// Role of the person within the group that was queried
    #[cfg_attr(feature = "serde", serde(rename = "voot_membership_role"))]
    pub voot_membership_role: Option<String>,
    /// Provider-reported error for this entry
    pub error: Option<String>,
}

impl Person {
    /// Create a person with only an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the display name
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Returns true if the identifier is empty or whitespace only
    pub fn has_blank_id(&self) -> bool {
        self.id.trim().is_empty()
    }
}

/// Identifier object of an OpenSocial 1.0 group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct GroupId {
    /// The group identifier
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "null_as_empty"))]
    pub group_id: String,
}

/// An OpenSocial 1.0 group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group {
    /// Identifier object
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: GroupId,
    /// Title
    pub title: Option<String>,
    /// Description
    pub description: Option<String>,
}

/// An OpenSocial 2.0 group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group20 {
    /// Identifier; external form as parsed, internal form once converted
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "null_as_empty"))]
    pub id: String,
    /// Title
    pub title: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Role of the requesting person within this group
    #[cfg_attr(feature = "serde", serde(rename = "voot_membership_role"))]
    pub voot_membership_role: Option<String>,
}

impl Group20 {
    /// Create a group with only an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

macro_rules! list_entry {
    ($(#[$meta:meta])* $name:ident, $item:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
        pub struct $name {
            /// Offset of the first entry
            pub start_index: Option<u64>,
            /// Total number of results available at the provider
            pub total_results: Option<u64>,
            /// Page size
            pub items_per_page: Option<u64>,
            /// Whether the provider filtered the result
            pub filtered: Option<bool>,
            /// Whether the provider sorted the result
            pub sorted: Option<bool>,
            /// The entries, in provider order
            #[cfg_attr(feature = "serde", serde(default))]
            pub entry: Vec<$item>,
        }

        impl $name {
            /// Consume the envelope, keeping only the entries
            pub fn into_entries(self) -> Vec<$item> {
                self.entry
            }
        }
    };
}

list_entry!(
    /// Envelope of a group members response
    GroupMembersEntry,
    Person
);
list_entry!(
    /// Envelope of an OpenSocial 2.0 groups response
    Group20Entry,
    Group20
);
list_entry!(
    /// Envelope of an OpenSocial 1.0 groups response
    GroupEntry,
    Group
);

/// Envelope of a single person response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersonEntry {
    /// The person
    pub entry: Person,
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_person_null_id_is_blank() {
        let person: Person = serde_json::from_str(r#"{"id": null, "displayName": "X"}"#).unwrap();
        assert!(person.has_blank_id());
        assert_eq!(person.display_name.as_deref(), Some("X"));
    }

    #[test]
    fn test_person_whitespace_id_is_blank() {
        assert!(Person::new("  \t").has_blank_id());
        assert!(!Person::new("jdoe").has_blank_id());
    }

    #[test]
    fn test_group20_membership_role_wire_name() {
        let group: Group20 =
            serde_json::from_str(r#"{"id": "g1", "voot_membership_role": "admin"}"#).unwrap();
        assert_eq!(group.voot_membership_role.as_deref(), Some("admin"));
        assert_eq!(group.title, None);
    }

    #[test]
    fn test_group_members_entry_paging() {
        let entry: GroupMembersEntry = serde_json::from_str(
            r#"{"startIndex": 0, "totalResults": 2, "itemsPerPage": 2, "entry": [{"id": "a"}, {"id": "b"}]}"#,
        )
        .unwrap();
        assert_eq!(entry.total_results, Some(2));
        assert_eq!(entry.into_entries().len(), 2);
    }
}
