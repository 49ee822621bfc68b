//! OpenSocial JSON response parsing
//!
//! A malformed body is always a hard error here. Whether a failed fetch
//! degrades to an empty result is decided by the caller, based on the HTTP
//! status, before the body ever reaches the parser.

use core_types::{Group20Entry, GroupEntry, GroupMembersEntry, PersonEntry};
use serde::de::DeserializeOwned;

use crate::{Error, Result};

fn parse<T: DeserializeOwned>(context: &'static str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::parse(context, e))
}

/// Parse a group members response (`people/{personId}/{groupId}`)
pub fn parse_group_members(body: &str) -> Result<GroupMembersEntry> {
    parse("group members", body)
}

/// Parse an OpenSocial 2.0 groups response (`groups/{personId}`)
pub fn parse_groups20(body: &str) -> Result<Group20Entry> {
    parse("groups", body)
}

/// Parse an OpenSocial 1.0 groups response
pub fn parse_groups(body: &str) -> Result<GroupEntry> {
    parse("groups", body)
}

/// Parse a single person response (`people/{personId}`)
pub fn parse_person(body: &str) -> Result<PersonEntry> {
    parse("person", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_groups20() {
        let body = r#"{
            "startIndex": 0,
            "totalResults": 2,
            "entry": [
                {"id": "ext-42", "title": "Raw Title", "description": "d", "voot_membership_role": "member"},
                {"id": "ext-43", "title": "Other"}
            ]
        }"#;
        let groups = parse_groups20(body).unwrap().into_entries();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, "ext-42");
        assert_eq!(groups[0].voot_membership_role.as_deref(), Some("member"));
        assert_eq!(groups[1].description, None);
    }

    #[test]
    fn test_parse_group_members_keeps_order() {
        let body = r#"{"entry": [
            {"id": "b", "displayName": "Bob", "emails": [{"value": "bob@example.com", "type": "work"}]},
            {"id": "a", "name": {"givenName": "Alice", "familyName": "Smith"}},
            {"id": "", "displayName": "Nobody"}
        ]}"#;
        let persons = parse_group_members(body).unwrap().into_entries();
        let ids: Vec<&str> = persons.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", ""]);
        assert_eq!(persons[0].emails[0].kind.as_deref(), Some("work"));
        assert_eq!(
            persons[1].name.as_ref().and_then(|n| n.given_name.as_deref()),
            Some("Alice")
        );
    }

    #[test]
    fn test_missing_entry_is_empty() {
        assert!(parse_group_members("{}").unwrap().entry.is_empty());
    }

    #[test]
    fn test_parse_groups_v1() {
        let body = r#"{"entry": [{"id": {"groupId": "g1"}, "title": "Team"}]}"#;
        let groups = parse_groups(body).unwrap().into_entries();
        assert_eq!(groups[0].id.group_id, "g1");
    }

    #[test]
    fn test_parse_person() {
        let person = parse_person(r#"{"entry": {"id": "urn:x", "displayName": "X"}}"#)
            .unwrap()
            .entry;
        assert_eq!(person.id, "urn:x");
    }

    #[test]
    fn test_malformed_body_is_error() {
        let err = parse_groups20("<html>oops</html>").unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("groups"));
    }

    #[test]
    fn test_wrong_shape_is_error() {
        assert!(parse_group_members(r#"{"entry": "nope"}"#).is_err());
    }
}
