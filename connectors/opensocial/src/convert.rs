//! Identifier and property conversion between provider and platform namespaces
//!
//! Outbound (egress) ids go through the provider's filters to get the
//! "stripped" external form used in URLs. Inbound (ingress) ids go through the
//! decorators to get the internal form. Every function here is pure and
//! returns its input unchanged when no rule matches.

use core_types::{Group20, Person};

use crate::provider::{ConversionRule, GroupProvider};

/// Identifier property
pub const PROPERTY_ID: &str = "id";
/// Group name (title) property
pub const PROPERTY_NAME: &str = "name";
/// Group description property
pub const PROPERTY_DESCRIPTION: &str = "description";

/// Apply every rule for `property`, in order, to `value`
pub fn convert_property(property: &str, value: &str, rules: &[ConversionRule]) -> String {
    rules
        .iter()
        .filter(|rule| rule.applies_to(property))
        .fold(value.to_string(), |acc, rule| rule.apply(&acc))
}

/// External person id to internal person id
pub fn to_internal_person_id(person_id: &str, provider: &GroupProvider) -> String {
    convert_property(PROPERTY_ID, person_id, &provider.person_decorators)
}

/// Internal person id to the stripped external form
pub fn to_external_person_id(person_id: &str, provider: &GroupProvider) -> String {
    convert_property(PROPERTY_ID, person_id, &provider.person_filters)
}

/// External group id to internal group id
pub fn to_internal_group_id(group_id: &str, provider: &GroupProvider) -> String {
    convert_property(PROPERTY_ID, group_id, &provider.group_decorators)
}

/// Internal group id to the stripped external form
pub fn to_external_group_id(group_id: &str, provider: &GroupProvider) -> String {
    convert_property(PROPERTY_ID, group_id, &provider.group_filters)
}

/// Remap a parsed group into the platform namespace
///
/// The id is decorated; title and description go through the provider's
/// group filters.
pub fn convert_group20(group: Group20, provider: &GroupProvider) -> Group20 {
    let rules = &provider.group_filters;
    Group20 {
        id: to_internal_group_id(&group.id, provider),
        title: group
            .title
            .map(|title| convert_property(PROPERTY_NAME, &title, rules)),
        description: group
            .description
            .map(|description| convert_property(PROPERTY_DESCRIPTION, &description, rules)),
        ..group
    }
}

/// Remap parsed persons into the platform namespace
///
/// Persons whose id is blank, before or after conversion, cannot be tied to
/// an internal identity and are dropped.
pub fn convert_persons(persons: Vec<Person>, provider: &GroupProvider) -> Vec<Person> {
    persons
        .into_iter()
        .filter(|person| !person.has_blank_id())
        .map(|person| Person {
            id: to_internal_person_id(&person.id, provider),
            ..person
        })
        .filter(|person| !person.has_blank_id())
        .collect()
}
