//! Tool domain derivation.
//!
//! A domain is the namespace prefix of a dotted tool name: `hr.get_employee`
//! belongs to `hr`.  The index is computed once from the catalog fetched at
//! startup and is not refreshed if the catalog changes later.

use crate::types::ToolDescriptor;

/// Separator between a tool's domain and its action.
pub const DOMAIN_SEPARATOR: char = '.';

/// Returns the domain of a qualified tool name.
///
/// A name without a separator is its own domain.
pub fn domain_of(name: &str) -> &str {
    name.split_once(DOMAIN_SEPARATOR)
        .map(|(domain, _)| domain)
        .unwrap_or(name)
}

/// Derives the distinct domains of a tool listing, in order of first
/// occurrence.
pub fn derive_domains(tools: &[ToolDescriptor]) -> Vec<String> {
    let mut domains: Vec<String> = Vec::new();
    for tool in tools {
        let domain = domain_of(&tool.name);
        if !domains.iter().any(|d| d == domain) {
            domains.push(domain.to_string());
        }
    }
    domains
}

/// Returns the tools belonging to `domain`.
pub fn tools_in_domain<'a>(tools: &'a [ToolDescriptor], domain: &str) -> Vec<&'a ToolDescriptor> {
    tools
        .iter()
        .filter(|tool| domain_of(&tool.name) == domain)
        .collect()
}
