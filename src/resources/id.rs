//
//  bitbucket-provider
//  resources/id.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Composite identifiers.
//!
//! Resource IDs join path segments with `/`, e.g. `workspace/repo/uuid`.
//! Segments that themselves contain `/` cannot be told apart from extra
//! segments; [`encode`] does not escape them, so such an ID decodes with the
//! wrong arity and is rejected by [`decode`].

use crate::api::common::{ProviderError, Result};

/// Joins segments into one identifier.
pub fn encode(parts: &[&str]) -> String {
    parts.join("/")
}

/// Splits `id` into exactly `N` non-empty segments.
///
/// `expected` names the pattern in the error, e.g. `OWNER/REPO/HOOK-ID`.
///
/// # Example
///
/// ```rust
/// use bitbucket_provider::resources::id;
///
/// let [owner, repo] = id::decode::<2>("acme/demo", "OWNER/REPO").unwrap();
/// assert_eq!((owner.as_str(), repo.as_str()), ("acme", "demo"));
/// assert!(id::decode::<3>("acme/demo", "OWNER/REPO/ID").is_err());
/// ```
pub fn decode<const N: usize>(id: &str, expected: &str) -> Result<[String; N]> {
    let parts: Vec<&str> = id.split('/').collect();
    if parts.len() != N || parts.iter().any(|p| p.is_empty()) {
        return Err(invalid(id, expected));
    }
    Ok(std::array::from_fn(|i| parts[i].to_string()))
}

/// Encodes a deployment reference, `workspace/repo:environment-uuid`.
pub fn encode_deployment(workspace: &str, repo: &str, environment: &str) -> String {
    format!("{workspace}/{repo}:{environment}")
}

/// Decodes `workspace/repo:environment-uuid`.
pub fn decode_deployment(id: &str) -> Result<(String, String, String)> {
    const EXPECTED: &str = "WORKSPACE/REPO:ENVIRONMENT-UUID";
    let (repository, environment) = id
        .split_once(':')
        .filter(|(_, env)| !env.is_empty())
        .ok_or_else(|| invalid(id, EXPECTED))?;
    let [workspace, repo] = decode::<2>(repository, EXPECTED).map_err(|_| invalid(id, EXPECTED))?;
    Ok((workspace, repo, environment.to_string()))
}

fn invalid(id: &str, expected: &str) -> ProviderError {
    ProviderError::InvalidId {
        id: id.to_string(),
        expected: expected.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_and_three_segment_round_trip() {
        let id = encode(&["acme", "demo"]);
        assert_eq!(id, "acme/demo");
        assert_eq!(decode::<2>(&id, "A/B").unwrap(), ["acme", "demo"]);

        let id = encode(&["acme", "devs", "{u-1}"]);
        assert_eq!(decode::<3>(&id, "A/B/C").unwrap(), ["acme", "devs", "{u-1}"]);
    }

    #[test]
    fn test_wrong_arity_names_expected_pattern() {
        let err = decode::<3>("acme/demo", "OWNER/REPO/HOOK-ID").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected format of ID (\"acme/demo\"), expected OWNER/REPO/HOOK-ID"
        );
        assert!(decode::<2>("acme/demo/extra", "OWNER/REPO").is_err());
    }

    #[test]
    fn test_empty_segments_are_rejected() {
        assert!(decode::<2>("acme/", "OWNER/REPO").is_err());
        assert!(decode::<2>("/demo", "OWNER/REPO").is_err());
        assert!(decode::<1>("", "ID").is_err());
    }

    #[test]
    fn test_slash_inside_segment_changes_arity() {
        let id = encode(&["acme", "team/demo"]);
        assert!(decode::<2>(&id, "OWNER/REPO").is_err());
    }

    #[test]
    fn test_deployment_reference() {
        let id = encode_deployment("acme", "demo", "{env}");
        assert_eq!(id, "acme/demo:{env}");
        assert_eq!(
            decode_deployment(&id).unwrap(),
            ("acme".to_string(), "demo".to_string(), "{env}".to_string())
        );
        assert!(decode_deployment("acme/demo").is_err());
        assert!(decode_deployment("acme:{env}").is_err());
    }
}
