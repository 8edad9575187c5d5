// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `aws/mod.rs`

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_tag_map_skips_empty_tags() {
        assert!(tag_map(&BTreeMap::new()).is_none());

        let tags = BTreeMap::from([("team".to_string(), "payments".to_string())]);
        assert_eq!(
            tag_map(&tags),
            Some(HashMap::from([("team".to_string(), "payments".to_string())]))
        );
    }

    #[test]
    fn test_empty_token_ends_pagination() {
        assert_eq!(next_token(None), None);
        assert_eq!(next_token(Some("")), None);
        assert_eq!(next_token(Some("abc")), Some("abc".to_string()));
    }

    #[test]
    fn test_build_error_describes_request() {
        assert_eq!(
            build_error("missing field `name`").to_string(),
            "invalid request: missing field `name`"
        );
    }
}
