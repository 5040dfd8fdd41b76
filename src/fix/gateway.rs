//! Login-gateway rewrite for direct auth-provider links.

use crate::extract::hits::auth_literals;
use std::collections::BTreeMap;

pub const LOGIN_PATH: &str = "/login";

#[must_use]
pub fn gateway_target(provider: &str) -> String {
    format!("{LOGIN_PATH}?provider={provider}")
}

/// Distinct `(literal, replacement)` pairs in `text`, in literal order.
#[must_use]
pub fn gateway_changes(text: &str) -> Vec<(String, String)> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for lit in auth_literals(text) {
        out.entry(text[lit.start..lit.end].to_string())
            .or_insert_with(|| gateway_target(&lit.provider));
    }
    out.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_providers_map_to_gateway() {
        let text = r#"
<a href="/api/auth/google">G</a>
<a href='/api/auth/GitHub?next=/me'>H</a>
<a href="/api/auth/google">G again</a>
"#;
        let changes = gateway_changes(text);
        assert_eq!(
            changes,
            [
                ("/api/auth/GitHub?next=/me".to_string(), "/login?provider=github".to_string()),
                ("/api/auth/google".to_string(), "/login?provider=google".to_string()),
            ]
        );
    }

    #[test]
    fn test_gateway_links_are_left_alone() {
        assert!(gateway_changes(r#"<a href="/login?provider=google">G</a>"#).is_empty());
    }
}
