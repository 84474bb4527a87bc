//! Keycloak claim shape to authority strings.

use serde_json::Value;

use crate::config::{ROLE_PREFIX, SCOPE_PREFIX};
use crate::domain::Claims;

/// Derives `ROLE_*` and `SCOPE_*` authorities from token claims.
///
/// Realm roles come from `realm_access.roles`. Client roles come from
/// `resource_access.<client>.roles`, for the configured client only or for
/// every client when none is configured. Scopes come from the
/// space-separated `scope` claim.
#[derive(Debug, Clone, Default)]
pub struct KeycloakAuthorities {
    client_id: Option<String>,
}

impl KeycloakAuthorities {
    pub fn new(client_id: Option<String>) -> Self {
        Self {
            client_id: client_id.filter(|c| !c.trim().is_empty()),
        }
    }

    /// Authorities in first-seen order, without duplicates.
    pub fn convert(&self, claims: &Claims) -> Vec<String> {
        let mut authorities = Vec::new();

        if let Some(roles) = claims.get("realm_access").and_then(|r| r.get("roles")) {
            push_roles(&mut authorities, roles);
        }

        if let Some(clients) = claims.get("resource_access").and_then(Value::as_object) {
            match &self.client_id {
                Some(client_id) => {
                    if let Some(roles) = clients.get(client_id).and_then(|c| c.get("roles")) {
                        push_roles(&mut authorities, roles);
                    }
                }
                None => {
                    for roles in clients.values().filter_map(|c| c.get("roles")) {
                        push_roles(&mut authorities, roles);
                    }
                }
            }
        }

        if let Some(scope) = claims.get("scope").and_then(Value::as_str) {
            for s in scope.split(' ').filter(|s| !s.is_empty()) {
                push_unique(&mut authorities, format!("{SCOPE_PREFIX}{s}"));
            }
        }

        authorities
    }
}

fn push_roles(authorities: &mut Vec<String>, roles: &Value) {
    let Some(roles) = roles.as_array() else {
        return;
    };
    for role in roles.iter().filter_map(Value::as_str).map(str::trim) {
        if role.is_empty() {
            continue;
        }
        let authority = if role.starts_with(ROLE_PREFIX) {
            role.to_string()
        } else {
            format!("{ROLE_PREFIX}{}", role.to_uppercase())
        };
        push_unique(authorities, authority);
    }
}

fn push_unique(authorities: &mut Vec<String>, authority: String) {
    if !authorities.contains(&authority) {
        authorities.push(authority);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_realm_roles_are_prefixed_and_uppercased() {
        let authorities = KeycloakAuthorities::default().convert(&claims(json!({
            "realm_access": { "roles": ["admin", "ROLE_AUDITOR", " ", "user"] }
        })));
        assert_eq!(authorities, vec!["ROLE_ADMIN", "ROLE_AUDITOR", "ROLE_USER"]);
    }

    #[test]
    fn test_configured_client_only() {
        let c = claims(json!({
            "resource_access": {
                "tasks-api": { "roles": ["editor"] },
                "other": { "roles": ["viewer"] }
            }
        }));
        let authorities = KeycloakAuthorities::new(Some("tasks-api".into())).convert(&c);
        assert_eq!(authorities, vec!["ROLE_EDITOR"]);
    }

    #[test]
    fn test_all_clients_without_configuration() {
        let c = claims(json!({
            "resource_access": {
                "a": { "roles": ["editor"] },
                "b": { "roles": ["viewer", "editor"] }
            }
        }));
        let mut authorities = KeycloakAuthorities::new(None).convert(&c);
        authorities.sort();
        assert_eq!(authorities, vec!["ROLE_EDITOR", "ROLE_VIEWER"]);
    }

    #[test]
    fn test_scopes_and_deduplication() {
        let authorities = KeycloakAuthorities::default().convert(&claims(json!({
            "realm_access": { "roles": ["user", "USER"] },
            "scope": "openid  profile email"
        })));
        assert_eq!(
            authorities,
            vec!["ROLE_USER", "SCOPE_openid", "SCOPE_profile", "SCOPE_email"]
        );
    }

    #[test]
    fn test_no_claims_no_authorities() {
        assert!(KeycloakAuthorities::default().convert(&Claims::new()).is_empty());
    }
}
