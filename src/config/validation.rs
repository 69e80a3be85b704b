//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, origin URL and value ranges
//! - Validate rule prefixes and detect duplicate rule names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RewriterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{RewriterConfig, RuleConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("listener.max_concurrent_requests must be greater than 0")]
    ZeroConcurrency,

    #[error("origin.url: {0}")]
    InvalidOrigin(String),

    #[error("timeouts.{0} must be greater than 0")]
    ZeroTimeout(&'static str),

    #[error("rule name must not be empty")]
    EmptyRuleName,

    #[error("duplicate rule name {0:?}")]
    DuplicateRuleName(String),

    #[error("rule {name:?}: invalid prefix {prefix:?} ({reason})")]
    InvalidPrefix {
        name: String,
        prefix: String,
        reason: &'static str,
    },
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &RewriterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address("listener.bind_address", &config.listener.bind_address, &mut errors);
    if config.listener.max_concurrent_requests == 0 {
        errors.push(ValidationError::ZeroConcurrency);
    }

    if let Err(reason) = check_origin(&config.origin.url) {
        errors.push(ValidationError::InvalidOrigin(reason));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    let mut names = HashSet::new();
    for rule in &config.rules {
        if rule.name.is_empty() {
            errors.push(ValidationError::EmptyRuleName);
        } else if !names.insert(rule.name.as_str()) {
            errors.push(ValidationError::DuplicateRuleName(rule.name.clone()));
        }
        if let Err(reason) = check_prefix(rule) {
            errors.push(ValidationError::InvalidPrefix {
                name: rule.name.clone(),
                prefix: rule.prefix.clone(),
                reason,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_origin(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("{} ({:?})", e, raw))?;

    if url.scheme() != "http" {
        return Err(format!("unsupported scheme {:?}, only http is supported", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.path() != "/" {
        return Err(format!("must not carry a path, got {:?}", url.path()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("must not carry a query or fragment".to_string());
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err("must not carry credentials".to_string());
    }
    Ok(())
}

fn check_prefix(rule: &RuleConfig) -> Result<(), &'static str> {
    let prefix = rule.prefix.as_str();
    if !prefix.starts_with('/') {
        return Err("must start with '/'");
    }
    if prefix.len() > 1 && prefix.ends_with('/') {
        return Err("must not end with '/'");
    }
    if prefix.len() == 1 {
        return Err("must name at least one segment");
    }
    if prefix[1..].split('/').any(str::is_empty) {
        return Err("must not contain empty segments");
    }
    if prefix.contains(|c: char| c == '?' || c == '#') {
        return Err("must not contain '?' or '#'");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&RewriterConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RewriterConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.listener.max_concurrent_requests = 0;
        config.timeouts.connect_secs = 0;
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::ZeroConcurrency));
        assert!(errors.contains(&ValidationError::ZeroTimeout("connect_secs")));
        assert!(errors.contains(&ValidationError::ZeroTimeout("request_secs")));
    }

    #[test]
    fn test_origin_checks() {
        assert!(check_origin("http://127.0.0.1:3000").is_ok());
        assert!(check_origin("http://origin.internal/").is_ok());
        assert!(check_origin("https://origin.internal").is_err());
        assert!(check_origin("http://origin.internal/base").is_err());
        assert!(check_origin("http://origin.internal/?a=1").is_err());
        assert!(check_origin("http://user:pw@origin.internal").is_err());
        assert!(check_origin("origin.internal:3000").is_err());
    }

    #[test]
    fn test_prefix_checks() {
        let rule = |prefix: &str| RuleConfig {
            name: "r".into(),
            prefix: prefix.into(),
        };
        assert!(check_prefix(&rule("/blog")).is_ok());
        assert!(check_prefix(&rule("/docs/v2")).is_ok());
        assert!(check_prefix(&rule("blog")).is_err());
        assert!(check_prefix(&rule("/blog/")).is_err());
        assert!(check_prefix(&rule("/")).is_err());
        assert!(check_prefix(&rule("/a//b")).is_err());
        assert!(check_prefix(&rule("/blog?x")).is_err());
    }

    #[test]
    fn test_rule_names() {
        let mut config = RewriterConfig::default();
        config.rules.push(RuleConfig::blog());
        config.rules.push(RuleConfig {
            name: String::new(),
            prefix: "/news".into(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::DuplicateRuleName("blog".into()),
                ValidationError::EmptyRuleName,
            ]
        );
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = RewriterConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
