//! Build-parameter substitution: literal `$name` token replacement
//!
//! Substitution is literal-substring based, not regex based. A token is
//! `$` followed by a variable name, matched verbatim against every key in
//! the variable map; on match, every occurrence is replaced by the
//! variable's value. Replacement output is not re-scanned within a pass,
//! and a token with no matching variable is left verbatim.

use crate::types::InputConfig;
use memchr::memmem;
use std::collections::BTreeMap;

/// Token prefix for build parameters in templates
const PARAMETER_PREFIX: char = '$';

/// Delimiter separating fixed version names
const VERSION_DELIMITER: char = ',';

/// Immutable snapshot of the variables visible to one execution.
///
/// Built by merging the host environment with build-scoped parameters;
/// parameters override environment values on key collision. Backed by a
/// `BTreeMap` so iteration order (and therefore substitution order) is the
/// key order — re-resolving with equal inputs is always bit-identical.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableMap {
    vars: BTreeMap<String, String>,
}

impl VariableMap {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge environment variables and build-scoped parameters.
    ///
    /// Parameters are inserted last, so they win on key collision.
    pub fn merge<E, P, K1, V1, K2, V2>(env: E, params: P) -> Self
    where
        E: IntoIterator<Item = (K1, V1)>,
        P: IntoIterator<Item = (K2, V2)>,
        K1: Into<String>,
        V1: Into<String>,
        K2: Into<String>,
        V2: Into<String>,
    {
        let mut vars: BTreeMap<String, String> = env
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        for (k, v) in params {
            vars.insert(k.into(), v.into());
        }
        Self { vars }
    }

    /// Look up a variable value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Iterate (name, value) pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True when no variables are present
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Replace every literal occurrence of each `$name` token with the
/// variable's value.
///
/// Variables are applied one at a time in map order; each pass scans the
/// accumulated string. The `memmem` containment check avoids allocating a
/// new string for variables whose token never appears.
pub fn substitute(template: &str, vars: &VariableMap) -> String {
    let mut out = template.to_string();
    if out.is_empty() || vars.is_empty() {
        return out;
    }

    let mut token = String::new();
    for (name, value) in vars.iter() {
        token.clear();
        token.push(PARAMETER_PREFIX);
        token.push_str(name);
        if memmem::find(out.as_bytes(), token.as_bytes()).is_some() {
            out = out.replace(token.as_str(), value);
        }
    }
    out
}

/// Split a resolved fixed-versions string into version names.
///
/// Only the overall string is trimmed before the split; the pieces are
/// not individually trimmed, so interior and post-delimiter whitespace is
/// preserved (`"1.0, 2.0"` → `["1.0", " 2.0"]`). An empty trimmed string
/// yields an empty list.
pub fn split_fixed_versions(resolved: &str) -> Vec<String> {
    let trimmed = resolved.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed
        .split(VERSION_DELIMITER)
        .map(str::to_string)
        .collect()
}

/// The five resolved template values plus the parsed version-name list.
///
/// Constructed once per execution after the variable map is fully
/// assembled, then passed by reference through the orchestration call
/// chain. Never mutated, so concurrent executions of the same configured
/// step cannot leak stale values into each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedContext {
    /// Resolved issue query
    pub jql: String,
    /// Resolved workflow transition name
    pub workflow_action_name: String,
    /// Resolved comment body
    pub comment: String,
    /// Resolved custom-field value
    pub custom_field_value: String,
    /// Parsed fixed-version names, in template order
    pub fixed_version_names: Vec<String>,
}

impl ResolvedContext {
    /// Resolve the five templates of `config` against `vars`.
    ///
    /// Absent templates resolve to the empty string. Resolution is pure:
    /// it cannot fail and mutates neither input.
    pub fn resolve(config: &InputConfig<'_>, vars: &VariableMap) -> Self {
        let fixed_raw = config.fixed_versions.as_deref().unwrap_or("").trim();
        let fixed_expanded = substitute(fixed_raw, vars);

        Self {
            jql: substitute(config.jql.as_deref().unwrap_or(""), vars),
            workflow_action_name: substitute(
                config.workflow_action_name.as_deref().unwrap_or(""),
                vars,
            ),
            comment: substitute(config.comment.as_deref().unwrap_or(""), vars),
            custom_field_value: substitute(
                config.custom_field_value.as_deref().unwrap_or(""),
                vars,
            ),
            fixed_version_names: split_fixed_versions(&fixed_expanded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    fn vars(pairs: &[(&str, &str)]) -> VariableMap {
        VariableMap::merge(pairs.iter().copied(), std::iter::empty::<(&str, &str)>())
    }

    #[test]
    fn test_substitute_single_token() {
        let v = vars(&[("BUILD_NUMBER", "42")]);
        assert_eq!(
            substitute("project=DEMO and build=$BUILD_NUMBER", &v),
            "project=DEMO and build=42"
        );
    }

    #[test]
    fn test_substitute_every_occurrence() {
        let v = vars(&[("X", "y")]);
        assert_eq!(substitute("$X $X $X", &v), "y y y");
    }

    #[test]
    fn test_substitute_unknown_token_left_verbatim() {
        let v = vars(&[("KNOWN", "v")]);
        assert_eq!(substitute("$KNOWN and $UNKNOWN", &v), "v and $UNKNOWN");
    }

    #[test]
    fn test_substitute_empty_template() {
        let v = vars(&[("A", "1")]);
        assert_eq!(substitute("", &v), "");
    }

    #[test]
    fn test_substitute_no_vars() {
        assert_eq!(substitute("$A stays", &VariableMap::new()), "$A stays");
    }

    #[test]
    fn test_substitute_is_literal_not_regex() {
        // Metacharacter-looking names and values must pass through verbatim
        let v = vars(&[("RE.GEX", "a+b")]);
        assert_eq!(substitute("x $RE.GEX y", &v), "x a+b y");
    }

    #[test]
    fn test_substitute_replacement_not_rescanned() {
        // A value containing a token-looking string survives when its
        // variable sorts earlier than the one referencing it
        let v = vars(&[("A", "$Z"), ("Z", "never")]);
        // "$A" is replaced by "$Z" first, then the $Z pass rewrites it —
        // serial per-variable passes see the accumulated string
        assert_eq!(substitute("$A", &v), "never");
        // but within a single pass, output is not re-scanned
        let v2 = vars(&[("Z", "$Z")]);
        assert_eq!(substitute("$Z", &v2), "$Z");
    }

    #[test]
    fn test_params_override_env() {
        let map = VariableMap::merge(
            [("HOME", "/root"), ("STAGE", "dev")],
            [("STAGE", "prod")],
        );
        assert_eq!(map.get("STAGE"), Some("prod"));
        assert_eq!(map.get("HOME"), Some("/root"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_split_fixed_versions_preserves_interior_whitespace() {
        assert_eq!(split_fixed_versions("1.0, 2.0"), vec!["1.0", " 2.0"]);
    }

    #[test]
    fn test_split_fixed_versions_outer_trim_only() {
        assert_eq!(split_fixed_versions("  1.0 ,2.0  "), vec!["1.0 ", "2.0"]);
    }

    #[test]
    fn test_split_fixed_versions_empty() {
        assert_eq!(split_fixed_versions(""), Vec::<String>::new());
        assert_eq!(split_fixed_versions("   "), Vec::<String>::new());
    }

    #[test]
    fn test_resolved_context_absent_templates() {
        let config = InputConfig::default();
        let ctx = ResolvedContext::resolve(&config, &VariableMap::new());
        assert_eq!(ctx.jql, "");
        assert_eq!(ctx.workflow_action_name, "");
        assert_eq!(ctx.comment, "");
        assert_eq!(ctx.custom_field_value, "");
        assert!(ctx.fixed_version_names.is_empty());
    }

    #[test]
    fn test_resolved_context_full() {
        let config = InputConfig {
            jql: Some(Cow::Borrowed("project=$PROJECT and status=Resolved")),
            workflow_action_name: Some(Cow::Borrowed("Close Issue")),
            comment: Some(Cow::Borrowed("Released in build $BUILD_NUMBER")),
            custom_field_value: Some(Cow::Borrowed("$BUILD_NUMBER")),
            fixed_versions: Some(Cow::Borrowed(" $V1, $V2 ")),
            ..Default::default()
        };
        let v = vars(&[("PROJECT", "DEMO"), ("BUILD_NUMBER", "42"), ("V1", "1.0"), ("V2", "2.0")]);
        let ctx = ResolvedContext::resolve(&config, &v);

        assert_eq!(ctx.jql, "project=DEMO and status=Resolved");
        assert_eq!(ctx.workflow_action_name, "Close Issue");
        assert_eq!(ctx.comment, "Released in build 42");
        assert_eq!(ctx.custom_field_value, "42");
        assert_eq!(ctx.fixed_version_names, vec!["1.0", " 2.0"]);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let config = InputConfig {
            jql: Some(Cow::Borrowed("$A $B $C")),
            ..Default::default()
        };
        let v = vars(&[("A", "1"), ("B", "2"), ("C", "3")]);
        assert_eq!(
            ResolvedContext::resolve(&config, &v),
            ResolvedContext::resolve(&config, &v)
        );
    }
}
