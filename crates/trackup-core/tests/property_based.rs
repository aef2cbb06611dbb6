//! Property-based tests for template resolution using proptest

use proptest::prelude::*;
use trackup_core::substitution::{split_fixed_versions, substitute, VariableMap};

// Generate variable names the way build systems produce them
fn arb_var_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z][A-Z0-9_]{0,15}").expect("valid regex")
}

// Values without '$' so cross-pass interactions can't reintroduce tokens
fn arb_var_value() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 ./-]{0,20}").expect("valid regex")
}

fn arb_vars() -> impl Strategy<Value = VariableMap> {
    prop::collection::vec((arb_var_name(), arb_var_value()), 0..8).prop_map(|pairs| {
        VariableMap::merge(pairs, std::iter::empty::<(String, String)>())
    })
}

fn arb_template() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 =$_,.-]{0,60}").expect("valid regex")
}

proptest! {
    #[test]
    fn test_second_pass_against_empty_map_is_identity(
        template in arb_template(),
        vars in arb_vars()
    ) {
        let resolved = substitute(&template, &vars);
        let resolved_again = substitute(&resolved, &VariableMap::new());
        prop_assert_eq!(resolved, resolved_again);
    }

    #[test]
    fn test_resolution_never_mutates_inputs(
        template in arb_template(),
        vars in arb_vars()
    ) {
        let vars_before = vars.clone();
        let template_before = template.clone();
        let _ = substitute(&template, &vars);
        prop_assert_eq!(vars, vars_before);
        prop_assert_eq!(template, template_before);
    }

    #[test]
    fn test_unknown_token_left_verbatim(name in arb_var_name()) {
        let template = format!("before ${} after", name);
        let resolved = substitute(&template, &VariableMap::new());
        prop_assert_eq!(resolved, template);
    }

    #[test]
    fn test_known_token_fully_replaced(
        name in arb_var_name(),
        value in arb_var_value()
    ) {
        let vars = VariableMap::merge(
            [(name.clone(), value.clone())],
            std::iter::empty::<(String, String)>(),
        );
        let template = format!("x ${} y ${} z", name, name);
        let resolved = substitute(&template, &vars);
        prop_assert_eq!(resolved, format!("x {} y {} z", value, value));
    }

    #[test]
    fn test_template_without_tokens_is_untouched(
        template in "[a-zA-Z0-9 =,.-]{0,60}",
        vars in arb_vars()
    ) {
        // No '$' anywhere means no token can match
        prop_assert_eq!(substitute(&template, &vars), template);
    }

    #[test]
    fn test_determinism(template in arb_template(), vars in arb_vars()) {
        prop_assert_eq!(substitute(&template, &vars), substitute(&template, &vars));
    }

    #[test]
    fn test_split_preserves_piece_content(
        pieces in prop::collection::vec("[a-zA-Z0-9 .]{1,10}", 1..6)
    ) {
        // Joining the split result reconstructs the trimmed input exactly:
        // interior whitespace is never eaten
        let joined = pieces.join(",");
        let split = split_fixed_versions(&joined);
        prop_assert_eq!(split.join(","), joined.trim());
    }

    #[test]
    fn test_split_piece_count(
        pieces in prop::collection::vec("[a-zA-Z0-9.]{1,10}", 1..6)
    ) {
        let joined = pieces.join(",");
        prop_assert_eq!(split_fixed_versions(&joined).len(), pieces.len());
    }

    #[test]
    fn test_params_always_win_over_env(
        name in arb_var_name(),
        env_value in arb_var_value(),
        param_value in arb_var_value()
    ) {
        let map = VariableMap::merge(
            [(name.clone(), env_value)],
            [(name.clone(), param_value.clone())],
        );
        prop_assert_eq!(map.get(&name), Some(param_value.as_str()));
    }
}
