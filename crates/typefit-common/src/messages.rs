//! Static message catalog for engine diagnostics.
//!
//! Every diagnostic the engine produces is looked up here by symbolic code.
//! Templates may reference named parameters with `{{param}}` tokens; a
//! referenced parameter with no supplied value is a hard configuration
//! error and panics rather than becoming a validation result.

/// One catalog entry: symbolic code plus message template.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MessageEntry {
    pub code: &'static str,
    pub template: &'static str,
}

const fn entry(code: &'static str, template: &'static str) -> MessageEntry {
    MessageEntry { code, template }
}

pub const OBJECT_EXPECTED: MessageEntry = entry("OBJECT_EXPECTED", "object is expected");
pub const NULL_NOT_ALLOWED: MessageEntry = entry("NULL_NOT_ALLOWED", "null is not allowed");
pub const TYPE_EXPECTED: MessageEntry =
    entry("TYPE_EXPECTED", "should be of type {{typeName}}");
pub const INTEGER_EXPECTED: MessageEntry = entry("INTEGER_EXPECTED", "should be integer");
pub const NULL_EXPECTED: MessageEntry = entry("NULL_EXPECTED", "should be null");
pub const SCALAR_EXPECTED: MessageEntry = entry("SCALAR_EXPECTED", "should be scalar");
pub const NOTHING: MessageEntry = entry("NOTHING", "unsatisfiable type");
pub const UNION_TYPE_FAILURE: MessageEntry = entry(
    "UNION_TYPE_FAILURE",
    "object does not match any variant of the union type",
);
pub const UNION_TYPE_FAILURE_DETAILS: MessageEntry =
    entry("UNION_TYPE_FAILURE_DETAILS", "union option: {{msg}}");
pub const UNKNOWN_PROPERTY: MessageEntry =
    entry("UNKNOWN_PROPERTY", "unknown property: '{{propName}}'");
pub const REQUIRED_PROPERTY_MISSING: MessageEntry = entry(
    "REQUIRED_PROPERTY_MISSING",
    "required property '{{propName}}' is missing",
);
pub const MISSING_DISCRIMINATOR: MessageEntry = entry(
    "MISSING_DISCRIMINATOR",
    "instance of '{{rootType}}' subtype has no discriminator property '{{propName}}'",
);
pub const INCORRECT_DISCRIMINATOR: MessageEntry = entry(
    "INCORRECT_DISCRIMINATOR",
    "'{{value}}' is not a valid discriminator value for '{{rootType}}' property '{{propName}}'",
);
pub const DISCRIMINATOR_NEEDED: MessageEntry = entry(
    "DISCRIMINATOR_NEEDED",
    "types '{{name1}}' and '{{name2}}' cannot be distinguished without a discriminator",
);
pub const SAME_DISCRIMINATOR_VALUE: MessageEntry = entry(
    "SAME_DISCRIMINATOR_VALUE",
    "types '{{name1}}' and '{{name2}}' share the same discriminator value",
);
pub const RESTRICTIONS_CONFLICT: MessageEntry = entry(
    "RESTRICTIONS_CONFLICT",
    "restrictions conflict: {{conflictDescription}}",
);
pub const CONFLICTING_RESTRICTIONS: MessageEntry =
    entry("CONFLICTING_RESTRICTIONS", "conflicting restrictions");

/// Substitute `{{param}}` tokens in `entry`'s template with the supplied
/// named values.
///
/// # Panics
///
/// Panics when the template references a parameter that `params` does not
/// supply: the catalog and its call sites ship together, so a missing
/// parameter is a configuration error, not a validation outcome.
pub fn message_text(entry: &MessageEntry, params: &[(&str, &str)]) -> String {
    let template = entry.template;
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            // Unterminated token: emit the remainder verbatim.
            result.push_str(&rest[open..]);
            rest = "";
            break;
        };
        let name = &after[..close];
        match params.iter().find(|(k, _)| *k == name) {
            Some((_, value)) => result.push_str(value),
            None => panic!("Message parameter '{name}' has no value specified."),
        }
        rest = &after[close + 2..];
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_named_params() {
        let text = message_text(&TYPE_EXPECTED, &[("typeName", "number")]);
        assert_eq!(text, "should be of type number");
    }

    #[test]
    fn test_plain_template_passes_through() {
        assert_eq!(message_text(&OBJECT_EXPECTED, &[]), "object is expected");
    }

    #[test]
    fn test_multiple_params() {
        let text = message_text(
            &DISCRIMINATOR_NEEDED,
            &[("name1", "Dog"), ("name2", "Cat")],
        );
        assert!(text.contains("Dog") && text.contains("Cat"));
    }

    #[test]
    #[should_panic(expected = "has no value specified")]
    fn test_missing_param_is_fatal() {
        message_text(&TYPE_EXPECTED, &[]);
    }
}
