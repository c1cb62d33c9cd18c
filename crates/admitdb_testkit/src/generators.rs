//! Property-based test generators using proptest.

use proptest::prelude::*;
use serde_json::{json, Value};

/// Strategy for generating plausible email addresses.
pub fn email_strategy() -> impl Strategy<Value = String> {
    (
        prop::string::string_regex("[a-z][a-z0-9.]{0,11}").expect("Invalid regex"),
        prop::sample::select(vec!["example.com", "uni.edu", "mail.org"]),
    )
        .prop_map(|(user, domain)| format!("{user}@{domain}"))
}

/// Strategy for generating person names.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z][a-z]{1,9}( [A-Z][a-z]{1,9})?").expect("Invalid regex")
}

/// Strategy for generating indexable field values.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::string::string_regex("[a-z]{0,8}")
            .expect("Invalid regex")
            .prop_map(Value::String),
        any::<i32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::Bool),
    ]
}

/// Strategy for generating student-like records without an `id`.
pub fn student_record_strategy() -> impl Strategy<Value = Value> {
    (
        email_strategy(),
        name_strategy(),
        prop::option::of(prop::string::string_regex("[0-9]{10}").expect("Invalid regex")),
    )
        .prop_map(|(email, name, phone)| {
            json!({
                "email": email,
                "name": name,
                "phone": phone,
            })
        })
}

/// Strategy for generating `n` distinct emails.
pub fn distinct_emails_strategy(n: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set(email_strategy(), n).prop_map(|set| set.into_iter().collect())
}
