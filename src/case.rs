//! Conversions between the two spellings a flag or route can be addressed by.
//!
//! Internal names are camelCase; the scanner and the help renderer can
//! additionally speak kebab-case. Conversions only touch ASCII letters,
//! anything else passes through unchanged.

/// `colorOutput` -> `color-output`
pub(crate) fn camel_to_kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `color-output` -> `colorOutput`
pub(crate) fn kebab_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `colorOutput` -> `ColorOutput`, used to build the `no<Camel>` negation form
pub(crate) fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) => c.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Both spellings a default-true boolean can be negated with
pub(crate) fn negated_forms(name: &str) -> (String, String) {
    (
        format!("no{}", upper_first(name)),
        format!("no-{}", camel_to_kebab(name)),
    )
}
