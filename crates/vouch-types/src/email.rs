use crate::error::{TypeError, TypeResult};

/// Canonical form of an email: surrounding whitespace trimmed, lowercased.
///
/// This is the exact text whose UTF-8 bytes are hashed and signed. The
/// signing and verifying sides must both go through this function.
pub fn canonical_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Validate an email address and return its canonical form.
///
/// Accepts `local@domain.tld` shapes: no whitespace, exactly one `@`, a
/// non-empty local part, and a domain with a dot that is neither first nor
/// last.
pub fn parse_email(raw: &str) -> TypeResult<String> {
    let email = canonical_email(raw);
    if email.is_empty() {
        return Err(TypeError::InvalidEmail("email is required".into()));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(TypeError::InvalidEmail(email));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(TypeError::InvalidEmail(email));
    };
    if local.is_empty() || domain.contains('@') {
        return Err(TypeError::InvalidEmail(email));
    }

    let has_inner_dot = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
    if !has_inner_dot {
        return Err(TypeError::InvalidEmail(email));
    }

    Ok(email)
}
