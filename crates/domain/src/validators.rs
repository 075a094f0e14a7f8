pub const MAX_NAME_LENGTH: usize = 253;
pub const MAX_LABEL_LENGTH: usize = 63;

/// Checks presentation-form length limits of a domain name.
///
/// A single trailing dot is allowed (fully qualified form). The root name
/// `.` is valid. Character set is not checked; the wire encoder rejects
/// what it cannot represent.
pub fn validate_domain_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("domain name cannot be empty".to_string());
    }
    if name == "." {
        return Ok(());
    }

    let trimmed = name.strip_suffix('.').unwrap_or(name);
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(format!(
            "domain name cannot exceed {MAX_NAME_LENGTH} characters"
        ));
    }

    for label in trimmed.split('.') {
        if label.is_empty() {
            return Err(format!("empty label in '{name}'"));
        }
        if label.len() > MAX_LABEL_LENGTH {
            return Err(format!(
                "label '{label}' exceeds {MAX_LABEL_LENGTH} characters"
            ));
        }
    }
    Ok(())
}
