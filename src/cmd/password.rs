//! Password strength policy, checked by the CLI unless
//! `--ignore-password-policy` is given.

const SYMBOLS: &str = "!@#$%^&*()_+=";
const MIN_LENGTH: usize = 10;

/// Length ≥ 10, at least one uppercase, lowercase, digit, and one of
/// `!@#$%^&*()_+=`; any character outside those four classes rejects.
pub fn check(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_LENGTH {
        return Err(format!("Password must be at least {MIN_LENGTH} characters long."));
    }

    let mut has_upper = false;
    let mut has_lower = false;
    let mut has_digit = false;
    let mut has_symbol = false;

    for c in password.chars() {
        if c.is_ascii_uppercase() {
            has_upper = true;
        } else if c.is_ascii_lowercase() {
            has_lower = true;
        } else if c.is_ascii_digit() {
            has_digit = true;
        } else if SYMBOLS.contains(c) {
            has_symbol = true;
        } else {
            return Err(format!("Password contains a disallowed character: '{c}'."));
        }
    }

    if !(has_upper && has_lower && has_digit && has_symbol) {
        return Err(format!(
            "Password must contain an uppercase letter, a lowercase letter, a digit, and one of {SYMBOLS}."
        ));
    }

    Ok(())
}
