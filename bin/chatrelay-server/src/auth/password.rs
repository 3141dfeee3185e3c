//! Password hashing and strength rules.

use bcrypt::{hash, verify, BcryptError};

use super::token::generate_key;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Passwords rejected outright, compared lower-cased and trimmed.
const COMMON_PASSWORDS: &[&str] = &[
    "123456", "password", "12345678", "qwerty", "123456789", "12345", "1234", "111111",
    "1234567", "dragon", "123123", "baseball", "abc123", "football", "monkey", "letmein",
    "696969", "shadow", "master", "666666", "qwertyuiop", "123321", "mustang", "1234567890",
    "michael", "654321", "superman", "1qaz2wsx", "7777777", "121212", "000000", "qazwsx",
    "123qwe", "killer", "trustno1", "jordan", "jennifer", "zxcvbnm", "asdfgh", "hunter",
    "buster", "soccer", "harley", "batman", "andrew", "tigger", "sunshine", "iloveyou",
    "2000", "charlie", "robert", "thomas", "hockey", "ranger", "daniel", "starwars",
    "klaster", "112233", "george", "computer", "michelle", "jessica", "pepper", "1111",
    "zxcvbn", "555555", "11111111", "131313", "freedom", "777777", "pass", "maggie",
    "159753", "aaaaaa", "ginger", "princess", "joshua", "cheese", "amanda", "summer",
    "love", "ashley", "nicole", "chelsea", "biteme", "matthew", "access", "yankees",
    "987654321", "dallas", "austin", "thunder", "taylor", "matrix", "password1",
    "password123", "welcome", "welcome1", "admin", "admin123", "qwerty123", "passw0rd",
    "changeme", "secret", "letmein1", "iloveyou1", "football1", "baseball1",
];

pub fn hash_password(password: &str, cost: u32) -> Result<String, BcryptError> {
    hash(password, cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, BcryptError> {
    verify(password, hash)
}

/// Hash of a random throwaway password at `cost`.
///
/// Logins for unknown usernames are verified against it so they take as long
/// as logins for existing accounts.
pub fn dummy_password_hash(cost: u32) -> Result<String, BcryptError> {
    hash(generate_key(), cost)
}

/// Check `password` against the strength rules.
///
/// Every failing rule contributes one message, in rule order: length,
/// common-password list, all-digits.
pub fn validate_password(password: &str) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        problems.push(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
        ));
    }

    let normalized = password.trim().to_lowercase();
    if COMMON_PASSWORDS.contains(&normalized.as_str()) {
        problems.push("This password is too common.".to_owned());
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_owned());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strong_password_passes() {
        assert!(validate_password("correct-horse-battery").is_ok());
    }

    #[test]
    fn short_password_is_rejected() {
        let problems = validate_password("a1b2c").unwrap_err();
        assert_eq!(
            problems,
            vec!["This password is too short. It must contain at least 8 characters."]
        );
    }

    #[test]
    fn common_password_is_rejected_case_insensitively() {
        let problems = validate_password("  PassWord123 ").unwrap_err();
        assert_eq!(problems, vec!["This password is too common."]);
    }

    #[test]
    fn all_rules_report_in_order() {
        let problems = validate_password("123456").unwrap_err();
        assert_eq!(problems.len(), 3);
        assert!(problems[0].contains("too short"));
        assert!(problems[1].contains("too common"));
        assert!(problems[2].contains("entirely numeric"));
    }

    #[test]
    fn numeric_only_password_is_rejected() {
        let problems = validate_password("8675309123").unwrap_err();
        assert_eq!(problems, vec!["This password is entirely numeric."]);
    }

    #[test]
    fn non_decimal_numerals_are_not_numeric() {
        assert!(validate_password("ⅫⅫⅫⅫ½½½½").is_ok());
    }

    #[test]
    fn dummy_hash_matches_nothing_obvious() {
        let dummy = dummy_password_hash(4).unwrap();
        assert!(dummy.starts_with("$2b$04$"));
        assert!(!verify_password("", &dummy).unwrap());
        assert!(!verify_password("Tr1cky-Secret", &dummy).unwrap());
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let hashed = hash_password("s3cret-enough", 4).unwrap();
        assert_ne!(hashed, "s3cret-enough");
        assert!(verify_password("s3cret-enough", &hashed).unwrap());
        assert!(!verify_password("wrong-guess", &hashed).unwrap());
    }
}
