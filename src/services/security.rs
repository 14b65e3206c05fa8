use rand::Rng;

use crate::error::Result;

/// bcrypt work factor used for every new hash
pub const PASSWORD_HASH_COST: u32 = 10;

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String> {
    Ok(bcrypt::hash(password, PASSWORD_HASH_COST)?)
}

/// Verify a password against the stored value.
///
/// Accounts carried over from the spreadsheet era still store the password
/// in plaintext; those match only on exact equality.
pub fn verify_password(password: &str, stored: &str) -> bool {
    if bcrypt::verify(password, stored).unwrap_or(false) {
        return true;
    }
    !looks_like_bcrypt(stored) && password == stored
}

fn looks_like_bcrypt(value: &str) -> bool {
    value.len() == 60 && ["$2a$", "$2b$", "$2y$"].iter().any(|p| value.starts_with(p))
}

/// Task identifier: `TASK-<unix millis>-<4 random digits>`
pub fn generate_task_id() -> String {
    let suffix: u16 = rand::rng().random_range(0..10_000);
    format!(
        "TASK-{}-{:04}",
        chrono::Utc::now().timestamp_millis(),
        suffix
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3nha").unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("s3nha", &hash));
        assert!(!verify_password("S3nha", &hash));
    }

    #[test]
    fn test_legacy_plaintext_requires_exact_match() {
        assert!(verify_password("123", "123"));
        assert!(!verify_password("1234", "123"));
        assert!(!verify_password(" 123", "123"));
    }

    #[test]
    fn test_hash_is_not_accepted_as_plaintext() {
        let hash = hash_password("abc").unwrap();
        assert!(!verify_password(&hash, &hash));
    }

    #[test]
    fn test_generate_task_id_format() {
        let id = generate_task_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "TASK");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }
}
