use bcrypt::{DEFAULT_COST, hash, verify};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(bcrypt::BcryptError),
    #[error("Password verification failed: {0}")]
    VerificationFailed(bcrypt::BcryptError),
}

pub struct PasswordManager;

impl PasswordManager {
    pub fn hash(password: &str) -> Result<String, PasswordError> {
        hash(password, DEFAULT_COST).map_err(PasswordError::HashingFailed)
    }

    pub fn verify(password: &str, hash: &str) -> Result<bool, PasswordError> {
        verify(password, hash).map_err(PasswordError::VerificationFailed)
    }

    /// Vérifie la force d'un mot de passe: 8 caractères minimum,
    /// au moins une majuscule, une minuscule et un chiffre.
    pub fn is_strong(password: &str) -> bool {
        if password.len() < 8 {
            return false;
        }
        let (mut upper, mut lower, mut digit) = (false, false, false);
        for c in password.chars() {
            upper |= c.is_uppercase();
            lower |= c.is_lowercase();
            digit |= c.is_ascii_digit();
            if upper && lower && digit {
                return true;
            }
        }
        upper && lower && digit
    }
}

#[cfg(test)]
mod tests {
    use super::PasswordManager;

    #[test]
    fn verify_returns_true_when_password_matches() {
        let password = "secure_password_@123P";
        let hashed = PasswordManager::hash(password).expect("Hashing failed");

        assert!(PasswordManager::verify(password, &hashed).expect("Verification failed"));
    }

    #[test]
    fn verify_returns_false_when_password_does_not_match() {
        let password = "secure_password_@123P";
        let hashed = PasswordManager::hash(password).expect("Hashing failed");

        assert!(
            !PasswordManager::verify("wrong_password_@123", &hashed).expect("Verification failed")
        );
    }

    #[test]
    fn hashes_differ_for_different_passwords() {
        let hash1 = PasswordManager::hash("account1_password").unwrap();
        let hash2 = PasswordManager::hash("account2_password").unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn verify_fails_when_case_differs() {
        let password = "MyPassword1";
        let hash = PasswordManager::hash(password).unwrap();

        let wrong_case = "mypassword1";
        let result = PasswordManager::verify(wrong_case, &hash);

        assert!(result.is_ok());
        assert!(!result.unwrap()); // Should be false, not error
    }

    #[test]
    fn is_strong_accepts_mixed_case_with_digit() {
        assert!(PasswordManager::is_strong("GoodPass1"));
    }

    #[test]
    fn is_strong_rejects_short_or_uniform_passwords() {
        assert!(!PasswordManager::is_strong("Ab1"));
        assert!(!PasswordManager::is_strong("alllowercase1"));
        assert!(!PasswordManager::is_strong("ALLUPPERCASE1"));
        assert!(!PasswordManager::is_strong("NoDigitsHere"));
    }
}
