/*
 * Responsibility
 * - shared-secret check for forced (administrative) writes
 * - compares SHA-256 digests so the comparison does not depend on where the
 *   strings first differ or on their length
 */
use sha2::{Digest, Sha256};

#[derive(Clone)]
pub struct ForceWriteSecret {
    digest: [u8; 32],
}

impl ForceWriteSecret {
    pub fn new(secret: &str) -> Self {
        Self {
            digest: Sha256::digest(secret.as_bytes()).into(),
        }
    }

    pub fn matches(&self, candidate: Option<&str>) -> bool {
        let Some(candidate) = candidate else {
            return false;
        };
        let candidate: [u8; 32] = Sha256::digest(candidate.as_bytes()).into();

        self.digest
            .iter()
            .zip(candidate.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl std::fmt::Debug for ForceWriteSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ForceWriteSecret(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_exact_secret_matches() {
        let secret = ForceWriteSecret::new("fortune");

        assert!(secret.matches(Some("fortune")));
        assert!(!secret.matches(Some("Fortune")));
        assert!(!secret.matches(Some("")));
        assert!(!secret.matches(None));
    }
}
