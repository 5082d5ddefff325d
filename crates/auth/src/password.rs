//! One-way password hash provider contract.

/// Opaque hash-and-verify capability.
///
/// The rule engine and the account executors consume this without knowing
/// the hashing scheme; production wires Argon2 (see `atrium-infra`), tests
/// wire a plaintext stand-in.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> anyhow::Result<String>;

    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}
