use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Random key for a new message record.
pub fn message_id() -> String {
    Uuid::new_v4().to_string()
}

/// Random single-use login token.
pub fn login_token() -> String {
    Uuid::new_v4().to_string()
}

/// Deterministic key for one (message, recipient, option) outcome.
///
/// Hashes `LE-u32(recipient) || LE-u32(option) || message id bytes`, where
/// the message id bytes are exactly its bucket key in canonical string form.
/// The same triple always yields the same key, so selection links can embed
/// it directly and re-materialization is idempotent.
pub fn response_id(message_id: &str, recipient: u32, option: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(recipient.to_le_bytes());
    hasher.update(option.to_le_bytes());
    hasher.update(message_id.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_id_is_deterministic() {
        let id = message_id();
        assert_eq!(response_id(&id, 0, 1), response_id(&id, 0, 1));
    }

    #[test]
    fn response_id_changes_with_any_input() {
        let id = message_id();
        let base = response_id(&id, 0, 1);
        assert_ne!(base, response_id(&id, 1, 1));
        assert_ne!(base, response_id(&id, 0, 2));
        assert_ne!(base, response_id(&message_id(), 0, 1));
    }

    #[test]
    fn random_ids_are_unique() {
        assert_ne!(message_id(), message_id());
        assert_ne!(login_token(), login_token());
    }
}
