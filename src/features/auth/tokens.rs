use rand::RngCore;
use sha2::{Digest, Sha256};

/// Random opaque token (64 hex chars) handed to the client
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash stored in the database in place of the token itself
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
