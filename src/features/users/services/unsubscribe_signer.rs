use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies the per-user token carried by unsubscribe links
#[derive(Clone)]
pub struct UnsubscribeSigner {
    key: Vec<u8>,
}

impl UnsubscribeSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self, user_id: Uuid) -> HmacSha256 {
        // HMAC accepts keys of any length
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(b"unsubscribe:");
        mac.update(user_id.as_bytes());
        mac
    }

    /// Hex token for `user_id`
    pub fn sign(&self, user_id: Uuid) -> String {
        hex::encode(self.mac(user_id).finalize().into_bytes())
    }

    /// Constant-time check of a token received in a link
    pub fn verify(&self, user_id: Uuid, token: &str) -> bool {
        let Ok(bytes) = hex::decode(token) else {
            return false;
        };
        self.mac(user_id).verify_slice(&bytes).is_ok()
    }
}
