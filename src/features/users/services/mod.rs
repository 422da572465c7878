mod unsubscribe_signer;
mod user_service;

pub use unsubscribe_signer::UnsubscribeSigner;
pub use user_service::UserService;
