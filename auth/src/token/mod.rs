pub mod claims;
pub mod codec;
pub mod errors;
pub mod secret;

pub use claims::Claims;
pub use codec::TokenCodec;
pub use errors::TokenError;
pub use secret::SigningSecret;
