//! Authentication
//!
//! Every inbound event carries its own bearer token; nothing is cached per
//! connection. A token is either fully valid (HS256 signature, unexpired,
//! non-empty `username` claim) or rejected outright.

mod tokens;

pub use tokens::{
    Identity, TokenError, TokenIssuer, TokenVerifier, BEARER_PREFIX, SIGNING_ALGORITHM,
};
