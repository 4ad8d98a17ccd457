mod error;
mod hex;
mod token;

pub use error::*;
pub use hex::{ALPHABET, TOKEN_LEN};
pub use token::*;
