pub mod apple;
pub mod crypto;
pub mod headers;
pub mod logging;
