//! Response middleware.

pub(crate) mod logging;
pub(crate) mod security;
