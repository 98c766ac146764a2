pub(crate) mod mount;
pub(crate) mod signal;
pub(crate) mod summary;
