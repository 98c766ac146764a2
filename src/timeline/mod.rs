pub(crate) mod dsl;
pub(crate) mod model;
pub(crate) mod position;
pub(crate) mod resolve;
