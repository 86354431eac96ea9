pub(crate) mod artifacts;
pub(crate) mod cache;
pub(crate) mod driver;
