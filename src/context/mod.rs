pub(crate) mod cache;
#[allow(clippy::module_inception)]
pub(crate) mod context;
pub(crate) mod state;
