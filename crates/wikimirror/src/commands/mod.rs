//! CLI command implementations.

pub(crate) mod convert;
pub(crate) mod export;
pub(crate) mod serve;

pub(crate) use convert::ConvertArgs;
pub(crate) use export::ExportArgs;
pub(crate) use serve::ServeArgs;
