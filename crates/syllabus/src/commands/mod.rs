//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod export;

pub(crate) use check::CheckArgs;
pub(crate) use export::ExportArgs;
