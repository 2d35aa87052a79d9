use serde::Serialize;

use super::api::Root;
use super::model::Models;
use crate::error::ErrorReport;
use crate::transform::naming::NameTable;

/// Everything resolution produces for one document, ready for an emitter.
#[derive(Debug, Clone, Serialize)]
pub struct IrSpec {
    pub info: IrInfo,
    pub servers: Vec<IrServer>,
    pub root: Root,
    pub models: Models,
    pub names: NameTable,
    pub report: ErrorReport,
}

/// API metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrInfo {
    pub title: String,
    pub description: Option<String>,
    pub version: String,
}

/// A server URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrServer {
    pub url: String,
    pub description: Option<String>,
}
