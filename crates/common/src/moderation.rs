use serde::{Deserialize, Serialize};

/// A single product's flag/remark update within a batch.
///
/// `remarks` stays a list of raw strings on the wire; the server decides what
/// to do with duplicates and unknown tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemarkEdit {
    pub product_id: i64,
    pub is_flagged: bool,
    #[serde(default)]
    pub remarks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRemarksRequest {
    pub products: Vec<RemarkEdit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRemarksResponse {
    pub success: bool,
    pub message: String,
}
