use serde::{Deserialize, Serialize, ser::SerializeTuple};
use serde_json::{Map, Value};

/// Arguments of a `count_contigs` call.
///
/// The service takes positional parameters, so this serializes as the JSON array
/// `[workspace_name, contigset_id]`. The order is part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountContigsParams<'a> {
    /// Name of the workspace holding the ContigSet.
    pub workspace_name: &'a str,
    /// Identifier of the ContigSet to count.
    pub contigset_id: &'a str,
}

impl Serialize for CountContigsParams<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(self.workspace_name)?;
        tuple.serialize_element(self.contigset_id)?;
        tuple.end()
    }
}

/// The record returned by `count_contigs`.
///
/// Only `contig_count` is known to this client; anything else the server sends is kept
/// untouched in `additional_properties`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountContigsResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contig_count: Option<i64>,
    #[serde(flatten)]
    pub additional_properties: Map<String, Value>,
}
