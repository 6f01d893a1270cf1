/// Attributes of the `PLMXML` root element and the transfer `Header`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentHeader {
    pub schema_version: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub transfer_context: Option<String>,
}
