/// Record type marker for link secrets; the stored value is the decimal
/// representation of the secret.
#[derive(Debug, Deserialize, Serialize)]
pub struct MasterSecret {
    pub value: String,
}
