//! Encrypted form of a wallet query, ready to be turned into SQL.

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum Operator {
    And(Vec<Operator>),
    Or(Vec<Operator>),
    Not(Box<Operator>),
    Eq(TagName, TargetValue),
    Neq(TagName, TargetValue),
    Gt(TagName, TargetValue),
    Gte(TagName, TargetValue),
    Lt(TagName, TargetValue),
    Lte(TagName, TargetValue),
    Like(TagName, TargetValue),
    In(TagName, Vec<TargetValue>),
}

#[derive(Debug, Hash, Clone, PartialEq, Eq)]
pub enum TagName {
    EncryptedTagName(Vec<u8>),
    PlainTagName(Vec<u8>),
}

#[derive(Debug, Hash, Clone, PartialEq, Eq)]
pub enum TargetValue {
    Unencrypted(String),
    Encrypted(Vec<u8>),
}

impl From<String> for TargetValue {
    fn from(value: String) -> TargetValue {
        TargetValue::Unencrypted(value)
    }
}

impl From<Vec<u8>> for TargetValue {
    fn from(value: Vec<u8>) -> TargetValue {
        TargetValue::Encrypted(value)
    }
}
