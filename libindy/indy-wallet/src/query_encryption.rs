use indy_api_types::errors::prelude::*;
use indy_utils::wql::Query;

use super::{
    encryption::encrypt_as_searchable,
    language::{Operator, TagName, TargetValue},
    wallet::Keys,
};

/// Translates a WQL query into a storage operator, encrypting tag names and
/// the values of encrypted tags.
pub(super) fn encrypt_query(query: Query, keys: &Keys) -> IndyResult<Operator> {
    encrypt_operator(query.optimise(), keys)
}

fn encrypt_operator(op: Query, keys: &Keys) -> IndyResult<Operator> {
    match op {
        Query::And(suboperators) => {
            transform_list_operators(suboperators, keys).map(Operator::And)
        }
        Query::Or(suboperators) => transform_list_operators(suboperators, keys).map(Operator::Or),
        Query::Not(suboperator) => {
            encrypt_operator(*suboperator, keys).map(|op| Operator::Not(Box::new(op)))
        }
        Query::Eq(name, value) => {
            let (name, value) = encrypt_name_value(&name, &value, keys)?;
            Ok(Operator::Eq(name, value))
        }
        Query::Neq(name, value) => {
            let (name, value) = encrypt_name_value(&name, &value, keys)?;
            Ok(Operator::Neq(name, value))
        }
        Query::Gt(name, value) => {
            let (name, value) = plaintext_only(&name, value, "$gt", keys)?;
            Ok(Operator::Gt(name, value))
        }
        Query::Gte(name, value) => {
            let (name, value) = plaintext_only(&name, value, "$gte", keys)?;
            Ok(Operator::Gte(name, value))
        }
        Query::Lt(name, value) => {
            let (name, value) = plaintext_only(&name, value, "$lt", keys)?;
            Ok(Operator::Lt(name, value))
        }
        Query::Lte(name, value) => {
            let (name, value) = plaintext_only(&name, value, "$lte", keys)?;
            Ok(Operator::Lte(name, value))
        }
        Query::Like(name, value) => {
            let (name, value) = plaintext_only(&name, value, "$like", keys)?;
            Ok(Operator::Like(name, value))
        }
        Query::In(name, values) => {
            let ename = encrypt_name(&name, keys)?;
            let is_plain = matches!(ename, TagName::PlainTagName(_));

            let evalues = values
                .into_iter()
                .map(|value| {
                    if is_plain {
                        Ok(TargetValue::Unencrypted(value))
                    } else {
                        encrypt_value(&value, keys)
                    }
                })
                .collect::<IndyResult<Vec<TargetValue>>>()?;

            Ok(Operator::In(ename, evalues))
        }
    }
}

fn transform_list_operators(operators: Vec<Query>, keys: &Keys) -> IndyResult<Vec<Operator>> {
    operators
        .into_iter()
        .map(|op| encrypt_operator(op, keys))
        .collect()
}

fn plaintext_only(
    name: &str,
    value: String,
    operator: &str,
    keys: &Keys,
) -> IndyResult<(TagName, TargetValue)> {
    match encrypt_name(name, keys)? {
        TagName::PlainTagName(ename) => {
            Ok((TagName::PlainTagName(ename), TargetValue::Unencrypted(value)))
        }
        TagName::EncryptedTagName(_) => Err(err_msg(
            IndyErrorKind::WalletQueryError,
            format!("{operator} can only be applied to a plaintext tag, {name} is encrypted"),
        )),
    }
}

fn encrypt_name_value(
    name: &str,
    value: &str,
    keys: &Keys,
) -> IndyResult<(TagName, TargetValue)> {
    let ename = encrypt_name(name, keys)?;

    let evalue = match ename {
        TagName::PlainTagName(_) => TargetValue::Unencrypted(value.to_string()),
        TagName::EncryptedTagName(_) => encrypt_value(value, keys)?,
    };

    Ok((ename, evalue))
}

fn encrypt_name(name: &str, keys: &Keys) -> IndyResult<TagName> {
    if let Some(plain_name) = name.strip_prefix('~') {
        let ename = encrypt_as_searchable(
            plain_name.as_bytes(),
            &keys.tag_name_key,
            &keys.tags_hmac_key,
        )?;
        Ok(TagName::PlainTagName(ename))
    } else {
        let ename =
            encrypt_as_searchable(name.as_bytes(), &keys.tag_name_key, &keys.tags_hmac_key)?;
        Ok(TagName::EncryptedTagName(ename))
    }
}

fn encrypt_value(value: &str, keys: &Keys) -> IndyResult<TargetValue> {
    let evalue =
        encrypt_as_searchable(value.as_bytes(), &keys.tag_value_key, &keys.tags_hmac_key)?;
    Ok(TargetValue::Encrypted(evalue))
}

#[cfg(test)]
mod tests {
    use indy_utils::wql;

    use super::*;

    #[test]
    fn equality_on_encrypted_tag_encrypts_value() {
        let keys = Keys::new();
        let query = wql::parse_from_json(r#"{"k1": "v1"}"#).unwrap();

        match encrypt_query(query, &keys).unwrap() {
            Operator::Eq(TagName::EncryptedTagName(_), TargetValue::Encrypted(_)) => {}
            other => panic!("unexpected operator {other:?}"),
        }
    }

    #[test]
    fn plaintext_tag_keeps_value() {
        let keys = Keys::new();
        let query = wql::parse_from_json(r#"{"~k1": {"$gte": "10"}}"#).unwrap();

        match encrypt_query(query, &keys).unwrap() {
            Operator::Gte(TagName::PlainTagName(_), TargetValue::Unencrypted(value)) => {
                assert_eq!(value, "10")
            }
            other => panic!("unexpected operator {other:?}"),
        }
    }

    #[test]
    fn range_and_like_on_encrypted_tag_fail() {
        let keys = Keys::new();

        for json in [
            r#"{"k1": {"$gt": "1"}}"#,
            r#"{"k1": {"$lte": "1"}}"#,
            r#"{"k1": {"$like": "1%"}}"#,
        ] {
            let query = wql::parse_from_json(json).unwrap();
            let err = encrypt_query(query, &keys).unwrap_err();
            assert_eq!(err.kind(), IndyErrorKind::WalletQueryError);
        }
    }

    #[test]
    fn in_on_encrypted_tag_encrypts_every_value() {
        let keys = Keys::new();
        let query = wql::parse_from_json(r#"{"k1": {"$in": ["a", "b"]}}"#).unwrap();

        match encrypt_query(query, &keys).unwrap() {
            Operator::In(TagName::EncryptedTagName(_), values) => {
                assert_eq!(values.len(), 2);
                assert!(values
                    .iter()
                    .all(|value| matches!(value, TargetValue::Encrypted(_))));
            }
            other => panic!("unexpected operator {other:?}"),
        }
    }
}
