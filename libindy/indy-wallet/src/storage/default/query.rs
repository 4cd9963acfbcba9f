use indy_api_types::errors::prelude::*;

use crate::language::{Operator, TagName, TargetValue};

#[derive(Debug)]
pub enum ToSQL<'a> {
    ByteSlice(&'a [u8]),
    CharSlice(&'a str),
}

impl<'a> From<&'a Vec<u8>> for ToSQL<'a> {
    fn from(item: &'a Vec<u8>) -> Self {
        ToSQL::ByteSlice(item.as_slice())
    }
}

impl<'a> From<&'a [u8]> for ToSQL<'a> {
    fn from(item: &'a [u8]) -> Self {
        ToSQL::ByteSlice(item)
    }
}

impl<'a> From<&'a String> for ToSQL<'a> {
    fn from(item: &'a String) -> Self {
        ToSQL::CharSlice(item.as_str())
    }
}

impl<'a> From<&'a TargetValue> for ToSQL<'a> {
    fn from(item: &'a TargetValue) -> Self {
        match item {
            TargetValue::Encrypted(value) => ToSQL::ByteSlice(value.as_slice()),
            TargetValue::Unencrypted(value) => ToSQL::CharSlice(value.as_str()),
        }
    }
}

// Translates Wallet Query Language to SQL
// WQL input is provided as a reference to a top level Operator
// Result is a tuple of query string and query arguments
pub fn wql_to_sql<'a>(
    type_: &'a [u8],
    op: &'a Operator,
    _options: Option<&str>,
) -> IndyResult<(String, Vec<ToSQL<'a>>)> {
    let mut arguments: Vec<ToSQL> = Vec::new();
    arguments.push(type_.into());

    let clause_string = operator_to_sql(op, &mut arguments)?;

    const BASE: &str =
        "SELECT i.id, i.name, i.value, i.key, i.type FROM items as i WHERE i.type = ?";

    if !clause_string.is_empty() {
        let mut query_string = BASE.to_string();
        query_string.push_str(" AND ");
        query_string.push_str(&clause_string);
        Ok((query_string, arguments))
    } else {
        Ok((BASE.to_string(), arguments))
    }
}

pub fn wql_to_sql_count<'a>(
    type_: &'a [u8],
    op: &'a Operator,
) -> IndyResult<(String, Vec<ToSQL<'a>>)> {
    let mut arguments: Vec<ToSQL> = Vec::new();
    arguments.push(type_.into());

    let clause_string = operator_to_sql(op, &mut arguments)?;
    let mut query_string = "SELECT count(*) FROM items as i WHERE i.type = ?".to_string();

    if !clause_string.is_empty() {
        query_string.push_str(" AND ");
        query_string.push_str(&clause_string);
    }

    Ok((query_string, arguments))
}

fn operator_to_sql<'a>(op: &'a Operator, arguments: &mut Vec<ToSQL<'a>>) -> IndyResult<String> {
    match *op {
        Operator::Eq(ref tag_name, ref target_value) => {
            eq_to_sql(tag_name, target_value, arguments)
        }
        Operator::Neq(ref tag_name, ref target_value) => {
            neq_to_sql(tag_name, target_value, arguments)
        }
        Operator::Gt(ref tag_name, ref target_value) => {
            gt_to_sql(tag_name, target_value, arguments)
        }
        Operator::Gte(ref tag_name, ref target_value) => {
            gte_to_sql(tag_name, target_value, arguments)
        }
        Operator::Lt(ref tag_name, ref target_value) => {
            lt_to_sql(tag_name, target_value, arguments)
        }
        Operator::Lte(ref tag_name, ref target_value) => {
            lte_to_sql(tag_name, target_value, arguments)
        }
        Operator::Like(ref tag_name, ref target_value) => {
            like_to_sql(tag_name, target_value, arguments)
        }
        Operator::In(ref tag_name, ref target_values) => {
            in_to_sql(tag_name, target_values, arguments)
        }
        Operator::And(ref suboperators) => and_to_sql(suboperators, arguments),
        Operator::Or(ref suboperators) => or_to_sql(suboperators, arguments),
        Operator::Not(ref suboperator) => not_to_sql(suboperator, arguments),
    }
}

fn tag_clause<'a>(
    name: &'a TagName,
    value: &'a TargetValue,
    sql_operator: &str,
    arguments: &mut Vec<ToSQL<'a>>,
) -> IndyResult<String> {
    match (name, value) {
        (TagName::EncryptedTagName(ref queried_name), TargetValue::Encrypted(_)) => {
            arguments.push(queried_name.into());
            arguments.push(value.into());
            Ok(format!(
                "i.id IN (SELECT item_id FROM tags_encrypted WHERE name = ? AND value {sql_operator} ?)"
            ))
        }
        (TagName::PlainTagName(ref queried_name), TargetValue::Unencrypted(_)) => {
            arguments.push(queried_name.into());
            arguments.push(value.into());
            Ok(format!(
                "i.id IN (SELECT item_id FROM tags_plaintext WHERE name = ? AND value {sql_operator} ?)"
            ))
        }
        _ => Err(err_msg(
            IndyErrorKind::WalletQueryError,
            "Invalid combination of tag name and value",
        )),
    }
}

fn plaintext_only<'a>(
    name: &'a TagName,
    value: &'a TargetValue,
    sql_operator: &str,
    arguments: &mut Vec<ToSQL<'a>>,
) -> IndyResult<String> {
    match (name, value) {
        (TagName::PlainTagName(_), TargetValue::Unencrypted(_)) => {
            tag_clause(name, value, sql_operator, arguments)
        }
        _ => Err(err_msg(
            IndyErrorKind::WalletQueryError,
            format!("Invalid combination of tag name and value for {sql_operator} operator"),
        )),
    }
}

fn eq_to_sql<'a>(
    name: &'a TagName,
    value: &'a TargetValue,
    arguments: &mut Vec<ToSQL<'a>>,
) -> IndyResult<String> {
    tag_clause(name, value, "=", arguments)
}

fn neq_to_sql<'a>(
    name: &'a TagName,
    value: &'a TargetValue,
    arguments: &mut Vec<ToSQL<'a>>,
) -> IndyResult<String> {
    tag_clause(name, value, "!=", arguments)
}

fn gt_to_sql<'a>(
    name: &'a TagName,
    value: &'a TargetValue,
    arguments: &mut Vec<ToSQL<'a>>,
) -> IndyResult<String> {
    plaintext_only(name, value, ">", arguments)
}

fn gte_to_sql<'a>(
    name: &'a TagName,
    value: &'a TargetValue,
    arguments: &mut Vec<ToSQL<'a>>,
) -> IndyResult<String> {
    plaintext_only(name, value, ">=", arguments)
}

fn lt_to_sql<'a>(
    name: &'a TagName,
    value: &'a TargetValue,
    arguments: &mut Vec<ToSQL<'a>>,
) -> IndyResult<String> {
    plaintext_only(name, value, "<", arguments)
}

fn lte_to_sql<'a>(
    name: &'a TagName,
    value: &'a TargetValue,
    arguments: &mut Vec<ToSQL<'a>>,
) -> IndyResult<String> {
    plaintext_only(name, value, "<=", arguments)
}

fn like_to_sql<'a>(
    name: &'a TagName,
    value: &'a TargetValue,
    arguments: &mut Vec<ToSQL<'a>>,
) -> IndyResult<String> {
    plaintext_only(name, value, "LIKE", arguments)
}

fn in_to_sql<'a>(
    name: &'a TagName,
    values: &'a [TargetValue],
    arguments: &mut Vec<ToSQL<'a>>,
) -> IndyResult<String> {
    if values.is_empty() {
        return Ok("0".to_string());
    }

    let table = match name {
        TagName::EncryptedTagName(ref queried_name) => {
            if !values
                .iter()
                .all(|value| matches!(value, TargetValue::Encrypted(_)))
            {
                return Err(err_msg(
                    IndyErrorKind::WalletQueryError,
                    "Encrypted tag must be compared with encrypted values",
                ));
            }
            arguments.push(queried_name.into());
            "tags_encrypted"
        }
        TagName::PlainTagName(ref queried_name) => {
            if !values
                .iter()
                .all(|value| matches!(value, TargetValue::Unencrypted(_)))
            {
                return Err(err_msg(
                    IndyErrorKind::WalletQueryError,
                    "Plaintext tag must be compared with plaintext values",
                ));
            }
            arguments.push(queried_name.into());
            "tags_plaintext"
        }
    };

    let in_string = values
        .iter()
        .map(|value| {
            arguments.push(value.into());
            "?"
        })
        .collect::<Vec<&str>>()
        .join(", ");

    Ok(format!(
        "i.id IN (SELECT item_id FROM {table} WHERE name = ? AND value IN ({in_string}))"
    ))
}

fn and_to_sql<'a>(
    suboperators: &'a [Operator],
    arguments: &mut Vec<ToSQL<'a>>,
) -> IndyResult<String> {
    join_operators(suboperators, " AND ", "1", arguments)
}

fn or_to_sql<'a>(
    suboperators: &'a [Operator],
    arguments: &mut Vec<ToSQL<'a>>,
) -> IndyResult<String> {
    join_operators(suboperators, " OR ", "0", arguments)
}

fn not_to_sql<'a>(suboperator: &'a Operator, arguments: &mut Vec<ToSQL<'a>>) -> IndyResult<String> {
    let suboperator_string = operator_to_sql(suboperator, arguments)?;
    Ok("NOT (".to_string() + &suboperator_string + ")")
}

// An empty conjunction is true and an empty disjunction is false.
fn join_operators<'a>(
    operators: &'a [Operator],
    join_str: &str,
    empty: &str,
    arguments: &mut Vec<ToSQL<'a>>,
) -> IndyResult<String> {
    if operators.is_empty() {
        return Ok(empty.to_string());
    }

    let mut s = String::new();
    s.push('(');

    for (index, operator) in operators.iter().enumerate() {
        let operator_string = operator_to_sql(operator, arguments)?;
        s.push_str(&operator_string);

        if index < operators.len() - 1 {
            s.push_str(join_str);
        }
    }

    s.push(')');
    Ok(s)
}
