//! Wallet Query Language.
//!
//! A query is a JSON object. Keys are tag names or the `$and`, `$or` and
//! `$not` combinators; values are either a string (equality) or an object
//! with one of `$neq`, `$gt`, `$gte`, `$lt`, `$lte`, `$like` or `$in`.
//! Several keys in one object are combined with `$and`.

use indy_api_types::errors::prelude::*;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{self, Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    And(Vec<Query>),
    Or(Vec<Query>),
    Not(Box<Query>),
    Eq(String, String),
    Neq(String, String),
    Gt(String, String),
    Gte(String, String),
    Lt(String, String),
    Lte(String, String),
    Like(String, String),
    In(String, Vec<String>),
}

impl Default for Query {
    fn default() -> Query {
        Query::And(Vec::new())
    }
}

impl Query {
    /// Flattens nested combinators of the same kind, collapses single element
    /// combinators, removes double negation and turns a single value `$in`
    /// into equality.
    pub fn optimise(self) -> Query {
        match self {
            Query::Not(inner) => match inner.optimise() {
                Query::Not(inner) => *inner,
                other => Query::Not(Box::new(other)),
            },
            Query::And(subqueries) => {
                let mut flat = Vec::with_capacity(subqueries.len());
                for subquery in subqueries {
                    match subquery.optimise() {
                        Query::And(inner) => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                _collapse(flat, Query::And)
            }
            Query::Or(subqueries) => {
                let mut flat = Vec::with_capacity(subqueries.len());
                for subquery in subqueries {
                    match subquery.optimise() {
                        Query::Or(inner) => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                _collapse(flat, Query::Or)
            }
            Query::In(name, values) => match <[String; 1]>::try_from(values) {
                Ok([value]) => Query::Eq(name, value),
                Err(values) => Query::In(name, values),
            },
            other => other,
        }
    }

    /// Names of every tag referenced by the query.
    pub fn tag_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self._collect_tag_names(&mut names);
        names
    }

    fn _collect_tag_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Query::And(subqueries) | Query::Or(subqueries) => subqueries
                .iter()
                .for_each(|subquery| subquery._collect_tag_names(names)),
            Query::Not(inner) => inner._collect_tag_names(names),
            Query::Eq(name, _)
            | Query::Neq(name, _)
            | Query::Gt(name, _)
            | Query::Gte(name, _)
            | Query::Lt(name, _)
            | Query::Lte(name, _)
            | Query::Like(name, _)
            | Query::In(name, _) => names.push(name.as_str()),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Query::And(subqueries) if subqueries.is_empty() => json!({}),
            Query::And(subqueries) => {
                json!({ "$and": subqueries.iter().map(Query::to_value).collect::<Vec<_>>() })
            }
            Query::Or(subqueries) => {
                json!({ "$or": subqueries.iter().map(Query::to_value).collect::<Vec<_>>() })
            }
            Query::Not(inner) => json!({ "$not": inner.to_value() }),
            Query::Eq(name, value) => json!({ name: value }),
            Query::Neq(name, value) => json!({ name: { "$neq": value } }),
            Query::Gt(name, value) => json!({ name: { "$gt": value } }),
            Query::Gte(name, value) => json!({ name: { "$gte": value } }),
            Query::Lt(name, value) => json!({ name: { "$lt": value } }),
            Query::Lte(name, value) => json!({ name: { "$lte": value } }),
            Query::Like(name, value) => json!({ name: { "$like": value } }),
            Query::In(name, values) => json!({ name: { "$in": values } }),
        }
    }

    pub fn from_value(value: &Value) -> IndyResult<Query> {
        match value {
            Value::Object(map) => _parse_operators(map),
            _ => Err(err_msg(
                IndyErrorKind::WalletQueryError,
                "Query must be a JSON object",
            )),
        }
    }
}

fn _collapse(mut subqueries: Vec<Query>, combinator: fn(Vec<Query>) -> Query) -> Query {
    if subqueries.len() == 1 {
        subqueries.remove(0)
    } else {
        combinator(subqueries)
    }
}

fn _parse_operators(map: &Map<String, Value>) -> IndyResult<Query> {
    let mut operators = map
        .iter()
        .map(|(key, value)| _parse_operator(key, value))
        .collect::<IndyResult<Vec<Query>>>()?;

    if operators.len() == 1 {
        Ok(operators.remove(0))
    } else {
        Ok(Query::And(operators))
    }
}

fn _parse_operator(key: &str, value: &Value) -> IndyResult<Query> {
    match (key, value) {
        ("$and", Value::Array(values)) => Ok(Query::And(_parse_list(values)?)),
        ("$or", Value::Array(values)) => Ok(Query::Or(_parse_list(values)?)),
        ("$not", Value::Object(map)) => Ok(Query::Not(Box::new(_parse_operators(map)?))),
        ("$and", _) | ("$or", _) => Err(err_msg(
            IndyErrorKind::WalletQueryError,
            format!("{key} must be followed by an array of queries"),
        )),
        ("$not", _) => Err(err_msg(
            IndyErrorKind::WalletQueryError,
            "$not must be followed by a query object",
        )),
        (name, Value::String(value)) => Ok(Query::Eq(name.to_string(), value.clone())),
        (name, Value::Object(map)) if map.len() == 1 => _parse_single_operator(name, map),
        (name, _) => Err(err_msg(
            IndyErrorKind::WalletQueryError,
            format!("Unsupported value for tag {name}"),
        )),
    }
}

fn _parse_list(values: &[Value]) -> IndyResult<Vec<Query>> {
    values.iter().map(Query::from_value).collect()
}

fn _parse_single_operator(name: &str, map: &Map<String, Value>) -> IndyResult<Query> {
    let (operator, value) = map.iter().next().ok_or_else(|| {
        err_msg(
            IndyErrorKind::WalletQueryError,
            format!("Empty operator for tag {name}"),
        )
    })?;

    let name = name.to_string();

    match (operator.as_str(), value) {
        ("$neq", Value::String(value)) => Ok(Query::Neq(name, value.clone())),
        ("$gt", Value::String(value)) => Ok(Query::Gt(name, value.clone())),
        ("$gte", Value::String(value)) => Ok(Query::Gte(name, value.clone())),
        ("$lt", Value::String(value)) => Ok(Query::Lt(name, value.clone())),
        ("$lte", Value::String(value)) => Ok(Query::Lte(name, value.clone())),
        ("$like", Value::String(value)) => Ok(Query::Like(name, value.clone())),
        ("$in", Value::Array(values)) => {
            let values = values
                .iter()
                .map(|value| {
                    value.as_str().map(String::from).ok_or_else(|| {
                        err_msg(
                            IndyErrorKind::WalletQueryError,
                            "$in must be followed by an array of strings",
                        )
                    })
                })
                .collect::<IndyResult<Vec<String>>>()?;
            Ok(Query::In(name, values))
        }
        (operator, _) => Err(err_msg(
            IndyErrorKind::WalletQueryError,
            format!("Unsupported operator {operator} for tag {name}"),
        )),
    }
}

impl Serialize for Query {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Query {
    fn deserialize<D>(deserializer: D) -> Result<Query, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Query::from_value(&value).map_err(de::Error::custom)
    }
}

pub fn parse_from_json(json: &str) -> IndyResult<Query> {
    let value: Value = serde_json::from_str(json)
        .to_indy(IndyErrorKind::WalletQueryError, "Query is not valid JSON")?;
    Query::from_value(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(name: &str, value: &str) -> Query {
        Query::Eq(name.to_string(), value.to_string())
    }

    #[test]
    fn empty_object_is_empty_and() {
        assert_eq!(parse_from_json("{}").unwrap(), Query::And(vec![]));
    }

    #[test]
    fn several_keys_are_joined_with_and() {
        let query = parse_from_json(r#"{"k1": "v1", "~k2": {"$gt": "5"}}"#).unwrap();

        assert_eq!(
            query,
            Query::And(vec![
                eq("k1", "v1"),
                Query::Gt("~k2".to_string(), "5".to_string())
            ])
        );
    }

    #[test]
    fn nested_combinators_are_parsed() {
        let query = parse_from_json(
            r#"{"$or": [{"k1": "v1"}, {"$not": {"k2": {"$in": ["a", "b"]}}}]}"#,
        )
        .unwrap();

        assert_eq!(
            query,
            Query::Or(vec![
                eq("k1", "v1"),
                Query::Not(Box::new(Query::In(
                    "k2".to_string(),
                    vec!["a".to_string(), "b".to_string()]
                )))
            ])
        );
    }

    #[test]
    fn unsupported_operator_is_query_error() {
        let err = parse_from_json(r#"{"k1": {"$regex": "v1"}}"#).unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletQueryError);

        let err = parse_from_json(r#"{"k1": 1}"#).unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletQueryError);

        let err = parse_from_json(r#"[]"#).unwrap_err();
        assert_eq!(err.kind(), IndyErrorKind::WalletQueryError);
    }

    #[test]
    fn optimise_flattens_and_removes_double_negation() {
        let query = Query::And(vec![
            Query::And(vec![eq("a", "1"), eq("b", "2")]),
            Query::Not(Box::new(Query::Not(Box::new(eq("c", "3"))))),
            Query::In("d".to_string(), vec!["4".to_string()]),
        ]);

        assert_eq!(
            query.optimise(),
            Query::And(vec![eq("a", "1"), eq("b", "2"), eq("c", "3"), eq("d", "4")])
        );
    }

    #[test]
    fn optimise_keeps_empty_combinators() {
        assert_eq!(Query::Or(vec![]).optimise(), Query::Or(vec![]));
        assert_eq!(
            Query::And(vec![Query::Or(vec![eq("a", "1")])]).optimise(),
            eq("a", "1")
        );
    }

    #[test]
    fn serialization_produces_wql() {
        let query = Query::And(vec![eq("a", "1"), Query::Like("~b".to_string(), "x%".to_string())]);

        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json, json!({"$and": [{"a": "1"}, {"~b": {"$like": "x%"}}]}));
        assert_eq!(serde_json::from_value::<Query>(json).unwrap(), query);
    }

    #[test]
    fn tag_names_are_collected() {
        let query = parse_from_json(r#"{"$or": [{"a": "1"}, {"$not": {"~b": "2"}}]}"#).unwrap();
        assert_eq!(query.tag_names(), vec!["a", "~b"]);
    }
}
