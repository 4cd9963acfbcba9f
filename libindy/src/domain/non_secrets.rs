use indy_api_types::errors::prelude::*;
use indy_utils::wql::Query;
use indy_wallet::WalletRecord;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// One page of a record search.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecords {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<WalletRecord>>,
}

/// Typed builder for WQL tag queries.
///
/// Empty `And` and `Or` both encode to `{}`, which matches every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    None,
    And(Vec<SearchQuery>),
    Or(Vec<SearchQuery>),
    Not(Box<SearchQuery>),
    Equal(String, String),
    Unequal(String, String),
    Less(String, String),
    LessEqual(String, String),
    Greater(String, String),
    GreaterEqual(String, String),
    Like(String, String),
    In(String, Vec<String>),
}

impl SearchQuery {
    pub fn to_value(&self) -> Value {
        match self {
            SearchQuery::None => Value::Object(Map::new()),
            SearchQuery::And(queries) if queries.is_empty() => Value::Object(Map::new()),
            SearchQuery::And(queries) => json!({ "$and": queries }),
            SearchQuery::Or(queries) if queries.is_empty() => Value::Object(Map::new()),
            SearchQuery::Or(queries) => json!({ "$or": queries }),
            SearchQuery::Not(query) => json!({ "$not": query }),
            SearchQuery::Equal(name, value) => Self::_single(name, json!(value)),
            SearchQuery::Unequal(name, value) => Self::_single(name, json!({ "$neq": value })),
            SearchQuery::Less(name, value) => Self::_single(name, json!({ "$lt": value })),
            SearchQuery::LessEqual(name, value) => Self::_single(name, json!({ "$lte": value })),
            SearchQuery::Greater(name, value) => Self::_single(name, json!({ "$gt": value })),
            SearchQuery::GreaterEqual(name, value) => {
                Self::_single(name, json!({ "$gte": value }))
            }
            SearchQuery::Like(name, value) => Self::_single(name, json!({ "$like": value })),
            SearchQuery::In(name, values) => Self::_single(name, json!({ "$in": values })),
        }
    }

    pub fn to_wql(&self) -> String {
        self.to_value().to_string()
    }

    pub fn to_query(&self) -> IndyResult<Query> {
        Query::from_value(&self.to_value())
    }

    fn _single(name: &str, value: Value) -> Value {
        let mut map = Map::new();
        map.insert(name.to_string(), value);
        Value::Object(map)
    }
}

impl Serialize for SearchQuery {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}
