use serde::de::DeserializeOwned;

use indy_api_types::errors::prelude::*;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub req_id: Option<u64>,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct Reply<T> {
    pub result: T,
}

impl<T> Reply<T> {
    pub fn result(self) -> T {
        self.result
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op")]
pub enum Message<T> {
    #[serde(rename = "REQNACK")]
    ReqNACK(Response),
    #[serde(rename = "REPLY")]
    Reply(Reply<T>),
    #[serde(rename = "REJECT")]
    Reject(Response),
}

pub trait ReplyType {
    fn get_type<'a>() -> &'a str;
}

pub fn parse_response<T>(response: &str) -> IndyResult<Reply<T>>
where
    T: DeserializeOwned + ReplyType + ::std::fmt::Debug,
{
    let message: Message<T> = serde_json::from_str(response).to_indy(
        IndyErrorKind::LedgerItemNotFound,
        "Structure doesn't correspond to type. Most probably not found",
    )?;

    match message {
        Message::Reject(response) | Message::ReqNACK(response) => Err(err_msg(
            IndyErrorKind::InvalidTransaction,
            format!("Transaction has been failed: {:?}", response.reason),
        )),
        Message::Reply(reply) => Ok(reply),
    }
}
