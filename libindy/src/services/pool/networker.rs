use std::time::Duration;

use async_trait::async_trait;
use indy_api_types::errors::prelude::*;
#[cfg(test)]
use mockall::automock;
use serde_json::Value;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpStream,
};

use super::genesis::NodeInfo;

/// Transport to a single ledger node: one request in, one reply out.
#[cfg_attr(test, automock)]
#[async_trait]
pub(crate) trait Networker: Send + Sync {
    async fn send_request(
        &self,
        node: &NodeInfo,
        request: &str,
        timeout: Duration,
    ) -> IndyResult<String>;
}

/// Writes the request as one JSON line and returns the first reply line
/// that is not an acknowledgement.
pub(crate) struct TcpNetworker {}

impl TcpNetworker {
    pub(crate) fn new() -> TcpNetworker {
        TcpNetworker {}
    }

    async fn _exchange(&self, node: &NodeInfo, request: &str) -> IndyResult<String> {
        let stream = TcpStream::connect(&node.address).await.to_indy(
            IndyErrorKind::IOError,
            format!("Can't connect to node {}", node.alias),
        )?;

        let (reader, mut writer) = stream.into_split();

        writer.write_all(request.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines.next_line().await? {
            let is_ack = serde_json::from_str::<Value>(&line)
                .map(|message| message["op"] == "REQACK")
                .unwrap_or(false);

            if is_ack {
                trace!("_exchange: node {} acknowledged request", node.alias);
                continue;
            }

            return Ok(line);
        }

        Err(err_msg(
            IndyErrorKind::IOError,
            format!("Node {} closed connection without reply", node.alias),
        ))
    }
}

#[async_trait]
impl Networker for TcpNetworker {
    async fn send_request(
        &self,
        node: &NodeInfo,
        request: &str,
        timeout: Duration,
    ) -> IndyResult<String> {
        trace!(
            "send_request >>> node: {:?}, request: {:?}, timeout: {:?}",
            node,
            request,
            timeout
        );

        let res = tokio::time::timeout(timeout, self._exchange(node, request))
            .await
            .map_err(|_| {
                err_msg(
                    IndyErrorKind::PoolTimeout,
                    format!("Node {} did not reply in time", node.alias),
                )
            })??;

        trace!("send_request <<< res: {:?}", res);

        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    fn node(address: String) -> NodeInfo {
        NodeInfo {
            alias: "Node1".to_string(),
            address,
            verkey: "Node1Dest".to_string(),
        }
    }

    #[tokio::test]
    async fn tcp_networker_skips_acks() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = stream.into_split();
            let mut lines = BufReader::new(reader).lines();
            let request = lines.next_line().await.unwrap().unwrap();
            assert_eq!(request, r#"{"reqId":1}"#);
            writer.write_all(b"{\"op\":\"REQACK\",\"reqId\":1}\n").await.unwrap();
            writer
                .write_all(b"{\"op\":\"REPLY\",\"result\":{\"reqId\":1}}\n")
                .await
                .unwrap();
        });

        let reply = TcpNetworker::new()
            .send_request(&node(address), r#"{"reqId":1}"#, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(reply, r#"{"op":"REPLY","result":{"reqId":1}}"#);
    }

    #[tokio::test]
    async fn tcp_networker_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let err = TcpNetworker::new()
            .send_request(&node(address), "{}", Duration::from_millis(100))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::PoolTimeout);
    }
}
