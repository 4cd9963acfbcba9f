use std::{
    collections::HashMap,
    sync::Arc,
    time::Duration,
};

use futures::stream::{FuturesUnordered, StreamExt};
use indy_api_types::errors::prelude::*;
use rand::seq::SliceRandom;
use serde_json::Value;
use tokio::{sync::Semaphore, task::JoinHandle, time::Instant};

use super::{genesis::NodeInfo, networker::Networker};
use crate::domain::pool::PoolOpenConfig;

/// Number of faulty nodes a pool of `n` validators tolerates.
pub(crate) fn f_value(n: usize) -> usize {
    n.saturating_sub(1) / 3
}

/// Replies needed before one is trusted.
pub(crate) fn quorum(n: usize) -> usize {
    f_value(n) + 1
}

/// Orders nodes for a request: preordered nodes first in their configured
/// order, everything else shuffled.
pub(crate) fn order_nodes(nodes: &[NodeInfo], preordered: &[String]) -> Vec<NodeInfo> {
    let mut ordered: Vec<NodeInfo> = preordered
        .iter()
        .filter_map(|alias| nodes.iter().find(|node| &node.alias == alias).cloned())
        .collect();

    let mut rest: Vec<NodeInfo> = nodes
        .iter()
        .filter(|node| !preordered.contains(&node.alias))
        .cloned()
        .collect();

    rest.shuffle(&mut rand::thread_rng());
    ordered.extend(rest);
    ordered
}

enum NodeReply {
    Vote(String),
    Ack,
    Failure(IndyErrorKind),
}

/// Identical `result` payloads, or identical rejections, vote together.
fn classify(raw: &str) -> NodeReply {
    let message: Value = match serde_json::from_str(raw) {
        Ok(message) => message,
        Err(_) => return NodeReply::Failure(IndyErrorKind::InvalidStructure),
    };

    match message["op"].as_str() {
        Some("REPLY") => NodeReply::Vote(format!("REPLY|{}", message["result"])),
        Some(op @ "REQNACK") | Some(op @ "REJECT") => {
            NodeReply::Vote(format!("{}|{}", op, message["reason"]))
        }
        Some("REQACK") => NodeReply::Ack,
        _ => NodeReply::Failure(IndyErrorKind::InvalidStructure),
    }
}

type NodeTask = JoinHandle<(String, IndyResult<String>)>;

/// In-flight node requests. Whatever is still running once the outcome is
/// decided is aborted, which releases its connection permit and socket.
struct NodeTasks(FuturesUnordered<NodeTask>);

impl Drop for NodeTasks {
    fn drop(&mut self) {
        for task in self.0.iter() {
            task.abort();
        }
    }
}

#[derive(Default)]
struct Votes {
    replies: HashMap<String, (usize, String)>,
    failures: usize,
    timeouts: usize,
}

impl Votes {
    fn add(&mut self, key: String, raw: String) -> usize {
        let entry = self.replies.entry(key).or_insert((0, raw));
        entry.0 += 1;
        entry.0
    }

    fn best(&self) -> usize {
        self.replies.values().map(|(count, _)| *count).max().unwrap_or(0)
    }

    fn answered(&self) -> usize {
        self.replies.values().map(|(count, _)| *count).sum::<usize>() + self.failures + self.timeouts
    }

    fn error(&self) -> IndyError {
        if self.replies.is_empty() && self.failures == 0 && self.timeouts > 0 {
            err_msg(IndyErrorKind::PoolTimeout, "No reply from the pool nodes in time")
        } else {
            err_msg(
                IndyErrorKind::NoConsensus,
                format!(
                    "No consensus is possible: {} distinct replies, {} failures, {} timeouts",
                    self.replies.len(),
                    self.failures,
                    self.timeouts
                ),
            )
        }
    }
}

/// Sends `request` to the pool and returns the first reply confirmed by
/// `f + 1` nodes. Reads start with `number_read_nodes` nodes and widen to
/// the whole pool; writes go to every node at once.
pub(crate) async fn send_request(
    networker: Arc<dyn Networker>,
    nodes: &[NodeInfo],
    config: &PoolOpenConfig,
    request: &str,
    is_read: bool,
) -> IndyResult<String> {
    trace!(
        "send_request >>> nodes: {:?}, config: {:?}, request: {:?}, is_read: {:?}",
        nodes,
        config,
        request,
        is_read
    );

    if nodes.is_empty() {
        return Err(err_msg(
            IndyErrorKind::InvalidState,
            "Pool has no validator nodes",
        ));
    }

    let total = nodes.len();
    let quorum = quorum(total);

    let mut queue = order_nodes(nodes, &config.preordered_nodes).into_iter();
    let first_batch = if is_read {
        (config.number_read_nodes as usize).clamp(1, total)
    } else {
        total
    };

    let node_timeout = Duration::from_secs(config.timeout as u64);
    let deadline = Instant::now() + Duration::from_secs(config.extended_timeout as u64);
    let permits = Arc::new(Semaphore::new(config.conn_limit.max(1)));
    let request: Arc<str> = Arc::from(request);

    let spawn = |node: NodeInfo| -> NodeTask {
        let networker = networker.clone();
        let permits = permits.clone();
        let request = request.clone();

        tokio::spawn(async move {
            let _permit = permits.acquire_owned().await;
            let res = networker.send_request(&node, &request, node_timeout).await;
            (node.alias, res)
        })
    };

    let mut pending = NodeTasks(queue.by_ref().take(first_batch).map(&spawn).collect());

    let mut votes = Votes::default();

    loop {
        let next = match tokio::time::timeout_at(deadline, pending.0.next()).await {
            Ok(next) => next,
            Err(_) => {
                warn!("send_request: pool did not reach consensus before the extended timeout");
                return Err(err_msg(
                    IndyErrorKind::PoolTimeout,
                    "Pool did not reply in time",
                ));
            }
        };

        match next {
            Some(Ok((alias, Ok(raw)))) => match classify(&raw) {
                NodeReply::Vote(key) => {
                    if votes.add(key, raw.clone()) >= quorum {
                        trace!("send_request <<< res: {:?}", raw);
                        return Ok(raw);
                    }
                }
                NodeReply::Ack => {
                    debug!("send_request: node {} only acknowledged the request", alias);
                    votes.failures += 1;
                }
                NodeReply::Failure(kind) => {
                    warn!("send_request: node {} sent unexpected reply {:?}: {}", alias, kind, raw);
                    votes.failures += 1;
                }
            },
            Some(Ok((alias, Err(err)))) => {
                warn!("send_request: node {} failed: {}", alias, err);

                if err.kind() == IndyErrorKind::PoolTimeout {
                    votes.timeouts += 1;
                } else {
                    votes.failures += 1;
                }
            }
            Some(Err(err)) => {
                error!("send_request: node task failed: {}", err);
                votes.failures += 1;
            }
            None => {
                let rest: Vec<NodeInfo> = queue.by_ref().collect();

                if rest.is_empty() {
                    return Err(votes.error());
                }

                debug!("send_request: widening request to {} more nodes", rest.len());
                pending.0.extend(rest.into_iter().map(&spawn));
                continue;
            }
        }

        if votes.best() + (total - votes.answered()) < quorum {
            return Err(votes.error());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::services::pool::{genesis::parse_nodes, genesis::tests::genesis, networker::MockNetworker};

    const REPLY: &str = r#"{"op":"REPLY","result":{"seqNo":1,"data":"a"}}"#;
    const OTHER_REPLY: &str = r#"{"op":"REPLY","result":{"seqNo":1,"data":"b"}}"#;
    const REJECT: &str = r#"{"op":"REJECT","reqId":1,"reason":"not allowed"}"#;

    fn nodes(count: usize) -> Vec<NodeInfo> {
        parse_nodes(&genesis(count)).unwrap()
    }

    fn networker<F>(reply: F) -> Arc<dyn Networker>
    where
        F: Fn(&str) -> IndyResult<String> + Send + Sync + 'static,
    {
        let mut networker = MockNetworker::new();
        networker
            .expect_send_request()
            .returning(move |node, _, _| reply(&node.alias));
        Arc::new(networker)
    }

    #[test]
    fn quorum_follows_f_plus_one() {
        assert_eq!(quorum(1), 1);
        assert_eq!(quorum(4), 2);
        assert_eq!(quorum(7), 3);
        assert_eq!(f_value(10), 3);
        assert_eq!(f_value(0), 0);
    }

    #[test]
    fn order_nodes_puts_preordered_first() {
        let nodes = nodes(4);

        let ordered = order_nodes(&nodes, &["Node3".to_string(), "Node1".to_string()]);

        assert_eq!(ordered.len(), 4);
        assert_eq!(ordered[0].alias, "Node3");
        assert_eq!(ordered[1].alias, "Node1");
    }

    #[tokio::test]
    async fn write_returns_agreed_reply() {
        let networker = networker(|alias| match alias {
            "Node4" => Ok(OTHER_REPLY.to_string()),
            _ => Ok(REPLY.to_string()),
        });

        let reply = send_request(networker, &nodes(4), &PoolOpenConfig::default(), "{}", false)
            .await
            .unwrap();

        assert_eq!(reply, REPLY);
    }

    #[tokio::test]
    async fn read_widens_when_first_nodes_disagree() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let networker = networker(move |alias| {
            counter.fetch_add(1, Ordering::SeqCst);
            match alias {
                "Node1" => Ok(REPLY.to_string()),
                "Node2" => Ok(OTHER_REPLY.to_string()),
                "Node3" => Err(err_msg(IndyErrorKind::IOError, "connection refused")),
                _ => Ok(REPLY.to_string()),
            }
        });

        let config = PoolOpenConfig {
            preordered_nodes: vec!["Node1".to_string(), "Node2".to_string()],
            ..PoolOpenConfig::default()
        };

        let reply = send_request(networker, &nodes(4), &config, "{}", true)
            .await
            .unwrap();

        assert_eq!(reply, REPLY);
        assert!(calls.load(Ordering::SeqCst) > 2);
    }

    #[tokio::test]
    async fn read_stops_at_first_batch_when_it_agrees() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let networker = networker(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(REPLY.to_string())
        });

        send_request(networker, &nodes(4), &PoolOpenConfig::default(), "{}", true)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn disagreeing_nodes_give_no_consensus() {
        let networker = networker(|alias| Ok(format!(r#"{{"op":"REPLY","result":{{"node":"{}"}}}}"#, alias)));

        let err = send_request(networker, &nodes(4), &PoolOpenConfig::default(), "{}", false)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::NoConsensus);
    }

    #[tokio::test]
    async fn agreed_rejection_is_returned_as_is() {
        let networker = networker(|_| Ok(REJECT.to_string()));

        let reply = send_request(networker, &nodes(4), &PoolOpenConfig::default(), "{}", false)
            .await
            .unwrap();

        assert_eq!(reply, REJECT);
    }

    #[tokio::test]
    async fn silent_pool_times_out() {
        let networker = networker(|_| Err(err_msg(IndyErrorKind::PoolTimeout, "timeout")));

        let err = send_request(networker, &nodes(4), &PoolOpenConfig::default(), "{}", true)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::PoolTimeout);
    }

    #[tokio::test]
    async fn failing_nodes_give_no_consensus() {
        let networker = networker(|alias| match alias {
            "Node1" => Ok(REPLY.to_string()),
            _ => Err(err_msg(IndyErrorKind::IOError, "connection refused")),
        });

        let err = send_request(networker, &nodes(4), &PoolOpenConfig::default(), "{}", false)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), IndyErrorKind::NoConsensus);
    }

    struct SlowNetworker {
        finished: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Networker for SlowNetworker {
        async fn send_request(
            &self,
            node: &NodeInfo,
            _request: &str,
            _timeout: Duration,
        ) -> IndyResult<String> {
            if node.alias == "Node3" || node.alias == "Node4" {
                tokio::time::sleep(Duration::from_millis(200)).await;
                self.finished.fetch_add(1, Ordering::SeqCst);
            }

            Ok(REPLY.to_string())
        }
    }

    #[tokio::test]
    async fn remaining_node_requests_are_aborted_after_quorum() {
        let finished = Arc::new(AtomicUsize::new(0));
        let networker = Arc::new(SlowNetworker {
            finished: finished.clone(),
        });

        let reply = send_request(networker, &nodes(4), &PoolOpenConfig::default(), "{}", false)
            .await
            .unwrap();

        assert_eq!(reply, REPLY);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }
}
