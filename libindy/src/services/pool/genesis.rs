use std::collections::HashMap;

use indy_api_types::errors::prelude::*;

const VALIDATOR: &str = "VALIDATOR";

/// A validator node reachable by clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeInfo {
    pub alias: String,
    pub address: String,
    pub verkey: String,
}

#[derive(Deserialize, Debug)]
struct NodeTransaction {
    txn: NodeTxn,
}

#[derive(Deserialize, Debug)]
struct NodeTxn {
    data: NodeTxnData,
}

#[derive(Deserialize, Debug)]
struct NodeTxnData {
    data: NodeData,
    dest: String,
}

#[derive(Deserialize, Debug, Default)]
struct NodeData {
    alias: String,
    client_ip: Option<String>,
    client_port: Option<u16>,
    services: Option<Vec<String>>,
}

/// Parses newline separated node transactions. Later transactions for the
/// same node update the fields they carry.
pub(crate) fn parse_nodes(genesis: &str) -> IndyResult<Vec<NodeInfo>> {
    trace!("parse_nodes >>> genesis: {:?}", genesis);

    let mut order: Vec<String> = Vec::new();
    let mut merged: HashMap<String, (NodeData, String)> = HashMap::new();

    for line in genesis.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let txn: NodeTransaction = serde_json::from_str(line).to_indy(
            IndyErrorKind::InvalidStructure,
            "Invalid genesis transaction",
        )?;

        let NodeTxnData { data, dest } = txn.txn.data;

        match merged.get_mut(&data.alias) {
            Some((known, known_dest)) => {
                if data.client_ip.is_some() {
                    known.client_ip = data.client_ip;
                }
                if data.client_port.is_some() {
                    known.client_port = data.client_port;
                }
                if data.services.is_some() {
                    known.services = data.services;
                }
                *known_dest = dest;
            }
            None => {
                order.push(data.alias.clone());
                merged.insert(data.alias.clone(), (data, dest));
            }
        }
    }

    if order.is_empty() {
        return Err(err_msg(
            IndyErrorKind::InvalidStructure,
            "Empty genesis transactions",
        ));
    }

    let nodes = order
        .into_iter()
        .filter_map(|alias| merged.remove(&alias))
        .filter(|(data, _)| {
            data.services
                .as_ref()
                .map_or(false, |services| services.iter().any(|service| service == VALIDATOR))
        })
        .filter_map(|(data, dest)| match (data.client_ip, data.client_port) {
            (Some(ip), Some(port)) => Some(NodeInfo {
                alias: data.alias,
                address: format!("{}:{}", ip, port),
                verkey: dest,
            }),
            _ => {
                warn!("parse_nodes: node {} has no client address, skipped", data.alias);
                None
            }
        })
        .collect::<Vec<NodeInfo>>();

    trace!("parse_nodes <<< nodes: {:?}", nodes);

    Ok(nodes)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn node_txn(alias: &str, port: u16, services: &[&str]) -> String {
        json!({
            "reqSignature": {},
            "txn": {
                "data": {
                    "data": {
                        "alias": alias,
                        "client_ip": "127.0.0.1",
                        "client_port": port,
                        "node_ip": "127.0.0.1",
                        "node_port": port - 1,
                        "services": services
                    },
                    "dest": format!("{}Dest", alias)
                },
                "metadata": {"from": "Th7MpTaRZVRYnPiabds81Y"},
                "type": "0"
            },
            "txnMetadata": {"seqNo": 1},
            "ver": "1"
        })
        .to_string()
    }

    pub(crate) fn genesis(count: usize) -> String {
        (1..=count)
            .map(|i| node_txn(&format!("Node{}", i), 9700 + 2 * i as u16, &["VALIDATOR"]))
            .collect::<Vec<String>>()
            .join("\n")
    }

    #[test]
    fn parse_nodes_reads_validators() {
        let nodes = parse_nodes(&genesis(4)).unwrap();

        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0].alias, "Node1");
        assert_eq!(nodes[0].address, "127.0.0.1:9702");
        assert_eq!(nodes[0].verkey, "Node1Dest");
    }

    #[test]
    fn parse_nodes_skips_non_validators_and_applies_updates() {
        let genesis = [
            node_txn("Node1", 9702, &["VALIDATOR"]),
            node_txn("Node2", 9704, &[]),
            node_txn("Node1", 9802, &[]),
        ]
        .join("\n");

        let nodes = parse_nodes(&genesis).unwrap();

        assert!(nodes.is_empty());
    }

    #[test]
    fn parse_nodes_rejects_empty_and_invalid() {
        assert_eq!(
            parse_nodes("\n\n").unwrap_err().kind(),
            IndyErrorKind::InvalidStructure
        );
        assert_eq!(
            parse_nodes("{not json}").unwrap_err().kind(),
            IndyErrorKind::InvalidStructure
        );
    }
}
