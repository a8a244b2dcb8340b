//! Character network graph

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

/// A character node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: f64,
}

/// A weighted edge between two node ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkLink {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub value: f64,
}

/// Node/link network.
///
/// Links are expected to reference existing node ids; the graph surfaces
/// whatever it was given and never repairs it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkGraph {
    #[serde(default)]
    pub nodes: Vec<NetworkNode>,
    #[serde(default)]
    pub links: Vec<NetworkLink>,
}

impl NetworkGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Find a node by id
    pub fn node(&self, id: &str) -> Option<&NetworkNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Links whose source or target is not a node id
    pub fn dangling_links(&self) -> Vec<&NetworkLink> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.links
            .iter()
            .filter(|l| !ids.contains(l.source.as_str()) || !ids.contains(l.target.as_str()))
            .collect()
    }

    /// Sub-graph of the given characters: their nodes, and links with both
    /// ends among them. Order is preserved.
    pub fn restricted_to<'a, I>(&self, chars: I) -> NetworkGraph
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keep: HashSet<&str> = chars.into_iter().collect();

        NetworkGraph {
            nodes: self
                .nodes
                .iter()
                .filter(|n| keep.contains(n.id.as_str()))
                .cloned()
                .collect(),
            links: self
                .links
                .iter()
                .filter(|l| keep.contains(l.source.as_str()) && keep.contains(l.target.as_str()))
                .cloned()
                .collect(),
        }
    }
}

/// Build the network from parsed JSON.
///
/// Never fails: absent or null input is an empty graph, a non-object or a
/// `nodes`/`links` entry that is not an array counts as empty, and single
/// entries that do not fit are skipped. Everything dropped is logged.
pub fn build_network_graph(parsed: Option<&Value>) -> NetworkGraph {
    match parsed {
        None | Some(Value::Null) => NetworkGraph::default(),
        Some(Value::Object(map)) => NetworkGraph {
            nodes: graph_section(map, "nodes"),
            links: graph_section(map, "links"),
        },
        Some(other) => {
            warn!("Network data is not an object ({}), using an empty graph", json_type(other));
            NetworkGraph::default()
        }
    }
}

fn graph_section<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Vec<T> {
    let items = match map.get(key) {
        None => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            warn!("Network {} is {}, not an array; treating as empty", key, json_type(other));
            return Vec::new();
        }
    };

    let mut skipped = 0;
    let parsed: Vec<T> = items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                skipped += 1;
                debug!("Skipping network {} entry: {}", key, e);
                None
            }
        })
        .collect();

    if skipped > 0 {
        warn!("Skipped {} malformed network {} entries", skipped, key);
    }
    parsed
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> NetworkGraph {
        build_network_graph(Some(&json!({
            "nodes": [
                {"id": "之", "name": "之", "value": 10},
                {"id": "人", "name": "人", "value": 6},
                {"id": "天", "name": "天", "value": 2}
            ],
            "links": [
                {"source": "之", "target": "人", "value": 4},
                {"source": "人", "target": "天", "value": 1},
                {"source": "天", "target": "地", "value": 1}
            ]
        })))
    }

    #[test]
    fn test_null_is_empty() {
        let graph = build_network_graph(None);
        assert!(graph.nodes.is_empty());
        assert!(graph.links.is_empty());

        let graph = build_network_graph(Some(&Value::Null));
        assert_eq!(graph, NetworkGraph::default());
    }

    #[test]
    fn test_missing_keys_default() {
        let graph = build_network_graph(Some(&json!({"nodes": [{"id": "之"}]})));
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].value, 0.0);
        assert!(graph.links.is_empty());
    }

    #[test]
    fn test_non_object_is_empty() {
        for value in [json!([1, 2, 3]), json!(false), json!(0), json!("graph")] {
            assert_eq!(build_network_graph(Some(&value)), NetworkGraph::default());
        }
    }

    #[test]
    fn test_null_sections_are_empty() {
        let graph = build_network_graph(Some(&json!({"nodes": null, "links": null})));
        assert!(graph.is_empty());

        let graph = build_network_graph(Some(&json!({
            "nodes": [{"id": "之"}],
            "links": {"source": "之"}
        })));
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.links.is_empty());
    }

    #[test]
    fn test_bad_entries_skipped() {
        let graph = build_network_graph(Some(&json!({
            "nodes": [{"id": "之", "value": 3}, {"id": 7}, {"id": "人", "value": "many"}],
            "links": [{"source": "之", "target": "人", "value": 1}, {"source": "之"}]
        })));

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].id, "之");
        assert_eq!(graph.links.len(), 1);
    }

    #[test]
    fn test_dangling_links_reported() {
        let graph = sample();
        let dangling = graph.dangling_links();

        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].target, "地");
    }

    #[test]
    fn test_restricted_to() {
        let graph = sample();
        let sub = graph.restricted_to(["之", "人"]);

        assert_eq!(sub.nodes.len(), 2);
        assert_eq!(sub.links.len(), 1);
        assert_eq!(sub.links[0].source, "之");
        assert_eq!(sub.links[0].target, "人");
        assert!(sub.node("天").is_none());
    }

    #[test]
    fn test_restricted_to_nothing() {
        let graph = sample();
        assert!(graph.restricted_to(Vec::<&str>::new()).is_empty());
    }
}
