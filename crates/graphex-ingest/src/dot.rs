//! Line-oriented parser for the GraphViz DOT subset used by graph
//! descriptions: edge statements (`A -- B;`, quoted ids, `->` accepted and
//! treated as undirected) and node statements with an optional `label`
//! attribute. Headers, braces, comments, and `node`/`edge`/`graph` attribute
//! statements are skipped.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::records::{RawEdgeRecord, RawNodeRecord};

static EDGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*(?:"([^"]+)"|([\w.\-]+))\s*(?:--|->)\s*(?:"([^"]+)"|([\w.\-]+))"#).unwrap()
});

static NODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*(?:"([^"]+)"|([\w.\-]+))\s*(?:\[(.*)\])?\s*;?\s*$"#).unwrap()
});

static LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"label\s*=\s*(?:"([^"]*)"|([\w.\-]+))"#).unwrap());

/// Parse DOT text into raw node and edge records. Nodes referenced only by
/// edges are materialized implicitly with `label == id`; an explicit node
/// statement seen later updates the label in place.
pub fn parse_dot(text: &str) -> (Vec<RawNodeRecord>, Vec<RawEdgeRecord>) {
    let mut nodes: Vec<RawNodeRecord> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut edges = Vec::new();

    fn ensure_node(
        nodes: &mut Vec<RawNodeRecord>,
        position: &mut HashMap<String, usize>,
        id: &str,
    ) -> usize {
        if let Some(&at) = position.get(id) {
            return at;
        }
        nodes.push(RawNodeRecord::new(id));
        position.insert(id.to_string(), nodes.len() - 1);
        nodes.len() - 1
    }

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") || line.starts_with('#') {
            continue;
        }
        if line == "{" || line == "}" || line.ends_with('{') {
            continue;
        }
        if is_attr_statement(line) {
            continue;
        }

        if let Some(caps) = EDGE_RE.captures(line) {
            let source = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            let target = caps
                .get(3)
                .or_else(|| caps.get(4))
                .map(|m| m.as_str())
                .unwrap_or_default();
            ensure_node(&mut nodes, &mut position, source);
            ensure_node(&mut nodes, &mut position, target);
            edges.push(RawEdgeRecord::new(source, target));
            continue;
        }

        if let Some(caps) = NODE_RE.captures(line) {
            let id = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            if id.is_empty() {
                continue;
            }
            let at = ensure_node(&mut nodes, &mut position, id);
            if let Some(attrs) = caps.get(3) {
                if let Some(label_caps) = LABEL_RE.captures(attrs.as_str()) {
                    let label = label_caps
                        .get(1)
                        .or_else(|| label_caps.get(2))
                        .map(|m| m.as_str().to_string());
                    nodes[at].label = label;
                }
            }
        }
    }

    (nodes, edges)
}

/// `node [...]`, `edge [...]`, `graph [...]` default-attribute statements.
fn is_attr_statement(line: &str) -> bool {
    for keyword in ["node", "edge", "graph"] {
        if let Some(rest) = line.strip_prefix(keyword) {
            if rest.trim_start().starts_with('[') {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_graph() {
        let text = r#"
graph G {
    A -- B;
    B -- C;
}
"#;
        let (nodes, edges) = parse_dot(text);
        let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].source.as_deref(), Some("A"));
        assert_eq!(edges[0].target.as_deref(), Some("B"));
    }

    #[test]
    fn test_quoted_ids_and_arrows() {
        let text = r#"
digraph {
    "New York" -> "Los Angeles";
}
"#;
        let (nodes, edges) = parse_dot(text);
        assert_eq!(nodes.len(), 2);
        assert_eq!(edges[0].source.as_deref(), Some("New York"));
        assert_eq!(edges[0].target.as_deref(), Some("Los Angeles"));
    }

    #[test]
    fn test_node_statement_label() {
        let text = r#"
graph {
    A [label="Alpha", shape=circle];
    A -- B;
}
"#;
        let (nodes, _edges) = parse_dot(text);
        assert_eq!(nodes[0].id.as_deref(), Some("A"));
        assert_eq!(nodes[0].label.as_deref(), Some("Alpha"));
        assert_eq!(nodes[1].label, None);
    }

    #[test]
    fn test_label_applies_after_implicit_mention() {
        let text = r#"
graph {
    A -- B;
    B [label="Beta"];
}
"#;
        let (nodes, _edges) = parse_dot(text);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].id.as_deref(), Some("B"));
        assert_eq!(nodes[1].label.as_deref(), Some("Beta"));
    }

    #[test]
    fn test_comments_and_attr_statements_skipped() {
        let text = r#"
graph G {
    // a comment
    # another comment
    node [shape=box];
    edge [color=gray];
    A -- B;
}
"#;
        let (nodes, edges) = parse_dot(text);
        assert_eq!(nodes.len(), 2);
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn test_edge_attributes_ignored() {
        let (nodes, edges) = parse_dot(r#"A -- B [weight=2];"#);
        assert_eq!(nodes.len(), 2);
        assert_eq!(edges.len(), 1);
    }
}
