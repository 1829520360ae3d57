//! # Workflow Validator
//!
//! Unlike a typical fail-fast checker, [`validate`] never stops at the first
//! problem: it walks every rule against the whole graph and returns the full
//! set of [`Issue`]s so a caller can report them all in one pass (spec.md §4.2).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{ParameterType, Workflow};

/// A single defect found while validating a [`Workflow`]. Validation never
/// short-circuits, so a graph may surface many of these at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    DuplicateNodeId { node_id: String },
    UnknownNodeReference { edge_source_or_target: String },
    UnknownEndpoint {
        node_id: String,
        endpoint: String,
        direction: EndpointDirection,
    },
    TypeMismatch {
        source_node: String,
        source_output: String,
        target_node: String,
        target_input: String,
    },
    DuplicateEdge {
        source_node: String,
        source_output: String,
        target_node: String,
        target_input: String,
    },
    MultipleEdgesToScalarInput { node_id: String, input: String },
    CycleDetected { nodes: Vec<String> },
    MissingRequiredInput { node_id: String, input: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointDirection {
    Input,
    Output,
}

/// Checks `workflow` against every structural and type rule in spec.md §4.2
/// and returns every [`Issue`] found, in a stable, deterministic order.
pub fn validate(workflow: &Workflow) -> Vec<Issue> {
    let mut issues = Vec::new();

    let duplicate_ids = find_duplicate_node_ids(workflow);
    issues.extend(duplicate_ids);

    let known_nodes: HashSet<&str> = workflow.nodes.iter().map(|n| n.id.as_str()).collect();

    issues.extend(check_edge_endpoints(workflow, &known_nodes));
    issues.extend(check_duplicate_edges(workflow));
    issues.extend(check_scalar_fan_in(workflow));
    issues.extend(check_type_compatibility(workflow));
    issues.extend(check_missing_required_inputs(workflow));

    if let Some(cycle) = find_cycle(workflow) {
        issues.push(Issue::CycleDetected { nodes: cycle });
    }

    issues
}

fn find_duplicate_node_ids(workflow: &Workflow) -> Vec<Issue> {
    let mut seen = HashSet::new();
    let mut duplicates = HashSet::new();
    for node in &workflow.nodes {
        if !seen.insert(node.id.as_str()) {
            duplicates.insert(node.id.clone());
        }
    }
    let mut duplicates: Vec<String> = duplicates.into_iter().collect();
    duplicates.sort();
    duplicates
        .into_iter()
        .map(|node_id| Issue::DuplicateNodeId { node_id })
        .collect()
}

fn check_edge_endpoints(workflow: &Workflow, known_nodes: &HashSet<&str>) -> Vec<Issue> {
    let mut issues = Vec::new();
    for edge in &workflow.edges {
        if !known_nodes.contains(edge.source.as_str()) {
            issues.push(Issue::UnknownNodeReference {
                edge_source_or_target: edge.source.clone(),
            });
            continue;
        }
        if !known_nodes.contains(edge.target.as_str()) {
            issues.push(Issue::UnknownNodeReference {
                edge_source_or_target: edge.target.clone(),
            });
            continue;
        }

        let source_node = workflow.node(&edge.source).expect("checked above");
        if source_node.output(&edge.source_output).is_none() {
            issues.push(Issue::UnknownEndpoint {
                node_id: edge.source.clone(),
                endpoint: edge.source_output.clone(),
                direction: EndpointDirection::Output,
            });
        }

        let target_node = workflow.node(&edge.target).expect("checked above");
        if target_node.input(&edge.target_input).is_none() {
            issues.push(Issue::UnknownEndpoint {
                node_id: edge.target.clone(),
                endpoint: edge.target_input.clone(),
                direction: EndpointDirection::Input,
            });
        }
    }
    issues
}

fn check_duplicate_edges(workflow: &Workflow) -> Vec<Issue> {
    let mut seen = HashSet::new();
    let mut issues = Vec::new();
    for edge in &workflow.edges {
        let key = (
            edge.source.as_str(),
            edge.source_output.as_str(),
            edge.target.as_str(),
            edge.target_input.as_str(),
        );
        if !seen.insert(key) {
            issues.push(Issue::DuplicateEdge {
                source_node: edge.source.clone(),
                source_output: edge.source_output.clone(),
                target_node: edge.target.clone(),
                target_input: edge.target_input.clone(),
            });
        }
    }
    issues
}

/// A non-`repeated` input may receive at most one incoming edge.
fn check_scalar_fan_in(workflow: &Workflow) -> Vec<Issue> {
    let mut issues = Vec::new();
    for node in &workflow.nodes {
        for input in &node.inputs {
            if input.repeated {
                continue;
            }
            let count = workflow
                .incoming_edges(&node.id)
                .filter(|e| e.target_input == input.name)
                .count();
            if count > 1 {
                issues.push(Issue::MultipleEdgesToScalarInput {
                    node_id: node.id.clone(),
                    input: input.name.clone(),
                });
            }
        }
    }
    issues
}

fn check_type_compatibility(workflow: &Workflow) -> Vec<Issue> {
    let mut issues = Vec::new();
    for edge in &workflow.edges {
        let (Some(source_node), Some(target_node)) =
            (workflow.node(&edge.source), workflow.node(&edge.target))
        else {
            continue;
        };
        let (Some(source_output), Some(target_input)) = (
            source_node.output(&edge.source_output),
            target_node.input(&edge.target_input),
        ) else {
            continue;
        };
        let source_type: ParameterType = source_output.param_type;
        let target_type: ParameterType = target_input.param_type;
        if !source_type.compatible_with(target_type) {
            issues.push(Issue::TypeMismatch {
                source_node: edge.source.clone(),
                source_output: edge.source_output.clone(),
                target_node: edge.target.clone(),
                target_input: edge.target_input.clone(),
            });
        }
    }
    issues
}

/// A required input with neither a default `value` nor any incoming edge can
/// never be satisfied; flag it statically rather than waiting for execution.
fn check_missing_required_inputs(workflow: &Workflow) -> Vec<Issue> {
    let mut issues = Vec::new();
    for node in &workflow.nodes {
        for input in &node.inputs {
            if !input.required {
                continue;
            }
            let has_edge = workflow
                .incoming_edges(&node.id)
                .any(|e| e.target_input == input.name);
            let has_default = input.value.is_some();
            if !has_edge && !has_default {
                issues.push(Issue::MissingRequiredInput {
                    node_id: node.id.clone(),
                    input: input.name.clone(),
                });
            }
        }
    }
    issues
}

/// DFS-based cycle detection over the edge graph; returns the first cycle
/// found as a path of node ids, or `None` if the graph is a DAG.
fn find_cycle(workflow: &Workflow) -> Option<Vec<String>> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &workflow.edges {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let mut marks: HashMap<&str, LocalMark> = HashMap::new();
    let mut stack: Vec<&str> = Vec::new();

    for node in &workflow.nodes {
        if marks.contains_key(node.id.as_str()) {
            continue;
        }
        if let Some(cycle) = dfs_visit(node.id.as_str(), &adjacency, &mut marks, &mut stack) {
            return Some(cycle.into_iter().map(|s| s.to_string()).collect());
        }
    }
    None
}

fn dfs_visit<'a>(
    node: &'a str,
    adjacency: &HashMap<&'a str, Vec<&'a str>>,
    marks: &mut HashMap<&'a str, LocalMark>,
    stack: &mut Vec<&'a str>,
) -> Option<Vec<&'a str>> {
    marks.insert(node, LocalMark::InStack);
    stack.push(node);

    if let Some(neighbors) = adjacency.get(node) {
        for &next in neighbors {
            match marks.get(next) {
                Some(LocalMark::InStack) => {
                    let start = stack.iter().position(|&n| n == next).unwrap_or(0);
                    let mut cycle: Vec<&str> = stack[start..].to_vec();
                    cycle.push(next);
                    return Some(cycle);
                }
                Some(LocalMark::Done) => continue,
                None => {
                    if let Some(cycle) = dfs_visit(next, adjacency, marks, stack) {
                        return Some(cycle);
                    }
                }
            }
        }
    }

    stack.pop();
    marks.insert(node, LocalMark::Done);
    None
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LocalMark {
    InStack,
    Done,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Node, Parameter, ParameterType, RuntimeKind, TriggerKind};
    use chrono::Utc;

    fn node(id: &str, inputs: Vec<Parameter>, outputs: Vec<Parameter>) -> Node {
        Node {
            id: id.to_string(),
            node_type: "test-node".to_string(),
            name: id.to_string(),
            position: None,
            inputs,
            outputs,
        }
    }

    fn workflow(nodes: Vec<Node>, edges: Vec<Edge>) -> Workflow {
        Workflow {
            id: "wf-1".to_string(),
            name: "test".to_string(),
            handle: "test".to_string(),
            trigger: TriggerKind::Manual,
            runtime: RuntimeKind::Workflow,
            nodes,
            edges,
            organization_id: "org-1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            active_deployment_id: None,
        }
    }

    #[test]
    fn valid_linear_graph_has_no_issues() {
        let wf = workflow(
            vec![
                node(
                    "a",
                    vec![],
                    vec![Parameter::new("out", ParameterType::String)],
                ),
                node(
                    "b",
                    vec![Parameter::new("in", ParameterType::String).required()],
                    vec![],
                ),
            ],
            vec![Edge {
                source: "a".into(),
                source_output: "out".into(),
                target: "b".into(),
                target_input: "in".into(),
            }],
        );
        assert!(validate(&wf).is_empty());
    }

    #[test]
    fn collects_every_kind_of_issue_in_one_pass() {
        let wf = workflow(
            vec![
                node("a", vec![], vec![]),
                node(
                    "b",
                    vec![Parameter::new("in", ParameterType::String).required()],
                    vec![],
                ),
            ],
            vec![Edge {
                source: "a".into(),
                source_output: "missing-output".into(),
                target: "ghost".into(),
                target_input: "in".into(),
            }],
        );
        let issues = validate(&wf);
        assert!(issues.contains(&Issue::UnknownNodeReference {
            edge_source_or_target: "ghost".into()
        }));
        assert!(issues.contains(&Issue::MissingRequiredInput {
            node_id: "b".into(),
            input: "in".into()
        }));
    }

    #[test]
    fn detects_cycles() {
        let wf = workflow(
            vec![
                node(
                    "a",
                    vec![Parameter::new("in", ParameterType::String)],
                    vec![Parameter::new("out", ParameterType::String)],
                ),
                node(
                    "b",
                    vec![Parameter::new("in", ParameterType::String)],
                    vec![Parameter::new("out", ParameterType::String)],
                ),
            ],
            vec![
                Edge {
                    source: "a".into(),
                    source_output: "out".into(),
                    target: "b".into(),
                    target_input: "in".into(),
                },
                Edge {
                    source: "b".into(),
                    source_output: "out".into(),
                    target: "a".into(),
                    target_input: "in".into(),
                },
            ],
        );
        let issues = validate(&wf);
        assert!(issues.iter().any(|i| matches!(i, Issue::CycleDetected { .. })));
    }

    #[test]
    fn flags_type_mismatch_but_allows_json_with_anything() {
        let wf = workflow(
            vec![
                node(
                    "a",
                    vec![],
                    vec![Parameter::new("out", ParameterType::Number)],
                ),
                node(
                    "b",
                    vec![Parameter::new("in", ParameterType::String)],
                    vec![],
                ),
            ],
            vec![Edge {
                source: "a".into(),
                source_output: "out".into(),
                target: "b".into(),
                target_input: "in".into(),
            }],
        );
        let issues = validate(&wf);
        assert!(issues.iter().any(|i| matches!(i, Issue::TypeMismatch { .. })));
    }
}
