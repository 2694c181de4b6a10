//! Scene-node substitution and pruning
//!
//! Replacing a node with a bare `scene` node can leave parts of the
//! program that no longer feed the sink. [`insert_scene_node`] drops them
//! and renumbers the survivors, so the result is again a valid
//! [`Program`] with backward-only inputs.

use crate::error::ProgramError;
use crate::program::{Node, Program};
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Dfs;
use std::collections::{BTreeSet, HashMap};

/// Indices of nodes that feed the sink, sink included
///
/// Edges run from each node to its inputs, so a depth-first walk from the
/// sink is the backward reachability set.
#[must_use]
pub fn used_nodes(nodes: &[Node]) -> BTreeSet<usize> {
    let Some(sink) = nodes.len().checked_sub(1) else {
        return BTreeSet::new();
    };
    let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
    for (index, node) in nodes.iter().enumerate() {
        graph.add_node(index);
        for &input in &node.inputs {
            graph.add_edge(index, input, ());
        }
    }

    let mut used = BTreeSet::new();
    let mut dfs = Dfs::new(&graph, sink);
    while let Some(index) = dfs.next(&graph) {
        used.insert(index);
    }
    used
}

/// Replace node `index` with a `scene` node and prune unused nodes
///
/// Kept nodes retain their relative order; their inputs are renumbered
/// through the old-to-new index map.
///
/// # Errors
///
/// [`ProgramError::IndexOutOfRange`] when `index` is outside the program.
pub fn insert_scene_node(program: &Program, index: usize) -> Result<Program, ProgramError> {
    if index >= program.len() {
        return Err(ProgramError::IndexOutOfRange {
            index,
            len: program.len(),
        });
    }

    let mut nodes = program.nodes().to_vec();
    nodes[index] = Node::scene();

    let used = used_nodes(&nodes);
    let renumber: HashMap<usize, usize> = used.iter().enumerate().map(|(new, &old)| (old, new)).collect();

    let kept = nodes
        .into_iter()
        .enumerate()
        .filter(|(old, _)| used.contains(old))
        .map(|(_, mut node)| {
            node.inputs = node.inputs.iter().filter_map(|input| renumber.get(input).copied()).collect();
            node
        })
        .collect();
    Program::new(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::OpKind;
    use crate::program::{ProgramBuilder, SideInput};
    use pretty_assertions::assert_eq;
    use raven_scene::Attribute;

    /// scene -> filter -> unique -> relate -> count
    fn relate_chain() -> Program {
        let mut b = ProgramBuilder::new();
        let s = b.op(OpKind::Scene, &[]);
        let f = b.op_with(OpKind::Filter(Attribute::Shape), &[s], SideInput::text("circle"));
        let u = b.op(OpKind::Unique, &[f]);
        let r = b.op_with(OpKind::Relate, &[u], SideInput::text("left"));
        b.op(OpKind::Count, &[r]);
        b.build().unwrap()
    }

    #[test]
    fn substitution_prunes_upstream_nodes() {
        let rewritten = insert_scene_node(&relate_chain(), 3).unwrap();
        let kinds: Vec<OpKind> = rewritten.nodes().iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![OpKind::Scene, OpKind::Count]);
        assert_eq!(rewritten.nodes()[1].inputs, vec![0]);
    }

    #[test]
    fn dead_branches_are_dropped() {
        let mut b = ProgramBuilder::new();
        let s = b.op(OpKind::Scene, &[]);
        let _dead = b.op(OpKind::Count, &[s]);
        let p = b.op_with(OpKind::QueryPanel, &[s], SideInput::number(0_i64));
        let left = b.op(OpKind::Region(crate::op::Region::Left), &[p]);
        let right = b.op(OpKind::Region(crate::op::Region::Right), &[p]);
        b.op(OpKind::Union, &[left, right]);
        let program = b.build().unwrap();

        let rewritten = insert_scene_node(&program, 3).unwrap();
        let inputs: Vec<Vec<usize>> = rewritten.nodes().iter().map(|n| n.inputs.clone()).collect();
        // scene, query_panel, scene (substituted), right, union
        assert_eq!(inputs, vec![vec![], vec![0], vec![], vec![1], vec![2, 3]]);
    }

    #[test]
    fn substituting_the_sink_leaves_one_node() {
        let program = relate_chain();
        let rewritten = insert_scene_node(&program, program.last_index()).unwrap();
        assert_eq!(rewritten.len(), 1);
        assert_eq!(rewritten.nodes()[0], Node::scene());
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        assert_eq!(
            insert_scene_node(&relate_chain(), 9),
            Err(ProgramError::IndexOutOfRange { index: 9, len: 5 })
        );
    }
}
