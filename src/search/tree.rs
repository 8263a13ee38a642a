use super::spot::Spot;
use crate::gameplay::action::Action;
use petgraph::Direction;
use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;

/// The partially expanded game tree: spots joined by the actions that
/// reach them. Nodes are add-only; 32-bit indices stand in for parent and
/// child links, so a root-to-leaf path is just a vector of indices.
#[derive(Debug)]
pub struct Tree(DiGraph<Spot, Action>);

impl Tree {
    pub fn plant(root: Spot) -> Self {
        let mut graph = DiGraph::with_capacity(1, 0);
        graph.add_node(root);
        Self(graph)
    }
    pub fn root() -> NodeIndex {
        NodeIndex::new(0)
    }
    pub fn len(&self) -> usize {
        self.0.node_count()
    }

    pub fn spot(&self, index: NodeIndex) -> &Spot {
        self.0.node_weight(index).expect("valid node index")
    }
    pub fn spot_mut(&mut self, index: NodeIndex) -> &mut Spot {
        self.0.node_weight_mut(index).expect("valid node index")
    }
    pub fn attach(&mut self, parent: NodeIndex, action: Action, spot: Spot) -> NodeIndex {
        let child = self.0.add_node(spot);
        self.0.add_edge(parent, child, action);
        child
    }

    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.0
            .neighbors_directed(index, Direction::Incoming)
            .next()
    }
    /// The action on this node's incoming edge. Only the root has none.
    pub fn action(&self, index: NodeIndex) -> Option<Action> {
        self.0
            .edges_directed(index, Direction::Incoming)
            .next()
            .map(|edge| *edge.weight())
    }
    pub fn children(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut children = self
            .0
            .neighbors_directed(index, Direction::Outgoing)
            .collect::<Vec<_>>();
        children.sort();
        children
    }

    /// Actions from the root down to this node, in play order.
    pub fn line(&self, index: NodeIndex) -> Vec<Action> {
        let mut line = Vec::new();
        let mut cursor = index;
        while let (Some(action), Some(parent)) = (self.action(cursor), self.parent(cursor)) {
            line.push(action);
            cursor = parent;
        }
        line.reverse();
        line
    }
    /// Ancestors of this node, nearest first, root last.
    pub fn ancestry(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut up = Vec::new();
        let mut cursor = index;
        while let Some(parent) = self.parent(cursor) {
            up.push(parent);
            cursor = parent;
        }
        up
    }

    fn draw(
        &self,
        f: &mut std::fmt::Formatter,
        index: NodeIndex,
        prefix: &str,
    ) -> std::fmt::Result {
        if index == Self::root() {
            writeln!(f, "ROOT   {}", self.spot(index))?;
        }
        let children = self.children(index);
        let n = children.len();
        for (i, child) in children.into_iter().enumerate() {
            let last = i == n - 1;
            let stem = if last { "└" } else { "├" };
            let gaps = if last { "    " } else { "│   " };
            match self.action(child) {
                Some(action) => {
                    writeln!(f, "{}{}──{} {}", prefix, stem, action, self.spot(child))?
                }
                None => writeln!(f, "{}{}──{}", prefix, stem, self.spot(child))?,
            }
            self.draw(f, child, &format!("{}{}", prefix, gaps))?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.draw(f, Self::root(), "")
    }
}
