//! The persistent tree structure shared by schema and instance forests.
//!
//! A schema node describes what *could* be configured: its `exemplars` are
//! candidate sub-block templates. An instance node describes what *is*
//! configured: its `children` are literal sub-blocks. The [`Flavor`] fixed at
//! construction decides which of the two lists a node may grow.
//!
//! Nodes are addressed positionally: an address is the index of a forest root
//! followed by indices into each node's [`Node::branches`]. Addresses are the
//! non-owning handles used by the path index and the tree walks.

use std::collections::VecDeque;

use serde::Serialize;

use crate::entry::{ParameterSet, PARAMETER_SET_ID};
use crate::error::{MooseError, Result};

/// Which kind of tree a node belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Flavor {
    Schema,
    Instance,
}

/// Positional handle to a node inside a forest.
pub type Address = Vec<usize>;

/// Type candidates carried by a node promoted during hard-path resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AdaptiveTypes {
    candidates: Vec<Node>,
    selected: Option<usize>,
}

impl AdaptiveTypes {
    pub fn candidates(&self) -> &[Node] {
        &self.candidates
    }

    pub fn selected(&self) -> Option<&Node> {
        self.selected.and_then(|i| self.candidates.get(i))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub active: bool,
    flavor: Flavor,
    parameters: ParameterSet,
    children: Vec<Node>,
    exemplars: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    adaptive: Option<AdaptiveTypes>,
}

impl Node {
    pub fn new(flavor: Flavor, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: 0,
            parameters: ParameterSet::new(&name),
            name,
            description: String::new(),
            active: true,
            flavor,
            children: Vec::new(),
            exemplars: Vec::new(),
            adaptive: None,
        }
    }

    pub fn schema(name: impl Into<String>) -> Self {
        Self::new(Flavor::Schema, name)
    }

    pub fn instance(name: impl Into<String>) -> Self {
        Self::new(Flavor::Instance, name)
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    // ------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------

    /// The node's own parameter set.
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.parameters
    }

    pub fn set_parameters(&mut self, mut parameters: ParameterSet) {
        parameters.id = PARAMETER_SET_ID;
        self.parameters = parameters;
    }

    /// The live parameter set: the selected type's set on an adaptive node,
    /// otherwise the node's own.
    pub fn active_parameters(&self) -> &ParameterSet {
        match self.adaptive.as_ref().and_then(AdaptiveTypes::selected) {
            Some(selected) => &selected.parameters,
            None => &self.parameters,
        }
    }

    pub fn active_parameters_mut(&mut self) -> &mut ParameterSet {
        if let Some(types) = self.adaptive.as_mut() {
            if let Some(i) = types.selected {
                return &mut types.candidates[i].parameters;
            }
        }
        &mut self.parameters
    }

    // ------------------------------------------------------------------
    // Children and exemplars
    // ------------------------------------------------------------------

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn exemplars(&self) -> &[Node] {
        &self.exemplars
    }

    /// The list that gives this node its structure: exemplars for schema
    /// nodes, children for instance nodes.
    pub fn branches(&self) -> &[Node] {
        match self.flavor {
            Flavor::Schema => &self.exemplars,
            Flavor::Instance => &self.children,
        }
    }

    fn branches_mut(&mut self) -> &mut [Node] {
        match self.flavor {
            Flavor::Schema => &mut self.exemplars,
            Flavor::Instance => &mut self.children,
        }
    }

    /// Append a literal child. Only instance nodes have children.
    pub fn push_child(&mut self, mut child: Node) -> Result<()> {
        if self.flavor != Flavor::Instance {
            return Err(MooseError::FlavorMismatch {
                node: self.name.clone(),
                expected: Flavor::Instance,
            });
        }
        child.id = next_id(self.children.len());
        self.children.push(child);
        Ok(())
    }

    /// Append a candidate sub-block template. Only schema nodes have
    /// exemplars.
    pub fn push_exemplar(&mut self, mut exemplar: Node) -> Result<()> {
        if self.flavor != Flavor::Schema {
            return Err(MooseError::FlavorMismatch {
                node: self.name.clone(),
                expected: Flavor::Schema,
            });
        }
        exemplar.id = next_id(self.exemplars.len());
        self.exemplars.push(exemplar);
        Ok(())
    }

    /// Append to whichever list [`Node::branches`] returns.
    pub(crate) fn push_branch(&mut self, mut node: Node) {
        let branches = match self.flavor {
            Flavor::Schema => &mut self.exemplars,
            Flavor::Instance => &mut self.children,
        };
        node.id = next_id(branches.len());
        branches.push(node);
    }

    pub(crate) fn remove_exemplar(&mut self, index: usize) -> Node {
        self.exemplars.remove(index)
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }


    // ------------------------------------------------------------------
    // Adaptive (type-selectable) nodes
    // ------------------------------------------------------------------

    pub(crate) fn promote(&mut self, candidates: Vec<Node>) {
        self.adaptive = Some(AdaptiveTypes {
            candidates,
            selected: None,
        });
    }

    pub fn is_adaptive(&self) -> bool {
        self.adaptive.is_some()
    }

    pub fn adaptive(&self) -> Option<&AdaptiveTypes> {
        self.adaptive.as_ref()
    }

    pub fn type_candidates(&self) -> &[Node] {
        self.adaptive
            .as_ref()
            .map(|a| a.candidates.as_slice())
            .unwrap_or(&[])
    }

    pub fn type_names(&self) -> Vec<&str> {
        self.type_candidates()
            .iter()
            .map(|t| t.name.as_str())
            .collect()
    }

    /// Make the named type's parameters live. Returns `false` if this node is
    /// not adaptive or has no such type.
    pub fn select_type(&mut self, name: &str) -> bool {
        let Some(types) = self.adaptive.as_mut() else {
            return false;
        };
        match types.candidates.iter().position(|t| t.name == name) {
            Some(i) => {
                types.selected = Some(i);
                true
            }
            None => false,
        }
    }

    /// Remaining exemplars followed by the type candidates.
    pub fn selectable_exemplars(&self) -> impl Iterator<Item = &Node> {
        self.exemplars.iter().chain(self.type_candidates())
    }

    /// Instance-flavored copy of this node carrying its live parameters and
    /// no children.
    pub fn instantiate(&self) -> Node {
        let mut node = Node::instance(self.name.clone());
        node.id = self.id;
        node.description = self.description.clone();
        node.set_parameters(self.active_parameters().clone());
        node
    }
}

pub(crate) fn next_id(index: usize) -> u32 {
    u32::try_from(index).map_or(u32::MAX, |i| i.saturating_add(PARAMETER_SET_ID + 1))
}

/// Resolve an address against a forest.
pub fn node_at<'a>(forest: &'a [Node], address: &[usize]) -> Option<&'a Node> {
    let (first, rest) = address.split_first()?;
    let mut node = forest.get(*first)?;
    for i in rest {
        node = node.branches().get(*i)?;
    }
    Some(node)
}

pub fn node_at_mut<'a>(forest: &'a mut [Node], address: &[usize]) -> Option<&'a mut Node> {
    let (first, rest) = address.split_first()?;
    let mut node = forest.get_mut(*first)?;
    for i in rest {
        node = node.branches_mut().get_mut(*i)?;
    }
    Some(node)
}

/// One stop of a breadth-first walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Visit {
    pub address: Address,
    /// Name of the parent node; empty for forest roots.
    pub parent: String,
}

/// Breadth-first order over a forest, following each node's branches.
pub fn breadth_first(forest: &[Node]) -> Vec<Visit> {
    let mut visits = Vec::new();
    let mut queue: VecDeque<Visit> = forest
        .iter()
        .enumerate()
        .map(|(i, _)| Visit {
            address: vec![i],
            parent: String::new(),
        })
        .collect();

    while let Some(visit) = queue.pop_front() {
        if let Some(node) = node_at(forest, &visit.address) {
            for (i, _) in node.branches().iter().enumerate() {
                let mut address = visit.address.clone();
                address.push(i);
                queue.push_back(Visit {
                    address,
                    parent: node.name.clone(),
                });
            }
            visits.push(visit);
        }
    }

    visits
}
