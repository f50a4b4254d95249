//! MOOSE blocks: the parse-time shape shared by schema and instance input.
//!
//! A [`Block`] is built once by a loader, converted into a [`Node`] and then
//! dropped. The conversion decides the flavor: schema sub-blocks become
//! exemplars, instance sub-blocks become children.

use serde::Serialize;
use serde_yaml::Value;

use crate::entry::ParameterSet;
use crate::error::{MooseError, Result};
use crate::node::{Flavor, Node};
use crate::parameter::{scalar_text, Parameter};

/// Name used in schemas for "any number of user-named sub-blocks".
pub const WILDCARD_NAME: &str = "*";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Block {
    pub name: String,
    pub description: String,
    pub active: bool,
    pub parameters: Vec<Parameter>,
    pub subblocks: Vec<Block>,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.subblocks.is_empty()
    }

    /// Load a block (and its sub-blocks) from one map of the YAML schema.
    ///
    /// Names may be given as full paths (`Kernels/*/<type>`); only the last
    /// segment is kept.
    pub fn from_schema_value(value: &Value) -> Result<Self> {
        let map = value
            .as_mapping()
            .ok_or_else(|| MooseError::schema("block entry is not a map"))?;

        let name = match map.get("name") {
            Some(Value::String(full)) => full.rsplit('/').next().unwrap_or_default().to_string(),
            Some(_) => return Err(MooseError::schema("block name must be a string")),
            None => return Err(MooseError::schema("block without a name")),
        };
        if name.is_empty() {
            return Err(MooseError::schema("block with an empty name"));
        }

        let mut block = Block::new(name);
        block.active = true;
        if let Some(description) = map.get("description") {
            block.description = scalar_text(description, "description")?;
        }

        match map.get("parameters") {
            None | Some(Value::Null) => {}
            Some(Value::Sequence(params)) => {
                block.parameters = params
                    .iter()
                    .map(Parameter::from_schema_value)
                    .collect::<Result<_>>()
                    .map_err(|e| prefix_schema_error(&block.name, e))?;
            }
            Some(_) => {
                return Err(MooseError::schema(format!(
                    "block '{}': parameters must be a list",
                    block.name
                )))
            }
        }

        match map.get("subblocks") {
            None | Some(Value::Null) => {}
            Some(Value::Sequence(subs)) => {
                block.subblocks = subs
                    .iter()
                    .map(Block::from_schema_value)
                    .collect::<Result<_>>()?;
            }
            Some(_) => {
                return Err(MooseError::schema(format!(
                    "block '{}': subblocks must be a list",
                    block.name
                )))
            }
        }

        Ok(block)
    }

    /// Visit every parameter in this block and its sub-blocks.
    pub fn for_each_parameter_mut(&mut self, f: &mut impl FnMut(&mut Parameter)) {
        for param in &mut self.parameters {
            f(param);
        }
        for sub in &mut self.subblocks {
            sub.for_each_parameter_mut(f);
        }
    }

    /// Convert into a schema node whose sub-blocks are exemplars.
    pub fn into_schema_node(self) -> Node {
        self.into_node(Flavor::Schema)
    }

    /// Convert into an instance node whose sub-blocks are literal children.
    pub fn into_instance_node(self) -> Node {
        self.into_node(Flavor::Instance)
    }

    fn into_node(self, flavor: Flavor) -> Node {
        let mut node = Node::new(flavor, self.name.clone());
        node.description = self.description;
        node.active = self.active;

        let mut parameters = ParameterSet::new(&self.name);
        for param in &self.parameters {
            parameters.push(param.to_entry());
        }
        node.set_parameters(parameters);

        for mut sub in self.subblocks {
            if flavor == Flavor::Schema && sub.name == WILDCARD_NAME {
                sub.name = wildcard_label(&self.name);
            }
            node.push_branch(sub.into_node(flavor));
        }

        node
    }

    /// Rebuild a block from an instance node, reading its live parameters.
    pub fn from_node(node: &Node) -> Self {
        Self {
            name: node.name.clone(),
            description: node.description.clone(),
            active: node.active,
            parameters: node
                .active_parameters()
                .entries()
                .iter()
                .map(Parameter::from_entry)
                .collect(),
            subblocks: node.children().iter().map(Block::from_node).collect(),
        }
    }
}

/// `"New_"` followed by the parent's name without its last character, so
/// `Kernels/*` is offered as `New_Kernel`.
fn wildcard_label(parent: &str) -> String {
    let mut singular = parent.to_string();
    singular.pop();
    format!("New_{}", singular)
}

fn prefix_schema_error(block: &str, err: MooseError) -> MooseError {
    match err {
        MooseError::MalformedSchema { message } => {
            MooseError::schema(format!("block '{}': {}", block, message))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_schema_block_uses_last_path_segment() {
        let block = Block::from_schema_value(&yaml(
            r#"
name: /Kernels/*/<type>
description: Kernel types
parameters:
subblocks:
"#,
        ))
        .unwrap();
        assert_eq!(block.name, "<type>");
        assert_eq!(block.description, "Kernel types");
        assert!(block.is_leaf());
    }

    #[test]
    fn test_schema_block_requires_string_name() {
        assert!(Block::from_schema_value(&yaml("description: nameless")).is_err());
        assert!(Block::from_schema_value(&yaml("name: [a, b]")).is_err());
        assert!(Block::from_schema_value(&yaml("name: Mesh/")).is_err());
    }

    #[test]
    fn test_schema_block_rejects_wrong_shapes() {
        let err = Block::from_schema_value(&yaml("name: Mesh\nparameters: 3")).unwrap_err();
        assert!(err.to_string().contains("parameters must be a list"));

        let err = Block::from_schema_value(&yaml(
            "name: Mesh\nparameters:\n  - cpp_type: int\n",
        ))
        .unwrap_err();
        assert!(err.to_string().contains("block 'Mesh'"));
    }

    #[test]
    fn test_wildcard_subblock_is_renamed() {
        let mut kernels = Block::new("Kernels");
        kernels.subblocks.push(Block::new("*"));
        let node = kernels.into_schema_node();
        assert_eq!(node.exemplars()[0].name, "New_Kernel");
    }

    #[test]
    fn test_wildcard_kept_on_instance_side() {
        let mut kernels = Block::new("Kernels");
        kernels.subblocks.push(Block::new("*"));
        let node = kernels.into_instance_node();
        assert_eq!(node.children()[0].name, "*");
    }

    #[test]
    fn test_schema_conversion_uses_exemplars() {
        let mut mesh = Block::new("Mesh");
        mesh.parameters.push(Parameter::new("dim", "2"));
        mesh.subblocks.push(Block::new("Partitioner"));
        mesh.subblocks.push(Block::new("Refinement"));

        let node = mesh.into_schema_node();
        assert_eq!(node.flavor(), Flavor::Schema);
        assert!(node.children().is_empty());
        assert_eq!(node.exemplars().len(), 2);
        assert_eq!(node.exemplars()[0].id, 2);
        assert_eq!(node.exemplars()[1].id, 3);
        assert_eq!(node.parameters().name, "Mesh Parameters");
        assert!(node.parameters().contains("dim"));
    }

    #[test]
    fn test_instance_round_trip_through_node() {
        let mut mesh = Block::new("Mesh");
        mesh.active = true;
        mesh.parameters.push(Parameter::new("dim", "2"));
        let mut sub = Block::new("gen");
        sub.active = true;
        mesh.subblocks.push(sub);

        let node = mesh.clone().into_instance_node();
        assert_eq!(node.children()[0].name, "gen");
        let back = Block::from_node(&node);
        assert_eq!(back.name, "Mesh");
        assert_eq!(back.parameters[0].to_string(), "dim = 2");
        assert_eq!(back.subblocks[0].name, "gen");
        assert!(back.subblocks[0].active);
    }
}
