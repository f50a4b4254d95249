//! Restrict `variable` entries to the variables an instance declares.
//!
//! A `variable` parameter may only name a sub-block of the top-level
//! `Variables` block (or, under `AuxKernels`, of `AuxVariables`). After
//! loading an instance, both passes turn every such entry into a discrete
//! choice over the declared names.

use serde::Serialize;
use tracing::debug;

use crate::entry::{AllowedValues, Entry};
use crate::node::{breadth_first, node_at_mut, Node};

/// Name of the parameter being constrained.
pub const VARIABLE_PARAMETER: &str = "variable";
/// Offered when a `Variables` block exists but declares nothing.
pub const VARIABLE_PLACEHOLDER: &str = "Create a Variable";

/// How many entries each pass rewrote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConstraintReport {
    pub variables: usize,
    pub aux_variables: usize,
}

pub struct VariableConstrainer;

impl VariableConstrainer {
    /// Run the `Variables` pass, then the `AuxVariables` pass.
    pub fn constrain(forest: &mut [Node]) -> ConstraintReport {
        let report = ConstraintReport {
            variables: Self::constrain_variables(forest),
            aux_variables: Self::constrain_aux_variables(forest),
        };
        debug!(
            "Constrained {} variable and {} aux variable entries",
            report.variables, report.aux_variables
        );
        report
    }

    /// Every `variable` entry outside an `Aux*` parent becomes a choice over
    /// the `Variables` sub-blocks. Values that are not declared fall back to
    /// the first name.
    pub fn constrain_variables(forest: &mut [Node]) -> usize {
        let Some(mut names) = declared_names(forest, "Variables") else {
            return 0;
        };
        if names.is_empty() {
            names.push(VARIABLE_PLACEHOLDER.to_string());
        }

        apply(forest, |parent| !parent.contains("Aux"), |entry| {
            entry.set_allowed(AllowedValues::Discrete(names.clone()));
            if !names.iter().any(|n| n == entry.value()) {
                entry.set_value(names[0].clone());
            }
        })
    }

    /// Every `variable` entry under an `AuxKernels` parent becomes a choice
    /// over the `AuxVariables` sub-blocks. The current value is kept as is.
    pub fn constrain_aux_variables(forest: &mut [Node]) -> usize {
        let Some(names) = declared_names(forest, "AuxVariables") else {
            return 0;
        };

        apply(forest, |parent| parent.contains("AuxKernels"), |entry| {
            entry.set_allowed(AllowedValues::Discrete(names.clone()));
        })
    }
}

/// Child names of the first top-level node called `block`.
fn declared_names(forest: &[Node], block: &str) -> Option<Vec<String>> {
    forest
        .iter()
        .find(|n| n.name == block)
        .map(|n| n.children().iter().map(|c| c.name.clone()).collect())
}

fn apply(
    forest: &mut [Node],
    parent_matches: impl Fn(&str) -> bool,
    mut rewrite: impl FnMut(&mut Entry),
) -> usize {
    let mut count = 0;
    for visit in breadth_first(forest) {
        if !parent_matches(&visit.parent) {
            continue;
        }
        let Some(node) = node_at_mut(forest, &visit.address) else {
            continue;
        };
        if let Some(entry) = node.active_parameters_mut().get_mut(VARIABLE_PARAMETER) {
            rewrite(entry);
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::InstanceLoader;
    use pretty_assertions::assert_eq;

    fn variable_of<'a>(forest: &'a [Node], block: &str, child: &str) -> &'a Entry {
        forest
            .iter()
            .find(|n| n.name == block)
            .and_then(|n| n.child(child))
            .and_then(|n| n.parameters().get(VARIABLE_PARAMETER))
            .unwrap()
    }

    const INPUT: &str = "\
[Variables]
  [./u]
  [../]
  [./v]
  [../]
[]
[AuxVariables]
  [./T]
  [../]
[]
[Kernels]
  [./diff]
    variable = v
  [../]
  [./bad]
    variable = w
  [../]
[]
[AuxKernels]
  [./heat]
    variable = missing
  [../]
[]
";

    #[test]
    fn test_variables_pass() {
        let mut forest = InstanceLoader::load(INPUT).unwrap();
        let report = VariableConstrainer::constrain(&mut forest);
        assert_eq!(report, ConstraintReport { variables: 2, aux_variables: 1 });

        let diff = variable_of(&forest, "Kernels", "diff");
        assert_eq!(diff.value(), "v");
        assert_eq!(
            diff.allowed(),
            &AllowedValues::Discrete(vec!["u".into(), "v".into()])
        );
        assert_eq!(variable_of(&forest, "Kernels", "bad").value(), "u");
    }

    #[test]
    fn test_aux_pass_keeps_value() {
        let mut forest = InstanceLoader::load(INPUT).unwrap();
        VariableConstrainer::constrain(&mut forest);

        let heat = variable_of(&forest, "AuxKernels", "heat");
        assert_eq!(heat.value(), "missing");
        assert_eq!(heat.allowed(), &AllowedValues::Discrete(vec!["T".into()]));
    }

    #[test]
    fn test_empty_variables_block_offers_placeholder() {
        let mut forest =
            InstanceLoader::load("[Variables]\n[]\n[Kernels]\n  [./k]\n    variable = x\n  [../]\n[]\n")
                .unwrap();
        VariableConstrainer::constrain(&mut forest);
        let k = variable_of(&forest, "Kernels", "k");
        assert_eq!(k.value(), VARIABLE_PLACEHOLDER);
        assert_eq!(
            k.allowed(),
            &AllowedValues::Discrete(vec![VARIABLE_PLACEHOLDER.into()])
        );
    }

    #[test]
    fn test_no_variables_block_leaves_entries_alone() {
        let mut forest =
            InstanceLoader::load("[Kernels]\n  [./k]\n    variable = x\n  [../]\n[]\n").unwrap();
        let before = forest.clone();
        let report = VariableConstrainer::constrain(&mut forest);
        assert_eq!(report, ConstraintReport::default());
        assert_eq!(forest, before);
    }

    #[test]
    fn test_top_level_variable_entry_is_constrained() {
        let mut forest =
            InstanceLoader::load("[Variables]\n  [./u]\n  [../]\n[]\n[Outputs]\n  variable = q\n[]\n")
                .unwrap();
        assert_eq!(VariableConstrainer::constrain_variables(&mut forest), 1);
        let outputs = forest[1].parameters().get(VARIABLE_PARAMETER).unwrap();
        assert_eq!(outputs.value(), "u");
    }
}
