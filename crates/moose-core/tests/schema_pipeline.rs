//! Schema loading through hard-path resolution
//!
//! Run with: cargo test -p moose-core --test schema_pipeline

use moose_core::{
    AllowedValues, InstanceLoader, InstanceSerializer, Node, SchemaLoader, VariableConstrainer,
};
use pretty_assertions::assert_eq;

const SCHEMA: &str = r#"
- name: /Executioner
  description: Controls the solve
  parameters:
    - name: type
      cpp_type: std::string
      required: true
    - name: solve_type
      cpp_type: MooseEnum
      options: NEWTON PJFNK JFNK
      default: PJFNK
  subblocks:
    - name: /Executioner/<type>
      subblocks:
        - name: /Executioner/<type>/Steady
          parameters:
            - name: type
              default: Steady
        - name: /Executioner/<type>/Transient
          parameters:
            - name: dt
              cpp_type: double
              default: 1
            - name: solve_type
              cpp_type: MooseEnum
              options: [NEWTON, PJFNK]
              default: NEWTON
- name: /Kernels
  subblocks:
    - name: /Kernels/*
      parameters:
        - name: variable
          cpp_type: NonlinearVariableName
          required: true
      subblocks:
        - name: /Kernels/*/<type>
          subblocks:
            - name: /Kernels/*/<type>/Diffusion
            - name: /Kernels/*/<type>/TimeDerivative
              parameters:
                - name: lumping
                  cpp_type: bool
                  default: false
- name: /Outputs
  parameters:
    - name: exodus
      cpp_type: bool
    - name: file_base
      cpp_type: OutFileBase
"#;

const SYNTAX: &str = "\
Executioner\r
Executioner\r
Executioner/*\r
Kernels\r
Kernels/*\r
Kernels/New_Kernel\r
Outputs\r
Postprocessors/*\r
";

#[test]
fn test_resolution_report() {
    let mut schema = SchemaLoader::new().load(SCHEMA).unwrap();
    let report = schema.resolve_hard_paths(SYNTAX);
    assert_eq!(report.promoted, vec!["Executioner", "Kernels/New_Kernel"]);
    assert_eq!(report.skipped, 2);
}

#[test]
fn test_promoted_nodes_offer_types() {
    let schema = SchemaLoader::new()
        .load_with_syntax(SCHEMA, SYNTAX)
        .unwrap();

    let executioner = schema.get("Executioner").unwrap();
    assert!(executioner.is_adaptive());
    assert_eq!(executioner.type_names(), vec!["Steady", "Transient"]);
    assert!(executioner.exemplars().is_empty());
    assert!(schema.get("Executioner/<type>").is_none());

    let kernel = schema.get("Kernels/New_Kernel").unwrap();
    assert_eq!(kernel.type_names(), vec!["Diffusion", "TimeDerivative"]);
}

#[test]
fn test_candidate_parameters_override_parent() {
    let schema = SchemaLoader::new()
        .load_with_syntax(SCHEMA, SYNTAX)
        .unwrap();
    let executioner = schema.get("Executioner").unwrap();

    let steady = &executioner.type_candidates()[0];
    let steady_type = steady.parameters().get("type").unwrap();
    assert_eq!(steady_type.value(), "Steady");
    assert!(steady_type.required);
    assert_eq!(steady.parameters().get("solve_type").unwrap().value(), "PJFNK");

    let transient = &executioner.type_candidates()[1];
    let solve = transient.parameters().get("solve_type").unwrap();
    assert_eq!(solve.value(), "NEWTON");
    assert_eq!(
        solve.allowed(),
        &AllowedValues::Discrete(vec!["NEWTON".into(), "PJFNK".into()])
    );
    assert!(transient.parameters().contains("type"));
}

#[test]
fn test_resolving_twice_changes_nothing() {
    let mut schema = SchemaLoader::new().load(SCHEMA).unwrap();
    schema.resolve_hard_paths(SYNTAX);
    let once = schema.roots().to_vec();

    let report = schema.resolve_hard_paths(SYNTAX);
    assert!(report.promoted.is_empty());
    assert_eq!(schema.roots(), once.as_slice());
}

#[test]
fn test_select_type_then_instantiate_and_write() {
    let schema = SchemaLoader::new()
        .load_with_syntax(SCHEMA, SYNTAX)
        .unwrap();
    let mut roots = schema.into_roots();

    let executioner = &mut roots[0];
    assert!(executioner.select_type("Transient"));
    assert!(executioner.active_parameters().contains("dt"));
    let instance = executioner.instantiate();

    // Only the required `type` is live; optional schema parameters start
    // commented out.
    let text = InstanceSerializer::serialize(&[instance]);
    assert_eq!(
        text,
        format!(
            "[Executioner]{}# Controls the solve\n  #dt=1\n  #solve_type=NEWTON\n  type = \n[]\n",
            " ".repeat(17)
        )
    );
}

#[test]
fn test_bool_entries_default_to_true() {
    let schema = SchemaLoader::new().load(SCHEMA).unwrap();
    let exodus = schema.get("Outputs").unwrap().parameters().get("exodus").unwrap();
    assert_eq!(exodus.value(), "true");
    assert!(!exodus.is_enabled());
    assert!(matches!(
        schema.get("Outputs").unwrap().parameters().get("file_base").unwrap().allowed(),
        AllowedValues::FreeText
    ));
}

#[test]
fn test_instance_from_schema_constrains_variables() {
    let input = "\
[Variables]
  [./u]
  [../]
  [./v]
  [../]
[]
[Kernels]
  [./diff]
    type = Diffusion
    variable = v
  [../]
[]
";
    let mut forest: Vec<Node> = InstanceLoader::load(input).unwrap();
    VariableConstrainer::constrain(&mut forest);

    let variable = forest[1].children()[0].parameters().get("variable").unwrap();
    assert_eq!(variable.value(), "v");
    assert_eq!(
        variable.allowed().options(),
        Some(&["u".to_string(), "v".to_string()][..])
    );
}
