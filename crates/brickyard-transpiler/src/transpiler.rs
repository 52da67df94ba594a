//! Component tree traversal.

use std::collections::BTreeSet;

use brickyard_argo::{
    DagTask, DagTemplate, Template, Workflow, WorkflowBuilder, remove_duplicated_templates,
};
use brickyard_core::model::{
    Component, Conditional, Data, Graph, Implementation, Job, Map, Node, PortType,
};
use brickyard_core::{NodeId, ROOT_NODE};

use crate::bridge::{Wiring, inline};
use crate::config::TranspilerConfig;
use crate::error::{Error, Result, ResultExt};
use crate::scope::{SecretScope, VolumeScope};
use crate::{TRACING_TARGET, brick, dag, expression, ports};

/// Label carrying the identifier of the source workflow.
pub const WORKFLOW_ID_LABEL: &str = "brickyard.io/workflow-id";

/// Annotation carrying the name of the source workflow.
pub const WORKFLOW_NAME_ANNOTATION: &str = "brickyard.io/workflow-name";

/// Lowers dereferenced component trees into Argo workflows.
///
/// A transpiler holds no state besides its configuration and can be shared
/// between threads.
#[derive(Debug, Clone, Default)]
pub struct Transpiler {
    config: TranspilerConfig,
}

impl Transpiler {
    /// Creates a transpiler.
    pub fn new(config: TranspilerConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TranspilerConfig {
        &self.config
    }

    /// Transpiles a job into a workflow.
    ///
    /// The root component must be inline and fully dereferenced. The
    /// entrypoint is the template of the root component; job values become
    /// workflow arguments, volumes and root scopes.
    pub fn transpile(&self, job: &Job) -> Result<Workflow> {
        let workflow = &job.workflow;
        let root = workflow
            .component
            .as_component()
            .ok_or_else(|| Error::NotDereferenced {
                node_id: NodeId::from(ROOT_NODE),
                found: workflow.component.variant_name(),
            })?;

        tracing::info!(
            target: TRACING_TARGET,
            workflow_id = %workflow.id,
            component_id = %root.id,
            inputs = job.inputs.len(),
            "Transpiling job"
        );

        let seed = crate::job::seed(root, &job.inputs)?;
        let templates = self.transpile_component(root, &seed.secrets, &seed.volume_scope)?;

        let namespace = self
            .config
            .namespace
            .as_deref()
            .unwrap_or(&workflow.workspace);
        let mut builder = WorkflowBuilder::new(root.id.to_string())
            .namespace(namespace)
            .generate_name(&workflow.name)
            .labels(self.config.labels.clone())
            .label(WORKFLOW_ID_LABEL, workflow.id.to_string())
            .annotations(self.config.annotations.clone())
            .annotation(WORKFLOW_NAME_ANNOTATION, &workflow.name)
            .arguments(seed.arguments)
            .volumes(seed.volumes)
            .templates(templates);
        if let Some(account) = &self.config.service_account {
            builder = builder.service_account(account);
        }

        let output = builder.build();
        tracing::info!(
            target: TRACING_TARGET,
            workflow_id = %workflow.id,
            templates = output.spec.templates.len(),
            "Transpiled job"
        );
        Ok(output)
    }

    /// Transpiles a component tree into de-duplicated templates, the first
    /// being the template of `component`.
    pub fn transpile_component(
        &self,
        component: &Component,
        secrets: &SecretScope,
        volumes: &VolumeScope,
    ) -> Result<Vec<Template>> {
        component.validate()?;

        let mut templates = Vec::new();
        self.traverse(component, secrets, volumes, &mut templates)
            .in_component(component.id)?;
        Ok(remove_duplicated_templates(templates))
    }

    /// Emits the template of `component`, then the templates of its
    /// children.
    fn traverse(
        &self,
        component: &Component,
        secrets: &SecretScope,
        volumes: &VolumeScope,
        templates: &mut Vec<Template>,
    ) -> Result<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            component_id = %component.id,
            kind = component.implementation.kind(),
            secrets = secrets.len(),
            volumes = volumes.len(),
            "Visiting component"
        );

        match &component.implementation {
            Implementation::Brick(spec) => {
                let template =
                    brick::emit(component, spec, secrets, volumes, &self.config.artifact_root)?;
                templates.push(template);
                Ok(())
            }
            Implementation::Graph(graph) => {
                self.graph(component, graph, secrets, volumes, templates)
            }
            Implementation::Map(map) => self.map(component, map, secrets, volumes, templates),
            Implementation::Conditional(cond) => {
                self.conditional(component, cond, secrets, volumes, templates)
            }
            Implementation::Any => Err(Error::UnsupportedImplementation {
                kind: component.implementation.kind(),
            }),
        }
    }

    fn graph(
        &self,
        component: &Component,
        graph: &Graph,
        secrets: &SecretScope,
        volumes: &VolumeScope,
        templates: &mut Vec<Template>,
    ) -> Result<()> {
        let wiring = Wiring::graph(graph);

        let mut tasks = Vec::with_capacity(graph.nodes.len());
        for node in &graph.nodes {
            let child = inline(node)?;
            let mut task = DagTask::new(node.id.as_str(), child.id.to_string());
            task.dependencies = graph
                .dependencies(&node.id)
                .iter()
                .map(|id| id.as_str().to_owned())
                .collect();

            let mappings = graph
                .input_mappings
                .iter()
                .filter(|m| m.target.node == node.id);
            dag::wire_input_mappings(&mut task, component, child, mappings)?;
            for edge in graph.incoming(&node.id) {
                dag::wire_edge(&mut task, &wiring, child, edge)?;
            }
            tasks.push(task);
        }

        let outputs = dag::mapped_outputs(component, &graph.output_mappings, |id| {
            id.as_str().to_owned()
        })?;
        templates.push(Template::dag(
            component.id.to_string(),
            ports::declare_inputs(component, None),
            outputs,
            DagTemplate { tasks },
        ));

        for node in &graph.nodes {
            let child = inline(node)?;
            self.descend(&wiring, &node.id, child, secrets, volumes, templates)?;
        }
        Ok(())
    }

    fn map(
        &self,
        component: &Component,
        map: &Map,
        secrets: &SecretScope,
        volumes: &VolumeScope,
        templates: &mut Vec<Template>,
    ) -> Result<()> {
        let wiring = Wiring::map(map);
        let child = inline(&map.node)?;
        let task_name = &self.config.map_task_name;

        let mut task = DagTask::new(task_name, child.id.to_string());
        dag::wire_input_mappings(&mut task, component, child, &map.input_mappings)?;
        if task.with_param.is_none() {
            tracing::warn!(
                target: TRACING_TARGET,
                component_id = %component.id,
                "Map does not fan out over any parameter array"
            );
        }

        let outputs = dag::mapped_outputs(component, &map.output_mappings, |_| task_name.clone())?;
        templates.push(Template::dag(
            component.id.to_string(),
            ports::declare_inputs(component, None),
            outputs,
            DagTemplate { tasks: vec![task] },
        ));

        self.descend(&wiring, &map.node.id, child, secrets, volumes, templates)
    }

    fn conditional(
        &self,
        component: &Component,
        cond: &Conditional,
        secrets: &SecretScope,
        volumes: &VolumeScope,
        templates: &mut Vec<Template>,
    ) -> Result<()> {
        check_branch_mappings(cond)?;
        let wiring = Wiring::conditional(cond);
        let node_true = inline(&cond.node_true)?;
        let branch_false = match &cond.node_false {
            Some(node) => {
                let node_false = inline(node)?;
                check_symmetry(&cond.node_true, node_true, node, node_false)?;
                Some((node, node_false))
            }
            None => None,
        };

        let when = expression::render_when(&cond.expression, &component.inputs)?;
        let mut true_task = DagTask::new(&self.config.true_task_name, node_true.id.to_string());
        let mappings = cond
            .input_mappings
            .iter()
            .filter(|m| m.target.node == cond.node_true.id);
        dag::wire_input_mappings(&mut true_task, component, node_true, mappings)?;

        let false_task = branch_false.map(|(_, node_false)| DagTask {
            name: self.config.false_task_name.clone(),
            template: node_false.id.to_string(),
            when: Some(expression::negate(&when)),
            ..true_task.clone()
        });
        true_task.when = Some(when);

        let outputs = dag::conditional_outputs(
            component,
            cond,
            &self.config.true_task_name,
            &self.config.false_task_name,
        )?;
        let tasks = std::iter::once(true_task).chain(false_task).collect();
        templates.push(Template::dag(
            component.id.to_string(),
            ports::declare_inputs(component, None),
            outputs,
            DagTemplate { tasks },
        ));

        // Both branches share the bindings of the true branch.
        self.descend(&wiring, &cond.node_true.id, node_true, secrets, volumes, templates)?;
        if let Some((_, node_false)) = branch_false {
            self.descend(&wiring, &cond.node_true.id, node_false, secrets, volumes, templates)?;
        }
        Ok(())
    }

    /// Narrows the scopes for a child and visits it.
    fn descend(
        &self,
        wiring: &Wiring<'_>,
        claimant: &NodeId,
        child: &Component,
        secrets: &SecretScope,
        volumes: &VolumeScope,
        templates: &mut Vec<Template>,
    ) -> Result<()> {
        let child_secrets = secrets.narrow(wiring.bindings(claimant));
        let child_volumes = wiring.narrow_volumes(claimant, child, volumes)?;

        self.traverse(child, &child_secrets, &child_volumes, templates)
            .in_component(child.id)
    }
}

/// Checks that both branches of a conditional declare the same ports.
fn check_symmetry(
    true_node: &Node,
    node_true: &Component,
    false_node: &Node,
    node_false: &Component,
) -> Result<()> {
    let directions = [
        ("input", &node_true.inputs, &node_false.inputs),
        ("output", &node_true.outputs, &node_false.outputs),
    ];
    for (direction, a, b) in directions {
        if port_set(a) != port_set(b) {
            return Err(Error::ConditionalMismatch {
                node_true: true_node.id.clone(),
                node_false: false_node.id.clone(),
                direction,
            });
        }
    }
    Ok(())
}

/// Checks that every mapping of a conditional goes through its true branch.
fn check_branch_mappings(cond: &Conditional) -> Result<()> {
    let node_true = &cond.node_true.id;
    let misplaced = |port: &str, direction| Error::FalseBranchMapping {
        node_true: node_true.clone(),
        port: port.to_owned(),
        direction,
    };

    if let Some(mapping) = cond.input_mappings.iter().find(|m| m.target.node != *node_true) {
        return Err(misplaced(&mapping.source, "input"));
    }
    let orphan = cond.output_mappings.iter().find(|m| {
        m.source.node != *node_true
            && !cond
                .output_mappings
                .iter()
                .any(|t| t.source.node == *node_true && t.target == m.target)
    });
    match orphan {
        Some(mapping) => Err(misplaced(&mapping.target, "output")),
        None => Ok(()),
    }
}

fn port_set(ports: &[Data]) -> BTreeSet<(&str, PortType)> {
    ports.iter().map(|p| (p.name.as_str(), p.kind)).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use brickyard_argo::{Container, EnvVar, SecretKeySelector, ValueFrom, VolumeMount};
    use brickyard_core::model::{
        Argument, ArgumentKind, Brick, BrickResult, Edge, Expression, InputMapping, NodeRef,
        Operand, Operator, OutputMapping, PortRef, Value, Workflow as StoredWorkflow,
    };
    use uuid::Uuid;

    use super::*;
    use crate::fixtures::{alpine, id, value_brick};

    const VOLUME: &str = r#"{ "name": "workdir", "persistentVolumeClaim": { "claimName": "pvc-1" } }"#;
    const SECRET: &str = r#"{ "name": "creds", "key": "token" }"#;

    fn job(component: impl Into<NodeRef>, inputs: Vec<Value>) -> Job {
        Job {
            workflow: StoredWorkflow {
                id: Uuid::from_u128(7),
                name: "My Pipeline".into(),
                workspace: "team-a".into(),
                component: component.into(),
            },
            inputs,
        }
    }

    fn transpile(component: Component, inputs: Vec<Value>) -> Result<Workflow> {
        Transpiler::default().transpile(&job(component, inputs))
    }

    fn graph(n: u128, graph: Graph) -> Component {
        Component::new(id(n), format!("graph-{n}"), Implementation::Graph(graph))
    }

    fn tasks(workflow: &Workflow, n: u128) -> &[DagTask] {
        let template = workflow.template(&id(n).to_string()).unwrap();
        &template.dag.as_ref().unwrap().tasks
    }

    fn container(workflow: &Workflow, n: u128) -> &Container {
        let template = workflow.template(&id(n).to_string()).unwrap();
        template.container.as_ref().unwrap()
    }

    fn mounting_brick(n: u128, port: &str) -> Component {
        let brick = Brick::new(alpine())
            .with_arg(Argument::literal("ls"))
            .with_arg(Argument::port(port).with_prefix("/mnt"));
        Component::new(id(n), "mount", Implementation::Brick(brick)).with_input(Data::volume(port))
    }

    fn conditional(node_false: Option<Component>) -> Component {
        let mut output_mappings = vec![OutputMapping::new(PortRef::new("yes", "value"), "value")];
        if node_false.is_some() {
            output_mappings.push(OutputMapping::new(PortRef::new("no", "value"), "value"));
        }
        Component::new(
            id(300),
            "cond",
            Implementation::Conditional(Conditional {
                node_true: Node::new("yes", value_brick(1, None)),
                node_false: node_false.map(|c| Node::new("no", c)),
                expression: Expression::new(
                    Operand::literal("4"),
                    Operator::Ge,
                    Operand::literal("5"),
                ),
                input_mappings: Vec::new(),
                output_mappings,
            }),
        )
        .with_output(Data::parameter("value"))
    }

    #[test]
    fn minimal_single_brick() {
        let workflow = transpile(
            value_brick(1, Some("seed")),
            vec![Value::string("seed", "42")],
        )
        .unwrap();

        assert_eq!(workflow.spec.entrypoint, id(1).to_string());
        assert_eq!(workflow.spec.templates.len(), 1);

        let template = workflow.entrypoint().unwrap();
        assert_eq!(template.inputs.parameters.len(), 1);
        assert_eq!(template.inputs.parameters[0].name, "seed");
        assert_eq!(template.outputs.parameters.len(), 1);
        assert_eq!(template.outputs.parameters[0].name, "value");
        assert_eq!(
            container(&workflow, 1).args,
            ["echo", "{{inputs.parameters.seed}}"]
        );

        assert_eq!(
            workflow.spec.arguments.parameter("seed").unwrap().value.as_deref(),
            Some("42")
        );
        assert_eq!(workflow.metadata.namespace.as_deref(), Some("team-a"));
        assert_eq!(
            workflow.metadata.generate_name.as_deref(),
            Some("my-pipeline-")
        );
        assert_eq!(
            workflow.metadata.labels.get(WORKFLOW_ID_LABEL),
            Some(&Uuid::from_u128(7).to_string())
        );
    }

    #[test]
    fn two_node_graph_with_edge() {
        let root = graph(
            100,
            Graph {
                nodes: vec![
                    Node::new("N1", value_brick(1, None)),
                    Node::new("N2", value_brick(2, Some("value"))),
                ],
                edges: vec![Edge::new(
                    PortRef::new("N1", "value"),
                    PortRef::new("N2", "value"),
                )],
                ..Graph::default()
            },
        );

        let workflow = transpile(root, Vec::new()).unwrap();
        assert_eq!(workflow.spec.templates.len(), 3);
        assert_eq!(workflow.spec.templates[0].name, id(100).to_string());

        let tasks = tasks(&workflow, 100);
        assert_eq!(tasks.len(), 2);
        assert!(tasks[0].dependencies.is_empty());

        let n2 = &tasks[1];
        assert_eq!(n2.name, "N2");
        assert_eq!(n2.template, id(2).to_string());
        assert_eq!(n2.dependencies, ["N1"]);
        assert_eq!(n2.arguments.parameters.len(), 1);
        assert_eq!(n2.arguments.parameters[0].name, "value");
        assert_eq!(
            n2.arguments.parameters[0].value.as_deref(),
            Some("{{tasks.N1.outputs.parameters.value}}")
        );
    }

    #[test]
    fn if_else_guards_are_negations() {
        let workflow = transpile(conditional(Some(value_brick(2, None))), Vec::new()).unwrap();
        assert_eq!(workflow.spec.templates.len(), 3);

        let tasks = tasks(&workflow, 300);
        assert_eq!(tasks.len(), 2);
        let when = tasks[0].when.as_deref().unwrap();
        assert_eq!(when, "4 >= 5");
        assert_eq!(tasks[1].when, Some(format!("!({when})")));
        assert_eq!(tasks[0].name, "when-true");
        assert_eq!(tasks[1].template, id(2).to_string());

        let template = workflow.template(&id(300).to_string()).unwrap();
        assert_eq!(
            template.outputs.parameter("value").unwrap().value_from,
            Some(ValueFrom::expression(
                "4 >= 5 ? tasks['when-true'].outputs.parameters['value'] \
                 : tasks['when-false'].outputs.parameters['value']"
            ))
        );
    }

    #[test]
    fn missing_false_branch_selects_empty_string() {
        let workflow = transpile(conditional(None), Vec::new()).unwrap();
        assert_eq!(tasks(&workflow, 300).len(), 1);

        let template = workflow.template(&id(300).to_string()).unwrap();
        let value_from = template.outputs.parameter("value").unwrap().value_from.clone();
        assert!(value_from.unwrap().expression.unwrap().ends_with(": ''"));
    }

    #[test]
    fn mismatched_branches_fail() {
        let err = transpile(conditional(Some(value_brick(2, Some("extra")))), Vec::new())
            .unwrap_err();
        assert!(matches!(
            err.root(),
            Error::ConditionalMismatch { direction: "input", .. }
        ));
        assert_eq!(err.component_path(), [id(300)]);
    }

    fn with_mappings(
        mut component: Component,
        inputs: Vec<InputMapping>,
        outputs: Vec<OutputMapping>,
    ) -> Component {
        if let Implementation::Conditional(cond) = &mut component.implementation {
            cond.input_mappings = inputs;
            cond.output_mappings = outputs;
        }
        component
    }

    #[test]
    fn false_branch_input_mapping_fails() {
        let root = with_mappings(
            conditional(Some(value_brick(2, None))),
            vec![InputMapping::new("x", PortRef::new("no", "seed"))],
            Vec::new(),
        )
        .with_input(Data::parameter("x"));

        let err = transpile(root, vec![Value::string("x", "1")]).unwrap_err();
        assert!(matches!(
            err.root(),
            Error::FalseBranchMapping { direction: "input", port, .. } if port == "x"
        ));
        assert_eq!(err.component_path(), [id(300)]);
    }

    #[test]
    fn false_branch_only_output_mapping_fails() {
        let root = with_mappings(
            conditional(Some(value_brick(2, None))),
            Vec::new(),
            vec![OutputMapping::new(PortRef::new("no", "value"), "value")],
        );

        let err = transpile(root, Vec::new()).unwrap_err();
        assert!(matches!(
            err.root(),
            Error::FalseBranchMapping { direction: "output", port, .. } if port == "value"
        ));
    }

    #[test]
    fn volume_argument_is_mounted() {
        let brick = Brick::new(alpine())
            .with_arg(Argument::literal("ls"))
            .with_arg(
                Argument::port("mount-0")
                    .with_kind(ArgumentKind::Volume)
                    .with_prefix("vols/mypath"),
            );
        let root = Component::new(id(1), "mount", Implementation::Brick(brick))
            .with_input(Data::volume("mount-0"));

        let workflow = transpile(root, vec![Value::string("mount-0", VOLUME)]).unwrap();
        let container = container(&workflow, 1);
        assert_eq!(
            container.volume_mounts,
            [VolumeMount::new("workdir", "vols/mypath/mount-0")]
        );
        assert_eq!(container.args, ["ls"]);
        assert_eq!(workflow.spec.volumes.len(), 1);
        assert_eq!(workflow.spec.volumes[0].name, "workdir");
    }

    #[test]
    fn volume_is_bridged_through_producer() {
        let producer_brick = Brick::new(alpine())
            .with_arg(Argument::port("work"))
            .with_result(BrickResult::volume("work-out", "work"));
        let producer = Component::new(id(1), "producer", Implementation::Brick(producer_brick))
            .with_input(Data::volume("work"))
            .with_output(Data::volume("work-out"));

        let root = graph(
            100,
            Graph {
                nodes: vec![
                    Node::new("N1", producer),
                    Node::new("N2", mounting_brick(2, "work")),
                ],
                edges: vec![Edge::new(
                    PortRef::new("N1", "work-out"),
                    PortRef::new("N2", "work"),
                )],
                input_mappings: vec![InputMapping::new("work", PortRef::new("N1", "work"))],
                output_mappings: Vec::new(),
            },
        )
        .with_input(Data::volume("work"));

        let workflow = transpile(root, vec![Value::string("work", VOLUME)]).unwrap();
        assert_eq!(
            container(&workflow, 2).volume_mounts,
            [VolumeMount::new("workdir", "/mnt/work")]
        );

        let tasks = tasks(&workflow, 100);
        assert_eq!(tasks[1].dependencies, ["N1"]);
        assert!(tasks[1].arguments.is_empty());
    }

    #[test]
    fn volume_scope_crosses_nested_graphs() {
        let inner = graph(
            50,
            Graph {
                nodes: vec![Node::new("leaf", mounting_brick(1, "data"))],
                input_mappings: vec![InputMapping::new("shared", PortRef::new("leaf", "data"))],
                ..Graph::default()
            },
        )
        .with_input(Data::volume("shared"));
        let root = graph(
            100,
            Graph {
                nodes: vec![Node::new("inner", inner)],
                input_mappings: vec![InputMapping::new("work", PortRef::new("inner", "shared"))],
                ..Graph::default()
            },
        )
        .with_input(Data::volume("work"));

        let workflow = transpile(root, vec![Value::string("work", VOLUME)]).unwrap();
        assert_eq!(workflow.spec.templates.len(), 3);
        assert_eq!(
            container(&workflow, 1).volume_mounts,
            [VolumeMount::new("workdir", "/mnt/data")]
        );
    }

    #[test]
    fn secrets_are_renamed_and_pruned() {
        let consumer = Component::new(
            id(1),
            "consumer",
            Implementation::Brick(Brick::new(alpine())),
        )
        .with_input(Data::env_secret("API_KEY"));
        let root = graph(
            100,
            Graph {
                nodes: vec![
                    Node::new("N1", consumer),
                    Node::new("N2", value_brick(2, None)),
                ],
                input_mappings: vec![InputMapping::new("token", PortRef::new("N1", "API_KEY"))],
                ..Graph::default()
            },
        )
        .with_input(Data::env_secret("token"));

        let workflow = transpile(root, vec![Value::string("token", SECRET)]).unwrap();
        assert_eq!(
            container(&workflow, 1).env,
            [EnvVar::secret("API_KEY", SecretKeySelector::new("creds", "token"))]
        );
        assert!(container(&workflow, 2).env.is_empty());
        assert!(tasks(&workflow, 100)[0].arguments.is_empty());
        assert!(workflow.entrypoint().unwrap().inputs.is_empty());
    }

    #[test]
    fn shared_component_is_emitted_once() {
        let shared = value_brick(1, None);
        let root = graph(
            100,
            Graph {
                nodes: vec![Node::new("N1", shared.clone()), Node::new("N2", shared)],
                ..Graph::default()
            },
        );

        let workflow = transpile(root, Vec::new()).unwrap();
        assert_eq!(workflow.spec.templates.len(), 2);
        let name = id(1).to_string();
        let count = workflow
            .spec
            .templates
            .iter()
            .filter(|t| t.name == name)
            .count();
        assert_eq!(count, 1);
        assert!(tasks(&workflow, 100).iter().all(|t| t.template == name));
    }

    #[test]
    fn every_port_type_is_handled() {
        let brick = Brick::new(alpine())
            .with_arg(Argument::port("p"))
            .with_arg(Argument::port("pa"))
            .with_arg(Argument::port("a"))
            .with_arg(Argument::port("v"))
            .with_result(BrickResult::file("op", "/tmp/op"))
            .with_result(BrickResult::file("opa", "/tmp/opa"))
            .with_result(BrickResult::file("oa", "/tmp/oa"))
            .with_result(BrickResult::volume("ov", "v"));
        let root = Component::new(id(1), "all", Implementation::Brick(brick))
            .with_input(Data::parameter("p"))
            .with_input(Data::parameter_array("pa"))
            .with_input(Data::artifact("a"))
            .with_input(Data::volume("v"))
            .with_input(Data::env_secret("s"))
            .with_output(Data::parameter("op"))
            .with_output(Data::parameter_array("opa"))
            .with_output(Data::artifact("oa"))
            .with_output(Data::volume("ov"))
            .with_output(Data::env_secret("os"));

        let inputs = vec![
            Value::string("p", "1"),
            Value::array("pa", ["a", "b"]),
            Value::string("v", VOLUME),
            Value::string("s", SECRET),
        ];
        let workflow = transpile(root, inputs).unwrap();

        let template = workflow.entrypoint().unwrap();
        let container = container(&workflow, 1);
        assert_eq!(
            container.args,
            [
                "{{inputs.parameters.p}}",
                "{{inputs.parameters.pa}}",
                "{{inputs.artifacts.a.path}}",
            ]
        );
        assert_eq!(container.volume_mounts.len(), 1);
        assert_eq!(container.env.len(), 1);
        assert_eq!(template.inputs.parameters.len(), 2);
        assert_eq!(template.inputs.artifacts.len(), 1);
        assert_eq!(template.outputs.parameters.len(), 2);
        assert_eq!(template.outputs.artifacts.len(), 1);
    }

    #[test]
    fn misspelled_port_type_is_rejected() {
        let raw = serde_json::json!({ "name": "seed", "type": "paramter" });
        assert!(serde_json::from_value::<Data>(raw).is_err());
    }

    #[test]
    fn reference_node_fails_with_its_id() {
        let root = graph(
            100,
            Graph {
                nodes: vec![Node::new("N1", NodeRef::Reference { id: id(1) })],
                ..Graph::default()
            },
        );

        let err = transpile(root, Vec::new()).unwrap_err();
        assert!(matches!(
            err.root(),
            Error::NotDereferenced { node_id, found: "reference" } if node_id.as_str() == "N1"
        ));
        assert_eq!(err.component_path(), [id(100)]);
    }

    #[test]
    fn reference_root_fails() {
        let job = job(NodeRef::ReferenceVersion { id: id(1), version: 3 }, Vec::new());
        let err = Transpiler::default().transpile(&job).unwrap_err();
        assert!(matches!(
            err,
            Error::NotDereferenced { node_id, found: "reference_version" } if node_id.as_str() == ROOT_NODE
        ));
    }

    #[test]
    fn any_implementation_fails() {
        let stub = Component::new(id(5), "stub", Implementation::Any);
        let root = graph(
            100,
            Graph {
                nodes: vec![Node::new("stub", stub)],
                ..Graph::default()
            },
        );

        let err = transpile(root, Vec::new()).unwrap_err();
        assert!(matches!(
            err.root(),
            Error::UnsupportedImplementation { kind: "any" }
        ));
        assert_eq!(err.component_path(), [id(100), id(5)]);
    }

    #[test]
    fn map_fans_out_over_array_input() {
        let map = Map {
            node: Node::new("body", value_brick(1, Some("item"))),
            input_mappings: vec![InputMapping::new("items", PortRef::new("body", "item"))],
            output_mappings: vec![OutputMapping::new(PortRef::new("body", "value"), "values")],
        };
        let root = Component::new(id(200), "map", Implementation::Map(map))
            .with_input(Data::parameter_array("items"))
            .with_output(Data::parameter_array("values"));

        let workflow = transpile(root, vec![Value::array("items", ["a", "b"])]).unwrap();
        let tasks = tasks(&workflow, 200);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "map");
        assert_eq!(tasks[0].template, id(1).to_string());
        assert_eq!(
            tasks[0].with_param.as_deref(),
            Some("{{inputs.parameters.items}}")
        );
        assert_eq!(
            tasks[0].arguments.parameter("item").unwrap().value.as_deref(),
            Some("{{item}}")
        );

        let template = workflow.entrypoint().unwrap();
        assert_eq!(
            template.outputs.parameter("values").unwrap().value_from,
            Some(ValueFrom::parameter("{{tasks.map.outputs.parameters.value}}"))
        );
        assert_eq!(
            workflow.spec.arguments.parameter("items").unwrap().value.as_deref(),
            Some(r#"["a","b"]"#)
        );
    }

    #[test]
    fn map_over_array_typed_body_port_iterates() {
        let body = Component::new(
            id(1),
            "each",
            Implementation::Brick(
                Brick::new(alpine())
                    .with_arg(Argument::port("items"))
                    .with_result(BrickResult::file("value", "/tmp/value")),
            ),
        )
        .with_input(Data::parameter_array("items"))
        .with_output(Data::parameter("value"));
        let map = Map {
            node: Node::new("body", body),
            input_mappings: vec![InputMapping::new("items", PortRef::new("body", "items"))],
            output_mappings: Vec::new(),
        };
        let root = Component::new(id(200), "map", Implementation::Map(map))
            .with_input(Data::parameter_array("items"));

        let workflow = transpile(root, vec![Value::array("items", ["a", "b"])]).unwrap();
        let task = &tasks(&workflow, 200)[0];
        assert_eq!(task.with_param.as_deref(), Some("{{inputs.parameters.items}}"));
        assert_eq!(
            task.arguments.parameter("items").unwrap().value.as_deref(),
            Some("{{item}}")
        );
    }

    #[test]
    fn array_edge_from_brick_fans_out() {
        let lister = Component::new(
            id(1),
            "lister",
            Implementation::Brick(
                Brick::new(alpine()).with_result(BrickResult::file("list", "/tmp/list")),
            ),
        )
        .with_output(Data::parameter_array("list"));
        let root = graph(
            100,
            Graph {
                nodes: vec![
                    Node::new("N1", lister),
                    Node::new("N2", value_brick(2, Some("item"))),
                ],
                edges: vec![Edge::new(PortRef::new("N1", "list"), PortRef::new("N2", "item"))],
                ..Graph::default()
            },
        );

        let workflow = transpile(root, Vec::new()).unwrap();
        let n2 = &tasks(&workflow, 100)[1];
        assert_eq!(
            n2.with_param.as_deref(),
            Some("{{tasks.N1.outputs.parameters.list}}")
        );
        assert_eq!(
            n2.arguments.parameter("item").unwrap().value.as_deref(),
            Some("{{item}}")
        );
    }

    #[test]
    fn unknown_job_input_fails() {
        let err = transpile(value_brick(1, None), vec![Value::string("ghost", "1")]).unwrap_err();
        assert!(matches!(err, Error::UnknownInput { target } if target == "ghost"));
    }

    #[test]
    fn nil_identifier_is_rejected() {
        let mut root = value_brick(1, None);
        root.id = brickyard_core::ComponentId::nil();
        let err = transpile(root, Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Model(brickyard_core::Error::NilIdentifier { .. })
        ));
    }

    #[test]
    fn config_shapes_the_envelope() {
        let config = TranspilerConfig::builder()
            .namespace("override")
            .service_account("runner")
            .labels(BTreeMap::from([("team".to_owned(), "data".to_owned())]))
            .build()
            .unwrap();
        let job = job(value_brick(1, None), Vec::new());

        let workflow = Transpiler::new(config).transpile(&job).unwrap();
        assert_eq!(workflow.metadata.namespace.as_deref(), Some("override"));
        assert_eq!(
            workflow.spec.service_account_name.as_deref(),
            Some("runner")
        );
        assert_eq!(
            workflow.metadata.labels.get("team").map(String::as_str),
            Some("data")
        );
        assert!(workflow.metadata.labels.contains_key(WORKFLOW_ID_LABEL));
        assert_eq!(
            workflow
                .metadata
                .annotations
                .get(WORKFLOW_NAME_ANNOTATION)
                .map(String::as_str),
            Some("My Pipeline")
        );
    }
}
