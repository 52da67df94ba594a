//! Resolution of component references into fully inline component trees.
//!
//! Inline components are never looked up; each reference node costs exactly
//! one lookup, after which its children are dereferenced recursively.
//! Sibling nodes of a graph are resolved concurrently.

use futures::future::{BoxFuture, try_join_all};

use crate::error::{Error, Result};
use crate::id::NodeId;
use crate::lookup::{ComponentLookup, ComponentRequest};
use crate::model::{Component, Implementation, Job, Node, NodeRef};

/// Tracing target for dereferencing.
const TRACING_TARGET: &str = "brickyard_core::dereference";

/// Node identifier used in diagnostics for the root of a job.
pub const ROOT_NODE: &str = "root";

/// Dereferences a node reference into an inline component tree.
pub async fn dereference_ref<L>(lookup: &L, node_id: &NodeId, node: NodeRef) -> Result<Component>
where
    L: ComponentLookup + ?Sized,
{
    resolve(lookup, node_id, node, Vec::new()).await
}

/// Dereferences a node, keeping its identifier.
pub fn dereference_node<L>(lookup: &L, node: Node) -> BoxFuture<'_, Result<Node>>
where
    L: ComponentLookup + ?Sized,
{
    descend(lookup, node, Vec::new())
}

/// Dereferences every descendant of an inline component.
pub fn dereference_component<L>(lookup: &L, component: Component) -> BoxFuture<'_, Result<Component>>
where
    L: ComponentLookup + ?Sized,
{
    expand(lookup, component, Vec::new())
}

/// Dereferences the root component of a job.
pub async fn dereference_job<L>(lookup: &L, job: Job) -> Result<Job>
where
    L: ComponentLookup + ?Sized,
{
    let Job {
        mut workflow,
        inputs,
    } = job;

    let root = NodeId::from(ROOT_NODE);
    let component = dereference_ref(lookup, &root, workflow.component).await?;
    workflow.component = NodeRef::from(component);

    Ok(Job { workflow, inputs })
}

/// `chain` holds the requests that produced the enclosing components.
async fn resolve<L>(
    lookup: &L,
    node_id: &NodeId,
    node: NodeRef,
    mut chain: Vec<ComponentRequest>,
) -> Result<Component>
where
    L: ComponentLookup + ?Sized,
{
    let component = match node {
        NodeRef::Component(component) => *component,
        NodeRef::Reference { id } => {
            fetch(lookup, node_id, ComponentRequest::Latest(id), &mut chain).await?
        }
        NodeRef::ReferenceVersion { id, version } => {
            let request = ComponentRequest::Version(id, version);
            fetch(lookup, node_id, request, &mut chain).await?
        }
    };

    expand(lookup, component, chain)
        .await
        .map_err(|e| e.in_node(node_id))
}

fn descend<L>(lookup: &L, node: Node, chain: Vec<ComponentRequest>) -> BoxFuture<'_, Result<Node>>
where
    L: ComponentLookup + ?Sized,
{
    Box::pin(async move {
        let component = resolve(lookup, &node.id, node.node, chain).await?;
        Ok(Node::new(node.id, component))
    })
}

fn expand<L>(
    lookup: &L,
    component: Component,
    chain: Vec<ComponentRequest>,
) -> BoxFuture<'_, Result<Component>>
where
    L: ComponentLookup + ?Sized,
{
    Box::pin(async move {
        let mut component = component;
        component.implementation = match component.implementation {
            Implementation::Graph(mut graph) => {
                let nodes = graph
                    .nodes
                    .into_iter()
                    .map(|n| descend(lookup, n, chain.clone()));
                graph.nodes = try_join_all(nodes).await?;
                Implementation::Graph(graph)
            }
            Implementation::Map(mut map) => {
                map.node = descend(lookup, map.node, chain).await?;
                Implementation::Map(map)
            }
            Implementation::Conditional(mut cond) => {
                cond.node_true = descend(lookup, cond.node_true, chain.clone()).await?;
                if let Some(node_false) = cond.node_false.take() {
                    cond.node_false = Some(descend(lookup, node_false, chain).await?);
                }
                Implementation::Conditional(cond)
            }
            terminal @ (Implementation::Brick(_) | Implementation::Any) => terminal,
        };
        Ok(component)
    })
}

/// Looks up a component, failing if `chain` already requested it.
async fn fetch<L>(
    lookup: &L,
    node_id: &NodeId,
    request: ComponentRequest,
    chain: &mut Vec<ComponentRequest>,
) -> Result<Component>
where
    L: ComponentLookup + ?Sized,
{
    if chain.contains(&request) {
        return Err(Error::ReferenceCycle {
            node_id: node_id.clone(),
            request,
        });
    }
    chain.push(request);

    tracing::debug!(
        target: TRACING_TARGET,
        node_id = %node_id,
        request = %request,
        "Looking up referenced component"
    );

    lookup
        .get_component(&request)
        .await
        .map_err(|source| Error::Lookup {
            node_id: node_id.clone(),
            request,
            source,
        })
}
