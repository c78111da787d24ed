//! Overlay merge engine.
//!
//! The working graph is always rebuilt from a fresh clone of the base
//! graph; it is never patched incrementally, so toggling or removing a
//! pack cannot leave residue from an earlier merge.
//!
//! ## Per Definition
//!
//! 1. Ensure the tag node exists. A new node is attributed to the pack;
//!    an existing one is re-attributed only if it had no attribution or
//!    the definition replaces.
//! 2. On `replace`: drop the tag's outbound edges, mark it
//!    `replaced_by`, and take over the definition's payload.
//! 3. Add an edge to every resolved value, creating placeholders as needed.
//!
//! Packs apply in upload order, so the last replacing pack decides a
//! tag's outbound edges. Inbound edges are never touched.

use tracing::{debug, info};

use crate::graph::{GraphError, GraphSnapshot, Registration};
use crate::identifier::resolve_reference;
use crate::types::{Attribution, DataPack, NodeKind, ReplacedBy, TagDefinition};

/// Counters for one rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Packs applied.
    pub packs: usize,
    /// Definitions applied.
    pub definitions: usize,
    /// Definitions that replaced outbound edges.
    pub replacements: usize,
    /// Edges added on top of the base graph (net of replacements).
    pub edges_added: usize,
    /// Edges removed by replacements.
    pub edges_removed: usize,
}

/// Rebuild the working graph from `base` plus `packs`.
///
/// `packs` must be in upload order; disabled packs are skipped.
pub fn rebuild<'a, I>(base: &GraphSnapshot, packs: I) -> Result<GraphSnapshot, GraphError>
where
    I: IntoIterator<Item = &'a DataPack>,
{
    rebuild_with_summary(base, packs).map(|(graph, _)| graph)
}

/// [`rebuild`], also returning merge counters.
pub fn rebuild_with_summary<'a, I>(
    base: &GraphSnapshot,
    packs: I,
) -> Result<(GraphSnapshot, MergeSummary), GraphError>
where
    I: IntoIterator<Item = &'a DataPack>,
{
    let mut working = base.clone();
    let mut summary = MergeSummary::default();

    for pack in packs.into_iter().filter(|p| p.enabled) {
        summary.packs += 1;
        for definition in pack.tag_definitions.values() {
            apply_definition(&mut working, pack, definition, &mut summary)?;
        }
        debug!(pack = %pack.id, definitions = pack.num_definitions(), "Applied data pack");
    }

    if summary.packs > 0 {
        info!(
            packs = summary.packs,
            definitions = summary.definitions,
            replacements = summary.replacements,
            edges_added = summary.edges_added,
            edges_removed = summary.edges_removed,
            "Working graph rebuilt"
        );
    }

    Ok((working, summary))
}

fn apply_definition(
    graph: &mut GraphSnapshot,
    pack: &DataPack,
    definition: &TagDefinition,
    summary: &mut MergeSummary,
) -> Result<(), GraphError> {
    let id = definition.id();
    summary.definitions += 1;

    let registration = graph.register_node(
        id.clone(),
        NodeKind::Tag,
        &definition.category,
        Some((definition.path.clone(), definition.payload.clone())),
    );

    if let Some(node) = graph.node_mut(&id) {
        let claim = registration == Registration::Inserted
            || node.attribution.is_none()
            || definition.replace;
        if claim {
            node.attribution = Some(Attribution {
                pack_id: pack.id.clone(),
                pack_color: pack.color.clone(),
            });
        }

        if definition.replace {
            node.kind = NodeKind::Tag;
            node.replaced_by = Some(ReplacedBy {
                pack_name: pack.name.clone(),
                pack_color: pack.color.clone(),
            });
            node.definition_path = Some(definition.path.clone());
            node.payload = Some(definition.payload.clone());
        }
    }

    if definition.replace {
        summary.replacements += 1;
        summary.edges_removed += graph.remove_outbound_edges(&id);
    }

    for value in &definition.values {
        let (target, kind) = resolve_reference(value.raw_id(), &definition.category);
        graph.ensure_node(&target, kind, &definition.category);
        if graph.add_edge(&id, &target)? {
            summary.edges_added += 1;
        }
    }

    Ok(())
}
