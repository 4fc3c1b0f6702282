//! Associations: two properties, each added to the class at the other end.

use crate::handler::{KindHandler, UnbindContext};
use crate::process::{source_info, ProcessContext};
use crate::typing::lower_generic_type;
use crate::{CompileError, CompileResult};
use weft_core::{m3, NodeId};
use weft_graph::{BackReference, Graph};

pub(crate) struct AssociationHandler;

impl AssociationHandler {
    /// `(class, property)` pairs: each end is readable from the class typed
    /// by the opposite end.
    fn targets(graph: &Graph, association: NodeId) -> Vec<(NodeId, NodeId)> {
        let ends = graph.values(association, m3::prop::PROPERTIES);
        if ends.len() != 2 {
            return Vec::new();
        }
        ends.iter()
            .filter_map(|property| {
                let classifier_type = graph.value(*property, m3::prop::CLASSIFIER_GENERIC_TYPE)?;
                let owner_type = lower_generic_type(graph, classifier_type)?
                    .type_arguments
                    .first()?
                    .nominal_type()?;
                Some((owner_type, *property))
            })
            .collect()
    }
}

impl KindHandler for AssociationHandler {
    fn process(&self, node: NodeId, cx: &mut ProcessContext<'_>) -> CompileResult<()> {
        cx.process_property(node, m3::prop::PROPERTIES)?;
        for (class, property) in Self::targets(cx.graph, node) {
            if cx
                .graph
                .values(class, m3::prop::PROPERTIES_FROM_ASSOCIATIONS)
                .contains(&property)
            {
                continue;
            }
            cx.graph
                .add_value(class, m3::prop::PROPERTIES_FROM_ASSOCIATIONS, property)?;
            cx.graph
                .add_back_reference(class, BackReference::PropertyFromAssociation { property })?;
            tracing::trace!(class = %class, property = %property, "association property added");
        }
        Ok(())
    }

    fn unbind(&self, node: NodeId, cx: &mut UnbindContext<'_>) -> CompileResult<()> {
        for (class, property) in Self::targets(cx.graph, node) {
            cx.unlink(
                class,
                m3::prop::PROPERTIES_FROM_ASSOCIATIONS,
                property,
                &BackReference::PropertyFromAssociation { property },
            )?;
        }
        Ok(())
    }

    fn validate(&self, graph: &Graph, node: NodeId) -> CompileResult<()> {
        let found = graph.values(node, m3::prop::PROPERTIES).len();
        if found != 2 {
            return Err(CompileError::shape(
                format!(
                    "Expected 2 properties for association '{}', found {}",
                    graph.path_of(node),
                    found
                ),
                source_info(graph, node),
            ));
        }
        Ok(())
    }
}
