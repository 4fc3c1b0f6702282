//! Metamodel bootstrap.
//!
//! Creates the metaclasses the core kinds are classified by, the top and
//! bottom types and the primitive types, all with `Bootstrap` origin so that
//! unload never touches them.

use tracing::debug;
use weft_core::{m3, GraphResult, NodeId};
use weft_graph::{Graph, Origin};

/// Metaclasses with their direct supertype.
const METACLASSES: &[(&str, Option<&str>)] = &[
    (m3::ELEMENT, None),
    (m3::PACKAGE, Some(m3::ELEMENT)),
    (m3::TYPE, Some(m3::ELEMENT)),
    (m3::CLASS, Some(m3::TYPE)),
    (m3::PRIMITIVE_TYPE, Some(m3::TYPE)),
    (m3::ENUMERATION, Some(m3::TYPE)),
    (m3::ENUM, None),
    (m3::FUNCTION_TYPE, Some(m3::TYPE)),
    (m3::RELATION_TYPE, Some(m3::TYPE)),
    (m3::COLUMN, None),
    (m3::GENERIC_TYPE, None),
    (m3::TYPE_PARAMETER, None),
    (m3::MULTIPLICITY, None),
    (m3::ASSOCIATION, Some(m3::ELEMENT)),
    (m3::GENERALIZATION, None),
    (m3::FUNCTION, Some(m3::ELEMENT)),
    (m3::CONCRETE_FUNCTION, Some(m3::FUNCTION)),
    (m3::NATIVE_FUNCTION, Some(m3::FUNCTION)),
    (m3::PROPERTY, None),
    (m3::QUALIFIED_PROPERTY, None),
    (m3::VALUE_SPECIFICATION, None),
    (m3::FUNCTION_EXPRESSION, Some(m3::VALUE_SPECIFICATION)),
    (m3::PROPERTY_ACCESS, Some(m3::VALUE_SPECIFICATION)),
    (m3::VARIABLE_EXPRESSION, Some(m3::VALUE_SPECIFICATION)),
    (m3::INSTANCE_VALUE, Some(m3::VALUE_SPECIFICATION)),
    (m3::IMPORT_STUB, None),
];

/// Bootstrap the core metamodel into an empty graph.
pub fn bootstrap_metamodel(graph: &mut Graph) -> GraphResult<()> {
    let class = graph.get_or_create_top_level(m3::CLASS)?;
    graph.create_top_level(m3::CLASS, class, Origin::Bootstrap, None)?;
    graph.get_or_create_package(m3::ROOT)?;

    // Bind every path before interning names so literals find `String`.
    let primitive_type = define(graph, m3::PRIMITIVE_TYPE, class)?;
    for (path, _) in METACLASSES {
        if graph.top_level(path).is_none() {
            define(graph, path, class)?;
        }
    }
    define(graph, m3::ANY, class)?;
    define(graph, m3::NIL, class)?;
    for (path, _) in m3::PRIMITIVES {
        define(graph, path, primitive_type)?;
    }

    for (path, parent) in METACLASSES {
        finish(graph, path, *parent)?;
    }
    finish(graph, m3::ANY, None)?;
    finish(graph, m3::NIL, None)?;
    for (path, parent) in m3::PRIMITIVES {
        finish(graph, path, Some(parent.unwrap_or(m3::ANY)))?;
    }

    debug!(nodes = graph.node_count(), "bootstrapped metamodel");
    Ok(())
}

fn define(graph: &mut Graph, path: &str, classifier: NodeId) -> GraphResult<NodeId> {
    graph.create_top_level(path, classifier, Origin::Bootstrap, None)
}

/// Name, package and generalization of a bootstrapped element.
fn finish(graph: &mut Graph, path: &str, parent: Option<&str>) -> GraphResult<()> {
    let element = graph.get_or_create_top_level(path)?;
    let (package, name) = m3::split_path(path);
    graph.set_literal(element, m3::prop::NAME, name)?;
    let package = graph.get_or_create_package(package.unwrap_or(m3::ROOT))?;
    graph.add_to_package(element, package)?;
    if let Some(parent) = parent {
        let general = graph.get_or_create_top_level(parent)?;
        add_generalization(graph, element, general)?;
    }
    Ok(())
}

/// `specific extends general` with a direct raw-type pointer.
pub fn add_generalization(graph: &mut Graph, specific: NodeId, general: NodeId) -> GraphResult<NodeId> {
    let generalization_class = graph.get_or_create_top_level(m3::GENERALIZATION)?;
    let generic_type_class = graph.get_or_create_top_level(m3::GENERIC_TYPE)?;
    let generalization = graph.create_anonymous(generalization_class, Origin::Bootstrap, None);
    let generic_type = graph.create_anonymous(generic_type_class, Origin::Bootstrap, None);
    graph.add_value(generic_type, m3::prop::RAW_TYPE, general)?;
    graph.set_child(generalization, m3::prop::GENERAL, generic_type)?;
    graph.set_value(generalization, m3::prop::SPECIFIC, specific)?;
    graph.add_child(specific, m3::prop::GENERALIZATIONS, generalization)?;
    graph.add_value(general, m3::prop::SPECIALIZATIONS, generalization)?;
    Ok(generalization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_graph::hierarchy;

    #[test]
    fn test_bootstrap_builds_kind_hierarchy() {
        // GIVEN
        let mut graph = Graph::new();

        // WHEN
        bootstrap_metamodel(&mut graph).unwrap();

        // THEN
        let class = graph.top_level(m3::CLASS).unwrap();
        assert_eq!(graph.classifier_of(class), Some(class));
        let native = graph.top_level(m3::NATIVE_FUNCTION).unwrap();
        let function = graph.top_level(m3::FUNCTION).unwrap();
        assert!(hierarchy::is_subtype(&graph, native, function));
    }

    #[test]
    fn test_primitives_extend_number_or_any() {
        let mut graph = Graph::new();
        bootstrap_metamodel(&mut graph).unwrap();

        let integer = graph.top_level(m3::INTEGER).unwrap();
        let number = graph.top_level(m3::NUMBER).unwrap();
        let any = graph.top_level(m3::ANY).unwrap();
        assert_eq!(hierarchy::generalization_order(&graph, integer), vec![integer, number, any]);
        assert_eq!(graph.string_value(integer, m3::prop::NAME), Some("Integer"));
        assert!(graph.is_instance_of(integer, m3::PRIMITIVE_TYPE));
    }

    #[test]
    fn test_bootstrap_elements_live_in_packages() {
        let mut graph = Graph::new();
        bootstrap_metamodel(&mut graph).unwrap();

        let string = graph.top_level(m3::STRING).unwrap();
        let root = graph.top_level(m3::ROOT).unwrap();
        assert_eq!(graph.value(string, m3::prop::PACKAGE), Some(root));
        let any = graph.top_level(m3::ANY).unwrap();
        let package = graph.value(any, m3::prop::PACKAGE).unwrap();
        assert_eq!(graph.path_of(package), "meta::pure::metamodel::type");
    }
}
