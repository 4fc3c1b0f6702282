//! The built-in `Pure` grammar: classes, associations, enumerations,
//! functions and the expressions in their bodies.

mod association;
mod builder;
mod class;
mod enumeration;
mod expression;
mod function;
mod reference;

use crate::build::BuildContext;
use crate::extension::Extension;
use crate::handler::{register_kind, KindHandler};
use crate::{CompileError, CompileResult};
use std::sync::Arc;
use weft_core::{m3, NodeId};
use weft_parser::{parse_section_at, Section, DEFAULT_SECTION};
use weft_registry::{MatcherBuilder, RegistryResult};

pub use builder::signature_id;

/// The core grammar extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoreExtension;

impl CoreExtension {
    pub fn new() -> Self {
        Self
    }
}

impl Extension for CoreExtension {
    fn name(&self) -> &str {
        DEFAULT_SECTION
    }

    fn register(&self, builder: &mut MatcherBuilder<dyn KindHandler>) -> RegistryResult<()> {
        let kinds: [(&str, Arc<dyn KindHandler>); 14] = [
            (m3::CLASS, Arc::new(class::ClassHandler)),
            (m3::PROPERTY, Arc::new(class::PropertyHandler)),
            (m3::QUALIFIED_PROPERTY, Arc::new(class::QualifiedPropertyHandler)),
            (m3::ASSOCIATION, Arc::new(association::AssociationHandler)),
            (m3::ENUMERATION, Arc::new(enumeration::EnumerationHandler)),
            (m3::FUNCTION, Arc::new(function::FunctionHandler)),
            (m3::FUNCTION_EXPRESSION, Arc::new(expression::FunctionExpressionHandler)),
            (m3::PROPERTY_ACCESS, Arc::new(expression::PropertyAccessHandler)),
            (m3::VARIABLE_EXPRESSION, Arc::new(expression::VariableHandler)),
            (m3::INSTANCE_VALUE, Arc::new(expression::InstanceValueHandler)),
            (m3::IMPORT_STUB, Arc::new(reference::ImportStubHandler)),
            (m3::GENERIC_TYPE, Arc::new(reference::GenericTypeHandler)),
            (m3::GENERALIZATION, Arc::new(reference::GeneralizationHandler)),
            (m3::MULTIPLICITY, Arc::new(reference::MultiplicityHandler)),
        ];
        for (path, handler) in kinds {
            register_kind(builder, path, handler)?;
        }
        Ok(())
    }

    fn parse(&self, section: &Section<'_>, cx: &mut BuildContext<'_>) -> CompileResult<Vec<NodeId>> {
        let ast = parse_section_at(section).map_err(|e| CompileError::parse(cx.source_id(), e))?;
        builder::build_section(&ast, cx)
    }
}
