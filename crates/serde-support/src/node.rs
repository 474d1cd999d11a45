//! Wire-neutral node tree shared by the JSON and XML codecs.
//!
//! Typed model values convert to and from [`ElementNode`]s; the codecs only ever
//! see nodes plus the static [`TypeDescriptor`](crate::descriptor::TypeDescriptor)
//! tables, so every codec rule is written once.

use crate::descriptor::TypeDescriptor;
use crate::element::Element;
use crate::error::NodeError;
use crate::primitive::{PrimitiveValue, Scalar};
use crate::traits::{FhirChoice, FhirElement, FhirResource, ResourceSet};

/// A primitive cell whose extensions are themselves nodes.
pub type CellNode = Element<Scalar, ElementNode>;

/// The value held by one field of an [`ElementNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Bare string carried as an XML attribute (element `id`, `Extension.url`).
    Attribute(String),
    Primitive(CellNode),
    Primitives(Vec<CellNode>),
    Composite(ElementNode),
    Composites(Vec<ElementNode>),
    Choice(ChoiceNode),
    Resource(ResourceNode),
    Resources(Vec<ResourceNode>),
}

impl FieldValue {
    /// Whether the value has a wire form. Resources always do, through their
    /// type name.
    pub fn has_content(&self) -> bool {
        match self {
            FieldValue::Attribute(_) | FieldValue::Resource(_) => true,
            FieldValue::Resources(resources) => !resources.is_empty(),
            FieldValue::Primitive(cell) => !cell.is_empty(),
            FieldValue::Primitives(cells) => cells.iter().any(|cell| !cell.is_empty()),
            FieldValue::Composite(node) => node.has_content(),
            FieldValue::Composites(nodes) => nodes.iter().any(ElementNode::has_content),
            FieldValue::Choice(choice) => match &choice.value {
                VariantValue::Primitive(cell) => !cell.is_empty(),
                VariantValue::Composite(node) => node.has_content(),
            },
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            FieldValue::Attribute(_) => "an attribute",
            FieldValue::Primitive(_) => "a primitive",
            FieldValue::Primitives(_) => "a primitive list",
            FieldValue::Composite(_) => "an element",
            FieldValue::Composites(_) => "an element list",
            FieldValue::Choice(_) => "a choice",
            FieldValue::Resource(_) => "a resource",
            FieldValue::Resources(_) => "a resource list",
        }
    }
}

/// The active variant of a choice field, identified by its type suffix
/// (`Boolean`, `DateTime`, `Quantity`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceNode {
    pub variant: &'static str,
    pub value: VariantValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VariantValue {
    Primitive(CellNode),
    Composite(ElementNode),
}

impl ChoiceNode {
    pub fn primitive<V: PrimitiveValue, E: FhirElement>(
        variant: &'static str,
        cell: &Element<V, E>,
    ) -> Self {
        Self {
            variant,
            value: VariantValue::Primitive(cell.to_cell()),
        }
    }

    pub fn element<T: FhirElement>(variant: &'static str, value: &T) -> Self {
        Self {
            variant,
            value: VariantValue::Composite(value.to_node()),
        }
    }

    pub fn into_primitive<V: PrimitiveValue, E: FhirElement>(
        self,
    ) -> Result<Element<V, E>, NodeError> {
        match self.value {
            VariantValue::Primitive(cell) => Element::from_cell(cell),
            VariantValue::Composite(_) => Err(NodeError::ShapeMismatch {
                field: self.variant.to_string(),
                expected: "a primitive",
                found: "an element",
            }),
        }
    }

    pub fn into_element<T: FhirElement>(self) -> Result<T, NodeError> {
        match self.value {
            VariantValue::Composite(node) => T::from_node(node),
            VariantValue::Primitive(_) => Err(NodeError::ShapeMismatch {
                field: self.variant.to_string(),
                expected: "an element",
                found: "a primitive",
            }),
        }
    }
}

/// A resource body together with the descriptor of its concrete type.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceNode {
    pub descriptor: &'static TypeDescriptor,
    pub node: ElementNode,
}

impl ResourceNode {
    pub fn new(descriptor: &'static TypeDescriptor, node: ElementNode) -> Self {
        Self { descriptor, node }
    }

    pub fn from_resource<T: FhirResource>(resource: &T) -> Self {
        Self::new(T::descriptor(), resource.to_node())
    }

    /// The discriminator tag, i.e. the resource type name.
    pub fn resource_type(&self) -> &'static str {
        self.descriptor.name
    }

    /// Converts into `T`, failing if the tag names another type.
    pub fn into_resource<T: FhirResource>(self) -> Result<T, NodeError> {
        if self.descriptor.name != T::RESOURCE_TYPE {
            return Err(NodeError::UnknownResourceType(
                self.descriptor.name.to_string(),
            ));
        }
        T::from_node(self.node)
    }
}

/// Fields of one element or resource, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementNode {
    fields: Vec<(&'static str, FieldValue)>,
}

impl ElementNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether encoding this element writes anything. Composites that hold
    /// only empty cells or empty composites have no wire form.
    pub fn has_content(&self) -> bool {
        self.fields.iter().any(|(_, value)| value.has_content())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields
            .iter_mut()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(key, value)| (*key, value))
    }

    /// Sets a field, replacing any previous value under the same name.
    pub fn insert(&mut self, name: &'static str, value: FieldValue) {
        match self.get_mut(name) {
            Some(slot) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let index = self.fields.iter().position(|(key, _)| *key == name)?;
        Some(self.fields.remove(index).1)
    }

    // --- typed -> node -------------------------------------------------------

    pub fn push_attribute(&mut self, name: &'static str, value: &Option<String>) {
        if let Some(value) = value {
            self.insert(name, FieldValue::Attribute(value.clone()));
        }
    }

    pub fn push_primitive<V: PrimitiveValue, E: FhirElement>(
        &mut self,
        name: &'static str,
        cell: &Option<Element<V, E>>,
    ) {
        if let Some(cell) = cell {
            if !cell.is_empty() {
                self.insert(name, FieldValue::Primitive(cell.to_cell()));
            }
        }
    }

    pub fn push_primitives<V: PrimitiveValue, E: FhirElement>(
        &mut self,
        name: &'static str,
        cells: &[Element<V, E>],
    ) {
        if !cells.is_empty() {
            let cells = cells.iter().map(Element::to_cell).collect();
            self.insert(name, FieldValue::Primitives(cells));
        }
    }

    pub fn push_element<T: FhirElement>(&mut self, name: &'static str, value: &Option<T>) {
        if let Some(value) = value {
            self.insert(name, FieldValue::Composite(value.to_node()));
        }
    }

    pub fn push_elements<T: FhirElement>(&mut self, name: &'static str, values: &[T]) {
        if !values.is_empty() {
            let nodes = values.iter().map(FhirElement::to_node).collect();
            self.insert(name, FieldValue::Composites(nodes));
        }
    }

    pub fn push_choice<C: FhirChoice>(&mut self, name: &'static str, value: &Option<C>) {
        if let Some(value) = value {
            self.insert(name, FieldValue::Choice(value.to_choice()));
        }
    }

    pub fn push_resource<R: ResourceSet>(&mut self, name: &'static str, value: &Option<R>) {
        if let Some(value) = value {
            self.insert(name, FieldValue::Resource(value.to_resource_node()));
        }
    }

    pub fn push_resources<R: ResourceSet>(&mut self, name: &'static str, values: &[R]) {
        if !values.is_empty() {
            let nodes = values.iter().map(ResourceSet::to_resource_node).collect();
            self.insert(name, FieldValue::Resources(nodes));
        }
    }

    // --- node -> typed -------------------------------------------------------

    pub fn take_attribute(&mut self, name: &'static str) -> Result<Option<String>, NodeError> {
        match self.remove(name) {
            None => Ok(None),
            Some(FieldValue::Attribute(value)) => Ok(Some(value)),
            Some(other) => Err(shape(name, "an attribute", &other)),
        }
    }

    pub fn take_primitive<V: PrimitiveValue, E: FhirElement>(
        &mut self,
        name: &'static str,
    ) -> Result<Option<Element<V, E>>, NodeError> {
        match self.remove(name) {
            None => Ok(None),
            Some(FieldValue::Primitive(cell)) => Element::from_cell(cell).map(Some),
            Some(other) => Err(shape(name, "a primitive", &other)),
        }
    }

    pub fn take_primitives<V: PrimitiveValue, E: FhirElement>(
        &mut self,
        name: &'static str,
    ) -> Result<Vec<Element<V, E>>, NodeError> {
        match self.remove(name) {
            None => Ok(Vec::new()),
            Some(FieldValue::Primitives(cells)) => {
                cells.into_iter().map(Element::from_cell).collect()
            }
            Some(other) => Err(shape(name, "a primitive list", &other)),
        }
    }

    pub fn take_element<T: FhirElement>(
        &mut self,
        name: &'static str,
    ) -> Result<Option<T>, NodeError> {
        match self.remove(name) {
            None => Ok(None),
            Some(FieldValue::Composite(node)) => T::from_node(node).map(Some),
            Some(other) => Err(shape(name, "an element", &other)),
        }
    }

    pub fn take_elements<T: FhirElement>(&mut self, name: &'static str) -> Result<Vec<T>, NodeError> {
        match self.remove(name) {
            None => Ok(Vec::new()),
            Some(FieldValue::Composites(nodes)) => nodes.into_iter().map(T::from_node).collect(),
            Some(other) => Err(shape(name, "an element list", &other)),
        }
    }

    pub fn take_choice<C: FhirChoice>(&mut self, name: &'static str) -> Result<Option<C>, NodeError> {
        match self.remove(name) {
            None => Ok(None),
            Some(FieldValue::Choice(choice)) => C::from_choice(choice).map(Some),
            Some(other) => Err(shape(name, "a choice", &other)),
        }
    }

    pub fn take_resource<R: ResourceSet>(
        &mut self,
        name: &'static str,
    ) -> Result<Option<R>, NodeError> {
        match self.remove(name) {
            None => Ok(None),
            Some(FieldValue::Resource(node)) => R::from_resource_node(node).map(Some),
            Some(other) => Err(shape(name, "a resource", &other)),
        }
    }

    pub fn take_resources<R: ResourceSet>(&mut self, name: &'static str) -> Result<Vec<R>, NodeError> {
        match self.remove(name) {
            None => Ok(Vec::new()),
            Some(FieldValue::Resources(nodes)) => {
                nodes.into_iter().map(R::from_resource_node).collect()
            }
            Some(other) => Err(shape(name, "a resource list", &other)),
        }
    }
}

fn shape(field: &str, expected: &'static str, found: &FieldValue) -> NodeError {
    NodeError::ShapeMismatch {
        field: field.to_string(),
        expected,
        found: found.describe(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut node = ElementNode::new();
        node.insert("a", FieldValue::Attribute("1".to_string()));
        node.insert("b", FieldValue::Attribute("2".to_string()));
        node.insert("a", FieldValue::Attribute("3".to_string()));

        let names: Vec<_> = node.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(
            node.get("a"),
            Some(&FieldValue::Attribute("3".to_string()))
        );
    }

    #[test]
    fn test_take_attribute_shape_mismatch() {
        let mut node = ElementNode::new();
        node.insert("url", FieldValue::Composites(Vec::new()));
        let err = node.take_attribute("url").unwrap_err();
        assert_eq!(
            err,
            NodeError::ShapeMismatch {
                field: "url".to_string(),
                expected: "an attribute",
                found: "an element list",
            }
        );
    }

    #[test]
    fn test_has_content_looks_through_empty_composites() {
        let mut inner = ElementNode::new();
        inner.insert("text", FieldValue::Primitive(CellNode::default()));
        let mut outer = ElementNode::new();
        outer.insert("type", FieldValue::Composite(inner.clone()));
        outer.insert("given", FieldValue::Primitives(vec![CellNode::default()]));
        assert!(!outer.has_content());

        inner.insert("id", FieldValue::Attribute("t1".to_string()));
        outer.insert("type", FieldValue::Composite(inner));
        assert!(outer.has_content());
    }

    #[test]
    fn test_take_removes_field() {
        let mut node = ElementNode::new();
        node.push_attribute("id", &Some("x".to_string()));
        assert_eq!(node.take_attribute("id").unwrap(), Some("x".to_string()));
        assert!(node.is_empty());
        assert_eq!(node.take_attribute("id").unwrap(), None);
    }
}
