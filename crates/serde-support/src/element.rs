//! The primitive cell: a scalar bundled with an optional element id and extensions.

use crate::error::NodeError;
use crate::node::{CellNode, ElementNode};
use crate::primitive::PrimitiveValue;
use crate::traits::FhirElement;

/// A FHIR primitive element.
///
/// `value` may be absent while `extension` is non-empty; that records why the
/// value is missing and is a legal state in both wire formats.
///
/// # Type Parameters
/// - `V`: the Rust value type (`bool`, `i32`, `Decimal`, `String`, ...)
/// - `E`: the extension type of the model catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Element<V, E> {
    pub id: Option<String>,
    pub extension: Vec<E>,
    pub value: Option<V>,
}

impl<V, E> Default for Element<V, E> {
    fn default() -> Self {
        Self {
            id: None,
            extension: Vec::new(),
            value: None,
        }
    }
}

impl<V, E> From<V> for Element<V, E> {
    fn from(value: V) -> Self {
        Self::new(value)
    }
}

impl<V, E> Element<V, E> {
    pub fn new(value: V) -> Self {
        Self {
            id: None,
            extension: Vec::new(),
            value: Some(value),
        }
    }

    /// A cell with extensions but no value.
    pub fn absent(extension: Vec<E>) -> Self {
        Self {
            id: None,
            extension,
            value: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_extension(mut self, extension: E) -> Self {
        self.extension.push(extension);
        self
    }

    /// True when the cell carries an id or at least one extension.
    pub fn has_metadata(&self) -> bool {
        self.id.is_some() || !self.extension.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && !self.has_metadata()
    }
}

impl<V: PrimitiveValue, E: FhirElement> Element<V, E> {
    pub fn to_cell(&self) -> CellNode {
        Element {
            id: self.id.clone(),
            extension: self.extension.iter().map(FhirElement::to_node).collect(),
            value: self.value.as_ref().map(PrimitiveValue::to_scalar),
        }
    }

    pub fn from_cell(cell: CellNode) -> Result<Self, NodeError> {
        let value = cell.value.map(V::from_scalar).transpose()?;
        let extension = cell
            .extension
            .into_iter()
            .map(E::from_node)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: cell.id,
            extension,
            value,
        })
    }
}

impl CellNode {
    pub fn metadata(id: Option<String>, extension: Vec<ElementNode>) -> Self {
        Element {
            id,
            extension,
            value: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_flags() {
        let plain: Element<bool, ElementNode> = true.into();
        assert!(!plain.has_metadata());
        assert!(!plain.is_empty());

        let absent: Element<bool, ElementNode> = Element::absent(vec![ElementNode::new()]);
        assert!(absent.has_metadata());
        assert!(!absent.is_empty());
        assert!(absent.value.is_none());

        let empty: Element<bool, ElementNode> = Element::default();
        assert!(empty.is_empty());

        let with_id: Element<String, ElementNode> = Element::new("x".to_string()).with_id("a1");
        assert!(with_id.has_metadata());
    }
}
