//! Discriminator → decoder lookup for polymorphic resources.
//!
//! A [`Registry`] is an ordinary value: build it once, then share it (it is
//! immutable and `Sync` when `R` is). Several registries with different
//! subsets of resource types can coexist.
//!
//! Nested resources (`contained`, `Bundle.entry.resource`) are checked against
//! a second table. Every registered root type is allowed there too, and
//! [`RegistryBuilder::allow_nested`] adds types accepted only when nested.

use std::collections::HashMap;
use std::fmt;

use crate::descriptor::TypeDescriptor;
use crate::error::NodeError;
use crate::node::ElementNode;
use crate::traits::{FhirResource, ResourceSet};

type DecodeFn<R> = fn(ElementNode) -> Result<R, NodeError>;

/// Everything needed to decode one resource type.
pub struct ResourceEntry<R> {
    descriptor: &'static TypeDescriptor,
    decode: DecodeFn<R>,
}

impl<R> ResourceEntry<R> {
    pub fn resource_type(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.descriptor
    }

    /// Builds the typed resource from a node decoded with [`Self::descriptor`].
    pub fn decode(&self, node: ElementNode) -> Result<R, NodeError> {
        (self.decode)(node)
    }
}

fn decode_as<T, R>(node: ElementNode) -> Result<R, NodeError>
where
    T: FhirResource,
    R: From<T>,
{
    T::from_node(node).map(R::from)
}

pub struct Registry<R> {
    entries: HashMap<&'static str, ResourceEntry<R>>,
    nested: HashMap<&'static str, &'static TypeDescriptor>,
}

impl<R: ResourceSet> Registry<R> {
    pub fn builder() -> RegistryBuilder<R> {
        RegistryBuilder {
            entries: HashMap::new(),
            nested: HashMap::new(),
        }
    }

    /// Looks up a discriminator tag.
    pub fn get(&self, resource_type: &str) -> Option<&ResourceEntry<R>> {
        let entry = self.entries.get(resource_type);
        tracing::trace!(resource_type, found = entry.is_some(), "registry lookup");
        entry
    }

    /// Looks up the descriptor of a resource nested inside another one.
    pub fn nested(&self, resource_type: &str) -> Option<&'static TypeDescriptor> {
        let descriptor = self.nested.get(resource_type).copied();
        tracing::trace!(
            resource_type,
            found = descriptor.is_some(),
            "nested registry lookup"
        );
        descriptor
    }

    pub fn contains(&self, resource_type: &str) -> bool {
        self.entries.contains_key(resource_type)
    }

    /// Registered resource types, sorted.
    pub fn resource_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R> fmt::Debug for Registry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("resource_types", &names).finish()
    }
}

pub struct RegistryBuilder<R> {
    entries: HashMap<&'static str, ResourceEntry<R>>,
    nested: HashMap<&'static str, &'static TypeDescriptor>,
}

impl<R: ResourceSet> RegistryBuilder<R> {
    /// Registers `T` under its resource type name. Registering the same type
    /// twice keeps a single entry.
    pub fn register<T>(mut self) -> Self
    where
        T: FhirResource,
        R: From<T>,
    {
        self.entries.insert(
            T::RESOURCE_TYPE,
            ResourceEntry {
                descriptor: T::descriptor(),
                decode: decode_as::<T, R>,
            },
        );
        self.nested.insert(T::RESOURCE_TYPE, T::descriptor());
        self
    }

    /// Accepts `T` as a nested resource without making it a valid root.
    pub fn allow_nested<T: FhirResource>(mut self) -> Self {
        self.nested.insert(T::RESOURCE_TYPE, T::descriptor());
        self
    }

    pub fn build(self) -> Registry<R> {
        tracing::debug!(resource_types = self.entries.len(), "resource registry built");
        Registry {
            entries: self.entries,
            nested: self.nested,
        }
    }
}
