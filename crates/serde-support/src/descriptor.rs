//! Static field descriptor tables.
//!
//! Each model type publishes one [`TypeDescriptor`]: its name and its fields in
//! canonical order. The codecs walk these tables instead of per-type code.

use std::fmt;

use crate::primitive::PrimitiveKind;

/// Lazily resolved descriptor reference. Lets recursive types (an `Extension`
/// holding `Extension`s) point at each other from `static` tables.
pub type DescriptorFn = fn() -> &'static TypeDescriptor;

pub struct TypeDescriptor {
    pub name: &'static str,
    pub fields: &'static [FieldDescriptor],
}

impl TypeDescriptor {
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Resolves an XML child tag (or a JSON key stripped of its `_`) to the
    /// field it belongs to. Choice fields match `name + variant suffix`.
    pub fn resolve(&self, tag: &str) -> Option<(&'static FieldDescriptor, Option<&'static ChoiceVariant>)> {
        self.fields.iter().find_map(|field| match field.kind {
            FieldKind::Choice(variants) => {
                let suffix = tag.strip_prefix(field.name)?;
                variants
                    .iter()
                    .find(|variant| variant.suffix == suffix)
                    .map(|variant| (field, Some(variant)))
            }
            _ if field.name == tag => Some((field, None)),
            _ => None,
        })
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field(
                "fields",
                &self.fields.iter().map(|field| field.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    pub repeated: bool,
}

#[derive(Clone, Copy)]
pub enum FieldKind {
    /// Plain string with no metadata; an XML attribute.
    Attribute,
    Primitive(PrimitiveKind),
    Composite(DescriptorFn),
    Choice(&'static [ChoiceVariant]),
    /// Polymorphic resource, resolved through the registry by its tag.
    Resource,
}

#[derive(Clone, Copy)]
pub struct ChoiceVariant {
    /// Type suffix appended to the field name, e.g. `DateTime`.
    pub suffix: &'static str,
    pub kind: VariantKind,
}

#[derive(Clone, Copy)]
pub enum VariantKind {
    Primitive(PrimitiveKind),
    Composite(DescriptorFn),
}

impl FieldDescriptor {
    pub const fn attribute(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Attribute,
            repeated: false,
        }
    }

    pub const fn primitive(name: &'static str, kind: PrimitiveKind) -> Self {
        Self {
            name,
            kind: FieldKind::Primitive(kind),
            repeated: false,
        }
    }

    pub const fn primitives(name: &'static str, kind: PrimitiveKind) -> Self {
        Self {
            name,
            kind: FieldKind::Primitive(kind),
            repeated: true,
        }
    }

    pub const fn element(name: &'static str, descriptor: DescriptorFn) -> Self {
        Self {
            name,
            kind: FieldKind::Composite(descriptor),
            repeated: false,
        }
    }

    pub const fn elements(name: &'static str, descriptor: DescriptorFn) -> Self {
        Self {
            name,
            kind: FieldKind::Composite(descriptor),
            repeated: true,
        }
    }

    pub const fn choice(name: &'static str, variants: &'static [ChoiceVariant]) -> Self {
        Self {
            name,
            kind: FieldKind::Choice(variants),
            repeated: false,
        }
    }

    pub const fn resource(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Resource,
            repeated: false,
        }
    }

    pub const fn resources(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Resource,
            repeated: true,
        }
    }

    /// The wire key of one choice variant: `deceased` + `Boolean`.
    pub fn variant_key(&self, variant: &ChoiceVariant) -> String {
        format!("{}{}", self.name, variant.suffix)
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.kind {
            FieldKind::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn composite(&self) -> Option<&'static TypeDescriptor> {
        match self.kind {
            FieldKind::Composite(descriptor) => Some(descriptor()),
            _ => None,
        }
    }

    /// Looks up a variant of a choice field by its suffix.
    pub fn variant(&self, suffix: &str) -> Option<&'static ChoiceVariant> {
        match self.kind {
            FieldKind::Choice(variants) => variants.iter().find(|v| v.suffix == suffix),
            _ => None,
        }
    }
}

impl ChoiceVariant {
    pub const fn primitive(suffix: &'static str, kind: PrimitiveKind) -> Self {
        Self {
            suffix,
            kind: VariantKind::Primitive(kind),
        }
    }

    pub const fn element(suffix: &'static str, descriptor: DescriptorFn) -> Self {
        Self {
            suffix,
            kind: VariantKind::Composite(descriptor),
        }
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.kind {
            VariantKind::Primitive(kind) => Some(kind),
            VariantKind::Composite(_) => None,
        }
    }

    pub fn composite(&self) -> Option<&'static TypeDescriptor> {
        match self.kind {
            VariantKind::Composite(descriptor) => Some(descriptor()),
            VariantKind::Primitive(_) => None,
        }
    }
}
