//! FHIR JSON codec.
//!
//! Decoding walks the keys of each object against the element's
//! [`TypeDescriptor`], merging every primitive `field` with its `_field`
//! shadow object. Encoding walks the descriptor fields in order and splits
//! each cell again, so output key order is canonical and `resourceType`
//! always comes first.
//!
//! The free functions use [`CodecOptions::default()`]; use
//! [`FhirCodec`](crate::FhirCodec) for strict decoding or pretty output.
use fhirwire_support::primitive::parse_decimal;
use fhirwire_support::shadow::SHADOW_KEYS;
use fhirwire_support::{
    CellNode, ChoiceNode, ChoiceVariant, ElementNode, FhirElement, FieldDescriptor, FieldKind,
    FieldValue, IdAndExtensionHelper, IdAndExtensionOwned, JsonShape, PrimitiveKind, Registry,
    ResourceEntry, ResourceNode, ResourceSet, Scalar, TypeDescriptor, VariantValue,
};
use serde_json::{Map, Number, Value};

use crate::error::{Result, SerdeError};
use crate::fields::{self, ChoiceTracker};
use crate::options::CodecOptions;

const RESOURCE_TYPE: &str = "resourceType";

/// Deserialize a FHIR resource from a JSON string.
///
/// # Examples
///
/// ```
/// use fhirwire_models::Resource;
/// use fhirwire_serde::json::from_json_str;
/// use fhirwire_support::ResourceSet;
///
/// let registry = Resource::registry();
/// let json = r#"{"resourceType": "Patient", "id": "example"}"#;
/// let resource = from_json_str(&registry, json)?;
/// assert_eq!(resource.resource_id(), Some("example"));
/// # Ok::<(), fhirwire_serde::SerdeError>(())
/// ```
pub fn from_json_str<R: ResourceSet>(registry: &Registry<R>, s: &str) -> Result<R> {
    from_json_value(registry, serde_json::from_str(s)?)
}

/// Deserialize a FHIR resource from a JSON byte slice.
pub fn from_json_slice<R: ResourceSet>(registry: &Registry<R>, v: &[u8]) -> Result<R> {
    from_json_value(registry, serde_json::from_slice(v)?)
}

/// Deserialize a FHIR resource from a `serde_json::Value`.
pub fn from_json_value<R: ResourceSet>(registry: &Registry<R>, value: Value) -> Result<R> {
    JsonDecoder::new(registry, &CodecOptions::default()).resource(value)
}

/// Serialize a FHIR resource to a `serde_json::Value`.
pub fn to_json_value<R: ResourceSet>(resource: &R) -> Result<Value> {
    JsonEncoder::for_set::<R>().resource(&resource.to_resource_node())
}

/// Serialize a FHIR resource to a JSON string.
///
/// # Examples
///
/// ```
/// use fhirwire_models::{Patient, PatientDeceased};
/// use fhirwire_serde::json::to_json_string;
///
/// let patient = Patient {
///     deceased: Some(PatientDeceased::Boolean(true.into())),
///     ..Default::default()
/// };
/// let json = to_json_string(&patient)?;
/// assert_eq!(json, r#"{"resourceType":"Patient","deceasedBoolean":true}"#);
/// # Ok::<(), fhirwire_serde::SerdeError>(())
/// ```
pub fn to_json_string<R: ResourceSet>(resource: &R) -> Result<String> {
    Ok(serde_json::to_string(&to_json_value(resource)?)?)
}

/// Serialize a FHIR resource to a pretty-printed JSON string.
pub fn to_json_string_pretty<R: ResourceSet>(resource: &R) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_json_value(resource)?)?)
}

/// Serialize a FHIR resource to a JSON byte vector.
pub fn to_json_vec<R: ResourceSet>(resource: &R) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&to_json_value(resource)?)?)
}

/// Deserialize a JSON array of resources. Each element is resolved through
/// the registry on its own.
pub fn resource_list_from_json_str<R: ResourceSet>(
    registry: &Registry<R>,
    s: &str,
) -> Result<Vec<R>> {
    decode_list(registry, &CodecOptions::default(), serde_json::from_str(s)?)
}

/// Deserialize a JSON array of resources from a byte slice.
pub fn resource_list_from_json_slice<R: ResourceSet>(
    registry: &Registry<R>,
    v: &[u8],
) -> Result<Vec<R>> {
    decode_list(registry, &CodecOptions::default(), serde_json::from_slice(v)?)
}

/// Deserialize newline-delimited JSON, one resource per non-blank line.
pub fn resource_list_from_ndjson_str<R: ResourceSet>(
    registry: &Registry<R>,
    s: &str,
) -> Result<Vec<R>> {
    decode_ndjson(registry, &CodecOptions::default(), s)
}

/// Serialize resources as newline-delimited JSON.
pub fn to_ndjson_string<R: ResourceSet>(resources: &[R]) -> Result<String> {
    let mut out = String::new();
    for resource in resources {
        out.push_str(&to_json_string(resource)?);
        out.push('\n');
    }
    Ok(out)
}

pub(crate) fn decode_list<R: ResourceSet>(
    registry: &Registry<R>,
    options: &CodecOptions,
    value: Value,
) -> Result<Vec<R>> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(SerdeError::invalid(
                "$",
                format!("expected an array of resources, found {}", describe(&other)),
            ));
        }
    };
    let decoder = JsonDecoder::new(registry, options);
    items.into_iter().map(|item| decoder.resource(item)).collect()
}

pub(crate) fn decode_ndjson<R: ResourceSet>(
    registry: &Registry<R>,
    options: &CodecOptions,
    s: &str,
) -> Result<Vec<R>> {
    let decoder = JsonDecoder::new(registry, options);
    s.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| -> Result<R> {
            let value = serde_json::from_str(line)?;
            decoder.resource(value)
        })
        .collect()
}

/// A primitive (or primitive choice variant) whose value and shadow are
/// gathered from two keys before the cell is built.
struct PendingCell {
    field: &'static FieldDescriptor,
    variant: Option<&'static ChoiceVariant>,
    kind: PrimitiveKind,
    key: String,
    value: Option<Value>,
    shadow: Option<Value>,
}

pub(crate) struct JsonDecoder<'a, R> {
    registry: &'a Registry<R>,
    options: &'a CodecOptions,
    extension: &'static TypeDescriptor,
}

impl<'a, R: ResourceSet> JsonDecoder<'a, R> {
    pub(crate) fn new(registry: &'a Registry<R>, options: &'a CodecOptions) -> Self {
        Self {
            registry,
            options,
            extension: <R::Extension as FhirElement>::descriptor(),
        }
    }

    /// Decodes a resource object into the typed resource set.
    pub(crate) fn resource(&self, value: Value) -> Result<R> {
        let (entry, object) = self.lookup(value)?;
        let node = self.element(entry.descriptor(), object)?;
        Ok(entry.decode(node)?)
    }

    /// Decodes a resource object without leaving the node tree.
    pub(crate) fn resource_node(&self, value: Value) -> Result<ResourceNode> {
        let (entry, object) = self.lookup(value)?;
        let descriptor = entry.descriptor();
        Ok(ResourceNode::new(descriptor, self.element(descriptor, object)?))
    }

    /// A resource inside `contained` or `Bundle.entry`, checked against the
    /// registry's nested table.
    fn nested_resource(&self, value: Value) -> Result<ResourceNode> {
        let (tag, object) = take_resource_type(value)?;
        let Some(descriptor) = self.registry.nested(&tag) else {
            return Err(SerdeError::UnknownResourceType(tag));
        };
        Ok(ResourceNode::new(descriptor, self.element(descriptor, object)?))
    }

    fn lookup(&self, value: Value) -> Result<(&'a ResourceEntry<R>, Map<String, Value>)> {
        let (tag, object) = take_resource_type(value)?;
        let registry = self.registry;
        match registry.get(&tag) {
            Some(entry) => Ok((entry, object)),
            None => Err(SerdeError::UnknownResourceType(tag)),
        }
    }

    fn element(
        &self,
        descriptor: &'static TypeDescriptor,
        object: Map<String, Value>,
    ) -> Result<ElementNode> {
        let mut node = ElementNode::new();
        let mut cells: Vec<PendingCell> = Vec::new();
        let mut choices = ChoiceTracker::default();

        for (key, value) in object {
            let (name, is_shadow) = match key.strip_prefix('_') {
                Some(name) => (name, true),
                None => (key.as_str(), false),
            };
            let Some((field, variant)) = descriptor.resolve(name) else {
                self.options.unknown_field(descriptor.name, &key)?;
                continue;
            };
            if let Some(variant) = variant {
                choices.record(field, variant)?;
            }
            let kind = match variant {
                Some(variant) => variant.primitive_kind(),
                None => field.primitive_kind(),
            };
            match kind {
                Some(kind) => {
                    let index = match cells.iter().position(|cell| cell.field.name == field.name) {
                        Some(index) => index,
                        None => {
                            cells.push(PendingCell {
                                field,
                                variant,
                                kind,
                                key: name.to_string(),
                                value: None,
                                shadow: None,
                            });
                            cells.len() - 1
                        }
                    };
                    if is_shadow {
                        cells[index].shadow = Some(value);
                    } else {
                        cells[index].value = Some(value);
                    }
                }
                // only primitives have a `_field` shadow
                None if is_shadow => self.options.unknown_field(descriptor.name, &key)?,
                None => self.field(field, variant, &key, value, &mut node)?,
            }
        }

        for cell in cells {
            self.finish_cell(cell, &mut node)?;
        }
        Ok(node)
    }

    fn field(
        &self,
        field: &'static FieldDescriptor,
        variant: Option<&'static ChoiceVariant>,
        key: &str,
        value: Value,
        node: &mut ElementNode,
    ) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        let decoded = if let Some(variant) = variant {
            let descriptor = variant
                .composite()
                .ok_or_else(|| fields::not_described(key, "an element"))?;
            FieldValue::Choice(ChoiceNode {
                variant: variant.suffix,
                value: VariantValue::Composite(self.composite(descriptor, key, value)?),
            })
        } else {
            match field.kind {
                FieldKind::Attribute => match value {
                    Value::String(text) => FieldValue::Attribute(text),
                    other => {
                        return Err(SerdeError::invalid(
                            key,
                            format!("expected a string, found {}", describe(&other)),
                        ));
                    }
                },
                FieldKind::Composite(descriptor) if field.repeated => {
                    let children = array(key, Some(value))?
                        .into_iter()
                        .map(|item| self.composite(descriptor(), key, item))
                        .collect::<Result<Vec<_>>>()?;
                    if children.is_empty() {
                        return Ok(());
                    }
                    FieldValue::Composites(children)
                }
                FieldKind::Composite(descriptor) => {
                    FieldValue::Composite(self.composite(descriptor(), key, value)?)
                }
                FieldKind::Resource if field.repeated => {
                    let resources = array(key, Some(value))?
                        .into_iter()
                        .map(|item| self.nested_resource(item))
                        .collect::<Result<Vec<_>>>()?;
                    if resources.is_empty() {
                        return Ok(());
                    }
                    FieldValue::Resources(resources)
                }
                FieldKind::Resource => FieldValue::Resource(self.nested_resource(value)?),
                FieldKind::Primitive(_) | FieldKind::Choice(_) => {
                    return Err(fields::not_described(key, "an element"));
                }
            }
        };
        node.insert(field.name, decoded);
        Ok(())
    }

    fn composite(
        &self,
        descriptor: &'static TypeDescriptor,
        key: &str,
        value: Value,
    ) -> Result<ElementNode> {
        match value {
            Value::Object(object) => self.element(descriptor, object),
            other => Err(SerdeError::invalid(
                key,
                format!("expected an object, found {}", describe(&other)),
            )),
        }
    }

    fn finish_cell(&self, pending: PendingCell, node: &mut ElementNode) -> Result<()> {
        let PendingCell {
            field,
            variant,
            kind,
            key,
            value,
            shadow,
        } = pending;

        if field.repeated {
            let cells = self.cell_list(&key, kind, value, shadow)?;
            if !cells.is_empty() {
                node.insert(field.name, FieldValue::Primitives(cells));
            }
            return Ok(());
        }

        let cell = self.cell(&key, kind, value, shadow)?;
        if cell.is_empty() {
            return Ok(());
        }
        let decoded = match variant {
            Some(variant) => FieldValue::Choice(ChoiceNode {
                variant: variant.suffix,
                value: VariantValue::Primitive(cell),
            }),
            None => FieldValue::Primitive(cell),
        };
        node.insert(field.name, decoded);
        Ok(())
    }

    /// Builds one cell: metadata from the shadow, then the value on top.
    fn cell(
        &self,
        key: &str,
        kind: PrimitiveKind,
        value: Option<Value>,
        shadow: Option<Value>,
    ) -> Result<CellNode> {
        let mut cell = match shadow {
            Some(shadow) if !shadow.is_null() => self.shadow(key, shadow)?,
            _ => CellNode::default(),
        };
        cell.value = match value {
            Some(value) if !value.is_null() => Some(scalar(key, kind, value)?),
            _ => None,
        };
        Ok(cell)
    }

    /// Index-aligned merge of `field` and `_field` arrays. The longer of the
    /// two decides the length; `null` entries leave that half of a cell empty.
    fn cell_list(
        &self,
        key: &str,
        kind: PrimitiveKind,
        value: Option<Value>,
        shadow: Option<Value>,
    ) -> Result<Vec<CellNode>> {
        let values = array(key, value)?;
        let shadows = array(&format!("_{}", key), shadow)?;
        let len = values.len().max(shadows.len());
        let mut values = values.into_iter();
        let mut shadows = shadows.into_iter();
        (0..len)
            .map(|_| self.cell(key, kind, values.next(), shadows.next()))
            .collect()
    }

    fn shadow(&self, key: &str, value: Value) -> Result<CellNode> {
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(SerdeError::invalid(
                    format!("_{}", key),
                    format!("expected an object, found {}", describe(&other)),
                ));
            }
        };
        for name in object.keys() {
            if !SHADOW_KEYS.contains(&name.as_str()) {
                self.options.unknown_field("Element", name)?;
            }
        }
        let owned: IdAndExtensionOwned<Value> = serde_json::from_value(Value::Object(object))?;
        let extension = owned
            .extension
            .into_iter()
            .map(|item| self.composite(self.extension, "extension", item))
            .collect::<Result<Vec<_>>>()?;
        Ok(CellNode::metadata(owned.id, extension))
    }
}

/// Reads and removes the discriminator before any other key is looked at.
/// The remaining keys keep their document order.
fn take_resource_type(value: Value) -> Result<(String, Map<String, Value>)> {
    let mut object = match value {
        Value::Object(object) => object,
        other => {
            return Err(SerdeError::invalid(
                RESOURCE_TYPE,
                format!("expected a resource object, found {}", describe(&other)),
            ));
        }
    };
    match object.shift_remove(RESOURCE_TYPE) {
        Some(Value::String(tag)) => Ok((tag, object)),
        Some(other) => Err(SerdeError::invalid(
            RESOURCE_TYPE,
            format!("expected a string, found {}", describe(&other)),
        )),
        None => Err(SerdeError::MissingResourceType),
    }
}

fn array(key: &str, value: Option<Value>) -> Result<Vec<Value>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(SerdeError::invalid(
            key,
            format!("expected an array, found {}", describe(&other)),
        )),
    }
}

fn scalar(key: &str, kind: PrimitiveKind, value: Value) -> Result<Scalar> {
    let scalar = match (kind.json_shape(), value) {
        (JsonShape::Bool, Value::Bool(b)) => Scalar::Boolean(b),
        (JsonShape::Integer, Value::Number(n)) => match n.as_i64() {
            Some(i) => Scalar::Integer(i),
            None => {
                return Err(SerdeError::invalid(
                    key,
                    format!("{} is not a valid {}", n, kind),
                ));
            }
        },
        // the number's literal text, so `1.50` keeps its scale
        (JsonShape::Number, Value::Number(n)) => Scalar::Decimal(
            parse_decimal(&n.to_string()).map_err(|message| SerdeError::invalid(key, message))?,
        ),
        (JsonShape::String, Value::String(s)) => Scalar::Text(s),
        (_, other) => {
            return Err(SerdeError::invalid(
                key,
                format!("expected a {} value, found {}", kind, describe(&other)),
            ));
        }
    };
    Ok(scalar)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub(crate) struct JsonEncoder {
    extension: &'static TypeDescriptor,
}

impl JsonEncoder {
    pub(crate) fn for_set<R: ResourceSet>() -> Self {
        Self {
            extension: <R::Extension as FhirElement>::descriptor(),
        }
    }

    pub(crate) fn resource(&self, resource: &ResourceNode) -> Result<Value> {
        let mut object = Map::new();
        object.insert(
            RESOURCE_TYPE.to_string(),
            Value::String(resource.resource_type().to_string()),
        );
        self.fields(resource.descriptor, &resource.node, &mut object)?;
        Ok(Value::Object(object))
    }

    fn element(&self, descriptor: &'static TypeDescriptor, node: &ElementNode) -> Result<Value> {
        let mut object = Map::new();
        self.fields(descriptor, node, &mut object)?;
        Ok(Value::Object(object))
    }

    fn fields(
        &self,
        descriptor: &'static TypeDescriptor,
        node: &ElementNode,
        object: &mut Map<String, Value>,
    ) -> Result<()> {
        for field in descriptor.fields {
            let Some(value) = node.get(field.name).filter(|value| value.has_content()) else {
                continue;
            };
            match value {
                FieldValue::Attribute(text) => {
                    object.insert(field.name.to_string(), Value::String(text.clone()));
                }
                FieldValue::Primitive(cell) => self.cell(field.name, cell, object)?,
                FieldValue::Primitives(cells) => self.cells(field.name, cells, object)?,
                FieldValue::Composite(child) => {
                    let child = self.element(fields::composite(field)?, child)?;
                    object.insert(field.name.to_string(), child);
                }
                FieldValue::Composites(children) => {
                    let descriptor = fields::composite(field)?;
                    let items = children
                        .iter()
                        .filter(|child| child.has_content())
                        .map(|child| self.element(descriptor, child))
                        .collect::<Result<Vec<_>>>()?;
                    object.insert(field.name.to_string(), Value::Array(items));
                }
                FieldValue::Choice(choice) => {
                    let variant = fields::variant(field, choice.variant)?;
                    let key = field.variant_key(variant);
                    match &choice.value {
                        VariantValue::Primitive(cell) => self.cell(&key, cell, object)?,
                        VariantValue::Composite(child) => {
                            let descriptor = variant
                                .composite()
                                .ok_or_else(|| fields::not_described(&key, "an element"))?;
                            let child = self.element(descriptor, child)?;
                            object.insert(key, child);
                        }
                    }
                }
                FieldValue::Resource(resource) => {
                    object.insert(field.name.to_string(), self.resource(resource)?);
                }
                FieldValue::Resources(resources) => {
                    let items = resources
                        .iter()
                        .map(|resource| self.resource(resource))
                        .collect::<Result<Vec<_>>>()?;
                    object.insert(field.name.to_string(), Value::Array(items));
                }
            }
        }
        Ok(())
    }

    /// `key` gets the value, `_key` the metadata; each only when present.
    fn cell(&self, key: &str, cell: &CellNode, object: &mut Map<String, Value>) -> Result<()> {
        if let Some(value) = &cell.value {
            object.insert(key.to_string(), scalar_to_json(value)?);
        }
        if cell.has_metadata() {
            object.insert(format!("_{}", key), self.shadow(cell)?);
        }
        Ok(())
    }

    fn cells(&self, key: &str, cells: &[CellNode], object: &mut Map<String, Value>) -> Result<()> {
        if cells.iter().any(|cell| cell.value.is_some()) {
            let values = cells
                .iter()
                .map(|cell| match &cell.value {
                    Some(value) => scalar_to_json(value),
                    None => Ok(Value::Null),
                })
                .collect::<Result<Vec<_>>>()?;
            object.insert(key.to_string(), Value::Array(values));
        }
        if cells.iter().any(|cell| cell.has_metadata()) {
            let shadows = cells
                .iter()
                .map(|cell| {
                    if cell.has_metadata() {
                        self.shadow(cell)
                    } else {
                        Ok(Value::Null)
                    }
                })
                .collect::<Result<Vec<_>>>()?;
            object.insert(format!("_{}", key), Value::Array(shadows));
        }
        Ok(())
    }

    fn shadow(&self, cell: &CellNode) -> Result<Value> {
        let extension = cell
            .extension
            .iter()
            .map(|item| self.element(self.extension, item))
            .collect::<Result<Vec<_>>>()?;
        Ok(serde_json::to_value(IdAndExtensionHelper {
            id: &cell.id,
            extension: &extension,
        })?)
    }
}

fn scalar_to_json(scalar: &Scalar) -> Result<Value> {
    Ok(match scalar {
        Scalar::Boolean(b) => Value::Bool(*b),
        Scalar::Integer(i) => Value::Number(Number::from(*i)),
        Scalar::Decimal(d) => Value::Number(d.to_string().parse::<Number>()?),
        Scalar::Text(s) => Value::String(s.clone()),
    })
}
