//! Descriptor lookups shared by the JSON and XML codecs.

use fhirwire_support::{ChoiceVariant, FieldDescriptor, PrimitiveKind, TypeDescriptor};

use crate::error::{Result, SerdeError};

/// Tracks which variant each choice field of one element has used so far.
#[derive(Debug, Default)]
pub(crate) struct ChoiceTracker {
    seen: Vec<(&'static str, &'static str)>,
}

impl ChoiceTracker {
    /// Records `variant` for its field. A different variant of the same field
    /// already seen is a conflict; the same one again is not.
    pub(crate) fn record(
        &mut self,
        field: &'static FieldDescriptor,
        variant: &'static ChoiceVariant,
    ) -> Result<()> {
        match self.seen.iter().find(|(name, _)| *name == field.name) {
            Some(&(_, first)) if first != variant.suffix => Err(SerdeError::ConflictingVariant {
                field: field.name.to_string(),
                first: format!("{}{}", field.name, first),
                second: field.variant_key(variant),
            }),
            Some(_) => Ok(()),
            None => {
                self.seen.push((field.name, variant.suffix));
                Ok(())
            }
        }
    }
}

pub(crate) fn primitive_kind(field: &FieldDescriptor) -> Result<PrimitiveKind> {
    field
        .primitive_kind()
        .ok_or_else(|| not_described(field.name, "a primitive"))
}

pub(crate) fn composite(field: &FieldDescriptor) -> Result<&'static TypeDescriptor> {
    field
        .composite()
        .ok_or_else(|| not_described(field.name, "an element"))
}

pub(crate) fn variant(field: &FieldDescriptor, suffix: &str) -> Result<&'static ChoiceVariant> {
    field.variant(suffix).ok_or_else(|| {
        SerdeError::invalid(
            field.name,
            format!("'{}' is not a declared variant", suffix),
        )
    })
}

/// The node handed to an encoder disagrees with the descriptor table.
pub(crate) fn not_described(field: &str, expected: &str) -> SerdeError {
    SerdeError::invalid(field, format!("descriptor does not declare {}", expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    static VARIANTS: [ChoiceVariant; 2] = [
        ChoiceVariant::primitive("Boolean", PrimitiveKind::Boolean),
        ChoiceVariant::primitive("DateTime", PrimitiveKind::DateTime),
    ];

    static DECEASED: FieldDescriptor = FieldDescriptor::choice("deceased", &VARIANTS);
    static MULTIPLE_BIRTH: FieldDescriptor = FieldDescriptor::choice("multipleBirth", &VARIANTS);

    #[test]
    fn test_second_variant_conflicts() {
        let mut tracker = ChoiceTracker::default();
        tracker.record(&DECEASED, &VARIANTS[0]).unwrap();
        tracker.record(&DECEASED, &VARIANTS[0]).unwrap();
        tracker.record(&MULTIPLE_BIRTH, &VARIANTS[1]).unwrap();

        match tracker.record(&DECEASED, &VARIANTS[1]) {
            Err(SerdeError::ConflictingVariant {
                field,
                first,
                second,
            }) => {
                assert_eq!(field, "deceased");
                assert_eq!(first, "deceasedBoolean");
                assert_eq!(second, "deceasedDateTime");
            }
            other => panic!("expected a conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_lookups_report_descriptor_gaps() {
        assert!(primitive_kind(&DECEASED).is_err());
        assert!(composite(&DECEASED).is_err());
        assert_eq!(variant(&DECEASED, "DateTime").unwrap().suffix, "DateTime");
        assert!(variant(&DECEASED, "Period").is_err());
    }
}
