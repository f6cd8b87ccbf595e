//! Field registry: the palette of addable field types and the default shape
//! of a freshly created field of each type.

use formwright_types::field::{Field, FieldId, FieldType};

/// Number of placeholder choices a new single-select field starts with.
pub const DEFAULT_OPTION_COUNT: usize = 3;

/// The field types offered by the builder palette, in display order.
///
/// Always the same five entries in the same order.
pub fn available_types() -> [FieldType; 5] {
    FieldType::ALL
}

/// Default label for a new field of the given type, e.g. `"Select Field"`.
pub fn default_label(field_type: FieldType) -> String {
    format!("{} Field", field_type.display_name())
}

/// Create a new field of `field_type` with a fresh id and default properties.
///
/// Single-select fields start with three placeholder options; every other
/// type has no options.
pub fn create_default(field_type: FieldType) -> Field {
    let options = field_type.has_options().then(|| {
        (1..=DEFAULT_OPTION_COUNT)
            .map(|n| format!("Option {n}"))
            .collect()
    });

    Field {
        id: FieldId::new(),
        field_type,
        label: default_label(field_type),
        required: false,
        options,
    }
}
