use crate::builder::RegistryBuilder;
use crate::builtin::{AttributeTypes, CoreTypes, FieldTypes, KeyTypes, ObjectTypes, ValidatorTypes};
use crate::error::RegistryResult;

/// A unit that contributes type definitions to a registry.
///
/// Providers are listed explicitly and registered in order before any
/// loader starts building. This is the only extension point for new node
/// kinds.
pub trait TypeProvider: Send + Sync {
    /// Stable identifier, used to detect repeated registration.
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str {
        ""
    }

    fn register(&self, registry: &mut RegistryBuilder) -> RegistryResult<()>;
}

/// Providers every registry starts from, in registration order.
pub static BUILTIN_PROVIDERS: &[&dyn TypeProvider] = &[
    &CoreTypes,
    &ObjectTypes,
    &FieldTypes,
    &AttributeTypes,
    &ValidatorTypes,
    &KeyTypes,
];
