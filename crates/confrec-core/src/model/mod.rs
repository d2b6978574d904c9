pub mod definition;
pub mod document;
pub mod handler;
pub mod status;
pub mod value;

pub use definition::{ConfigDefinition, HandlerDef, SetterDef};
pub use document::{ListItem, Property, PropertyNode, PropertySet};
pub use handler::{claim_key, ConfigHandler, ObjectState, PropertyBag, PropertySetter};
pub use status::{ApplyStatus, ConfigSnapshots, ConfigStatus, Operation};
pub use value::{FlatMap, PropertyValue};
