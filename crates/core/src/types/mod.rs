pub mod call;
pub mod request;
pub mod shape;
pub mod type_descriptor;

// Re-export commonly used types
pub use call::MethodCallDescriptor;
pub use request::{DispatchTarget, GenerationRequest, ProxyRegistryEntry};
pub use shape::{InterfaceShape, MethodMember, Parameter, PropertyMember, Receiver};
pub use type_descriptor::TypeDescriptor;
