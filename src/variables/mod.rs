pub mod descriptor;
pub mod formulas;

pub use descriptor::{Computation, PanelKind, VariableDescriptor};
pub use formulas::FieldReader;
