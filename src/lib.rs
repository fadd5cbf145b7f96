pub mod case;
pub mod cases;
pub mod config;
pub mod group;
pub mod groups;
pub mod io;
pub mod math;
pub mod parallel;
pub mod resolve;
pub mod series;
pub mod time_utils;
pub mod variables;
pub mod windowing;

pub use case::{Case, CaseError, CaseReport};
pub use resolve::{resolve, Resolution, ResolveError};
pub use series::{Line, Panel, PanelKind, Series};
pub use time_utils::*;
pub use variables::VariableDescriptor;
pub use windowing::{ConfigurationError, TimeWindow, WindowBounds};
