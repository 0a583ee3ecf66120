pub mod marker;
pub mod reconcile;

pub use marker::{format_duration, MarkerState, MarkerTone, PopupContent, VisualDescriptor};
pub use reconcile::{reconcile, MarkerCommand, MarkerTable, RenderPlan, RenderReconciler};
