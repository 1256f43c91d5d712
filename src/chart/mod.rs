pub mod axes;
pub mod margins;
pub mod view;

pub use axes::{scatter_points, Axis, AxisSelection, ScatterPoint};
pub use margins::{ColorScheme, Lean, LineStyle, MarginSeries, MarginTable, Palette};
pub use view::{ControlPanel, Interaction};
