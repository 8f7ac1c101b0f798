//! Raster output: the animated station map and the station profile chart.

pub mod animate;
pub mod basemap;
pub mod chart;
pub mod colormap;
pub mod font;
pub mod painting;
pub mod projection;

pub use animate::FlowAnimator;
pub use basemap::Basemap;
pub use projection::MercatorViewport;
