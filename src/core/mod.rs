pub mod heatmap;
pub mod predict;
pub mod scan;
pub mod signal;
