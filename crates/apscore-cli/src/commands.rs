pub mod panel;
pub mod predict;
