pub mod derived_metrics;
pub mod electrical_power;
pub mod material_properties;
pub mod metrics;
pub(crate) mod path;
pub mod supervisory_control;
