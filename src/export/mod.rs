pub mod to_catalog_json;
pub mod to_mobile_config;
pub mod to_viewer;
