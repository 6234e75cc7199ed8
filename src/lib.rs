pub mod config;
pub mod consts;
pub mod core_types;
pub mod error;
pub mod fitness;
pub mod optimizer;
pub mod site;
pub mod wake;
