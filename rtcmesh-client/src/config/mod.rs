mod mesh_config;

pub use mesh_config::*;
