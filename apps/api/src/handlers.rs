pub mod formation_mapping;
pub mod health;
