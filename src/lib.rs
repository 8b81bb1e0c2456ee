pub mod commands;
pub mod curve;
pub mod document;
pub mod output;
pub mod zones;
