//! This module contains the maze topology: markup parsing, wall rendering and grid queries.

pub mod builder;
pub mod direction;
pub mod parser;
pub mod render;
