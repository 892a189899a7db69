//! Cross-platform utilities supporting the install pipeline.

pub mod fs;
