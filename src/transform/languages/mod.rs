//! Per-language rewrite rules.
//!
//! Each module exposes `rewrites()`: its layout and spacing stages, the
//! ordered structural repairs, the modernizing rewrites, and the markers
//! that describe what changed.

pub mod cpp;
pub mod csharp;
pub mod java;
pub mod javascript;
pub mod php;
pub mod python;
