//! Small, dependency-light helpers shared by the apkicon crates.

pub mod bytes;
pub mod error;
pub mod hash;
pub mod path;
