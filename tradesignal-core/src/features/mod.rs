//! Feature Assembler: bar history in, one flat feature record out.

pub mod assembler;

pub use assembler::{AssemblerConfig, FeatureAssembler, RawFeatureRow};
