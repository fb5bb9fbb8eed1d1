//! Shared Cucumber support code

pub mod world;

pub use world::TestWorld;
