pub mod generator;

pub use generator::TokenGenerator;
