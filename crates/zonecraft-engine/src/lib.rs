pub mod constraints;
pub mod editing;
pub mod io;
pub mod models;
pub mod query;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use constraints::*;
pub use editing::*;
pub use io::*;
pub use models::*;
pub use query::*;
pub use validation::*;
