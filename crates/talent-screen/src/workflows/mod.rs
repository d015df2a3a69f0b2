pub mod applications;
pub mod postings;
pub mod store;
pub mod validation;

pub use store::RepositoryError;
pub use validation::ValidationError;
