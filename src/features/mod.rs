pub mod schema;
pub mod vector;

pub use schema::FeatureSchema;
pub use vector::FeatureVector;
