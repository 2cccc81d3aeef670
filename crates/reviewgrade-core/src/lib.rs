pub mod grade;
pub mod review;
pub mod schema;
pub mod variant;

pub use grade::{Grade, GradeResult, calculate_grade, grade};
pub use review::{Label, LabelError, Prediction, Review, ReviewBatch};
pub use schema::tables;
pub use variant::{ModelVariant, UnknownVariant};
