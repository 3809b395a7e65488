pub mod config;
pub mod kmedoids;
pub mod medoid;
pub mod model;
pub mod params;
pub mod refine;
pub mod sampling;
pub mod selection;

pub use kmedoids::{KMedoids, KMedoidsBuilder, TrainingResult};
pub use medoid::{medoid, medoid_index};
pub use model::{closest, KMedoidsModel};
pub use params::KMedoidsParams;
pub use refine::{HaltReason, RefineOutcome, Refiner};
pub use sampling::{sample_by_size, sample_distinct, DataSource};
pub use selection::{Candidate, MdlCost, ModelSelection, ModelSelector};
