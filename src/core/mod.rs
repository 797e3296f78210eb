pub mod archive;
pub mod assemble;
pub mod audit;
pub mod backend;
pub mod diff;
pub mod engine;
pub mod normalize;
pub mod pipeline;
pub mod report;

pub use crate::domain::model::{DiffResult, ExportInput, RelationshipRecord, RelationshipSet};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
