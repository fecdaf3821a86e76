pub mod etl;
pub mod extractor;
pub mod interval;
pub mod merger;
pub mod pipeline;
pub mod retention;
pub mod serializer;
pub mod tracker;

pub use crate::domain::model::{
    ClassifiedLine, DocumentRef, FrequencyRange, PublicationState, PublicationTag, ZoneGroup,
};
pub use crate::domain::ports::{
    ArtifactStore, ConfigProvider, DocumentDirectory, DocumentTextProvider, Pipeline, StateStore,
};
pub use crate::utils::error::Result;
