//! Error types for the bike-flow pipeline.

use thiserror::Error;

use crate::catalog::StationId;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    #[error("Unrecognised timestamp: {0:?}")]
    Timestamp(String),

    #[error("Trip file contains no trips: {0}")]
    NoTrips(String),

    #[error("No station named {0:?}")]
    UnknownStation(String),

    #[error("Station name {name:?} maps to several ids: {ids:?}")]
    AmbiguousStation { name: String, ids: Vec<StationId> },

    #[error("Invalid map bounds: {0}")]
    InvalidBounds(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Stock table has no time buckets")]
    EmptyStockTable,
}

pub type Result<T> = std::result::Result<T, PipelineError>;
