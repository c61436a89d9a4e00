use thiserror::Error;

use crate::model::LevelError;
use crate::model::TimingsError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Timings(#[from] TimingsError),
}
