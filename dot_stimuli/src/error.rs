pub type StimulusResult<T> = Result<T, StimulusError>;

#[derive(thiserror::Error, Debug)]
pub enum StimulusError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
