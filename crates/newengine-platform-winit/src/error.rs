use thiserror::Error;

pub type PlatformResult<T> = Result<T, PlatformError>;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("winit event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window create failed: {0}")]
    Window(#[from] winit::error::OsError),
}
