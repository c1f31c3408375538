use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Could not send to heat pump, I/O error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Received frame is inconsistent after removing doubled start bytes: {0}")]
    Destuff(#[from] crate::destuff::Error),
}
