use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("thermocouple open (probe disconnected)")]
    ThermocoupleOpen,
    #[error("thermocouple read before conversion finished")]
    NotReady,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
