pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unknown event name: {0}")]
    UnknownEvent(String),

    #[error("Not an event category: {0} (use the watch option flags instead)")]
    NotAnEvent(String),

    #[error("Event list is empty")]
    EmptyEventList,

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Unknown color mode: {0}")]
    UnknownColorMode(String),
}
