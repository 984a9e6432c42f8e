use super::registry::Rid;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Render thread failed to boot.")]
    BootFailed,
    #[fail(display = "Render thread is gone.")]
    ThreadGone,
    #[fail(display = "{} is not a live resource.", _0)]
    ResourceInvalid(Rid),
    #[fail(display = "Driver: {}", _0)]
    Driver(String),
}

pub type Result<T> = ::std::result::Result<T, Error>;
