mod figment;
mod sensitive;

pub use self::figment::AttachFigmentError;
pub use self::sensitive::Sensitive;
