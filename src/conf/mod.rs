mod conf;
pub use self::conf::*;

mod errors;
pub use errors::*;
