mod errors;
pub use errors::*;

mod message;
pub use message::*;

mod proto;
pub use proto::*;

#[cfg(test)]
mod test_errors;
