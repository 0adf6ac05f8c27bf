mod errors;
pub use errors::*;

mod server;
pub use server::*;
