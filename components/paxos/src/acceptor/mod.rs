mod acceptor;
pub use acceptor::*;

mod putter;
pub use putter::*;

mod serve;
pub use serve::*;


#[cfg(test)]
mod test_serve;
