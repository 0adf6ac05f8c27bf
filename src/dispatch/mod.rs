mod dispatcher;
pub use dispatcher::*;

#[cfg(test)]
mod test_dispatcher;
