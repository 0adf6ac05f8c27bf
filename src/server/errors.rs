quick_error! {
    #[derive(Debug)]
    pub enum ServerError {
        NotStarted {
            display("server is not started")
        }

        RxClosed {
            display("server already stopped")
        }

        IOError(e: std::io::Error) {
            from(e: std::io::Error) -> (e)
        }

        Join(e: tokio::task::JoinError) {
            from(e: tokio::task::JoinError) -> (e)
            display("server task failed: {}", e)
        }
    }
}
