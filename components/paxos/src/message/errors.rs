quick_error! {
    /// MessageError is returned when a wire message or a message body is malformed.
    /// It is always scoped to a single message.
    #[derive(Debug, Eq, PartialEq, Clone)]
    pub enum MessageError {
        PartCount(field: &'static str, want: usize, got: usize) {
            display("malformed {}: need {} parts, but:{}", field, want, got)
        }

        BadInt(field: &'static str, value: String) {
            display("malformed {}: not an unsigned integer: {:?}", field, value)
        }

        UnknownCommand(cmd: String) {
            display("unknown command: {:?}", cmd)
        }

        BadPeer(peer: String) {
            display("malformed sender: {:?}", peer)
        }
    }
}
