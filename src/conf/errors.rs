use std::net::AddrParseError;

quick_error! {
    #[derive(Debug)]
    pub enum ConfError {
        IOError(e: std::io::Error) {
            from(e: std::io::Error) -> (e)
        }

        BadYaml(e: serde_yaml::Error) {
            from(e: serde_yaml::Error) -> (e)
        }

        BadAddr(e: AddrParseError) {
            from(e: AddrParseError) -> (e)
        }

        BadNodeId(nid: String) {
            display("node id must be a positive integer, but:{:?}", nid)
        }

        ZeroCapacity(field: &'static str) {
            display("{} must be greater than 0", field)
        }
    }
}

impl PartialEq<ConfError> for ConfError {
    fn eq(&self, other: &ConfError) -> bool {
        match (self, other) {
            (Self::IOError(a), Self::IOError(b)) => a.kind() == b.kind(),
            (Self::BadYaml(_), Self::BadYaml(_)) => true,
            (Self::BadAddr(a), Self::BadAddr(b)) => a == b,
            (Self::BadNodeId(a), Self::BadNodeId(b)) => a == b,
            (Self::ZeroCapacity(a), Self::ZeroCapacity(b)) => a == b,
            _ => false,
        }
    }
}
