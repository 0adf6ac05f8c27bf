use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use paxos::NodeId;

use super::errors::ConfError;

#[cfg(test)]
#[path = "./tests/conf_tests.rs"]
mod tests;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:4001";
pub const DEFAULT_MAILBOX: usize = 64;
pub const DEFAULT_OUTBOX: usize = 1024;
pub const DEFAULT_LOG_PATH: &str = "borg.log";

/// NodeConf is the configuration of one node running acceptors.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
pub struct NodeConf {
    /// The identity stamped as `From` on every message this node sends.
    pub node_id: NodeId,

    /// Address of the line protocol server.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Capacity of the inbox of every consensus instance.
    #[serde(default = "default_mailbox")]
    pub mailbox: usize,

    /// Capacity of the queue of outgoing messages shared by all instances.
    #[serde(default = "default_outbox")]
    pub outbox: usize,

    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 4001))
}

fn default_mailbox() -> usize {
    DEFAULT_MAILBOX
}

fn default_outbox() -> usize {
    DEFAULT_OUTBOX
}

fn default_log_path() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_PATH)
}

impl NodeConf {
    /// new creates a conf with every optional field set to its default.
    pub fn new(node_id: NodeId) -> NodeConf {
        NodeConf {
            node_id,
            listen: default_listen(),
            mailbox: default_mailbox(),
            outbox: default_outbox(),
            log_path: default_log_path(),
        }
    }

    /// from_file reads node conf yaml from a local file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<NodeConf, ConfError> {
        let content = fs::read_to_string(path)?;
        content.parse()
    }

    /// check validates fields serde can not.
    pub fn check(&self) -> Result<(), ConfError> {
        if self.node_id == 0 {
            return Err(ConfError::BadNodeId(self.node_id.to_string()));
        }
        if self.mailbox == 0 {
            return Err(ConfError::ZeroCapacity("mailbox"));
        }
        if self.outbox == 0 {
            return Err(ConfError::ZeroCapacity("outbox"));
        }
        Ok(())
    }
}

impl FromStr for NodeConf {
    type Err = ConfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let conf: NodeConf = serde_yaml::from_str(s)?;
        conf.check()?;
        Ok(conf)
    }
}

/// parse_node_id parses a node id given on the command line.
pub fn parse_node_id(s: &str) -> Result<NodeId, ConfError> {
    match s.parse::<NodeId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ConfError::BadNodeId(s.into())),
    }
}
