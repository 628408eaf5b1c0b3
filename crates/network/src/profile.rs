//! Static description of the ledger network a client talks to.

use ledger_types::NodeAddress;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Peers and orderer serving one channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelProfile {
    /// Endorsing peers, also used for chaincode queries.
    pub endorsers: Vec<NodeAddress>,
    /// Ordering service endpoint.
    pub orderer: NodeAddress,
    /// Peers whose commit notifications confirm a transaction.
    /// Falls back to the endorsers when empty.
    #[serde(default)]
    pub event_sources: Vec<NodeAddress>,
}

impl ChannelProfile {
    pub fn event_sources(&self) -> &[NodeAddress] {
        if self.event_sources.is_empty() {
            &self.endorsers
        } else {
            &self.event_sources
        }
    }

    /// Peer used for single-target ledger queries.
    pub fn query_peer(&self) -> Option<&NodeAddress> {
        self.endorsers.first()
    }
}

/// Channel name -> channel profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkProfile {
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelProfile>,
}

impl NetworkProfile {
    pub fn channel(&self, name: &str) -> Option<&ChannelProfile> {
        self.channels.get(name)
    }

    pub fn with_channel(mut self, name: impl Into<String>, channel: ChannelProfile) -> Self {
        self.channels.insert(name.into(), channel);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(event_sources: Vec<&str>) -> ChannelProfile {
        ChannelProfile {
            endorsers: vec![NodeAddress::from("peer0"), NodeAddress::from("peer1")],
            orderer: NodeAddress::from("orderer0"),
            event_sources: event_sources.into_iter().map(NodeAddress::from).collect(),
        }
    }

    #[test]
    fn test_event_sources_fall_back_to_endorsers() {
        assert_eq!(channel(vec![]).event_sources().len(), 2);
        assert_eq!(channel(vec!["peer9"]).event_sources(), &[NodeAddress::from("peer9")]);
    }

    #[test]
    fn test_lookup_unknown_channel() {
        let profile = NetworkProfile::default().with_channel("mychannel", channel(vec![]));
        assert!(profile.channel("mychannel").is_some());
        assert!(profile.channel("other").is_none());
    }
}
