use crate::error::ConfigError;
use rtcmesh_core::IceServerConfig;
use rtcmesh_core::utils::default_ice_servers;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Client options. Field names follow the JSON option object accepted by
/// [`MeshConfig::from_json_file`]; every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeshConfig {
    pub signalling_server: String,
    pub room_name: String,
    pub rtc_opts: RtcOptions,
    pub channel_name: String,
    pub channel_opts: ChannelOptions,
    /// Only raises log verbosity.
    pub debug_mode: bool,
    /// Forward every local candidate instead of only the first one.
    pub trickle_all_candidates: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            signalling_server: "ws://localhost:3000/".to_owned(),
            room_name: "defaultRoom".to_owned(),
            rtc_opts: RtcOptions::default(),
            channel_name: "messages".to_owned(),
            channel_opts: ChannelOptions::default(),
            debug_mode: false,
            trickle_all_candidates: false,
        }
    }
}

impl MeshConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Transport engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RtcOptions {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for RtcOptions {
    fn default() -> Self {
        Self {
            ice_servers: default_ice_servers(),
        }
    }
}

/// Data channel options. The default is an unreliable, unordered channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelOptions {
    pub ordered: Option<bool>,
    pub max_retransmits: Option<u16>,
    pub max_packet_life_time: Option<u16>,
    pub protocol: Option<String>,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            ordered: Some(false),
            max_retransmits: Some(0),
            max_packet_life_time: None,
            protocol: None,
        }
    }
}

impl ChannelOptions {
    pub fn reliable() -> Self {
        Self {
            ordered: Some(true),
            max_retransmits: None,
            max_packet_life_time: None,
            protocol: None,
        }
    }
}
