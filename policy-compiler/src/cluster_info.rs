/// Holds data-plane facts the compiler cannot discover at runtime.
#[derive(Clone, Debug)]
pub struct ClusterInfo {
    /// The device terminating the peering tunnel on the gateway.
    pub tunnel_device: String,

    /// The device carrying traffic leaving the cluster.
    pub external_device: String,

    /// Priority of the compiled filter chain. Lower values run earlier.
    pub chain_priority: i32,
}

impl Default for ClusterInfo {
    fn default() -> Self {
        Self {
            tunnel_device: "tunnel0".to_string(),
            external_device: "eth0".to_string(),
            chain_priority: 200,
        }
    }
}
