use serde_json::{json, Value};

/// How a vendor exposes device management: through a management VLAN bound to
/// a switched interface, or through a dedicated management port.
#[derive(Debug, Clone, PartialEq)]
pub enum Management {
    VlanInterface {
        default_vlan: Option<u16>,
        default_interface: Option<&'static str>,
        default_gateway: Option<&'static str>,
    },
    Port {
        default_port: Option<&'static str>,
        default_gateway: Option<&'static str>,
    },
}

/// VendorProfile is the static capability/default record for one manufacturer
#[derive(Debug, Clone, PartialEq)]
pub struct VendorProfile {
    pub id: &'static str,
    pub display_name: &'static str,
    pub management: Management,
}

impl VendorProfile {
    /// Default values for this vendor as a JSON object (vendor-config API)
    pub fn defaults(&self) -> Value {
        match &self.management {
            Management::VlanInterface {
                default_vlan,
                default_interface,
                default_gateway,
            } => json!({
                "mgmt_vlan": default_vlan,
                "mgmt_interface": default_interface,
                "gateway": default_gateway,
            }),
            Management::Port {
                default_port,
                default_gateway,
            } => json!({
                "mgmt_port": default_port,
                "gateway": default_gateway,
            }),
        }
    }
}

/// Immutable registry of supported vendors. Built once at startup and shared
/// read-only; lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct VendorRegistry {
    profiles: Vec<VendorProfile>,
}

const DEFAULT_GATEWAY: &str = "192.168.10.254";

impl VendorRegistry {
    /// Registry with the built-in vendor set
    pub fn builtin() -> Self {
        let vlan_vendor = |id, display_name, interface| VendorProfile {
            id,
            display_name,
            management: Management::VlanInterface {
                default_vlan: Some(100),
                default_interface: Some(interface),
                default_gateway: Some(DEFAULT_GATEWAY),
            },
        };

        Self {
            profiles: vec![
                vlan_vendor("cisco", "Cisco", "Gi1/0/1"),
                vlan_vendor("arista", "Arista", "Management1"),
                vlan_vendor("alcatel", "Alcatel-Lucent", "1/1/1"),
                vlan_vendor("hp", "HP (HPE)", "1"),
                vlan_vendor("juniper", "Juniper", "ge-0/0/0"),
                VendorProfile {
                    id: "fortinet",
                    display_name: "Fortinet",
                    management: Management::Port {
                        default_port: Some("port1"),
                        default_gateway: Some(DEFAULT_GATEWAY),
                    },
                },
            ],
        }
    }

    pub fn lookup(&self, vendor_id: &str) -> Option<&VendorProfile> {
        let normalized = vendor_id.trim().to_lowercase();
        self.profiles.iter().find(|p| p.id == normalized)
    }

    pub fn all(&self) -> &[VendorProfile] {
        &self.profiles
    }
}
