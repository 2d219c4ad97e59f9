use serde::Serialize;

use super::mask;
use super::GenerateError;
use crate::models::GenerateRequest;
use crate::vendors::{Management, VendorProfile};

/// Mask applied when the caller supplies none
pub const DEFAULT_MASK: &str = "255.255.255.0";

/// CanonicalVariables is the fully resolved, vendor-normalized variable set
/// handed to template rendering and echoed back to API callers.
/// `mgmt_mask_cidr` is always derived, never supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalVariables {
    pub hostname: String,
    pub mgmt_ip: String,
    pub mgmt_mask: String,
    pub mgmt_mask_cidr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mgmt_vlan: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mgmt_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mgmt_port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
}

/// Treat absent and blank strings the same way HTML forms do
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Merge caller input with vendor defaults into one canonical record.
/// Precedence: explicit input > vendor default. Vendor-conditional fields
/// follow the profile's management mode; a VLAN-managed vendor strictly
/// requires a VLAN, a port-managed vendor strictly requires a port.
pub fn resolve(
    profile: &VendorProfile,
    input: &GenerateRequest,
) -> Result<CanonicalVariables, GenerateError> {
    let hostname = non_empty(&input.hostname)
        .ok_or(GenerateError::MissingField("hostname"))?
        .to_string();
    let mgmt_ip = non_empty(&input.mgmt_ip)
        .ok_or(GenerateError::MissingField("mgmt_ip"))?
        .to_string();
    let mgmt_mask = non_empty(&input.mgmt_mask)
        .unwrap_or(DEFAULT_MASK)
        .to_string();
    let mgmt_mask_cidr = mask::mask_to_cidr(&mgmt_mask);

    let mut vars = CanonicalVariables {
        hostname,
        mgmt_ip,
        mgmt_mask,
        mgmt_mask_cidr,
        mgmt_vlan: None,
        mgmt_interface: None,
        mgmt_port: None,
        gateway: None,
    };

    match &profile.management {
        Management::VlanInterface {
            default_vlan,
            default_interface,
            default_gateway,
        } => {
            vars.mgmt_vlan = Some(
                input
                    .mgmt_vlan
                    .or(*default_vlan)
                    .ok_or(GenerateError::MissingField("mgmt_vlan"))?,
            );
            vars.mgmt_interface = non_empty(&input.mgmt_interface)
                .map(str::to_string)
                .or_else(|| default_interface.map(str::to_string));
            vars.gateway = non_empty(&input.gateway)
                .map(str::to_string)
                .or_else(|| default_gateway.map(str::to_string));
        }
        Management::Port {
            default_port,
            default_gateway,
        } => {
            vars.mgmt_port = Some(
                non_empty(&input.mgmt_port)
                    .map(str::to_string)
                    .or_else(|| default_port.map(str::to_string))
                    .ok_or(GenerateError::MissingField("mgmt_port"))?,
            );
            vars.gateway = non_empty(&input.gateway)
                .map(str::to_string)
                .or_else(|| default_gateway.map(str::to_string));
        }
    }

    Ok(vars)
}
