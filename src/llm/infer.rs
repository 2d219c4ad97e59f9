use std::fmt;

use serde::Deserialize;

use super::client::{CompletionParams, TextGeneration};
use crate::generator::{strip_code_fences, GenerateError};
use crate::models::de_vlan_id;
use crate::vendors::VendorProfile;

const PLAN_TEMPERATURE: f32 = 0.2;
const PLAN_MAX_TOKENS: u32 = 1024;

/// Network parameters inferred from free-text requirements, plus any extra
/// constructs (VLANs, interfaces, routing statements) the requirements imply.
/// Produced once per request and consumed immediately; never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct InferredPlan {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub mgmt_ip: Option<String>,
    #[serde(default)]
    pub mgmt_mask: Option<String>,
    #[serde(default, deserialize_with = "de_vlan_id")]
    pub mgmt_vlan: Option<u16>,
    #[serde(default)]
    pub mgmt_interface: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub constructs: Vec<AuxiliaryConstruct>,
}

/// One extra network element proposed by inference beyond the base
/// management parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuxiliaryConstruct {
    Vlan {
        #[serde(deserialize_with = "de_required_vlan_id")]
        vlan_id: u16,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        ip: Option<String>,
        #[serde(default)]
        subnet: Option<String>,
    },
    Interface {
        name: String,
        #[serde(default)]
        ip: Option<String>,
        #[serde(default)]
        subnet: Option<String>,
        #[serde(default)]
        description: Option<String>,
    },
    Routing {
        protocol: String,
        #[serde(default)]
        network: Option<String>,
        #[serde(default)]
        area: Option<String>,
    },
}

fn de_required_vlan_id<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    de_vlan_id(deserializer)?.ok_or_else(|| serde::de::Error::custom("missing vlan_id"))
}

impl fmt::Display for AuxiliaryConstruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn push(parts: &mut Vec<String>, label: &str, value: &Option<String>) {
            if let Some(v) = value {
                parts.push(format!("{} {}", label, v));
            }
        }

        let mut parts = Vec::new();
        match self {
            AuxiliaryConstruct::Vlan {
                vlan_id,
                name,
                ip,
                subnet,
            } => {
                push(&mut parts, "name", name);
                push(&mut parts, "ip", ip);
                push(&mut parts, "subnet", subnet);
                write!(f, "VLAN {}", vlan_id)?;
            }
            AuxiliaryConstruct::Interface {
                name,
                ip,
                subnet,
                description,
            } => {
                push(&mut parts, "ip", ip);
                push(&mut parts, "subnet", subnet);
                push(&mut parts, "description", description);
                write!(f, "Interface {}", name)?;
            }
            AuxiliaryConstruct::Routing {
                protocol,
                network,
                area,
            } => {
                push(&mut parts, "network", network);
                push(&mut parts, "area", area);
                write!(f, "Routing {}", protocol.to_uppercase())?;
            }
        }
        if !parts.is_empty() {
            write!(f, " ({})", parts.join(", "))?;
        }
        Ok(())
    }
}

const PLAN_SYSTEM_PROMPT: &str = "You are a network engineering assistant. \
Given device requirements, you propose concrete network parameters. \
Respond with a single JSON object and nothing else.";

fn plan_user_prompt(profile: &VendorProfile, requirements: &str) -> String {
    format!(
        "Propose network parameters for a {} device based on these requirements:\n\n\
         {}\n\n\
         Respond with one JSON object with these keys:\n\
         - hostname: device hostname (string)\n\
         - mgmt_ip: management IP address (string)\n\
         - mgmt_mask: subnet mask in dotted-quad form (string)\n\
         - mgmt_vlan: management VLAN id (number)\n\
         - mgmt_interface: management interface name (string)\n\
         - gateway: default gateway (string)\n\
         - constructs: array of additional elements, each tagged with \
         \"type\": \"vlan\" (vlan_id, name, ip, subnet), \
         \"type\": \"interface\" (name, ip, subnet, description), or \
         \"type\": \"routing\" (protocol, network, area)\n\n\
         When the requirements do not pin down concrete addresses, use private \
         address space (10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16). \
         Use interface naming conventions appropriate for {} devices.",
        profile.display_name, requirements, profile.display_name
    )
}

/// Derive a structured network plan from free-text requirements.
/// Nothing is retried here; retry policy belongs to the caller.
pub async fn infer_plan(
    llm: &dyn TextGeneration,
    profile: &VendorProfile,
    requirements: &str,
    api_key: &str,
) -> Result<InferredPlan, GenerateError> {
    let user_prompt = plan_user_prompt(profile, requirements);
    let response = llm
        .complete(CompletionParams {
            api_key,
            system_prompt: PLAN_SYSTEM_PROMPT,
            user_prompt: &user_prompt,
            temperature: PLAN_TEMPERATURE,
            max_tokens: PLAN_MAX_TOKENS,
            structured: true,
        })
        .await
        .map_err(GenerateError::from)?;

    let body = strip_code_fences(&response);
    serde_json::from_str(&body)
        .map_err(|e| GenerateError::Inference(format!("unparseable inference response: {}", e)))
}
