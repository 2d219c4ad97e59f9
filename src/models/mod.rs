use serde::{Deserialize, Deserializer, Serialize};

use crate::generator::resolver::CanonicalVariables;

/// GenerateRequest is the raw caller input for one generation run.
/// Everything except the vendor is optional at the wire level; what is
/// actually required depends on the generation path (template vs inference).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub vendor: String,
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
    pub mgmt_port: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    /// Free-text requirements; presence selects the inference-assisted path
    #[serde(default)]
    pub requirements: Option<String>,
    /// Per-request credential for the text-generation service
    #[serde(default)]
    pub api_key: Option<String>,
}

/// GenerateResponse returned by POST /api/generate
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub config: String,
    pub vendor: String,
    pub hostname: String,
    pub variables: CanonicalVariables,
}

/// DownloadRequest for persisting a generated script to a file
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub config: String,
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default = "default_vendor")]
    pub vendor: String,
}

fn default_hostname() -> String {
    "device".to_string()
}

fn default_vendor() -> String {
    "unknown".to_string()
}

/// One entry of GET /api/vendors
#[derive(Debug, Clone, Serialize)]
pub struct VendorInfo {
    pub id: String,
    pub name: String,
}

/// Accept a VLAN id as either a JSON number or a numeric string.
/// Browsers and LLM responses are inconsistent about which one they send.
pub(crate) fn de_vlan_id<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u16::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("VLAN id out of range: {}", n))),
        Some(serde_json::Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                trimmed
                    .parse::<u16>()
                    .map(Some)
                    .map_err(|_| serde::de::Error::custom(format!("invalid VLAN id: {}", s)))
            }
        }
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid VLAN id: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vlan_accepts_number_or_string() {
        let req: GenerateRequest =
            serde_json::from_str(r#"{"vendor":"cisco","mgmt_vlan":200}"#).unwrap();
        assert_eq!(req.mgmt_vlan, Some(200));

        let req: GenerateRequest =
            serde_json::from_str(r#"{"vendor":"cisco","mgmt_vlan":"200"}"#).unwrap();
        assert_eq!(req.mgmt_vlan, Some(200));

        let req: GenerateRequest =
            serde_json::from_str(r#"{"vendor":"cisco","mgmt_vlan":""}"#).unwrap();
        assert_eq!(req.mgmt_vlan, None);

        let req: GenerateRequest = serde_json::from_str(r#"{"vendor":"cisco"}"#).unwrap();
        assert_eq!(req.mgmt_vlan, None);
    }

    #[test]
    fn test_vlan_rejects_garbage() {
        assert!(serde_json::from_str::<GenerateRequest>(
            r#"{"vendor":"cisco","mgmt_vlan":"vlan100"}"#
        )
        .is_err());
        assert!(
            serde_json::from_str::<GenerateRequest>(r#"{"vendor":"cisco","mgmt_vlan":99999}"#)
                .is_err()
        );
    }

    #[test]
    fn test_download_request_defaults() {
        let req: DownloadRequest = serde_json::from_str(r#"{"config":"hostname X"}"#).unwrap();
        assert_eq!(req.hostname, "device");
        assert_eq!(req.vendor, "unknown");
    }
}
