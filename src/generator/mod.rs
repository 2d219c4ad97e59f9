pub mod mask;
pub mod output;
pub mod render;
pub mod resolver;

use std::sync::Arc;

use crate::llm::{infer_plan, AuxiliaryConstruct, CompletionParams, InferredPlan, LlmError, TextGeneration};
use crate::models::GenerateRequest;
use crate::vendors::{VendorProfile, VendorRegistry};

use render::TemplateRenderer;
use resolver::{non_empty, CanonicalVariables};

/// Hostname used on the inference path when the caller supplied none
const PLACEHOLDER_HOSTNAME: &str = "Device-01";

const SCRIPT_TEMPERATURE: f32 = 0.2;
const SCRIPT_MAX_TOKENS: u32 = 4096;

/// Failure taxonomy of the generation pipeline. Validation and vendor lookup
/// failures need corrected input; credential failures need new credentials;
/// throttled and generic inference failures are caller-retryable; render
/// failures indicate a template bug.
#[derive(Debug)]
pub enum GenerateError {
    UnknownVendor(String),
    MissingField(&'static str),
    Credential(String),
    Throttled(String),
    Inference(String),
    Render(String),
    Io(String),
}

impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateError::UnknownVendor(vendor) => write!(f, "unsupported vendor: {}", vendor),
            GenerateError::MissingField(field) => write!(f, "missing required field: {}", field),
            GenerateError::Credential(msg) => write!(f, "credential error: {}", msg),
            GenerateError::Throttled(msg) => write!(f, "rate limited: {}", msg),
            GenerateError::Inference(msg) => write!(f, "inference failed: {}", msg),
            // Render and I/O failures are surfaced verbatim
            GenerateError::Render(msg) => write!(f, "{}", msg),
            GenerateError::Io(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for GenerateError {}

impl From<LlmError> for GenerateError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Credential(msg) => GenerateError::Credential(msg),
            LlmError::Throttled(msg) => GenerateError::Throttled(msg),
            LlmError::Empty => {
                GenerateError::Inference("empty response from text-generation service".to_string())
            }
            LlmError::Other(msg) => GenerateError::Inference(msg),
        }
    }
}

/// Strip a single fenced-code delimiter pair from LLM output: one opening
/// marker line and, if present, one closing marker line. Interior content is
/// preserved verbatim, including nested delimiter-like text. Text without a
/// leading fence is returned unchanged.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return text.to_string();
    }

    let mut lines: Vec<&str> = trimmed.lines().collect();
    lines.remove(0);
    if let Some(last) = lines.last() {
        if last.trim() == "```" {
            lines.pop();
        }
    }
    lines.join("\n")
}

/// Result of one successful generation run
#[derive(Debug, Clone)]
pub struct Generated {
    pub config: String,
    pub vendor: String,
    pub hostname: String,
    pub variables: CanonicalVariables,
}

/// Generation pipeline: resolves caller input against the vendor registry
/// and produces configuration text, either by rendering the vendor template
/// or by deriving parameters from free-text requirements first.
pub struct Generator {
    registry: VendorRegistry,
    renderer: TemplateRenderer,
    llm: Arc<dyn TextGeneration>,
    default_api_key: String,
}

impl Generator {
    pub fn new(
        registry: VendorRegistry,
        renderer: TemplateRenderer,
        llm: Arc<dyn TextGeneration>,
        default_api_key: String,
    ) -> Self {
        Self {
            registry,
            renderer,
            llm,
            default_api_key,
        }
    }

    pub fn registry(&self) -> &VendorRegistry {
        &self.registry
    }

    /// Run one generation request. The strategy is selected by the presence
    /// of free-text requirements.
    pub async fn generate(&self, req: &GenerateRequest) -> Result<Generated, GenerateError> {
        let profile = self
            .registry
            .lookup(&req.vendor)
            .ok_or_else(|| GenerateError::UnknownVendor(req.vendor.clone()))?;

        match non_empty(&req.requirements) {
            None => self.generate_from_template(profile, req),
            Some(requirements) => {
                self.generate_from_requirements(profile, req, requirements)
                    .await
            }
        }
    }

    /// Deterministic path: all base fields must be supplied up front
    fn generate_from_template(
        &self,
        profile: &VendorProfile,
        req: &GenerateRequest,
    ) -> Result<Generated, GenerateError> {
        for (field, value) in [
            ("hostname", &req.hostname),
            ("mgmt_ip", &req.mgmt_ip),
            ("mgmt_mask", &req.mgmt_mask),
        ] {
            if non_empty(value).is_none() {
                return Err(GenerateError::MissingField(field));
            }
        }

        let vars = resolver::resolve(profile, req)?;
        let config = self
            .renderer
            .render(&TemplateRenderer::template_name(profile.id), &vars)?;

        tracing::info!(vendor = profile.id, hostname = %vars.hostname, "rendered template config");

        Ok(Generated {
            config,
            vendor: profile.display_name.to_string(),
            hostname: vars.hostname.clone(),
            variables: vars,
        })
    }

    /// Inference-assisted path: only the hostname is required up front, and
    /// even that falls back to a placeholder. Inferred values overwrite the
    /// working input before vendor-conditional validation runs, so a
    /// required field satisfied only by inference still passes.
    async fn generate_from_requirements(
        &self,
        profile: &VendorProfile,
        req: &GenerateRequest,
        requirements: &str,
    ) -> Result<Generated, GenerateError> {
        let api_key = non_empty(&req.api_key)
            .map(str::to_string)
            .unwrap_or_else(|| self.default_api_key.clone());
        if api_key.is_empty() {
            return Err(GenerateError::Credential(
                "no API key provided for the text-generation service".to_string(),
            ));
        }

        let mut working = req.clone();
        if non_empty(&working.hostname).is_none() {
            working.hostname = Some(PLACEHOLDER_HOSTNAME.to_string());
        }

        let plan = infer_plan(self.llm.as_ref(), profile, requirements, &api_key).await?;
        apply_plan(&mut working, &plan);

        let vars = resolver::resolve(profile, &working)?;
        let user_prompt = build_generation_prompt(profile, &vars, requirements, &plan.constructs);

        tracing::info!(
            vendor = profile.id,
            hostname = %vars.hostname,
            constructs = plan.constructs.len(),
            "generating config from requirements"
        );

        let text = self
            .llm
            .complete(CompletionParams {
                api_key: &api_key,
                system_prompt: SCRIPT_SYSTEM_PROMPT,
                user_prompt: &user_prompt,
                temperature: SCRIPT_TEMPERATURE,
                max_tokens: SCRIPT_MAX_TOKENS,
                structured: false,
            })
            .await?;

        Ok(Generated {
            config: strip_code_fences(&text),
            vendor: profile.display_name.to_string(),
            hostname: vars.hostname.clone(),
            variables: vars,
        })
    }
}

/// Inferred values win over anything the caller typed or defaulted
fn apply_plan(working: &mut GenerateRequest, plan: &InferredPlan) {
    if let Some(v) = &plan.hostname {
        working.hostname = Some(v.clone());
    }
    if let Some(v) = &plan.mgmt_ip {
        working.mgmt_ip = Some(v.clone());
    }
    if let Some(v) = &plan.mgmt_mask {
        working.mgmt_mask = Some(v.clone());
    }
    if let Some(v) = plan.mgmt_vlan {
        working.mgmt_vlan = Some(v);
    }
    if let Some(v) = &plan.mgmt_interface {
        working.mgmt_interface = Some(v.clone());
    }
    if let Some(v) = &plan.gateway {
        working.gateway = Some(v.clone());
    }
}

const SCRIPT_SYSTEM_PROMPT: &str = "You are a senior network engineer. \
Produce a complete, deployable configuration script for the requested device. \
Output only the configuration commands, without commentary.";

fn build_generation_prompt(
    profile: &VendorProfile,
    vars: &CanonicalVariables,
    requirements: &str,
    constructs: &[AuxiliaryConstruct],
) -> String {
    let mut prompt = format!(
        "Generate a configuration script for a {} device.\n\n\
         Base management settings:\n\
         - hostname: {}\n\
         - management IP: {}\n\
         - subnet mask: {} (/{})\n",
        profile.display_name, vars.hostname, vars.mgmt_ip, vars.mgmt_mask, vars.mgmt_mask_cidr
    );

    if let Some(vlan) = vars.mgmt_vlan {
        prompt.push_str(&format!("- management VLAN: {}\n", vlan));
    }
    if let Some(interface) = &vars.mgmt_interface {
        prompt.push_str(&format!("- management interface: {}\n", interface));
    }
    if let Some(port) = &vars.mgmt_port {
        prompt.push_str(&format!("- management port: {}\n", port));
    }
    if let Some(gateway) = &vars.gateway {
        prompt.push_str(&format!("- default gateway: {}\n", gateway));
    }

    prompt.push_str(&format!("\nRequirements:\n{}\n", requirements));

    if !constructs.is_empty() {
        prompt.push_str("\nAdditional elements to configure:\n");
        for construct in constructs {
            prompt.push_str(&format!("- {}\n", construct));
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StubLlm {
        plan: &'static str,
        script: &'static str,
    }

    #[async_trait]
    impl TextGeneration for StubLlm {
        async fn complete(&self, params: CompletionParams<'_>) -> Result<String, LlmError> {
            Ok(if params.structured {
                self.plan.to_string()
            } else {
                self.script.to_string()
            })
        }
    }

    const CISCO_TEMPLATE: &str = "hostname {{ hostname }}\n\
        interface Vlan{{ mgmt_vlan }}\n \
        ip address {{ mgmt_ip }} {{ mgmt_mask }}\n\
        ip default-gateway {{ gateway }}";

    fn test_generator(llm: StubLlm) -> Generator {
        let renderer = TemplateRenderer::from_raw(&[("cisco_base.j2", CISCO_TEMPLATE)]).unwrap();
        Generator::new(
            VendorRegistry::builtin(),
            renderer,
            Arc::new(llm),
            "test-key".to_string(),
        )
    }

    fn idle_llm() -> StubLlm {
        StubLlm {
            plan: "{}",
            script: "",
        }
    }

    #[tokio::test]
    async fn test_deterministic_path_renders_with_defaults() {
        let generator = test_generator(idle_llm());
        let req = GenerateRequest {
            vendor: "cisco".to_string(),
            hostname: Some("SW-HQ-01".to_string()),
            mgmt_ip: Some("192.168.10.254".to_string()),
            mgmt_mask: Some("255.255.255.0".to_string()),
            ..Default::default()
        };

        let generated = generator.generate(&req).await.unwrap();
        assert_eq!(generated.vendor, "Cisco");
        assert_eq!(generated.hostname, "SW-HQ-01");
        assert_eq!(generated.variables.mgmt_vlan, Some(100));
        assert_eq!(generated.variables.mgmt_interface.as_deref(), Some("Gi1/0/1"));
        assert_eq!(generated.variables.mgmt_mask_cidr, "24");
        assert!(generated.config.starts_with("hostname SW-HQ-01"));
        assert!(generated.config.contains("ip address 192.168.10.254 255.255.255.0"));
    }

    #[tokio::test]
    async fn test_unknown_vendor_rejected_before_field_validation() {
        let generator = test_generator(idle_llm());
        let req = GenerateRequest {
            vendor: "zyxel".to_string(),
            ..Default::default()
        };

        let err = generator.generate(&req).await.unwrap_err();
        assert!(matches!(err, GenerateError::UnknownVendor(_)), "got: {:?}", err);
    }

    #[tokio::test]
    async fn test_deterministic_path_requires_all_base_fields() {
        let generator = test_generator(idle_llm());
        let req = GenerateRequest {
            vendor: "cisco".to_string(),
            hostname: Some("SW-01".to_string()),
            mgmt_ip: Some("192.168.1.1".to_string()),
            // mgmt_mask intentionally absent and no requirements supplied
            ..Default::default()
        };

        let err = generator.generate(&req).await.unwrap_err();
        assert!(
            matches!(err, GenerateError::MissingField("mgmt_mask")),
            "got: {:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_missing_template_surfaces_render_error() {
        let generator = test_generator(idle_llm());
        let req = GenerateRequest {
            vendor: "juniper".to_string(),
            hostname: Some("JNPR-01".to_string()),
            mgmt_ip: Some("192.168.10.1".to_string()),
            mgmt_mask: Some("255.255.255.0".to_string()),
            ..Default::default()
        };

        let err = generator.generate(&req).await.unwrap_err();
        assert!(matches!(err, GenerateError::Render(_)), "got: {:?}", err);
        assert!(err.to_string().contains("juniper_base.j2"), "got: {}", err);
    }

    #[tokio::test]
    async fn test_inferred_values_override_raw_input() {
        let generator = test_generator(StubLlm {
            plan: r#"{
                "hostname": "SW-01",
                "mgmt_ip": "192.168.1.1",
                "mgmt_mask": "255.255.255.0",
                "mgmt_vlan": 50,
                "mgmt_interface": "Gi0/1",
                "gateway": "192.168.1.254"
            }"#,
            script: "hostname SW-01\nend",
        });

        // Conflicting values in the raw input must all lose to the plan
        let req = GenerateRequest {
            vendor: "cisco".to_string(),
            hostname: Some("OLD-NAME".to_string()),
            mgmt_ip: Some("10.9.9.9".to_string()),
            mgmt_mask: Some("255.0.0.0".to_string()),
            mgmt_vlan: Some(999),
            mgmt_interface: Some("Gi9/9".to_string()),
            gateway: Some("10.9.9.1".to_string()),
            requirements: Some("an access switch for the branch office".to_string()),
            ..Default::default()
        };

        let generated = generator.generate(&req).await.unwrap();
        let vars = &generated.variables;
        assert_eq!(vars.hostname, "SW-01");
        assert_eq!(vars.mgmt_ip, "192.168.1.1");
        assert_eq!(vars.mgmt_mask, "255.255.255.0");
        assert_eq!(vars.mgmt_vlan, Some(50));
        assert_eq!(vars.mgmt_interface.as_deref(), Some("Gi0/1"));
        assert_eq!(vars.gateway.as_deref(), Some("192.168.1.254"));
        assert_eq!(generated.config, "hostname SW-01\nend");
    }

    #[tokio::test]
    async fn test_inference_path_defaults_hostname_placeholder() {
        let generator = test_generator(StubLlm {
            plan: r#"{"mgmt_ip": "10.0.0.1", "mgmt_vlan": 10}"#,
            script: "config",
        });

        let req = GenerateRequest {
            vendor: "cisco".to_string(),
            requirements: Some("a switch".to_string()),
            ..Default::default()
        };

        let generated = generator.generate(&req).await.unwrap();
        assert_eq!(generated.hostname, "Device-01");
        // Vendor defaults still back-fill what inference left open
        assert_eq!(generated.variables.mgmt_interface.as_deref(), Some("Gi1/0/1"));
    }

    #[tokio::test]
    async fn test_inference_path_strips_fenced_script() {
        let generator = test_generator(StubLlm {
            plan: r#"{"mgmt_ip": "10.0.0.1"}"#,
            script: "```\nhostname SW-01\n\nend\n```",
        });

        let req = GenerateRequest {
            vendor: "cisco".to_string(),
            requirements: Some("a switch".to_string()),
            ..Default::default()
        };

        let generated = generator.generate(&req).await.unwrap();
        assert_eq!(generated.config, "hostname SW-01\n\nend");
    }

    #[tokio::test]
    async fn test_inference_path_without_any_key_is_a_credential_error() {
        let renderer = TemplateRenderer::from_raw(&[]).unwrap();
        let generator = Generator::new(
            VendorRegistry::builtin(),
            renderer,
            Arc::new(idle_llm()),
            String::new(),
        );

        let req = GenerateRequest {
            vendor: "cisco".to_string(),
            requirements: Some("a switch".to_string()),
            ..Default::default()
        };

        let err = generator.generate(&req).await.unwrap_err();
        assert!(matches!(err, GenerateError::Credential(_)), "got: {:?}", err);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(
            strip_code_fences("```\nhostname SW-01\n\nend\n```"),
            "hostname SW-01\n\nend"
        );
        assert_eq!(
            strip_code_fences("```cisco\nhostname SW-01\n```"),
            "hostname SW-01"
        );
        // Unterminated fence: only the opening marker is removed
        assert_eq!(strip_code_fences("```\nhostname SW-01"), "hostname SW-01");
        // No fences: unchanged
        assert_eq!(strip_code_fences("hostname SW-01\nend"), "hostname SW-01\nend");
        // Interior delimiter-like text is preserved
        assert_eq!(
            strip_code_fences("```\nbanner ```motd```\nend\n```"),
            "banner ```motd```\nend"
        );
    }

    #[test]
    fn test_generation_prompt_embeds_everything() {
        let registry = VendorRegistry::builtin();
        let profile = registry.lookup("cisco").unwrap();
        let vars = CanonicalVariables {
            hostname: "SW-01".to_string(),
            mgmt_ip: "192.168.1.1".to_string(),
            mgmt_mask: "255.255.255.0".to_string(),
            mgmt_mask_cidr: "24".to_string(),
            mgmt_vlan: Some(50),
            mgmt_interface: Some("Gi0/1".to_string()),
            mgmt_port: None,
            gateway: Some("192.168.1.254".to_string()),
        };
        let constructs = vec![AuxiliaryConstruct::Routing {
            protocol: "ospf".to_string(),
            network: Some("10.0.0.0/8".to_string()),
            area: Some("0".to_string()),
        }];

        let prompt = build_generation_prompt(profile, &vars, "branch switch with OSPF", &constructs);
        assert!(prompt.contains("Cisco"));
        assert!(prompt.contains("hostname: SW-01"));
        assert!(prompt.contains("management VLAN: 50"));
        assert!(prompt.contains("branch switch with OSPF"));
        assert!(prompt.contains("Routing OSPF (network 10.0.0.0/8, area 0)"));
    }
}
