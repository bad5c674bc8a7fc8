/// Team names produced by the router
pub const STRATEGIC_SALES: &str = "Strategic Sales";
pub const ENTERPRISE_SALES: &str = "Enterprise Sales";
pub const SALES_DEVELOPMENT: &str = "Sales Development";
pub const NURTURE_CAMPAIGN: &str = "Nurture Campaign";

/// Summary substituted whenever the model response can't be used
pub const FALLBACK_SUMMARY: &str = "Could not parse AI response.";

// Default artifact names, matching what the upload service hands back for download
pub const DEFAULT_CLEANED_FILE: &str = "leads_clean.csv";
pub const DEFAULT_OUTPUT_FILE: &str = "output_enriched_leads.json";
pub const DEFAULT_CONFIG_FILE: &str = "lead_router.toml";

// Gemini defaults
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_MODEL_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

// Upload service defaults
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_UPLOAD_DIR: &str = "inputs";
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Environment overrides applied on top of the config file
pub const ENV_MODEL: &str = "LEAD_ROUTER_MODEL";
pub const ENV_MODEL_URL: &str = "LEAD_ROUTER_MODEL_URL";
pub const ENV_PORT: &str = "LEAD_ROUTER_PORT";
pub const ENV_METRICS_PORT: &str = "LEAD_ROUTER_METRICS_PORT";

/// All team names in routing-table order
pub fn all_teams() -> Vec<&'static str> {
    vec![STRATEGIC_SALES, ENTERPRISE_SALES, SALES_DEVELOPMENT, NURTURE_CAMPAIGN]
}
