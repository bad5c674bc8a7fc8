use crate::constants;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One repaired input line: email, job title, free-text comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRow {
    pub email: String,
    pub job_title: String,
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::High => "High",
            Urgency::Medium => "Medium",
            Urgency::Low => "Low",
        }
    }

    /// Case- and whitespace-insensitive match against the allowed values
    pub fn parse_lenient(value: &str) -> Option<Self> {
        match squash(value).as_str() {
            "high" => Some(Urgency::High),
            "medium" => Some(Urgency::Medium),
            "low" => Some(Urgency::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersonaType {
    #[serde(rename = "Decision Maker")]
    DecisionMaker,
    Practitioner,
    Other,
}

impl PersonaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaType::DecisionMaker => "Decision Maker",
            PersonaType::Practitioner => "Practitioner",
            PersonaType::Other => "Other",
        }
    }

    /// Accepts "Decision Maker", "decision_maker", "DecisionMaker" and so on
    pub fn parse_lenient(value: &str) -> Option<Self> {
        match squash(value).as_str() {
            "decisionmaker" => Some(PersonaType::DecisionMaker),
            "practitioner" => Some(PersonaType::Practitioner),
            "other" => Some(PersonaType::Other),
            _ => None,
        }
    }
}

impl fmt::Display for PersonaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn squash(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Classification attached to a lead by the model (or by fallback)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub urgency: Urgency,
    pub persona_type: PersonaType,
    pub summary: String,
}

impl EnrichmentResult {
    /// Low-confidence but still sales-actionable default
    pub fn fallback() -> Self {
        Self {
            urgency: Urgency::Medium,
            persona_type: PersonaType::Other,
            summary: constants::FALLBACK_SUMMARY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    #[serde(rename = "Strategic Sales")]
    StrategicSales,
    #[serde(rename = "Enterprise Sales")]
    EnterpriseSales,
    #[serde(rename = "Sales Development")]
    SalesDevelopment,
    #[serde(rename = "Nurture Campaign")]
    NurtureCampaign,
}

impl Team {
    pub fn as_str(&self) -> &'static str {
        match self {
            Team::StrategicSales => constants::STRATEGIC_SALES,
            Team::EnterpriseSales => constants::ENTERPRISE_SALES,
            Team::SalesDevelopment => constants::SALES_DEVELOPMENT,
            Team::NurtureCampaign => constants::NURTURE_CAMPAIGN,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal record written to the output artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedLead {
    pub email: String,
    pub job_title: String,
    pub comment: String,
    pub urgency: Urgency,
    pub persona_type: PersonaType,
    pub summary: String,
    pub assigned_team: Team,
}

impl EnrichedLead {
    pub fn new(row: LeadRow, enrichment: EnrichmentResult, assigned_team: Team) -> Self {
        Self {
            email: row.email,
            job_title: row.job_title,
            comment: row.comment,
            urgency: enrichment.urgency,
            persona_type: enrichment.persona_type,
            summary: enrichment.summary,
            assigned_team,
        }
    }
}
