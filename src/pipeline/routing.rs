use crate::types::{PersonaType, Team, Urgency};

/// Map a classification to the owning sales team. First matching rule wins.
pub fn assign_team(urgency: Urgency, persona: PersonaType) -> Team {
    match (urgency, persona) {
        (Urgency::High, PersonaType::DecisionMaker) => Team::StrategicSales,
        (Urgency::High, PersonaType::Practitioner) => Team::EnterpriseSales,
        (Urgency::Medium, _) => Team::SalesDevelopment,
        _ => Team::NurtureCampaign,
    }
}
