//! Minimal datasets served when the JSON files cannot be read.

use super::catalog::Catalog;
use super::flows::FlowCatalog;

const FALLBACK_DOMAINS: &str = r#"{
  "meta": {"version": "fallback", "defaultMode": "plain"},
  "domains": [
    {
      "id": "administration",
      "name": "Administration",
      "emoji": "🏛️",
      "description": "Resident registration and certificates",
      "documents": [
        {
          "id": "moving_notice",
          "name": "Moving notice",
          "description": "Report of a change of address",
          "inputFields": [
            {"id": "name", "label": "Full name", "source": "user"},
            {"id": "old_address", "label": "Previous address", "source": "shared"},
            {"id": "new_address", "label": "New address", "source": "user"},
            {"id": "birth_date", "label": "Date of birth", "source": "mynumber"},
            {"id": "household", "label": "Household head", "source": "derived"},
            {"id": "reason", "label": "Reason for moving", "source": "ai"}
          ]
        }
      ],
      "modes": {
        "plain": {"title": "Plain", "description": "Paper forms turned into web forms"},
        "smart": {"title": "Smart", "description": "Known data reused across forms"},
        "ai": {"title": "AI", "description": "Minimal input, the rest inferred"}
      },
      "demoMetrics": {
        "dailyVolume": 1000,
        "averageTimePerCase": 15,
        "reductionRates": {"plain": 0.05, "smart": 0.3, "ai": 0.6},
        "timeReductionRates": {"plain": 0.1, "smart": 0.4, "ai": 0.7},
        "costReductionPercentage": {"plain": 0.05, "smart": 0.3, "ai": 0.6},
        "administrativeDependency": 0,
        "implementationCost": {"plain": 0, "smart": 50000000, "ai": 150000000},
        "annualMaintenanceCost": {"plain": 0, "smart": 5000000, "ai": 15000000},
        "impactOnOtherDomains": {}
      }
    }
  ]
}"#;

const FALLBACK_FLOWS: &str = r#"{
  "baseQuestions": [
    {"id": "name", "label": "Full name", "type": "text", "required": true, "placeholder": "Taro Yamada"},
    {"id": "insurance", "label": "Insurance type", "type": "select", "required": true, "options": [
      {"value": "kokumin", "label": "National health insurance"},
      {"value": "shahou", "label": "Employee health insurance"}
    ]}
  ],
  "checklist": [
    {"id": "surgery", "label": "Had surgery", "key": "surgery"},
    {"id": "hce", "label": "Apply for high-cost care", "key": "hce"}
  ],
  "documents": {
    "base": [
      {"id": "discharge_certificate", "name": "Discharge certificate", "description": "Certifies the admission period"}
    ],
    "surgery": [
      {"id": "surgery_consent", "name": "Surgery consent", "description": "Consent to the operation"}
    ],
    "hce": [
      {"id": "hce_application", "name": "Limit certificate application", "description": "High-cost care application form"}
    ],
    "claim": [],
    "proxy": [],
    "expensive": [],
    "transfer": []
  },
  "modes": {
    "plain": {"title": "Plain", "description": "Paper forms turned into web forms"},
    "smart": {"title": "Smart", "description": "Conditional automation"},
    "ai": {"title": "AI", "description": "Minimal input, situation sorted automatically"}
  }
}"#;

pub fn fallback_catalog() -> Catalog {
    Catalog::from_json(FALLBACK_DOMAINS).unwrap_or_default()
}

pub fn fallback_flows() -> FlowCatalog {
    FlowCatalog::from_json(FALLBACK_FLOWS).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_datasets_parse() {
        Catalog::from_json(FALLBACK_DOMAINS).expect("fallback domains parse");
        let flows = FlowCatalog::from_json(FALLBACK_FLOWS).expect("fallback flows parse");
        assert_eq!(flows.base_documents().len(), 1);
        assert_eq!(flows.checklist.len(), 2);
    }

    #[test]
    fn fallback_catalog_has_metrics() {
        let catalog = fallback_catalog();
        let domain = catalog.domain("administration").expect("administration present");
        assert!(domain.demo_metrics.is_some());
        assert_eq!(domain.documents[0].declared_field_count(), 6);
    }
}
