use serde::{Deserialize, Serialize};

use crate::models::lenient;

/// Structured requirements extracted from a job description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRequirements {
    #[serde(default, deserialize_with = "lenient")]
    pub core_skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub preferred_skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub experience_level: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub education_requirements: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub industry_domain: Option<String>,
    #[serde(default)]
    pub raw_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_requirements_full_deserializes() {
        let json = r#"{
            "core_skills": ["Rust", "distributed systems"],
            "preferred_skills": ["Kafka"],
            "experience_level": "Senior",
            "education_requirements": ["BSc Computer Science"],
            "industry_domain": "Fintech"
        }"#;
        let req: JobRequirements = serde_json::from_str(json).unwrap();
        assert_eq!(req.core_skills.len(), 2);
        assert_eq!(req.experience_level.as_deref(), Some("Senior"));
        assert_eq!(req.industry_domain.as_deref(), Some("Fintech"));
    }

    #[test]
    fn test_job_requirements_empty_object() {
        let req: JobRequirements = serde_json::from_str("{}").unwrap();
        assert!(req.core_skills.is_empty());
        assert!(req.experience_level.is_none());
    }
}
