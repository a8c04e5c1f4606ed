// Prompt constants for every semantic extraction task.
// The JSON-only and evidence fragments come from llm_client::prompts.

/// Role for résumé and job-description parsing.
pub const DOCUMENT_ANALYST_ROLE: &str = "You are an expert technical recruiter who turns \
    résumés and job descriptions into structured records.";

/// Role for repository analysis and web-research synthesis.
pub const RESEARCH_ANALYST_ROLE: &str = "You are a technical research analyst who \
    summarises a candidate's public work from scraped and searched material.";

/// Role for comparison and the final decision.
pub const HIRING_ASSESSOR_ROLE: &str = "You are a senior hiring manager who assesses \
    candidates against job requirements fairly and conservatively.";

/// Résumé parsing. Replace `{resume_text}` and `{evidence_instruction}`.
pub const RESUME_PROMPT_TEMPLATE: &str = r#"Extract structured information from the résumé below.

Return a JSON object with this schema:
{
  "education": [{"institution": "", "degree": "", "field": "", "dates": ""}],
  "work_experience": [{"company": "", "title": "", "dates": "", "description": ""}],
  "skills": ["Rust"],
  "certifications": [""],
  "publications": [""],
  "projects": [""],
  "online_profiles": {"github": "", "linkedin": "", "website": ""}
}

List every online profile link or handle exactly as written on the résumé.
{evidence_instruction}

RÉSUMÉ:
{resume_text}"#;

/// Job-description parsing. Replace `{job_description}` and `{evidence_instruction}`.
pub const JOB_PROMPT_TEMPLATE: &str = r#"Extract the requirements from the job description below.

Return a JSON object with this schema:
{
  "core_skills": ["Rust"],
  "preferred_skills": ["Kubernetes"],
  "experience_level": "senior",
  "education_requirements": ["BSc in Computer Science or equivalent"],
  "industry_domain": "developer tooling"
}

Core skills are explicit must-haves. Preferred skills are phrased as "nice to have",
"bonus", "plus" or similar.
{evidence_instruction}

JOB DESCRIPTION:
{job_description}"#;

/// Repository analysis. Replace `{candidate_name}`, `{github_username}`, `{github_url}`,
/// `{repository_data}` and `{evidence_instruction}`.
pub const REPOSITORY_PROMPT_TEMPLATE: &str = r#"Analyse the public repositories of {candidate_name}
(username {github_username}, profile {github_url}).

Return a JSON object with this schema:
{
  "github_profile": {
    "username": "{github_username}",
    "url": "{github_url}",
    "primary_languages": ["Rust"],
    "activity_level": "high | medium | low"
  },
  "key_projects": [
    {"name": "", "description": "", "technologies": [""], "significance": ""}
  ],
  "technical_strengths": [""],
  "summary": ""
}

{evidence_instruction}

REPOSITORY DATA:
{repository_data}"#;

/// Web-research synthesis. Replace `{candidate_name}`, `{search_results}`, `{github_data}`
/// and `{evidence_instruction}`.
pub const WEB_RESEARCH_PROMPT_TEMPLATE: &str = r#"Synthesise what the web search results below say about {candidate_name}.

Search results may describe other people with the same name. Keep only results that
plausibly refer to this candidate, using the GitHub data to disambiguate.

Return a JSON object with this schema:
{
  "blog_posts": [{"title": "", "url": "", "summary": ""}],
  "conference_appearances": [{"event": "", "title": "", "url": ""}],
  "news_mentions": [{"title": "", "url": "", "summary": ""}],
  "social_profiles": {"github": "", "twitter": "", "linkedin": "", "stackoverflow": ""}
}

{evidence_instruction}

GITHUB DATA:
{github_data}

SEARCH RESULTS:
{search_results}"#;

/// Candidate comparison. Replace `{candidate_name}`, `{candidate_profile}`,
/// `{job_requirements}` and `{evidence_instruction}`.
pub const COMPARISON_PROMPT_TEMPLATE: &str = r#"Compare {candidate_name} against the job requirements.

Return a JSON object with this schema:
{
  "skill_matches": [{"skill": "", "match_level": "High | Medium | Low | None", "details": ""}],
  "experience_matches": [{"area": "", "match_level": "High | Medium | Low | None", "details": ""}],
  "education_matches": [{"requirement": "", "match_level": "High | Medium | Low | None", "details": ""}],
  "overall_skill_match": "Strong | Moderate | Weak",
  "overall_experience_match": "Strong | Moderate | Weak",
  "overall_education_match": "Strong | Moderate | Weak"
}

Cover every core skill and education requirement. Cite the résumé, repositories or
web research in each "details" field.
{evidence_instruction}

CANDIDATE PROFILE:
{candidate_profile}

JOB REQUIREMENTS:
{job_requirements}"#;

/// Final decision. Replace `{candidate_name}`, `{candidate_profile}`, `{job_requirements}`,
/// `{comparison_result}` and `{evidence_instruction}`.
pub const DECISION_PROMPT_TEMPLATE: &str = r#"Decide whether {candidate_name} fits the role.

Return a JSON object with this schema:
{
  "fit_score": "Strong Fit | Moderate Fit | Not a Fit",
  "reasoning": "",
  "recommendations": [""]
}

"fit_score" must be exactly one of the three labels. Recommendations are concrete next
steps for the hiring team, such as areas to probe in an interview.
{evidence_instruction}

CANDIDATE PROFILE:
{candidate_profile}

JOB REQUIREMENTS:
{job_requirements}

COMPARISON:
{comparison_result}"#;
