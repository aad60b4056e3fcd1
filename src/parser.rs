use std::sync::LazyLock;

use regex::Regex;

static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-*]\s*(.+)").unwrap());

/// Structured fields pulled out of the markdown intelligence brief.
/// Everything is optional: extraction is best-effort and never fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProspectFields {
    pub name: Option<String>,
    pub title: Option<String>,
    pub seniority: Option<String>,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub company_what: Option<String>,
    pub company_size: Option<String>,
    pub company_funding: Option<String>,
    pub company_hq: Option<String>,
    pub recent_news: Option<String>,
    pub pain_points: Vec<String>,
    pub talking_points: Vec<String>,
}

/// Extract labeled scalars and bullet-list sections from a summary.
/// Missing or malformed sections degrade to absent fields, not errors.
pub fn parse_summary(summary: &str) -> ProspectFields {
    ProspectFields {
        name: grab(r"[-*]\s*Name[:\s]+(.+)", summary),
        title: grab(r"[-*]\s*Title(?:/Role)?[:\s]+(.+)", summary),
        seniority: grab(r"[-*]\s*Seniority[:\s]+(.+)", summary),
        company_name: grab(r"[-*]\s*Company\s*name[:\s]+(.+)", summary),
        industry: grab(r"[-*]\s*Industry[:\s]+(.+)", summary),
        company_what: grab(r"[-*]\s*What they do[:\s]+(.+)", summary),
        company_size: grab(r"[-*]\s*Company\s*size[:\s]+(.+)", summary),
        company_funding: grab(r"[-*]\s*Funding[:\s]+(.+)", summary),
        company_hq: grab(r"[-*]\s*HQ\s*location[:\s]+(.+)", summary),
        recent_news: grab(r"[-*]\s*Recent\s*news[:\s]+(.+)", summary),
        pain_points: grab_list(r"##\s*Pain Points", summary),
        talking_points: grab_list(r"##\s*Key Talking Points", summary),
    }
}

/// First case-insensitive match of `pattern`, capture group 1 trimmed.
fn grab(pattern: &str, text: &str) -> Option<String> {
    let re = Regex::new(&format!("(?i){pattern}")).unwrap();
    re.captures(text).map(|c| c[1].trim().to_string())
}

/// Bullet lines directly under a `##` heading, until the first non-bullet line.
fn grab_list(heading: &str, text: &str) -> Vec<String> {
    let block_re = Regex::new(&format!(r"(?i){heading}[^\n]*\n((?:\s*[-*]\s*.+\n?)+)")).unwrap();
    let Some(block) = block_re.captures(text) else {
        return Vec::new();
    };
    BULLET_RE
        .captures_iter(&block[1])
        .map(|c| c[1].trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    const BRIEF: &str = "\
## Person Profile
- Name: Jane Doe
- Title/Role: VP of Sales
- Seniority level: Executive
- Background & experience: 12 years in B2B SaaS

## Company Overview
- Company name: Acme Robotics
- Industry: Industrial automation
- What they do: Builds robotic arms for mid-size factories.
- Company size: 200-500 employees
- Funding: Series C, $80M
- HQ location: Austin, TX
- Recent news: Opened a new plant in Ohio

## Pain Points & Opportunities
- Slow onboarding
- High churn

## Key Talking Points
- Expansion into Europe
- Hiring push in sales
";

    #[test]
    fn scalar_fields() {
        let f = parse_summary(BRIEF);
        assert_eq!(f.name.as_deref(), Some("Jane Doe"));
        assert_eq!(f.title.as_deref(), Some("VP of Sales"));
        assert_eq!(f.company_name.as_deref(), Some("Acme Robotics"));
        assert_eq!(f.industry.as_deref(), Some("Industrial automation"));
        assert_eq!(
            f.company_what.as_deref(),
            Some("Builds robotic arms for mid-size factories.")
        );
        assert_eq!(f.company_size.as_deref(), Some("200-500 employees"));
        assert_eq!(f.company_funding.as_deref(), Some("Series C, $80M"));
        assert_eq!(f.company_hq.as_deref(), Some("Austin, TX"));
        assert_eq!(f.recent_news.as_deref(), Some("Opened a new plant in Ohio"));
    }

    #[test]
    fn minimal_two_liner() {
        let f = parse_summary("- Name: Jane Doe\n- Title: VP of Sales");
        assert_eq!(f.name.as_deref(), Some("Jane Doe"));
        assert_eq!(f.title.as_deref(), Some("VP of Sales"));
        assert_eq!(f.seniority, None);
    }

    #[test]
    fn list_fields() {
        let f = parse_summary(BRIEF);
        assert_eq!(f.pain_points, vec!["Slow onboarding", "High churn"]);
        assert_eq!(
            f.talking_points,
            vec!["Expansion into Europe", "Hiring push in sales"]
        );
    }

    #[test]
    fn heading_without_bullets_is_empty() {
        let f = parse_summary("## Pain Points\n\nNothing listed here.\n");
        assert!(f.pain_points.is_empty());
    }

    #[test]
    fn asterisk_bullets() {
        let f = parse_summary("* Name: Jo Smith\n## Pain Points\n* One\n* Two");
        assert_eq!(f.name.as_deref(), Some("Jo Smith"));
        assert_eq!(f.pain_points, vec!["One", "Two"]);
    }

    #[test]
    fn case_insensitive_labels() {
        let f = parse_summary("- NAME: Jo\n## pain points\n- x");
        assert_eq!(f.name.as_deref(), Some("Jo"));
        assert_eq!(f.pain_points, vec!["x"]);
    }

    #[test]
    fn list_stops_at_first_non_bullet_line() {
        let f = parse_summary("## Pain Points\n- a\n- b\nSome prose.\n- not collected");
        assert_eq!(f.pain_points, vec!["a", "b"]);
    }

    #[test]
    fn garbage_yields_all_absent() {
        let f = parse_summary("}{ random ][ noise\n\n1234 !!");
        assert_eq!(f, ProspectFields::default());
    }

    #[test]
    fn empty_input() {
        let f = parse_summary("");
        assert_eq!(f, ProspectFields::default());
    }

    #[test]
    fn company_name_does_not_bleed_into_name() {
        // "Company name:" must not satisfy the bare "Name:" pattern
        let f = parse_summary("- Company name: Acme Robotics");
        assert_eq!(f.name, None);
        assert_eq!(f.company_name.as_deref(), Some("Acme Robotics"));
    }
}
