use anyhow::Result;
use tracing::debug;

use crate::minimax::MiniMax;

// Keep the prompt payload bounded; rtrvr can return very large page dumps
const MAX_RESEARCH_BYTES: usize = 100_000;

const SUMMARY_SYSTEM: &str = "You are a sales research analyst. Your job is to analyze raw web \
research data and produce a clean, structured intelligence brief about a prospect and their \
company.";

const PITCH_SYSTEM: &str = "You are a world-class sales copywriter. You write personalized \
outreach messages that get replies. Every pitch you write references specific details about \
the prospect — never generic.";

/// Summarize the raw research payload into a structured intelligence brief.
/// The requested section headings and bullet labels are the ones the field
/// extractor matches on save.
pub async fn summarize_research(
    minimax: &MiniMax,
    research: &serde_json::Value,
    email: &str,
) -> Result<String> {
    let mut raw_text = serde_json::to_string_pretty(research)?;
    if raw_text.len() > MAX_RESEARCH_BYTES {
        let mut cut = MAX_RESEARCH_BYTES;
        while !raw_text.is_char_boundary(cut) {
            cut -= 1;
        }
        raw_text.truncate(cut);
        raw_text.push_str("\n... [truncated]");
        debug!("research payload truncated to {MAX_RESEARCH_BYTES} bytes");
    }

    let prompt = format!(
        "Analyze the following raw research data gathered about the person with email: {email}\n\n\
         Create a structured summary with these sections:\n\n\
         ## Person Profile\n\
         - Name\n- Title/Role\n- Seniority level\n- Background & experience\n- Key facts\n\n\
         ## Company Overview\n\
         - Company name\n- Industry\n- What they do (1-2 sentences)\n\
         - Main products/services\n- Company size & stage\n\
         - Funding (if known)\n- HQ location\n- Recent news\n\n\
         ## Pain Points & Opportunities\n\
         - List the top 3-5 challenges or pain points this company likely faces\n\n\
         ## Key Talking Points\n\
         - What topics would resonate with this person in a sales conversation?\n\
         - What are they likely focused on right now?\n\n\
         If some information wasn't found, note it as 'Not found' rather than making it up.\n\n\
         ---\nRAW RESEARCH DATA:\n{raw_text}"
    );

    minimax.chat(SUMMARY_SYSTEM, &prompt).await
}

/// Generate a personalized sales pitch, formatted as a ready-to-send email.
pub async fn generate_pitch(
    minimax: &MiniMax,
    summary: &str,
    product_description: &str,
) -> Result<String> {
    let prompt = format!(
        "Using the prospect research below, write a compelling personalized sales pitch \
         formatted as an email.\n\n\
         Rules:\n\
         - Start with 'Hi [First Name],' using their ACTUAL first name from the research\n\
         - Reference SPECIFIC details about the prospect's company (company name, products, recent news)\n\
         - Mention the prospect BY NAME and their ROLE/TITLE naturally in the body\n\
         - Identify a pain point relevant to THEIR situation\n\
         - Position the product as the solution to that specific pain\n\
         - Keep it concise: 150-200 words max\n\
         - Tone: professional, warm, not pushy\n\
         - Include a clear low-friction CTA (15-min call, quick demo)\n\
         - NO filler phrases like 'I hope this finds you well'\n\
         - Write it as a ready-to-send email (greeting, body, sign-off)\n\n\
         Structure:\n\
         1. Greeting — 'Hi [First Name],'\n\
         2. Hook — reference something specific about them/their company\n\
         3. Pain — a challenge they likely face\n\
         4. Solution — how the product solves that pain\n\
         5. Proof — a brief credibility point\n\
         6. CTA — clear, easy next step\n\
         7. Sign-off\n\n\
         ---\n\
         PROSPECT RESEARCH:\n{summary}\n\n\
         ---\n\
         PRODUCT BEING PITCHED:\n{product_description}\n"
    );

    minimax.chat(PITCH_SYSTEM, &prompt).await
}
