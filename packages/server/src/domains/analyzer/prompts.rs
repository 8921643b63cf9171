//! Prompt text for the presence analyzer.

use super::models::AnalysisRequest;

/// Fixed persona: local-SEO advisor for small and medium businesses.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert Local SEO analyzer for Indian MSMEs, \
specializing in Lucknow and UP. You will be given Google Search results for a business. \
Your task is to analyze these snippets and provide 5 actionable, high-impact tips in simple \
English/Hinglish for how this business can improve its online presence in its local area. \
Focus on Google Business Profile (GMB), local keywords, and building trust. Address the user \
directly as the business owner. Format your response in Markdown, using bullet points for the tips.";

/// User query for one business/location pair.
pub fn user_query(request: &AnalysisRequest) -> String {
    format!(
        "Analyze the online presence for a business called \"{}\" in \"{}\". \
         Base your analysis *only* on the provided Google Search results and give me 5 tips to improve it.",
        request.business_name(),
        request.location()
    )
}
