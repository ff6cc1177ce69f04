//! Fixed instruction template sent with every claim.
use verity_llm::ChatMessage;

use crate::claim::Claim;

pub const SYSTEM_PROMPT: &str = "You are a highly accurate fake news detection expert. Use the provided search results to decide if the claim is Fake or Not Fake.

Output Format:
- Verdict: Fake / Not Fake
- Confidence: (High / Medium / Low)
- Explanation: (Brief reasoning or fact-check)
- Source Links (if used): [List of URLs or 'Not Available']";

pub fn user_prompt(claim: &Claim, context: &str) -> String {
    format!(
        "Claim: {claim}\n\nSearch Results:\n{context}\n\nPlease analyze the above and respond in the specified format."
    )
}

/// System instructions followed by the claim and its search context.
pub fn build_messages(claim: &Claim, context: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(user_prompt(claim, context)),
    ]
}
