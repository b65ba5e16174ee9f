//! Prompt for accident photo analysis

/// Build the analysis prompt sent alongside the encoded photos
pub fn build_vision_prompt(damage_description: &str, incident_description: &str) -> String {
    format!(
        r#"Analyze the following accident photos and compare them with the provided descriptions.

Damage description: {damage_description}
Incident description: {incident_description}

Provide:
1. A detailed analysis of the damage visible in the photos
2. A consistency score (0-1) between the photos and the written descriptions
3. An assessment of damage severity and an estimated repair cost
4. Any discrepancies or concerns noted

Focus on:
- Vehicle damage patterns
- Consistency with the reported incident
- Evidence of impact direction and force
- Any signs of pre-existing damage"#
    )
}
