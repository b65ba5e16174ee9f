//! Best-effort extraction of structured data from free-form vision output
//!
//! Not every endpoint returns structured JSON; this module recovers a
//! consistency score and a damage assessment from plain text. The parsing is
//! deliberately lossy: callers must treat the output as heuristic.

use regex::Regex;

use crate::model::VisionResult;

/// Score assumed when no pattern matches
const DEFAULT_CONSISTENCY: f64 = 0.7;

/// Fallback when no damage-related text can be located
const DEFAULT_DAMAGE_ASSESSMENT: &str = "Based on automated analysis of the accident photos";

const DAMAGE_KEYWORDS: [&str; 4] = ["damage", "repair", "cost", "severity"];
const MAX_DAMAGE_LINES: usize = 3;

/// How a matched number maps into [0, 1]
#[derive(Clone, Copy)]
enum ScoreScale {
    /// Labeled value: ≤1 passes through, ≤100 is a percentage, else out-of-ten
    Labeled,
    /// Explicit "x/10" or "x out of 10"
    OutOfTen,
}

/// Normalize free-form vision output into a `VisionResult`
pub fn parse_vision_text(text: &str) -> VisionResult {
    VisionResult {
        analysis: text.to_string(),
        consistency_score: extract_consistency_score(text),
        damage_assessment: extract_damage_assessment(text),
    }
}

/// Ordered pattern attempts; the first match wins
fn extract_consistency_score(text: &str) -> f64 {
    let lowered = text.to_lowercase();

    let patterns: [(&str, ScoreScale); 5] = [
        (r"consistency[:\s]*(\d+(?:\.\d+)?)", ScoreScale::Labeled),
        (r"score[:\s]*(\d+(?:\.\d+)?)", ScoreScale::Labeled),
        (r"(\d+(?:\.\d+)?)%?\s*consistency", ScoreScale::Labeled),
        (r"(\d+(?:\.\d+)?)/10", ScoreScale::OutOfTen),
        (r"(\d+(?:\.\d+)?)\s*out\s*of\s*10", ScoreScale::OutOfTen),
    ];

    for (pattern, scale) in patterns {
        let re = Regex::new(pattern).unwrap();
        let Some(caps) = re.captures(&lowered) else {
            continue;
        };
        let Ok(value) = caps[1].parse::<f64>() else {
            continue;
        };

        let score = match scale {
            ScoreScale::Labeled => {
                if value <= 1.0 {
                    value
                } else if value <= 100.0 {
                    value / 100.0
                } else {
                    value / 10.0
                }
            }
            ScoreScale::OutOfTen => value / 10.0,
        };

        return score.clamp(0.0, 1.0);
    }

    DEFAULT_CONSISTENCY
}

/// Ordered label patterns, then keyword lines, then a generic placeholder
fn extract_damage_assessment(text: &str) -> String {
    let label_patterns = [
        r"(?i)damage[:\s]*([^.]+\.)",
        r"(?i)assessment[:\s]*([^.]+\.)",
        r"(?i)repair cost[:\s]*([^.]+\.)",
        r"(?i)estimated[:\s]*([^.]+\.)",
    ];

    for pattern in label_patterns {
        let re = Regex::new(pattern).unwrap();
        if let Some(caps) = re.captures(text) {
            return caps[1].trim().to_string();
        }
    }

    let damage_lines: Vec<&str> = text
        .lines()
        .filter(|line| {
            let lowered = line.to_lowercase();
            DAMAGE_KEYWORDS.iter().any(|k| lowered.contains(k))
        })
        .map(str::trim)
        .take(MAX_DAMAGE_LINES)
        .collect();

    if !damage_lines.is_empty() {
        return damage_lines.join(". ");
    }

    DEFAULT_DAMAGE_ASSESSMENT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labeled_decimal_passes_through() {
        let result = parse_vision_text("Overall consistency: 0.85 with the report");
        assert!((result.consistency_score - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn labeled_percentage_is_rescaled() {
        let result = parse_vision_text("Consistency score: 85");
        assert!((result.consistency_score - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_ten_is_rescaled() {
        let result = parse_vision_text("The photos rate 8/10 for matching the description");
        assert!((result.consistency_score - 0.8).abs() < f64::EPSILON);

        let result = parse_vision_text("I would rate this 7 out of 10");
        assert!((result.consistency_score - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn first_matching_pattern_wins() {
        // Both a labeled value and an out-of-ten value are present
        let result = parse_vision_text("consistency: 0.9, severity 3/10");
        assert!((result.consistency_score - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn unmatched_text_keeps_default() {
        let result = parse_vision_text("The vehicle shows frontal deformation.");
        assert!((result.consistency_score - DEFAULT_CONSISTENCY).abs() < f64::EPSILON);
    }

    #[test]
    fn score_is_always_clamped() {
        for text in [
            "consistency: 250",
            "score: 1500",
            "15/10",
            "consistency: 0.99999",
            "120 out of 10",
        ] {
            let score = parse_vision_text(text).consistency_score;
            assert!((0.0..=1.0).contains(&score), "{} -> {}", text, score);
        }
    }

    #[test]
    fn damage_label_pattern_extracts_sentence() {
        let result = parse_vision_text("Damage: severe deformation of the front bumper.");
        assert_eq!(result.damage_assessment, "severe deformation of the front bumper.");
    }

    #[test]
    fn damage_keyword_lines_are_joined() {
        let text = "The bumper shows damage\nlikely repair needed soon\nsky was clear\ncost is high\nmore cost detail";
        let result = parse_vision_text(text);
        assert_eq!(
            result.damage_assessment,
            "The bumper shows damage. likely repair needed soon. cost is high"
        );
    }

    #[test]
    fn no_damage_text_falls_back_to_placeholder() {
        let result = parse_vision_text("nothing relevant here");
        assert_eq!(result.damage_assessment, DEFAULT_DAMAGE_ASSESSMENT);
    }

    #[test]
    fn analysis_keeps_full_text() {
        let text = "consistency: 0.5 and some commentary";
        assert_eq!(parse_vision_text(text).analysis, text);
    }
}
