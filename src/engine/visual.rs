//! Visual corroboration scoring
//!
//! Scores how strongly the correlated ANPR and AI reads support the scan.
//! Uses the ANPR+AI table with the appearance bonus:
//!
//! | signal                         | points |
//! |--------------------------------|--------|
//! | event confidence >= 0.9        | 2      |
//! | event confidence >= 0.7        | 1      |
//! | event confidence unknown       | 1      |
//! | AI make or colour agrees       | 1      |
//!
//! Visual signals never change the fusion verdict.

use crate::domain::{normalize_label, AiEvent, AnprEvent, RegistryVehicle, VisualConfidence};

pub const STRONG_READ: f64 = 0.9;
pub const USABLE_READ: f64 = 0.7;

pub const APPEARANCE_MISMATCH_REASON: &str =
    "AI appearance does not fully match registry (make/colour).";

/// Score and grade of the correlated visual evidence.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualAssessment {
    pub score: u32,
    pub confidence: VisualConfidence,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppearanceMatch {
    /// Make or colour agrees
    Agrees,
    /// Nothing agrees and at least one non-empty pair disagrees
    Conflicts,
    /// Not enough data to compare
    Inconclusive,
}

pub struct VisualCorrelator;

impl VisualCorrelator {
    pub fn assess(
        anpr: Option<&AnprEvent>,
        ai: Option<&AiEvent>,
        registry: Option<&RegistryVehicle>,
    ) -> VisualAssessment {
        let mut score = 0;
        let mut reasons = Vec::new();

        if let Some(anpr) = anpr {
            score += confidence_points(anpr.effective_confidence());
        }

        if let Some(ai) = ai {
            score += confidence_points(ai.effective_confidence());

            if let Some(vehicle) = registry {
                match compare_appearance(ai, vehicle) {
                    AppearanceMatch::Agrees => score += 1,
                    AppearanceMatch::Conflicts => {
                        reasons.push(APPEARANCE_MISMATCH_REASON.to_string())
                    }
                    AppearanceMatch::Inconclusive => {}
                }
            }
        }

        VisualAssessment {
            score,
            confidence: VisualConfidence::from_score(score),
            reasons,
        }
    }
}

/// Points for one present event. Presence alone counts when the
/// confidence is unknown.
pub fn confidence_points(confidence: Option<f64>) -> u32 {
    match confidence {
        None => 1,
        Some(c) if c >= STRONG_READ => 2,
        Some(c) if c >= USABLE_READ => 1,
        Some(_) => 0,
    }
}

pub fn compare_appearance(ai: &AiEvent, vehicle: &RegistryVehicle) -> AppearanceMatch {
    let ai_make = normalize_label(ai.make.as_deref());
    let ai_colour = normalize_label(ai.colour.as_deref());
    let reg_make = normalize_label(vehicle.make.as_deref());
    let reg_colour = normalize_label(vehicle.colour.as_deref());

    let comparable = |a: &str, b: &str| !a.is_empty() && !b.is_empty();

    let make_matches = comparable(&ai_make, &reg_make) && ai_make == reg_make;
    let colour_matches = comparable(&ai_colour, &reg_colour) && ai_colour == reg_colour;

    if make_matches || colour_matches {
        return AppearanceMatch::Agrees;
    }

    let make_conflicts = comparable(&ai_make, &reg_make) && ai_make != reg_make;
    let colour_conflicts = comparable(&ai_colour, &reg_colour) && ai_colour != reg_colour;

    if make_conflicts || colour_conflicts {
        AppearanceMatch::Conflicts
    } else {
        AppearanceMatch::Inconclusive
    }
}
