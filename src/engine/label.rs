//! Officer-facing label mapping

use crate::domain::{FinalLabel, FusionVerdict, VisualConfidence};

pub struct LabelMapper;

impl LabelMapper {
    /// Map a verdict and visual grade to the label shown to officers.
    ///
    /// A missing tag on an enrolled vehicle is graded by how well cameras
    /// saw the car; verdicts without a dedicated label pass through.
    pub fn map(
        verdict: Option<FusionVerdict>,
        confidence: VisualConfidence,
        has_gotid: bool,
    ) -> FinalLabel {
        let corroborated = confidence.is_corroborating();

        let Some(verdict) = verdict else {
            return FinalLabel::Unknown;
        };

        match verdict {
            FusionVerdict::Match if corroborated => FinalLabel::MatchStrong,
            FusionVerdict::Match => FinalLabel::MatchWeakVisual,
            FusionVerdict::UuidMissing if has_gotid && corroborated => {
                FinalLabel::CloneMissingTagStrong
            }
            FusionVerdict::UuidMissing if has_gotid => FinalLabel::CloneMissingTagWeak,
            FusionVerdict::UuidMissing => FinalLabel::UuidMissing,
            FusionVerdict::Mismatch | FusionVerdict::MismatchPubkey => FinalLabel::CloneSuspect,
            FusionVerdict::CryptoFail | FusionVerdict::CounterRollback => FinalLabel::CloneCrypto,
            FusionVerdict::Tamper if corroborated => FinalLabel::TamperStrong,
            FusionVerdict::Tamper => FinalLabel::TamperWeak,
            FusionVerdict::NotEnrolled => FinalLabel::NotEnrolled,
            FusionVerdict::UnknownTag => FinalLabel::UnknownTag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CONFIDENCE: [VisualConfidence; 4] = [
        VisualConfidence::None,
        VisualConfidence::Weak,
        VisualConfidence::Medium,
        VisualConfidence::Strong,
    ];

    #[test]
    fn test_match_labels() {
        use VisualConfidence::*;
        let label = |c| LabelMapper::map(Some(FusionVerdict::Match), c, true);
        assert_eq!(label(Strong), FinalLabel::MatchStrong);
        assert_eq!(label(Medium), FinalLabel::MatchStrong);
        assert_eq!(label(Weak), FinalLabel::MatchWeakVisual);
        assert_eq!(label(None), FinalLabel::MatchWeakVisual);
    }

    #[test]
    fn test_missing_tag_labels() {
        let v = Some(FusionVerdict::UuidMissing);
        assert_eq!(
            LabelMapper::map(v, VisualConfidence::Medium, true),
            FinalLabel::CloneMissingTagStrong
        );
        assert_eq!(
            LabelMapper::map(v, VisualConfidence::Weak, true),
            FinalLabel::CloneMissingTagWeak
        );
        assert_eq!(
            LabelMapper::map(v, VisualConfidence::Strong, false),
            FinalLabel::UuidMissing
        );
    }

    #[test]
    fn test_confidence_independent_labels() {
        for c in ALL_CONFIDENCE {
            assert_eq!(
                LabelMapper::map(Some(FusionVerdict::Mismatch), c, true),
                FinalLabel::CloneSuspect
            );
            assert_eq!(
                LabelMapper::map(Some(FusionVerdict::MismatchPubkey), c, true),
                FinalLabel::CloneSuspect
            );
            assert_eq!(
                LabelMapper::map(Some(FusionVerdict::CryptoFail), c, true),
                FinalLabel::CloneCrypto
            );
            assert_eq!(
                LabelMapper::map(Some(FusionVerdict::CounterRollback), c, true),
                FinalLabel::CloneCrypto
            );
            assert_eq!(
                LabelMapper::map(Some(FusionVerdict::NotEnrolled), c, false),
                FinalLabel::NotEnrolled
            );
            assert_eq!(
                LabelMapper::map(Some(FusionVerdict::UnknownTag), c, false),
                FinalLabel::UnknownTag
            );
            assert_eq!(LabelMapper::map(None, c, true), FinalLabel::Unknown);
        }
    }

    #[test]
    fn test_tamper_labels() {
        let v = Some(FusionVerdict::Tamper);
        assert_eq!(
            LabelMapper::map(v, VisualConfidence::Strong, true),
            FinalLabel::TamperStrong
        );
        assert_eq!(
            LabelMapper::map(v, VisualConfidence::None, true),
            FinalLabel::TamperWeak
        );
    }
}
