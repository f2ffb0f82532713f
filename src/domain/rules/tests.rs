// Unit tests for business rules

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use crate::domain::errors::*;
    use crate::domain::model::*;
    use crate::domain::rules::*;

    #[test]
    fn test_trim_defaults_to_first_five_seconds() {
        let range = TrimRules::resolve_range(None, None, 10.0).unwrap();
        assert_eq!(range, TimeRange { start: 0.0, end: 5.0 });
    }

    #[test]
    fn test_trim_default_end_is_capped_by_short_video() {
        let range = TrimRules::resolve_range(None, None, 3.5).unwrap();
        assert_eq!(range.end, 3.5);
    }

    #[test]
    fn test_trim_rejects_inverted_range() {
        let result = TrimRules::resolve_range(Some(5.0), Some(2.0), 10.0);
        assert_eq!(
            result,
            Err(DomainError::Validation(
                "End time must be greater than start time".to_string()
            ))
        );
    }

    #[test]
    fn test_trim_accepts_valid_range() {
        let range = TrimRules::resolve_range(Some(2.0), Some(5.0), 10.0).unwrap();
        assert_eq!(range.length(), 3.0);
    }

    #[test]
    fn test_trim_rejects_end_past_duration() {
        let result = TrimRules::resolve_range(Some(2.0), Some(12.0), 10.0);
        assert!(matches!(result, Err(DomainError::OutOfRange(_))));
        assert!(result.unwrap_err().is_validation());
    }

    #[test]
    fn test_trim_disambiguator_uses_whole_seconds() {
        let range = TimeRange::new(2.7, 5.2).unwrap();
        assert_eq!(TrimRules::disambiguator(&range), "2-5");
    }

    #[test]
    fn test_audio_cap_takes_shorter_length() {
        assert_eq!(AudioRules::capped_length(4.0, 10.0), 4.0);
        assert_eq!(AudioRules::capped_length(25.0, 10.0), 10.0);

        let window = AudioRules::capped_window(&MediaInfo::audio(25.0), &MediaInfo::video(10.0, 30.0, true)).unwrap();
        assert_eq!(window, TimeRange { start: 0.0, end: 10.0 });
    }

    #[test]
    fn test_audio_cap_rejects_empty_audio() {
        let result = AudioRules::capped_window(&MediaInfo::audio(0.0), &MediaInfo::video(10.0, 30.0, true));
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_frame_budget() {
        assert_eq!(FrameBudget::total_frames(30.0, 3.0), 90);
        assert_eq!(FrameBudget::total_frames(29.97, 10.0), 299);
        assert_eq!(FrameBudget::total_frames(30.0, 0.0), 0);
        assert_eq!(FrameBudget::total_frames(f64::NAN, 1.0), 0);
    }

    #[test]
    fn test_output_naming() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(OutputNaming::file_name(OperationTag::Merged, "", &at), "Merged__140507.mp4");
        assert_eq!(OutputNaming::file_name(OperationTag::Subclip, "2-5", &at), "Subclip_2-5_140507.mp4");
        assert_eq!(OutputNaming::numbered("Concat__140507.mp4", 2), "Concat__140507-2.mp4");
    }
}
