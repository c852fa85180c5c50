use crate::error::ConfigError;

/// Interval set a voice draws its pitches from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scale {
    Major,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Minor,
    Locrian,
    Custom(Vec<i32>),
}

impl Scale {
    pub const MODES: [Scale; 7] = [
        Scale::Major,
        Scale::Dorian,
        Scale::Phrygian,
        Scale::Lydian,
        Scale::Mixolydian,
        Scale::Minor,
        Scale::Locrian,
    ];

    /// Resolves a configured scale name. `custom` is only consulted for `CUSTOM`.
    pub fn resolve(name: &str, custom: Option<&str>) -> Result<Self, ConfigError> {
        let scale = match name.trim().to_ascii_uppercase().as_str() {
            "MAJOR" => Scale::Major,
            "DORIAN" => Scale::Dorian,
            "PHRYGIAN" => Scale::Phrygian,
            "LYDIAN" => Scale::Lydian,
            "MIXOLYDIAN" => Scale::Mixolydian,
            "MINOR" => Scale::Minor,
            "LOCRIAN" => Scale::Locrian,
            "CUSTOM" => Scale::Custom(parse_intervals(custom.unwrap_or(""))?),
            _ => return Err(ConfigError::UnknownScale(name.to_string())),
        };
        Ok(scale)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scale::Major => "MAJOR",
            Scale::Dorian => "DORIAN",
            Scale::Phrygian => "PHRYGIAN",
            Scale::Lydian => "LYDIAN",
            Scale::Mixolydian => "MIXOLYDIAN",
            Scale::Minor => "MINOR",
            Scale::Locrian => "LOCRIAN",
            Scale::Custom(_) => "CUSTOM",
        }
    }

    pub fn intervals(&self) -> &[i32] {
        match self {
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Scale::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            Scale::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            Scale::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            Scale::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::Locrian => &[0, 1, 3, 5, 6, 8, 10],
            Scale::Custom(intervals) => intervals,
        }
    }

    /// Absolute pitches for `octaves` stacked copies of the scale above `root`.
    /// Computed in `i64` so any `i32` root or offset fits; the MIDI range is
    /// checked by `VoiceSettings::note_set`, which also bounds `octaves`.
    pub fn note_set(&self, root: i32, octaves: usize) -> Vec<i64> {
        (0..octaves)
            .flat_map(|octave| {
                let base = i64::from(root).saturating_add((octave as i64).saturating_mul(12));
                self.intervals()
                    .iter()
                    .map(move |&offset| base.saturating_add(i64::from(offset)))
            })
            .collect()
    }
}

/// Parses "0, 3, 7" style interval lists.
pub fn parse_intervals(raw: &str) -> Result<Vec<i32>, ConfigError> {
    if raw.trim().is_empty() {
        return Err(ConfigError::InvalidIntervals(raw.to_string()));
    }
    raw.split(',')
        .map(|entry| {
            entry
                .trim()
                .parse::<i32>()
                .map_err(|_| ConfigError::InvalidIntervals(raw.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn major_one_octave_from_middle_c() {
        let scale = Scale::resolve("MAJOR", None).unwrap();
        assert_eq!(scale.note_set(60, 1), vec![60, 62, 64, 65, 67, 69, 71]);
    }

    #[test]
    fn custom_two_octaves() {
        let scale = Scale::resolve("CUSTOM", Some("0,3,7")).unwrap();
        assert_eq!(scale.note_set(48, 2), vec![48, 51, 55, 60, 63, 67]);
    }

    #[test]
    fn note_set_length_and_floor() {
        for mode in Scale::MODES.iter() {
            for octaves in 1..4 {
                let notes = mode.note_set(40, octaves);
                assert_eq!(notes.len(), octaves * mode.intervals().len());
                assert!(notes.iter().all(|&n| n >= 40), "{}", mode.name());
            }
        }
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(Scale::resolve(" dorian ", None).unwrap(), Scale::Dorian);
        assert_eq!(
            Scale::resolve("custom", Some(" -1 , 4,11 ")).unwrap(),
            Scale::Custom(vec![-1, 4, 11])
        );
    }

    #[test]
    fn bad_custom_intervals_fail() {
        assert!(matches!(
            Scale::resolve("CUSTOM", None),
            Err(ConfigError::InvalidIntervals(_))
        ));
        assert!(matches!(
            Scale::resolve("CUSTOM", Some("0,,7")),
            Err(ConfigError::InvalidIntervals(_))
        ));
        assert!(matches!(
            Scale::resolve("CUSTOM", Some("0,three")),
            Err(ConfigError::InvalidIntervals(_))
        ));
    }

    #[test]
    fn extreme_offsets_do_not_wrap() {
        let scale = Scale::resolve("CUSTOM", Some("0,2147483647")).unwrap();
        assert_eq!(scale.note_set(60, 1), vec![60, 2_147_483_707]);
        assert_eq!(
            Scale::Major.note_set(i32::MAX, 1)[6],
            i64::from(i32::MAX) + 11
        );
    }

    #[test]
    fn unknown_name_fails() {
        assert!(matches!(
            Scale::resolve("BLUES", Some("0,3,5")),
            Err(ConfigError::UnknownScale(_))
        ));
    }
}
