//! Named bitsets for multi-valued keyword attributes (`print-color-mode-supported`,
//! `sides-supported`, `identify-actions-default`, `printer-state-reasons`, …).
//!
//! Each bitset round-trips to the IPP keyword vocabulary it represents:
//! iteration over a bitset's set bits yields keywords in bit order, and a
//! bitset can be rebuilt from a keyword (or a list of keywords).

/// Declares a `u32`-backed bitset type whose bits correspond 1:1 to IPP
/// keywords. `$empty_keyword`, when given, is the single keyword emitted
/// when no bit is set (e.g. `identify-actions-default` emits `none` rather
/// than an empty array).
macro_rules! keyword_bitset {
    ($name:ident { $($variant:ident = $bit:expr => $keyword:expr),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
        pub struct $name(u32);

        impl $name {
            $(
                pub const $variant: $name = $name(1 << $bit);
            )+

            pub const NONE: $name = $name(0);

            pub const fn empty() -> Self {
                Self(0)
            }

            pub const fn bits(self) -> u32 {
                self.0
            }

            pub const fn from_bits(bits: u32) -> Self {
                Self(bits)
            }

            pub fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub fn is_empty(self) -> bool {
                self.0 == 0
            }

            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }

            pub fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            /// The keyword for one single-bit value, or `None` for a bit
            /// combination / empty set.
            pub fn keyword(self) -> Option<&'static str> {
                match self {
                    $(x if x.0 == (1 << $bit) => Some($keyword),)+
                    _ => None,
                }
            }

            /// All set bits as their keywords, in bit order.
            pub fn keywords(self) -> Vec<&'static str> {
                let mut out = Vec::new();
                $(
                    if self.contains(Self::$variant) {
                        out.push($keyword);
                    }
                )+
                out
            }

            /// Parse a single keyword into the matching single-bit value.
            pub fn from_keyword(keyword: &str) -> Option<Self> {
                match keyword {
                    $($keyword => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Parse a set of keywords into their union; unknown keywords
            /// are silently dropped (callers that need to report
            /// unsupported keywords should check membership up front).
            pub fn from_keywords<'a>(keywords: impl IntoIterator<Item = &'a str>) -> Self {
                let mut out = Self::empty();
                for kw in keywords {
                    if let Some(bit) = Self::from_keyword(kw) {
                        out.insert(bit);
                    }
                }
                out
            }
        }
    };
}

keyword_bitset!(ColorModeSupported {
    AUTO = 0 => "auto",
    COLOR = 1 => "color",
    MONOCHROME = 2 => "monochrome",
});

keyword_bitset!(SidesSupported {
    ONE_SIDED = 0 => "one-sided",
    TWO_SIDED_LONG_EDGE = 1 => "two-sided-long-edge",
    TWO_SIDED_SHORT_EDGE = 2 => "two-sided-short-edge",
});

keyword_bitset!(IdentifyActions {
    DISPLAY = 0 => "display",
    FLASH = 1 => "flash",
    SOUND = 2 => "sound",
    SPEAK = 3 => "speak",
});

keyword_bitset!(StateReasons {
    OTHER = 0 => "other",
    MEDIA_EMPTY = 1 => "media-empty",
    MEDIA_JAM = 2 => "media-jam",
    MEDIA_LOW = 3 => "media-low",
    MEDIA_NEEDED = 4 => "media-needed",
    TONER_LOW = 5 => "toner-low",
    TONER_EMPTY = 6 => "toner-empty",
    MARKER_SUPPLY_LOW = 7 => "marker-supply-low",
    MARKER_SUPPLY_EMPTY = 8 => "marker-supply-empty",
    COVER_OPEN = 9 => "cover-open",
    DOOR_OPEN = 10 => "door-open",
    INPUT_TRAY_MISSING = 11 => "input-tray-missing",
    OUTPUT_AREA_ALMOST_FULL = 12 => "output-area-almost-full",
    OUTPUT_AREA_FULL = 13 => "output-area-full",
    SPOOL_AREA_FULL = 14 => "spool-area-full",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_bit_round_trips_through_keyword() {
        let mode = ColorModeSupported::COLOR;
        assert_eq!(mode.keyword(), Some("color"));
        assert_eq!(ColorModeSupported::from_keyword("color"), Some(mode));
    }

    #[test]
    fn union_reports_all_member_keywords_in_bit_order() {
        let both = SidesSupported::ONE_SIDED.union(SidesSupported::TWO_SIDED_LONG_EDGE);
        assert_eq!(both.keywords(), vec!["one-sided", "two-sided-long-edge"]);
        assert!(both.contains(SidesSupported::ONE_SIDED));
        assert!(!both.contains(SidesSupported::TWO_SIDED_SHORT_EDGE));
    }

    #[test]
    fn empty_bitset_has_no_keywords() {
        assert!(StateReasons::empty().is_empty());
        assert!(StateReasons::empty().keywords().is_empty());
    }

    #[test]
    fn from_keywords_ignores_unknown_entries() {
        let reasons = StateReasons::from_keywords(["toner-low", "not-a-real-reason", "media-jam"]);
        assert_eq!(reasons.keywords(), vec!["media-jam", "toner-low"]);
    }
}
