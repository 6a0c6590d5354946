//! PWG media size registry and the `media-col` collection type.
//!
//! PWG 5101.1 "self-describing" media names encode their dimensions in the
//! name itself (`na_letter_8.5x11in`, `iso_a4_210x297mm`); rather than
//! embedding the full PWG media size table we parse the name the way the
//! PWG registry itself is built, resolving to hundredths-of-a-millimeter
//! (the unit IPP `x-dimension`/`y-dimension` integers use).

/// A resolved PWG media size: name plus width/length in hundredths of mm.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaSize {
    pub pwg_name: String,
    pub width: i32,
    pub length: i32,
}

enum Unit {
    Mm,
    Inch,
}

fn mm_to_hundredths(mm: f64) -> i32 {
    (mm * 100.0).round() as i32
}

fn inch_to_hundredths(inch: f64) -> i32 {
    (inch * 2540.0).round() as i32
}

/// Resolve a PWG self-describing media name to its dimensions.
pub fn lookup(pwg_name: &str) -> Option<MediaSize> {
    let last_segment = pwg_name.rsplit('_').next()?;
    let (dims, unit) = if let Some(d) = last_segment.strip_suffix("mm") {
        (d, Unit::Mm)
    } else if let Some(d) = last_segment.strip_suffix("in") {
        (d, Unit::Inch)
    } else {
        return None;
    };
    let mut parts = dims.splitn(2, 'x');
    let w: f64 = parts.next()?.parse().ok()?;
    let h: f64 = parts.next()?.parse().ok()?;
    let (width, length) = match unit {
        Unit::Mm => (mm_to_hundredths(w), mm_to_hundredths(h)),
        Unit::Inch => (inch_to_hundredths(w), inch_to_hundredths(h)),
    };
    Some(MediaSize {
        pwg_name: pwg_name.to_string(),
        width,
        length,
    })
}

/// Find the driver-supported entry, by dimensions, matching the given
/// (x, y) pair within rounding tolerance of a registry lookup.
pub fn find_by_dimensions(supported: &[String], width: i32, length: i32) -> Option<String> {
    supported
        .iter()
        .find(|name| matches!(lookup(name), Some(size) if size.width == width && size.length == length))
        .cloned()
}

/// Margins around a media sheet, in hundredths of mm. All-zero margins mean
/// borderless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Margins {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

impl Margins {
    pub fn is_borderless(self) -> bool {
        self == Margins::default()
    }

    pub fn is_nonzero(self) -> bool {
        self.top != 0 || self.bottom != 0 || self.left != 0 || self.right != 0
    }
}

/// A single loaded or default media configuration: a `media-col` collection
/// value plus the source/type it is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct MediaCol {
    pub size_name: String,
    pub width: i32,
    pub length: i32,
    pub margins: Margins,
    pub source: String,
    pub media_type: String,
}

impl MediaCol {
    pub fn is_empty(&self) -> bool {
        self.size_name.is_empty()
    }

    pub fn from_size_name(size_name: &str, source: &str) -> Option<Self> {
        let size = lookup(size_name)?;
        Some(Self {
            size_name: size.pwg_name,
            width: size.width,
            length: size.length,
            margins: Margins::default(),
            source: source.to_string(),
            media_type: String::new(),
        })
    }

    /// The borderless variant of this media-col: zeroed margins, same size.
    pub fn borderless(&self) -> Self {
        Self {
            margins: Margins::default(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_inch_based_self_describing_name() {
        let size = lookup("na_letter_8.5x11in").unwrap();
        assert_eq!(size.width, 2159);
        assert_eq!(size.length, 2794);
    }

    #[test]
    fn resolves_millimeter_based_self_describing_name() {
        let size = lookup("iso_a4_210x297mm").unwrap();
        assert_eq!(size.width, 21000);
        assert_eq!(size.length, 29700);
    }

    #[test]
    fn rejects_names_without_a_recognizable_dimension_suffix() {
        assert!(lookup("custom_unknown").is_none());
    }

    #[test]
    fn find_by_dimensions_matches_a_supported_entry() {
        let supported = vec!["na_letter_8.5x11in".to_string(), "iso_a4_210x297mm".to_string()];
        assert_eq!(
            find_by_dimensions(&supported, 21000, 29700),
            Some("iso_a4_210x297mm".to_string())
        );
        assert_eq!(find_by_dimensions(&supported, 1, 1), None);
    }
}
