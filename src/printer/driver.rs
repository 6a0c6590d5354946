use crate::media::MediaCol;
use crate::model::{ColorModeSupported, IdentifyActions, PageOrientation, PrintQuality, Resolution, SidesSupported};
use crate::printer::supply::{Colorant, Supply, SupplyKind};
use ipp::value::IppValue;
use std::collections::BTreeMap;

/// A numeric range, used for `print-darkness-supported` and
/// `print-speed-supported`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntRange {
    pub min: i32,
    pub max: i32,
}

impl IntRange {
    pub fn contains(self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Capabilities snapshot taken from the physical driver at printer creation
/// time. Mostly read-only afterwards; the handful of fields
/// Set-Printer-Attributes can touch are the `*_default` ones.
#[derive(Debug, Clone)]
pub struct DriverData {
    pub color_modes_supported: ColorModeSupported,
    pub color_mode_default: ColorModeSupported,

    pub content_optimize_supported: Vec<String>,
    pub content_optimize_default: String,

    pub orientations_supported: Vec<PageOrientation>,
    pub orientation_default: Option<PageOrientation>,

    pub quality_supported: Vec<PrintQuality>,
    pub quality_default: PrintQuality,

    pub scaling_supported: Vec<String>,
    pub scaling_default: String,

    pub sides_supported: SidesSupported,
    pub sides_default: SidesSupported,

    pub sources_supported: Vec<String>,
    pub source_default: Option<String>,

    pub bins_supported: Vec<String>,
    pub bin_default: Option<String>,

    pub resolutions_supported: Vec<Resolution>,
    pub resolution_default: Option<Resolution>,

    pub media_supported: Vec<String>,
    pub media_default: Option<MediaCol>,

    pub darkness_supported: Option<IntRange>,
    pub darkness_default: i32,

    pub speed_supported: Option<IntRange>,
    pub speed_default: i32,

    pub identify_actions_supported: IdentifyActions,
    pub identify_actions_default: IdentifyActions,

    pub label_mode_supported: Vec<String>,
    pub label_mode_default: Option<String>,

    pub tear_off_supported: Option<IntRange>,
    pub tear_off_default: Option<i32>,

    pub borderless_supported: bool,

    pub document_formats_supported: Vec<String>,
    pub document_format_default: String,

    pub page_ranges_supported: bool,
    pub copies_supported: IntRange,

    /// `<name>-default` vendor extension attributes, copied verbatim from
    /// the request that installed them and echoed back unchanged. Never
    /// interpreted semantically by this core.
    pub vendor_defaults: BTreeMap<String, IppValue>,

    /// Names the driver declares it accepts as `<name>-default` vendor
    /// attributes on Set-Printer-Attributes (spec §4.4). Anything not in
    /// this list is rejected as unsupported rather than silently accepted.
    pub vendor_attribute_names: Vec<String>,

    /// Starting `printer-supply` state, copied into `Printer::supplies` at
    /// creation time (spec.md data model: "description, color enum, type
    /// enum, level 0-100, is_consumed flag").
    pub supplies: Vec<Supply>,
}

impl Default for DriverData {
    fn default() -> Self {
        Self {
            color_modes_supported: ColorModeSupported::AUTO.union(ColorModeSupported::MONOCHROME),
            color_mode_default: ColorModeSupported::AUTO,
            content_optimize_supported: vec!["auto".to_string(), "text".to_string(), "photo".to_string()],
            content_optimize_default: "auto".to_string(),
            orientations_supported: vec![PageOrientation::Portrait, PageOrientation::Landscape],
            orientation_default: None,
            quality_supported: vec![PrintQuality::Draft, PrintQuality::Normal, PrintQuality::High],
            quality_default: PrintQuality::Normal,
            scaling_supported: vec!["auto".to_string(), "fill".to_string(), "fit".to_string(), "none".to_string()],
            scaling_default: "auto".to_string(),
            sides_supported: SidesSupported::ONE_SIDED,
            sides_default: SidesSupported::ONE_SIDED,
            sources_supported: vec!["main".to_string()],
            source_default: Some("main".to_string()),
            bins_supported: vec![],
            bin_default: None,
            resolutions_supported: vec![Resolution::new_dpi(300, 300)],
            resolution_default: Some(Resolution::new_dpi(300, 300)),
            media_supported: vec!["iso_a4_210x297mm".to_string(), "na_letter_8.5x11in".to_string()],
            media_default: MediaCol::from_size_name("iso_a4_210x297mm", "main"),
            darkness_supported: None,
            darkness_default: 0,
            speed_supported: None,
            speed_default: 0,
            identify_actions_supported: IdentifyActions::DISPLAY,
            identify_actions_default: IdentifyActions::empty(),
            label_mode_supported: vec![],
            label_mode_default: None,
            tear_off_supported: None,
            tear_off_default: None,
            borderless_supported: false,
            document_formats_supported: vec!["application/pdf".to_string(), "image/pwg-raster".to_string()],
            document_format_default: "application/pdf".to_string(),
            page_ranges_supported: false,
            copies_supported: IntRange { min: 1, max: 999 },
            vendor_defaults: BTreeMap::new(),
            vendor_attribute_names: Vec::new(),
            supplies: vec![
                Supply {
                    colorant: Colorant::Black,
                    kind: SupplyKind::Toner,
                    description: "Black Toner".to_string(),
                    level: 100,
                    is_consumed: false,
                },
                Supply {
                    colorant: Colorant::Other,
                    kind: SupplyKind::Waste,
                    description: "Waste Toner Box".to_string(),
                    level: 0,
                    is_consumed: false,
                },
            ],
        }
    }
}

impl DriverData {
    /// `media-size-supported` as a list of resolved (width, length) pairs,
    /// the representation the job-template validator matches `media-col`'s
    /// `media-size` collection against.
    pub fn media_size_supported(&self) -> Vec<(i32, i32)> {
        self.media_supported
            .iter()
            .filter_map(|name| crate::media::lookup(name))
            .map(|size| (size.width, size.length))
            .collect()
    }
}
