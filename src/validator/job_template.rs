//! Job-Template Validator (spec §4.5): per-attribute semantic checks
//! against driver capabilities, run under the printer's reader lock.
//! Every check is independent; callers gather ALL failures rather than
//! short-circuiting on the first one, so a client sees every problem in a
//! single response (spec §4.5, §8 "Idempotence of Validate-Job").

use crate::model::{ColorModeSupported, PageOrientation, PrintQuality, Resolution, SidesSupported};
use crate::printer::Printer;
use ipp::attribute::IppAttributes;
use ipp::model::DelimiterTag;
use ipp::value::IppValue;

const DEFAULT_JOB_NAME: &str = "Untitled";

#[derive(Debug, Default)]
pub struct JobTemplateOutcome {
    pub unsupported: Vec<String>,
    /// Set when `job-name` was absent and the default was injected; callers
    /// should write this back into the job-creation attribute group.
    pub injected_job_name: Option<String>,
}

impl JobTemplateOutcome {
    pub fn ok(&self) -> bool {
        self.unsupported.is_empty()
    }
}

fn group_attr<'a>(attrs: &'a IppAttributes, name: &str) -> Option<&'a IppValue> {
    attrs
        .groups_of(DelimiterTag::JobAttributes)
        .find_map(|g| g.attributes().get(name))
        .map(|a| a.value())
}

fn as_keyword(value: &IppValue) -> Option<&str> {
    match value {
        IppValue::Keyword(k) => Some(k.as_str()),
        IppValue::NameWithoutLanguage(n) => Some(n.as_str()),
        _ => None,
    }
}

/// Validates every job-template attribute present in the request against
/// `printer`'s driver capabilities. Does not mutate the printer; may record
/// an `injected_job_name` for the caller to apply to the job-creation
/// attributes it already owns.
pub fn validate_job_attributes(printer: &Printer, shutdown_pending: bool, attributes: &IppAttributes) -> JobTemplateOutcome {
    let mut out = JobTemplateOutcome::default();

    if shutdown_pending {
        out.unsupported.push("printer-is-accepting-jobs".to_string());
        return out;
    }

    let mut reject = |name: &str| out.unsupported.push(name.to_string());

    if let Some(value) = group_attr(attributes, "copies") {
        match value {
            IppValue::Integer(n) if (1..=printer.driver.copies_supported.max).contains(n) => {}
            _ => reject("copies"),
        }
    }

    if let Some(value) = group_attr(attributes, "ipp-attribute-fidelity") {
        if !matches!(value, IppValue::Boolean(_)) {
            reject("ipp-attribute-fidelity");
        }
    }

    if let Some(value) = group_attr(attributes, "job-hold-until") {
        match as_keyword(value) {
            Some("no-hold") => {}
            _ => reject("job-hold-until"),
        }
    }

    if let Some(value) = group_attr(attributes, "job-impressions") {
        match value {
            IppValue::Integer(n) if *n >= 0 => {}
            _ => reject("job-impressions"),
        }
    }

    match group_attr(attributes, "job-name") {
        Some(value) if as_keyword(value).is_some() => {}
        Some(_) => reject("job-name"),
        None => out.injected_job_name = Some(DEFAULT_JOB_NAME.to_string()),
    }

    if let Some(value) = group_attr(attributes, "job-priority") {
        match value {
            IppValue::Integer(n) if (1..=100).contains(n) => {}
            _ => reject("job-priority"),
        }
    }

    if let Some(value) = group_attr(attributes, "job-sheets") {
        match as_keyword(value) {
            Some("none") => {}
            _ => reject("job-sheets"),
        }
    }

    if let Some(value) = group_attr(attributes, "media") {
        match as_keyword(value) {
            Some(kw) if printer.driver.media_supported.iter().any(|m| m == kw) => {}
            _ => reject("media"),
        }
    }

    if let Some(value) = group_attr(attributes, "media-col") {
        if !valid_media_col(printer, value) {
            reject("media-col");
        }
    }

    if let Some(value) = group_attr(attributes, "multiple-document-handling") {
        match as_keyword(value) {
            Some("separate-documents-uncollated-copies") | Some("separate-documents-collated-copies") => {}
            _ => reject("multiple-document-handling"),
        }
    }

    if let Some(value) = group_attr(attributes, "orientation-requested") {
        match value {
            IppValue::Enum(v) if (PageOrientation::MIN..=PageOrientation::MAX).contains(v) => {}
            _ => reject("orientation-requested"),
        }
    }

    if let Some(value) = group_attr(attributes, "page-ranges") {
        if printer.driver.page_ranges_supported {
            match value {
                IppValue::RangeOfInteger { min, max } if *min >= 1 && *max >= *min => {}
                _ => reject("page-ranges"),
            }
        } else {
            reject("page-ranges");
        }
    }

    if let Some(value) = group_attr(attributes, "print-color-mode") {
        match as_keyword(value).and_then(ColorModeSupported::from_keyword) {
            Some(bit) if printer.driver.color_modes_supported.contains(bit) => {}
            _ => reject("print-color-mode"),
        }
    }

    if let Some(value) = group_attr(attributes, "print-content-optimize") {
        match as_keyword(value) {
            Some(kw) if printer.driver.content_optimize_supported.iter().any(|s| s == kw) => {}
            _ => reject("print-content-optimize"),
        }
    }

    if let Some(value) = group_attr(attributes, "print-scaling") {
        match as_keyword(value) {
            Some(kw) if printer.driver.scaling_supported.iter().any(|s| s == kw) => {}
            _ => reject("print-scaling"),
        }
    }

    if let Some(value) = group_attr(attributes, "print-darkness") {
        match (value, printer.driver.darkness_supported) {
            (IppValue::Integer(n), Some(range)) if (-100..=100).contains(n) && range.contains(*n) => {}
            _ => reject("print-darkness"),
        }
    }

    if let Some(value) = group_attr(attributes, "print-quality") {
        match value {
            IppValue::Enum(v)
                if (PrintQuality::MIN..=PrintQuality::MAX).contains(v)
                    && printer.driver.quality_supported.iter().any(|q| *q as i32 == *v) => {}
            _ => reject("print-quality"),
        }
    }

    if let Some(value) = group_attr(attributes, "print-speed") {
        match (value, printer.driver.speed_supported) {
            (IppValue::Integer(n), Some(range)) if range.contains(*n) => {}
            _ => reject("print-speed"),
        }
    }

    if let Some(value) = group_attr(attributes, "printer-resolution") {
        match Resolution::try_from(value.clone()) {
            Ok(resolution) if printer.driver.resolutions_supported.contains(&resolution) => {}
            _ => reject("printer-resolution"),
        }
    }

    if let Some(value) = group_attr(attributes, "sides") {
        match as_keyword(value).and_then(SidesSupported::from_keyword) {
            Some(bit) if printer.driver.sides_supported.contains(bit) => {}
            _ => reject("sides"),
        }
    }

    out
}

fn valid_media_col(printer: &Printer, value: &IppValue) -> bool {
    let IppValue::Collection(members) = value else { return false };
    if let Some(name) = members.get("media-size-name").and_then(as_keyword) {
        return printer.driver.media_supported.iter().any(|m| m == name);
    }
    if let Some(IppValue::Collection(size)) = members.get("media-size") {
        let x = size.get("x-dimension");
        let y = size.get("y-dimension");
        if let (Some(IppValue::Integer(x)), Some(IppValue::Integer(y))) = (x, y) {
            return printer.driver.media_size_supported().iter().any(|(w, l)| w == x && l == y);
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::{DriverData, Printer};
    use ipp::attribute::{IppAttribute, IppAttributeGroup, IppAttributes};
    use std::collections::BTreeMap;

    fn printer() -> Printer {
        Printer::new(1, "test", "ipp/print", DriverData::default())
    }

    fn attrs(pairs: Vec<(&str, IppValue)>) -> IppAttributes {
        let mut attributes = IppAttributes::default();
        let mut group = IppAttributeGroup::new(DelimiterTag::JobAttributes);
        group.attributes_mut().extend(pairs.into_iter().map(|(n, v)| (n.to_string(), IppAttribute::new(n, v))));
        attributes.groups_mut().push(group);
        attributes
    }

    #[test]
    fn job_name_absent_is_injected_not_rejected() {
        let out = validate_job_attributes(&printer(), false, &attrs(vec![]));
        assert!(out.ok());
        assert_eq!(out.injected_job_name.as_deref(), Some(DEFAULT_JOB_NAME));
    }

    #[test]
    fn shutdown_pending_rejects_regardless_of_attributes() {
        let out = validate_job_attributes(&printer(), true, &attrs(vec![]));
        assert!(!out.ok());
        assert_eq!(out.unsupported, vec!["printer-is-accepting-jobs".to_string()]);
    }

    #[test]
    fn copies_out_of_range_is_rejected() {
        let p = printer();
        let max = p.driver.copies_supported.max;
        let out = validate_job_attributes(&p, false, &attrs(vec![("copies", IppValue::Integer(max + 1))]));
        assert!(out.unsupported.contains(&"copies".to_string()));
    }

    #[test]
    fn copies_in_range_is_accepted() {
        let out = validate_job_attributes(&printer(), false, &attrs(vec![("copies", IppValue::Integer(1))]));
        assert!(!out.unsupported.contains(&"copies".to_string()));
    }

    #[test]
    fn media_not_in_supported_list_is_rejected() {
        let out = validate_job_attributes(
            &printer(),
            false,
            &attrs(vec![("media", IppValue::Keyword("na_legal_8.5x14in".to_string()))]),
        );
        assert!(out.unsupported.contains(&"media".to_string()));
    }

    #[test]
    fn media_col_by_size_name_accepted_when_supported() {
        let value = IppValue::Collection(BTreeMap::from([(
            "media-size-name".to_string(),
            IppValue::Keyword("iso_a4_210x297mm".to_string()),
        )]));
        let out = validate_job_attributes(&printer(), false, &attrs(vec![("media-col", value)]));
        assert!(!out.unsupported.contains(&"media-col".to_string()));
    }

    #[test]
    fn page_ranges_rejected_when_driver_does_not_support_them() {
        let out = validate_job_attributes(
            &printer(),
            false,
            &attrs(vec![("page-ranges", IppValue::RangeOfInteger { min: 1, max: 3 })]),
        );
        assert!(out.unsupported.contains(&"page-ranges".to_string()));
    }
}
