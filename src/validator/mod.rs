//! Attribute Validator/Applier (spec §4.4): the two-phase engine behind
//! Set-Printer-Attributes and Create-Printer.

pub mod job_template;

use crate::media;
use crate::model::{ColorModeSupported, IdentifyActions, PageOrientation, PrintQuality, Resolution, SidesSupported};
use crate::printer::Printer;
use ipp::attribute::IppAttributes;
use ipp::model::DelimiterTag;
use ipp::value::IppValue;

/// Names tolerated on Create-Printer even though they are handled by the
/// Printer Manager rather than this core (spec §4.4 preflight).
const CREATE_PRINTER_TOLERATED: &[&str] = &[
    "printer-device-id",
    "printer-name",
    "smi2699-device-uri",
    "smi2699-device-command",
];

#[derive(Debug, Default)]
pub struct ApplyOutcome {
    pub unsupported: Vec<String>,
}

impl ApplyOutcome {
    pub fn ok(&self) -> bool {
        self.unsupported.is_empty()
    }
}

fn keyword_of(value: &IppValue) -> Option<String> {
    match value {
        IppValue::Keyword(k) => Some(k.clone()),
        IppValue::NameWithoutLanguage(n) => Some(n.clone()),
        _ => None,
    }
}

fn text_of(value: &IppValue) -> Option<String> {
    match value {
        IppValue::TextWithoutLanguage(t) => Some(t.clone()),
        IppValue::NameWithoutLanguage(t) => Some(t.clone()),
        _ => None,
    }
}

/// Runs the preflight + apply passes under the printer's writer lock
/// (caller holds the lock for the duration). Returns the set of attribute
/// names that were rejected; on a non-empty result nothing was applied.
pub fn apply_printer_attributes(printer: &mut Printer, attributes: &mut IppAttributes, is_create_printer: bool) -> ApplyOutcome {
    let names: Vec<String> = attributes
        .groups_of(DelimiterTag::PrinterAttributes)
        .flat_map(|g| g.attributes().keys().cloned())
        .collect();

    let mut unsupported = Vec::new();
    for name in &names {
        if is_create_printer && CREATE_PRINTER_TOLERATED.contains(&name.as_str()) {
            continue;
        }
        if !is_recognized(printer, name) {
            unsupported.push(name.clone());
        }
    }

    if !unsupported.is_empty() {
        return ApplyOutcome { unsupported };
    }

    for name in &names {
        if is_create_printer && CREATE_PRINTER_TOLERATED.contains(&name.as_str()) {
            continue;
        }
        let Some(value) = take(attributes, name) else { continue };
        apply_one(printer, name, value);
    }

    printer.touch_config();
    ApplyOutcome::default()
}

fn take(attributes: &mut IppAttributes, name: &str) -> Option<IppValue> {
    attributes
        .groups_mut()
        .iter_mut()
        .filter(|g| g.tag() == DelimiterTag::PrinterAttributes)
        .find_map(|g| g.attributes_mut().remove(name))
        .map(|a| a.into_value())
}

fn is_recognized(printer: &Printer, name: &str) -> bool {
    match name {
        "printer-location" | "printer-geo-location" | "printer-organization"
        | "printer-organizational-unit" | "printer-organization-unit" | "printer-contact-col"
        | "printer-dns-sd-name" | "print-color-mode-default" | "sides-default"
        | "print-quality-default" | "orientation-requested-default" | "printer-resolution-default"
        | "identify-actions-default" | "print-darkness-default" | "print-speed-default"
        | "media-default" | "media-col-default" | "media-ready" | "document-format-default"
        | "label-mode-configured" => true,
        other => {
            if let Some(vendor_name) = other.strip_suffix("-default") {
                printer
                    .driver
                    .vendor_attribute_names
                    .iter()
                    .any(|declared| declared.trim_end_matches("-default") == vendor_name)
            } else {
                false
            }
        }
    }
}

fn apply_one(printer: &mut Printer, name: &str, value: IppValue) {
    match name {
        "printer-location" => {
            printer.location = text_of(&value).unwrap_or_default();
        }
        "printer-geo-location" => {
            printer.geo_location = match value {
                IppValue::Uri(uri) if !uri.is_empty() => Some(uri),
                _ => None,
            };
        }
        "printer-organization" => {
            printer.organization = text_of(&value).unwrap_or_default();
        }
        "printer-organizational-unit" | "printer-organization-unit" => {
            printer.organizational_unit = text_of(&value).unwrap_or_default();
        }
        "printer-dns-sd-name" => {
            printer.dnssd_name = text_of(&value).unwrap_or_default();
        }
        "print-color-mode-default" => {
            if let Some(kw) = keyword_of(&value) {
                if let Some(bit) = ColorModeSupported::from_keyword(&kw) {
                    printer.driver.color_mode_default = bit;
                }
            }
        }
        "sides-default" => {
            if let Some(kw) = keyword_of(&value) {
                if let Some(bit) = SidesSupported::from_keyword(&kw) {
                    printer.driver.sides_default = bit;
                }
            }
        }
        "print-quality-default" => {
            if let IppValue::Enum(v) = value {
                if let Ok(q) = PrintQuality::try_from(v) {
                    printer.driver.quality_default = q;
                }
            }
        }
        "orientation-requested-default" => {
            printer.driver.orientation_default = PageOrientation::try_from(value).ok();
        }
        "printer-resolution-default" => {
            printer.driver.resolution_default = Resolution::try_from(value).ok();
        }
        "identify-actions-default" => {
            let keywords: Vec<String> = match value {
                IppValue::Array(items) => items.into_iter().filter_map(|v| keyword_of(&v)).collect(),
                other => keyword_of(&other).into_iter().collect(),
            };
            printer.driver.identify_actions_default =
                IdentifyActions::from_keywords(keywords.iter().map(String::as_str));
        }
        "print-darkness-default" => {
            if let IppValue::Integer(v) = value {
                printer.driver.darkness_default = v;
            }
        }
        "print-speed-default" => {
            if let IppValue::Integer(v) = value {
                printer.driver.speed_default = v;
            }
        }
        "document-format-default" => {
            if let IppValue::MimeMediaType(m) = value {
                printer.driver.document_format_default = m;
            }
        }
        "media-default" => {
            if let Some(kw) = keyword_of(&value) {
                printer.driver.media_default = media::MediaCol::from_size_name(&kw, "main");
            }
        }
        "media-col-default" => {
            printer.driver.media_default = media_col_from_collection(&value);
        }
        "media-ready" => {
            apply_media_ready(printer, value);
        }
        _ => {}
    }
}

fn media_col_from_collection(value: &IppValue) -> Option<media::MediaCol> {
    let IppValue::Collection(members) = value else { return None };
    let size_name = members.get("media-size-name").and_then(keyword_of)?;
    let mut col = media::MediaCol::from_size_name(&size_name, "main")?;
    if let Some(IppValue::Keyword(source)) = members.get("media-source") {
        col.source = source.clone();
    }
    if let Some(IppValue::Keyword(kind)) = members.get("media-type") {
        col.media_type = kind.clone();
    }
    Some(col)
}

/// `media-ready`: resolve each keyword via the PWG registry; clear trailing
/// slots to empty (spec §4.4 apply phase).
fn apply_media_ready(printer: &mut Printer, value: IppValue) {
    let names: Vec<String> = match value {
        IppValue::Array(items) => items.into_iter().filter_map(|v| keyword_of(&v)).collect(),
        other => keyword_of(&other).into_iter().collect(),
    };
    for slot in printer.media_ready.iter_mut() {
        *slot = None;
    }
    for (i, name) in names.iter().enumerate().take(printer.media_ready.len()) {
        printer.media_ready[i] = media::MediaCol::from_size_name(name, "main");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::DriverData;
    use ipp::attribute::{IppAttribute, IppAttributeGroup};

    fn printer() -> Printer {
        Printer::new(1, "test", "ipp/print", DriverData::default())
    }

    fn attrs(pairs: Vec<(&str, IppValue)>) -> IppAttributes {
        let mut attributes = IppAttributes::default();
        let mut group = IppAttributeGroup::new(DelimiterTag::PrinterAttributes);
        group.attributes_mut().extend(pairs.into_iter().map(|(n, v)| (n.to_string(), IppAttribute::new(n, v))));
        attributes.groups_mut().push(group);
        attributes
    }

    #[test]
    fn unrecognized_attribute_is_rejected_and_nothing_is_applied() {
        let mut p = printer();
        let before = p.location.clone();
        let outcome = apply_printer_attributes(
            &mut p,
            &mut attrs(vec![
                ("printer-location", IppValue::TextWithoutLanguage("Room 1".to_string())),
                ("not-a-real-attribute", IppValue::Boolean(true)),
            ]),
            false,
        );
        assert!(!outcome.ok());
        assert_eq!(outcome.unsupported, vec!["not-a-real-attribute".to_string()]);
        assert_eq!(p.location, before);
    }

    #[test]
    fn recognized_attribute_is_applied_and_config_time_advances() {
        let mut p = printer();
        let before = p.config_time;
        let outcome = apply_printer_attributes(
            &mut p,
            &mut attrs(vec![("printer-location", IppValue::TextWithoutLanguage("Room 1".to_string()))]),
            false,
        );
        assert!(outcome.ok());
        assert_eq!(p.location, "Room 1");
        assert!(p.config_time >= before);
    }

    #[test]
    fn create_printer_tolerates_manager_owned_names() {
        let mut p = printer();
        let outcome = apply_printer_attributes(
            &mut p,
            &mut attrs(vec![("printer-name", IppValue::NameWithoutLanguage("foo".to_string()))]),
            true,
        );
        assert!(outcome.ok());
    }

    #[test]
    fn vendor_default_is_rejected_unless_declared() {
        let mut p = printer();
        let outcome = apply_printer_attributes(
            &mut p,
            &mut attrs(vec![("acme-fuser-temp-default", IppValue::Integer(200))]),
            false,
        );
        assert!(!outcome.ok());

        p.driver.vendor_attribute_names.push("acme-fuser-temp-default".to_string());
        let outcome = apply_printer_attributes(
            &mut p,
            &mut attrs(vec![("acme-fuser-temp-default", IppValue::Integer(200))]),
            false,
        );
        assert!(outcome.ok());
    }
}
