//! Attribute Projector (spec §4.3): a pure function from printer snapshot
//! plus request context to response attributes. ~35% of the core by the
//! spec's own estimate; this module is the largest in the crate.

use crate::printer::Printer;
use crate::system::ResourceEntry;
use ipp::attribute::IppAttribute;
use ipp::value::IppValue;
use std::collections::{BTreeMap, HashSet};

/// Everything the projector needs besides the printer snapshot itself:
/// request-scoped inputs that are not part of printer state.
pub struct ProjectionContext<'a> {
    pub requested: &'a HashSet<&'a str>,
    pub document_format: Option<&'a str>,
    pub base_url_ipp: String,
    pub base_url_ipps: Option<String>,
    pub natural_language: &'a str,
    pub auth_service_configured: bool,
    pub tls_only: bool,
    pub tls_disabled: bool,
    pub resources: Vec<ResourceEntry>,
    pub shutdown_pending: bool,
}

impl<'a> ProjectionContext<'a> {
    pub fn requested_all(&self) -> bool {
        self.requested.contains("all")
    }

    pub fn wants(&self, name: &str) -> bool {
        self.requested_all() || self.requested.contains(name)
    }
}

fn is_streaming_raster(format: Option<&str>) -> bool {
    matches!(format, Some("image/pwg-raster") | Some("image/urf"))
}

/// `copies-supported`: spec §4.3 row 1.
fn copies_supported(printer: &Printer, document_format: Option<&str>) -> IppValue {
    if is_streaming_raster(document_format) {
        IppValue::RangeOfInteger { min: 1, max: 1 }
    } else {
        IppValue::RangeOfInteger {
            min: printer.driver.copies_supported.min,
            max: printer.driver.copies_supported.max,
        }
    }
}

/// `identify-actions-default`: spec §4.3 row 2.
fn identify_actions_default(printer: &Printer) -> IppValue {
    let keywords = printer.driver.identify_actions_default.keywords();
    if keywords.is_empty() {
        IppValue::Array(vec![IppValue::Keyword("none".to_string())])
    } else {
        IppValue::Array(keywords.into_iter().map(|k| IppValue::Keyword(k.to_string())).collect())
    }
}

fn media_col_value(col: &crate::media::MediaCol) -> IppValue {
    let mut size = BTreeMap::new();
    size.insert("x-dimension".to_string(), IppValue::Integer(col.width));
    size.insert("y-dimension".to_string(), IppValue::Integer(col.length));

    let mut members = BTreeMap::new();
    members.insert("media-size".to_string(), IppValue::Collection(size));
    members.insert("media-size-name".to_string(), IppValue::Keyword(col.size_name.clone()));
    if !col.source.is_empty() {
        members.insert("media-source".to_string(), IppValue::Keyword(col.source.clone()));
    }
    if !col.media_type.is_empty() {
        members.insert("media-type".to_string(), IppValue::Keyword(col.media_type.clone()));
    }
    members.insert("media-top-margin".to_string(), IppValue::Integer(col.margins.top));
    members.insert("media-bottom-margin".to_string(), IppValue::Integer(col.margins.bottom));
    members.insert("media-left-margin".to_string(), IppValue::Integer(col.margins.left));
    members.insert("media-right-margin".to_string(), IppValue::Integer(col.margins.right));
    IppValue::Collection(members)
}

/// `printer-state-reasons`: spec §4.3 row 6.
fn printer_state_reasons(printer: &Printer) -> Vec<String> {
    if printer.state_reasons.is_empty() {
        let reason = if printer.is_stopped {
            "moving-to-paused"
        } else if printer.state == crate::model::PrinterState::Stopped {
            "paused"
        } else {
            "none"
        };
        vec![reason.to_string()]
    } else {
        let mut reasons: Vec<String> = printer.state_reasons.keywords().into_iter().map(str::to_string).collect();
        if printer.is_stopped {
            reasons.push("moving-to-paused".to_string());
        } else if printer.state == crate::model::PrinterState::Stopped {
            reasons.push("paused".to_string());
        }
        reasons
    }
}

/// `printer-input-tray`: spec §4.3 row 7.
fn printer_input_tray(printer: &Printer) -> Vec<String> {
    let mut trays: Vec<String> = printer
        .driver
        .sources_supported
        .iter()
        .map(|source| {
            let kind = match source.as_str() {
                "manual" => "sheetFeedManual",
                "by-pass-tray" => "sheetFeedAutoNonRemovableTray",
                _ => "sheetFeedAutoRemovableTray",
            };
            let slot = printer
                .media_ready
                .iter()
                .flatten()
                .find(|col| col.source == *source);
            let (feed, xfeed) = slot.map_or((0, 0), |col| (col.length, col.width));
            format!(
                "type={};mediafeed={};mediaxfeed={};maxcapacity=250;level=-2;status=0;name={};",
                kind, feed, xfeed, source
            )
        })
        .collect();
    trays.push("type=unknown;mediafeed=0;mediaxfeed=0;maxcapacity=-2;level=-2;status=0;name=auto;".to_string());
    trays
}

/// `printer-supply`: spec §4.3 row 8.
fn printer_supply(printer: &Printer) -> Vec<String> {
    printer
        .supplies
        .iter()
        .enumerate()
        .map(|(i, supply)| format!("index={};{}", i, supply.encode()))
        .collect()
}

/// `printer-icons`: spec §4.3 row 9.
fn printer_icons(base_url: &str) -> Vec<String> {
    vec![
        format!("{}/icon-sm.png", base_url),
        format!("{}/icon-md.png", base_url),
        format!("{}/icon-lg.png", base_url),
    ]
}

/// The `printer-uri-supported` / `uri-authentication-supported` /
/// `printer-xri-supported` triple, kept together because §4.3 requires
/// positional 1:1 correspondence across all three and §8 tests it.
fn printer_uris(ctx: &ProjectionContext) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut uris = Vec::new();
    let mut auth = Vec::new();
    let mut security = Vec::new();
    if !ctx.tls_only {
        uris.push(ctx.base_url_ipp.clone());
        auth.push("requesting-user-name".to_string());
        security.push("none".to_string());
    }
    if !ctx.tls_disabled {
        if let Some(ipps) = &ctx.base_url_ipps {
            uris.push(ipps.clone());
            auth.push(if ctx.auth_service_configured { "basic".to_string() } else { "requesting-user-name".to_string() });
            security.push("tls".to_string());
        }
    }
    (uris, auth, security)
}

/// `printer-strings-uri`: spec §4.3 row 14 — first resource whose language
/// matches the request's natural-language or its two-letter base.
fn printer_strings_uri<'a>(resources: &'a [ResourceEntry], natural_language: &str) -> Option<&'a str> {
    let base = &natural_language[..natural_language.len().min(2)];
    resources
        .iter()
        .find(|r| r.language == natural_language || r.language == base)
        .map(|r| r.uri.as_str())
}

/// Assemble every requested `printer-*` response attribute. Runs under the
/// printer's reader lock (spec §4.2); takes an already-acquired snapshot so
/// callers control the lock's lifetime.
pub fn project_printer_attributes(printer: &Printer, ctx: &ProjectionContext) -> Vec<IppAttribute> {
    let mut out = Vec::new();
    macro_rules! add {
        ($name:expr, $value:expr) => {
            if ctx.wants($name) {
                out.push(IppAttribute::new($name, $value));
            }
        };
    }

    add!("printer-name", IppValue::NameWithoutLanguage(printer.name.clone()));
    add!("printer-uuid", IppValue::Uri(format!("urn:uuid:{}", printer.uuid)));
    add!("printer-state", IppValue::from(printer.state));
    add!(
        "printer-state-reasons",
        IppValue::Array(printer_state_reasons(printer).into_iter().map(IppValue::Keyword).collect())
    );
    add!("printer-is-accepting-jobs", IppValue::Boolean(printer.accepting_jobs(ctx.shutdown_pending)));
    add!("queued-job-count", IppValue::Integer(printer.queued_job_count() as i32));
    add!("printer-up-time", IppValue::Integer((printer.status_time - printer.start_time).max(0) as i32));
    add!(
        "printer-config-change-time",
        IppValue::Integer((printer.config_time - printer.start_time).max(0) as i32)
    );
    add!(
        "printer-state-change-time",
        IppValue::Integer((printer.state_time - printer.start_time).max(0) as i32)
    );
    add!("copies-supported", copies_supported(printer, ctx.document_format));
    add!("identify-actions-default", identify_actions_default(printer));
    if ctx.wants("identify-actions-supported") {
        out.push(IppAttribute::new(
            "identify-actions-supported",
            IppValue::Array(
                printer
                    .driver
                    .identify_actions_supported
                    .keywords()
                    .into_iter()
                    .map(|k| IppValue::Keyword(k.to_string()))
                    .collect(),
            ),
        ));
    }
    if let Some(default_media) = &printer.driver.media_default {
        add!("media-col-default", media_col_value(default_media));
    }
    {
        let mut ready_cols = Vec::new();
        let mut ready_names = Vec::new();
        for slot in printer.media_ready.iter().flatten() {
            ready_names.push(slot.size_name.clone());
            ready_cols.push(media_col_value(slot));
            if printer.driver.borderless_supported && slot.margins.is_nonzero() {
                ready_cols.push(media_col_value(&slot.borderless()));
            }
        }
        add!("media-col-ready", IppValue::Array(ready_cols));
        add!(
            "media-ready",
            IppValue::Array(ready_names.into_iter().map(IppValue::Keyword).collect())
        );
    }
    add!(
        "media-supported",
        IppValue::Array(printer.driver.media_supported.iter().cloned().map(IppValue::Keyword).collect())
    );
    add!(
        "print-color-mode-default",
        IppValue::Keyword(printer.driver.color_mode_default.keyword().unwrap_or("auto").to_string())
    );
    add!(
        "print-color-mode-supported",
        IppValue::Array(
            printer
                .driver
                .color_modes_supported
                .keywords()
                .into_iter()
                .map(|k| IppValue::Keyword(k.to_string()))
                .collect()
        )
    );
    add!(
        "sides-default",
        IppValue::Keyword(printer.driver.sides_default.keyword().unwrap_or("one-sided").to_string())
    );
    add!(
        "sides-supported",
        IppValue::Array(
            printer
                .driver
                .sides_supported
                .keywords()
                .into_iter()
                .map(|k| IppValue::Keyword(k.to_string()))
                .collect()
        )
    );
    add!("print-quality-default", IppValue::from(printer.driver.quality_default));
    add!(
        "print-quality-supported",
        IppValue::Array(printer.driver.quality_supported.iter().copied().map(IppValue::from).collect())
    );
    if let Some(orientation) = printer.driver.orientation_default {
        add!("orientation-requested-default", IppValue::from(orientation));
    }
    add!(
        "orientation-requested-supported",
        IppValue::Array(printer.driver.orientations_supported.iter().copied().map(IppValue::from).collect())
    );
    if let Some(resolution) = printer.driver.resolution_default {
        add!("printer-resolution-default", IppValue::from(resolution));
    }
    if !printer.driver.resolutions_supported.is_empty() {
        add!(
            "printer-resolution-supported",
            IppValue::Array(printer.driver.resolutions_supported.iter().copied().map(IppValue::from).collect())
        );
    }
    add!(
        "document-format-default",
        IppValue::MimeMediaType(printer.driver.document_format_default.clone())
    );
    add!(
        "document-format-supported",
        IppValue::Array(printer.driver.document_formats_supported.iter().cloned().map(IppValue::MimeMediaType).collect())
    );
    add!("page-ranges-supported", IppValue::Boolean(printer.driver.page_ranges_supported));
    if let Some(range) = printer.driver.darkness_supported {
        add!("print-darkness-supported", IppValue::Integer(range.max));
        add!("print-darkness-default", IppValue::Integer(printer.driver.darkness_default));
    }
    if let Some(range) = printer.driver.speed_supported {
        add!("print-speed-supported", IppValue::RangeOfInteger { min: range.min, max: range.max });
        add!("print-speed-default", IppValue::Integer(printer.driver.speed_default));
    }
    if ctx.wants("printer-input-tray") {
        out.push(IppAttribute::new(
            "printer-input-tray",
            IppValue::Array(printer_input_tray(printer).into_iter().map(IppValue::OctetString).collect()),
        ));
    }
    if ctx.wants("printer-supply") {
        out.push(IppAttribute::new(
            "printer-supply",
            IppValue::Array(printer_supply(printer).into_iter().map(IppValue::OctetString).collect()),
        ));
    }
    if ctx.wants("printer-icons") {
        out.push(IppAttribute::new(
            "printer-icons",
            IppValue::Array(printer_icons(&ctx.base_url_ipp).into_iter().map(IppValue::Uri).collect()),
        ));
    }
    if ctx.wants("printer-uri-supported") || ctx.wants("uri-authentication-supported") || ctx.wants("printer-xri-supported") {
        let (uris, auth, security) = printer_uris(ctx);
        add!("printer-uri-supported", IppValue::Array(uris.into_iter().map(IppValue::Uri).collect()));
        let xris = auth
            .iter()
            .cloned()
            .zip(security.iter().cloned())
            .map(|(a, s)| {
                let mut col = BTreeMap::new();
                col.insert("xri-authentication".to_string(), IppValue::Keyword(a));
                col.insert("xri-security".to_string(), IppValue::Keyword(s));
                IppValue::Collection(col)
            })
            .collect();
        add!(
            "uri-authentication-supported",
            IppValue::Array(auth.into_iter().map(IppValue::Keyword).collect())
        );
        add!("printer-xri-supported", IppValue::Array(xris));
    }
    if let Some(uri) = printer_strings_uri(&ctx.resources, ctx.natural_language) {
        add!("printer-strings-uri", IppValue::Uri(uri.to_string()));
    }
    if !printer.location.is_empty() || ctx.wants("printer-location") {
        add!("printer-location", IppValue::TextWithoutLanguage(printer.location.clone()));
    }
    if let Some(geo) = &printer.geo_location {
        add!("printer-geo-location", IppValue::Uri(geo.clone()));
    }
    add!("printer-organization", IppValue::TextWithoutLanguage(printer.organization.clone()));
    add!("printer-organizational-unit", IppValue::TextWithoutLanguage(printer.organizational_unit.clone()));
    if !printer.contact.name.is_empty() || !printer.contact.email.is_empty() {
        add!(
            "printer-contact-col",
            IppValue::Array(vec![
                IppValue::NameWithoutLanguage(printer.contact.name.clone()),
                IppValue::Uri(format!("mailto:{}", printer.contact.email)),
                IppValue::Uri(format!("tel:{}", printer.contact.telephone)),
            ])
        );
    }
    for (name, value) in printer.driver.vendor_defaults.iter() {
        add!(name.as_str(), value.clone());
    }

    out
}

/// Per-job attribute subset for Get-Jobs/Create-Job responses (spec §4.6).
pub fn project_job_attributes(job: &crate::job::Job, job_uri: String, requested: &HashSet<&str>) -> Vec<IppAttribute> {
    let all = requested.contains("all");
    let wants = |name: &str| all || requested.contains(name);
    let mut out = Vec::new();
    if wants("job-id") {
        out.push(IppAttribute::new("job-id", IppValue::Integer(job.id)));
    }
    if wants("job-uri") {
        out.push(IppAttribute::new("job-uri", IppValue::Uri(job_uri)));
    }
    if wants("job-state") {
        out.push(IppAttribute::new("job-state", IppValue::from(job.state)));
    }
    if wants("job-state-reasons") {
        let reason = if job.state_message.is_empty() { "none" } else { "job-incoming" };
        out.push(IppAttribute::new(
            "job-state-reasons",
            IppValue::Array(vec![IppValue::Keyword(reason.to_string())]),
        ));
    }
    if wants("job-state-message") {
        out.push(IppAttribute::new(
            "job-state-message",
            IppValue::TextWithoutLanguage(job.state_message.clone()),
        ));
    }
    if wants("job-name") {
        out.push(IppAttribute::new("job-name", IppValue::NameWithoutLanguage(job.name.clone())));
    }
    if wants("job-originating-user-name") {
        out.push(IppAttribute::new(
            "job-originating-user-name",
            IppValue::NameWithoutLanguage(job.username.clone()),
        ));
    }
    if wants("time-at-creation") {
        out.push(IppAttribute::new("time-at-creation", IppValue::Integer(job.submit_time as i32)));
    }
    out
}
