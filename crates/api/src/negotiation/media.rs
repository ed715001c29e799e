//! Media type constants and `Accept` / `Content-Type` parsing.

use std::cmp::Reverse;

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_XML: &str = "application/xml";
/// Selects the summary shape of a single contact.
pub const VENDOR_CONTACT_JSON: &str = "application/vnd.company.contact+json";
/// Selects creation of a contact together with its phones.
pub const VENDOR_CONTACT_WITH_PHONES_JSON: &str = "application/vnd.company.contactwithphonesforcreation+json";
pub const JSON_PATCH: &str = "application/json-patch+json";
pub const PROBLEM_JSON: &str = "application/problem+json";

/// Serialization format of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Xml,
}

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRange {
    main_type: String,
    sub_type: String,
    /// Quality in thousandths.
    quality: u16,
}

impl MediaRange {
    /// Parse `type/subtype[;params]`. Returns `None` for malformed ranges.
    pub fn parse(range: &str) -> Option<Self> {
        let mut parts = range.split(';');
        let (main_type, sub_type) = parts.next()?.trim().split_once('/')?;
        let (main_type, sub_type) = (main_type.trim().to_ascii_lowercase(), sub_type.trim().to_ascii_lowercase());
        if main_type.is_empty() || sub_type.is_empty() || (main_type == "*" && sub_type != "*") {
            return None;
        }
        let mut quality = 1000;
        for parameter in parts {
            if let Some((name, value)) = parameter.split_once('=')
                && name.trim().eq_ignore_ascii_case("q")
            {
                quality = parse_quality(value.trim())?;
            }
        }
        Some(Self {
            main_type,
            sub_type,
            quality,
        })
    }

    pub fn quality(&self) -> u16 {
        self.quality
    }

    /// Whether this range admits the concrete media type `essence`.
    pub fn matches(&self, essence: &str) -> bool {
        let Some((main_type, sub_type)) = essence.split_once('/') else {
            return false;
        };
        match (self.main_type.as_str(), self.sub_type.as_str()) {
            ("*", "*") => true,
            (range_main, "*") => range_main.eq_ignore_ascii_case(main_type),
            (range_main, range_sub) => range_main.eq_ignore_ascii_case(main_type) && range_sub.eq_ignore_ascii_case(sub_type),
        }
    }

    fn specificity(&self) -> u8 {
        match (self.main_type.as_str(), self.sub_type.as_str()) {
            ("*", _) => 0,
            (_, "*") => 1,
            _ => 2,
        }
    }
}

fn parse_quality(value: &str) -> Option<u16> {
    let quality: f32 = value.parse().ok()?;
    if !(0.0..=1.0).contains(&quality) {
        return None;
    }
    Some((quality * 1000.0).round() as u16)
}

/// Parse an `Accept` header into ranges ordered by preference.
///
/// Higher quality first, then more specific ranges; ties keep header order.
/// Ranges with `q=0` and malformed entries are dropped.
pub fn parse_accept(header: &str) -> Vec<MediaRange> {
    let mut ranges: Vec<MediaRange> = header
        .split(',')
        .filter(|range| !range.trim().is_empty())
        .filter_map(MediaRange::parse)
        .filter(|range| range.quality > 0)
        .collect();
    ranges.sort_by_key(|range| (Reverse(range.quality), Reverse(range.specificity())));
    ranges
}

/// The lowercase `type/subtype` part of a `Content-Type` value.
pub fn essence(content_type: &str) -> String {
    content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}
