//! Content negotiation on the `Accept` header.

use axum::http::HeaderValue;
use thiserror::Error;
use tracing::debug;

pub static APPLICATION_JSON: &str = "application/json";
pub static TEXT_HTML: &str = "text/html";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcceptError {
    #[error("media range `{0}` is not of the form type/subtype")]
    InvalidMediaRange(String),
    #[error("quality `{0}` is not a number")]
    InvalidQuality(String),
}

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub main_type: String,
    pub subtype: String,
    pub parameter_count: usize,
    pub quality: f32,
}

impl MediaRange {
    /// More concrete ranges rank higher, then ranges with more parameters.
    fn specificity(&self) -> (bool, bool, usize) {
        (
            self.main_type != "*",
            self.subtype != "*",
            self.parameter_count,
        )
    }

    fn matches(&self, media_type: &str) -> bool {
        let Some((main_type, subtype)) = media_type.split_once('/') else {
            return false;
        };
        (self.main_type == "*" || self.main_type == main_type)
            && (self.subtype == "*" || self.subtype == subtype)
    }

    /// Check whether this range beats the best match found so far.
    fn outranks(&self, quality: f32, specificity: (bool, bool, usize)) -> bool {
        self.quality > quality || (self.quality == quality && self.specificity() > specificity)
    }
}

impl std::str::FromStr for MediaRange {
    type Err = AcceptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut pieces = s.split(';');
        let essence = pieces.next().unwrap_or_default().trim().to_ascii_lowercase();
        let (main_type, subtype) = match essence.as_str() {
            "*" => ("*", "*"),
            essence => essence
                .split_once('/')
                .map(|(main_type, subtype)| (main_type.trim(), subtype.trim()))
                .filter(|(main_type, subtype)| !main_type.is_empty() && !subtype.is_empty())
                .ok_or_else(|| AcceptError::InvalidMediaRange(s.trim().to_string()))?,
        };
        let mut quality = 1.0;
        let mut parameter_count = 0;
        for parameter in pieces {
            match parameter.split_once('=') {
                Some((name, value)) if name.trim().eq_ignore_ascii_case("q") => {
                    let value = value.trim();
                    quality = value
                        .parse::<f32>()
                        .ok()
                        .filter(|quality| quality.is_finite())
                        .ok_or_else(|| AcceptError::InvalidQuality(value.to_string()))?
                        .clamp(0.0, 1.0);
                }
                _ => parameter_count += 1,
            }
        }
        Ok(MediaRange {
            main_type: main_type.to_string(),
            subtype: subtype.to_string(),
            parameter_count,
            quality,
        })
    }
}

/// Parse an `Accept` header, most specific ranges first.
pub fn parse_accept(header: &str) -> Result<Vec<MediaRange>, AcceptError> {
    let mut media_ranges = header
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::parse::<MediaRange>)
        .collect::<Result<Vec<MediaRange>, AcceptError>>()?;
    media_ranges.sort_by(|a, b| {
        b.specificity()
            .cmp(&a.specificity())
            .then(b.quality.total_cmp(&a.quality))
    });
    Ok(media_ranges)
}

/// Get the quality the client assigns to a media type, zero if it does not accept it at all.
pub fn quality(media_ranges: &[MediaRange], media_type: &str) -> f32 {
    media_ranges
        .iter()
        .find(|media_range| media_range.matches(media_type))
        .map_or(0.0, |media_range| media_range.quality)
}

/// Pick the offered media type the client prefers.
///
/// Ties go to the type offered first.
pub fn best_match<'a>(media_ranges: &[MediaRange], offers: &[&'a str]) -> Option<&'a str> {
    let mut best: Option<(&'a str, f32, (bool, bool, usize))> = None;
    for offer in offers {
        for media_range in media_ranges {
            if media_range.quality <= 0.0 || !media_range.matches(offer) {
                continue;
            }
            let outranks = best.map_or(true, |(_, quality, specificity)| {
                media_range.outranks(quality, specificity)
            });
            if outranks {
                best = Some((*offer, media_range.quality, media_range.specificity()));
            }
        }
    }
    best.map(|(offer, _, _)| offer)
}

/// Check whether the client prefers JSON over HTML.
///
/// JSON has to be the best match and strictly preferred to HTML. A missing or malformed header
/// means HTML.
pub fn wants_json(accept: Option<&HeaderValue>) -> bool {
    let Some(header) = accept.and_then(|accept| accept.to_str().ok()) else {
        return false;
    };
    let media_ranges = match parse_accept(header) {
        Ok(media_ranges) => media_ranges,
        Err(err) => {
            debug!("ignoring accept header: {err}");
            return false;
        }
    };
    best_match(&media_ranges, &[APPLICATION_JSON, TEXT_HTML]) == Some(APPLICATION_JSON)
        && quality(&media_ranges, APPLICATION_JSON) > quality(&media_ranges, TEXT_HTML)
}
