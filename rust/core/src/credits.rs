// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Map credits: formats the copyright notes of a decoded document into
//! display strings and hands them to the chart's credits collaborator.

use crate::geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

/// Receives formatted map credits for display. Implemented by the chart
/// layer; the decoder only notifies, it does not render.
pub trait CreditsSink {
    fn publish(&mut self, credits: MapCredits);
}

/// Formatted credit strings for one map data document.
#[derive(Debug, Clone, PartialEq)]
pub struct MapCredits {
    /// Short text shown in the chart corner.
    pub text: String,
    /// Full text shown on hover.
    pub full_text: String,
}

/// Templates for map credit strings. Placeholders of the form
/// `{geojson.field}` are replaced with the matching metadata field of the
/// decoded document; fields without a value substitute as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreditsOptions {
    pub map_text: String,
    pub map_text_full: String,
}

impl Default for CreditsOptions {
    fn default() -> Self {
        Self {
            map_text: r#" © <a href="{geojson.copyrightUrl}">{geojson.copyrightShort}</a>"#
                .to_string(),
            map_text_full: "{geojson.copyright}".to_string(),
        }
    }
}

/// Format both credit strings for a decoded document.
pub fn format_credits(collection: &FeatureCollection, options: &CreditsOptions) -> MapCredits {
    MapCredits {
        text: substitute(&options.map_text, collection),
        full_text: substitute(&options.map_text_full, collection),
    }
}

fn field<'a>(collection: &'a FeatureCollection, name: &str) -> Option<&'a str> {
    match name {
        "copyright" => collection.copyright.as_deref(),
        "copyrightShort" => collection.copyright_short.as_deref(),
        "copyrightUrl" => collection.copyright_url.as_deref(),
        "title" => collection.title.as_deref(),
        _ => None,
    }
}

fn substitute(template: &str, collection: &FeatureCollection) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find('}') else {
            // Unterminated placeholder, keep the remainder literally.
            out.push_str(tail);
            return out;
        };
        match tail[1..end].strip_prefix("geojson.") {
            Some(name) => out.push_str(field(collection, name).unwrap_or("")),
            // Unknown placeholders stay as written.
            None => out.push_str(&tail[..=end]),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    out
}
