use core_types::IndicatorSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("no JSON object found in response ({len} chars): {snippet}")]
    NoJson { len: usize, snippet: String },

    #[error("failed to parse extracted JSON: {source}; extracted: {snippet}")]
    BadJson {
        source: serde_json::Error,
        snippet: String,
    },
}

fn snippet(text: &str) -> String {
    const MAX: usize = 200;
    if text.len() <= MAX {
        return text.to_string();
    }
    let mut end = MAX;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Extracts an [`IndicatorSet`] from free-form backend output.
///
/// Backends are asked for bare JSON but routinely wrap it in prose or
/// markdown fencing, so decoding is tolerant: strict decode first, then a
/// best-effort substring bounded by the brace nearest the `"ma20"` marker
/// (or the first brace at all) and the last brace in the text. Field
/// values are never guessed; a field the backend omitted decodes to 0 and
/// is scored as a genuine deviation.
pub fn parse_indicator_response(response: &str) -> Result<IndicatorSet, ParseError> {
    // Happy path: the backend did as asked.
    if let Ok(result) = serde_json::from_str::<IndicatorSet>(response) {
        return Ok(result);
    }

    let start = match response.find("\"ma20\"") {
        // Opening brace closest to the marker field.
        Some(marker) => response[..marker].rfind('{'),
        None => response.find('{'),
    }
    .or_else(|| response.find('{'));

    let end = response.rfind('}');

    let (start, end) = match (start, end) {
        (Some(s), Some(e)) if e > s => (s, e),
        _ => {
            return Err(ParseError::NoJson {
                len: response.len(),
                snippet: snippet(response),
            })
        }
    };

    let extracted = &response[start..=end];
    serde_json::from_str::<IndicatorSet>(extracted).map_err(|source| ParseError::BadJson {
        source,
        snippet: snippet(extracted),
    })
}
