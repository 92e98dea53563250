use crate::error::{EngineError, Result};
use netreport_model::Coordinate;
use regex::Regex;
use std::sync::OnceLock;

fn bracket_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(\d+)\]").expect("literal pattern"))
}

/// Extract a coordinate from a hierarchical module path.
///
/// Scans the path left to right for bracket-enclosed integers (`...[n]...`)
/// and takes the first `arity` of them as the coordinate; any further tokens
/// (host index, app index) are ignored. Pure: the same path always yields the
/// same coordinate.
pub fn extract_coordinate(path: &str, arity: usize) -> Result<Coordinate> {
    let mut components = Vec::with_capacity(arity);
    for caps in bracket_token_re().captures_iter(path) {
        if components.len() == arity {
            break;
        }
        let token = &caps[1];
        let n = token
            .parse::<u32>()
            .map_err(|_| EngineError::MalformedValue {
                key: path.to_string(),
                value: token.to_string(),
            })?;
        components.push(n);
    }
    if components.len() < arity {
        return Err(EngineError::CoordinateTokens {
            path: path.to_string(),
            expected: arity,
            found: components.len(),
        });
    }
    Ok(Coordinate::new(components))
}
