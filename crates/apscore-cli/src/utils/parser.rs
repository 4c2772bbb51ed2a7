use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    MissingSeparator(String),

    #[error("Component '{component}' cannot be empty in '{input}'.")]
    EmptyComponent {
        component: &'static str,
        input: String,
    },

    #[error(
        "Invalid row list '{0}'. Expected comma-separated indices or ranges (e.g., '0,1,43-54')."
    )]
    InvalidRowList(String),
}

/// Splits a `KEY=VALUE` override at the first `=`.
pub fn parse_set_value(input: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| ParseError::MissingSeparator(input.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "key",
            input: input.to_string(),
        });
    }
    Ok((key, value.trim()))
}

/// Parses a list of zero-based row indices such as `0,1,43-54`. Ranges are inclusive.
pub fn parse_row_list(input: &str) -> Result<Vec<usize>, ParseError> {
    let invalid = || ParseError::InvalidRowList(input.to_string());
    let mut rows = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start: usize = start.trim().parse().map_err(|_| invalid())?;
                let end: usize = end.trim().parse().map_err(|_| invalid())?;
                if start > end {
                    return Err(invalid());
                }
                rows.extend(start..=end);
            }
            None => rows.push(part.parse().map_err(|_| invalid())?),
        }
    }
    Ok(rows)
}
