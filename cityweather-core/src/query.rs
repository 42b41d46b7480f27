use crate::{error::FetchError, model::{SearchQuery, UnitSystem}};

/// Validate user-entered city text.
///
/// Trims surrounding whitespace and rejects input that is empty afterwards.
/// Never touches the network; percent-encoding happens when the request is built.
pub fn normalize(raw_input: &str, units: UnitSystem) -> Result<SearchQuery, FetchError> {
    let city = raw_input.trim();
    if city.is_empty() {
        return Err(FetchError::InvalidInput);
    }

    Ok(SearchQuery {
        city: city.to_string(),
        units,
    })
}
