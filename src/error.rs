//! Error taxonomy for fetching and normalizing forecasts

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForecastError {
    /// The provider answered but flagged the request as unsuccessful
    #[error("Provider reported failure: {message}")]
    ProviderFailure { message: String },

    /// `None` when the looser first-found mode found no location entries at all
    #[error("{}", describe_missing(.requested))]
    LocationNotFound { requested: Option<String> },

    #[error("Malformed timestamp: {timestamp:?}")]
    MalformedTimestamp { timestamp: String },

    #[error("Forecast contains no time intervals")]
    EmptyForecast,

    #[error("Unexpected forecast structure: {detail}")]
    UnexpectedStructure { detail: String },

    /// Network or HTTP status failure while fetching the payload
    #[error("Transport error: {message}")]
    Transport { message: String },
}

impl ForecastError {
    pub fn provider_failure<S: Into<String>>(message: S) -> Self {
        Self::ProviderFailure {
            message: message.into(),
        }
    }

    pub fn location_not_found(requested: Option<&str>) -> Self {
        Self::LocationNotFound {
            requested: requested.map(str::to_string),
        }
    }

    pub fn malformed_timestamp<S: Into<String>>(timestamp: S) -> Self {
        Self::MalformedTimestamp {
            timestamp: timestamp.into(),
        }
    }

    pub fn unexpected<S: Into<String>>(detail: S) -> Self {
        Self::UnexpectedStructure {
            detail: detail.into(),
        }
    }

    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Get a message suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self {
            ForecastError::ProviderFailure { message } => {
                format!("The weather service rejected the request: {message}")
            }
            ForecastError::LocationNotFound {
                requested: Some(name),
            } => format!("No forecast is published for \"{name}\". Check the location name."),
            ForecastError::LocationNotFound { requested: None } => {
                "The weather service returned no locations.".to_string()
            }
            ForecastError::MalformedTimestamp { .. } | ForecastError::UnexpectedStructure { .. } => {
                "The weather service returned data in an unexpected format.".to_string()
            }
            ForecastError::EmptyForecast => {
                "The weather service returned no forecast periods.".to_string()
            }
            ForecastError::Transport { .. } => {
                "Unable to reach the weather service. Please try again later.".to_string()
            }
        }
    }
}

fn describe_missing(requested: &Option<String>) -> String {
    match requested {
        Some(name) => format!("Location not found: {name}"),
        None => "Forecast contains no location entries".to_string(),
    }
}

impl From<reqwest::Error> for ForecastError {
    fn from(e: reqwest::Error) -> Self {
        ForecastError::transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_not_found_names_the_request() {
        let err = ForecastError::location_not_found(Some("雲林縣"));
        assert_eq!(err.to_string(), "Location not found: 雲林縣");

        let err = ForecastError::location_not_found(None);
        assert_eq!(err.to_string(), "Forecast contains no location entries");
    }

    #[test]
    fn transport_is_distinct_from_normalization_errors() {
        assert!(ForecastError::transport("timeout").is_transport());
        assert!(!ForecastError::EmptyForecast.is_transport());
        assert!(!ForecastError::provider_failure("quota").is_transport());
    }
}
