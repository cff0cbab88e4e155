use serde::Deserialize;
use validator::Validate;

use crate::forms::FormError;
use crate::services::filter::FilterField;

#[derive(Debug, Default, Deserialize, Validate)]
/// Submission of the booking list's filter toolbar.
pub struct FilterForm {
    /// Key of the chosen filter field; empty when none was chosen.
    #[serde(default)]
    #[validate(length(max = 32))]
    pub filter: String,
    /// Raw value typed for the field.
    #[serde(default)]
    #[validate(length(max = 128))]
    pub value: String,
}

impl FilterForm {
    /// The chosen field, `None` when the select was left on its placeholder.
    pub fn field(&self) -> Result<Option<FilterField>, FormError> {
        let key = self.filter.trim();
        if key.is_empty() {
            return Ok(None);
        }
        key.parse()
            .map(Some)
            .map_err(|_| FormError::InvalidFilterField(key.to_string()))
    }
}
