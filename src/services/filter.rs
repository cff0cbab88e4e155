//! Single-field filter over a booking list.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::domain::booking::BookingStatus;
use crate::domain::types::{BookingCode, TypeConstraintError, UserName};
use crate::repository::Predicate;

/// Fields a booking list can be filtered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterField {
    BookingCode,
    UserName,
    StartDate,
    EndDate,
    Status,
}

/// How the value of a filter field is entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterInput {
    Text,
    Date,
    Status,
}

impl FilterField {
    pub const ALL: [FilterField; 5] = [
        FilterField::BookingCode,
        FilterField::UserName,
        FilterField::StartDate,
        FilterField::EndDate,
        FilterField::Status,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            FilterField::BookingCode => "bookingCode",
            FilterField::UserName => "userName",
            FilterField::StartDate => "startDate",
            FilterField::EndDate => "endDate",
            FilterField::Status => "status",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FilterField::BookingCode => "Protocolo",
            FilterField::UserName => "Usuário",
            FilterField::StartDate => "Data início",
            FilterField::EndDate => "Data fim",
            FilterField::Status => "Status",
        }
    }

    pub const fn input(self) -> FilterInput {
        match self {
            FilterField::StartDate | FilterField::EndDate => FilterInput::Date,
            FilterField::Status => FilterInput::Status,
            FilterField::BookingCode | FilterField::UserName => FilterInput::Text,
        }
    }
}

impl Display for FilterField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FilterField {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterField::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("unknown filter: {s}")))
    }
}

/// A validated filter: exactly one field and its typed value.
#[derive(Clone, Debug, PartialEq)]
pub enum BookingFilter {
    BookingCode(BookingCode),
    UserName(UserName),
    /// Bookings made on or after midnight UTC of the date.
    StartDate(NaiveDate),
    /// Bookings made on or before midnight UTC of the date.
    EndDate(NaiveDate),
    Status(BookingStatus),
}

impl BookingFilter {
    /// Parses the raw form value entered for `field`.
    pub fn parse(field: FilterField, raw: &str) -> Result<Self, TypeConstraintError> {
        let raw = raw.trim();
        match field {
            FilterField::BookingCode => BookingCode::new(raw).map(BookingFilter::BookingCode),
            FilterField::UserName => UserName::new(raw).map(BookingFilter::UserName),
            FilterField::StartDate => parse_date(raw).map(BookingFilter::StartDate),
            FilterField::EndDate => parse_date(raw).map(BookingFilter::EndDate),
            FilterField::Status => {
                if raw.is_empty() {
                    return Err(TypeConstraintError::EmptyString);
                }
                raw.parse()
                    .map(BookingFilter::Status)
                    .map_err(TypeConstraintError::InvalidValue)
            }
        }
    }

    pub fn field(&self) -> FilterField {
        match self {
            BookingFilter::BookingCode(_) => FilterField::BookingCode,
            BookingFilter::UserName(_) => FilterField::UserName,
            BookingFilter::StartDate(_) => FilterField::StartDate,
            BookingFilter::EndDate(_) => FilterField::EndDate,
            BookingFilter::Status(_) => FilterField::Status,
        }
    }

    /// Store condition the filter narrows the base scope with.
    pub fn predicate(&self) -> Predicate {
        match self {
            BookingFilter::BookingCode(code) => Predicate::BookingCodeIs(code.clone()),
            BookingFilter::UserName(user_name) => Predicate::UserNameIs(user_name.clone()),
            BookingFilter::StartDate(date) => Predicate::BookedFrom(utc_midnight_millis(*date)),
            BookingFilter::EndDate(date) => Predicate::BookedUntil(utc_midnight_millis(*date)),
            BookingFilter::Status(status) => Predicate::StatusIs(*status),
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, TypeConstraintError> {
    if raw.is_empty() {
        return Err(TypeConstraintError::EmptyString);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| TypeConstraintError::InvalidDate(raw.to_string()))
}

fn utc_midnight_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Filter being edited: the chosen field and the raw value typed so far.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterDraft {
    pub field: FilterField,
    pub value: Option<String>,
}

/// What submitting the filter form does in the current state.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterAction {
    /// No field has been chosen yet.
    Nothing,
    Apply(BookingFilter),
    Clear,
}

#[derive(Clone, Debug, PartialEq)]
enum FilterState {
    Unfiltered {
        draft: Option<FilterDraft>,
    },
    /// The draft is frozen until the filter is cleared.
    Filtered {
        applied: BookingFilter,
        draft: FilterDraft,
    },
}

/// Two-state filter toggle. The same submit action applies a filter when
/// unfiltered and clears it when filtered.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterController {
    state: FilterState,
}

impl Default for FilterController {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterController {
    pub fn new() -> Self {
        Self {
            state: FilterState::Unfiltered { draft: None },
        }
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self.state, FilterState::Filtered { .. })
    }

    pub fn draft(&self) -> Option<&FilterDraft> {
        match &self.state {
            FilterState::Unfiltered { draft } => draft.as_ref(),
            FilterState::Filtered { draft, .. } => Some(draft),
        }
    }

    #[cfg(test)]
    fn applied(&self) -> Option<&BookingFilter> {
        match &self.state {
            FilterState::Unfiltered { .. } => None,
            FilterState::Filtered { applied, .. } => Some(applied),
        }
    }

    /// Chooses the field to filter by, discarding any value typed for the
    /// previous one. Ignored while a filter is applied.
    pub fn set_filter(&mut self, field: Option<FilterField>) {
        if let FilterState::Unfiltered { draft } = &mut self.state {
            *draft = field.map(|field| FilterDraft { field, value: None });
        }
    }

    /// Stores the raw value for the chosen field. Ignored while a filter is
    /// applied or when no field has been chosen.
    pub fn set_value(&mut self, value: impl Into<String>) {
        if let FilterState::Unfiltered { draft: Some(draft) } = &mut self.state {
            let value = value.into();
            draft.value = (!value.is_empty()).then_some(value);
        }
    }

    /// Resolves the submit action for the current state.
    pub fn submit(&self) -> Result<FilterAction, TypeConstraintError> {
        match &self.state {
            FilterState::Filtered { .. } => Ok(FilterAction::Clear),
            FilterState::Unfiltered { draft: None } => Ok(FilterAction::Nothing),
            FilterState::Unfiltered { draft: Some(draft) } => {
                let value = draft.value.as_deref().unwrap_or_default();
                BookingFilter::parse(draft.field, value).map(FilterAction::Apply)
            }
        }
    }

    /// Records that `filter` has been applied to the list.
    pub fn mark_applied(&mut self, filter: BookingFilter) {
        let draft = match &self.state {
            FilterState::Unfiltered {
                draft: Some(draft),
            } if draft.field == filter.field() => draft.clone(),
            _ => FilterDraft {
                field: filter.field(),
                value: None,
            },
        };
        self.state = FilterState::Filtered {
            applied: filter,
            draft,
        };
    }

    /// Back to unfiltered with no field chosen.
    pub fn reset(&mut self) {
        self.state = FilterState::Unfiltered { draft: None };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_keys_round_trip() {
        for field in FilterField::ALL {
            assert_eq!(field.key().parse::<FilterField>(), Ok(field));
        }
        assert!("campaignName".parse::<FilterField>().is_err());
    }

    #[test]
    fn start_date_is_utc_midnight() {
        let filter = BookingFilter::parse(FilterField::StartDate, "2024-01-31").unwrap();
        assert_eq!(filter.predicate(), Predicate::BookedFrom(1_706_659_200_000));
        assert_eq!(filter.predicate().to_string(), "bookingDate >= 1706659200000");
    }

    #[test]
    fn end_date_is_also_utc_midnight() {
        let filter = BookingFilter::parse(FilterField::EndDate, "2024-01-31").unwrap();
        assert_eq!(filter.predicate(), Predicate::BookedUntil(1_706_659_200_000));
    }

    #[test]
    fn rejects_malformed_values() {
        assert_eq!(
            BookingFilter::parse(FilterField::StartDate, "31/01/2024"),
            Err(TypeConstraintError::InvalidDate("31/01/2024".to_string()))
        );
        assert_eq!(
            BookingFilter::parse(FilterField::BookingCode, "  "),
            Err(TypeConstraintError::EmptyString)
        );
        assert!(BookingFilter::parse(FilterField::Status, "Cancelado").is_err());
    }

    #[test]
    fn status_and_user_filters_map_to_predicates() {
        let status = BookingFilter::parse(FilterField::Status, "CANCELADO").unwrap();
        assert_eq!(status.predicate().to_string(), "status == CANCELADO");

        let user = BookingFilter::parse(FilterField::UserName, " ana ").unwrap();
        assert_eq!(user.predicate().to_string(), "user.userName == ana");
    }

    #[test]
    fn changing_field_resets_value() {
        let mut controller = FilterController::new();
        controller.set_filter(Some(FilterField::BookingCode));
        controller.set_value("X1");
        controller.set_filter(Some(FilterField::UserName));

        assert_eq!(
            controller.draft(),
            Some(&FilterDraft {
                field: FilterField::UserName,
                value: None,
            })
        );
    }

    #[test]
    fn submit_toggles_between_apply_and_clear() {
        let mut controller = FilterController::new();
        assert_eq!(controller.submit(), Ok(FilterAction::Nothing));

        controller.set_filter(Some(FilterField::Status));
        controller.set_value("CANCELADO");
        let FilterAction::Apply(filter) = controller.submit().unwrap() else {
            panic!("expected apply");
        };
        controller.mark_applied(filter);

        assert!(controller.is_filtered());
        assert_eq!(controller.submit(), Ok(FilterAction::Clear));
        assert_eq!(
            controller.draft().and_then(|d| d.value.as_deref()),
            Some("CANCELADO")
        );

        controller.reset();
        assert!(!controller.is_filtered());
        assert_eq!(controller.draft(), None);
    }

    #[test]
    fn inputs_are_frozen_while_filtered() {
        let mut controller = FilterController::new();
        controller.set_filter(Some(FilterField::BookingCode));
        controller.set_value("X1");
        let FilterAction::Apply(filter) = controller.submit().unwrap() else {
            panic!("expected apply");
        };
        controller.mark_applied(filter.clone());

        controller.set_filter(Some(FilterField::Status));
        controller.set_value("CANCELADO");

        assert_eq!(controller.applied(), Some(&filter));
        assert_eq!(controller.draft().map(|d| d.field), Some(FilterField::BookingCode));
    }

    #[test]
    fn submit_without_value_fails() {
        let mut controller = FilterController::new();
        controller.set_filter(Some(FilterField::EndDate));
        assert_eq!(controller.submit(), Err(TypeConstraintError::EmptyString));
        assert!(!controller.is_filtered());
    }
}
