//! Per-field validation results and message aggregation

use mealtrack_undo_redo::{FieldId, Model};

/// Separator between the messages of individually invalid child records
pub const MESSAGE_SEPARATOR: &str = "  ";

/// Business rules for one model type
///
/// Must be a pure function of the current field values plus whatever
/// collaborators it queries; nothing is cached between calls.
pub trait Validator<M: Model> {
    /// Message explaining why `field` is invalid, or `None`
    fn validate(&self, model: &M, field: M::Field) -> Option<String>;
}

impl<M, F> Validator<M> for F
where
    M: Model,
    F: Fn(&M, M::Field) -> Option<String>,
{
    fn validate(&self, model: &M, field: M::Field) -> Option<String> {
        self(model, field)
    }
}

/// Concatenate the non-empty messages, in order, with [`MESSAGE_SEPARATOR`]
pub fn join_messages<I, S>(messages: I) -> Option<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let joined = messages
        .into_iter()
        .flatten()
        .filter(|message| !message.as_ref().is_empty())
        .fold(String::new(), |mut acc, message| {
            if !acc.is_empty() {
                acc.push_str(MESSAGE_SEPARATOR);
            }
            acc.push_str(message.as_ref());
            acc
        });

    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// `message` when `value` is blank
pub fn required(value: &str, message: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some(message.to_string())
    } else {
        None
    }
}

/// Validation outcome for every field of a model, in [`FieldId::ALL`] order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<F: FieldId> {
    entries: Vec<(F, Option<String>)>,
}

impl<F: FieldId> FieldErrors<F> {
    /// Run `check` for every field; empty messages count as valid
    pub fn collect(mut check: impl FnMut(F) -> Option<String>) -> Self {
        let entries = F::ALL
            .iter()
            .map(|field| {
                let message = check(*field).filter(|message| !message.is_empty());
                (*field, message)
            })
            .collect();
        FieldErrors { entries }
    }

    /// Message for one field
    pub fn get(&self, field: F) -> Option<&str> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .and_then(|(_, message)| message.as_deref())
    }

    /// True when no field has a message
    pub fn is_valid(&self) -> bool {
        self.entries.iter().all(|(_, message)| message.is_none())
    }

    /// First message in field order
    pub fn first(&self) -> Option<&str> {
        self.entries
            .iter()
            .find_map(|(_, message)| message.as_deref())
    }

    /// Every message joined with [`MESSAGE_SEPARATOR`]
    pub fn merged(&self) -> Option<String> {
        join_messages(self.entries.iter().map(|(_, message)| message.as_deref()))
    }

    /// Fields that currently have a message
    pub fn invalid_fields(&self) -> impl Iterator<Item = F> + '_ {
        self.entries
            .iter()
            .filter(|(_, message)| message.is_some())
            .map(|(field, _)| *field)
    }

    /// Every field with its message
    pub fn iter(&self) -> impl Iterator<Item = (F, Option<&str>)> + '_ {
        self.entries
            .iter()
            .map(|(field, message)| (*field, message.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Probe {
        Name,
        Amount,
        Parts,
    }

    impl FieldId for Probe {
        const ALL: &'static [Self] = &[Probe::Name, Probe::Amount, Probe::Parts];

        fn name(self) -> &'static str {
            match self {
                Probe::Name => "Name",
                Probe::Amount => "Amount",
                Probe::Parts => "Parts",
            }
        }
    }

    #[test]
    fn test_join_messages_uses_two_spaces_in_order() {
        let joined = join_messages(vec![Some("First."), None, Some(""), Some("Second.")]);
        assert_eq!(joined.as_deref(), Some("First.  Second."));
    }

    #[test]
    fn test_join_messages_none_when_all_valid() {
        assert_eq!(join_messages(Vec::<Option<String>>::new()), None);
        assert_eq!(join_messages(vec![None::<&str>, Some("")]), None);
    }

    #[test]
    fn test_required_rejects_blank() {
        assert!(required("  ", "A name is required.").is_some());
        assert!(required("Fruit", "A name is required.").is_none());
    }

    #[test]
    fn test_field_errors_aggregate() {
        let errors = FieldErrors::collect(|field| match field {
            Probe::Name => Some(String::new()),
            Probe::Amount => Some("Amount must be positive.".to_string()),
            Probe::Parts => Some("Parts are missing.".to_string()),
        });

        assert!(!errors.is_valid());
        assert_eq!(errors.get(Probe::Name), None);
        assert_eq!(errors.first(), Some("Amount must be positive."));
        assert_eq!(
            errors.merged().as_deref(),
            Some("Amount must be positive.  Parts are missing.")
        );
        assert_eq!(
            errors.invalid_fields().collect::<Vec<_>>(),
            vec![Probe::Amount, Probe::Parts]
        );
    }

    #[test]
    fn test_field_errors_valid() {
        let errors = FieldErrors::<Probe>::collect(|_| None);
        assert!(errors.is_valid());
        assert_eq!(errors.first(), None);
        assert_eq!(errors.iter().count(), 3);
    }
}
