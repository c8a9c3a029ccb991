//! Planned changes for a secret resource.

use serde::Serialize;

use crate::secret::{CharClass, DesiredState, GeneratorConfig, SecretState};

/// Shown in place of sensitive values.
pub const SENSITIVE: &str = "(sensitive)";
/// Shown for values only the store or the generator can produce.
pub const KNOWN_AFTER_APPLY: &str = "(known after apply)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannedAction {
    Create,
    Update,
    NoOp,
}

/// One attribute that changes between prior state and plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeChange {
    pub attribute: &'static str,
    pub before: Option<String>,
    pub after: Option<String>,
}

impl AttributeChange {
    fn new(attribute: &'static str, before: impl ToString, after: impl ToString) -> Self {
        Self {
            attribute,
            before: Some(before.to_string()),
            after: Some(after.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub action: PlannedAction,
    pub changes: Vec<AttributeChange>,
}

impl Plan {
    pub fn is_noop(&self) -> bool {
        self.action == PlannedAction::NoOp
    }

    pub fn change(&self, attribute: &str) -> Option<&AttributeChange> {
        self.changes.iter().find(|c| c.attribute == attribute)
    }

    /// Plan for a resource that has no prior state.
    pub fn create(desired: &DesiredState) -> Self {
        let mut changes = vec![
            AttributeChange {
                attribute: "id",
                before: None,
                after: Some(KNOWN_AFTER_APPLY.into()),
            },
            AttributeChange {
                attribute: "key",
                before: None,
                after: Some(desired.key.clone()),
            },
            AttributeChange {
                attribute: "value",
                before: None,
                after: Some(match desired.explicit_value() {
                    Some(_) => SENSITIVE.into(),
                    None => KNOWN_AFTER_APPLY.into(),
                }),
            },
        ];
        if let Some(note) = desired.explicit_note() {
            changes.push(AttributeChange {
                attribute: "note",
                before: None,
                after: Some(note.to_string()),
            });
        }
        if let Some(project_id) = desired.project_id {
            changes.push(AttributeChange {
                attribute: "project_id",
                before: None,
                after: Some(project_id.to_string()),
            });
        }

        Self {
            action: PlannedAction::Create,
            changes,
        }
    }

    /// Diff `desired` against `prior`.
    ///
    /// Attributes left unset in `desired` keep their prior value and so
    /// never produce a change. In particular an absent `value` with an
    /// unchanged generator config plans nothing, even when the stored
    /// value was rotated outside the provider.
    pub fn diff(desired: &DesiredState, prior: &SecretState) -> Self {
        let mut changes = Vec::new();

        if !desired.key.is_empty() && desired.key != prior.key {
            changes.push(AttributeChange::new("key", &prior.key, &desired.key));
        }

        let regenerate = desired.explicit_value().is_none() && desired.generator != prior.generator;
        match desired.explicit_value() {
            Some(value) if value != prior.value => {
                changes.push(AttributeChange::new("value", SENSITIVE, SENSITIVE));
            }
            None if regenerate => {
                changes.push(AttributeChange::new("value", SENSITIVE, KNOWN_AFTER_APPLY));
            }
            _ => {}
        }

        if let Some(note) = desired.explicit_note() {
            if note != prior.note {
                changes.push(AttributeChange::new("note", &prior.note, note));
            }
        }

        if let Some(project_id) = desired.project_id {
            if Some(project_id) != prior.project_id {
                changes.push(AttributeChange {
                    attribute: "project_id",
                    before: prior.project_id.map(|p| p.to_string()),
                    after: Some(project_id.to_string()),
                });
            }
        }

        generator_changes(&prior.generator, &desired.generator, &mut changes);

        if changes.is_empty() {
            Self {
                action: PlannedAction::NoOp,
                changes,
            }
        } else {
            changes.push(AttributeChange::new(
                "revision_date",
                prior.revision_date.to_rfc3339(),
                KNOWN_AFTER_APPLY,
            ));
            Self {
                action: PlannedAction::Update,
                changes,
            }
        }
    }
}

fn generator_changes(
    before: &GeneratorConfig,
    after: &GeneratorConfig,
    changes: &mut Vec<AttributeChange>,
) {
    if before.length != after.length {
        changes.push(AttributeChange::new("length", before.length, after.length));
    }
    if before.avoid_ambiguous != after.avoid_ambiguous {
        changes.push(AttributeChange::new(
            "avoid_ambiguous",
            before.avoid_ambiguous,
            after.avoid_ambiguous,
        ));
    }
    for class in CharClass::ALL {
        if before.is_enabled(class) != after.is_enabled(class) {
            changes.push(AttributeChange::new(
                class.enabled_attribute(),
                before.is_enabled(class),
                after.is_enabled(class),
            ));
        }
        if before.minimum(class) != after.minimum(class) {
            changes.push(AttributeChange::new(
                class.min_attribute(),
                before.minimum(class),
                after.minimum(class),
            ));
        }
    }
}
