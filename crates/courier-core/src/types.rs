use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Turns
// =============================================================================

/// Who authored a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Upper-case label used when flattening a conversation into a transcript.
    pub fn transcript_label(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
        }
    }
}

/// One message in a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

// =============================================================================
// Slots
// =============================================================================

/// A single structured field the dialogue has to fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Origin,
    Destination,
    DateOrTime,
}

impl Slot {
    /// All slots in prompting order.
    pub const ALL: [Slot; 3] = [Slot::Origin, Slot::Destination, Slot::DateOrTime];

    /// Wire name of the field backing this slot.
    pub fn field_name(&self) -> &'static str {
        match self {
            Slot::Origin => "ship_from_city",
            Slot::Destination => "ship_to_city",
            Slot::DateOrTime => "ship_date",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Slot::Origin => "origin",
            Slot::Destination => "destination",
            Slot::DateOrTime => "date_or_time",
        };
        write!(f, "{}", s)
    }
}

// =============================================================================
// ShipmentRecord
// =============================================================================

/// Best current estimate of the shipment being described.
///
/// Serialized with the field names used on the wire by the chat backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    #[serde(rename = "ship_from_city", default)]
    pub origin_city: Option<String>,
    #[serde(rename = "ship_to_city", default)]
    pub destination_city: Option<String>,
    #[serde(rename = "ship_date", default)]
    pub ship_date_or_time: Option<String>,
}

impl ShipmentRecord {
    /// A record with every slot unset.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Origin => self.origin_city.as_deref(),
            Slot::Destination => self.destination_city.as_deref(),
            Slot::DateOrTime => self.ship_date_or_time.as_deref(),
        }
    }

    pub fn set(&mut self, slot: Slot, value: Option<String>) {
        match slot {
            Slot::Origin => self.origin_city = value,
            Slot::Destination => self.destination_city = value,
            Slot::DateOrTime => self.ship_date_or_time = value,
        }
    }

    /// Whether the slot holds a non-blank value.
    pub fn is_filled(&self, slot: Slot) -> bool {
        self.get(slot).is_some_and(|v| !v.trim().is_empty())
    }

    pub fn is_complete(&self) -> bool {
        Slot::ALL.iter().all(|s| self.is_filled(*s))
    }

    /// Slots still unset, in prompting order.
    pub fn missing(&self) -> Vec<Slot> {
        Slot::ALL
            .into_iter()
            .filter(|s| !self.is_filled(*s))
            .collect()
    }

    /// Merge a freshly extracted candidate into this record.
    ///
    /// A non-blank candidate value replaces the current one; a blank or absent
    /// candidate value leaves it untouched. Returns the merged record and the
    /// slots whose value actually changed.
    pub fn merge(&self, candidate: &ShipmentRecord) -> (ShipmentRecord, Vec<Slot>) {
        let mut merged = self.clone();
        let mut changed = Vec::new();

        for slot in Slot::ALL {
            let Some(value) = candidate.get(slot) else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            if merged.get(slot) != Some(value) {
                merged.set(slot, Some(value.to_string()));
                changed.push(slot);
            }
        }

        (merged, changed)
    }
}

// =============================================================================
// DialogueState
// =============================================================================

/// Position of a conversation in the slot-filling flow.
///
/// Always derived from a [`ShipmentRecord`], never stored on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    AwaitingOrigin,
    AwaitingDestination,
    AwaitingDate,
    Complete,
}

impl DialogueState {
    /// Derive the state from which slots are filled.
    pub fn of(record: &ShipmentRecord) -> Self {
        if !record.is_filled(Slot::Origin) {
            DialogueState::AwaitingOrigin
        } else if !record.is_filled(Slot::Destination) {
            DialogueState::AwaitingDestination
        } else if !record.is_filled(Slot::DateOrTime) {
            DialogueState::AwaitingDate
        } else {
            DialogueState::Complete
        }
    }

    /// The slot this state is waiting on, if any.
    pub fn awaiting(&self) -> Option<Slot> {
        match self {
            DialogueState::AwaitingOrigin => Some(Slot::Origin),
            DialogueState::AwaitingDestination => Some(Slot::Destination),
            DialogueState::AwaitingDate => Some(Slot::DateOrTime),
            DialogueState::Complete => None,
        }
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DialogueState::AwaitingOrigin => "awaiting_origin",
            DialogueState::AwaitingDestination => "awaiting_destination",
            DialogueState::AwaitingDate => "awaiting_date",
            DialogueState::Complete => "complete",
        };
        write!(f, "{}", s)
    }
}
