//! Fixed assistant utterances.

use courier_core::{DialogueState, ShipmentRecord, Slot};

pub const ASK_ORIGIN: &str = "Which city is the shipment leaving from?";
pub const ASK_DESTINATION: &str = "Which city is the shipment going to?";
pub const ASK_DATE: &str = "When should it ship? A date or a time is fine.";
pub const ACKNOWLEDGE: &str = "Got it.";
pub const TRANSIENT_FAILURE: &str =
    "Temporary connection issue with the extraction service. Please send that again.";

/// The question asked while waiting on `slot`.
pub fn ask(slot: Slot) -> &'static str {
    match slot {
        Slot::Origin => ASK_ORIGIN,
        Slot::Destination => ASK_DESTINATION,
        Slot::DateOrTime => ASK_DATE,
    }
}

/// Which slot an earlier assistant turn was asking for, if any.
pub fn asked_slot(assistant_text: &str) -> Option<Slot> {
    Slot::ALL
        .into_iter()
        .find(|slot| assistant_text.contains(ask(*slot)))
}

/// Confirmation summary for a complete record.
pub fn summary(record: &ShipmentRecord) -> String {
    format!(
        "All set: shipping from {} to {}, {}.",
        record.origin_city.as_deref().unwrap_or_default(),
        record.destination_city.as_deref().unwrap_or_default(),
        record.ship_date_or_time.as_deref().unwrap_or_default(),
    )
}

/// Reply for a record after a successful extraction.
///
/// `changed` lists the slots this turn filled or corrected; when non-empty and
/// something is still missing, the question is prefixed with an
/// acknowledgement.
pub fn reply_for(record: &ShipmentRecord, changed: &[Slot]) -> String {
    match DialogueState::of(record).awaiting() {
        Some(slot) if changed.is_empty() => ask(slot).to_string(),
        Some(slot) => format!("{} {}", ACKNOWLEDGE, ask(slot)),
        None => summary(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asked_slot_recognises_prompts() {
        assert_eq!(asked_slot(ASK_ORIGIN), Some(Slot::Origin));
        assert_eq!(
            asked_slot(&format!("{} {}", ACKNOWLEDGE, ASK_DESTINATION)),
            Some(Slot::Destination)
        );
        assert_eq!(asked_slot(ASK_DATE), Some(Slot::DateOrTime));
        assert_eq!(asked_slot("Hello there"), None);
        assert_eq!(asked_slot(TRANSIENT_FAILURE), None);
    }

    #[test]
    fn test_reply_for_empty_record_asks_origin() {
        assert_eq!(reply_for(&ShipmentRecord::empty(), &[]), ASK_ORIGIN);
    }

    #[test]
    fn test_reply_for_acknowledges_new_information() {
        let record = ShipmentRecord {
            origin_city: Some("Leeds".into()),
            ..Default::default()
        };
        assert_eq!(
            reply_for(&record, &[Slot::Origin]),
            "Got it. Which city is the shipment going to?"
        );
        assert_eq!(reply_for(&record, &[]), ASK_DESTINATION);
    }

    #[test]
    fn test_summary_contains_all_fields() {
        let record = ShipmentRecord {
            origin_city: Some("Sheffield".into()),
            destination_city: Some("London".into()),
            ship_date_or_time: Some("9:30".into()),
        };
        let reply = reply_for(&record, &[Slot::DateOrTime]);
        assert_eq!(reply, "All set: shipping from Sheffield to London, 9:30.");
    }
}
