//! Project details page: event logistics captured after a deal is won.
//!
//! All fields live under the project's `details` map so that each section
//! saves to the same nested document.

use crate::completion::{CompletionEntry, CompletionSchema};
use crate::error::CoreError;
use crate::field::{EditorLayout, FieldDescriptor, Section};

pub const SECTION_EVENT: &str = "event";
pub const SECTION_VENUE: &str = "venue";
pub const SECTION_FLIGHTS: &str = "flights";
pub const SECTION_HOTEL: &str = "hotel";
pub const SECTION_GROUND: &str = "ground_transport";
pub const SECTION_AV: &str = "av";
pub const SECTION_CONTACTS: &str = "contacts";

const EVENT_FORMATS: &[&str] = &["in_person", "virtual", "hybrid"];
const SEATING: &[&str] = &["theater", "classroom", "banquet", "cabaret", "boardroom"];
const TRANSPORT: &[&str] = &["car_service", "client_pickup", "rideshare", "rental_car", "none"];
const MICROPHONES: &[&str] = &["lavalier", "handheld", "headset", "podium"];

pub fn layout() -> Result<EditorLayout, CoreError> {
    EditorLayout::new(vec![
        Section::new(
            SECTION_EVENT,
            "Event Overview",
            vec![
                FieldDescriptor::text("details.event.title", "Event title"),
                FieldDescriptor::date("details.event.date", "Event date"),
                FieldDescriptor::select("details.event.format", "Format", EVENT_FORMATS),
                FieldDescriptor::time("details.event.start_time", "Start time"),
                FieldDescriptor::time("details.event.end_time", "End time"),
                FieldDescriptor::text("details.event.audience_size", "Expected audience"),
                FieldDescriptor::multiline("details.event.description", "Description"),
            ],
        ),
        Section::new(
            SECTION_VENUE,
            "Venue",
            vec![
                FieldDescriptor::text("details.venue.name", "Venue name"),
                FieldDescriptor::multiline("details.venue.address", "Address"),
                FieldDescriptor::text("details.venue.room", "Room"),
                FieldDescriptor::select("details.venue.seating", "Seating", SEATING),
                FieldDescriptor::checkbox("details.venue.green_room", "Green room available"),
            ],
        ),
        Section::new(
            SECTION_FLIGHTS,
            "Flights",
            vec![
                FieldDescriptor::checkbox("details.travel.flights.required", "Flights required"),
                FieldDescriptor::text("details.travel.flights.outbound.airline", "Outbound airline"),
                FieldDescriptor::text("details.travel.flights.outbound.number", "Outbound flight"),
                FieldDescriptor::date("details.travel.flights.outbound.date", "Outbound date"),
                FieldDescriptor::time("details.travel.flights.outbound.departs", "Departs"),
                FieldDescriptor::text("details.travel.flights.return.airline", "Return airline"),
                FieldDescriptor::text("details.travel.flights.return.number", "Return flight"),
                FieldDescriptor::date("details.travel.flights.return.date", "Return date"),
                FieldDescriptor::time("details.travel.flights.return.departs", "Departs"),
            ],
        ),
        Section::new(
            SECTION_HOTEL,
            "Hotel",
            vec![
                FieldDescriptor::text("details.travel.hotel.name", "Hotel"),
                FieldDescriptor::multiline("details.travel.hotel.address", "Address"),
                FieldDescriptor::date("details.travel.hotel.check_in", "Check-in"),
                FieldDescriptor::date("details.travel.hotel.check_out", "Check-out"),
                FieldDescriptor::text("details.travel.hotel.confirmation", "Confirmation number"),
            ],
        ),
        Section::new(
            SECTION_GROUND,
            "Ground Transport",
            vec![
                FieldDescriptor::select("details.travel.ground.mode", "Arrangement", TRANSPORT),
                FieldDescriptor::multiline("details.travel.ground.notes", "Pickup notes"),
            ],
        ),
        Section::new(
            SECTION_AV,
            "Audio / Visual",
            vec![
                FieldDescriptor::select("details.av.microphone", "Microphone", MICROPHONES),
                FieldDescriptor::checkbox("details.av.projector", "Projector"),
                FieldDescriptor::checkbox("details.av.confidence_monitor", "Confidence monitor"),
                FieldDescriptor::checkbox("details.av.recording", "Session recorded"),
                FieldDescriptor::multiline("details.av.notes", "AV notes"),
            ],
        ),
        Section::new(
            SECTION_CONTACTS,
            "Contacts",
            vec![
                FieldDescriptor::text("details.contacts.primary.name", "Primary contact"),
                FieldDescriptor::text("details.contacts.primary.email", "Email"),
                FieldDescriptor::text("details.contacts.primary.phone", "Phone"),
                FieldDescriptor::text("details.contacts.onsite.name", "On-site contact"),
                FieldDescriptor::text("details.contacts.onsite.phone", "On-site phone"),
            ],
        ),
    ])
}

pub fn completion_schema() -> CompletionSchema {
    CompletionSchema::new(vec![
        CompletionEntry::critical("details.event.title"),
        CompletionEntry::critical("details.event.date"),
        CompletionEntry::critical("details.event.format"),
        CompletionEntry::critical("details.event.start_time"),
        CompletionEntry::optional("details.event.end_time"),
        CompletionEntry::optional("details.event.audience_size"),
        CompletionEntry::critical("details.venue.name"),
        CompletionEntry::critical("details.venue.address"),
        CompletionEntry::optional("details.venue.room"),
        CompletionEntry::optional("details.venue.seating"),
        CompletionEntry::optional("details.travel.flights.outbound.number"),
        CompletionEntry::optional("details.travel.flights.return.number"),
        CompletionEntry::critical("details.travel.hotel.name"),
        CompletionEntry::optional("details.travel.hotel.confirmation"),
        CompletionEntry::optional("details.travel.ground.mode"),
        CompletionEntry::optional("details.av.microphone"),
        CompletionEntry::critical("details.contacts.primary.name"),
        CompletionEntry::critical("details.contacts.primary.email"),
        CompletionEntry::optional("details.contacts.onsite.phone"),
    ])
}
