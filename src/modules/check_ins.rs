//! Check-Ins API: events and locations.

resource_module! {
	/// Check-Ins API (`/check_ins/v2`).
	CheckIns, "/check_ins/v2"
}
impl CheckIns {
	resource_op!("Lists check-in events.", list_events, list, "events");
	resource_op!("Fetches one event.", get_event, get, "events");
	resource_op!("Creates an event.", create_event, create, "events");
	resource_op!("Updates an event.", update_event, update, "events");
	resource_op!("Deletes an event.", delete_event, delete, "events");
	resource_op!("Lists locations.", list_locations, list, "locations");
	resource_op!("Fetches one location.", get_location, get, "locations");
	resource_op!("Creates a location.", create_location, create, "locations");
	resource_op!("Updates a location.", update_location, update, "locations");
	resource_op!("Deletes a location.", delete_location, delete, "locations");
	resource_op!(
		"Lists the locations of an event.",
		get_event_locations,
		related,
		"events",
		"locations"
	);
}
