//! People API: person and household records.

resource_module! {
	/// People API (`/people/v2`).
	People, "/people/v2"
}
impl People {
	resource_op!("Lists people.", list_people, list, "people");
	resource_op!("Fetches one person.", get_person, get, "people");
	resource_op!("Creates a person.", create_person, create, "people");
	resource_op!("Updates a person.", update_person, update, "people");
	resource_op!("Deletes a person.", delete_person, delete, "people");
	resource_op!("Lists households.", list_households, list, "households");
	resource_op!("Fetches one household.", get_household, get, "households");
	resource_op!("Creates a household.", create_household, create, "households");
	resource_op!("Updates a household.", update_household, update, "households");
	resource_op!("Deletes a household.", delete_household, delete, "households");
	resource_op!(
		"Lists the households a person belongs to.",
		get_person_households,
		related,
		"people",
		"households"
	);
	resource_op!(
		"Lists the people in a household.",
		get_household_people,
		related,
		"households",
		"people"
	);
}
