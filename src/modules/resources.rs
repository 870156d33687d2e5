//! Resources API: bookable items and their checkouts.

resource_module! {
	/// Resources API (`/resources/v2`).
	Resources, "/resources/v2"
}
impl Resources {
	resource_op!("Lists resource items.", list_items, list, "items");
	resource_op!("Fetches one item.", get_item, get, "items");
	resource_op!("Creates an item.", create_item, create, "items");
	resource_op!("Updates an item.", update_item, update, "items");
	resource_op!("Deletes an item.", delete_item, delete, "items");
	resource_op!("Lists checkouts.", list_checkouts, list, "checkouts");
	resource_op!("Fetches one checkout.", get_checkout, get, "checkouts");
	resource_op!("Creates a checkout.", create_checkout, create, "checkouts");
	resource_op!("Updates a checkout.", update_checkout, update, "checkouts");
	resource_op!("Deletes a checkout.", delete_checkout, delete, "checkouts");
	resource_op!(
		"Lists the checkouts of an item.",
		get_item_checkouts,
		related,
		"items",
		"checkouts"
	);
}
