//! Giving API: funds, batches, and donations.

resource_module! {
	/// Giving API (`/giving/v2`).
	Giving, "/giving/v2"
}
impl Giving {
	resource_op!("Lists funds.", list_funds, list, "funds");
	resource_op!("Fetches one fund.", get_fund, get, "funds");
	resource_op!("Creates a fund.", create_fund, create, "funds");
	resource_op!("Updates a fund.", update_fund, update, "funds");
	resource_op!("Deletes a fund.", delete_fund, delete, "funds");
	resource_op!("Lists donation batches.", list_batches, list, "batches");
	resource_op!("Fetches one batch.", get_batch, get, "batches");
	resource_op!("Creates a batch.", create_batch, create, "batches");
	resource_op!("Updates a batch.", update_batch, update, "batches");
	resource_op!("Deletes a batch.", delete_batch, delete, "batches");
	resource_op!("Lists donations.", list_donations, list, "donations");
	resource_op!("Fetches one donation.", get_donation, get, "donations");
	resource_op!(
		"Lists the donations in a batch.",
		get_batch_donations,
		related,
		"batches",
		"donations"
	);
}
