//! Services API: plans, teams, and service times.

resource_module! {
	/// Services API (`/services/v2`).
	Services, "/services/v2"
}
impl Services {
	resource_op!("Lists service plans.", list_plans, list, "plans");
	resource_op!("Fetches one plan.", get_plan, get, "plans");
	resource_op!("Creates a plan.", create_plan, create, "plans");
	resource_op!("Updates a plan.", update_plan, update, "plans");
	resource_op!("Deletes a plan.", delete_plan, delete, "plans");
	resource_op!("Lists teams.", list_teams, list, "teams");
	resource_op!("Fetches one team.", get_team, get, "teams");
	resource_op!("Creates a team.", create_team, create, "teams");
	resource_op!("Updates a team.", update_team, update, "teams");
	resource_op!("Deletes a team.", delete_team, delete, "teams");
	resource_op!("Lists service times.", list_times, list, "times");
	resource_op!("Fetches one service time.", get_time, get, "times");
	resource_op!("Lists the items of a plan.", get_plan_items, related, "plans", "items");
	resource_op!("Lists the teams scheduled on a plan.", get_plan_teams, related, "plans", "teams");
}
