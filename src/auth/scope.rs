//! Planning Center API scopes requested during authorization.

// self
use crate::_prelude::*;

/// Errors emitted when parsing scopes.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ScopeParseError {
	/// Scope is not one of the Planning Center API areas.
	#[error("Unknown Planning Center scope: {scope}.")]
	Unknown {
		/// The offending scope string.
		scope: String,
	},
}

/// One Planning Center API area an application can be granted access to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
	/// People (`/people/v2`).
	People,
	/// Services (`/services/v2`).
	Services,
	/// Check-Ins (`/check_ins/v2`).
	CheckIns,
	/// Giving (`/giving/v2`).
	Giving,
	/// Resources (`/resources/v2`).
	Resources,
}
impl Scope {
	/// Every API scope, in the order Planning Center documents them.
	pub const ALL: [Scope; 5] =
		[Scope::People, Scope::Services, Scope::CheckIns, Scope::Giving, Scope::Resources];

	/// Wire identifier.
	pub const fn as_str(self) -> &'static str {
		match self {
			Scope::People => "people",
			Scope::Services => "services",
			Scope::CheckIns => "check_ins",
			Scope::Giving => "giving",
			Scope::Resources => "resources",
		}
	}

	/// Space-delimited scope string; an empty selection means every scope.
	pub fn join(scopes: &[Scope]) -> String {
		let scopes = if scopes.is_empty() { &Self::ALL[..] } else { scopes };

		scopes.iter().map(|scope| scope.as_str()).collect::<Vec<_>>().join(" ")
	}

	/// Parses a space-delimited scope string.
	pub fn parse_list(value: &str) -> Result<Vec<Scope>, ScopeParseError> {
		value.split_whitespace().map(Scope::from_str).collect()
	}
}
impl Display for Scope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Scope {
	type Err = ScopeParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|scope| scope.as_str() == s)
			.ok_or_else(|| ScopeParseError::Unknown { scope: s.to_owned() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn empty_selection_requests_every_scope() {
		assert_eq!(Scope::join(&[]), "people services check_ins giving resources");
		assert_eq!(Scope::join(&[Scope::Giving, Scope::People]), "giving people");
	}

	#[test]
	fn parse_list_round_trips_and_rejects_unknowns() {
		assert_eq!(
			Scope::parse_list("people  check_ins").expect("Known scopes should parse."),
			vec![Scope::People, Scope::CheckIns]
		);
		assert_eq!(
			Scope::parse_list("people calendar"),
			Err(ScopeParseError::Unknown { scope: "calendar".into() })
		);
	}
}
