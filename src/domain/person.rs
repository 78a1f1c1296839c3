//! People referenced by orders: customers and staff.

/// Role a person plays in the tracking workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonRole {
    Admin,
    User,
    Driver,
    Customer,
}

impl PersonRole {
    /// Parse a wire/storage value, case-insensitively. Returns `None` for
    /// unknown strings rather than guessing.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Some(PersonRole::Admin),
            "USER" => Some(PersonRole::User),
            "DRIVER" => Some(PersonRole::Driver),
            "CUSTOMER" => Some(PersonRole::Customer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonRole::Admin => "ADMIN",
            PersonRole::User => "USER",
            PersonRole::Driver => "DRIVER",
            PersonRole::Customer => "CUSTOMER",
        }
    }
}

/// A person row. Name must be non-blank at creation; deletion is soft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub person_id: i32,
    pub name: String,
    pub role: PersonRole,
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!(PersonRole::parse("driver"), Some(PersonRole::Driver));
        assert_eq!(PersonRole::parse("CUSTOMER"), Some(PersonRole::Customer));
        assert_eq!(PersonRole::parse("wizard"), None);
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [
            PersonRole::Admin,
            PersonRole::User,
            PersonRole::Driver,
            PersonRole::Customer,
        ] {
            assert_eq!(PersonRole::parse(role.as_str()), Some(role));
        }
    }
}
