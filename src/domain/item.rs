//! Physical items carrying a scannable tag.

/// Where an item currently is in the delivery loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Home,
    InTransitOut,
    Delivered,
    InTransitReturn,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Home,
        Position::InTransitOut,
        Position::Delivered,
        Position::InTransitReturn,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "HOME" => Some(Position::Home),
            "IN_TRANSIT_OUT" => Some(Position::InTransitOut),
            "DELIVERED" => Some(Position::Delivered),
            "IN_TRANSIT_RETURN" => Some(Position::InTransitReturn),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Home => "HOME",
            Position::InTransitOut => "IN_TRANSIT_OUT",
            Position::Delivered => "DELIVERED",
            Position::InTransitReturn => "IN_TRANSIT_RETURN",
        }
    }
}

/// An item row. The tag is unique across all rows regardless of deleted
/// state, so a retired item's tag cannot be reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub item_id: i32,
    pub tag_id: String,
    pub position: Position,
    pub is_overdue: Option<bool>,
    pub deleted: bool,
}

impl Item {
    /// Overdue flag as the wire sees it: unset means not overdue.
    pub fn overdue(&self) -> bool {
        self.is_overdue.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_parses_all_known_values() {
        for p in Position::ALL {
            assert_eq!(Position::parse(p.as_str()), Some(p));
        }
        assert_eq!(Position::parse("WAREHOUSE"), None);
    }

    #[test]
    fn unset_overdue_reads_as_false() {
        let item = Item {
            item_id: 1,
            tag_id: "TAG-1".to_string(),
            position: Position::Home,
            is_overdue: None,
            deleted: false,
        };
        assert!(!item.overdue());
    }
}
