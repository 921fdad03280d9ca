use serde::Serialize;
use strum_macros::{AsRefStr, Display};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    Cashier = 4,
    Warehouse = 5,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            4 => Some(Role::Cashier),
            5 => Some(Role::Warehouse),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        for id in 1..=5u8 {
            assert_eq!(Role::from_id(id).map(Role::id), Some(id));
        }
        assert!(Role::from_id(0).is_none());
        assert!(Role::from_id(6).is_none());
    }

    #[test]
    fn test_label() {
        assert_eq!(Role::Hr.to_string(), "HR");
        assert_eq!(Role::Warehouse.as_ref(), "WAREHOUSE");
    }
}
