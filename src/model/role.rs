#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Superadmin = 1,
    Admin = 2,
    Hr = 3,
    Employee = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Superadmin),
            2 => Some(Role::Admin),
            3 => Some(Role::Hr),
            4 => Some(Role::Employee),
            _ => None,
        }
    }

    /// The privileged set: may manage payroll, review leave for anyone and
    /// see every account's records.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Superadmin | Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_tier_is_privileged() {
        assert!(Role::Superadmin.is_privileged());
        assert!(Role::Admin.is_privileged());
        assert!(!Role::Hr.is_privileged());
        assert!(!Role::Employee.is_privileged());
    }

    #[test]
    fn unknown_role_ids_are_rejected() {
        assert_eq!(Role::from_id(2), Some(Role::Admin));
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(9), None);
    }
}
