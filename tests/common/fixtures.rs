//! Test fixtures for the seeded demo data
//!
//! Ids and names here match what the store is seeded with, so tests can
//! reference them without looking anything up first.

/// Seeded record ids
pub mod ids {
    pub const ADMIN: &str = "user-admin";
    pub const LEADER: &str = "user-leader";
    pub const MEMBER_1: &str = "user-member-1";
    pub const MEMBER_2: &str = "user-member-2";
    pub const MEMBER_3: &str = "user-member-3";

    pub const HOUSEHOLD_LATU: &str = "household-latu";
    pub const HOUSEHOLD_TAULAGI: &str = "household-taulagi";
    pub const HOUSEHOLD_PERENISE: &str = "household-perenise";

    pub const GROUP_WORSHIP: &str = "group-worship";
    pub const GROUP_KIDS: &str = "group-kids";
    pub const GROUP_EAST: &str = "group-east";

    pub const EVENT_SUNDAY: &str = "event-sunday-service";
    pub const EVENT_REHEARSAL: &str = "event-team-rehearsal";

    pub const ANNOUNCEMENT_WELCOME: &str = "announcement-welcome";
    pub const ANNOUNCEMENT_FUNDRAISER: &str = "announcement-fundraiser";

    pub const FUND_GENERAL: &str = "fund-general";
    pub const FUND_MISSIONS: &str = "fund-missions";

    pub const CHILD_MELE: &str = "child-mele";

    pub const REQUEST_TYPE_PRAYER: &str = "req-type-prayer";
    pub const REQUEST_TYPE_SUGGESTION: &str = "req-type-suggestion";

    pub const ROLE_ADMIN: &str = "role-admin";
    pub const ROLE_LEADER: &str = "role-leader";
    pub const ROLE_MEMBER: &str = "role-member";
}

/// Seeded user reference
pub struct SeedUser {
    pub id: &'static str,
    pub email: &'static str,
    pub name: &'static str,
    pub token: Option<&'static str>,
}

/// Seeded user fixtures
pub struct UserFixtures;

impl UserFixtures {
    pub fn admin() -> SeedUser {
        SeedUser {
            id: ids::ADMIN,
            email: "admin@example.com",
            name: "Ariana Matau",
            token: Some("demo-admin"),
        }
    }

    pub fn leader() -> SeedUser {
        SeedUser {
            id: ids::LEADER,
            email: "leader@example.com",
            name: "Sione Latu",
            token: Some("demo-leader"),
        }
    }

    pub fn member() -> SeedUser {
        SeedUser {
            id: ids::MEMBER_1,
            email: "member1@example.com",
            name: "Maria Taulagi",
            token: Some("demo-member"),
        }
    }

    /// Seeded member without a session
    pub fn member_without_session() -> SeedUser {
        SeedUser {
            id: ids::MEMBER_3,
            email: "member3@example.com",
            name: "Lydia Ngata",
            token: None,
        }
    }
}

/// Number of users the store is seeded with
pub const SEEDED_USER_COUNT: usize = 5;

/// Number of audit entries the store is seeded with
pub const SEEDED_AUDIT_COUNT: usize = 3;
