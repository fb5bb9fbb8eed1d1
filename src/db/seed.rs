//! Demo data the store starts with
//!
//! One church with five members, three system roles, and enough groups,
//! events, announcements and giving records to make every screen useful.
//! Dates are relative to the moment the store is built.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde_json::json;

use crate::models::{
    permissions, system_roles, Announcement, AnnouncementRead, AttendanceRecord, AttendanceStatus,
    AuditLogRecord, Audience, AuthProvider, Checkin, Child, Church, Contribution,
    ContributionMethod, Event, EventVisibility, Fund, Group, GroupMember, GroupMemberRole,
    GroupMemberStatus, GroupType, Household, HouseholdRole, Invitation, MemberRequest,
    MembershipStatus, RequestType, RequestTypeStatus, Role, Session, Settings, User, UserProfile,
    UserRoleAssignment, UserStatus,
};

/// Seeded session tokens, one per demo persona
pub mod tokens {
    pub const ADMIN: &str = "demo-admin";
    pub const LEADER: &str = "demo-leader";
    pub const MEMBER: &str = "demo-member";
}

/// Every collection the store holds, before it is wrapped by `DataStore`
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub users: Vec<User>,
    pub households: Vec<Household>,
    pub groups: Vec<Group>,
    pub events: Vec<Event>,
    pub announcements: Vec<Announcement>,
    pub announcement_reads: Vec<AnnouncementRead>,
    pub funds: Vec<Fund>,
    pub contributions: Vec<Contribution>,
    pub roles: Vec<Role>,
    pub children: Vec<Child>,
    pub checkins: Vec<Checkin>,
    pub sessions: Vec<Session>,
    pub settings: Option<Settings>,
    pub request_types: Vec<RequestType>,
    pub requests: Vec<MemberRequest>,
    pub invitations: Vec<Invitation>,
    pub audit_logs: Vec<AuditLogRecord>,
}

struct Clock(DateTime<Utc>);

impl Clock {
    /// `offset_days` from today at `hour`:00 UTC
    fn at(&self, offset_days: i64, hour: i64) -> DateTime<Utc> {
        let midnight = self.0.date_naive().and_time(NaiveTime::MIN).and_utc();
        midnight + Duration::days(offset_days) + Duration::hours(hour)
    }

    fn day(&self, offset_days: i64) -> NaiveDate {
        self.at(offset_days, 0).date_naive()
    }
}

impl SeedData {
    pub fn demo(church: &Church, now: DateTime<Utc>) -> Self {
        let clock = Clock(now);
        let church_id = church.id.as_str();

        let roles = system_role_set(church_id, clock.at(-365, 0));
        let households = vec![
            household(church_id, "household-matau", "Matau Family", Some("12 Karaka Street, Auckland"), clock.at(-90, 10)),
            household(church_id, "household-latu", "Latu Family", Some("48 Dominion Road, Auckland"), clock.at(-60, 10)),
            household(church_id, "household-taulagi", "Taulagi Family", None, clock.at(-45, 10)),
            household(church_id, "household-perenise", "Perenise Family", None, clock.at(-20, 10)),
            household(church_id, "household-ngata", "Ngata Family", None, clock.at(-10, 10)),
        ];

        let users = vec![
            user(
                church_id,
                ("user-admin", "admin@example.com"),
                ("Ariana", "Matau"),
                "household-matau",
                "role-admin",
                Some("+64 21 000 0001"),
                Some("Lead administrator"),
                clock.at(-90, 10),
                Some(clock.at(-1, 9)),
            ),
            user(
                church_id,
                ("user-leader", "leader@example.com"),
                ("Sione", "Latu"),
                "household-latu",
                "role-leader",
                Some("+64 21 000 0002"),
                Some("Worship leader"),
                clock.at(-60, 10),
                Some(clock.at(-2, 8)),
            ),
            user(
                church_id,
                ("user-member-1", "member1@example.com"),
                ("Maria", "Taulagi"),
                "household-taulagi",
                "role-member",
                Some("+64 21 000 0003"),
                Some("Soprano"),
                clock.at(-45, 10),
                Some(clock.at(-3, 11)),
            ),
            user(
                church_id,
                ("user-member-2", "member2@example.com"),
                ("Tomas", "Perenise"),
                "household-perenise",
                "role-member",
                Some("+64 21 000 0004"),
                Some("Sound desk volunteer"),
                clock.at(-20, 10),
                Some(clock.at(-5, 12)),
            ),
            user(
                church_id,
                ("user-member-3", "member3@example.com"),
                ("Lydia", "Ngata"),
                "household-ngata",
                "role-member",
                Some("+64 21 000 0005"),
                Some("Kids ministry helper"),
                clock.at(-10, 10),
                None,
            ),
        ];

        let groups = vec![
            Group {
                id: "group-worship".into(),
                church_id: church_id.into(),
                name: "Worship Team".into(),
                group_type: GroupType::ServiceMinistry,
                description: Some("Sunday service music ministry".into()),
                meeting_day: Some("Thursday".into()),
                meeting_time: Some("19:00".into()),
                tags: vec!["music".into(), "sunday".into()],
                members: vec![
                    member("user-leader", GroupMemberRole::Leader, clock.at(-120, 10)),
                    member("user-member-1", GroupMemberRole::Member, clock.at(-90, 10)),
                    member("user-member-2", GroupMemberRole::Volunteer, clock.at(-80, 10)),
                ],
                archived_at: None,
            },
            Group {
                id: "group-kids".into(),
                church_id: church_id.into(),
                name: "Kids Connect".into(),
                group_type: GroupType::ServiceMinistry,
                description: Some("Teaching for primary-aged kids during Sunday service".into()),
                meeting_day: Some("Sunday".into()),
                meeting_time: Some("10:00".into()),
                tags: vec!["kids".into(), "teaching".into()],
                members: vec![
                    member("user-admin", GroupMemberRole::CoLeader, clock.at(-200, 10)),
                    member("user-member-3", GroupMemberRole::Leader, clock.at(-40, 10)),
                ],
                archived_at: None,
            },
            Group {
                id: "group-east".into(),
                church_id: church_id.into(),
                name: "East Auckland Life Group".into(),
                group_type: GroupType::GeographicalMinistry,
                description: Some("Fortnightly life group in Howick".into()),
                meeting_day: Some("Tuesday".into()),
                meeting_time: Some("19:30".into()),
                tags: vec!["life-group".into()],
                members: vec![
                    member("user-admin", GroupMemberRole::Leader, clock.at(-365, 10)),
                    member("user-member-1", GroupMemberRole::Member, clock.at(-200, 10)),
                    member("user-member-2", GroupMemberRole::Member, clock.at(-120, 10)),
                ],
                archived_at: None,
            },
        ];

        let events = vec![
            Event {
                id: "event-sunday-service".into(),
                church_id: church_id.into(),
                title: "Sunday Service".into(),
                description: Some("Weekly gathering with worship and teaching.".into()),
                start_at: clock.at(3, 10),
                end_at: clock.at(3, 12),
                location: Some("Main Auditorium".into()),
                visibility: EventVisibility::Public,
                group_id: Some("group-worship".into()),
                tags: vec!["service".into(), "worship".into()],
                attendance: vec![
                    attendance("event-sunday-service", "user-leader", "user-admin", clock.at(-7, 10)),
                    attendance("event-sunday-service", "user-member-1", "user-admin", clock.at(-7, 10)),
                ],
                archived_at: None,
            },
            Event {
                id: "event-team-rehearsal".into(),
                church_id: church_id.into(),
                title: "Worship Team Rehearsal".into(),
                description: Some("Weekly rehearsal for the worship ministry.".into()),
                start_at: clock.at(2, 19),
                end_at: clock.at(2, 21),
                location: Some("Music Room".into()),
                visibility: EventVisibility::Private,
                group_id: Some("group-worship".into()),
                tags: vec!["music".into()],
                attendance: vec![attendance(
                    "event-team-rehearsal",
                    "user-leader",
                    "user-leader",
                    clock.at(-6, 19),
                )],
                archived_at: None,
            },
            Event {
                id: "event-kids-training".into(),
                church_id: church_id.into(),
                title: "Kids Ministry Training".into(),
                description: Some("Quarterly upskilling session for Kids Connect volunteers.".into()),
                start_at: clock.at(10, 9),
                end_at: clock.at(10, 12),
                location: Some("Youth Room".into()),
                visibility: EventVisibility::Private,
                group_id: Some("group-kids".into()),
                tags: vec!["training".into()],
                attendance: Vec::new(),
                archived_at: None,
            },
        ];

        let announcements = vec![
            Announcement {
                id: "announcement-welcome".into(),
                church_id: church_id.into(),
                title: "Welcome to the new app!".into(),
                body: "We are excited to launch our new member portal. Please explore the features and share feedback.".into(),
                audience: Audience::All,
                group_ids: None,
                publish_at: clock.at(-2, 9),
                expire_at: None,
                archived_at: None,
            },
            Announcement {
                id: "announcement-fundraiser".into(),
                church_id: church_id.into(),
                title: "Youth Missions Fundraiser".into(),
                body: "Youth ministry is hosting a bake sale fundraiser after the service this Sunday.".into(),
                audience: Audience::Custom,
                group_ids: Some(vec!["group-east".into()]),
                publish_at: clock.at(-1, 14),
                expire_at: None,
                archived_at: None,
            },
        ];

        let announcement_reads = vec![
            AnnouncementRead {
                announcement_id: "announcement-welcome".into(),
                user_id: "user-admin".into(),
                read_at: clock.at(-2, 10),
            },
            AnnouncementRead {
                announcement_id: "announcement-welcome".into(),
                user_id: "user-leader".into(),
                read_at: clock.at(-2, 12),
            },
        ];

        let funds = vec![
            fund(church_id, "fund-general", "General Offering", clock.at(-365, 0)),
            fund(church_id, "fund-missions", "Missions", clock.at(-365, 0)),
        ];

        let contributions = vec![
            Contribution {
                id: "contribution-1".into(),
                church_id: church_id.into(),
                member_id: "user-member-1".into(),
                amount: 120.0,
                date: clock.day(-12),
                fund_id: Some("fund-general".into()),
                method: ContributionMethod::BankTransfer,
                note: Some("Monthly pledge".into()),
                deleted_at: None,
            },
            Contribution {
                id: "contribution-2".into(),
                church_id: church_id.into(),
                member_id: "user-member-2".into(),
                amount: 40.0,
                date: clock.day(-7),
                fund_id: Some("fund-missions".into()),
                method: ContributionMethod::Cash,
                note: None,
                deleted_at: None,
            },
        ];

        let children = vec![Child {
            id: "child-mele".into(),
            household_id: "household-taulagi".into(),
            full_name: "Mele Taulagi".into(),
            date_of_birth: NaiveDate::from_ymd_opt(2017, 4, 12).unwrap_or_default(),
            allergies: Some("Peanuts".into()),
            medical_notes: None,
            created_at: clock.at(-30, 10),
            updated_at: clock.at(-30, 10),
            deleted_at: None,
        }];

        let sessions = vec![
            session(tokens::ADMIN, "user-admin", AuthProvider::Google, clock.at(-1, 0)),
            session(tokens::LEADER, "user-leader", AuthProvider::Facebook, clock.at(-1, 0)),
            session(tokens::MEMBER, "user-member-1", AuthProvider::Google, clock.at(-1, 0)),
        ];

        let audit_logs = vec![
            AuditLogRecord {
                id: "audit-1".into(),
                church_id: church_id.into(),
                actor_user_id: "user-admin".into(),
                action: "attendance.updated".into(),
                entity: "event".into(),
                entity_id: Some("event-sunday-service".into()),
                summary: "Ariana Matau marked Maria Taulagi as checkedIn for Sunday Service".into(),
                diff: None,
                metadata: Some(json!({"userId": "user-member-1", "newStatus": "checkedIn"})),
                created_at: clock.at(-2, 10),
            },
            AuditLogRecord {
                id: "audit-2".into(),
                church_id: church_id.into(),
                actor_user_id: "user-admin".into(),
                action: "giving.recorded".into(),
                entity: "contribution".into(),
                entity_id: Some("contribution-2".into()),
                summary: "Ariana Matau recorded $40.00 cash gift for Tomas Perenise".into(),
                diff: None,
                metadata: Some(json!({"memberId": "user-member-2", "amount": 40.0, "fundId": "fund-missions"})),
                created_at: clock.at(-2, 11),
            },
            AuditLogRecord {
                id: "audit-3".into(),
                church_id: church_id.into(),
                actor_user_id: "user-leader".into(),
                action: "announcement.read".into(),
                entity: "announcement".into(),
                entity_id: Some("announcement-welcome".into()),
                summary: "Sione Latu read announcement \"Welcome to the new app!\"".into(),
                diff: None,
                metadata: Some(json!({"userId": "user-leader"})),
                created_at: clock.at(-2, 12),
            },
        ];

        Self {
            users,
            households,
            groups,
            events,
            announcements,
            announcement_reads,
            funds,
            contributions,
            roles,
            children,
            checkins: Vec::new(),
            sessions,
            request_types: built_in_request_types(church_id, clock.at(-365, 0)),
            requests: Vec::new(),
            invitations: Vec::new(),
            settings: None,
            audit_logs,
        }
    }
}

/// The request types every church starts with
pub fn built_in_request_types(church_id: &str, at: DateTime<Utc>) -> Vec<RequestType> {
    let built_ins = [
        ("prayer", "Prayer", "Share a prayer need with the pastoral team", true),
        ("benevolence", "Benevolence", "Ask for practical or financial help", true),
        ("improvement", "Improvement", "Point out something the church could do better", false),
        ("suggestion", "Suggestion", "Share an idea", false),
    ];
    built_ins
        .into_iter()
        .zip(1..)
        .map(|((slug, name, description, confidential), order)| RequestType {
            id: format!("req-type-{}", slug),
            church_id: church_id.into(),
            name: name.into(),
            description: Some(description.into()),
            status: RequestTypeStatus::Active,
            is_built_in: true,
            display_order: order,
            has_confidential_field: confidential,
            created_at: at,
            updated_at: at,
        })
        .collect()
}

/// The three system roles every church starts with
pub fn system_role_set(church_id: &str, at: DateTime<Utc>) -> Vec<Role> {
    let leader_permissions = [permissions::CHECKIN_MANAGE, permissions::GIVING_MANAGE];
    vec![
        system_role(church_id, system_roles::ADMIN, "Admin", "Full access to every area", permissions::ALL, at),
        system_role(church_id, system_roles::LEADER, "Leader", "Runs check-in and records giving", &leader_permissions, at),
        system_role(church_id, system_roles::MEMBER, "Member", "Standard member access", &[], at),
    ]
}

fn system_role(
    church_id: &str,
    slug: &str,
    name: &str,
    description: &str,
    granted: &[&str],
    at: DateTime<Utc>,
) -> Role {
    let mut permissions: Vec<String> = granted.iter().map(|p| p.to_string()).collect();
    permissions.sort();
    Role {
        id: format!("role-{}", slug),
        church_id: church_id.into(),
        name: name.into(),
        slug: slug.into(),
        description: Some(description.into()),
        permissions,
        is_system: true,
        is_deletable: false,
        created_at: at,
        updated_at: at,
    }
}

fn household(church_id: &str, id: &str, name: &str, address: Option<&str>, at: DateTime<Utc>) -> Household {
    Household {
        id: id.into(),
        church_id: church_id.into(),
        name: name.into(),
        address: address.map(Into::into),
        created_at: at,
        updated_at: at,
        archived_at: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn user(
    church_id: &str,
    (id, email): (&str, &str),
    (first_name, last_name): (&str, &str),
    household_id: &str,
    role_id: &str,
    phone: Option<&str>,
    notes: Option<&str>,
    created_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
) -> User {
    User {
        id: id.into(),
        primary_email: email.into(),
        status: UserStatus::Active,
        created_at,
        last_login_at,
        roles: vec![UserRoleAssignment {
            church_id: church_id.into(),
            role_id: role_id.into(),
        }],
        profile: UserProfile {
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: phone.map(Into::into),
            notes: notes.map(Into::into),
            household_id: household_id.into(),
            household_role: HouseholdRole::Head,
            membership_status: Some(MembershipStatus::Member),
            join_date: Some(created_at.date_naive()),
            photo_url: None,
        },
        archived_at: None,
    }
}

fn member(user_id: &str, role: GroupMemberRole, joined_at: DateTime<Utc>) -> GroupMember {
    GroupMember {
        user_id: user_id.into(),
        role,
        status: GroupMemberStatus::Active,
        joined_at,
    }
}

fn attendance(event_id: &str, user_id: &str, recorded_by: &str, at: DateTime<Utc>) -> AttendanceRecord {
    AttendanceRecord {
        event_id: event_id.into(),
        user_id: user_id.into(),
        status: AttendanceStatus::CheckedIn,
        note: None,
        recorded_by: recorded_by.into(),
        recorded_at: at,
    }
}

fn fund(church_id: &str, id: &str, name: &str, at: DateTime<Utc>) -> Fund {
    Fund {
        id: id.into(),
        church_id: church_id.into(),
        name: name.into(),
        description: None,
        created_at: at,
        updated_at: at,
        deleted_at: None,
    }
}

fn session(token: &str, user_id: &str, provider: AuthProvider, at: DateTime<Utc>) -> Session {
    Session {
        token: token.into(),
        user_id: user_id.into(),
        provider,
        created_at: at,
    }
}
