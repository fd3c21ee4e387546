//! Per-navigation access decisions and the navigation items that follow from them.
//!
//! `authorize` and `visible_nav_items` are pure projections of a `Session`
//! snapshot. They hold no state, so callers must re-run them after every
//! login, logout or role change instead of caching an earlier `Allow`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::User;

/// Role
///
/// The roles a signed-in viewer can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Standard,
    Admin,
}

impl Role {
    /// Role strings come from stored profiles. Unknown values map to `None`, which
    /// fails every role check rather than raising.
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "standard" => Some(Role::Standard),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Standard => "standard",
            Role::Admin => "admin",
        }
    }
}

/// SessionUser
///
/// The identity carried by an authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub display_name: String,
    pub role: String,
}

impl SessionUser {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

impl From<User> for SessionUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name,
            role: user.role,
        }
    }
}

/// Session
///
/// The viewer's authentication snapshot. Starts as `Pending` until stored
/// credentials are resolved, then becomes `Anonymous` or `Authenticated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Session {
    Pending,
    Anonymous,
    Authenticated { user: SessionUser },
}

impl Session {
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Session::Authenticated { user } => Some(user),
            _ => None,
        }
    }
}

/// AccessRequirement
///
/// The policy attached to a screen or route group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRequirement {
    Public,
    AuthenticatedOnly,
    RequiresRole(Role),
}

/// Screen
///
/// Where a denied viewer is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Login,
    Home,
}

impl Screen {
    pub fn path(&self) -> &'static str {
        match self {
            Screen::Login => "/login",
            Screen::Home => "/",
        }
    }
}

/// Decision
///
/// Outcome of checking a session against a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The session is still being resolved. Show a loading state and ask again
    /// once it changes.
    Await,
    /// Render nothing functional and redirect to the given screen.
    Deny(Screen),
    Allow,
}

/// authorize
///
/// Rules are checked in order: a pending session always waits, public screens
/// are open to everyone else, anonymous viewers go to login, and a role
/// mismatch sends the viewer home.
pub fn authorize(session: &Session, requirement: &AccessRequirement) -> Decision {
    let user = match session {
        Session::Pending => return Decision::Await,
        _ if *requirement == AccessRequirement::Public => return Decision::Allow,
        Session::Anonymous => return Decision::Deny(Screen::Login),
        Session::Authenticated { user } => user,
    };

    match requirement {
        AccessRequirement::RequiresRole(required) if user.role() != Some(*required) => {
            Decision::Deny(Screen::Home)
        }
        _ => Decision::Allow,
    }
}

/// NavItem
///
/// A navigation affordance offered to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum NavItem {
    Home,
    Questions,
    SubmitQuestion,
    Admin,
    Login,
    Register,
    Profile,
    Logout,
}

impl NavItem {
    /// The requirement guarding the screen this item leads to.
    pub fn requirement(&self) -> AccessRequirement {
        match self {
            NavItem::Home | NavItem::Questions | NavItem::Login | NavItem::Register => {
                AccessRequirement::Public
            }
            NavItem::SubmitQuestion | NavItem::Profile | NavItem::Logout => {
                AccessRequirement::AuthenticatedOnly
            }
            NavItem::Admin => AccessRequirement::RequiresRole(Role::Admin),
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            NavItem::Home => "/",
            NavItem::Questions => "/questions",
            NavItem::SubmitQuestion => "/submit",
            NavItem::Admin => "/admin",
            NavItem::Login => "/login",
            NavItem::Register => "/register",
            NavItem::Profile => "/profile",
            NavItem::Logout => "/logout",
        }
    }
}

/// visible_nav_items
///
/// The ordered navigation items for `session`. A pending session only gets the
/// items every viewer sees.
pub fn visible_nav_items(session: &Session) -> Vec<NavItem> {
    let mut items = vec![NavItem::Home, NavItem::Questions];

    match session {
        Session::Pending => {}
        Session::Anonymous => items.extend([NavItem::Login, NavItem::Register]),
        Session::Authenticated { user } => {
            items.push(NavItem::SubmitQuestion);
            if user.role() == Some(Role::Admin) {
                items.push(NavItem::Admin);
            }
            items.extend([NavItem::Profile, NavItem::Logout]);
        }
    }

    items
}
