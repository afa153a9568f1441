//! Sign-in and role-based access.
//!
//! A [`Session`] is built once from the configured accounts and handed to
//! every command that needs to know who is asking and for which team.

use crate::config::AccountConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Team id that grants access to every team.
pub const ALL_TEAMS: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages one team's targets and records.
    Admin,
    /// Reads every team's figures.
    Supervisor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Supervisor => write!(f, "supervisor"),
        }
    }
}

/// The teams a session can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamScope {
    Team(String),
    All,
}

impl From<&str> for TeamScope {
    fn from(team_id: &str) -> Self {
        if team_id == ALL_TEAMS {
            TeamScope::All
        } else {
            TeamScope::Team(team_id.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub role: Role,
    pub team: TeamScope,
    pub username: String,
}

impl Session {
    /// The single team this session manages, if it is scoped to one.
    pub fn team_id(&self) -> Option<&str> {
        match &self.team {
            TeamScope::Team(id) => Some(id),
            TeamScope::All => None,
        }
    }
}

/// Match credentials against the configured accounts.
pub fn authenticate(accounts: &[AccountConfig], username: &str, password: &str) -> Option<Session> {
    let account = accounts
        .iter()
        .find(|a| a.username == username && a.password == password)?;

    debug!("Signed in as {} ({})", account.username, account.role);

    Some(Session {
        role: account.role,
        team: TeamScope::from(account.team_id.as_str()),
        username: account.username.clone(),
    })
}

/// Areas of the application guarded by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Editing targets, agents and daily records.
    Targets,
    /// Period reports for one team.
    Reports,
    /// Cross-team overview and administration.
    Supervisor,
}

impl Page {
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Page::Targets | Page::Reports => &[Role::Admin],
            Page::Supervisor => &[Role::Supervisor],
        }
    }

    /// Where a role lands when it opens a page it may not use.
    pub fn home_for(role: Role) -> Page {
        match role {
            Role::Admin => Page::Targets,
            Role::Supervisor => Page::Supervisor,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Targets => write!(f, "targets"),
            Page::Reports => write!(f, "reports"),
            Page::Supervisor => write!(f, "supervisor"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("not signed in: provide --user and --password")]
    NotSignedIn,

    #[error("{role} accounts cannot open {page}; use the {home} commands instead")]
    WrongRole { role: Role, page: Page, home: Page },

    #[error("account {0} is not assigned to a team")]
    NoTeam(String),
}

/// Check that a session may open a page.
pub fn authorize(session: Option<&Session>, page: Page) -> Result<&Session, AccessError> {
    let session = session.ok_or(AccessError::NotSignedIn)?;

    if !page.allowed_roles().contains(&session.role) {
        return Err(AccessError::WrongRole {
            role: session.role,
            page,
            home: Page::home_for(session.role),
        });
    }

    Ok(session)
}

/// The team an admin session edits and reports on.
pub fn managed_team(session: &Session) -> Result<&str, AccessError> {
    session
        .team_id()
        .ok_or_else(|| AccessError::NoTeam(session.username.clone()))
}
