use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Views of the client: `/` and `/c/:id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Thread(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("No route matches {0}")]
pub struct RouteError(pub String);

impl Route {
    pub fn thread_id(&self) -> Option<&str> {
        match self {
            Self::Home => None,
            Self::Thread(id) => Some(id),
        }
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim();
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::Home);
        }

        match trimmed.strip_prefix("/c/") {
            Some(id) if !id.is_empty() && !id.contains('/') => Ok(Self::Thread(id.to_string())),
            _ => Err(RouteError(path.to_string())),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("/"),
            Self::Thread(id) => write!(f, "/c/{}", id),
        }
    }
}
