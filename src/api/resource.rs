//! Backend resource kinds

use std::fmt;
use std::str::FromStr;

/// A backend-managed entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Startups,
    Investors,
    Partners,
    News,
    Events,
    Users,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Startups,
        Resource::Investors,
        Resource::Partners,
        Resource::News,
        Resource::Events,
        Resource::Users,
    ];

    /// Collection path, without trailing slash
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Startups => "/startups",
            Resource::Investors => "/investors",
            Resource::Partners => "/partners",
            Resource::News => "/news",
            Resource::Events => "/events",
            Resource::Users => "/users",
        }
    }

    /// Path of a single item
    pub fn item_path(&self, id: u64) -> String {
        format!("{}/{}", self.path(), id)
    }

    pub fn as_str(&self) -> &'static str {
        self.path().trim_start_matches('/')
    }

    /// Name of one item, for messages
    pub fn singular(&self) -> &'static str {
        match self {
            Resource::Startups => "startup",
            Resource::Investors => "investor",
            Resource::Partners => "partner",
            Resource::News => "news",
            Resource::Events => "event",
            Resource::Users => "user",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "startups" | "startup" => Ok(Resource::Startups),
            "investors" | "investor" => Ok(Resource::Investors),
            "partners" | "partner" => Ok(Resource::Partners),
            "news" => Ok(Resource::News),
            "events" | "event" => Ok(Resource::Events),
            "users" | "user" => Ok(Resource::Users),
            other => Err(format!("unknown resource: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_have_no_trailing_slash() {
        for resource in Resource::ALL {
            assert!(!resource.path().ends_with('/'));
        }
        assert_eq!(Resource::News.item_path(12), "/news/12");
    }

    #[test]
    fn test_parse() {
        assert_eq!("Startups".parse::<Resource>().unwrap(), Resource::Startups);
        assert_eq!("event".parse::<Resource>().unwrap(), Resource::Events);
        assert!("founders".parse::<Resource>().is_err());
        assert_eq!(Resource::Users.to_string(), "users");
    }
}
