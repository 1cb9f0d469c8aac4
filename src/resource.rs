use std::str::FromStr;

use crate::Error;

/// A Cloud Spanner resource addressed by a path of the form `<collection>/<name>`.
pub trait SpannerResource {
    fn resources_id(&self) -> String;
    fn name(&self) -> &str;
    fn id(&self) -> String {
        format!("{}/{}", self.resources_id(), self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceId {
    project: String,
    name: String,
}

impl InstanceId {
    pub fn new(project: &str, name: &str) -> Self {
        Self {
            project: project.to_string(),
            name: name.to_string(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }
}

impl SpannerResource for InstanceId {
    fn name(&self) -> &str {
        &self.name
    }

    fn resources_id(&self) -> String {
        format!("projects/{}/instances", self.project)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseId {
    instance: InstanceId,
    name: String,
}

impl DatabaseId {
    pub fn new(instance: InstanceId, name: &str) -> Self {
        Self {
            instance,
            name: name.to_string(),
        }
    }

    pub fn instance(&self) -> &InstanceId {
        &self.instance
    }
}

impl SpannerResource for DatabaseId {
    fn name(&self) -> &str {
        &self.name
    }

    fn resources_id(&self) -> String {
        format!("{}/databases", self.instance.id())
    }
}

/// Parses the full resource path `projects/<project>/instances/<instance>/databases/<database>`.
impl FromStr for DatabaseId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split('/').collect::<Vec<&str>>().as_slice() {
            ["projects", project, "instances", instance, "databases", database]
                if !project.is_empty() && !instance.is_empty() && !database.is_empty() =>
            {
                Ok(DatabaseId::new(InstanceId::new(project, instance), database))
            }
            _ => Err(Error::Config(format!("invalid database path: {}", s))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn trades_db() -> DatabaseId {
        DatabaseId::new(InstanceId::new("demo-project", "demo-instance"), "trades")
    }

    #[test]
    fn test_paths() {
        let database = trades_db();
        assert_eq!(database.instance().project(), "demo-project");
        assert_eq!(
            database.instance().id(),
            "projects/demo-project/instances/demo-instance"
        );
        assert_eq!(
            database.resources_id(),
            "projects/demo-project/instances/demo-instance/databases"
        );
        assert_eq!(
            database.id(),
            "projects/demo-project/instances/demo-instance/databases/trades"
        );
    }

    #[test]
    fn test_parse() {
        let path = trades_db().id();
        assert_eq!(path.parse::<DatabaseId>().unwrap(), trades_db());

        for invalid in [
            "projects/demo-project/instances/demo-instance",
            "projects//instances/demo-instance/databases/trades",
            "trades",
        ] {
            assert!(
                matches!(invalid.parse::<DatabaseId>(), Err(Error::Config(_))),
                "{}",
                invalid
            );
        }
    }
}
