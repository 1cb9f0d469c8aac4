#![cfg(feature = "grpc")]
#![allow(dead_code)]

use std::collections::HashMap;
use std::ops::Deref;

use ctor::ctor;
use spanner_query::{Config, DatabaseId, Error, SpannerResource, SpannerTemplate};
use testcontainers::{clients, Container, Docker, Image, WaitForMessage};

const GRPC_PORT: u16 = 9010;
const REST_PORT: u16 = 9020;

#[derive(Default, Debug, Clone)]
pub struct SpannerEmulator;

impl Image for SpannerEmulator {
    type Args = Vec<String>;
    type EnvVars = HashMap<String, String>;
    type Volumes = HashMap<String, String>;
    type EntryPoint = std::convert::Infallible;

    fn descriptor(&self) -> String {
        "gcr.io/cloud-spanner-emulator/emulator".to_string()
    }

    fn wait_until_ready<D: Docker>(&self, container: &Container<'_, D, Self>) {
        container
            .logs()
            .stderr
            .wait_for_message("gRPC server listening")
            .unwrap()
    }

    fn args(&self) -> Self::Args {
        Vec::new()
    }

    fn env_vars(&self) -> Self::EnvVars {
        HashMap::new()
    }

    fn volumes(&self) -> Self::Volumes {
        HashMap::new()
    }

    fn with_args(self, _arguments: Self::Args) -> Self {
        self
    }

    fn with_entrypoint(self, _entrypoint: &Self::EntryPoint) -> Self {
        self
    }

    fn entrypoint(&self) -> Option<String> {
        None
    }
}

// Calls the emulator's REST admin API.
async fn admin(rest_port: u16, path: String, body: String) {
    let response = reqwest::Client::new()
        .post(format!("http://localhost:{}/v1/{}", rest_port, path))
        .body(body)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success(), "{:?}", response);
}

/// Creates the instance and the database, then applies `ddl` to the database.
async fn create_database(rest_port: u16, database: &DatabaseId, ddl: &[&str]) {
    let instance = database.instance();
    admin(
        rest_port,
        instance.resources_id(),
        format!(r#"{{"instanceId": "{}"}}"#, instance.name()),
    )
    .await;

    let statements = ddl
        .iter()
        .map(|statement| format!(r#""{}""#, statement))
        .collect::<Vec<_>>()
        .join(",");
    admin(
        rest_port,
        database.resources_id(),
        format!(
            r#"{{"createStatement": "CREATE DATABASE `{}`", "extraStatements": [{}]}}"#,
            database.name(),
            statements
        ),
    )
    .await;
}

/// A template connected to a running emulator; the container stops when this is dropped.
pub(crate) struct TemplateFixture<'a> {
    _container: Container<'a, clients::Cli, SpannerEmulator>,
    template: SpannerTemplate,
}

impl<'a> TemplateFixture<'a> {
    pub(crate) fn template(&self) -> SpannerTemplate {
        self.template.clone()
    }
}

impl<'a> Deref for TemplateFixture<'a> {
    type Target = SpannerTemplate;

    fn deref(&self) -> &Self::Target {
        &self.template
    }
}

#[ctor]
static DOCKER: clients::Cli = {
    let _ = env_logger::builder().is_test(true).try_init();
    clients::Cli::default()
};

/// Starts an emulator with a database created by `ddl` and connects a template to it.
pub(crate) async fn new_template<'a>(ddl: Vec<&str>) -> Result<TemplateFixture<'a>, Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let database: DatabaseId = "projects/test-project/instances/test-instance/databases/trades"
        .parse()?;

    let container = DOCKER.run(SpannerEmulator);
    let rest_port = container.get_host_port(REST_PORT).unwrap();
    let grpc_port = container.get_host_port(GRPC_PORT).unwrap();
    create_database(rest_port, &database, &ddl).await;

    let template = Config::builder()
        .project(database.instance().project())
        .instance(database.instance().name())
        .database(database.name())
        .with_emulator_grpc_port(grpc_port)
        .session_pool_size(2)
        .connect()
        .await?;

    Ok(TemplateFixture {
        _container: container,
        template,
    })
}
