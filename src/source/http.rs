//! Source plugin downloading over HTTP(S).
//!
//! Fetches one URL into the target directory using the trust material from
//! the global configuration, so privately-signed endpoints work when their
//! CA is listed under `global.certificates`.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::component::{Component, Fragment};
use crate::config::{GlobalConfig, Resolver};
use crate::error::{Result, RigupError};
use crate::logger::SharedLogger;
use crate::source::Source;

const TYPE_NAME: &str = "http";

/// HTTP(S) download source.
pub struct HttpSource {
    name: String,
    url: String,
    output_filename: Option<String>,
    logger: SharedLogger,
    global: Arc<GlobalConfig>,
}

impl HttpSource {
    fn target_filename(&self) -> &str {
        if let Some(ref name) = self.output_filename {
            return name;
        }
        self.url
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty() && !segment.contains('?'))
            .unwrap_or("download")
    }
}

impl Component for HttpSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }
}

impl Source for HttpSource {
    fn download_to_path(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)?;

        let client = self.global.http_client()?;
        let response = client.get(&self.url).send()?;
        if !response.status().is_success() {
            return Err(RigupError::SourceDownload {
                source_name: self.name.clone(),
                what: self.url.clone(),
                message: format!("status {}", response.status()),
            });
        }
        let body = response.bytes()?;

        let target = path.join(self.target_filename());
        let mut file = std::fs::File::create(&target)?;
        file.write_all(&body)?;

        self.logger.debug(
            1,
            &format!(
                "source '{}': downloaded {} to {}",
                self.name,
                self.url,
                target.display()
            ),
        );
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct HttpConfig {
    url: String,
    #[serde(default)]
    output_filename: Option<String>,
}

/// Factory for the `http` source plugin.
pub fn loader(fragment: &Fragment, resolver: &Resolver<'_>) -> Result<Box<dyn Source>> {
    let config: HttpConfig =
        serde_json::from_value(serde_json::Value::Object(fragment.clone())).map_err(|e| {
            RigupError::ConfigDecode {
                component: format!("source.{TYPE_NAME}"),
                message: e.to_string(),
            }
        })?;
    Ok(Box::new(HttpSource {
        name: TYPE_NAME.to_string(),
        url: config.url,
        output_filename: config.output_filename,
        logger: resolver.logger(),
        global: resolver.global(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LogLevel;
    use crate::logger::stdlib::StdlibLogger;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    fn source(url: String, output_filename: Option<String>) -> HttpSource {
        HttpSource {
            name: "installer".to_string(),
            url,
            output_filename,
            logger: Arc::new(StdlibLogger::new("test", LogLevel::Error, 0)),
            global: Arc::new(GlobalConfig::default()),
        }
    }

    #[test]
    fn downloads_body_to_url_basename() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/bundles/agent.tar.gz");
            then.status(200).body("tarball-bytes");
        });
        let dest = TempDir::new().unwrap();

        source(server.url("/bundles/agent.tar.gz"), None)
            .download_to_path(dest.path())
            .unwrap();

        mock.assert();
        assert_eq!(
            std::fs::read_to_string(dest.path().join("agent.tar.gz")).unwrap(),
            "tarball-bytes"
        );
    }

    #[test]
    fn output_filename_overrides_basename() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/latest");
            then.status(200).body("payload");
        });
        let dest = TempDir::new().unwrap();

        source(server.url("/latest"), Some("agent.bin".to_string()))
            .download_to_path(dest.path())
            .unwrap();

        assert!(dest.path().join("agent.bin").is_file());
    }

    #[test]
    fn non_success_status_is_source_download_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });
        let dest = TempDir::new().unwrap();

        let err = source(server.url("/missing"), None)
            .download_to_path(dest.path())
            .unwrap_err();
        match err {
            RigupError::SourceDownload { message, .. } => assert!(message.contains("404")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
