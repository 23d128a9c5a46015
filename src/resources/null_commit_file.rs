//! `junos_null_commit_file`: load the set lines of a local file, commit,
//! and optionally empty the file.
//!
//! There is no object on the device to track: read returns the state as
//! is and delete only forgets it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

use super::{
    commit_lines, decode, Resource, CONFIG_READ_ERROR, CONFIG_SET_ERROR, VALIDATION_ERROR,
};
use crate::connection::config::expand_path;
use crate::error::{Error, Result};
use crate::junos::{fake, Client};
use crate::schema::{validate, AttrKind, Attribute, Response, Schema};

const TYPE_NAME: &str = "junos_null_commit_file";

/// Plan and state of the resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NullCommitFile {
    pub filename: String,
    pub append_lines: Vec<String>,
    pub clear_file_after_commit: bool,
}

impl NullCommitFile {
    fn validate(&self) -> Result<()> {
        validate::length("filename", &self.filename, 1, 4096)
    }

    fn path(&self) -> PathBuf {
        expand_path(std::path::Path::new(&self.filename))
    }

    /// Lines of the file followed by `append_lines`
    pub async fn lines(&self) -> Result<Vec<String>> {
        let mut lines = fake::read_set_lines(&self.path()).await?;
        lines.extend(self.append_lines.iter().cloned());
        Ok(lines)
    }

    fn state(&self) -> Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(ref mut map) = value {
            map.insert("id".to_string(), Value::String(self.filename.clone()));
        }
        Ok(value)
    }
}

/// Resource loading a set file
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCommitFileResource;

impl NullCommitFileResource {
    fn decode_valid(value: Value) -> Result<NullCommitFile> {
        let file: NullCommitFile = decode(value)?;
        file.validate()?;
        Ok(file)
    }
}

#[async_trait]
impl Resource for NullCommitFileResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new(
            0,
            "Load a file with set/delete lines on device and commit.",
            vec![
                Attribute::required(
                    "filename",
                    AttrKind::String,
                    "The path of the file to load.",
                )
                .force_new(),
                Attribute::optional(
                    "append_lines",
                    AttrKind::StringList,
                    "List of lines append to lines in the loaded file.",
                )
                .force_new(),
                Attribute::optional(
                    "clear_file_after_commit",
                    AttrKind::Bool,
                    "Truncate file after successful commit.",
                )
                .force_new(),
            ],
        )
    }

    fn plan_lines(&self, plan: &Value) -> Result<Vec<String>> {
        let file = Self::decode_valid(plan.clone())?;
        Ok(file.append_lines)
    }

    fn requires_replace(&self, state: &Value, plan: &Value) -> Option<&'static str> {
        let state: NullCommitFile = decode(state.clone()).ok()?;
        let plan: NullCommitFile = decode(plan.clone()).ok()?;
        if state.filename != plan.filename {
            Some("filename")
        } else if state.append_lines != plan.append_lines {
            Some("append_lines")
        } else if state.clear_file_after_commit != plan.clear_file_after_commit {
            Some("clear_file_after_commit")
        } else {
            None
        }
    }

    fn upgrade_state(&self, version: u64, raw: Value) -> Result<Value> {
        if version != 0 {
            return Err(Error::StateUpgrade {
                resource: TYPE_NAME.to_string(),
                version,
                message: "no upgrade path".to_string(),
            });
        }
        decode::<NullCommitFile>(raw)?.state()
    }

    async fn create(&self, client: &Client, plan: Value) -> Response {
        let file = match Self::decode_valid(plan) {
            Ok(file) => file,
            Err(e) => return Response::failed(VALIDATION_ERROR, &e),
        };
        let lines = match file.lines().await {
            Ok(lines) => lines,
            Err(e) => return Response::failed(CONFIG_READ_ERROR, &e),
        };

        let mut resp = if client.fake_create_setfile().is_some() {
            match client.append_fake_set_lines(&lines).await {
                Ok(()) => Response::default(),
                Err(e) => return Response::failed(CONFIG_SET_ERROR, &e),
            }
        } else {
            commit_lines(
                client,
                &lines,
                &format!("commit a file with resource {}", TYPE_NAME),
                CONFIG_SET_ERROR,
            )
            .await
        };
        if resp.has_error() {
            return resp;
        }
        info!(file = %file.filename, lines = lines.len(), "Committed set file");

        if file.clear_file_after_commit {
            if let Err(e) = fake::truncate_set_file(&file.path()).await {
                resp.add_error(CONFIG_SET_ERROR, &e);
                return resp;
            }
        }
        match file.state() {
            Ok(state) => resp.state = Some(state),
            Err(e) => resp.add_error(CONFIG_READ_ERROR, &e),
        }
        resp
    }

    async fn read(&self, _client: &Client, state: Value) -> Response {
        match decode::<NullCommitFile>(state).and_then(|file| file.state()) {
            Ok(state) => Response::with_state(state),
            Err(e) => Response::failed(CONFIG_READ_ERROR, &e),
        }
    }

    async fn update(&self, _client: &Client, _state: Value, plan: Value) -> Response {
        match Self::decode_valid(plan).and_then(|file| file.state()) {
            Ok(state) => Response::with_state(state),
            Err(e) => Response::failed(VALIDATION_ERROR, &e),
        }
    }

    async fn delete(&self, _client: &Client, _state: Value) -> Response {
        Response::default()
    }

    async fn import(&self, _client: &Client, id: &str) -> Response {
        Response::failed(
            "Import Error",
            &Error::Other {
                message: format!("{} does not support import (got id '{}')", TYPE_NAME, id),
                source: None,
            },
        )
    }
}
