//! Command builder for captured child processes

use std::collections::HashMap;

/// Builder for a child process whose output is captured
#[derive(Debug, Clone, Default)]
pub struct CaptureCommand {
    /// Program followed by its arguments
    argv: Vec<String>,
    /// Extra environment variables
    env: HashMap<String, String>,
    /// PATH override
    path: Option<String>,
    /// Bytes written to the child's stdin (stdin is /dev/null when unset)
    stdin: Option<Vec<u8>>,
}

impl CaptureCommand {
    /// Create a new builder for the given argv
    pub fn new(argv: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set an environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set multiple environment variables
    pub fn envs<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Override PATH for the child
    pub fn path(mut self, path: Option<impl Into<String>>) -> Self {
        self.path = path.map(Into::into);
        self
    }

    /// Feed bytes to the child's stdin
    pub fn stdin(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(data.into());
        self
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub(crate) fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    pub(crate) fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }

    pub(crate) fn env_vars(&self) -> impl Iterator<Item = (&str, &str)> {
        let path = self.path.as_deref().map(|p| ("PATH", p));
        self.env
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(path)
    }

    pub(crate) fn stdin_data(&self) -> Option<&[u8]> {
        self.stdin.as_deref()
    }
}
