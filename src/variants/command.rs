use std::fmt;

use serde::Serialize;

/// One launcher invocation: environment assignments plus the argument vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    pub env: Vec<(String, String)>,
    pub argv: Vec<String>,
}

impl Command {
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or(&[])
    }

    /// The command as it would be typed in a shell, with any environment
    /// assignments carried by a leading `env`.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(self.env.len() + self.argv.len() + 1);
        if !self.env.is_empty() {
            tokens.push("env".to_string());
            tokens.extend(self.env.iter().map(|(k, v)| format!("{}={}", k, v)));
        }
        tokens.extend(self.argv.iter().cloned());
        tokens
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens().join(" "))
    }
}
