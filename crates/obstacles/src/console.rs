//! Stdin-backed prompts
//!
//! The shell, the permission broker and the media picker all read from the
//! same stdin, so they share one [`Console`]. Only one prompt is ever
//! outstanding: provider calls happen while the shell awaits `create`.

use async_trait::async_trait;
use obstacle_core::traits::{
    ImageSource, MediaPicker, Permission, PermissionBroker, PermissionStatus,
};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::warn;

/// Line-oriented access to the terminal
pub struct Console {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl Console {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        })
    }

    /// Print `prompt` and read one line; `None` at end of input
    pub async fn ask(&self, prompt: &str) -> std::io::Result<Option<String>> {
        let mut lines = self.lines.lock().await;

        print!("{}", prompt);
        std::io::stdout().flush()?;

        Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
    }

    /// Yes/no question; anything but y/yes counts as no
    pub async fn confirm(&self, question: &str) -> bool {
        match self.ask(&format!("{} [y/N] ", question)).await {
            Ok(Some(answer)) => is_yes(&answer),
            Ok(None) => false,
            Err(e) => {
                warn!("Failed to read answer: {}", e);
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Permission broker that asks on the terminal
///
/// Answers are remembered for the rest of the session, like a mobile OS
/// does after the first system prompt.
pub struct TerminalPermissions {
    console: Arc<Console>,
    answers: Mutex<HashMap<Permission, PermissionStatus>>,
}

impl TerminalPermissions {
    pub fn new(console: Arc<Console>) -> Self {
        Self {
            console,
            answers: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl PermissionBroker for TerminalPermissions {
    async fn status(&self, permission: Permission) -> PermissionStatus {
        self.answers
            .lock()
            .await
            .get(&permission)
            .copied()
            .unwrap_or(PermissionStatus::Undetermined)
    }

    async fn request(&self, permission: Permission) -> PermissionStatus {
        let mut answers = self.answers.lock().await;
        if let Some(status) = answers.get(&permission) {
            return *status;
        }

        let status = if self
            .console
            .confirm(&format!("Allow access to your {}?", permission))
            .await
        {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        };

        answers.insert(permission, status);
        status
    }
}

/// Media picker that asks for a file path
pub struct PathPicker {
    console: Arc<Console>,
}

impl PathPicker {
    pub fn new(console: Arc<Console>) -> Self {
        Self { console }
    }
}

#[async_trait]
impl MediaPicker for PathPicker {
    async fn choose(&self, source: ImageSource) -> Option<PathBuf> {
        let prompt = match source {
            ImageSource::Library => "Photo to attach (empty to cancel): ",
            ImageSource::Camera => "Path of the photo you just took (empty to cancel): ",
        };

        match self.console.ask(prompt).await {
            Ok(Some(answer)) if !answer.is_empty() => Some(PathBuf::from(answer)),
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to read photo path: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes("YES"));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }
}
