//! Command loop
//!
//! Thin layer over the registry: parse a line, call one registry operation,
//! print the outcome. Registry events are printed as notices between
//! commands.

use anyhow::Result;
use obstacle_core::error::ProviderError;
use obstacle_core::flow::{CreationFlow, FlowError};
use obstacle_core::model::{ImageChoice, Obstacle, ObstacleId};
use obstacle_core::{ObstacleRegistry, RegistryEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::console::Console;

const HELP: &str = "\
Commands:
  list          show all recorded obstacles
  add           record a new obstacle at your current position
  delete <id>   remove an obstacle
  help          show this help
  quit          leave";

/// One parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Add,
    Delete(ObstacleId),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Self::Empty;
        };

        match (name.to_ascii_lowercase().as_str(), words.next()) {
            ("list" | "ls", None) => Self::List,
            ("add" | "new", None) => Self::Add,
            ("delete" | "rm", Some(id)) if words.next().is_none() => {
                Self::Delete(ObstacleId::from(id))
            }
            ("help" | "?", None) => Self::Help,
            ("quit" | "exit", None) => Self::Quit,
            _ => Self::Unknown(line.trim().to_string()),
        }
    }
}

/// Interactive shell over a loaded registry
pub struct Shell {
    registry: ObstacleRegistry,
    events: mpsc::Receiver<RegistryEvent>,
    console: Arc<Console>,
}

impl Shell {
    pub fn new(
        registry: ObstacleRegistry,
        events: mpsc::Receiver<RegistryEvent>,
        console: Arc<Console>,
    ) -> Self {
        Self {
            registry,
            events,
            console,
        }
    }

    /// Run until `quit` or end of input
    pub async fn run(mut self) -> Result<()> {
        println!("{}", HELP);

        loop {
            self.print_notices();

            let Some(line) = self.console.ask("obstacles> ").await? else {
                break;
            };

            match Command::parse(&line) {
                Command::List => self.list().await,
                Command::Add => self.add().await?,
                Command::Delete(id) => self.delete(&id).await,
                Command::Help => println!("{}", HELP),
                Command::Quit => break,
                Command::Empty => {}
                Command::Unknown(input) => {
                    println!("Unknown command: {} (try 'help')", input)
                }
            }
        }

        Ok(())
    }

    async fn list(&self) {
        let obstacles = self.registry.list().await;
        if obstacles.is_empty() {
            println!("No obstacles recorded yet.");
            return;
        }

        for obstacle in &obstacles {
            println!("{}", describe(obstacle));
        }
    }

    async fn add(&mut self) -> Result<()> {
        let mut flow = CreationFlow::new();
        flow.open()?;

        let Some(title) = self.console.ask("Title: ").await? else {
            return Ok(());
        };
        flow.set_title(title)?;

        let Some(description) = self.console.ask("Description: ").await? else {
            return Ok(());
        };
        flow.set_description(description)?;

        let image = match self
            .console
            .ask("Photo? [n]one, [l]ibrary, [c]amera: ")
            .await?
        {
            Some(answer) => parse_image_choice(&answer),
            None => return Ok(()),
        };
        flow.choose_image(image)?;

        match flow.submit(&self.registry).await {
            Ok(obstacle) => println!("Recorded {}", describe(&obstacle)),
            Err(FlowError::Rejected(e)) => {
                self.print_notices();
                println!("Not recorded: {}", e);
                flow.close()?;
            }
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }

    async fn delete(&self, id: &ObstacleId) {
        match self.registry.delete(id).await {
            Ok(true) => println!("Deleted {}", id),
            Ok(false) => println!("No obstacle with id {}", id),
            Err(e) => println!("Not deleted: {}", e),
        }
    }

    /// Print queued registry events that deserve the user's attention
    fn print_notices(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            debug!("Registry event: {:?}", event);
            if let Some(notice) = notice_for(&event) {
                println!("! {}", notice);
            }
        }
    }
}

fn parse_image_choice(answer: &str) -> ImageChoice {
    match answer.trim().to_ascii_lowercase().as_str() {
        "l" | "library" => ImageChoice::Library,
        "c" | "camera" => ImageChoice::Camera,
        _ => ImageChoice::None,
    }
}

fn describe(obstacle: &Obstacle) -> String {
    let mut text = format!(
        "[{}] {}: {} @ {}",
        obstacle.id(),
        obstacle.title(),
        obstacle.description(),
        obstacle.position()
    );
    if let Some(image) = obstacle.image() {
        text.push_str(&format!(" (photo: {})", image));
    }
    text
}

/// User-facing text for an event; routine successes print nothing
fn notice_for(event: &RegistryEvent) -> Option<String> {
    match event {
        RegistryEvent::LoadFailed { error } => {
            Some(format!("Saved obstacles could not be loaded: {}", error))
        }
        RegistryEvent::LocationUnavailable { reason } => {
            Some(format!("Location unavailable ({}); saved without position", reason))
        }
        RegistryEvent::ImageSkipped {
            reason: ProviderError::Cancelled,
        } => None,
        RegistryEvent::ImageSkipped { reason } => {
            Some(format!("No photo attached ({})", reason))
        }
        RegistryEvent::PersistFailed { error } => Some(format!("Change not saved: {}", error)),
        RegistryEvent::Loaded { .. }
        | RegistryEvent::Created { .. }
        | RegistryEvent::Deleted { .. }
        | RegistryEvent::DeleteSkipped { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obstacle_core::traits::Permission;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("list"), Command::List);
        assert_eq!(Command::parse("  ADD "), Command::Add);
        assert_eq!(
            Command::parse("delete 1712345678901"),
            Command::Delete(ObstacleId::from("1712345678901"))
        );
        assert_eq!(Command::parse("quit"), Command::Quit);
        assert_eq!(Command::parse(""), Command::Empty);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(
            Command::parse("delete"),
            Command::Unknown("delete".to_string())
        );
        assert_eq!(
            Command::parse("delete a b"),
            Command::Unknown("delete a b".to_string())
        );
        assert_eq!(
            Command::parse("list all"),
            Command::Unknown("list all".to_string())
        );
    }

    #[test]
    fn test_parse_image_choice() {
        assert_eq!(parse_image_choice("l"), ImageChoice::Library);
        assert_eq!(parse_image_choice("Camera"), ImageChoice::Camera);
        assert_eq!(parse_image_choice(""), ImageChoice::None);
        assert_eq!(parse_image_choice("x"), ImageChoice::None);
    }

    #[test]
    fn test_notices() {
        assert!(notice_for(&RegistryEvent::Loaded { count: 2 }).is_none());
        assert!(
            notice_for(&RegistryEvent::ImageSkipped {
                reason: ProviderError::Cancelled
            })
            .is_none()
        );

        let notice = notice_for(&RegistryEvent::LocationUnavailable {
            reason: ProviderError::PermissionDenied(Permission::Location),
        })
        .unwrap();
        assert!(notice.contains("location permission denied"));
    }
}
